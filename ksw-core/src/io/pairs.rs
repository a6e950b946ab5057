use std::io::BufRead;

use log::warn;

use crate::align::encode::{encode_nt4, EncodedSeq};
use crate::error::KswResult;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeqPair {
    pub query: EncodedSeq,
    pub target: EncodedSeq,
}

/// Reads a query line then a target line, until either is missing.
///
/// Line endings (`\n` or `\r\n`) are stripped; empty lines are empty
/// sequences.
pub struct PairReader<R> {
    reader: R,
    line_no: usize,
    buf_line: Vec<u8>,
}

impl<R: BufRead> PairReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf_line: Vec::new(),
        }
    }

    /// Lines consumed so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    fn next_line(&mut self) -> KswResult<Option<EncodedSeq>> {
        self.buf_line.clear();
        if self.reader.read_until(b'\n', &mut self.buf_line)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        let mut line = self.buf_line.as_slice();
        if let Some(rest) = line.strip_suffix(b"\n") {
            line = rest;
        }
        if let Some(rest) = line.strip_suffix(b"\r") {
            line = rest;
        }
        Ok(Some(encode_nt4(line)))
    }
}

impl<R: BufRead> Iterator for PairReader<R> {
    type Item = KswResult<SeqPair>;

    fn next(&mut self) -> Option<Self::Item> {
        let query = match self.next_line() {
            Ok(Some(seq)) => seq,
            Ok(None) => return None,
            Err(err) => return Some(Err(err)),
        };
        match self.next_line() {
            Ok(Some(target)) => Some(Ok(SeqPair { query, target })),
            Ok(None) => {
                warn!(
                    "ignoring unpaired query on line {} at end of input",
                    self.line_no
                );
                None
            }
            Err(err) => Some(Err(err)),
        }
    }
}
