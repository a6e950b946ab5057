use std::io::Write;

use csv::{QuoteStyle, WriterBuilder};

use super::pairs::SeqPair;
use crate::align::coords::CoordFormat;
use crate::align::types::AlignmentResult;
use crate::error::KswResult;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub cigar: bool,
    /// Echo the query and target text after the other columns.
    pub sequences: bool,
    pub header: bool,
    pub coord_format: CoordFormat,
}

impl OutputOptions {
    pub fn column_names(&self) -> Vec<&'static str> {
        let mut names = vec!["score"];
        names.extend(self.coord_format.column_names());
        if self.cigar {
            names.push("cigar");
        }
        if self.sequences {
            names.extend(["query", "target"]);
        }
        names
    }
}

pub struct ResultWriter<W: Write> {
    inner: csv::Writer<W>,
    options: OutputOptions,
    record: Vec<String>,
}

impl<W: Write> ResultWriter<W> {
    /// Wraps `writer`, emitting the header line first when requested.
    pub fn new(writer: W, options: OutputOptions) -> KswResult<Self> {
        let inner = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .has_headers(false)
            .from_writer(writer);
        let mut out = Self {
            inner,
            options,
            record: Vec::new(),
        };
        if options.header {
            out.inner.write_record(options.column_names())?;
            out.inner.flush()?;
        }
        Ok(out)
    }

    pub fn options(&self) -> &OutputOptions {
        &self.options
    }

    pub fn write(&mut self, result: &AlignmentResult, pair: &SeqPair) -> KswResult<()> {
        self.record.clear();
        self.record.push(result.score.to_string());
        self.record.extend(
            self.options
                .coord_format
                .format(result.extent)
                .iter()
                .map(i64::to_string),
        );
        if self.options.cigar {
            let cigar = result
                .cigar
                .as_ref()
                .map_or_else(|| "*".to_string(), |c| c.to_string());
            self.record.push(cigar);
        }
        if self.options.sequences {
            self.record.push(pair.query.to_text());
            self.record.push(pair.target.to_text());
        }
        self.inner.write_record(&self.record)?;
        self.inner.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }
}
