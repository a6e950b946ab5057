use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use log::debug;
use memchr::memchr2_iter;

use super::encode::ALPHABET_SIZE;
use crate::error::{KswError, KswResult};

const ACGT: usize = 4;
const FULL_LEN: usize = ALPHABET_SIZE * ALPHABET_SIZE;
const ACGT_LEN: usize = ACGT * ACGT;

/// Row-major 5x5 substitution matrix over `ACGTN`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoringMatrix {
    values: [i8; FULL_LEN],
}

impl ScoringMatrix {
    /// Match on the ACGT diagonal, `-mismatch` elsewhere in ACGT, zero for `N`.
    pub fn build(match_score: i8, mismatch: i8) -> Self {
        let mut values = [0i8; FULL_LEN];
        for i in 0..ACGT {
            for j in 0..ACGT {
                values[i * ALPHABET_SIZE + j] = if i == j { match_score } else { -mismatch };
            }
        }
        Self { values }
    }

    pub fn from_file(path: impl AsRef<Path>) -> KswResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| KswError::MatrixOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let matrix = Self::from_reader(BufReader::new(file))?;
        debug!("loaded scoring matrix from {}", path.display());
        Ok(matrix)
    }

    /// Reads comma- or tab-separated integers; 16 values form the ACGT block,
    /// 25 values the full matrix.
    pub fn from_reader<R: BufRead>(reader: R) -> KswResult<Self> {
        let mut parsed: Vec<i8> = Vec::with_capacity(FULL_LEN);
        for (line_idx, line) in reader.lines().enumerate() {
            let line = line.map_err(KswError::MatrixIo)?;
            let bytes = line.as_bytes();
            let mut start = 0usize;
            let ends = memchr2_iter(b',', b'\t', bytes).chain(std::iter::once(bytes.len()));
            for end in ends {
                let token = line[start..end].trim();
                start = end + 1;
                if token.is_empty() {
                    continue;
                }
                if parsed.len() == FULL_LEN {
                    return Err(KswError::MatrixTooManyValues);
                }
                let value = token
                    .parse::<i32>()
                    .ok()
                    .and_then(|v| i8::try_from(v).ok())
                    .ok_or_else(|| KswError::MatrixParse {
                        token: token.to_string(),
                        line: line_idx + 1,
                    })?;
                parsed.push(value);
            }
        }

        let mut values = [0i8; FULL_LEN];
        match parsed.len() {
            ACGT_LEN => {
                for (k, &v) in parsed.iter().enumerate() {
                    values[(k / ACGT) * ALPHABET_SIZE + k % ACGT] = v;
                }
            }
            FULL_LEN => values.copy_from_slice(&parsed),
            found => return Err(KswError::MatrixValueCount { found }),
        }
        Ok(Self { values })
    }

    /// Writes five tab-separated rows, readable by [`ScoringMatrix::from_reader`].
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for row in self.values.chunks(ALPHABET_SIZE) {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(writer, "{}", line.join("\t"))?;
        }
        Ok(())
    }

    #[inline]
    pub fn score(&self, a: u8, b: u8) -> i32 {
        self.values[a as usize * ALPHABET_SIZE + b as usize] as i32
    }

    pub fn max_abs_score(&self) -> i32 {
        self.values
            .iter()
            .map(|&v| (v as i32).abs())
            .max()
            .unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[i8] {
        &self.values
    }
}
