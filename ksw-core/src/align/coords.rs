use super::types::Extent;

/// How the four coordinate columns are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoordFormat {
    /// Zero-based inclusive begin and end.
    #[default]
    StartEnd,
    /// Zero-based begin and length.
    OffsetLength,
}

impl CoordFormat {
    /// Column names for query and target, in output order.
    pub fn column_names(&self) -> [&'static str; 4] {
        match self {
            CoordFormat::StartEnd => ["query_start", "query_end", "target_start", "target_end"],
            CoordFormat::OffsetLength => [
                "query_offset",
                "query_length",
                "target_offset",
                "target_length",
            ],
        }
    }

    /// Renders an extent; no alignment is -1 in every column.
    pub fn format(&self, extent: Option<Extent>) -> [i64; 4] {
        let Some(ext) = extent else {
            return [-1; 4];
        };
        let (q, t) = (ext.query, ext.target);
        match self {
            CoordFormat::StartEnd => [
                q.begin as i64,
                q.end as i64,
                t.begin as i64,
                t.end as i64,
            ],
            CoordFormat::OffsetLength => [
                q.begin as i64,
                q.len() as i64,
                t.begin as i64,
                t.len() as i64,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::types::Span;

    #[test]
    fn sentinel_never_gets_a_length() {
        assert_eq!(CoordFormat::StartEnd.format(None), [-1; 4]);
        assert_eq!(CoordFormat::OffsetLength.format(None), [-1; 4]);
    }

    #[test]
    fn offset_length_of_single_base() {
        let ext = Extent {
            query: Span::new(0, 0),
            target: Span::new(7, 9),
        };
        assert_eq!(CoordFormat::StartEnd.format(Some(ext)), [0, 0, 7, 9]);
        assert_eq!(CoordFormat::OffsetLength.format(Some(ext)), [0, 1, 7, 3]);
    }
}
