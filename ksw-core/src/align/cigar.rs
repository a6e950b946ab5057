use super::kernels::Gaps;
use super::types::{Cigar, CigarOp};

/// Collapses per-base ops into runs; adjacent runs never share an op.
pub fn normalize(ops: &[CigarOp]) -> Cigar {
    let mut cigar = Cigar::default();
    let mut iter = ops.iter().copied();
    let Some(mut current) = iter.next() else {
        return cigar;
    };
    let mut len = 1usize;
    for op in iter {
        if op == current {
            len += 1;
        } else {
            cigar.ops.push((current, len));
            current = op;
            len = 1;
        }
    }
    cigar.ops.push((current, len));
    cigar
}

/// Expands runs back to one op per base.
pub fn expand(cigar: &Cigar) -> Vec<CigarOp> {
    cigar
        .ops
        .iter()
        .flat_map(|&(op, len)| std::iter::repeat(op).take(len))
        .collect()
}

/// Deletion flanks removed from a global alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlankTrim {
    /// Target bases deleted before the first query base.
    pub leading: usize,
    /// Target bases deleted after the last query base.
    pub trailing: usize,
}

impl FlankTrim {
    /// Score recovered by not paying for the stripped runs.
    pub fn refund(&self, gaps: Gaps) -> i32 {
        [self.leading, self.trailing]
            .iter()
            .filter(|&&len| len > 0)
            .map(|&len| gaps.run(len))
            .sum()
    }
}

/// Strips the leading and trailing deletion runs from `cigar` in place.
pub fn trim_deletion_flanks(cigar: &mut Cigar) -> FlankTrim {
    let mut trim = FlankTrim::default();
    if let Some(&(CigarOp::Del, len)) = cigar.ops.first() {
        trim.leading = len;
        cigar.ops.remove(0);
    }
    if let Some(&(CigarOp::Del, len)) = cigar.ops.last() {
        trim.trailing = len;
        cigar.ops.pop();
    }
    trim
}
