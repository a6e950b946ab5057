use super::types::CigarOp;

/// Initial capacity for row buffers, roughly one short read.
const INITIAL_ROW_CAPACITY: usize = 512;

/// Initial capacity for the edit-op buffer.
const INITIAL_OPS_CAPACITY: usize = 1024;

/// Scratch buffers owned by one dispatcher. They only grow, doubling when a
/// pair needs more room.
pub struct Workspace {
    pub(crate) h_row: Vec<i32>,
    pub(crate) e_row: Vec<i32>,
    /// Per-cell predecessor bits, `(n + 1) * (m + 1)` entries.
    pub(crate) trace: Vec<u8>,
    /// Per-base edit ops collected in reverse during traceback.
    pub(crate) ops: Vec<CigarOp>,
    /// Reversed prefixes for locating local alignment starts.
    pub(crate) rev_query: Vec<u8>,
    pub(crate) rev_target: Vec<u8>,
    grow_events: usize,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            h_row: Vec::with_capacity(INITIAL_ROW_CAPACITY),
            e_row: Vec::with_capacity(INITIAL_ROW_CAPACITY),
            trace: Vec::new(),
            ops: Vec::with_capacity(INITIAL_OPS_CAPACITY),
            rev_query: Vec::with_capacity(INITIAL_ROW_CAPACITY),
            rev_target: Vec::with_capacity(INITIAL_ROW_CAPACITY),
            grow_events: 0,
        }
    }

    /// Resets the DP rows to `len` cells of `h` and `e` respectively.
    pub(crate) fn rows(&mut self, len: usize, h: i32, e: i32) -> (&mut [i32], &mut [i32]) {
        self.grow_events += reset(&mut self.h_row, len, h) as usize;
        self.grow_events += reset(&mut self.e_row, len, e) as usize;
        (&mut self.h_row[..len], &mut self.e_row[..len])
    }

    /// Resets the DP rows and a zeroed traceback matrix of `cells` entries.
    pub(crate) fn rows_with_trace(
        &mut self,
        len: usize,
        h: i32,
        e: i32,
        cells: usize,
    ) -> (&mut [i32], &mut [i32], &mut [u8]) {
        self.grow_events += reset(&mut self.h_row, len, h) as usize;
        self.grow_events += reset(&mut self.e_row, len, e) as usize;
        self.grow_events += reset(&mut self.trace, cells, 0) as usize;
        (
            &mut self.h_row[..len],
            &mut self.e_row[..len],
            &mut self.trace[..cells],
        )
    }

    /// Empties the op buffer, guaranteeing room for `needed` ops.
    pub(crate) fn reserve_ops(&mut self, needed: usize) {
        self.ops.clear();
        if self.ops.capacity() < needed {
            let target = grown_capacity(self.ops.capacity(), needed);
            self.ops.reserve_exact(target);
            self.grow_events += 1;
        }
    }

    /// Moves the reversed sequences out so they can be read while the DP
    /// rows are borrowed; hand them back with [`Workspace::restore_reversed`].
    pub(crate) fn take_reversed(&mut self, query: &[u8], target: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let mut rq = std::mem::take(&mut self.rev_query);
        let mut rt = std::mem::take(&mut self.rev_target);
        rq.clear();
        rq.extend(query.iter().rev());
        rt.clear();
        rt.extend(target.iter().rev());
        (rq, rt)
    }

    pub(crate) fn restore_reversed(&mut self, rev_query: Vec<u8>, rev_target: Vec<u8>) {
        self.rev_query = rev_query;
        self.rev_target = rev_target;
    }

    /// Number of times any buffer had to be reallocated.
    pub fn grow_events(&self) -> usize {
        self.grow_events
    }

    pub fn trace_capacity(&self) -> usize {
        self.trace.capacity()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

fn grown_capacity(current: usize, needed: usize) -> usize {
    let mut cap = current.max(1);
    while cap < needed {
        cap *= 2;
    }
    cap
}

/// Refills `buf` with `len` copies of `value`; returns true if it reallocated.
fn reset<T: Copy>(buf: &mut Vec<T>, len: usize, value: T) -> bool {
    buf.clear();
    let grew = buf.capacity() < len;
    if grew {
        let target = grown_capacity(buf.capacity(), len);
        buf.reserve_exact(target);
    }
    buf.resize(len, value);
    grew
}
