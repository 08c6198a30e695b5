//! Shared bookkeeping for the "at most one live WRITE window per
//! overlapping range" invariant (spec.md §3).

use std::ops::Range;
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct RangeTracker {
    open_writes: Mutex<Vec<Range<usize>>>,
}

impl RangeTracker {
    pub(crate) fn try_register(&self, range: Range<usize>) -> bool {
        let mut open = self.open_writes.lock().unwrap_or_else(|p| p.into_inner());
        if open.iter().any(|r| overlaps(r, &range)) {
            return false;
        }
        open.push(range);
        true
    }

    pub(crate) fn unregister(&self, range: &Range<usize>) {
        let mut open = self.open_writes.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(pos) = open.iter().position(|r| r == range) {
            open.swap_remove(pos);
        }
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}
