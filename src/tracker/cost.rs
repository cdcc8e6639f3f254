//! The two accumulated-cost columns of the online DTW recurrence.
//!
//! One column is *active*: it holds the costs after the last successful
//! update and is what the next update reads as its predecessors. The other
//! is scratch space the next update writes into. Swapping flips a flag; no
//! buffer is ever reallocated or handed out.
//!
//! A cost of `None` means "unreachable". Each column remembers the span it
//! was last written over, so clearing costs O(window) and never leaves
//! stale finite entries behind when the window moves.

/// One column of costs plus the range of indices that may be non-`None`.
#[derive(Debug, Clone)]
pub(crate) struct CostColumn {
    costs: Vec<Option<f32>>,
    span: Option<(usize, usize)>,
}

impl CostColumn {
    fn new(len: usize) -> Self {
        Self {
            costs: vec![None; len],
            span: None,
        }
    }

    pub(crate) fn costs(&self) -> &[Option<f32>] {
        &self.costs
    }

    /// Write one cost, widening the dirty span.
    pub(crate) fn set(&mut self, j: usize, cost: Option<f32>) {
        self.costs[j] = cost;
        self.span = Some(match self.span {
            Some((lo, hi)) => (lo.min(j), hi.max(j)),
            None => (j, j),
        });
    }

    /// Apply `f` to every finite cost in `lo..=hi`.
    pub(crate) fn map_finite(&mut self, lo: usize, hi: usize, f: impl Fn(f32) -> f32) {
        for cost in self.costs[lo..=hi].iter_mut().flatten() {
            *cost = f(*cost);
        }
    }

    /// Mark every written entry unreachable again.
    pub(crate) fn clear(&mut self) {
        if let Some((lo, hi)) = self.span.take() {
            self.costs[lo..=hi].fill(None);
        }
    }

    fn fill_unreachable(&mut self) {
        self.costs.fill(None);
        self.span = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Active {
    First,
    Second,
}

/// Owned pair of cost columns with a flag selecting the active one.
#[derive(Debug, Clone)]
pub struct CostColumns {
    first: CostColumn,
    second: CostColumn,
    active: Active,
}

impl CostColumns {
    /// Allocate both columns for a reference of `len` frames and seed them.
    pub(crate) fn new(len: usize) -> Self {
        let mut columns = Self {
            first: CostColumn::new(len),
            second: CostColumn::new(len),
            active: Active::First,
        };
        columns.reset();
        columns
    }

    /// Everything unreachable except the start of the reference, at cost 0.
    pub(crate) fn reset(&mut self) {
        self.first.fill_unreachable();
        self.second.fill_unreachable();
        self.active = Active::First;
        self.first.set(0, Some(0.0));
    }

    /// Costs after the last successful update.
    pub fn active(&self) -> &[Option<f32>] {
        match self.active {
            Active::First => self.first.costs(),
            Active::Second => self.second.costs(),
        }
    }

    /// Borrow the active column for reading and the scratch column for
    /// writing at the same time.
    pub(crate) fn split(&mut self) -> (&[Option<f32>], &mut CostColumn) {
        match self.active {
            Active::First => (self.first.costs(), &mut self.second),
            Active::Second => (self.second.costs(), &mut self.first),
        }
    }

    /// Promote the scratch column to active and clear the old active one,
    /// which becomes the new scratch column.
    pub(crate) fn swap(&mut self) {
        self.active = match self.active {
            Active::First => {
                self.first.clear();
                Active::Second
            }
            Active::Second => {
                self.second.clear();
                Active::First
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_columns_are_seeded() {
        let cols = CostColumns::new(5);
        assert_eq!(cols.active(), &[Some(0.0), None, None, None, None]);
    }

    #[test]
    fn swap_promotes_scratch_and_clears_old() {
        let mut cols = CostColumns::new(4);
        {
            let (prev, scratch) = cols.split();
            assert_eq!(prev[0], Some(0.0));
            scratch.set(1, Some(0.5));
            scratch.set(2, Some(0.0));
        }
        cols.swap();
        assert_eq!(cols.active(), &[None, Some(0.5), Some(0.0), None]);

        let (_, scratch) = cols.split();
        assert!(scratch.costs().iter().all(Option::is_none));
    }

    #[test]
    fn clear_covers_everything_written() {
        let mut col = CostColumn::new(10);
        col.set(7, Some(1.0));
        col.set(2, Some(3.0));
        col.clear();
        assert!(col.costs().iter().all(Option::is_none));
    }

    #[test]
    fn map_finite_skips_unreachable() {
        let mut col = CostColumn::new(3);
        col.set(0, Some(2.0));
        col.set(1, None);
        col.set(2, Some(4.0));
        col.map_finite(0, 2, |c| c - 2.0);
        assert_eq!(col.costs(), &[Some(0.0), None, Some(2.0)]);
    }

    #[test]
    fn reset_restores_seed() {
        let mut cols = CostColumns::new(3);
        {
            let (_, scratch) = cols.split();
            scratch.set(2, Some(1.0));
        }
        cols.swap();
        cols.reset();
        assert_eq!(cols.active(), &[Some(0.0), None, None]);
    }
}
