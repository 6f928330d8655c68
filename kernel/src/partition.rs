use std::{num::NonZeroUsize, ops::Range};

/// The share of a single worker inside a `Plan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part {
    pub count: usize,
    pub offset: usize,
}

impl Part {
    #[inline]
    pub fn range(self) -> Range<usize> {
        self.offset..self.offset + self.count
    }
}

/// A balanced division of `total` items between a fixed amount of workers.
///
/// Properties:
/// - Ranges are contiguous, disjoint and cover `[0..total)` in worker order.
/// - Sizes differ by at most 1, the first `total % workers` workers get the extra item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    total: usize,
    parts: Vec<Part>,
}

impl Plan {
    /// Computes the plan for `total` items and `workers` workers.
    pub fn new(total: usize, workers: NonZeroUsize) -> Self {
        let parts = (0..workers.get())
            .map(|rank| part(total, rank, workers.get()))
            .collect();

        Self { total, parts }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.parts.len()
    }

    /// Returns the part assigned to `rank`.
    ///
    /// # Panics
    /// If `rank` is not a worker of this plan.
    #[inline]
    pub fn part(&self, rank: usize) -> Part {
        self.parts[rank]
    }

    #[inline]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }
}

fn part(total: usize, rank: usize, workers: usize) -> Part {
    let base = total / workers;
    let rem = total % workers;

    let offset = rank * base + rank.min(rem);
    let extra = if rank < rem { 1 } else { 0 };

    Part {
        count: base + extra,
        offset,
    }
}
