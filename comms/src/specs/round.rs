use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// How the local share of a worker is divided between its threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    /// One contiguous chunk per thread, best when every point costs the same.
    Static,
    /// Work-stealing over single points, best when the cost per point varies.
    Dynamic,
}

/// The specification of a single distribute-compute-combine round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSpec {
    /// The size label of the dataset, as named in the size list.
    pub dataset: u64,
    /// The amount of points actually loaded from the dataset.
    pub points: usize,
    pub threads: NonZeroUsize,
    pub schedule: Schedule,
}
