//! Series transforms applied before data reaches a chart.

mod partition;
mod smoothing;

pub use partition::{PartitionedSeries, partition_series};
pub use smoothing::{MAX_SMOOTHING_WEIGHT, classic_smoothing};

use serde::{Deserialize, Serialize};

use crate::core::SeriesPoint;

/// Scalar summary sample as produced by a training run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScalarPoint {
    pub x: f64,
    pub y: f64,
    pub step: i64,
    /// Epoch milliseconds.
    pub wall_time: f64,
}

impl ScalarPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64, step: i64, wall_time: f64) -> Self {
        Self {
            x,
            y,
            step,
            wall_time,
        }
    }
}

impl SeriesPoint for ScalarPoint {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn with_y(&self, y: f64) -> Self {
        Self { y, ..*self }
    }
}
