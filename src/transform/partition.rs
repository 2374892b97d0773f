use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::trace;

use crate::core::{DataSeries, SeriesPoint};

/// Monotonic slice of a run, drawn as its own line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionedSeries<P> {
    /// JSON encoding of `[run_id, partition_index]`; unique per partition.
    pub id: String,
    pub run_id: String,
    pub partition_index: usize,
    pub partition_size: usize,
    pub points: Vec<P>,
}

impl<P> PartitionedSeries<P> {
    #[must_use]
    pub fn into_data_series(self) -> DataSeries<P> {
        DataSeries {
            id: self.id,
            points: self.points,
        }
    }
}

/// Splits every run wherever `x` decreases, e.g. after a training restart
/// that rewinds the step counter.
///
/// Points with a non-finite `x` stay in the partition being built and are
/// skipped when comparing neighbours.
#[must_use]
pub fn partition_series<P: SeriesPoint>(series: &[DataSeries<P>]) -> Vec<PartitionedSeries<P>> {
    let mut partitioned = Vec::new();

    for run in series {
        let partitions = split_on_decrease(&run.points);
        let partition_size = partitions.len();
        trace!(run_id = %run.id, partition_size, "partitioned run");

        partitioned.extend(partitions.into_iter().enumerate().map(|(index, points)| {
            PartitionedSeries {
                id: json!([run.id, index]).to_string(),
                run_id: run.id.clone(),
                partition_index: index,
                partition_size,
                points,
            }
        }));
    }

    partitioned
}

fn split_on_decrease<P: SeriesPoint>(points: &[P]) -> Vec<Vec<P>> {
    let mut partitions = Vec::new();
    let mut current: Vec<P> = Vec::new();
    let mut last_x = f64::NEG_INFINITY;

    for point in points {
        let x = point.x();
        if x.is_finite() {
            if x < last_x {
                partitions.push(std::mem::take(&mut current));
            }
            last_x = x;
        }
        current.push(point.clone());
    }
    partitions.push(current);
    partitions
}
