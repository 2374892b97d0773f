use tracing::debug;

use crate::core::{DataSeries, SeriesPoint};

/// Upper bound applied to the smoothing weight; at `1.0` the debiased
/// average would divide by zero.
pub const MAX_SMOOTHING_WEIGHT: f64 = 0.999;

/// Debiased exponential moving average over each series' `y` values.
///
/// `weight` is clamped to `[0, MAX_SMOOTHING_WEIGHT]`; `0` is the identity.
/// Non-finite `y` values pass through untouched and do not feed the
/// average. A series whose values are all identical is returned as is,
/// which keeps constant lines free of floating point drift.
#[must_use]
pub fn classic_smoothing<P: SeriesPoint>(
    series: &[DataSeries<P>],
    weight: f64,
) -> Vec<DataSeries<P>> {
    let weight = if weight.is_finite() {
        weight.clamp(0.0, MAX_SMOOTHING_WEIGHT)
    } else {
        0.0
    };
    debug!(series_count = series.len(), weight, "smoothing series");

    series
        .iter()
        .map(|data| DataSeries {
            id: data.id.clone(),
            points: smooth_points(&data.points, weight),
        })
        .collect()
}

fn smooth_points<P: SeriesPoint>(points: &[P], weight: f64) -> Vec<P> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    let first_y = first.y();
    if points.iter().all(|point| point.y() == first_y) {
        return points.to_vec();
    }

    let mut last = 0.0;
    let mut finite_count: i32 = 0;
    points
        .iter()
        .map(|point| {
            let y = point.y();
            if !y.is_finite() {
                return point.clone();
            }
            last = last * weight + (1.0 - weight) * y;
            finite_count += 1;
            let debias = 1.0 - weight.powi(finite_count);
            point.with_y(last / debias)
        })
        .collect()
}
