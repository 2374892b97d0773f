use ordered_float::OrderedFloat;
use tracing::{trace, warn};

use crate::core::scale::{Scale, ScaleType, create_scale};
use crate::core::types::{DataExtent, DataSeries, DataSeriesMetadataMap, Extent, SeriesPoint};
use crate::error::ChartResult;

/// View box used when no data is available.
pub const DEFAULT_EXTENT: Extent = Extent {
    x: (0.0, 1.0),
    y: (0.0, 1.0),
};

const OUTLIER_LOWER_QUANTILE: f64 = 0.05;
const OUTLIER_UPPER_QUANTILE: f64 = 0.95;

/// Controls for [`compute_data_series_extent_with`].
#[derive(Debug, Clone, Copy)]
pub struct ExtentOptions {
    /// Clip y to the 5th..95th percentile of visible values.
    pub ignore_y_outliers: bool,
    pub x_scale: &'static dyn Scale,
    pub y_scale: &'static dyn Scale,
}

impl Default for ExtentOptions {
    fn default() -> Self {
        Self {
            ignore_y_outliers: false,
            x_scale: create_scale(ScaleType::Linear),
            y_scale: create_scale(ScaleType::Linear),
        }
    }
}

impl ExtentOptions {
    #[must_use]
    pub fn with_scales(mut self, x_scale: ScaleType, y_scale: ScaleType) -> Self {
        self.x_scale = create_scale(x_scale);
        self.y_scale = create_scale(y_scale);
        self
    }

    #[must_use]
    pub fn with_ignore_y_outliers(mut self, ignore: bool) -> Self {
        self.ignore_y_outliers = ignore;
        self
    }
}

/// Bounding box of every finite point of visible, non-auxiliary series.
#[must_use]
pub fn compute_data_series_extent<P: SeriesPoint>(
    series: &[DataSeries<P>],
    metadata: &DataSeriesMetadataMap,
) -> DataExtent {
    compute_data_series_extent_with(series, metadata, ExtentOptions::default())
}

/// Same as [`compute_data_series_extent`] with scale-aware value filtering.
///
/// Values rejected by the axis scale's `is_safe_number` are skipped, so a
/// log axis ignores zero and negative values.
#[must_use]
pub fn compute_data_series_extent_with<P: SeriesPoint>(
    series: &[DataSeries<P>],
    metadata: &DataSeriesMetadataMap,
    options: ExtentOptions,
) -> DataExtent {
    let mut x_range: Option<(f64, f64)> = None;
    let mut y_range: Option<(f64, f64)> = None;
    let mut y_values: Vec<OrderedFloat<f64>> = Vec::new();

    for data in series {
        let Some(meta) = metadata.get(&data.id) else {
            continue;
        };
        if !meta.is_primary_visible() {
            continue;
        }

        for point in &data.points {
            let (x, y) = (point.x(), point.y());
            if options.x_scale.is_safe_number(x) {
                x_range = Some(extend(x_range, x));
            }
            if options.y_scale.is_safe_number(y) {
                y_range = Some(extend(y_range, y));
                if options.ignore_y_outliers {
                    y_values.push(OrderedFloat(y));
                }
            }
        }
    }

    if options.ignore_y_outliers && !y_values.is_empty() {
        y_values.sort_unstable();
        let last = (y_values.len() - 1) as f64;
        let lower = y_values[(last * OUTLIER_LOWER_QUANTILE).floor() as usize].0;
        let upper = y_values[(last * OUTLIER_UPPER_QUANTILE).ceil() as usize].0;
        y_range = Some((lower, upper));
    }

    trace!(
        series_count = series.len(),
        x = ?x_range,
        y = ?y_range,
        "computed data series extent"
    );
    DataExtent {
        x: x_range,
        y: y_range,
    }
}

fn extend(range: Option<(f64, f64)>, value: f64) -> (f64, f64) {
    match range {
        Some((min, max)) => (min.min(value), max.max(value)),
        None => (value, value),
    }
}

/// Padded and rounded view box for a data extent.
///
/// Axes without data fall back to [`DEFAULT_EXTENT`].
#[must_use]
pub fn default_view_box(
    data_extent: DataExtent,
    x_scale: &dyn Scale,
    y_scale: &dyn Scale,
) -> Extent {
    Extent {
        x: nice_axis(data_extent.x, x_scale, DEFAULT_EXTENT.x),
        y: nice_axis(data_extent.y, y_scale, DEFAULT_EXTENT.y),
    }
}

fn nice_axis(range: Option<(f64, f64)>, scale: &dyn Scale, fallback: (f64, f64)) -> (f64, f64) {
    let Some(range) = range else {
        return fallback;
    };
    let niced: ChartResult<(f64, f64)> = scale
        .padded_domain(range)
        .and_then(|padded| scale.nice_domain(padded));
    match niced {
        Ok(domain) => domain,
        Err(err) => {
            warn!(error = %err, ?range, "falling back to default axis extent");
            fallback
        }
    }
}
