pub mod extent;
pub mod formatter;
pub mod scale;
mod ticks;
pub mod types;

pub use extent::{
    DEFAULT_EXTENT, ExtentOptions, compute_data_series_extent, compute_data_series_extent_with,
    default_view_box,
};
pub use formatter::{
    Formatter, IntlNumberFormatter, NumberFormatter, RelativeTimeFormatter, SiNumberFormatter,
    WallTimeFormatter, formatter_for_scale,
};
pub use scale::{
    DOMAIN_PADDING_RATIO, LOG_DOMAIN_FLOOR, LinearScale, Log10Scale, Scale, ScaleType, TimeScale,
    create_scale,
};
pub use types::{
    Axis, DataExtent, DataPoint, DataSeries, DataSeriesMetadata, DataSeriesMetadataMap, Dimension,
    Extent, Rect, SeriesPoint,
};
