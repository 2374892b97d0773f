use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Size of the drawing surface in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub width: f64,
    pub height: f64,
}

impl Dimension {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns `true` when both sides are finite and strictly positive.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Returns `true` when both sides are finite and non-negative.
    ///
    /// Hidden containers legitimately report `0x0`.
    #[must_use]
    pub fn is_well_formed(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

/// Point accessor used by every data-series consumer.
///
/// Producers may carry extra fields (step, wall time, ...); the chart only
/// reads `x`/`y`, and transforms only rewrite `y`.
pub trait SeriesPoint: Clone + Send + Sync + 'static {
    fn x(&self) -> f64;
    fn y(&self) -> f64;

    #[must_use]
    fn with_y(&self, y: f64) -> Self;
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl SeriesPoint for DataPoint {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn with_y(&self, y: f64) -> Self {
        Self { x: self.x, y }
    }
}

/// One named sequence of points drawn as one line.
///
/// Points are expected to be sorted ascending by `x`; closest-point lookups
/// rely on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSeries<P = DataPoint> {
    pub id: String,
    pub points: Vec<P>,
}

impl<P> DataSeries<P> {
    #[must_use]
    pub fn new(id: impl Into<String>, points: Vec<P>) -> Self {
        Self {
            id: id.into(),
            points,
        }
    }
}

impl DataSeries<DataPoint> {
    /// Builds a series from `(x, y)` tuples.
    #[must_use]
    pub fn from_xy(id: impl Into<String>, points: &[(f64, f64)]) -> Self {
        Self::new(
            id,
            points.iter().map(|&(x, y)| DataPoint::new(x, y)).collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSeriesMetadata {
    pub id: String,
    pub display_name: String,
    /// CSS hex color, e.g. `#f00` or `#ff0000`.
    pub color: String,
    pub visible: bool,
    /// Derived series (e.g. the unsmoothed companion of a smoothed line).
    #[serde(default)]
    pub aux: bool,
    #[serde(default)]
    pub opacity: Option<f64>,
}

impl DataSeriesMetadata {
    #[must_use]
    pub fn new(id: impl Into<String>, color: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            color: color.into(),
            visible: true,
            aux: false,
            opacity: None,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn with_aux(mut self, aux: bool) -> Self {
        self.aux = aux;
        self
    }

    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Whether the series takes part in extent and tooltip computations.
    #[must_use]
    pub fn is_primary_visible(&self) -> bool {
        self.visible && !self.aux
    }
}

/// Metadata keyed by series id, in caller order.
pub type DataSeriesMetadataMap = IndexMap<String, DataSeriesMetadata>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// Domain window `{x: [min, max], y: [min, max]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl Extent {
    #[must_use]
    pub const fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn axis(self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    #[must_use]
    pub fn with_axis(mut self, axis: Axis, range: (f64, f64)) -> Self {
        match axis {
            Axis::X => self.x = range,
            Axis::Y => self.y = range,
        }
        self
    }

    /// Finite ends with `min <= max` on both axes.
    #[must_use]
    pub fn is_valid(self) -> bool {
        is_valid_range(self.x) && is_valid_range(self.y)
    }
}

pub(crate) fn is_valid_range((min, max): (f64, f64)) -> bool {
    min.is_finite() && max.is_finite() && min <= max
}

/// Bounding box of visible data; `None` on an axis without any safe value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DataExtent {
    pub x: Option<(f64, f64)>,
    pub y: Option<(f64, f64)>,
}

/// Axis-aligned rectangle in UI coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle spanning two corners.
    #[must_use]
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        let x = a.0.min(b.0);
        let y = a.1.min(b.1);
        Self {
            x,
            y,
            width: a.0.max(b.0) - x,
            height: a.1.max(b.1) - y,
        }
    }

    #[must_use]
    pub fn is_degenerate(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}
