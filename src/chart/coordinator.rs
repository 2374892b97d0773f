use crate::core::{DEFAULT_EXTENT, Dimension, Extent, Scale, ScaleType, create_scale};
use crate::render::ViewTransform;

/// Owns the view state shared by every drawable of one chart: axis scales,
/// the data-space view box and the surface size.
///
/// Every mutation bumps `update_id`, letting views skip work when nothing
/// they depend on changed.
#[derive(Debug, Clone)]
pub struct Coordinator {
    x_scale: &'static dyn Scale,
    y_scale: &'static dyn Scale,
    view_box: Extent,
    dimension: Dimension,
    update_id: u64,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(Dimension::default())
    }
}

impl Coordinator {
    #[must_use]
    pub fn new(dimension: Dimension) -> Self {
        Self {
            x_scale: create_scale(ScaleType::Linear),
            y_scale: create_scale(ScaleType::Linear),
            view_box: DEFAULT_EXTENT,
            dimension,
            update_id: 0,
        }
    }

    #[must_use]
    pub fn x_scale(&self) -> &'static dyn Scale {
        self.x_scale
    }

    #[must_use]
    pub fn y_scale(&self) -> &'static dyn Scale {
        self.y_scale
    }

    #[must_use]
    pub fn view_box(&self) -> Extent {
        self.view_box
    }

    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    #[must_use]
    pub fn update_id(&self) -> u64 {
        self.update_id
    }

    /// Returns `true` when the scale actually changed.
    pub fn set_x_scale(&mut self, scale_type: ScaleType) -> bool {
        if self.x_scale.scale_type() == scale_type {
            return false;
        }
        self.x_scale = create_scale(scale_type);
        self.update_id += 1;
        true
    }

    /// Returns `true` when the scale actually changed.
    pub fn set_y_scale(&mut self, scale_type: ScaleType) -> bool {
        if self.y_scale.scale_type() == scale_type {
            return false;
        }
        self.y_scale = create_scale(scale_type);
        self.update_id += 1;
        true
    }

    pub fn set_view_box(&mut self, view_box: Extent) {
        if self.view_box != view_box {
            self.view_box = view_box;
            self.update_id += 1;
        }
    }

    pub fn set_dimension(&mut self, dimension: Dimension) {
        if self.dimension != dimension {
            self.dimension = dimension;
            self.update_id += 1;
        }
    }

    /// View box in scale space, as consumed by renderers.
    #[must_use]
    pub fn camera(&self) -> ViewTransform {
        ViewTransform::new(
            (
                self.x_scale.transform(self.view_box.x.0),
                self.x_scale.transform(self.view_box.x.1),
            ),
            (
                self.y_scale.transform(self.view_box.y.0),
                self.y_scale.transform(self.view_box.y.1),
            ),
        )
    }

    /// Scale-space coordinates of a data point.
    #[must_use]
    pub fn transform_point(&self, x: f64, y: f64) -> [f64; 2] {
        [self.x_scale.transform(x), self.y_scale.transform(y)]
    }

    /// Pixel position of a data point; y grows downward.
    #[must_use]
    pub fn to_pixel(&self, x: f64, y: f64) -> [f64; 2] {
        [
            self.x_scale
                .forward(self.view_box.x, (0.0, self.dimension.width), x),
            self.y_scale
                .forward(self.view_box.y, (self.dimension.height, 0.0), y),
        ]
    }
}
