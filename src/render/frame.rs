use crate::core::Dimension;
use crate::error::{ChartError, ChartResult};
use crate::render::SeriesPrimitive;

/// Visible window in scale space (after `Scale::transform`).
///
/// Renderers project cached scale-space geometry through this window, so a
/// pan or zoom only swaps the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl ViewTransform {
    #[must_use]
    pub const fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        Self { x, y }
    }

    /// Maps a scale-space point to pixels; y grows downward.
    #[must_use]
    pub fn project(&self, dimension: Dimension, point: [f64; 2]) -> [f64; 2] {
        let x_span = self.x.1 - self.x.0;
        let y_span = self.y.1 - self.y.0;
        let x = if x_span == 0.0 {
            0.0
        } else {
            (point[0] - self.x.0) / x_span * dimension.width
        };
        let y = if y_span == 0.0 {
            dimension.height
        } else {
            dimension.height - (point[1] - self.y.0) / y_span * dimension.height
        };
        [x, y]
    }

    /// Orthographic camera as `[x_min, x_max, y_min, y_max]` for GPU uniforms.
    #[must_use]
    pub fn to_f32(&self) -> [f32; 4] {
        [
            self.x.0 as f32,
            self.x.1 as f32,
            self.y.0 as f32,
            self.y.1 as f32,
        ]
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.x.0.is_finite() && self.x.1.is_finite() && self.y.0.is_finite() && self.y.1.is_finite()
    }
}

/// Backend-agnostic scene for one chart draw pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub dimension: Dimension,
    pub camera: ViewTransform,
    pub primitives: Vec<SeriesPrimitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(dimension: Dimension, camera: ViewTransform) -> Self {
        Self {
            dimension,
            camera,
            primitives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_primitive(mut self, primitive: SeriesPrimitive) -> Self {
        self.primitives.push(primitive);
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.dimension.is_well_formed() {
            return Err(ChartError::InvalidDimension {
                width: self.dimension.width,
                height: self.dimension.height,
            });
        }
        if !self.camera.is_valid() {
            return Err(ChartError::InvalidData(
                "camera bounds must be finite".to_owned(),
            ));
        }
        for primitive in &self.primitives {
            primitive.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}
