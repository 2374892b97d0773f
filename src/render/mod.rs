mod frame;
mod headless_gl;
mod null_renderer;
mod primitives;
mod svg;
mod webgl;

pub use frame::{RenderFrame, ViewTransform};
pub use headless_gl::{GlCall, HeadlessGlContext};
pub use null_renderer::NullRenderer;
pub use primitives::{
    CIRCLE_RADIUS, Color, PaintStyle, Polyline, SeriesPrimitive, Shape, TRIANGLE_SIZE,
    triangle_vertices,
};
pub use svg::{SvgDocument, SvgElement, SvgElementKind, SvgRenderStats, SvgRenderer, SvgSurface};
pub use webgl::{
    BufferHandle, DrawCall, DrawMode, GlContext, LineVertex, WebGlRenderStats, WebGlRenderer,
};

use serde::{Deserialize, Serialize};

use crate::core::Dimension;
use crate::error::ChartResult;

/// Rendering backend family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererType {
    #[default]
    Svg,
    WebGl,
}

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized `RenderFrame` and keep their own
/// per-primitive caches keyed by `SeriesPrimitive::cache_id`; a primitive
/// missing from the next frame is removed.
pub trait Renderer: Send {
    fn renderer_type(&self) -> RendererType;

    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;

    fn resize(&mut self, dimension: Dimension) -> ChartResult<()>;

    /// Releases backend resources. Idempotent.
    fn dispose(&mut self);

    fn is_context_lost(&self) -> bool {
        false
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn renderer_type(&self) -> RendererType {
        (**self).renderer_type()
    }

    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        (**self).render(frame)
    }

    fn resize(&mut self, dimension: Dimension) -> ChartResult<()> {
        (**self).resize(dimension)
    }

    fn dispose(&mut self) {
        (**self).dispose();
    }

    fn is_context_lost(&self) -> bool {
        (**self).is_context_lost()
    }
}
