use crate::core::Dimension;
use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer, RendererType};

/// No-op renderer used by tests and headless usage.
///
/// It still validates frame content and counts calls so tests can assert on
/// draw scheduling without a real backend.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub render_count: usize,
    pub resize_count: usize,
    pub dispose_count: usize,
    pub last_primitive_count: usize,
    pub last_frame: Option<RenderFrame>,
}

impl Renderer for NullRenderer {
    fn renderer_type(&self) -> RendererType {
        RendererType::Svg
    }

    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.render_count += 1;
        self.last_primitive_count = frame.primitives.len();
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn resize(&mut self, _dimension: Dimension) -> ChartResult<()> {
        self.resize_count += 1;
        Ok(())
    }

    fn dispose(&mut self) {
        self.dispose_count += 1;
    }
}
