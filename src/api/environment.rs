use std::sync::Arc;

use tracing::warn;

use crate::error::{ChartError, ChartResult};
use crate::render::{GlContext, HeadlessGlContext, RendererType};

/// Source of GPU contexts for the WebGL backend.
///
/// Called once per renderer construction, including re-creation after a
/// context loss, possibly from a worker thread.
pub trait GlContextProvider: Send + Sync {
    fn create_context(&self) -> ChartResult<Box<dyn GlContext>>;
}

impl GlContextProvider for HeadlessGlContext {
    fn create_context(&self) -> ChartResult<Box<dyn GlContext>> {
        if self.is_context_lost() {
            return Err(ChartError::ContextLost);
        }
        Ok(Box::new(self.clone()))
    }
}

/// Runtime capabilities handed to a [`crate::api::LineChart`].
///
/// Replaces ambient feature probing: a host states what it can offer and
/// the chart picks its backend from that.
#[derive(Clone, Default)]
pub struct ChartEnvironment {
    gl_provider: Option<Arc<dyn GlContextProvider>>,
    background_workers: bool,
}

impl std::fmt::Debug for ChartEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartEnvironment")
            .field("webgl", &self.gl_provider.is_some())
            .field("background_workers", &self.background_workers)
            .finish()
    }
}

impl ChartEnvironment {
    /// No GPU and no workers: SVG on the calling thread.
    #[must_use]
    pub fn headless() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_gl_provider(mut self, provider: Arc<dyn GlContextProvider>) -> Self {
        self.gl_provider = Some(provider);
        self
    }

    #[must_use]
    pub fn with_background_workers(mut self, enabled: bool) -> Self {
        self.background_workers = enabled;
        self
    }

    #[must_use]
    pub fn supports_webgl(&self) -> bool {
        self.gl_provider.is_some()
    }

    /// Workers only ever host the WebGL backend.
    #[must_use]
    pub fn supports_background_worker(&self) -> bool {
        self.background_workers && self.supports_webgl()
    }

    pub(crate) fn gl_provider(&self) -> Option<Arc<dyn GlContextProvider>> {
        self.gl_provider.clone()
    }
}

/// Picks the backend for `preferred`; WebGL degrades to SVG when the
/// environment cannot provide it.
#[must_use]
pub fn resolve_renderer_type(
    preferred: Option<RendererType>,
    environment: &ChartEnvironment,
) -> RendererType {
    match preferred {
        Some(RendererType::Svg) => RendererType::Svg,
        Some(RendererType::WebGl) if environment.supports_webgl() => RendererType::WebGl,
        Some(RendererType::WebGl) => {
            warn!("webgl requested but unavailable, falling back to svg");
            RendererType::Svg
        }
        None if environment.supports_webgl() => RendererType::WebGl,
        None => RendererType::Svg,
    }
}
