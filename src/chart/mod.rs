//! Chart core: owns renderer, coordinator and series view, and turns
//! setter calls into coalesced redraws.

mod chart_impl;
mod coordinator;
mod series_view;
mod worker;

pub use chart_impl::MainThreadChart;
pub use coordinator::Coordinator;
pub use series_view::SeriesView;
pub use worker::{WorkerChart, WorkerCommandKind, WorkerEvent};

use std::sync::Arc;

use crate::core::{DataSeries, DataSeriesMetadataMap, Dimension, Extent, ScaleType};
use crate::error::ChartResult;

/// Default stroke width, in pixels, for series lines.
pub const DEFAULT_LINE_WIDTH: f64 = 2.0;

/// Imperative surface shared by the main-thread and worker-backed charts.
///
/// Setters never draw synchronously when coalescing is on; the next
/// [`Chart::flush`] performs at most one redraw for any number of calls.
/// Every method except `dispose` fails with `ChartError::Disposed` once
/// the chart is disposed.
pub trait Chart: Send {
    fn set_metadata(&mut self, metadata: &DataSeriesMetadataMap) -> ChartResult<()>;

    /// The snapshot is shared, not copied, with whoever else holds it.
    fn set_data(&mut self, data: Arc<[DataSeries]>) -> ChartResult<()>;

    fn set_x_scale_type(&mut self, scale_type: ScaleType) -> ChartResult<()>;

    fn set_y_scale_type(&mut self, scale_type: ScaleType) -> ChartResult<()>;

    fn set_view_box(&mut self, view_box: Extent) -> ChartResult<()>;

    fn resize(&mut self, dimension: Dimension) -> ChartResult<()>;

    /// Runs the pending redraw, if any, and dispatches callbacks.
    fn flush(&mut self) -> ChartResult<()>;

    /// Releases the renderer. Idempotent.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

type Callback = Box<dyn FnMut() + Send>;

/// Host hooks fired after a redraw and when the GPU context goes away.
#[derive(Default)]
pub struct ChartCallbacks {
    pub on_draw_end: Option<Callback>,
    pub on_context_lost: Option<Callback>,
}

impl std::fmt::Debug for ChartCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartCallbacks")
            .field("on_draw_end", &self.on_draw_end.is_some())
            .field("on_context_lost", &self.on_context_lost.is_some())
            .finish()
    }
}

impl ChartCallbacks {
    #[must_use]
    pub fn with_on_draw_end(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_draw_end = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn with_on_context_lost(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_context_lost = Some(Box::new(callback));
        self
    }

    pub(crate) fn draw_end(&mut self) {
        if let Some(callback) = self.on_draw_end.as_mut() {
            callback();
        }
    }

    pub(crate) fn context_lost(&mut self) {
        if let Some(callback) = self.on_context_lost.as_mut() {
            callback();
        }
    }
}

#[derive(Debug)]
pub struct ChartOptions {
    pub dimension: Dimension,
    pub callbacks: ChartCallbacks,
    /// When `false`, every setter redraws immediately.
    pub coalesce_updates: bool,
    pub line_width: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            dimension: Dimension::default(),
            callbacks: ChartCallbacks::default(),
            coalesce_updates: true,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

impl ChartOptions {
    #[must_use]
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_callbacks(mut self, callbacks: ChartCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    #[must_use]
    pub fn with_coalesce_updates(mut self, coalesce: bool) -> Self {
        self.coalesce_updates = coalesce;
        self
    }

    #[must_use]
    pub fn with_line_width(mut self, line_width: f64) -> Self {
        self.line_width = line_width;
        self
    }
}
