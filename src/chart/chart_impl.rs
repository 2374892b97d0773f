use std::sync::Arc;

use tracing::{debug, error, trace, warn};

use crate::chart::{Chart, ChartCallbacks, ChartOptions, Coordinator, SeriesView};
use crate::core::{DataSeries, DataSeriesMetadataMap, Dimension, Extent, ScaleType};
use crate::error::{ChartError, ChartResult};
use crate::render::{RenderFrame, Renderer};

/// Chart that renders on the calling thread.
pub struct MainThreadChart<R: Renderer = Box<dyn Renderer>> {
    renderer: R,
    coordinator: Coordinator,
    series_view: SeriesView,
    metadata: DataSeriesMetadataMap,
    callbacks: ChartCallbacks,
    coalesce_updates: bool,
    line_width: f64,
    redraw_pending: bool,
    redraw_count: u64,
    context_lost: bool,
    disposed: bool,
}

impl<R: Renderer> std::fmt::Debug for MainThreadChart<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainThreadChart")
            .field("renderer", &self.renderer.renderer_type())
            .field("coordinator", &self.coordinator)
            .field("redraw_pending", &self.redraw_pending)
            .field("redraw_count", &self.redraw_count)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl<R: Renderer> MainThreadChart<R> {
    pub fn new(mut renderer: R, options: ChartOptions) -> ChartResult<Self> {
        if !options.dimension.is_well_formed() {
            return Err(ChartError::InvalidDimension {
                width: options.dimension.width,
                height: options.dimension.height,
            });
        }
        if !options.line_width.is_finite() || options.line_width <= 0.0 {
            return Err(ChartError::InvalidData(
                "line width must be finite and > 0".to_owned(),
            ));
        }
        renderer.resize(options.dimension)?;

        debug!(
            renderer = ?renderer.renderer_type(),
            width = options.dimension.width,
            height = options.dimension.height,
            "main thread chart created"
        );
        Ok(Self {
            renderer,
            coordinator: Coordinator::new(options.dimension),
            series_view: SeriesView::new(),
            metadata: DataSeriesMetadataMap::new(),
            callbacks: options.callbacks,
            coalesce_updates: options.coalesce_updates,
            line_width: options.line_width,
            redraw_pending: false,
            redraw_count: 0,
            context_lost: false,
            disposed: false,
        })
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn series_view(&self) -> &SeriesView {
        &self.series_view
    }

    #[must_use]
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    #[must_use]
    pub fn redraw_count(&self) -> u64 {
        self.redraw_count
    }

    #[must_use]
    pub fn is_redraw_pending(&self) -> bool {
        self.redraw_pending
    }

    #[must_use]
    pub fn is_context_lost(&self) -> bool {
        self.context_lost
    }

    fn ensure_live(&self, operation: &'static str) -> ChartResult<()> {
        if self.disposed {
            error!(operation, "chart used after dispose");
            return Err(ChartError::Disposed);
        }
        Ok(())
    }

    fn schedule_redraw(&mut self) -> ChartResult<()> {
        self.redraw_pending = true;
        if self.coalesce_updates {
            return Ok(());
        }
        self.redraw()
    }

    fn redraw(&mut self) -> ChartResult<()> {
        self.redraw_pending = false;
        if self.context_lost {
            trace!("skipping redraw on lost context");
            return Ok(());
        }

        self.series_view.update_geometry(&self.coordinator);
        let frame = RenderFrame {
            dimension: self.coordinator.dimension(),
            camera: self.coordinator.camera(),
            primitives: self.series_view.primitives(&self.metadata, self.line_width),
        };

        match self.renderer.render(&frame) {
            Ok(()) => {
                self.redraw_count += 1;
                trace!(
                    redraw_count = self.redraw_count,
                    primitives = frame.primitives.len(),
                    "chart redrawn"
                );
                self.callbacks.draw_end();
                Ok(())
            }
            Err(ChartError::ContextLost) => {
                warn!("renderer context lost, waiting for host to rebuild the chart");
                self.context_lost = true;
                self.callbacks.context_lost();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

impl<R: Renderer> Chart for MainThreadChart<R> {
    fn set_metadata(&mut self, metadata: &DataSeriesMetadataMap) -> ChartResult<()> {
        self.ensure_live("set_metadata")?;
        self.metadata = metadata.clone();
        self.schedule_redraw()
    }

    fn set_data(&mut self, data: Arc<[DataSeries]>) -> ChartResult<()> {
        self.ensure_live("set_data")?;
        self.series_view.set_data(data);
        self.schedule_redraw()
    }

    fn set_x_scale_type(&mut self, scale_type: ScaleType) -> ChartResult<()> {
        self.ensure_live("set_x_scale_type")?;
        if self.coordinator.set_x_scale(scale_type) {
            self.schedule_redraw()?;
        }
        Ok(())
    }

    fn set_y_scale_type(&mut self, scale_type: ScaleType) -> ChartResult<()> {
        self.ensure_live("set_y_scale_type")?;
        if self.coordinator.set_y_scale(scale_type) {
            self.schedule_redraw()?;
        }
        Ok(())
    }

    fn set_view_box(&mut self, view_box: Extent) -> ChartResult<()> {
        self.ensure_live("set_view_box")?;
        if !view_box.is_valid() {
            warn!(?view_box, "ignoring invalid view box");
            return Ok(());
        }
        self.coordinator.set_view_box(view_box);
        self.schedule_redraw()
    }

    fn resize(&mut self, dimension: Dimension) -> ChartResult<()> {
        self.ensure_live("resize")?;
        if !dimension.is_well_formed() {
            return Err(ChartError::InvalidDimension {
                width: dimension.width,
                height: dimension.height,
            });
        }
        self.renderer.resize(dimension)?;
        self.coordinator.set_dimension(dimension);
        self.schedule_redraw()
    }

    fn flush(&mut self) -> ChartResult<()> {
        self.ensure_live("flush")?;
        if self.redraw_pending {
            self.redraw()?;
        }
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.redraw_pending = false;
        self.renderer.dispose();
        debug!(redraw_count = self.redraw_count, "chart disposed");
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}
