use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use bitflags::bitflags;
use tracing::{debug, error, trace, warn};

use crate::api::{ChartEnvironment, LineChartConfig, resolve_renderer_type};
use crate::chart::{Chart, ChartCallbacks, ChartOptions, MainThreadChart, WorkerChart};
use crate::core::{
    Axis, DataPoint, DataSeries, DataSeriesMetadataMap, Dimension, Extent, ExtentOptions,
    ScaleType, compute_data_series_extent_with, create_scale, default_view_box,
};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{
    InteractionEvent, InteractionEvents, InteractionState, InteractiveView, Modifiers, MouseEvent,
    WheelEvent,
};
use crate::render::{Renderer, RendererType, SvgRenderer, SvgSurface, WebGlRenderer};

bitflags! {
    /// Inputs changed since they were last pushed into the chart.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    struct PendingUpdates: u8 {
        const SCALE = 1;
        const METADATA = 1 << 1;
        const DATA = 1 << 2;
        const FIXED_VIEW_BOX = 1 << 3;
        /// The resolved view box must be recomputed and re-sent.
        const VIEW_BOX = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Uninitialized,
    Initialized,
    Disposed,
}

/// Notifications for the host, drained with [`LineChart::take_events`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineChartEvent {
    /// The user zoomed or panned; the host decides whether to feed it back
    /// through [`LineChart::set_user_view_box`].
    ViewBoxChanged { data_extent: Extent },
    /// The user asked to go back to the automatic view box.
    ViewBoxReset,
    ViewBoxOverridden(bool),
    InteractionStateChanged(InteractionState),
    ContextLost,
}

#[derive(Debug, Default)]
struct ChartSignals {
    context_lost: AtomicBool,
    draw_count: AtomicU64,
}

enum ChartBackend {
    MainThread(MainThreadChart),
    Worker(WorkerChart),
}

impl ChartBackend {
    fn as_chart(&mut self) -> &mut dyn Chart {
        match self {
            Self::MainThread(chart) => chart,
            Self::Worker(chart) => chart,
        }
    }
}

/// Line chart component: owns the chart core and the interactive overlay
/// and decides which view box is shown.
///
/// View box priority is user override, then the fixed view box, then the
/// nice default derived from the visible data.
pub struct LineChart {
    config: LineChartConfig,
    environment: ChartEnvironment,
    lifecycle: Lifecycle,
    backend: Option<ChartBackend>,
    renderer_type: RendererType,
    workers_allowed: bool,
    svg_surface: SvgSurface,
    signals: Arc<ChartSignals>,
    context_lost: bool,

    dimension: Dimension,
    series: Arc<[DataSeries]>,
    metadata: DataSeriesMetadataMap,
    x_scale_type: ScaleType,
    y_scale_type: ScaleType,
    fixed_view_box: Option<Extent>,
    user_view_box: Option<Extent>,
    view_box: Extent,
    view_box_overridden: bool,
    pending: PendingUpdates,

    interactive: InteractiveView<DataPoint>,
    events: Vec<LineChartEvent>,
}

impl std::fmt::Debug for LineChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineChart")
            .field("lifecycle", &self.lifecycle)
            .field("renderer_type", &self.renderer_type)
            .field("worker_backed", &self.is_worker_backed())
            .field("view_box", &self.view_box)
            .field("view_box_overridden", &self.view_box_overridden)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl LineChart {
    pub fn new(config: LineChartConfig, environment: ChartEnvironment) -> ChartResult<Self> {
        config.validate()?;
        let renderer_type = resolve_renderer_type(config.preferred_renderer, &environment);

        let mut interactive = InteractiveView::new(Dimension::default())
            .with_zoom_speed(config.scroll_zoom_speed)
            .with_zoom_hint_delay(config.zoom_hint_delay());
        interactive.set_scales(config.x_scale_type, config.y_scale_type);
        interactive.set_tooltip_disabled(config.disable_tooltip);

        let mut pending = PendingUpdates::SCALE | PendingUpdates::VIEW_BOX;
        if config.fixed_view_box.is_some() {
            pending |= PendingUpdates::FIXED_VIEW_BOX;
        }

        Ok(Self {
            environment,
            lifecycle: Lifecycle::Uninitialized,
            backend: None,
            renderer_type,
            workers_allowed: true,
            svg_surface: SvgSurface::new(),
            signals: Arc::new(ChartSignals::default()),
            context_lost: false,
            dimension: Dimension::default(),
            series: Arc::from(Vec::new()),
            metadata: DataSeriesMetadataMap::new(),
            x_scale_type: config.x_scale_type,
            y_scale_type: config.y_scale_type,
            fixed_view_box: config.fixed_view_box,
            user_view_box: None,
            view_box: crate::core::DEFAULT_EXTENT,
            view_box_overridden: false,
            pending,
            interactive,
            events: Vec::new(),
            config,
        })
    }

    /// Builds the renderer for `dimension` and pushes every input set so far.
    pub fn initialize(&mut self, dimension: Dimension) -> ChartResult<()> {
        match self.lifecycle {
            Lifecycle::Initialized => {
                error!("line chart initialized twice");
                return Err(ChartError::AlreadyInitialized);
            }
            Lifecycle::Disposed => {
                error!("line chart initialized after dispose");
                return Err(ChartError::Disposed);
            }
            Lifecycle::Uninitialized => {}
        }
        if !dimension.is_well_formed() {
            return Err(ChartError::InvalidDimension {
                width: dimension.width,
                height: dimension.height,
            });
        }

        self.dimension = dimension;
        self.interactive.set_dimension(dimension);
        self.create_chart()?;
        self.lifecycle = Lifecycle::Initialized;
        self.update_line_chart()
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[must_use]
    pub fn config(&self) -> &LineChartConfig {
        &self.config
    }

    /// Backend actually in use; may differ from the preference after a
    /// fallback.
    #[must_use]
    pub fn renderer_type(&self) -> RendererType {
        self.renderer_type
    }

    #[must_use]
    pub fn is_worker_backed(&self) -> bool {
        matches!(self.backend, Some(ChartBackend::Worker(_)))
    }

    /// Surface the SVG backend draws into.
    #[must_use]
    pub fn svg_surface(&self) -> &SvgSurface {
        &self.svg_surface
    }

    #[must_use]
    pub fn view_box(&self) -> Extent {
        self.view_box
    }

    #[must_use]
    pub fn is_view_box_overridden(&self) -> bool {
        self.view_box_overridden
    }

    #[must_use]
    pub fn is_context_lost(&self) -> bool {
        self.context_lost
    }

    /// Completed repaints since initialization, across renderer rebuilds.
    #[must_use]
    pub fn draw_count(&self) -> u64 {
        self.signals.draw_count.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn interactive_view(&self) -> &InteractiveView<DataPoint> {
        &self.interactive
    }

    pub fn take_events(&mut self) -> Vec<LineChartEvent> {
        std::mem::take(&mut self.events)
    }

    fn ensure_not_disposed(&self, operation: &'static str) -> ChartResult<()> {
        if self.lifecycle == Lifecycle::Disposed {
            error!(operation, "line chart used after dispose");
            return Err(ChartError::Disposed);
        }
        Ok(())
    }

    pub fn set_series_data(&mut self, series: Vec<DataSeries>) -> ChartResult<()> {
        self.ensure_not_disposed("set_series_data")?;
        debug!(series_count = series.len(), "series data updated");
        let series: Arc<[DataSeries]> = series.into();
        self.interactive.set_series_data(Arc::clone(&series));
        self.series = series;
        self.pending |= PendingUpdates::DATA;
        if !self.view_box_overridden {
            self.pending |= PendingUpdates::VIEW_BOX;
        }
        self.update_line_chart()
    }

    pub fn set_metadata(&mut self, metadata: DataSeriesMetadataMap) -> ChartResult<()> {
        self.ensure_not_disposed("set_metadata")?;
        let visibility_changed = visible_set_changed(&self.metadata, &metadata);
        debug!(
            series_count = metadata.len(),
            visibility_changed, "series metadata updated"
        );
        self.interactive.set_metadata(metadata.clone());
        self.metadata = metadata;
        self.pending |= PendingUpdates::METADATA;
        if !self.view_box_overridden && visibility_changed {
            self.pending |= PendingUpdates::VIEW_BOX;
        }
        self.update_line_chart()
    }

    pub fn set_x_scale_type(&mut self, scale_type: ScaleType) -> ChartResult<()> {
        self.set_scale_types(scale_type, self.y_scale_type)
    }

    pub fn set_y_scale_type(&mut self, scale_type: ScaleType) -> ChartResult<()> {
        self.set_scale_types(self.x_scale_type, scale_type)
    }

    /// Changing a scale type drops any user view box override.
    pub fn set_scale_types(&mut self, x_scale: ScaleType, y_scale: ScaleType) -> ChartResult<()> {
        self.ensure_not_disposed("set_scale_types")?;
        if self.x_scale_type == x_scale && self.y_scale_type == y_scale {
            return Ok(());
        }
        debug!(?x_scale, ?y_scale, "scale types updated");
        self.x_scale_type = x_scale;
        self.y_scale_type = y_scale;
        self.interactive.set_scales(x_scale, y_scale);
        self.user_view_box = None;
        self.set_view_box_overridden(false);
        self.pending |= PendingUpdates::SCALE | PendingUpdates::VIEW_BOX;
        self.update_line_chart()
    }

    pub fn set_ignore_y_outliers(&mut self, ignore: bool) -> ChartResult<()> {
        self.ensure_not_disposed("set_ignore_y_outliers")?;
        if self.config.ignore_y_outliers == ignore {
            return Ok(());
        }
        self.config.ignore_y_outliers = ignore;
        if !self.view_box_overridden {
            self.pending |= PendingUpdates::VIEW_BOX;
        }
        self.update_line_chart()
    }

    pub fn set_fixed_view_box(&mut self, view_box: Option<Extent>) -> ChartResult<()> {
        self.ensure_not_disposed("set_fixed_view_box")?;
        if let Some(extent) = view_box.filter(|extent| !extent.is_valid()) {
            warn!(?extent, "ignoring invalid fixed view box");
            return Ok(());
        }
        self.fixed_view_box = view_box;
        self.pending |= PendingUpdates::FIXED_VIEW_BOX;
        if !self.view_box_overridden {
            self.pending |= PendingUpdates::VIEW_BOX;
        }
        self.update_line_chart()
    }

    /// Sets or clears the user (zoomed/panned) view box. `Some` overrides
    /// both the fixed and the data-derived view box.
    pub fn set_user_view_box(&mut self, view_box: Option<Extent>) -> ChartResult<()> {
        self.ensure_not_disposed("set_user_view_box")?;
        if let Some(extent) = view_box.filter(|extent| !extent.is_valid()) {
            warn!(?extent, "ignoring invalid user view box");
            return Ok(());
        }
        self.user_view_box = view_box;
        self.set_view_box_overridden(view_box.is_some());
        self.pending |= PendingUpdates::VIEW_BOX;
        self.update_line_chart()
    }

    pub fn set_disable_tooltip(&mut self, disable: bool) -> ChartResult<()> {
        self.ensure_not_disposed("set_disable_tooltip")?;
        self.config.disable_tooltip = disable;
        self.interactive.set_tooltip_disabled(disable);
        Ok(())
    }

    /// The host reports a new container size; data and view box are kept.
    pub fn resize(&mut self, dimension: Dimension) -> ChartResult<()> {
        self.ensure_not_disposed("resize")?;
        if !dimension.is_well_formed() {
            return Err(ChartError::InvalidDimension {
                width: dimension.width,
                height: dimension.height,
            });
        }
        self.dimension = dimension;
        self.interactive.set_dimension(dimension);
        let resized = match self.backend.as_mut() {
            Some(backend) => backend.as_chart().resize(dimension),
            None => Ok(()),
        };
        self.recover_closed_worker(resized)
    }

    /// Emits a view box change that replaces one axis of the current view.
    pub fn on_view_box_changed_from_axis(
        &mut self,
        axis: Axis,
        extent: (f64, f64),
    ) -> ChartResult<()> {
        self.ensure_not_disposed("on_view_box_changed_from_axis")?;
        let data_extent = self.view_box.with_axis(axis, extent);
        self.events
            .push(LineChartEvent::ViewBoxChanged { data_extent });
        Ok(())
    }

    /// Draws pending changes: the animation-frame step of the host loop.
    pub fn flush(&mut self) -> ChartResult<()> {
        match self.lifecycle {
            Lifecycle::Uninitialized => return Err(ChartError::NotInitialized),
            Lifecycle::Disposed => {
                error!(operation = "flush", "line chart used after dispose");
                return Err(ChartError::Disposed);
            }
            Lifecycle::Initialized => {}
        }
        self.update_line_chart()?;

        let flushed = match self.backend.as_mut() {
            Some(backend) => backend.as_chart().flush(),
            None => Ok(()),
        };
        if flushed == Err(ChartError::WorkerChannelClosed) && self.is_worker_backed() {
            self.fall_back_to_main_thread()?;
            if let Some(backend) = self.backend.as_mut() {
                backend.as_chart().flush()?;
            }
        } else {
            flushed?;
        }

        self.check_context_lost();
        Ok(())
    }

    /// Waits until a worker-backed chart has drawn every command sent so
    /// far. Returns immediately for main-thread charts.
    pub fn wait_for_worker_idle(&mut self, timeout: Duration) -> ChartResult<bool> {
        let idle = match self.backend.as_mut() {
            Some(ChartBackend::Worker(worker)) => worker.wait_for_idle(timeout),
            _ => Ok(true),
        };
        let idle = match idle {
            Err(ChartError::WorkerChannelClosed) => {
                self.fall_back_to_main_thread()?;
                true
            }
            other => other?,
        };
        self.check_context_lost();
        Ok(idle)
    }

    pub fn dispose(&mut self) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        if let Some(mut backend) = self.backend.take() {
            backend.as_chart().dispose();
        }
        self.interactive.dispose();
        self.lifecycle = Lifecycle::Disposed;
        debug!(draw_count = self.draw_count(), "line chart disposed");
    }

    fn set_view_box_overridden(&mut self, overridden: bool) {
        if self.view_box_overridden != overridden {
            self.view_box_overridden = overridden;
            self.events
                .push(LineChartEvent::ViewBoxOverridden(overridden));
        }
    }

    fn default_view_box(&self) -> Extent {
        let options = ExtentOptions::default()
            .with_scales(self.x_scale_type, self.y_scale_type)
            .with_ignore_y_outliers(self.config.ignore_y_outliers);
        let data_extent = compute_data_series_extent_with(&self.series, &self.metadata, options);
        default_view_box(
            data_extent,
            create_scale(self.x_scale_type),
            create_scale(self.y_scale_type),
        )
    }

    fn resolve_view_box(&self) -> Extent {
        match (self.view_box_overridden, self.user_view_box, self.fixed_view_box) {
            (true, Some(user), _) => user,
            (false, _, Some(fixed)) => fixed,
            (false, _, None) if self.pending.contains(PendingUpdates::VIEW_BOX) => {
                self.default_view_box()
            }
            _ => self.view_box,
        }
    }

    /// Pushes changed inputs into the chart, moving off a dead worker first
    /// if needed.
    fn update_line_chart(&mut self) -> ChartResult<()> {
        let pushed = self.push_pending_updates();
        self.recover_closed_worker(pushed)
    }

    /// Replaces a worker backend whose thread is gone with a main-thread
    /// chart. Pending bits left by the failed send are re-pushed there.
    fn recover_closed_worker(&mut self, result: ChartResult<()>) -> ChartResult<()> {
        match result {
            Err(ChartError::WorkerChannelClosed) if self.is_worker_backed() => {
                self.fall_back_to_main_thread()
            }
            other => other,
        }
    }

    /// Pushes changed inputs into the chart in scale, metadata, data, view
    /// box order. No-op until initialized.
    fn push_pending_updates(&mut self) -> ChartResult<()> {
        self.recover_renderer_if_needed()?;
        if self.lifecycle != Lifecycle::Initialized {
            return Ok(());
        }

        let view_box = self.resolve_view_box();
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };
        let chart = backend.as_chart();

        if self.pending.contains(PendingUpdates::SCALE) {
            chart.set_x_scale_type(self.x_scale_type)?;
            chart.set_y_scale_type(self.y_scale_type)?;
            self.pending.remove(PendingUpdates::SCALE);
        }
        if self.pending.contains(PendingUpdates::METADATA) {
            chart.set_metadata(&self.metadata)?;
            self.pending.remove(PendingUpdates::METADATA);
        }
        if self.pending.contains(PendingUpdates::DATA) {
            chart.set_data(Arc::clone(&self.series))?;
            self.pending.remove(PendingUpdates::DATA);
        }

        self.view_box = view_box;
        if self
            .pending
            .intersects(PendingUpdates::FIXED_VIEW_BOX | PendingUpdates::VIEW_BOX)
        {
            trace!(?view_box, "view box resolved");
            chart.set_view_box(view_box)?;
            self.interactive.set_view_extent(view_box);
            self.pending
                .remove(PendingUpdates::FIXED_VIEW_BOX | PendingUpdates::VIEW_BOX);
        }
        Ok(())
    }

    fn check_context_lost(&mut self) {
        if !self.signals.context_lost.swap(false, Ordering::AcqRel) {
            return;
        }
        warn!(renderer = ?self.renderer_type, "rendering context lost, renderer will be rebuilt");
        self.context_lost = true;
        if let Some(mut backend) = self.backend.take() {
            backend.as_chart().dispose();
        }
        self.events.push(LineChartEvent::ContextLost);
    }

    /// Rebuilds the renderer after a context loss and re-sends every input.
    fn recover_renderer_if_needed(&mut self) -> ChartResult<()> {
        if !self.context_lost || self.lifecycle != Lifecycle::Initialized {
            return Ok(());
        }
        self.create_chart()?;
        self.pending = PendingUpdates::all();
        self.context_lost = false;
        debug!(renderer = ?self.renderer_type, "renderer recovered after context loss");
        Ok(())
    }

    fn fall_back_to_main_thread(&mut self) -> ChartResult<()> {
        warn!("worker channel closed, falling back to main thread rendering");
        if let Some(mut backend) = self.backend.take() {
            backend.as_chart().dispose();
        }
        self.workers_allowed = false;
        self.create_chart()?;
        self.pending = PendingUpdates::all();
        self.push_pending_updates()
    }

    fn chart_options(&self) -> ChartOptions {
        let draw_signals = Arc::clone(&self.signals);
        let lost_signals = Arc::clone(&self.signals);
        let callbacks = ChartCallbacks::default()
            .with_on_draw_end(move || {
                draw_signals.draw_count.fetch_add(1, Ordering::AcqRel);
            })
            .with_on_context_lost(move || {
                lost_signals.context_lost.store(true, Ordering::Release);
            });
        ChartOptions::new(self.dimension)
            .with_callbacks(callbacks)
            .with_coalesce_updates(self.config.coalesce_updates)
            .with_line_width(self.config.line_width)
    }

    fn create_chart(&mut self) -> ChartResult<()> {
        if let Some(mut backend) = self.backend.take() {
            backend.as_chart().dispose();
        }
        self.signals.context_lost.store(false, Ordering::Release);
        self.renderer_type =
            resolve_renderer_type(self.config.preferred_renderer, &self.environment);

        if self.renderer_type == RendererType::WebGl {
            if let Some(backend) = self.create_webgl_chart()? {
                self.backend = Some(backend);
                return Ok(());
            }
            self.renderer_type = RendererType::Svg;
        }

        let renderer: Box<dyn Renderer> = Box::new(SvgRenderer::new(self.svg_surface.clone()));
        let chart = MainThreadChart::new(renderer, self.chart_options())?;
        debug!("svg chart created");
        self.backend = Some(ChartBackend::MainThread(chart));
        Ok(())
    }

    /// `None` when no GL context can be had and SVG should be used.
    fn create_webgl_chart(&self) -> ChartResult<Option<ChartBackend>> {
        let Some(provider) = self.environment.gl_provider() else {
            return Ok(None);
        };
        let device_pixel_ratio = self.config.device_pixel_ratio;

        if self.workers_allowed && self.environment.supports_background_worker() {
            let worker_provider = Arc::clone(&provider);
            let factory = move || -> ChartResult<Box<dyn Renderer>> {
                let context = worker_provider.create_context()?;
                Ok(Box::new(WebGlRenderer::new(context, device_pixel_ratio)))
            };
            match WorkerChart::spawn(factory, self.chart_options()) {
                Ok(worker) => {
                    debug!("webgl chart created on worker");
                    return Ok(Some(ChartBackend::Worker(worker)));
                }
                Err(err) => {
                    warn!(error = %err, "worker chart unavailable, rendering on main thread");
                }
            }
        }

        match provider.create_context() {
            Ok(context) => {
                let renderer: Box<dyn Renderer> =
                    Box::new(WebGlRenderer::new(context, device_pixel_ratio));
                let chart = MainThreadChart::new(renderer, self.chart_options())?;
                debug!("webgl chart created");
                Ok(Some(ChartBackend::MainThread(chart)))
            }
            Err(err) => {
                warn!(error = %err, "gl context unavailable, falling back to svg");
                Ok(None)
            }
        }
    }

    fn dispatch(&mut self, events: InteractionEvents) {
        for event in events {
            let mapped = match event {
                InteractionEvent::ViewExtentChanged { data_extent } => {
                    LineChartEvent::ViewBoxChanged { data_extent }
                }
                InteractionEvent::ViewExtentReset => LineChartEvent::ViewBoxReset,
                InteractionEvent::StateChanged(state) => {
                    LineChartEvent::InteractionStateChanged(state)
                }
            };
            self.events.push(mapped);
        }
    }

    pub fn on_mouse_down(&mut self, event: &MouseEvent) -> ChartResult<()> {
        self.ensure_not_disposed("on_mouse_down")?;
        let events = self.interactive.on_mouse_down(event)?;
        self.dispatch(events);
        Ok(())
    }

    pub fn on_mouse_up(&mut self, event: &MouseEvent) -> ChartResult<()> {
        self.ensure_not_disposed("on_mouse_up")?;
        let events = self.interactive.on_mouse_up(event)?;
        self.dispatch(events);
        Ok(())
    }

    pub fn on_mouse_move(&mut self, event: &MouseEvent) -> ChartResult<()> {
        self.ensure_not_disposed("on_mouse_move")?;
        let events = self.interactive.on_mouse_move(event)?;
        self.dispatch(events);
        Ok(())
    }

    pub fn on_mouse_enter(&mut self, event: &MouseEvent) -> ChartResult<()> {
        self.ensure_not_disposed("on_mouse_enter")?;
        self.interactive.on_mouse_enter(event)
    }

    pub fn on_mouse_leave(&mut self) -> ChartResult<()> {
        self.ensure_not_disposed("on_mouse_leave")?;
        let events = self.interactive.on_mouse_leave()?;
        self.dispatch(events);
        Ok(())
    }

    pub fn on_double_click(&mut self) -> ChartResult<()> {
        self.ensure_not_disposed("on_double_click")?;
        let events = self.interactive.on_double_click()?;
        self.dispatch(events);
        Ok(())
    }

    pub fn on_wheel(&mut self, event: &WheelEvent, now: Instant) -> ChartResult<()> {
        self.ensure_not_disposed("on_wheel")?;
        let events = self.interactive.on_wheel(event, now)?;
        self.dispatch(events);
        Ok(())
    }

    pub fn on_key_change(&mut self, modifiers: Modifiers) {
        self.interactive.on_key_change(modifiers);
    }

    /// Advances overlay timers such as the zoom hint.
    pub fn tick(&mut self, now: Instant) {
        self.interactive.tick(now);
    }
}

/// True when a series appeared, disappeared or flipped visibility.
fn visible_set_changed(previous: &DataSeriesMetadataMap, next: &DataSeriesMetadataMap) -> bool {
    if previous.len() != next.len() {
        return true;
    }
    next.iter().any(|(id, metadata)| {
        previous
            .get(id)
            .is_none_or(|prev| prev.visible != metadata.visible)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataSeriesMetadata;

    fn metadata(entries: &[(&str, bool)]) -> DataSeriesMetadataMap {
        entries
            .iter()
            .map(|(id, visible)| {
                (
                    (*id).to_owned(),
                    DataSeriesMetadata::new(*id, "#f00").with_visible(*visible),
                )
            })
            .collect()
    }

    #[test]
    fn visible_set_detects_visibility_flip() {
        let before = metadata(&[("a", true), ("b", true)]);
        let after = metadata(&[("a", true), ("b", false)]);
        assert!(visible_set_changed(&before, &after));
    }

    #[test]
    fn visible_set_ignores_color_changes() {
        let before = metadata(&[("a", true)]);
        let mut after = before.clone();
        if let Some(entry) = after.get_mut("a") {
            entry.color = "#0f0".to_owned();
        }
        assert!(!visible_set_changed(&before, &after));
    }

    #[test]
    fn series_snapshot_is_shared_not_copied() {
        let mut chart = LineChart::new(LineChartConfig::default(), ChartEnvironment::headless())
            .expect("chart");
        chart
            .initialize(Dimension::new(100.0, 100.0))
            .expect("initialize");
        chart
            .set_series_data(vec![DataSeries::from_xy("a", &[(0.0, 0.0), (1.0, 1.0)])])
            .expect("data");

        let Some(ChartBackend::MainThread(backend)) = chart.backend.as_ref() else {
            panic!("headless charts render on the main thread");
        };
        let shared = chart.series.as_ptr();
        assert!(std::ptr::eq(shared, chart.interactive.series().as_ptr()));
        assert!(std::ptr::eq(shared, backend.series_view().data().as_ptr()));
    }

    #[test]
    fn visible_set_detects_new_series() {
        let before = metadata(&[("a", true)]);
        let after = metadata(&[("b", true)]);
        assert!(visible_set_changed(&before, &after));
    }
}
