use std::sync::Arc;
use std::time::{Duration, Instant};

use smallvec::SmallVec;
use tracing::{debug, error, trace};

use crate::core::{
    DEFAULT_EXTENT, DataPoint, DataSeries, DataSeriesMetadataMap, Dimension, Extent, Rect, Scale,
    ScaleType, SeriesPoint, create_scale,
};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{
    InteractionEvent, InteractionState, Modifiers, MouseButtons, MouseEvent,
    SCROLL_ZOOM_SPEED_FACTOR, TooltipDatum, WheelEvent, extent_from_zoom_box, find_closest_index,
    proposed_view_extent_on_pan, proposed_view_extent_on_zoom, scale_range,
};

/// How long the "hold alt to zoom" hint stays up after a plain wheel event.
pub const ZOOM_HINT_DELAY: Duration = Duration::from_millis(3000);

/// Events produced by one input; rarely more than a state change plus an
/// extent change.
pub type InteractionEvents = SmallVec<[InteractionEvent; 2]>;

/// Overlay that turns pointer input into view-box requests and tooltips.
///
/// It never changes the view box itself: proposed extents are emitted as
/// [`InteractionEvent::ViewExtentChanged`] and the owner feeds the accepted
/// view box back through [`InteractiveView::set_view_extent`].
#[derive(Debug)]
pub struct InteractiveView<P: SeriesPoint = DataPoint> {
    series: Arc<[DataSeries<P>]>,
    metadata: DataSeriesMetadataMap,
    view_extent: Extent,
    x_scale: &'static dyn Scale,
    y_scale: &'static dyn Scale,
    dimension: Dimension,
    tooltip_disabled: bool,
    zoom_speed: f64,
    zoom_hint_delay: Duration,

    state: InteractionState,
    drag_start: Option<(f64, f64)>,
    zoom_box: Rect,
    special_key_pressed: bool,
    cursor_inside: bool,
    cursor: Option<(f64, f64)>,
    cursored_data: Vec<TooltipDatum<P>>,
    zoom_hint_deadline: Option<Instant>,
    disposed: bool,
}

impl<P: SeriesPoint> Default for InteractiveView<P> {
    fn default() -> Self {
        Self::new(Dimension::default())
    }
}

impl<P: SeriesPoint> InteractiveView<P> {
    #[must_use]
    pub fn new(dimension: Dimension) -> Self {
        Self {
            series: Arc::from(Vec::new()),
            metadata: DataSeriesMetadataMap::new(),
            view_extent: DEFAULT_EXTENT,
            x_scale: create_scale(ScaleType::Linear),
            y_scale: create_scale(ScaleType::Linear),
            dimension,
            tooltip_disabled: false,
            zoom_speed: SCROLL_ZOOM_SPEED_FACTOR,
            zoom_hint_delay: ZOOM_HINT_DELAY,
            state: InteractionState::None,
            drag_start: None,
            zoom_box: Rect::default(),
            special_key_pressed: false,
            cursor_inside: false,
            cursor: None,
            cursored_data: Vec::new(),
            zoom_hint_deadline: None,
            disposed: false,
        }
    }

    #[must_use]
    pub fn with_zoom_speed(mut self, zoom_speed: f64) -> Self {
        self.zoom_speed = zoom_speed;
        self
    }

    #[must_use]
    pub fn with_zoom_hint_delay(mut self, delay: Duration) -> Self {
        self.zoom_hint_delay = delay;
        self
    }

    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Current drag-zoom rectangle; meaningful while drag-zooming.
    #[must_use]
    pub fn zoom_box(&self) -> Rect {
        self.zoom_box
    }

    #[must_use]
    pub fn view_extent(&self) -> Extent {
        self.view_extent
    }

    #[must_use]
    pub fn cursored_data(&self) -> &[TooltipDatum<P>] {
        &self.cursored_data
    }

    #[must_use]
    pub fn is_tooltip_visible(&self) -> bool {
        !self.tooltip_disabled && self.cursor_inside && !self.cursored_data.is_empty()
    }

    /// Cursor position in overlay pixels while it is inside.
    #[must_use]
    pub fn cursor_location(&self) -> Option<(f64, f64)> {
        self.cursor.filter(|_| self.cursor_inside)
    }

    /// Cursor position in data coordinates.
    #[must_use]
    pub fn cursor_data_location(&self) -> Option<(f64, f64)> {
        let (x, y) = self.cursor_location()?;
        let (_, y_range) = scale_range(self.dimension);
        Some((
            self.data_x(x),
            self.y_scale.reverse(self.view_extent.y, y_range, y),
        ))
    }

    #[must_use]
    pub fn is_special_key_pressed(&self) -> bool {
        self.special_key_pressed
    }

    #[must_use]
    pub fn is_zoom_hint_visible(&self) -> bool {
        self.zoom_hint_deadline.is_some()
    }

    #[must_use]
    pub fn series(&self) -> &[DataSeries<P>] {
        &self.series
    }

    pub fn set_series_data(&mut self, series: impl Into<Arc<[DataSeries<P>]>>) {
        self.series = series.into();
        self.refresh_tooltip();
    }

    pub fn set_metadata(&mut self, metadata: DataSeriesMetadataMap) {
        self.metadata = metadata;
        self.refresh_tooltip();
    }

    pub fn set_view_extent(&mut self, view_extent: Extent) {
        self.view_extent = view_extent;
        self.refresh_tooltip();
    }

    pub fn set_scales(&mut self, x_scale: ScaleType, y_scale: ScaleType) {
        self.x_scale = create_scale(x_scale);
        self.y_scale = create_scale(y_scale);
        self.refresh_tooltip();
    }

    pub fn set_dimension(&mut self, dimension: Dimension) {
        self.dimension = dimension;
        self.refresh_tooltip();
    }

    pub fn set_tooltip_disabled(&mut self, disabled: bool) {
        self.tooltip_disabled = disabled;
        self.refresh_tooltip();
    }

    fn ensure_live(&self, operation: &'static str) -> ChartResult<()> {
        if self.disposed {
            error!(operation, "interactive view used after dispose");
            return Err(ChartError::Disposed);
        }
        Ok(())
    }

    fn transition(&mut self, next: InteractionState, events: &mut InteractionEvents) {
        if self.state == next {
            return;
        }
        trace!(from = ?self.state, to = ?next, "interaction state changed");
        self.state = next;
        if next == InteractionState::None {
            self.zoom_box = Rect::default();
        }
        events.push(InteractionEvent::StateChanged(next));
    }

    fn data_x(&self, pixel: f64) -> f64 {
        let (x_range, _) = scale_range(self.dimension);
        self.x_scale.reverse(self.view_extent.x, x_range, pixel)
    }

    fn pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let (x_range, y_range) = scale_range(self.dimension);
        (
            self.x_scale.forward(self.view_extent.x, x_range, x),
            self.y_scale.forward(self.view_extent.y, y_range, y),
        )
    }

    pub fn on_mouse_down(&mut self, event: &MouseEvent) -> ChartResult<InteractionEvents> {
        self.ensure_live("on_mouse_down")?;
        let mut events = InteractionEvents::new();
        if !event.buttons.intersects(MouseButtons::PRIMARY) {
            return Ok(events);
        }

        let next = if event.modifiers.is_pan_modifier() {
            InteractionState::Panning
        } else {
            InteractionState::DragZooming
        };
        if self.state == InteractionState::None && next == InteractionState::DragZooming {
            self.drag_start = Some((event.offset_x, event.offset_y));
            self.zoom_box = Rect::new(event.offset_x, event.offset_y, 0.0, 0.0);
        }
        self.transition(next, &mut events);
        Ok(events)
    }

    pub fn on_mouse_up(&mut self, event: &MouseEvent) -> ChartResult<InteractionEvents> {
        self.ensure_live("on_mouse_up")?;
        let mut events = InteractionEvents::new();
        let primary_held = event.buttons.intersects(MouseButtons::PRIMARY);
        if primary_held {
            return Ok(events);
        }

        self.drag_start = None;
        if self.state == InteractionState::DragZooming && !self.zoom_box.is_degenerate() {
            let data_extent = extent_from_zoom_box(
                self.zoom_box,
                self.view_extent,
                self.dimension,
                self.x_scale,
                self.y_scale,
            );
            debug!(?data_extent, "drag zoom completed");
            events.push(InteractionEvent::ViewExtentChanged { data_extent });
        }
        self.transition(InteractionState::None, &mut events);
        Ok(events)
    }

    pub fn on_mouse_move(&mut self, event: &MouseEvent) -> ChartResult<InteractionEvents> {
        self.ensure_live("on_mouse_move")?;
        let mut events = InteractionEvents::new();
        self.special_key_pressed = event.modifiers.is_pan_modifier();
        self.cursor_inside = true;

        match self.state {
            InteractionState::ScrollZooming => {
                self.transition(InteractionState::None, &mut events);
                self.update_cursor(event.offset_x, event.offset_y);
            }
            InteractionState::None => {
                self.update_cursor(event.offset_x, event.offset_y);
            }
            InteractionState::Panning => {
                let data_extent = proposed_view_extent_on_pan(
                    (event.movement_x, event.movement_y),
                    self.view_extent,
                    self.dimension,
                    self.x_scale,
                    self.y_scale,
                );
                events.push(InteractionEvent::ViewExtentChanged { data_extent });
            }
            InteractionState::DragZooming => {
                if let Some(start) = self.drag_start {
                    self.zoom_box =
                        Rect::from_corners(start, (event.offset_x, event.offset_y));
                }
            }
        }
        Ok(events)
    }

    pub fn on_mouse_enter(&mut self, event: &MouseEvent) -> ChartResult<()> {
        self.ensure_live("on_mouse_enter")?;
        self.cursor_inside = true;
        self.update_cursor(event.offset_x, event.offset_y);
        Ok(())
    }

    pub fn on_mouse_leave(&mut self) -> ChartResult<InteractionEvents> {
        self.ensure_live("on_mouse_leave")?;
        let mut events = InteractionEvents::new();
        self.drag_start = None;
        self.cursor_inside = false;
        self.cursor = None;
        self.cursored_data.clear();
        self.transition(InteractionState::None, &mut events);
        Ok(events)
    }

    pub fn on_double_click(&mut self) -> ChartResult<InteractionEvents> {
        self.ensure_live("on_double_click")?;
        let mut events = InteractionEvents::new();
        events.push(InteractionEvent::ViewExtentReset);
        self.transition(InteractionState::None, &mut events);
        Ok(events)
    }

    /// Alt alone + wheel zooms around the cursor; any other wheel event only
    /// (re)arms the zoom hint until `now + zoom_hint_delay`.
    pub fn on_wheel(&mut self, event: &WheelEvent, now: Instant) -> ChartResult<InteractionEvents> {
        self.ensure_live("on_wheel")?;
        let mut events = InteractionEvents::new();
        let modifiers = event.modifiers;
        let should_zoom =
            modifiers.alt && !modifiers.ctrl && !modifiers.shift && !modifiers.meta;

        if !should_zoom {
            self.zoom_hint_deadline = Some(now + self.zoom_hint_delay);
            return Ok(events);
        }

        self.zoom_hint_deadline = None;
        let data_extent = proposed_view_extent_on_zoom(
            event,
            self.view_extent,
            self.dimension,
            self.zoom_speed,
            self.x_scale,
            self.y_scale,
        );
        events.push(InteractionEvent::ViewExtentChanged { data_extent });
        self.transition(InteractionState::ScrollZooming, &mut events);
        Ok(events)
    }

    /// Hides the zoom hint once its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.zoom_hint_deadline.is_some_and(|deadline| now >= deadline) {
            self.zoom_hint_deadline = None;
        }
    }

    pub fn on_key_change(&mut self, modifiers: Modifiers) {
        self.special_key_pressed = modifiers.is_pan_modifier();
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.zoom_hint_deadline = None;
        self.cursored_data.clear();
        self.series = Arc::from(Vec::new());
    }

    fn update_cursor(&mut self, x: f64, y: f64) {
        self.cursor = Some((x, y));
        self.refresh_tooltip();
    }

    fn refresh_tooltip(&mut self) {
        self.cursored_data.clear();
        if self.tooltip_disabled || !self.cursor_inside {
            return;
        }
        let Some((cursor_x, _)) = self.cursor else {
            return;
        };
        let target_x = self.data_x(cursor_x);

        for series in self.series.iter() {
            let Some(metadata) = self.metadata.get(&series.id) else {
                continue;
            };
            if !metadata.is_primary_visible() {
                continue;
            }
            let Some(index) = find_closest_index(&series.points, target_x) else {
                continue;
            };
            let point = series.points[index].clone();
            let dom_point = self.pixel(point.x(), point.y());
            self.cursored_data.push(TooltipDatum {
                id: series.id.clone(),
                metadata: metadata.clone(),
                closest_point_index: index,
                point,
                dom_point,
            });
        }
    }
}
