//! Pointer interaction overlay: drag-zoom, pan, wheel zoom and tooltips.

mod events;
mod view;
mod zoom;

pub use events::{DeltaMode, InteractionEvent, Modifiers, MouseButtons, MouseEvent, WheelEvent};
pub use view::{InteractionEvents, InteractiveView, ZOOM_HINT_DELAY};
pub use zoom::{
    SCROLL_ZOOM_SPEED_FACTOR, extent_from_zoom_box, find_closest_index,
    proposed_view_extent_on_pan, proposed_view_extent_on_zoom, scale_range,
};

use serde::{Deserialize, Serialize};

use crate::core::{DataPoint, DataSeriesMetadata, SeriesPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    #[default]
    None,
    DragZooming,
    Panning,
    ScrollZooming,
}

/// Closest point of one series under the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipDatum<P = DataPoint> {
    pub id: String,
    pub metadata: DataSeriesMetadata,
    pub closest_point_index: usize,
    pub point: P,
    /// Pixel position of `point` inside the overlay.
    pub dom_point: (f64, f64),
}

impl<P: SeriesPoint> TooltipDatum<P> {
    /// Non-finite points get no tooltip marker.
    #[must_use]
    pub fn should_render_point(&self) -> bool {
        self.point.x().is_finite() && self.point.y().is_finite()
    }
}
