use crate::core::{Dimension, Extent, Rect, Scale, SeriesPoint};
use crate::interaction::WheelEvent;

/// Zoom fraction per wheel pixel.
pub const SCROLL_ZOOM_SPEED_FACTOR: f64 = 0.01;

/// Largest fraction of the view a single wheel event may zoom in by.
const MAX_ZOOM_FRACTION: f64 = 0.95;

/// Index of the point whose `x` is closest to `target_x`.
///
/// `points` must be sorted ascending by `x`. Ties go to the lower index; a
/// NaN target yields the last index; an empty slice yields `None`.
#[must_use]
pub fn find_closest_index<P: SeriesPoint>(points: &[P], target_x: f64) -> Option<usize> {
    if points.is_empty() {
        return None;
    }
    if target_x.is_nan() {
        return Some(points.len() - 1);
    }

    let mut left = 0;
    let mut right = points.len() - 1;
    while right - left > 1 {
        let mid = (right - left).div_ceil(2) + left;
        if points[mid].x() < target_x {
            left = mid;
        } else {
            right = mid;
        }
    }

    let left_distance = (points[left].x() - target_x).abs();
    let right_distance = (points[right].x() - target_x).abs();
    Some(if right_distance < left_distance {
        right
    } else {
        left
    })
}

/// Pixel range of an axis inside the overlay; y is flipped.
#[must_use]
pub fn scale_range(dimension: Dimension) -> ((f64, f64), (f64, f64)) {
    ((0.0, dimension.width), (dimension.height, 0.0))
}

/// View box after zooming around the cursor by one wheel event.
///
/// Positive `delta_y` zooms out. The zoom-in fraction is capped so the
/// view never collapses; `delta_y == 0` returns the extent unchanged.
#[must_use]
pub fn proposed_view_extent_on_zoom(
    event: &WheelEvent,
    extent: Extent,
    dimension: Dimension,
    zoom_speed: f64,
    x_scale: &dyn Scale,
    y_scale: &dyn Scale,
) -> Extent {
    if event.delta_y == 0.0 {
        return extent;
    }

    let factor =
        (-event.delta_y * event.delta_mode.multiplier() * zoom_speed).min(MAX_ZOOM_FRACTION);
    let (x_range, y_range) = scale_range(dimension);
    let (width, height) = (dimension.width, dimension.height);

    let left_px = event.offset_x * factor;
    let right_px = width - (width - event.offset_x) * factor;
    let top_px = event.offset_y * factor;
    let bottom_px = height - (height - event.offset_y) * factor;

    Extent {
        x: (
            x_scale.reverse(extent.x, x_range, left_px),
            x_scale.reverse(extent.x, x_range, right_px),
        ),
        y: (
            y_scale.reverse(extent.y, y_range, bottom_px),
            y_scale.reverse(extent.y, y_range, top_px),
        ),
    }
}

/// View box after dragging the content by `(movement_x, movement_y)` pixels.
#[must_use]
pub fn proposed_view_extent_on_pan(
    movement: (f64, f64),
    extent: Extent,
    dimension: Dimension,
    x_scale: &dyn Scale,
    y_scale: &dyn Scale,
) -> Extent {
    let (x_range, y_range) = scale_range(dimension);
    let delta_x = -movement.0;
    let delta_y = -movement.1;
    Extent {
        x: (
            x_scale.reverse(extent.x, x_range, delta_x),
            x_scale.reverse(extent.x, x_range, dimension.width + delta_x),
        ),
        y: (
            y_scale.reverse(extent.y, y_range, dimension.height + delta_y),
            y_scale.reverse(extent.y, y_range, delta_y),
        ),
    }
}

/// Data-space view box covered by a pixel rectangle.
#[must_use]
pub fn extent_from_zoom_box(
    zoom_box: Rect,
    extent: Extent,
    dimension: Dimension,
    x_scale: &dyn Scale,
    y_scale: &dyn Scale,
) -> Extent {
    let (x_range, y_range) = scale_range(dimension);
    Extent {
        x: (
            x_scale.reverse(extent.x, x_range, zoom_box.x),
            x_scale.reverse(extent.x, x_range, zoom_box.x + zoom_box.width),
        ),
        y: (
            y_scale.reverse(extent.y, y_range, zoom_box.y + zoom_box.height),
            y_scale.reverse(extent.y, y_range, zoom_box.y),
        ),
    }
}
