use std::time::{Duration, Instant};

use approx::assert_relative_eq;
use line_chart_rs::ChartError;
use line_chart_rs::core::{
    DataPoint, DataSeries, DataSeriesMetadata, DataSeriesMetadataMap, Dimension, Extent, Rect,
    ScaleType, create_scale,
};
use line_chart_rs::interaction::{
    DeltaMode, InteractionEvent, InteractionState, InteractiveView, Modifiers, MouseButtons,
    MouseEvent, WheelEvent, extent_from_zoom_box, find_closest_index,
    proposed_view_extent_on_zoom,
};

const SIZE: Dimension = Dimension::new(100.0, 100.0);
const EXTENT: Extent = Extent::new((0.0, 100.0), (0.0, 100.0));

fn view() -> InteractiveView {
    let mut view = InteractiveView::new(SIZE);
    view.set_view_extent(EXTENT);
    view
}

fn left_at(x: f64, y: f64) -> MouseEvent {
    MouseEvent::at(x, y).with_buttons(MouseButtons::LEFT)
}

fn changed_extent(events: &[InteractionEvent]) -> Extent {
    events
        .iter()
        .find_map(|event| match event {
            InteractionEvent::ViewExtentChanged { data_extent } => Some(*data_extent),
            _ => None,
        })
        .expect("view extent change")
}

fn assert_extent_eq(actual: Extent, expected: Extent) {
    assert_relative_eq!(actual.x.0, expected.x.0, epsilon = 1e-9);
    assert_relative_eq!(actual.x.1, expected.x.1, epsilon = 1e-9);
    assert_relative_eq!(actual.y.0, expected.y.0, epsilon = 1e-9);
    assert_relative_eq!(actual.y.1, expected.y.1, epsilon = 1e-9);
}

#[test]
fn closest_index_uses_binary_search_with_lower_tie_break() {
    let points: Vec<DataPoint> = (0..4).map(|i| DataPoint::new(f64::from(i), 0.0)).collect();
    assert_eq!(find_closest_index(&points, 1.4), Some(1));
    assert_eq!(find_closest_index(&points, 1.6), Some(2));
    assert_eq!(find_closest_index(&points, 1.5), Some(1));
    assert_eq!(find_closest_index(&points, -5.0), Some(0));
    assert_eq!(find_closest_index(&points, 10.0), Some(3));
    assert_eq!(find_closest_index(&points, f64::NAN), Some(3));
    assert_eq!(find_closest_index::<DataPoint>(&[], 1.0), None);
}

#[test]
fn drag_zoom_emits_extent_of_the_dragged_box() {
    let mut view = view();
    let events = view.on_mouse_down(&left_at(10.0, 10.0)).expect("down");
    assert_eq!(
        events.as_slice(),
        &[InteractionEvent::StateChanged(InteractionState::DragZooming)]
    );

    view.on_mouse_move(&left_at(50.0, 50.0)).expect("move");
    assert_eq!(view.zoom_box(), Rect::new(10.0, 10.0, 40.0, 40.0));

    let events = view.on_mouse_up(&MouseEvent::at(50.0, 50.0)).expect("up");
    assert_extent_eq(
        changed_extent(&events),
        Extent::new((10.0, 50.0), (50.0, 90.0)),
    );
    assert_eq!(
        events.last(),
        Some(&InteractionEvent::StateChanged(InteractionState::None))
    );
    assert_eq!(view.state(), InteractionState::None);
    assert_eq!(view.zoom_box(), Rect::default());
    assert_eq!(view.view_extent(), EXTENT);
}

#[test]
fn dragging_backwards_normalizes_the_box() {
    let mut view = view();
    view.on_mouse_down(&left_at(80.0, 70.0)).expect("down");
    view.on_mouse_move(&left_at(20.0, 30.0)).expect("move");
    assert_eq!(view.zoom_box(), Rect::new(20.0, 30.0, 60.0, 40.0));
}

#[test]
fn click_without_drag_does_not_zoom() {
    let mut view = view();
    view.on_mouse_down(&left_at(10.0, 10.0)).expect("down");
    let events = view.on_mouse_up(&MouseEvent::at(10.0, 10.0)).expect("up");
    assert_eq!(
        events.as_slice(),
        &[InteractionEvent::StateChanged(InteractionState::None)]
    );
}

#[test]
fn secondary_button_is_ignored() {
    let mut view = view();
    let events = view
        .on_mouse_down(&MouseEvent::at(10.0, 10.0).with_buttons(MouseButtons::RIGHT))
        .expect("down");
    assert!(events.is_empty());
    assert_eq!(view.state(), InteractionState::None);
}

#[test]
fn mouse_up_with_primary_still_held_keeps_dragging() {
    let mut view = view();
    view.on_mouse_down(&left_at(10.0, 10.0)).expect("down");
    let events = view.on_mouse_up(&left_at(40.0, 40.0)).expect("up");
    assert!(events.is_empty());
    assert_eq!(view.state(), InteractionState::DragZooming);
}

#[test]
fn shift_drag_pans_by_mouse_movement() {
    let mut view = view();
    let events = view
        .on_mouse_down(&left_at(50.0, 50.0).with_modifiers(Modifiers::shift()))
        .expect("down");
    assert_eq!(
        events.as_slice(),
        &[InteractionEvent::StateChanged(InteractionState::Panning)]
    );

    let events = view
        .on_mouse_move(
            &left_at(60.0, 50.0)
                .with_movement(10.0, 0.0)
                .with_modifiers(Modifiers::shift()),
        )
        .expect("move");
    assert_extent_eq(
        changed_extent(&events),
        Extent::new((-10.0, 90.0), (0.0, 100.0)),
    );
    assert!(view.is_special_key_pressed());
}

#[test]
fn alt_wheel_zooms_around_cursor() {
    let mut view = view();
    let now = Instant::now();
    let events = view
        .on_wheel(
            &WheelEvent::at(50.0, 50.0, -10.0).with_modifiers(Modifiers::alt()),
            now,
        )
        .expect("wheel");
    assert_extent_eq(changed_extent(&events), Extent::new((5.0, 95.0), (5.0, 95.0)));
    assert_eq!(view.state(), InteractionState::ScrollZooming);
    assert!(!view.is_zoom_hint_visible());

    let events = view.on_mouse_move(&MouseEvent::at(50.0, 50.0)).expect("move");
    assert_eq!(
        events.as_slice(),
        &[InteractionEvent::StateChanged(InteractionState::None)]
    );
}

#[test]
fn wheel_zoom_out_and_clamped_zoom_in() {
    let linear = create_scale(ScaleType::Linear);
    let out = proposed_view_extent_on_zoom(
        &WheelEvent::at(50.0, 50.0, 10.0),
        EXTENT,
        SIZE,
        0.01,
        linear,
        linear,
    );
    assert_extent_eq(out, Extent::new((-5.0, 105.0), (-5.0, 105.0)));

    let huge = proposed_view_extent_on_zoom(
        &WheelEvent::at(50.0, 50.0, -1_000.0).with_delta_mode(DeltaMode::Page),
        EXTENT,
        SIZE,
        0.01,
        linear,
        linear,
    );
    assert!(huge.x.0 < huge.x.1 && huge.y.0 < huge.y.1);
    assert_extent_eq(huge, Extent::new((47.5, 52.5), (47.5, 52.5)));

    let still = proposed_view_extent_on_zoom(
        &WheelEvent::at(50.0, 50.0, 0.0),
        EXTENT,
        SIZE,
        0.01,
        linear,
        linear,
    );
    assert_eq!(still, EXTENT);
}

#[test]
fn plain_wheel_shows_zoom_hint_until_deadline() {
    let mut view = view().with_zoom_hint_delay(Duration::from_millis(3000));
    let now = Instant::now();
    let events = view
        .on_wheel(&WheelEvent::at(50.0, 50.0, -10.0), now)
        .expect("wheel");
    assert!(events.is_empty());
    assert!(view.is_zoom_hint_visible());

    view.tick(now + Duration::from_millis(2999));
    assert!(view.is_zoom_hint_visible());
    view.tick(now + Duration::from_millis(3000));
    assert!(!view.is_zoom_hint_visible());

    view.on_wheel(
        &WheelEvent::at(50.0, 50.0, -10.0)
            .with_modifiers(Modifiers { alt: true, ctrl: true, ..Modifiers::NONE }),
        now,
    )
    .expect("ctrl alt wheel");
    assert!(view.is_zoom_hint_visible());
}

#[test]
fn alt_with_meta_wheel_only_shows_the_hint() {
    let mut view = view();
    let events = view
        .on_wheel(
            &WheelEvent::at(50.0, 50.0, -10.0)
                .with_modifiers(Modifiers { alt: true, meta: true, ..Modifiers::NONE }),
            Instant::now(),
        )
        .expect("alt meta wheel");
    assert!(events.is_empty());
    assert!(view.is_zoom_hint_visible());
    assert_eq!(view.state(), InteractionState::None);
}

#[test]
fn double_click_requests_reset() {
    let mut view = view();
    let events = view.on_double_click().expect("dblclick");
    assert_eq!(events.as_slice(), &[InteractionEvent::ViewExtentReset]);
}

fn tooltip_view() -> InteractiveView {
    let mut view = view();
    let metadata: DataSeriesMetadataMap = [
        DataSeriesMetadata::new("a", "#f00"),
        DataSeriesMetadata::new("hidden", "#0f0").with_visible(false),
        DataSeriesMetadata::new("aux", "#00f").with_aux(true),
    ]
    .into_iter()
    .map(|entry| (entry.id.clone(), entry))
    .collect();
    let points = [(0.0, 0.0), (25.0, 25.0), (50.0, 50.0), (75.0, 75.0), (100.0, 100.0)];
    view.set_metadata(metadata);
    view.set_series_data(vec![
        DataSeries::from_xy("a", &points),
        DataSeries::from_xy("hidden", &points),
        DataSeries::from_xy("aux", &points),
        DataSeries::from_xy("unknown", &points),
    ]);
    view
}

#[test]
fn tooltip_tracks_closest_point_of_primary_visible_series() {
    let mut view = tooltip_view();
    view.on_mouse_move(&MouseEvent::at(60.0, 10.0)).expect("move");

    assert!(view.is_tooltip_visible());
    let data = view.cursored_data();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].id, "a");
    assert_eq!(data[0].closest_point_index, 2);
    assert_eq!(data[0].point, DataPoint::new(50.0, 50.0));
    assert_eq!(data[0].dom_point, (50.0, 50.0));
    assert!(data[0].should_render_point());
    assert_eq!(view.cursor_data_location(), Some((60.0, 90.0)));
}

#[test]
fn tooltip_can_be_disabled_and_is_cleared_on_leave() {
    let mut view = tooltip_view();
    view.on_mouse_move(&MouseEvent::at(60.0, 10.0)).expect("move");
    view.set_tooltip_disabled(true);
    assert!(view.cursored_data().is_empty());
    assert!(!view.is_tooltip_visible());

    view.set_tooltip_disabled(false);
    assert_eq!(view.cursored_data().len(), 1);

    view.on_mouse_leave().expect("leave");
    assert!(view.cursored_data().is_empty());
    assert_eq!(view.cursor_location(), None);
}

#[test]
fn tooltip_is_frozen_while_drag_zooming() {
    let mut view = tooltip_view();
    view.on_mouse_move(&MouseEvent::at(10.0, 10.0)).expect("hover");
    assert_eq!(view.cursored_data()[0].closest_point_index, 0);

    view.on_mouse_down(&left_at(10.0, 10.0)).expect("down");
    view.on_mouse_move(&left_at(90.0, 90.0)).expect("drag");
    assert_eq!(view.cursored_data()[0].closest_point_index, 0);
}

#[test]
fn key_changes_toggle_special_key_state() {
    let mut view = view();
    view.on_key_change(Modifiers::alt());
    assert!(view.is_special_key_pressed());
    view.on_key_change(Modifiers::ctrl());
    assert!(!view.is_special_key_pressed());
}

#[test]
fn zoom_box_extent_follows_log_scale() {
    let log = create_scale(ScaleType::Log10);
    let linear = create_scale(ScaleType::Linear);
    let extent = extent_from_zoom_box(
        Rect::new(0.0, 0.0, 50.0, 100.0),
        Extent::new((1.0, 100.0), (0.0, 100.0)),
        SIZE,
        log,
        linear,
    );
    assert_relative_eq!(extent.x.0, 1.0, max_relative = 1e-12);
    assert_relative_eq!(extent.x.1, 10.0, max_relative = 1e-12);
    assert_extent_eq(
        Extent::new((0.0, 0.0), extent.y),
        Extent::new((0.0, 0.0), (0.0, 100.0)),
    );
}

#[test]
fn handlers_fail_after_dispose() {
    let mut view = view();
    view.dispose();
    view.dispose();
    assert_eq!(
        view.on_mouse_move(&MouseEvent::at(1.0, 1.0)),
        Err(ChartError::Disposed)
    );
    assert_eq!(
        view.on_wheel(&WheelEvent::at(1.0, 1.0, 1.0), Instant::now()),
        Err(ChartError::Disposed)
    );
}
