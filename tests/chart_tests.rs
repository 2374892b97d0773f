use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use line_chart_rs::chart::{Chart, ChartCallbacks, ChartOptions, Coordinator, MainThreadChart};
use line_chart_rs::core::{
    DEFAULT_EXTENT, DataSeries, DataSeriesMetadata, DataSeriesMetadataMap, Dimension, Extent,
    ScaleType,
};
use line_chart_rs::render::{HeadlessGlContext, NullRenderer, Shape, WebGlRenderer};
use line_chart_rs::ChartError;

const SIZE: Dimension = Dimension::new(100.0, 50.0);

fn metadata(entries: Vec<DataSeriesMetadata>) -> DataSeriesMetadataMap {
    entries
        .into_iter()
        .map(|entry| (entry.id.clone(), entry))
        .collect()
}

fn null_chart(options: ChartOptions) -> MainThreadChart<NullRenderer> {
    MainThreadChart::new(NullRenderer::default(), options).expect("chart")
}

fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&count);
    (count, move || {
        handle.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn construction_sizes_renderer_and_rejects_bad_input() {
    let chart = null_chart(ChartOptions::new(SIZE));
    assert_eq!(chart.renderer().resize_count, 1);
    assert_eq!(chart.coordinator().dimension(), SIZE);
    assert_eq!(chart.coordinator().view_box(), DEFAULT_EXTENT);

    let bad_size = MainThreadChart::new(
        NullRenderer::default(),
        ChartOptions::new(Dimension::new(f64::NAN, 1.0)),
    );
    assert!(matches!(bad_size, Err(ChartError::InvalidDimension { .. })));

    let bad_width = MainThreadChart::new(
        NullRenderer::default(),
        ChartOptions::new(SIZE).with_line_width(0.0),
    );
    assert!(matches!(bad_width, Err(ChartError::InvalidData(_))));
}

#[test]
fn setters_coalesce_into_one_redraw_per_flush() {
    let (draws, on_draw) = counter();
    let mut chart = null_chart(
        ChartOptions::new(SIZE).with_callbacks(ChartCallbacks::default().with_on_draw_end(on_draw)),
    );

    chart
        .set_metadata(&metadata(vec![DataSeriesMetadata::new("a", "#f00")]))
        .expect("metadata");
    chart
        .set_data(Arc::from([DataSeries::from_xy("a", &[(0.0, 0.0), (1.0, 1.0)])]))
        .expect("data");
    chart
        .set_view_box(Extent::new((0.0, 1.0), (0.0, 1.0)))
        .expect("view box");
    assert!(chart.is_redraw_pending());
    assert_eq!(chart.renderer().render_count, 0);

    chart.flush().expect("flush");
    assert_eq!(chart.renderer().render_count, 1);
    assert_eq!(chart.redraw_count(), 1);
    assert_eq!(draws.load(Ordering::SeqCst), 1);

    chart.flush().expect("idle flush");
    assert_eq!(chart.renderer().render_count, 1);
}

#[test]
fn without_coalescing_every_setter_draws() {
    let mut chart = null_chart(ChartOptions::new(SIZE).with_coalesce_updates(false));
    chart
        .set_data(Arc::from([DataSeries::from_xy("a", &[(0.0, 0.0)])]))
        .expect("data");
    chart
        .set_view_box(Extent::new((0.0, 2.0), (0.0, 2.0)))
        .expect("view box");
    assert_eq!(chart.renderer().render_count, 2);
    assert!(!chart.is_redraw_pending());
}

#[test]
fn unchanged_scale_type_does_not_schedule_a_redraw() {
    let mut chart = null_chart(ChartOptions::new(SIZE));
    chart.set_x_scale_type(ScaleType::Linear).expect("same scale");
    assert!(!chart.is_redraw_pending());

    chart.set_y_scale_type(ScaleType::Log10).expect("log scale");
    assert!(chart.is_redraw_pending());
    assert_eq!(chart.coordinator().y_scale().scale_type(), ScaleType::Log10);
}

#[test]
fn invalid_view_box_is_ignored() {
    let mut chart = null_chart(ChartOptions::new(SIZE));
    chart
        .set_view_box(Extent::new((5.0, 1.0), (0.0, 1.0)))
        .expect("ignored");
    assert!(!chart.is_redraw_pending());
    assert_eq!(chart.coordinator().view_box(), DEFAULT_EXTENT);
}

#[test]
fn frame_contains_lines_and_markers_for_series_with_metadata() {
    let mut chart = null_chart(ChartOptions::new(SIZE));
    chart
        .set_metadata(&metadata(vec![
            DataSeriesMetadata::new("a", "#f00"),
            DataSeriesMetadata::new("aux", "#00f").with_aux(true),
        ]))
        .expect("metadata");
    chart
        .set_data(Arc::from([
            DataSeries::from_xy(
                "a",
                &[(0.0, 0.0), (1.0, 1.0), (2.0, f64::NAN), (3.0, 2.0), (4.0, 3.0)],
            ),
            DataSeries::from_xy("aux", &[(0.0, 1.0), (1.0, f64::NAN)]),
            DataSeries::from_xy("orphan", &[(0.0, 0.0), (1.0, 1.0)]),
        ]))
        .expect("data");
    chart.flush().expect("flush");

    let frame = chart.renderer().last_frame.clone().expect("frame");
    let ids: Vec<&str> = frame
        .primitives
        .iter()
        .map(|primitive| primitive.cache_id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec!["a/line/0", "a/triangle/1", "a/line/2", "aux/circle/0"]
    );
    match &frame.primitives[1].shape {
        Shape::Triangle { center, .. } => assert_eq!(*center, [2.0, 1.0]),
        other => panic!("expected triangle marker, got {other:?}"),
    }
}

#[test]
fn hidden_series_are_painted_invisible() {
    let mut chart = null_chart(ChartOptions::new(SIZE));
    chart
        .set_metadata(&metadata(vec![
            DataSeriesMetadata::new("a", "#f00").with_visible(false),
        ]))
        .expect("metadata");
    chart
        .set_data(Arc::from([DataSeries::from_xy("a", &[(0.0, 0.0), (1.0, 1.0)])]))
        .expect("data");
    chart.flush().expect("flush");

    let frame = chart.renderer().last_frame.clone().expect("frame");
    assert_eq!(frame.primitives.len(), 1);
    assert!(!frame.primitives[0].style.visible);
}

#[test]
fn dispose_is_idempotent_and_blocks_further_use() {
    let mut chart = null_chart(ChartOptions::new(SIZE));
    chart.dispose();
    chart.dispose();
    assert!(chart.is_disposed());
    assert_eq!(chart.renderer().dispose_count, 1);

    assert_eq!(
        chart.set_data(Arc::from([DataSeries::from_xy("a", &[(0.0, 0.0)])])),
        Err(ChartError::Disposed)
    );
    assert_eq!(chart.resize(SIZE), Err(ChartError::Disposed));
    assert_eq!(chart.flush(), Err(ChartError::Disposed));
}

#[test]
fn lost_gpu_context_is_reported_once_and_stops_drawing() {
    let context = HeadlessGlContext::new();
    let (losses, on_lost) = counter();
    let mut chart = MainThreadChart::new(
        WebGlRenderer::new(Box::new(context.clone()), 1.0),
        ChartOptions::new(SIZE)
            .with_callbacks(ChartCallbacks::default().with_on_context_lost(on_lost)),
    )
    .expect("chart");

    chart
        .set_data(Arc::from([DataSeries::from_xy("a", &[(0.0, 0.0), (1.0, 1.0)])]))
        .expect("data");
    chart.flush().expect("flush");
    assert_eq!(chart.redraw_count(), 1);

    context.lose_context();
    chart
        .set_view_box(Extent::new((0.0, 2.0), (0.0, 2.0)))
        .expect("view box");
    chart.flush().expect("flush on lost context");
    assert!(chart.is_context_lost());
    assert_eq!(losses.load(Ordering::SeqCst), 1);

    chart
        .set_view_box(Extent::new((0.0, 3.0), (0.0, 3.0)))
        .expect("view box");
    chart.flush().expect("flush skipped");
    assert_eq!(chart.redraw_count(), 1);
    assert_eq!(losses.load(Ordering::SeqCst), 1);
}

#[test]
fn coordinator_projects_data_to_pixels() {
    let mut coordinator = Coordinator::new(SIZE);
    let before = coordinator.update_id();
    coordinator.set_view_box(Extent::new((0.0, 10.0), (0.0, 10.0)));
    assert_eq!(coordinator.to_pixel(5.0, 5.0), [50.0, 25.0]);
    assert_eq!(coordinator.to_pixel(0.0, 0.0), [0.0, 50.0]);
    assert!(coordinator.update_id() > before);

    let id = coordinator.update_id();
    coordinator.set_view_box(Extent::new((0.0, 10.0), (0.0, 10.0)));
    assert_eq!(coordinator.update_id(), id);

    coordinator.set_y_scale(ScaleType::Log10);
    coordinator.set_view_box(Extent::new((0.0, 10.0), (1.0, 100.0)));
    let camera = coordinator.camera();
    assert_eq!(camera.y, (0.0, 2.0));
}
