use line_chart_rs::ChartError;
use line_chart_rs::core::Dimension;
use line_chart_rs::render::{
    Color, DrawMode, GlCall, HeadlessGlContext, PaintStyle, Polyline, RenderFrame, Renderer,
    RendererType, SeriesPrimitive, Shape, TRIANGLE_SIZE, ViewTransform, WebGlRenderer,
};

fn green() -> PaintStyle {
    PaintStyle::new(Color::from_hex("#00ff00").expect("hex color"), 2.0)
}

fn line(id: &str) -> SeriesPrimitive {
    SeriesPrimitive::new(
        id,
        Shape::Polyline(Polyline::from(vec![0.0, 0.0, 5.0, 5.0, 10.0, 0.0])),
        green(),
    )
}

fn frame(camera: ViewTransform, primitives: Vec<SeriesPrimitive>) -> RenderFrame {
    primitives.into_iter().fold(
        RenderFrame::new(Dimension::new(100.0, 50.0), camera),
        RenderFrame::with_primitive,
    )
}

fn renderer_with(dpr: f64) -> (HeadlessGlContext, WebGlRenderer) {
    let context = HeadlessGlContext::new();
    let renderer = WebGlRenderer::new(Box::new(context.clone()), dpr);
    (context, renderer)
}

#[test]
fn resize_sets_device_pixel_viewport() {
    let (context, mut renderer) = renderer_with(2.0);
    assert_eq!(renderer.renderer_type(), RendererType::WebGl);
    renderer
        .resize(Dimension::new(100.0, 50.0))
        .expect("resize");
    assert_eq!(
        context.calls(),
        vec![GlCall::Viewport {
            width: 200,
            height: 100
        }]
    );
}

#[test]
fn geometry_uploads_once_and_camera_moves_are_uniform_only() {
    let (context, mut renderer) = renderer_with(2.0);
    let camera = ViewTransform::new((0.0, 10.0), (0.0, 10.0));
    renderer
        .render(&frame(camera, vec![line("a")]))
        .expect("first render");
    assert_eq!(renderer.last_stats().uploads, 1);
    assert_eq!(context.upload_count(), 1);

    let draws = context.last_draw().expect("draw call");
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].mode, DrawMode::LineStrip);
    assert_eq!(draws[0].vertex_count, 3);
    assert_eq!(draws[0].size, 4.0);
    assert_eq!(draws[0].color, [0.0, 1.0, 0.0, 1.0]);

    let panned = ViewTransform::new((5.0, 15.0), (0.0, 10.0));
    renderer
        .render(&frame(panned, vec![line("a")]))
        .expect("panned render");
    assert_eq!(renderer.last_stats().uploads, 0);
    assert_eq!(renderer.last_stats().reused, 1);
    assert_eq!(context.upload_count(), 1);
    assert!(context.calls().contains(&GlCall::Camera([5.0, 15.0, 0.0, 10.0])));
}

#[test]
fn stale_buffers_are_deleted() {
    let (context, mut renderer) = renderer_with(1.0);
    let camera = ViewTransform::new((0.0, 10.0), (0.0, 10.0));
    renderer
        .render(&frame(camera, vec![line("a"), line("b")]))
        .expect("render");
    assert_eq!(context.live_buffer_count(), 2);

    renderer
        .render(&frame(camera, vec![line("b")]))
        .expect("render");
    assert_eq!(renderer.last_stats().deletes, 1);
    assert_eq!(context.live_buffer_count(), 1);
    assert_eq!(renderer.buffer_count(), 1);
}

#[test]
fn markers_are_single_vertex_sprites() {
    let (context, mut renderer) = renderer_with(2.0);
    let camera = ViewTransform::new((0.0, 10.0), (0.0, 10.0));
    let marker = SeriesPrimitive::new(
        "nan",
        Shape::Triangle {
            center: [3.0, 4.0],
            size: TRIANGLE_SIZE,
        },
        green().with_opacity(0.5),
    );
    renderer
        .render(&frame(camera, vec![marker]))
        .expect("render marker");

    let draws = context.last_draw().expect("draw call");
    assert_eq!(draws[0].mode, DrawMode::TriangleMarker);
    assert_eq!(draws[0].vertex_count, 1);
    assert_eq!(draws[0].size, (TRIANGLE_SIZE * 2.0) as f32);
    assert_eq!(draws[0].color[3], 0.5);

    let vertices = context
        .buffer_vertices(draws[0].buffer)
        .expect("uploaded vertices");
    assert_eq!(vertices[0].position, [3.0, 4.0]);
}

#[test]
fn hidden_primitives_are_not_drawn() {
    let (context, mut renderer) = renderer_with(1.0);
    let camera = ViewTransform::new((0.0, 10.0), (0.0, 10.0));
    let mut hidden = line("a");
    hidden.style = hidden.style.with_visible(false);
    renderer
        .render(&frame(camera, vec![hidden, line("b")]))
        .expect("render");
    assert_eq!(context.last_draw().expect("draw").len(), 1);
}

#[test]
fn lost_context_fails_render_and_reports_loss() {
    let (context, mut renderer) = renderer_with(1.0);
    let camera = ViewTransform::new((0.0, 10.0), (0.0, 10.0));
    renderer
        .render(&frame(camera, vec![line("a")]))
        .expect("render");

    context.lose_context();
    assert!(renderer.is_context_lost());
    assert_eq!(
        renderer.render(&frame(camera, vec![line("a")])),
        Err(ChartError::ContextLost)
    );
    assert_eq!(context.live_buffer_count(), 0);
}

#[test]
fn dispose_releases_buffers_once() {
    let (context, mut renderer) = renderer_with(1.0);
    let camera = ViewTransform::new((0.0, 10.0), (0.0, 10.0));
    renderer
        .render(&frame(camera, vec![line("a"), line("b")]))
        .expect("render");

    renderer.dispose();
    renderer.dispose();
    let deletes = context
        .calls()
        .iter()
        .filter(|call| matches!(call, GlCall::DeleteBuffer(_)))
        .count();
    assert_eq!(deletes, 2);
    assert_eq!(context.live_buffer_count(), 0);
    assert_eq!(
        renderer.render(&frame(camera, vec![line("a")])),
        Err(ChartError::Disposed)
    );
}
