use criterion::{Criterion, criterion_group, criterion_main};
use line_chart_rs::chart::{Chart, ChartOptions, MainThreadChart};
use line_chart_rs::core::{
    DataPoint, DataSeries, DataSeriesMetadata, DataSeriesMetadataMap, Dimension, Extent,
    ScaleType, compute_data_series_extent, create_scale,
};
use line_chart_rs::render::NullRenderer;
use line_chart_rs::transform::classic_smoothing;
use std::hint::black_box;

fn generated_series(id: &str, len: usize) -> DataSeries<DataPoint> {
    let points: Vec<(f64, f64)> = (0..len)
        .map(|i| {
            let x = i as f64;
            let y = if i % 97 == 0 {
                f64::NAN
            } else {
                (x * 0.01).sin() * 50.0 + x * 0.02
            };
            (x, y)
        })
        .collect();
    DataSeries::from_xy(id, &points)
}

fn metadata_for(ids: &[&str]) -> DataSeriesMetadataMap {
    ids.iter()
        .map(|id| ((*id).to_owned(), DataSeriesMetadata::new(*id, "#1f77b4")))
        .collect()
}

fn bench_scale_round_trip(c: &mut Criterion) {
    let linear = create_scale(ScaleType::Linear);
    let log = create_scale(ScaleType::Log10);

    c.bench_function("linear_scale_round_trip", |b| {
        b.iter(|| {
            let px = linear.forward((0.0, 10_000.0), (0.0, 1920.0), black_box(4_321.123));
            let _ = linear.reverse((0.0, 10_000.0), (0.0, 1920.0), px);
        })
    });

    c.bench_function("log_scale_round_trip", |b| {
        b.iter(|| {
            let px = log.forward((1e-3, 1e6), (0.0, 1080.0), black_box(4_321.123));
            let _ = log.reverse((1e-3, 1e6), (0.0, 1080.0), px);
        })
    });
}

fn bench_extent_10k(c: &mut Criterion) {
    let series = vec![generated_series("a", 10_000), generated_series("b", 10_000)];
    let metadata = metadata_for(&["a", "b"]);

    c.bench_function("data_series_extent_2x10k", |b| {
        b.iter(|| {
            let _ = compute_data_series_extent(black_box(&series), black_box(&metadata));
        })
    });
}

fn bench_smoothing_10k(c: &mut Criterion) {
    let series = vec![generated_series("a", 10_000)];

    c.bench_function("classic_smoothing_10k", |b| {
        b.iter(|| {
            let _ = classic_smoothing(black_box(&series), black_box(0.6));
        })
    });
}

fn bench_series_projection_4x2k(c: &mut Criterion) {
    let ids = ["a", "b", "c", "d"];
    let series: Vec<DataSeries<DataPoint>> =
        ids.iter().map(|id| generated_series(id, 2_000)).collect();
    let mut chart = MainThreadChart::new(
        NullRenderer::default(),
        ChartOptions::new(Dimension::new(1600.0, 900.0)),
    )
    .expect("chart init");
    chart.set_metadata(&metadata_for(&ids)).expect("metadata");
    chart.set_data(series.into()).expect("data");
    chart.flush().expect("initial flush");

    let mut shift = 0.0;
    c.bench_function("series_projection_4x2k", |b| {
        b.iter(|| {
            shift = if shift > 100.0 { 0.0 } else { shift + 1.0 };
            chart
                .set_view_box(Extent::new((shift, 2_000.0 + shift), (-60.0, 100.0)))
                .expect("view box");
            chart.flush().expect("flush");
        })
    });
}

criterion_group!(
    benches,
    bench_scale_round_trip,
    bench_extent_10k,
    bench_smoothing_10k,
    bench_series_projection_4x2k
);
criterion_main!(benches);
