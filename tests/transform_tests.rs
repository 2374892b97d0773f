use approx::assert_relative_eq;
use line_chart_rs::core::{DataPoint, DataSeries};
use line_chart_rs::transform::{
    MAX_SMOOTHING_WEIGHT, ScalarPoint, classic_smoothing, partition_series,
};
use proptest::prelude::*;

fn ys(series: &DataSeries) -> Vec<f64> {
    series.points.iter().map(|point| point.y).collect()
}

#[test]
fn smoothing_preserves_constant_series_exactly() {
    let input = vec![DataSeries::from_xy("a", &[(0.0, 3.0), (1.0, 3.0), (2.0, 3.0)])];
    let smoothed = classic_smoothing(&input, 0.9);
    assert_eq!(ys(&smoothed[0]), vec![3.0, 3.0, 3.0]);
}

#[test]
fn smoothing_applies_debiased_moving_average() {
    let input = vec![DataSeries::from_xy("a", &[(0.0, 1.0), (1.0, 2.0)])];
    let smoothed = classic_smoothing(&input, 0.5);
    let values = ys(&smoothed[0]);
    assert_relative_eq!(values[0], 1.0);
    assert_relative_eq!(values[1], 5.0 / 3.0, max_relative = 1e-12);
}

#[test]
fn smoothing_passes_non_finite_values_through() {
    let input = vec![DataSeries::from_xy(
        "a",
        &[(0.0, 1.0), (1.0, f64::NAN), (2.0, 3.0)],
    )];
    let without_gap = vec![DataSeries::from_xy("a", &[(0.0, 1.0), (2.0, 3.0)])];

    let smoothed = classic_smoothing(&input, 0.5);
    let reference = classic_smoothing(&without_gap, 0.5);

    let values = ys(&smoothed[0]);
    assert!(values[1].is_nan());
    assert_relative_eq!(values[0], reference[0].points[0].y);
    assert_relative_eq!(values[2], reference[0].points[1].y, max_relative = 1e-12);
}

#[test]
fn smoothing_keeps_x_and_ids() {
    let input = vec![
        DataSeries::from_xy("a", &[(0.0, 1.0), (5.0, 4.0)]),
        DataSeries::from_xy("b", &[(1.0, 2.0)]),
    ];
    let smoothed = classic_smoothing(&input, 0.7);
    assert_eq!(smoothed.len(), 2);
    assert_eq!(smoothed[0].id, "a");
    assert_eq!(smoothed[1].id, "b");
    assert_eq!(smoothed[0].points[1].x, 5.0);
}

#[test]
fn smoothing_clamps_weight_and_keeps_values_finite() {
    let input = vec![DataSeries::from_xy("a", &[(0.0, 1.0), (1.0, 9.0)])];
    let at_one = classic_smoothing(&input, 1.0);
    let at_max = classic_smoothing(&input, MAX_SMOOTHING_WEIGHT);
    assert_eq!(at_one, at_max);
    assert!(ys(&at_one[0]).iter().all(|y| y.is_finite()));

    let negative = classic_smoothing(&input, -0.5);
    assert_eq!(ys(&negative[0]), vec![1.0, 9.0]);
}

#[test]
fn smoothing_works_on_scalar_points() {
    let input = vec![DataSeries::new(
        "run",
        vec![
            ScalarPoint::new(1.0, 2.0, 1, 1000.0),
            ScalarPoint::new(2.0, 4.0, 2, 2000.0),
        ],
    )];
    let smoothed = classic_smoothing(&input, 0.5);
    assert_eq!(smoothed[0].points[1].step, 2);
    assert_eq!(smoothed[0].points[1].wall_time, 2000.0);
    assert!(smoothed[0].points[1].y < 4.0);
}

fn steps_run(id: &str, steps: &[i64]) -> DataSeries<ScalarPoint> {
    DataSeries::new(
        id,
        steps
            .iter()
            .map(|&step| ScalarPoint::new(step as f64, 1.0, step, 0.0))
            .collect(),
    )
}

#[test]
fn partition_splits_where_steps_decrease() {
    let partitions = partition_series(&[steps_run("a", &[1, 2, 2, 1, 5, 10])]);
    assert_eq!(partitions.len(), 2);

    let first: Vec<i64> = partitions[0].points.iter().map(|p| p.step).collect();
    let second: Vec<i64> = partitions[1].points.iter().map(|p| p.step).collect();
    assert_eq!(first, vec![1, 2, 2]);
    assert_eq!(second, vec![1, 5, 10]);

    for (index, partition) in partitions.iter().enumerate() {
        assert_eq!(partition.run_id, "a");
        assert_eq!(partition.partition_index, index);
        assert_eq!(partition.partition_size, 2);
    }
}

#[test]
fn partition_keeps_constant_steps_together() {
    let partitions = partition_series(&[steps_run("a", &[1, 1, 1])]);
    assert_eq!(partitions.len(), 1);
    assert_eq!(partitions[0].partition_size, 1);
    assert_eq!(partitions[0].points.len(), 3);
}

#[test]
fn partition_ids_encode_run_and_index() {
    let partitions = partition_series(&[steps_run("train", &[3, 1])]);
    assert_eq!(partitions[0].id, r#"["train",0]"#);
    assert_eq!(partitions[1].id, r#"["train",1]"#);

    let series = partitions[1].clone().into_data_series();
    assert_eq!(series.id, r#"["train",1]"#);
}

#[test]
fn partition_attaches_leading_non_finite_x_to_first_partition() {
    let input = vec![DataSeries::from_xy(
        "a",
        &[(f64::NAN, 1.0), (0.0, 1.0), (1.0, 2.0), (0.5, 3.0)],
    )];
    let partitions = partition_series(&input);
    assert_eq!(partitions.len(), 2);
    assert_eq!(partitions[0].points.len(), 3);
    assert!(partitions[0].points[0].x.is_nan());
    assert_eq!(partitions[1].points, vec![DataPoint::new(0.5, 3.0)]);
}

#[test]
fn partition_handles_multiple_runs_independently() {
    let partitions = partition_series(&[steps_run("a", &[1, 2]), steps_run("b", &[2, 1])]);
    let sizes: Vec<(String, usize)> = partitions
        .iter()
        .map(|p| (p.run_id.clone(), p.partition_size))
        .collect();
    assert_eq!(
        sizes,
        vec![
            ("a".to_owned(), 1),
            ("b".to_owned(), 2),
            ("b".to_owned(), 2)
        ]
    );
}

proptest! {
    #[test]
    fn zero_weight_smoothing_is_identity(values in prop::collection::vec(-1e6f64..1e6, 1..64)) {
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &y)| (i as f64, y))
            .collect();
        let input = vec![DataSeries::from_xy("a", &points)];
        let smoothed = classic_smoothing(&input, 0.0);
        for (out, &expected) in smoothed[0].points.iter().zip(&values) {
            prop_assert!((out.y - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }
    }

    #[test]
    fn smoothed_values_stay_within_input_bounds(
        values in prop::collection::vec(-1e6f64..1e6, 1..64),
        weight in 0.0f64..0.999
    ) {
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &y)| (i as f64, y))
            .collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let smoothed = classic_smoothing(&[DataSeries::from_xy("a", &points)], weight);
        let tolerance = 1e-6 * (max - min).abs().max(1.0);
        for point in &smoothed[0].points {
            prop_assert!(point.y >= min - tolerance && point.y <= max + tolerance);
        }
    }

    #[test]
    fn partitions_preserve_every_point(xs in prop::collection::vec(-100.0f64..100.0, 0..64)) {
        let points: Vec<(f64, f64)> = xs.iter().map(|&x| (x, 0.0)).collect();
        let partitions = partition_series(&[DataSeries::from_xy("a", &points)]);
        let total: usize = partitions.iter().map(|p| p.points.len()).sum();
        prop_assert_eq!(total, xs.len());
        for partition in &partitions {
            prop_assert!(partition.points.windows(2).all(|pair| pair[0].x <= pair[1].x));
        }
    }
}
