use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::chart::Coordinator;
use crate::core::{DataSeries, DataSeriesMetadataMap, Scale, ScaleType};
use crate::render::{
    CIRCLE_RADIUS, Color, PaintStyle, Polyline, SeriesPrimitive, Shape, TRIANGLE_SIZE,
};

/// Fallback paint for metadata whose color does not parse.
const FALLBACK_SERIES_COLOR: Color = Color::rgb(0.4, 0.4, 0.4);

#[derive(Debug, Clone, PartialEq)]
enum PartShape {
    Line(Polyline),
    Triangle([f64; 2]),
    Circle([f64; 2]),
}

#[derive(Debug, Clone, PartialEq)]
struct GeometryPart {
    cache_id: String,
    shape: PartShape,
}

#[derive(Debug, Clone, PartialEq)]
struct SeriesGeometry {
    id: String,
    parts: SmallVec<[GeometryPart; 2]>,
}

/// Turns series data into cached scale-space geometry and paints it with
/// the current metadata.
///
/// Geometry depends only on data and scale types, so pans, zooms, resizes
/// and metadata edits reuse it untouched.
#[derive(Debug, Default)]
pub struct SeriesView {
    data: Arc<[DataSeries]>,
    geometry: Vec<SeriesGeometry>,
    derived_for: Option<(ScaleType, ScaleType)>,
    data_dirty: bool,
}

impl SeriesView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, data: Arc<[DataSeries]>) {
        self.data = data;
        self.data_dirty = true;
    }

    #[must_use]
    pub fn data(&self) -> &[DataSeries] {
        &self.data
    }

    #[must_use]
    pub fn needs_geometry_update(&self, coordinator: &Coordinator) -> bool {
        self.data_dirty || self.derived_for != Some(scale_types(coordinator))
    }

    /// Re-derives geometry when data or scale types changed since the last
    /// call. Returns whether anything was recomputed.
    pub fn update_geometry(&mut self, coordinator: &Coordinator) -> bool {
        if !self.needs_geometry_update(coordinator) {
            return false;
        }
        let x_scale = coordinator.x_scale();
        let y_scale = coordinator.y_scale();
        self.geometry = derive_all(&self.data, x_scale, y_scale);
        self.derived_for = Some(scale_types(coordinator));
        self.data_dirty = false;
        debug!(
            series_count = self.geometry.len(),
            x_scale = ?x_scale.scale_type(),
            y_scale = ?y_scale.scale_type(),
            "series geometry derived"
        );
        true
    }

    /// Paints cached geometry. Series without metadata are skipped; auxiliary
    /// series get no markers for non-finite values.
    #[must_use]
    pub fn primitives(
        &self,
        metadata: &DataSeriesMetadataMap,
        line_width: f64,
    ) -> Vec<SeriesPrimitive> {
        let mut primitives = Vec::new();
        for geometry in &self.geometry {
            let Some(meta) = metadata.get(&geometry.id) else {
                trace!(series_id = %geometry.id, "series has no metadata, skipping");
                continue;
            };
            let color = Color::from_hex(&meta.color).unwrap_or_else(|err| {
                trace!(series_id = %geometry.id, error = %err, "using fallback color");
                FALLBACK_SERIES_COLOR
            });
            let style = PaintStyle::new(color, line_width)
                .with_visible(meta.visible)
                .with_opacity(meta.opacity.unwrap_or(1.0).clamp(0.0, 1.0));

            for part in &geometry.parts {
                let shape = match &part.shape {
                    PartShape::Line(polyline) => Shape::Polyline(Arc::clone(polyline)),
                    PartShape::Triangle(_) if meta.aux => continue,
                    PartShape::Triangle(center) => Shape::Triangle {
                        center: *center,
                        size: TRIANGLE_SIZE,
                    },
                    PartShape::Circle(center) => Shape::Circle {
                        center: *center,
                        radius: CIRCLE_RADIUS,
                    },
                };
                primitives.push(SeriesPrimitive::new(part.cache_id.clone(), shape, style));
            }
        }
        primitives
    }
}

fn scale_types(coordinator: &Coordinator) -> (ScaleType, ScaleType) {
    (
        coordinator.x_scale().scale_type(),
        coordinator.y_scale().scale_type(),
    )
}

#[cfg(feature = "parallel-projection")]
fn derive_all(
    data: &[DataSeries],
    x_scale: &dyn Scale,
    y_scale: &dyn Scale,
) -> Vec<SeriesGeometry> {
    use rayon::prelude::*;

    data.par_iter()
        .map(|series| derive_series(series, x_scale, y_scale))
        .collect()
}

#[cfg(not(feature = "parallel-projection"))]
fn derive_all(
    data: &[DataSeries],
    x_scale: &dyn Scale,
    y_scale: &dyn Scale,
) -> Vec<SeriesGeometry> {
    data.iter()
        .map(|series| derive_series(series, x_scale, y_scale))
        .collect()
}

/// Splits a series into finite runs. Runs of two or more points become
/// lines, single points become circles, and each non-finite `y` becomes a
/// triangle at the last finite `y` (the first finite `y` for a leading gap,
/// `0` when the series has none). Points with non-finite `x` are dropped.
fn derive_series(series: &DataSeries, x_scale: &dyn Scale, y_scale: &dyn Scale) -> SeriesGeometry {
    let fallback_y = series
        .points
        .iter()
        .map(|point| point.y)
        .find(|y| y.is_finite())
        .unwrap_or(0.0);

    let mut parts: SmallVec<[GeometryPart; 2]> = SmallVec::new();
    let mut run: Vec<f64> = Vec::new();
    let mut last_y: Option<f64> = None;

    for point in &series.points {
        if !point.x.is_finite() {
            continue;
        }
        let x = x_scale.transform(point.x);
        if point.y.is_finite() {
            run.push(x);
            run.push(y_scale.transform(point.y));
            last_y = Some(point.y);
        } else {
            flush_run(&series.id, &mut run, &mut parts);
            let anchor = y_scale.transform(last_y.unwrap_or(fallback_y));
            parts.push(GeometryPart {
                cache_id: format!("{}/triangle/{}", series.id, parts.len()),
                shape: PartShape::Triangle([x, anchor]),
            });
        }
    }
    flush_run(&series.id, &mut run, &mut parts);

    SeriesGeometry {
        id: series.id.clone(),
        parts,
    }
}

fn flush_run(id: &str, run: &mut Vec<f64>, parts: &mut SmallVec<[GeometryPart; 2]>) {
    let index = parts.len();
    match run.len() {
        0 => return,
        2 => parts.push(GeometryPart {
            cache_id: format!("{id}/circle/{index}"),
            shape: PartShape::Circle([run[0], run[1]]),
        }),
        _ => parts.push(GeometryPart {
            cache_id: format!("{id}/line/{index}"),
            shape: PartShape::Line(Arc::from(run.as_slice())),
        }),
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::create_scale;

    fn linear() -> &'static dyn Scale {
        create_scale(ScaleType::Linear)
    }

    #[test]
    fn nan_splits_line_and_leaves_triangle() {
        let series = DataSeries::from_xy(
            "a",
            &[(0.0, 0.0), (1.0, 1.0), (2.0, f64::NAN), (3.0, 2.0), (4.0, 3.0)],
        );
        let geometry = derive_series(&series, linear(), linear());
        let shapes: Vec<_> = geometry.parts.iter().map(|part| part.shape.clone()).collect();
        assert_eq!(shapes.len(), 3);
        assert!(matches!(shapes[0], PartShape::Line(_)));
        assert_eq!(shapes[1], PartShape::Triangle([2.0, 1.0]));
        assert!(matches!(shapes[2], PartShape::Line(_)));
    }

    #[test]
    fn leading_nan_uses_first_finite_value() {
        let series = DataSeries::from_xy("a", &[(0.0, f64::NAN), (1.0, 5.0), (2.0, 6.0)]);
        let geometry = derive_series(&series, linear(), linear());
        assert_eq!(geometry.parts[0].shape, PartShape::Triangle([0.0, 5.0]));
    }

    #[test]
    fn all_nan_series_anchors_at_zero() {
        let series = DataSeries::from_xy("a", &[(0.0, f64::NAN), (1.0, f64::NAN)]);
        let geometry = derive_series(&series, linear(), linear());
        assert_eq!(geometry.parts.len(), 2);
        assert_eq!(geometry.parts[1].shape, PartShape::Triangle([1.0, 0.0]));
    }

    #[test]
    fn cache_ids_are_unique_per_part() {
        let series = DataSeries::from_xy("a", &[(0.0, f64::NAN), (1.0, 1.0), (2.0, f64::NAN)]);
        let geometry = derive_series(&series, linear(), linear());
        let ids: Vec<_> = geometry.parts.iter().map(|part| part.cache_id.as_str()).collect();
        assert_eq!(ids, ["a/triangle/0", "a/circle/1", "a/triangle/2"]);
    }
}
