//! Retained-mode SVG backend.
//!
//! The renderer owns no pixels: it keeps an ordered element tree behind a
//! shared [`SvgSurface`] that the host serializes or mirrors into a DOM.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::core::Dimension;
use crate::error::{ChartError, ChartResult};
use crate::render::{
    PaintStyle, RenderFrame, Renderer, RendererType, SeriesPrimitive, Shape, ViewTransform,
    triangle_vertices,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SvgElementKind {
    Path { d: String },
    Circle { cx: f64, cy: f64, r: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvgElement {
    pub kind: SvgElementKind,
    pub class_name: Option<&'static str>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub fill: Option<String>,
    pub opacity: f64,
    pub hidden: bool,
}

impl SvgElement {
    fn write_markup(&self, out: &mut String) {
        let mut attributes = String::new();
        if let Some(class_name) = self.class_name {
            let _ = write!(attributes, " class=\"{class_name}\"");
        }
        match &self.kind {
            SvgElementKind::Path { d } => {
                let _ = write!(attributes, " d=\"{d}\"");
            }
            SvgElementKind::Circle { cx, cy, r } => {
                let _ = write!(
                    attributes,
                    " cx=\"{}\" cy=\"{}\" r=\"{}\"",
                    format_number(*cx),
                    format_number(*cy),
                    format_number(*r)
                );
            }
        }
        let _ = write!(
            attributes,
            " fill=\"{}\"",
            self.fill.as_deref().unwrap_or("none")
        );
        if let Some(stroke) = &self.stroke {
            let _ = write!(attributes, " stroke=\"{stroke}\"");
        }
        if let Some(width) = self.stroke_width {
            let _ = write!(attributes, " stroke-width=\"{}\"", format_number(width));
        }
        if self.opacity < 1.0 {
            let _ = write!(attributes, " opacity=\"{}\"", format_number(self.opacity));
        }
        if self.hidden {
            attributes.push_str(" display=\"none\"");
        }

        let tag = match self.kind {
            SvgElementKind::Path { .. } => "path",
            SvgElementKind::Circle { .. } => "circle",
        };
        let _ = write!(out, "<{tag}{attributes}/>");
    }
}

/// Ordered element tree keyed by primitive cache id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgDocument {
    pub width: f64,
    pub height: f64,
    elements: IndexMap<String, SvgElement>,
}

impl SvgDocument {
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SvgElement> {
        self.elements.get(id)
    }

    /// Elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = (&str, &SvgElement)> {
        self.elements.iter().map(|(id, element)| (id.as_str(), element))
    }

    /// `d` attributes of every path in document order, hidden ones included.
    #[must_use]
    pub fn path_data(&self) -> Vec<&str> {
        self.elements
            .values()
            .filter_map(|element| match &element.kind {
                SvgElementKind::Path { d } => Some(d.as_str()),
                SvgElementKind::Circle { .. } => None,
            })
            .collect()
    }

    #[must_use]
    pub fn to_svg_string(&self) -> String {
        let mut out = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">",
            format_number(self.width),
            format_number(self.height)
        );
        for element in self.elements.values() {
            element.write_markup(&mut out);
        }
        out.push_str("</svg>");
        out
    }
}

/// Shared handle to the document a [`SvgRenderer`] draws into.
#[derive(Debug, Clone, Default)]
pub struct SvgSurface {
    document: Arc<Mutex<SvgDocument>>,
}

impl SvgSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with the document locked.
    pub fn with_document<T>(&self, f: impl FnOnce(&SvgDocument) -> T) -> T {
        f(&self.document.lock())
    }

    #[must_use]
    pub fn snapshot(&self) -> SvgDocument {
        self.document.lock().clone()
    }

    #[must_use]
    pub fn to_svg_string(&self) -> String {
        self.document.lock().to_svg_string()
    }

    fn clear(&self) {
        self.document.lock().elements.clear();
    }
}

/// Per-frame element churn, useful to assert cache behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SvgRenderStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub unchanged: usize,
}

#[derive(Debug)]
struct CachedElement {
    shape: Shape,
    style: PaintStyle,
}

#[derive(Debug)]
pub struct SvgRenderer {
    surface: SvgSurface,
    cache: HashMap<String, CachedElement>,
    dimension: Dimension,
    last_view: Option<(ViewTransform, Dimension)>,
    last_stats: SvgRenderStats,
    disposed: bool,
}

impl SvgRenderer {
    #[must_use]
    pub fn new(surface: SvgSurface) -> Self {
        surface.clear();
        Self {
            surface,
            cache: HashMap::new(),
            dimension: Dimension::default(),
            last_view: None,
            last_stats: SvgRenderStats::default(),
            disposed: false,
        }
    }

    #[must_use]
    pub fn surface(&self) -> &SvgSurface {
        &self.surface
    }

    #[must_use]
    pub fn last_stats(&self) -> SvgRenderStats {
        self.last_stats
    }
}

/// Shortest round-trip decimal; negative zero prints as `0`.
fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_owned()
    } else {
        format!("{value}")
    }
}

fn push_point(d: &mut String, command: char, point: [f64; 2]) {
    let _ = write!(
        d,
        "{command}{},{}",
        format_number(point[0]),
        format_number(point[1])
    );
}

fn build_element(
    primitive: &SeriesPrimitive,
    camera: &ViewTransform,
    dimension: Dimension,
) -> SvgElement {
    let color = primitive.style.color.to_hex();
    let opacity = primitive.style.opacity * primitive.style.color.alpha;
    let hidden = !primitive.style.visible;

    match &primitive.shape {
        Shape::Polyline(coordinates) => {
            let mut d = String::with_capacity(coordinates.len() * 8);
            for (index, pair) in coordinates.chunks_exact(2).enumerate() {
                let command = if index == 0 { 'M' } else { 'L' };
                push_point(&mut d, command, camera.project(dimension, [pair[0], pair[1]]));
            }
            SvgElement {
                kind: SvgElementKind::Path { d },
                class_name: None,
                stroke: Some(color),
                stroke_width: Some(primitive.style.width),
                fill: None,
                opacity,
                hidden,
            }
        }
        Shape::Triangle { center, size } => {
            let [a, b, c] = triangle_vertices(camera.project(dimension, *center), *size);
            let mut d = String::new();
            push_point(&mut d, 'M', a);
            push_point(&mut d, 'L', b);
            push_point(&mut d, 'L', c);
            d.push('Z');
            SvgElement {
                kind: SvgElementKind::Path { d },
                class_name: Some("triangle"),
                stroke: None,
                stroke_width: None,
                fill: Some(color),
                opacity,
                hidden,
            }
        }
        Shape::Circle { center, radius } => {
            let [cx, cy] = camera.project(dimension, *center);
            SvgElement {
                kind: SvgElementKind::Circle {
                    cx,
                    cy,
                    r: *radius,
                },
                class_name: Some("circle"),
                stroke: None,
                stroke_width: None,
                fill: Some(color),
                opacity,
                hidden,
            }
        }
    }
}

impl Renderer for SvgRenderer {
    fn renderer_type(&self) -> RendererType {
        RendererType::Svg
    }

    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        if self.disposed {
            return Err(ChartError::Disposed);
        }
        frame.validate()?;

        let view = (frame.camera, frame.dimension);
        let view_changed = self.last_view != Some(view);
        let mut stats = SvgRenderStats::default();
        let mut seen: HashSet<&str> = HashSet::with_capacity(frame.primitives.len());

        let mut document = self.surface.document.lock();
        document.width = frame.dimension.width;
        document.height = frame.dimension.height;

        for primitive in &frame.primitives {
            seen.insert(primitive.cache_id.as_str());
            let Some(cached) = self.cache.get_mut(&primitive.cache_id) else {
                if !primitive.style.visible {
                    continue;
                }
                document.elements.insert(
                    primitive.cache_id.clone(),
                    build_element(primitive, &frame.camera, frame.dimension),
                );
                self.cache.insert(
                    primitive.cache_id.clone(),
                    CachedElement {
                        shape: primitive.shape.clone(),
                        style: primitive.style,
                    },
                );
                stats.created += 1;
                continue;
            };

            if !primitive.style.visible {
                if let Some(element) = document.elements.get_mut(&primitive.cache_id) {
                    if !element.hidden {
                        element.hidden = true;
                        stats.updated += 1;
                    } else {
                        stats.unchanged += 1;
                    }
                }
                cached.style = primitive.style;
                continue;
            }

            let dirty = view_changed
                || cached.style != primitive.style
                || !cached.shape.same_geometry(&primitive.shape);
            if !dirty {
                stats.unchanged += 1;
                continue;
            }

            let element = build_element(primitive, &frame.camera, frame.dimension);
            match document.elements.get_mut(&primitive.cache_id) {
                Some(slot) => *slot = element,
                None => {
                    document.elements.insert(primitive.cache_id.clone(), element);
                }
            }
            cached.shape = primitive.shape.clone();
            cached.style = primitive.style;
            stats.updated += 1;
        }

        let stale: Vec<String> = self
            .cache
            .keys()
            .filter(|id| !seen.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            self.cache.remove(&id);
            document.elements.shift_remove(&id);
            stats.removed += 1;
        }
        drop(document);

        trace!(
            created = stats.created,
            updated = stats.updated,
            removed = stats.removed,
            unchanged = stats.unchanged,
            "svg frame rendered"
        );
        self.last_view = Some(view);
        self.last_stats = stats;
        Ok(())
    }

    fn resize(&mut self, dimension: Dimension) -> ChartResult<()> {
        if !dimension.is_well_formed() {
            return Err(ChartError::InvalidDimension {
                width: dimension.width,
                height: dimension.height,
            });
        }
        self.dimension = dimension;
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.cache.clear();
        self.surface.clear();
        debug!(
            width = self.dimension.width,
            height = self.dimension.height,
            "svg renderer disposed"
        );
    }
}
