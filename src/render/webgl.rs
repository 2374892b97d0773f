//! GPU backend over an abstract GL context.
//!
//! Geometry is uploaded once per primitive in scale space; view changes only
//! update the camera uniform. Markers are point sprites sized in device
//! pixels, so they never need re-uploading on pan or zoom either.

use std::collections::{HashMap, HashSet};

use bytemuck::{Pod, Zeroable};
use tracing::{debug, trace, warn};

use crate::core::Dimension;
use crate::error::{ChartError, ChartResult};
use crate::render::{RenderFrame, Renderer, RendererType, SeriesPrimitive, Shape};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    LineStrip,
    TriangleMarker,
    CircleMarker,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub buffer: BufferHandle,
    pub mode: DrawMode,
    pub vertex_count: u32,
    pub color: [f32; 4],
    /// Line width, or marker diameter, in device pixels.
    pub size: f32,
}

/// Minimal GL surface the renderer needs.
///
/// A lost context reports `is_context_lost() == true`; buffers created
/// before the loss are gone and the renderer must be rebuilt.
pub trait GlContext: Send {
    fn is_context_lost(&self) -> bool;

    fn create_buffer(&mut self) -> ChartResult<BufferHandle>;

    fn upload_vertices(&mut self, buffer: BufferHandle, bytes: &[u8]) -> ChartResult<()>;

    fn delete_buffer(&mut self, buffer: BufferHandle);

    fn set_viewport(&mut self, width: u32, height: u32);

    /// `[x_min, x_max, y_min, y_max]` of the visible scale-space window.
    fn set_camera(&mut self, camera: [f32; 4]);

    fn draw(&mut self, calls: &[DrawCall]) -> ChartResult<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WebGlRenderStats {
    pub uploads: usize,
    pub reused: usize,
    pub deletes: usize,
    pub draw_calls: usize,
}

struct GpuItem {
    buffer: BufferHandle,
    shape: Shape,
    vertex_count: u32,
}

pub struct WebGlRenderer {
    context: Box<dyn GlContext>,
    device_pixel_ratio: f64,
    dimension: Dimension,
    items: HashMap<String, GpuItem>,
    last_stats: WebGlRenderStats,
    disposed: bool,
}

impl std::fmt::Debug for WebGlRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebGlRenderer")
            .field("device_pixel_ratio", &self.device_pixel_ratio)
            .field("dimension", &self.dimension)
            .field("items", &self.items.len())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl WebGlRenderer {
    #[must_use]
    pub fn new(context: Box<dyn GlContext>, device_pixel_ratio: f64) -> Self {
        let device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            context,
            device_pixel_ratio,
            dimension: Dimension::default(),
            items: HashMap::new(),
            last_stats: WebGlRenderStats::default(),
            disposed: false,
        }
    }

    #[must_use]
    pub fn last_stats(&self) -> WebGlRenderStats {
        self.last_stats
    }

    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.items.len()
    }

    fn vertices(shape: &Shape) -> Vec<LineVertex> {
        match shape {
            Shape::Polyline(coordinates) => coordinates
                .chunks_exact(2)
                .map(|pair| LineVertex {
                    position: [pair[0] as f32, pair[1] as f32],
                })
                .collect(),
            Shape::Triangle { center, .. } | Shape::Circle { center, .. } => vec![LineVertex {
                position: [center[0] as f32, center[1] as f32],
            }],
        }
    }

    fn draw_call(&self, item: &GpuItem, primitive: &SeriesPrimitive) -> DrawCall {
        let (mode, size) = match primitive.shape {
            Shape::Polyline(_) => (DrawMode::LineStrip, primitive.style.width),
            Shape::Triangle { size, .. } => (DrawMode::TriangleMarker, size),
            Shape::Circle { radius, .. } => (DrawMode::CircleMarker, radius * 2.0),
        };
        let mut color = primitive.style.color.to_rgba_f32();
        color[3] *= primitive.style.opacity as f32;
        DrawCall {
            buffer: item.buffer,
            mode,
            vertex_count: item.vertex_count,
            color,
            size: (size * self.device_pixel_ratio) as f32,
        }
    }

    fn upload(&mut self, primitive: &SeriesPrimitive) -> ChartResult<()> {
        let buffer = match self.items.get(&primitive.cache_id) {
            Some(item) => item.buffer,
            None => self.context.create_buffer()?,
        };
        let vertices = Self::vertices(&primitive.shape);
        self.context
            .upload_vertices(buffer, bytemuck::cast_slice(&vertices))?;
        self.items.insert(
            primitive.cache_id.clone(),
            GpuItem {
                buffer,
                shape: primitive.shape.clone(),
                vertex_count: vertices.len() as u32,
            },
        );
        Ok(())
    }
}

impl Renderer for WebGlRenderer {
    fn renderer_type(&self) -> RendererType {
        RendererType::WebGl
    }

    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        if self.disposed {
            return Err(ChartError::Disposed);
        }
        if self.context.is_context_lost() {
            warn!("gl context lost before render");
            return Err(ChartError::ContextLost);
        }
        frame.validate()?;

        let mut stats = WebGlRenderStats::default();
        let mut seen: HashSet<&str> = HashSet::with_capacity(frame.primitives.len());
        let mut calls = Vec::with_capacity(frame.primitives.len());
        self.context.set_camera(frame.camera.to_f32());

        for primitive in &frame.primitives {
            seen.insert(primitive.cache_id.as_str());
            if !primitive.style.visible {
                continue;
            }

            let unchanged = self
                .items
                .get(&primitive.cache_id)
                .is_some_and(|item| item.shape.same_geometry(&primitive.shape));
            if unchanged {
                stats.reused += 1;
            } else {
                self.upload(primitive)?;
                stats.uploads += 1;
            }

            if let Some(item) = self.items.get(&primitive.cache_id) {
                calls.push(self.draw_call(item, primitive));
            }
        }

        let stale: Vec<String> = self
            .items
            .keys()
            .filter(|id| !seen.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            if let Some(item) = self.items.remove(&id) {
                self.context.delete_buffer(item.buffer);
                stats.deletes += 1;
            }
        }

        stats.draw_calls = calls.len();
        self.context.draw(&calls)?;
        trace!(
            uploads = stats.uploads,
            reused = stats.reused,
            deletes = stats.deletes,
            draw_calls = stats.draw_calls,
            "gpu frame rendered"
        );
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
        self.context.set_viewport(
            (dimension.width * self.device_pixel_ratio).round() as u32,
            (dimension.height * self.device_pixel_ratio).round() as u32,
        );
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if !self.context.is_context_lost() {
            for (_, item) in self.items.drain() {
                self.context.delete_buffer(item.buffer);
            }
        }
        self.items.clear();
        debug!("gpu renderer disposed");
    }

    fn is_context_lost(&self) -> bool {
        self.context.is_context_lost()
    }
}
