use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{ChartError, ChartResult};
use crate::render::{BufferHandle, DrawCall, GlContext, LineVertex};

/// Operation recorded by [`HeadlessGlContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateBuffer(BufferHandle),
    Upload { buffer: BufferHandle, vertex_count: usize },
    DeleteBuffer(BufferHandle),
    Viewport { width: u32, height: u32 },
    Camera([f32; 4]),
    Draw(Vec<DrawCall>),
}

#[derive(Debug, Default)]
struct HeadlessGlState {
    calls: Vec<GlCall>,
    buffers: HashMap<BufferHandle, Vec<LineVertex>>,
    next_buffer: u32,
    lost: bool,
}

/// GL context that records every call instead of touching a GPU.
///
/// Clones share state, so a test can keep one handle while the renderer
/// owns another, and can trigger [`HeadlessGlContext::lose_context`] at any
/// point.
#[derive(Debug, Clone, Default)]
pub struct HeadlessGlContext {
    state: Arc<Mutex<HeadlessGlState>>,
}

impl HeadlessGlContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the driver dropping the context; all buffers are lost.
    pub fn lose_context(&self) {
        let mut state = self.state.lock();
        state.lost = true;
        state.buffers.clear();
    }

    /// A fresh context after loss, sharing the call log.
    pub fn restore_context(&self) {
        self.state.lock().lost = false;
    }

    #[must_use]
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    #[must_use]
    pub fn upload_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| matches!(call, GlCall::Upload { .. }))
            .count()
    }

    #[must_use]
    pub fn live_buffer_count(&self) -> usize {
        self.state.lock().buffers.len()
    }

    #[must_use]
    pub fn buffer_vertices(&self, buffer: BufferHandle) -> Option<Vec<LineVertex>> {
        self.state.lock().buffers.get(&buffer).cloned()
    }

    #[must_use]
    pub fn last_draw(&self) -> Option<Vec<DrawCall>> {
        self.state.lock().calls.iter().rev().find_map(|call| match call {
            GlCall::Draw(draws) => Some(draws.clone()),
            _ => None,
        })
    }
}

impl GlContext for HeadlessGlContext {
    fn is_context_lost(&self) -> bool {
        self.state.lock().lost
    }

    fn create_buffer(&mut self) -> ChartResult<BufferHandle> {
        let mut state = self.state.lock();
        if state.lost {
            return Err(ChartError::ContextLost);
        }
        state.next_buffer += 1;
        let handle = BufferHandle(state.next_buffer);
        state.buffers.insert(handle, Vec::new());
        state.calls.push(GlCall::CreateBuffer(handle));
        Ok(handle)
    }

    fn upload_vertices(&mut self, buffer: BufferHandle, bytes: &[u8]) -> ChartResult<()> {
        let mut state = self.state.lock();
        if state.lost {
            return Err(ChartError::ContextLost);
        }
        let vertices: Vec<LineVertex> = bytemuck::try_cast_slice(bytes)
            .map_err(|err| ChartError::InvalidData(format!("vertex upload: {err}")))?
            .to_vec();
        let vertex_count = vertices.len();
        let Some(slot) = state.buffers.get_mut(&buffer) else {
            return Err(ChartError::InvalidData(format!(
                "unknown buffer {}",
                buffer.0
            )));
        };
        *slot = vertices;
        state.calls.push(GlCall::Upload {
            buffer,
            vertex_count,
        });
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        let mut state = self.state.lock();
        state.buffers.remove(&buffer);
        state.calls.push(GlCall::DeleteBuffer(buffer));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.state.lock().calls.push(GlCall::Viewport { width, height });
    }

    fn set_camera(&mut self, camera: [f32; 4]) {
        self.state.lock().calls.push(GlCall::Camera(camera));
    }

    fn draw(&mut self, calls: &[DrawCall]) -> ChartResult<()> {
        let mut state = self.state.lock();
        if state.lost {
            return Err(ChartError::ContextLost);
        }
        state.calls.push(GlCall::Draw(calls.to_vec()));
        Ok(())
    }
}
