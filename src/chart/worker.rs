//! Chart whose renderer lives on a dedicated thread.
//!
//! The host side only sends commands and polls events; it never waits on
//! a draw. Commands carry sequence numbers echoed back once applied, and
//! the worker redraws once per drained batch of commands.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, trace, warn};

use crate::chart::{Chart, ChartCallbacks, ChartOptions, MainThreadChart};
use crate::core::{DataSeries, DataSeriesMetadataMap, Dimension, Extent, ScaleType};
use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;

/// How long `spawn` waits for the worker to build its renderer.
const WORKER_READY_TIMEOUT: Duration = Duration::from_secs(5);

const WORKER_THREAD_NAME: &str = "line-chart-worker";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerCommandKind {
    SetMetadata,
    SetData,
    SetXScaleType,
    SetYScaleType,
    SetViewBox,
    Resize,
}

#[derive(Debug)]
enum WorkerCommand {
    SetMetadata(DataSeriesMetadataMap),
    SetData(Arc<[DataSeries]>),
    SetXScaleType(ScaleType),
    SetYScaleType(ScaleType),
    SetViewBox(Extent),
    Resize(Dimension),
    Dispose,
}

#[derive(Debug)]
struct WorkerMessage {
    seq: u64,
    command: WorkerCommand,
}

/// Messages from the worker back to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    Ready,
    InitFailed(ChartError),
    Applied { seq: u64, kind: WorkerCommandKind },
    Failed { seq: u64, error: ChartError },
    /// Every command up to `seq` is applied and the resulting frame drawn.
    Idle { seq: u64 },
    DrawEnd,
    ContextLost,
    Disposed,
}

pub struct WorkerChart {
    sender: Option<Sender<WorkerMessage>>,
    events: Receiver<WorkerEvent>,
    handle: Option<JoinHandle<()>>,
    callbacks: ChartCallbacks,
    next_seq: u64,
    last_applied_seq: Option<u64>,
    last_idle_seq: Option<u64>,
    draw_count: u64,
    context_lost: bool,
    worker_exited: bool,
    disposed: bool,
}

impl std::fmt::Debug for WorkerChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerChart")
            .field("next_seq", &self.next_seq)
            .field("last_applied_seq", &self.last_applied_seq)
            .field("draw_count", &self.draw_count)
            .field("context_lost", &self.context_lost)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl WorkerChart {
    /// Starts the worker thread and builds the renderer on it.
    ///
    /// Fails with `ChartError::WorkerUnavailable` when the thread cannot be
    /// spawned or the renderer cannot be created there; callers fall back
    /// to a [`MainThreadChart`].
    pub fn spawn<F>(renderer_factory: F, options: ChartOptions) -> ChartResult<Self>
    where
        F: FnOnce() -> ChartResult<Box<dyn Renderer>> + Send + 'static,
    {
        let ChartOptions {
            dimension,
            callbacks,
            line_width,
            ..
        } = options;
        let (command_tx, command_rx) = mpsc::channel::<WorkerMessage>();
        let (event_tx, event_rx) = mpsc::channel::<WorkerEvent>();

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_owned())
            .spawn(move || {
                run_worker(renderer_factory, dimension, line_width, &command_rx, &event_tx);
            })
            .map_err(|err| ChartError::WorkerUnavailable(err.to_string()))?;

        match event_rx.recv_timeout(WORKER_READY_TIMEOUT) {
            Ok(WorkerEvent::Ready) => {}
            Ok(WorkerEvent::InitFailed(err)) => {
                warn!(error = %err, "worker renderer initialization failed");
                return Err(ChartError::WorkerUnavailable(err.to_string()));
            }
            Ok(other) => {
                return Err(ChartError::WorkerUnavailable(format!(
                    "unexpected worker handshake: {other:?}"
                )));
            }
            Err(err) => {
                return Err(ChartError::WorkerUnavailable(format!(
                    "worker did not become ready: {err}"
                )));
            }
        }

        debug!(
            width = dimension.width,
            height = dimension.height,
            "worker chart ready"
        );
        Ok(Self {
            sender: Some(command_tx),
            events: event_rx,
            handle: Some(handle),
            callbacks,
            next_seq: 0,
            last_applied_seq: None,
            last_idle_seq: None,
            draw_count: 0,
            context_lost: false,
            worker_exited: false,
            disposed: false,
        })
    }

    /// Sequence number of the last command the worker applied.
    #[must_use]
    pub fn last_applied_seq(&self) -> Option<u64> {
        self.last_applied_seq
    }

    /// Sequence number the next command will carry.
    #[must_use]
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    #[must_use]
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    #[must_use]
    pub fn is_context_lost(&self) -> bool {
        self.context_lost
    }

    fn ensure_live(&self, operation: &'static str) -> ChartResult<()> {
        if self.disposed {
            error!(operation, "worker chart used after dispose");
            return Err(ChartError::Disposed);
        }
        Ok(())
    }

    fn send(&mut self, operation: &'static str, command: WorkerCommand) -> ChartResult<u64> {
        self.ensure_live(operation)?;
        let Some(sender) = self.sender.as_ref() else {
            return Err(ChartError::WorkerChannelClosed);
        };
        let seq = self.next_seq;
        sender
            .send(WorkerMessage { seq, command })
            .map_err(|_| {
                warn!(operation, seq, "worker channel closed");
                ChartError::WorkerChannelClosed
            })?;
        self.next_seq += 1;
        trace!(operation, seq, "command sent to worker");
        Ok(seq)
    }

    fn handle_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Applied { seq, kind } => {
                trace!(seq, ?kind, "worker applied command");
                self.last_applied_seq = Some(seq);
            }
            WorkerEvent::Failed { seq, error } => {
                warn!(seq, error = %error, "worker failed to apply command");
                self.last_applied_seq = Some(seq);
            }
            WorkerEvent::Idle { seq } => {
                self.last_idle_seq = Some(seq);
            }
            WorkerEvent::DrawEnd => {
                self.draw_count += 1;
                self.callbacks.draw_end();
            }
            WorkerEvent::ContextLost => {
                self.context_lost = true;
                self.callbacks.context_lost();
            }
            WorkerEvent::Disposed => {
                self.worker_exited = true;
            }
            WorkerEvent::Ready | WorkerEvent::InitFailed(_) => {}
        }
    }

    /// Dispatches every event the worker has produced so far without
    /// blocking. Returns the number of events handled.
    pub fn poll_events(&mut self) -> ChartResult<usize> {
        let mut handled = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                    handled += 1;
                }
                Err(TryRecvError::Empty) => return Ok(handled),
                Err(TryRecvError::Disconnected) => {
                    self.worker_exited = true;
                    if self.disposed {
                        return Ok(handled);
                    }
                    warn!("worker exited unexpectedly");
                    return Err(ChartError::WorkerChannelClosed);
                }
            }
        }
    }

    /// Blocks until every command sent so far is applied and drawn, or
    /// `timeout` elapses. Meant for tests and shutdown paths.
    pub fn wait_for_idle(&mut self, timeout: Duration) -> ChartResult<bool> {
        let Some(target) = self.next_seq.checked_sub(1) else {
            return Ok(true);
        };
        self.wait_until(timeout, |chart| {
            chart.last_idle_seq.is_some_and(|seq| seq >= target)
        })
    }

    /// Blocks until the worker thread has acknowledged dispose and exited.
    pub fn wait_for_shutdown(&mut self, timeout: Duration) -> bool {
        let exited = self
            .wait_until(timeout, |chart| chart.worker_exited)
            .unwrap_or(true);
        if exited {
            if let Some(handle) = self.handle.take() {
                if handle.join().is_err() {
                    error!("worker thread panicked");
                }
            }
        }
        exited
    }

    fn wait_until(
        &mut self,
        timeout: Duration,
        done: impl Fn(&Self) -> bool,
    ) -> ChartResult<bool> {
        let deadline = Instant::now() + timeout;
        while !done(self) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(false);
            }
            match self.events.recv_timeout(remaining) {
                Ok(event) => self.handle_event(event),
                Err(RecvTimeoutError::Timeout) => return Ok(false),
                Err(RecvTimeoutError::Disconnected) => {
                    self.worker_exited = true;
                    if done(self) {
                        return Ok(true);
                    }
                    return Err(ChartError::WorkerChannelClosed);
                }
            }
        }
        Ok(true)
    }
}

impl Chart for WorkerChart {
    fn set_metadata(&mut self, metadata: &DataSeriesMetadataMap) -> ChartResult<()> {
        self.send("set_metadata", WorkerCommand::SetMetadata(metadata.clone()))
            .map(drop)
    }

    fn set_data(&mut self, data: Arc<[DataSeries]>) -> ChartResult<()> {
        self.send("set_data", WorkerCommand::SetData(data))
            .map(drop)
    }

    fn set_x_scale_type(&mut self, scale_type: ScaleType) -> ChartResult<()> {
        self.send("set_x_scale_type", WorkerCommand::SetXScaleType(scale_type))
            .map(drop)
    }

    fn set_y_scale_type(&mut self, scale_type: ScaleType) -> ChartResult<()> {
        self.send("set_y_scale_type", WorkerCommand::SetYScaleType(scale_type))
            .map(drop)
    }

    fn set_view_box(&mut self, view_box: Extent) -> ChartResult<()> {
        self.send("set_view_box", WorkerCommand::SetViewBox(view_box))
            .map(drop)
    }

    fn resize(&mut self, dimension: Dimension) -> ChartResult<()> {
        if !dimension.is_well_formed() {
            return Err(ChartError::InvalidDimension {
                width: dimension.width,
                height: dimension.height,
            });
        }
        self.send("resize", WorkerCommand::Resize(dimension))
            .map(drop)
    }

    /// Redraws happen on the worker; flushing dispatches its events.
    fn flush(&mut self) -> ChartResult<()> {
        self.ensure_live("flush")?;
        self.poll_events().map(drop)
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(sender) = self.sender.take() {
            let seq = self.next_seq;
            if sender
                .send(WorkerMessage {
                    seq,
                    command: WorkerCommand::Dispose,
                })
                .is_err()
            {
                debug!("worker already gone at dispose");
            }
            self.next_seq += 1;
        }
        self.disposed = true;
        debug!(draw_count = self.draw_count, "worker chart disposed");
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for WorkerChart {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn run_worker<F>(
    renderer_factory: F,
    dimension: Dimension,
    line_width: f64,
    commands: &Receiver<WorkerMessage>,
    events: &Sender<WorkerEvent>,
) where
    F: FnOnce() -> ChartResult<Box<dyn Renderer>>,
{
    let renderer = match renderer_factory() {
        Ok(renderer) => renderer,
        Err(err) => {
            let _ = events.send(WorkerEvent::InitFailed(err));
            return;
        }
    };

    let draw_events = events.clone();
    let lost_events = events.clone();
    let callbacks = ChartCallbacks::default()
        .with_on_draw_end(move || {
            let _ = draw_events.send(WorkerEvent::DrawEnd);
        })
        .with_on_context_lost(move || {
            let _ = lost_events.send(WorkerEvent::ContextLost);
        });
    let options = ChartOptions::new(dimension)
        .with_callbacks(callbacks)
        .with_line_width(line_width)
        .with_coalesce_updates(true);

    let mut chart = match MainThreadChart::new(renderer, options) {
        Ok(chart) => chart,
        Err(err) => {
            let _ = events.send(WorkerEvent::InitFailed(err));
            return;
        }
    };
    if events.send(WorkerEvent::Ready).is_err() {
        chart.dispose();
        return;
    }

    while let Ok(first) = commands.recv() {
        let mut last_seq = first.seq;
        for message in std::iter::once(first).chain(commands.try_iter()) {
            last_seq = message.seq;
            let Some((kind, result)) = apply_command(&mut chart, message.command) else {
                chart.dispose();
                let _ = events.send(WorkerEvent::Disposed);
                return;
            };
            let event = match result {
                Ok(()) => WorkerEvent::Applied {
                    seq: message.seq,
                    kind,
                },
                Err(error) => WorkerEvent::Failed {
                    seq: message.seq,
                    error,
                },
            };
            let _ = events.send(event);
        }

        if let Err(error) = chart.flush() {
            warn!(error = %error, "worker redraw failed");
            let _ = events.send(WorkerEvent::Failed {
                seq: last_seq,
                error,
            });
        }
        let _ = events.send(WorkerEvent::Idle { seq: last_seq });
    }

    debug!("worker command channel closed, disposing");
    chart.dispose();
}

/// Applies one command; `None` means dispose was requested.
fn apply_command(
    chart: &mut MainThreadChart,
    command: WorkerCommand,
) -> Option<(WorkerCommandKind, ChartResult<()>)> {
    let applied = match command {
        WorkerCommand::SetMetadata(metadata) => {
            (WorkerCommandKind::SetMetadata, chart.set_metadata(&metadata))
        }
        WorkerCommand::SetData(data) => (WorkerCommandKind::SetData, chart.set_data(data)),
        WorkerCommand::SetXScaleType(scale_type) => (
            WorkerCommandKind::SetXScaleType,
            chart.set_x_scale_type(scale_type),
        ),
        WorkerCommand::SetYScaleType(scale_type) => (
            WorkerCommandKind::SetYScaleType,
            chart.set_y_scale_type(scale_type),
        ),
        WorkerCommand::SetViewBox(view_box) => {
            (WorkerCommandKind::SetViewBox, chart.set_view_box(view_box))
        }
        WorkerCommand::Resize(dimension) => (WorkerCommandKind::Resize, chart.resize(dimension)),
        WorkerCommand::Dispose => return None,
    };
    Some(applied)
}
