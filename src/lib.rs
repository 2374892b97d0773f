//! line-chart-rs: interactive line chart engine.
//!
//! Data series go in, draw commands and interaction events come out. The
//! crate is split the way the engine works: `core` holds the data model,
//! scales and formatters, `transform` smoothing and run partitioning,
//! `render` the SVG and GPU backends, `chart` the renderer-driving core
//! (on the calling thread or on a worker), `interaction` the pan/zoom and
//! tooltip overlay, and `api` the host-facing [`LineChart`] component.

pub mod api;
pub mod chart;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;
pub mod transform;

pub use api::{ChartEnvironment, LineChart, LineChartConfig, LineChartEvent};
pub use chart::{Chart, ChartCallbacks, ChartOptions, MainThreadChart, WorkerChart};
pub use error::{ChartError, ChartResult};
