//! Host-facing line chart component.
//!
//! [`LineChart`] wires the chart core, renderer selection and the
//! interactive overlay together; [`LineChartConfig`] is its serializable
//! setup and [`ChartEnvironment`] states what the runtime can offer.

mod config;
mod environment;
mod line_chart;

pub use config::LineChartConfig;
pub use environment::{ChartEnvironment, GlContextProvider, resolve_renderer_type};
pub use line_chart::{LineChart, LineChartEvent, Lifecycle};
