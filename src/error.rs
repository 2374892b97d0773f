use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChartError {
    #[error("invalid dimension: width={width}, height={height}")]
    InvalidDimension { width: f64, height: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid extent: min={min} must not exceed max={max}")]
    InvalidExtent { min: f64, max: f64 },

    #[error("chart is already initialized")]
    AlreadyInitialized,

    #[error("chart is not initialized")]
    NotInitialized,

    #[error("chart was used after dispose")]
    Disposed,

    #[error("renderer context was lost")]
    ContextLost,

    #[error("background worker unavailable: {0}")]
    WorkerUnavailable(String),

    #[error("background worker channel closed")]
    WorkerChannelClosed,
}
