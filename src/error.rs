use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum HubError {
    #[error("Telemetry source request failed: {0}")]
    Source(#[from] reqwest::Error),

    #[error("Invalid telemetry source URL: {0}")]
    InvalidSourceUrl(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Reading for sensor {0} carries neither temperature nor humidity")]
    EmptyReading(String),

    #[error("Collector is already running")]
    AlreadyRunning,

    #[error("Collector has been stopped and cannot be restarted")]
    Terminated,
}

pub type Result<T> = std::result::Result<T, HubError>;
