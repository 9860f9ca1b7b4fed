use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Metrics output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
