use thiserror::Error;

#[derive(Debug, Error)]
pub enum DoraError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DoraError>;
