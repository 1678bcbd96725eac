use std::io;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, HopperError>;

/// Errors surfaced by the conversion tools.
#[derive(Debug, Error)]
pub enum HopperError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("format error: {0}")]
    Format(String),
    #[error("corruption detected: {0}")]
    Corruption(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("encoder failed: {0}")]
    Encoder(String),
}
