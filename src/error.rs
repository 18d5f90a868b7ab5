//! Crate-level error type.

use thiserror::Error;

use crate::integration::DecodeError;
use crate::tracker::ConfigError;
use crate::upload::{EncodeError, UploadError};

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid tracker config: {0}")]
    Tracker(#[from] ConfigError),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("invalid frame buffer: {0}")]
    Frame(#[from] ndarray::ShapeError),

    #[error("detector output: {0}")]
    Decode(#[from] DecodeError),

    #[error("image encoding: {0}")]
    Encode(#[from] EncodeError),

    #[error("upload: {0}")]
    Upload(#[from] UploadError),

    #[error("recording line {line}: {message}")]
    Replay { line: usize, message: String },

    #[error("logging already initialized: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

pub type Result<T> = std::result::Result<T, Error>;
