use thiserror::Error;

use crate::version::Version;

#[derive(Error, Debug)]
pub enum GraderError {
    /// Malformed bytes: the entry could not be decoded into a record.
    #[error("decode error: {0}")]
    Decode(String),

    /// Well-formed record that fails a semantic check.
    #[error("validation failed: {0}")]
    Validate(String),

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    #[error("Negative height: {0}")]
    NegativeHeight(i32),

    #[error("Invalid previous winners: {0}")]
    InvalidPreviousWinners(String),

    #[error("Block key required for {0}")]
    MissingBlockKey(Version),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl GraderError {
    pub(crate) fn decode(msg: impl Into<String>) -> Self {
        GraderError::Decode(msg.into())
    }

    pub(crate) fn validate(msg: impl Into<String>) -> Self {
        GraderError::Validate(msg.into())
    }

    /// True for per-submission rejections, false for construction and plumbing errors.
    pub fn is_rejection(&self) -> bool {
        matches!(self, GraderError::Decode(_) | GraderError::Validate(_))
    }
}

impl From<prost::DecodeError> for GraderError {
    fn from(err: prost::DecodeError) -> Self {
        GraderError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GraderError>;
