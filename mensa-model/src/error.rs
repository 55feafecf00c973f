use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug)]
pub enum ModelError {
    InvalidBanner(String),
    UnknownMediaType(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidBanner(msg) => write!(f, "invalid banner: {msg}"),
            ModelError::UnknownMediaType(mime) => {
                write!(f, "unknown media type: {mime}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
