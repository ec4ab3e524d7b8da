//! Error types for the Palosheet front end

use thiserror::Error;

/// Errors raised outside function evaluation, while handling settings files
#[derive(Error, Debug)]
pub enum PalosheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, PalosheetError>;
