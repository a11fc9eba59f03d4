use thiserror::Error;

#[derive(Error, Debug)]
pub enum FirError {
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Invalid filter template '{name}': {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("Filter '{0}' is already registered")]
    DuplicateFilter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

impl FirError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FirError>;
