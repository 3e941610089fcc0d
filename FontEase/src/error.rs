//! Error types for the FontEase engine
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("Font enumeration error: {0}")]
    Enumeration(String),

    #[error("Invalid font file: {0}")]
    InvalidFontFile(String),

    #[error("Insufficient privileges: {0}")]
    InsufficientPrivilege(String),

    #[error("Unknown font: {0}")]
    UnknownFont(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("No snapshot to restore from (no font change has been applied)")]
    NoSnapshot,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid file path")]
    InvalidPath,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(windows)]
    #[error("Windows error: {0}")]
    Windows(#[from] windows::core::Error),
}

impl FontError {
    /// Stable process exit code for the CLI boundary.
    ///
    /// Each error kind maps to exactly one exit code so scripts driving the
    /// binary can distinguish failure modes without parsing stderr.
    pub fn exit_code(&self) -> u8 {
        match self {
            FontError::Enumeration(_) => 10,
            FontError::InvalidFontFile(_) => 11,
            FontError::InsufficientPrivilege(_) => 12,
            FontError::UnknownFont(_) => 13,
            FontError::Persistence(_) => 14,
            FontError::NoSnapshot => 15,
            FontError::Cancelled => 16,
            FontError::InvalidPath => 17,
            FontError::Io(_) => 18,
            #[cfg(windows)]
            FontError::Windows(_) => 19,
        }
    }
}

pub type Result<T> = std::result::Result<T, FontError>;
