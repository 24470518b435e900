use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Firmware signature not found ({scanned} bytes scanned)")]
    SignatureNotFound { scanned: usize },

    #[error(
        "Cortex-A size field out of bounds for signature at {signature_start:#x} (size: {size:?})"
    )]
    SizeFieldOutOfBounds {
        signature_start: usize,
        size: Option<u32>,
    },

    #[error("Cortex-M stack marker not found at or before offset {limit:#x}")]
    MarkerNotFound { limit: usize },

    #[error("Invalid firmware region [{start:#x}, {end:#x}) in buffer of {len:#x} bytes")]
    InvalidFirmwareRegion { start: usize, end: usize, len: usize },

    #[error("Failed to acquire boot image: {0}")]
    Acquisition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Whether the error comes from the pattern heuristics rather than I/O.
    ///
    /// These are terminal for a given boot image; retrying reproduces them.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(
            self,
            Error::SignatureNotFound { .. }
                | Error::SizeFieldOutOfBounds { .. }
                | Error::MarkerNotFound { .. }
                | Error::InvalidFirmwareRegion { .. }
        )
    }
}
