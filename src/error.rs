//! Error types for the pdfpress library

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the pdfpress library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or unusable upload (no file, empty filename, wrong extension)
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Page-range expression could not be parsed
    #[error("Invalid page range: {0}")]
    InvalidRangeFormat(String),

    /// A form parameter is outside its accepted values
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The document library could not parse or render the input
    #[error("Conversion failed: {0}")]
    ConversionFailed(String),
}

impl Error {
    /// True when the error is the caller's fault and should map to a 400.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MissingInput(_) | Error::InvalidRangeFormat(_) | Error::InvalidParameter(_)
        )
    }
}
