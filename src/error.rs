//! Error types for the export pipeline

use thiserror::Error;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while capturing and exporting
///
/// Every variant carries its diagnostic detail in the payload; that detail
/// goes to the log channel, never to the user. [`Error::user_message`] is
/// the fixed text shown for each class.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to initialize a capture backend
    #[error("Backend initialization failed: {0}")]
    InitializationError(String),

    /// Failed to load the source document
    #[error("Failed to load document: {0}")]
    LoadError(String),

    /// The capture region did not resolve to an element
    #[error("Capture region not found: {0}")]
    RegionNotFound(String),

    /// Rendering the region to pixels failed
    #[error("Capture failed: {0}")]
    CaptureError(String),

    /// Failed to finalize or write the output document
    #[error("Serialization failed: {0}")]
    SerializationError(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// CDP-specific error
    #[cfg(feature = "cdp")]
    #[error("CDP error: {0}")]
    CdpError(String),
}

impl Error {
    /// Fixed, user-facing message for this error class.
    ///
    /// All export failures are terminal for the invocation; the only remedy
    /// is to retry the whole action, so the messages say no more than that.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::RegionNotFound(_) => "Nothing to export: the content region could not be found.",
            Error::SerializationError(_) => "Export failed while writing the PDF. Please try again.",
            _ => "Export failed while capturing the page. Please try again.",
        }
    }
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::CdpError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_fixed_per_class() {
        let a = Error::RegionNotFound("main".into());
        let b = Error::RegionNotFound("#content".into());
        assert_eq!(a.user_message(), b.user_message());

        let c = Error::CaptureError("boom".into());
        assert_ne!(a.user_message(), c.user_message());
    }
}
