use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by channel construction and the watch window.
///
/// Submission never returns one of these: a rejected write is reported as
/// [`crate::Delivery::Dropped`] instead.
#[derive(Debug, Error)]
pub enum XtbugError {
    /// The FIFO could not be removed and recreated.
    #[error("failed to create transport {path:?}: {source}")]
    TransportCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open transport {path:?}: {source}")]
    TransportOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch watch window: {0}")]
    Launch(#[source] io::Error),

    /// The byte stream no longer lines up with record boundaries.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = XtbugError> = std::result::Result<T, E>;
