use std::path::PathBuf;

use thiserror::Error;

/// Every failure a user action can hit. `Display` is the one-line message shown
/// to the user; there is no retry and no partial-success state.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("An analysis is already in progress")]
    Busy,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Could not read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not save the analysis to {}: {source}", path.display())]
    SaveFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not reach the service: {0}")]
    Network(#[from] reqwest::Error),

    #[error("The service returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("The service returned an empty response")]
    EmptyResponse,

    #[error("The response stream was interrupted: {0}")]
    Stream(String),

    #[error("Upload to storage failed ({status}): {message}")]
    Upload { status: u16, message: String },
}
