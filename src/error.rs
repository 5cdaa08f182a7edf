use std::path::PathBuf;

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while syncing records.
///
/// Only `ConfigMissing` and `ConfigInvalid` are fatal, and only at startup;
/// mid-loop the daemon logs and waits for the next cycle instead.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("config file not found at {}", path.display())]
    ConfigMissing { path: PathBuf },

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider api error: {0}")]
    Api(String),

    #[error("config i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
