use std::io;

use stocker_core::config::ConfigError;
use stocker_core::remote::RemoteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] stocker_core::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No account selected. Pass --account <ID> or set STOCKER_ACCOUNT_ID.")]
    MissingAccount,
    #[error("Failed to resolve CLI data directory; pass --db-path or set STOCKER_DB_PATH")]
    NoDataDir,
}
