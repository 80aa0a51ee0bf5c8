//! Error taxonomy for remote operations
//!
//! Every error is raised synchronously to the caller. Nothing here is
//! retried automatically.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to the engine
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Remote library is not initialised, call initialise() first")]
    NotInitialised,

    #[error("Not connected to Voicemeeter")]
    NotConnected,

    #[error("Login failed with status {code}")]
    ConnectionFailed { code: i32 },

    #[error("Logout failed with status {code}")]
    DisconnectFailed { code: i32 },

    #[error("Voicemeeter seems not to be installed (type code {code})")]
    EngineNotInstalled { code: i32 },

    #[error("{call} returned status {code}")]
    NativeCall { call: &'static str, code: i32 },

    #[error("Remote library not found: {0}")]
    LibraryNotFound(String),

    #[error("Failed to load {}: {reason}", path.display())]
    LibraryLoad { path: PathBuf, reason: String },

    #[error("Remote library is missing symbol {0}")]
    MissingSymbol(&'static str),

    #[error("Text contains an interior NUL byte: {0:?}")]
    InteriorNul(String),

    #[error("Remote worker thread is gone")]
    HandleClosed,
}

impl RemoteError {
    /// Whether the operation was invoked in the wrong lifecycle state
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::NotInitialised | Self::NotConnected)
    }
}

/// Result alias for remote operations
pub type Result<T> = std::result::Result<T, RemoteError>;
