//! Durable tournament storage.
//!
//! One JSON file per tournament under a fixed tournaments directory. The
//! codec ([`codec`]) is a pure structured-value transformation; all file
//! I/O lives in [`files`] and is invoked explicitly by the caller at save
//! and load points of its choosing.

use thiserror::Error;

use crate::tournament::entities::ChessId;

pub mod codec;
pub mod files;

pub use codec::{MatchRecord, PlayerRecord, RoundRecord, TournamentRecord, decode, encode};
pub use files::{StoreConfig, TournamentStore};

/// Errors reported by the codec and the file store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No snapshot exists for the requested tournament. Callers may treat
    /// this as "no prior state" rather than a failure.
    #[error("no saved tournament named {0:?}")]
    NotFound(String),
    /// A match references a chess id absent from the snapshot's roster.
    /// This is a data-integrity error and always aborts a load.
    #[error("match references chess id {0} which is not in the roster")]
    UnknownPlayer(ChessId),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tournament data: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl PartialEq for StoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::UnknownPlayer(a), Self::UnknownPlayer(b)) => a == b,
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            (Self::Malformed(_), Self::Malformed(_)) => true,
            _ => false,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
