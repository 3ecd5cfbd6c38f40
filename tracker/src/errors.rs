use thiserror::Error;

use crate::dispatch::TransportError;
use crate::store::StoreError;

/// Result type alias for tracker operations
pub type Result<T, E = TrackerError> = std::result::Result<T, E>;

/// Errors that can occur while handling an event
///
/// Everything here is caught at the event-handler boundary. The host
/// runtime never sees an error, only a terminal outcome.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("visitor store error: {0}")]
    Store(#[from] StoreError),

    #[error("dispatch failed: {0}")]
    Transport(#[from] TransportError),
}
