//! Error types for the playback engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Playback errors
///
/// Every variant is recoverable: the engine records the error in its
/// state snapshot and stays usable. It never retries on its own; retry
/// is a caller decision (e.g. re-invoke `play()`).
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Media source could not be loaded or decoded (also covers
    /// buffering timeouts)
    #[error("failed to load media: {0}")]
    MediaLoad(String),

    /// Operation requires a current track but none is selected
    #[error("no track selected")]
    NoTrackSelected,

    /// The media backend rejected a play or seek request
    #[error("playback rejected: {0}")]
    Playback(String),
}

impl PlaybackError {
    /// Classification of this error, as recorded in the state snapshot
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaybackError::MediaLoad(_) => ErrorKind::MediaLoad,
            PlaybackError::NoTrackSelected => ErrorKind::NoTrackSelected,
            PlaybackError::Playback(_) => ErrorKind::Playback,
        }
    }
}

/// Error classification exposed through the state snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Source unreachable, unsupported, corrupt, or timed out buffering
    MediaLoad,

    /// No current track for an operation that needs one
    NoTrackSelected,

    /// The underlying resource rejected a play/seek request
    Playback,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
