//! Playback notifications
//!
//! Event-based communication for UI synchronization. The engine buffers
//! events internally; callers drain them with
//! [`crate::PlaybackEngine::drain_events`]. Events are emitted at least
//! on every transport-state change, and on every poll while playing.

use serde::{Deserialize, Serialize};

use crate::types::{RepeatMode, TransportState};

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Transport state changed (playing, paused, loading, ...)
    StateChanged {
        /// The new transport state
        state: TransportState,
    },

    /// A different track became current
    TrackChanged {
        /// ID of the new current track
        track_id: String,
        /// ID of the previous track (if any)
        previous_track_id: Option<String>,
    },

    /// The current track played to its natural end
    TrackFinished {
        /// ID of the finished track
        track_id: String,
    },

    /// Periodic timing update while playing
    PositionUpdate {
        /// Current playback position
        position_ms: u64,
        /// Total track duration
        duration_ms: u64,
    },

    /// Volume or mute state changed
    VolumeChanged {
        /// Stored volume (0.0-1.0)
        volume: f32,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Playback rate changed
    RateChanged {
        /// New rate (0.5-2.0)
        rate: f32,
    },

    /// Repeat mode changed
    RepeatChanged {
        /// The new mode
        mode: RepeatMode,
    },

    /// Shuffle was toggled
    ShuffleChanged {
        /// Whether shuffle is now on
        enabled: bool,
    },

    /// Queue contents changed (set, appended, removed, cleared)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// A recoverable error occurred
    Error {
        /// Human-readable message
        message: String,
    },
}
