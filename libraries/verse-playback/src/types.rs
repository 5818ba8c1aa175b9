//! Core types for the playback engine

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ErrorKind;

/// Minimum playback rate
pub const MIN_RATE: f32 = 0.5;

/// Maximum playback rate
pub const MAX_RATE: f32 = 2.0;

/// Track information for queue management
///
/// Opaque value supplied by the library collaborators (REST client,
/// pages). The engine never mutates it and performs no validation
/// beyond checking that a source locator is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier from the library
    pub id: String,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album name (optional)
    pub album: Option<String>,

    /// Track duration as reported by the library
    pub duration: Duration,

    /// Streamable audio locator (URL or path), passed verbatim to the
    /// media backend
    pub source: String,

    /// Optional cover art locator
    pub artwork: Option<String>,
}

/// Transport state of the playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportState {
    /// Nothing loaded
    Empty,

    /// A load for the current track is in flight
    Loading,

    /// Track loaded, paused at its current position
    Ready,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// The last load failed; cleared by the next track change or retry
    Error,
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the queue ends
    Off,

    /// Loop the entire queue
    All,

    /// Loop the current track only
    One,
}

/// Configuration for the playback engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Initial volume (0.0-1.0, default: 1.0)
    pub volume: f32,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// Initial shuffle flag (default: false)
    pub shuffled: bool,

    /// Initial playback rate (0.5-2.0, default: 1.0)
    pub rate: f32,

    /// How long a pending load may buffer before it is failed with a
    /// media-load error (default: 10 s)
    pub load_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            repeat: RepeatMode::Off,
            shuffled: false,
            rate: 1.0,
            load_timeout: Duration::from_secs(10),
        }
    }
}

/// Read-only view of the playback session
///
/// Returned by [`crate::PlaybackEngine::snapshot`]; everything a UI
/// needs to render transport controls and a progress bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Currently selected track, if any
    pub current_track: Option<Track>,

    /// Index of the current track in the queue (`None` = nothing loaded)
    pub current_index: Option<usize>,

    /// Number of tracks in the queue
    pub queue_length: usize,

    /// Transport state
    pub state: TransportState,

    /// Whether audio is playing right now
    pub is_playing: bool,

    /// Whether a load is in flight
    pub is_loading: bool,

    /// Playback position, mirrored from the media backend
    pub position: Duration,

    /// Track duration, mirrored from the media backend
    pub duration: Duration,

    /// Stored volume (0.0-1.0); the effective output level is 0 while
    /// muted
    pub volume: f32,

    /// Mute flag (preserves the stored volume)
    pub is_muted: bool,

    /// Repeat mode
    pub repeat: RepeatMode,

    /// Shuffle flag
    pub is_shuffled: bool,

    /// Playback rate (0.5-2.0)
    pub rate: f32,

    /// Last error, if any; cleared by the next track change or retry
    pub last_error: Option<ErrorKind>,
}
