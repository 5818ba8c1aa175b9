//! Media backend abstraction
//!
//! Abstracts the underlying streaming media resource (a browser audio
//! element, a native decoder pipeline, ...) so the engine's queue,
//! shuffle and transport logic is testable without real audio.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Asynchronous notification from the media backend
///
/// Every event carries the load generation it belongs to. The engine
/// increments the generation on each load attempt and drops events from
/// superseded generations, so a late callback for an already-replaced
/// track can never corrupt newer state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MediaEvent {
    /// The source for this generation is buffered enough to play
    Ready { generation: u64 },

    /// Timing update while the resource plays or buffers
    Progress {
        generation: u64,
        position: Duration,
        duration: Duration,
    },

    /// Playback reached the end of the source
    Ended { generation: u64 },

    /// The source failed to load or decode
    Error { generation: u64, message: String },
}

impl MediaEvent {
    /// The load generation this event belongs to
    pub fn generation(&self) -> u64 {
        match self {
            MediaEvent::Ready { generation }
            | MediaEvent::Progress { generation, .. }
            | MediaEvent::Ended { generation }
            | MediaEvent::Error { generation, .. } => *generation,
        }
    }
}

/// Handle to the single underlying media resource
///
/// The engine owns the handle exclusively; no other component may touch
/// the resource's source or position directly. Commands apply
/// immediately; notifications are buffered by the backend and drained
/// through [`MediaBackend::take_events`] inside
/// [`crate::PlaybackEngine::poll`].
pub trait MediaBackend: Send {
    /// Begin loading `locator`. Completion is reported asynchronously as
    /// a [`MediaEvent::Ready`] or [`MediaEvent::Error`] tagged with
    /// `generation`.
    fn load(&mut self, locator: &str, generation: u64) -> Result<()>;

    /// Start or resume playback of the loaded source.
    ///
    /// May fail when the host environment rejects the request (autoplay
    /// policy, permissions).
    fn play(&mut self) -> Result<()>;

    /// Pause playback; position is retained
    fn pause(&mut self);

    /// Jump to `position` in the loaded source
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Effective output level, 0.0 (silent) to 1.0 (unity)
    fn set_gain(&mut self, gain: f32);

    /// Playback rate multiplier
    fn set_rate(&mut self, rate: f32);

    /// Current playback position
    fn position(&self) -> Duration;

    /// Duration of the loaded source (zero when unknown)
    fn duration(&self) -> Duration;

    /// Drain buffered notifications, oldest first
    fn take_events(&mut self) -> Vec<MediaEvent>;
}

/// Backend stub whose loads become ready immediately
///
/// Used by unit tests. Integration tests use the scripted fake in
/// `tests/common`, which can defer and fail loads.
#[cfg(test)]
pub(crate) struct NullBackend {
    events: Vec<MediaEvent>,
    position: Duration,
    duration: Duration,
    pub playing: bool,
    pub gain: f32,
    pub rate: f32,
}

#[cfg(test)]
impl NullBackend {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            position: Duration::ZERO,
            duration: Duration::ZERO,
            playing: false,
            gain: 1.0,
            rate: 1.0,
        }
    }
}

#[cfg(test)]
impl MediaBackend for NullBackend {
    fn load(&mut self, _locator: &str, generation: u64) -> Result<()> {
        self.position = Duration::ZERO;
        self.duration = Duration::from_secs(180);
        self.playing = false;
        self.events.push(MediaEvent::Ready { generation });
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.position = position;
        Ok(())
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn take_events(&mut self) -> Vec<MediaEvent> {
        std::mem::take(&mut self.events)
    }
}
