//! Verse Player - Playback Engine
//!
//! Queue and transport management for Verse Player.
//!
//! This crate provides:
//! - A single shared playback session (queue + current track)
//! - Transport controls (play/pause/seek/volume/mute/rate)
//! - Shuffle cycles (uniform Fisher-Yates) and repeat modes (Off, All, One)
//! - Load-generation tracking so stale media callbacks never corrupt state
//! - UI notifications drained as [`PlaybackEvent`]s
//! - An optional keyboard adapter ([`keyboard`])
//!
//! # Architecture
//!
//! `verse-playback` is completely platform-agnostic:
//! - No dependency on a browser runtime or audio element
//! - No dependency on the REST client or any page code
//! - No global state: one engine instance per application session,
//!   constructed explicitly and passed to UI consumers
//!
//! Access to the underlying streaming media resource goes through the
//! injected [`MediaBackend`] trait, so the queue/shuffle/repeat logic is
//! unit-testable with a fake backend. The engine is single-threaded and
//! cooperative: operations apply synchronously, and asynchronous backend
//! notifications (ready, progress, ended, error) take effect when the
//! host event loop calls [`PlaybackEngine::poll`].
//!
//! Playback never starts unsolicited: [`PlaybackEngine::set_queue`] and
//! [`PlaybackEngine::play_track`] only select and load;
//! [`PlaybackEngine::play`] is always an explicit caller step.
//!
//! # Example: Queue and transport
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use verse_playback::{EngineConfig, MediaBackend, MediaEvent, PlaybackEngine, Track};
//!
//! // Implement MediaBackend for your platform (a browser audio element,
//! // a decoder pipeline, ...). This one becomes ready instantly.
//! struct InstantBackend {
//!     events: Vec<MediaEvent>,
//!     position: Duration,
//!     duration: Duration,
//! }
//!
//! impl MediaBackend for InstantBackend {
//!     fn load(&mut self, _locator: &str, generation: u64) -> verse_playback::Result<()> {
//!         self.duration = Duration::from_secs(180);
//!         self.events.push(MediaEvent::Ready { generation });
//!         Ok(())
//!     }
//!     fn play(&mut self) -> verse_playback::Result<()> {
//!         Ok(())
//!     }
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, position: Duration) -> verse_playback::Result<()> {
//!         self.position = position;
//!         Ok(())
//!     }
//!     fn set_gain(&mut self, _gain: f32) {}
//!     fn set_rate(&mut self, _rate: f32) {}
//!     fn position(&self) -> Duration {
//!         self.position
//!     }
//!     fn duration(&self) -> Duration {
//!         self.duration
//!     }
//!     fn take_events(&mut self) -> Vec<MediaEvent> {
//!         std::mem::take(&mut self.events)
//!     }
//! }
//!
//! let backend = InstantBackend {
//!     events: Vec::new(),
//!     position: Duration::ZERO,
//!     duration: Duration::ZERO,
//! };
//! let mut engine = PlaybackEngine::new(Box::new(backend), EngineConfig::default());
//!
//! let track = Track {
//!     id: "track-1".to_string(),
//!     title: "My Song".to_string(),
//!     artist: "Artist Name".to_string(),
//!     album: Some("Album Name".to_string()),
//!     duration: Duration::from_secs(180),
//!     source: "https://media.example.com/stream/track-1".to_string(),
//!     artwork: None,
//! };
//!
//! engine.set_queue(vec![track], 0).unwrap();
//! engine.poll(Instant::now()); // consume the ready signal
//! engine.play().unwrap();
//! assert!(engine.snapshot().is_playing);
//! ```

mod backend;
mod engine;
mod error;
mod events;
pub mod keyboard;
mod queue;
mod shuffle;
pub mod types;

// Public exports
pub use backend::{MediaBackend, MediaEvent};
pub use engine::PlaybackEngine;
pub use error::{ErrorKind, PlaybackError, Result};
pub use events::PlaybackEvent;
pub use types::{EngineConfig, PlaybackSnapshot, RepeatMode, Track, TransportState};
