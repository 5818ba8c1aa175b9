//! Shared test backend
//!
//! A scripted `MediaBackend` with a control handle: the engine owns the
//! backend box while tests keep the handle, so loads can be completed or
//! failed and tracks finished after ownership moves into the engine.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use verse_playback::{MediaBackend, MediaEvent, PlaybackError, Result};

#[derive(Debug)]
struct Inner {
    events: Vec<MediaEvent>,
    /// Locator + generation of every load, in order
    loads: Vec<(String, u64)>,
    /// Complete loads immediately instead of waiting for the control
    /// handle
    auto_ready: bool,
    /// Duration reported once a load completes
    ready_duration: Duration,
    position: Duration,
    duration: Duration,
    playing: bool,
    gain: f32,
    rate: f32,
    /// Reject play() like a host autoplay policy would
    reject_play: bool,
    seeks: Vec<Duration>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            loads: Vec::new(),
            auto_ready: true,
            ready_duration: Duration::from_secs(180),
            position: Duration::ZERO,
            duration: Duration::ZERO,
            playing: false,
            gain: 1.0,
            rate: 1.0,
            reject_play: false,
            seeks: Vec::new(),
        }
    }
}

/// The half handed to the engine
pub struct FakeBackend(Arc<Mutex<Inner>>);

/// The half the test keeps
#[derive(Clone)]
pub struct BackendControl(Arc<Mutex<Inner>>);

/// Build a connected backend/control pair
pub fn fake_backend() -> (FakeBackend, BackendControl) {
    let inner = Arc::new(Mutex::new(Inner::default()));
    (FakeBackend(Arc::clone(&inner)), BackendControl(inner))
}

impl BackendControl {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.0.lock().unwrap()
    }

    /// Switch to manual load completion
    pub fn set_auto_ready(&self, auto_ready: bool) {
        self.lock().auto_ready = auto_ready;
    }

    pub fn set_ready_duration(&self, duration: Duration) {
        self.lock().ready_duration = duration;
    }

    /// Complete a pending load, as the media element's canplay would
    pub fn complete_load(&self, generation: u64) {
        let mut inner = self.lock();
        inner.duration = inner.ready_duration;
        inner.events.push(MediaEvent::Ready { generation });
    }

    /// Fail a pending load
    pub fn fail_load(&self, generation: u64, message: &str) {
        self.lock().events.push(MediaEvent::Error {
            generation,
            message: message.to_string(),
        });
    }

    /// Signal that playback reached the end of the current source
    pub fn finish_track(&self) {
        let mut inner = self.lock();
        let generation = inner.loads.last().map(|(_, g)| *g).unwrap_or(0);
        inner.playing = false;
        inner.position = inner.duration;
        inner.events.push(MediaEvent::Ended { generation });
    }

    pub fn set_position(&self, position: Duration) {
        self.lock().position = position;
    }

    pub fn set_reject_play(&self, reject: bool) {
        self.lock().reject_play = reject;
    }

    /// Locator + generation of the most recent load
    pub fn last_load(&self) -> Option<(String, u64)> {
        self.lock().loads.last().cloned()
    }

    /// Generation of the most recent load (0 when none happened)
    pub fn last_generation(&self) -> u64 {
        self.lock().loads.last().map(|(_, g)| *g).unwrap_or(0)
    }

    pub fn load_count(&self) -> usize {
        self.lock().loads.len()
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    pub fn gain(&self) -> f32 {
        self.lock().gain
    }

    pub fn rate(&self) -> f32 {
        self.lock().rate
    }

    /// Every seek the engine issued, in order
    pub fn seeks(&self) -> Vec<Duration> {
        self.lock().seeks.clone()
    }
}

impl MediaBackend for FakeBackend {
    fn load(&mut self, locator: &str, generation: u64) -> Result<()> {
        let mut inner = self.0.lock().unwrap();
        inner.loads.push((locator.to_string(), generation));
        inner.playing = false;
        inner.position = Duration::ZERO;
        inner.duration = Duration::ZERO;
        if inner.auto_ready {
            inner.duration = inner.ready_duration;
            inner.events.push(MediaEvent::Ready { generation });
        }
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let mut inner = self.0.lock().unwrap();
        if inner.reject_play {
            return Err(PlaybackError::Playback(
                "play request rejected by host".to_string(),
            ));
        }
        inner.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.0.lock().unwrap().playing = false;
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        let mut inner = self.0.lock().unwrap();
        inner.position = position;
        inner.seeks.push(position);
        Ok(())
    }

    fn set_gain(&mut self, gain: f32) {
        self.0.lock().unwrap().gain = gain;
    }

    fn set_rate(&mut self, rate: f32) {
        self.0.lock().unwrap().rate = rate;
    }

    fn position(&self) -> Duration {
        self.0.lock().unwrap().position
    }

    fn duration(&self) -> Duration {
        self.0.lock().unwrap().duration
    }

    fn take_events(&mut self) -> Vec<MediaEvent> {
        std::mem::take(&mut self.0.lock().unwrap().events)
    }
}
