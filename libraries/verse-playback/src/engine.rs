//! Playback engine - core orchestration
//!
//! Coordinates the queue, shuffle cycle, transport state and the
//! binding to the underlying media backend.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::{
    backend::{MediaBackend, MediaEvent},
    error::{ErrorKind, PlaybackError, Result},
    events::PlaybackEvent,
    queue::{PlayQueue, Removed},
    shuffle::ShuffleCycle,
    types::{EngineConfig, PlaybackSnapshot, RepeatMode, Track, TransportState, MAX_RATE, MIN_RATE},
};

/// Bookkeeping for a load that has been issued but not yet acknowledged
///
/// Each load attempt carries its own generation; only backend events
/// matching the current generation are honored, so a stale callback for
/// a superseded load can never corrupt newer state.
#[derive(Debug)]
struct PendingLoad {
    generation: u64,

    /// When the load is failed with a media error if still unacknowledged
    deadline: Instant,

    /// Resume playback once the load completes
    resume: bool,

    /// Seek issued while the load was in flight; last writer wins
    seek_to: Option<Duration>,
}

/// Central playback session
///
/// One engine instance per application session, constructed explicitly
/// with an injected [`MediaBackend`] and passed by reference to UI
/// consumers. Owns the queue, the shuffle cycle, the transport state and
/// the media backend handle; dropping the engine releases the backend.
///
/// All operations are synchronous and atomic with respect to each other
/// (the engine is single-threaded and cooperative). Asynchronous backend
/// notifications only take effect inside [`PlaybackEngine::poll`], which
/// the host event loop should call at a bounded interval (at most 250 ms
/// apart while playing, for smooth progress rendering).
///
/// Neither [`set_queue`](PlaybackEngine::set_queue) nor
/// [`play_track`](PlaybackEngine::play_track) starts playback on its
/// own: unsolicited audio start is disallowed by host embedding
/// environments, so [`play`](PlaybackEngine::play) is always an explicit
/// caller step.
pub struct PlaybackEngine {
    queue: PlayQueue,
    shuffle_cycle: ShuffleCycle,

    state: TransportState,
    position: Duration,
    duration: Duration,

    volume: f32,
    muted: bool,
    rate: f32,
    repeat: RepeatMode,
    shuffled: bool,

    last_error: Option<ErrorKind>,

    backend: Box<dyn MediaBackend>,
    generation: u64,
    pending_load: Option<PendingLoad>,
    load_timeout: Duration,

    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackEngine {
    /// Create a new engine around a media backend
    pub fn new(backend: Box<dyn MediaBackend>, config: EngineConfig) -> Self {
        let mut engine = Self {
            queue: PlayQueue::new(),
            shuffle_cycle: ShuffleCycle::new(),
            state: TransportState::Empty,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            volume: config.volume.clamp(0.0, 1.0),
            muted: false,
            rate: config.rate.clamp(MIN_RATE, MAX_RATE),
            repeat: config.repeat,
            shuffled: config.shuffled,
            last_error: None,
            backend,
            generation: 0,
            pending_load: None,
            load_timeout: config.load_timeout,
            pending_events: Vec::new(),
        };
        engine.push_gain();
        let rate = engine.rate;
        engine.backend.set_rate(rate);
        engine
    }

    // ===== Queue Management =====

    /// Replace the queue and select `start_index` (clamped)
    ///
    /// Loads the selected track but does not start playback. An empty
    /// `tracks` empties the session.
    pub fn set_queue(&mut self, tracks: Vec<Track>, start_index: usize) -> Result<()> {
        self.shuffle_cycle.clear();
        let previous = self.current_track_id();
        self.queue.set_tracks(tracks, start_index);
        self.emit_queue_changed();
        if self.queue.is_empty() {
            self.unload();
            return Ok(());
        }
        self.emit_track_changed(previous);
        self.begin_load(false)
    }

    /// Append a track to the queue; selection and playback are
    /// unaffected
    pub fn enqueue(&mut self, track: Track) {
        self.queue.push(track);
        self.shuffle_cycle.clear();
        self.emit_queue_changed();
    }

    /// Remove the track at `index`; out of bounds is a no-op.
    ///
    /// Removing the current track tears the session down to `Empty`; the
    /// caller starts over with `set_queue` or `play_track`. Removing an
    /// earlier track keeps the selection on the same logical track.
    pub fn dequeue(&mut self, index: usize) {
        let Some(removed) = self.queue.remove(index) else {
            return;
        };
        self.shuffle_cycle.clear();
        if matches!(removed, Removed::Current(_)) {
            self.unload();
        }
        self.emit_queue_changed();
    }

    /// Select `track` as current, appending it if it is not already in
    /// the queue (matched by identifier), and load it.
    ///
    /// Same autoplay policy as `set_queue`: the track only loads; the
    /// caller decides when to `play()`.
    pub fn play_track(&mut self, track: Track) -> Result<()> {
        let previous = self.current_track_id();
        match self.queue.position_of(&track.id) {
            Some(index) => {
                self.queue.select(index);
            }
            None => {
                self.queue.push(track);
                self.shuffle_cycle.clear();
                let last = self.queue.len() - 1;
                self.queue.select(last);
                self.emit_queue_changed();
            }
        }
        self.emit_track_changed(previous);
        self.begin_load(false)
    }

    /// Empty the queue and return to `Empty`
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.shuffle_cycle.clear();
        self.unload();
        self.emit_queue_changed();
    }

    // ===== Playback Control =====

    /// Start or resume playback of the current track.
    ///
    /// While a load is in flight this records the intent and resumes
    /// when the ready signal arrives (bounded by the load timeout). In
    /// the error state it retries the failed load.
    pub fn play(&mut self) -> Result<()> {
        match self.state {
            TransportState::Playing => Ok(()),
            TransportState::Ready | TransportState::Paused => match self.backend.play() {
                Ok(()) => {
                    self.set_state(TransportState::Playing);
                    Ok(())
                }
                Err(err) => Err(self.fail(err)),
            },
            TransportState::Loading => {
                if let Some(pending) = self.pending_load.as_mut() {
                    pending.resume = true;
                }
                Ok(())
            }
            TransportState::Error => {
                if self.queue.current_track().is_some() {
                    self.begin_load(true)
                } else {
                    Err(self.fail(PlaybackError::NoTrackSelected))
                }
            }
            TransportState::Empty => Err(self.fail(PlaybackError::NoTrackSelected)),
        }
    }

    /// Pause playback; no-op when already paused or empty
    pub fn pause(&mut self) {
        if self.state == TransportState::Playing {
            self.backend.pause();
            self.set_state(TransportState::Paused);
        } else if self.state == TransportState::Loading {
            if let Some(pending) = self.pending_load.as_mut() {
                pending.resume = false;
            }
        }
    }

    /// Pause when playing, play otherwise
    pub fn toggle_play(&mut self) -> Result<()> {
        if self.is_playing() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Skip to the next track per the shuffle/repeat policy.
    ///
    /// Unlike natural end-of-track, an explicit skip advances even under
    /// repeat-one.
    pub fn next(&mut self) -> Result<()> {
        if self.queue.current_index().is_none() {
            return Ok(());
        }
        let resume = self.resume_after_advance();
        self.advance(resume)
    }

    /// Go to the previous track in queue order, wrapping from the first
    /// to the last; no-op on an empty queue.
    ///
    /// Previous is always linear-queue order, never shuffle order. That
    /// is a deliberate simplification: the shuffle cycle only describes
    /// what comes next.
    pub fn previous(&mut self) -> Result<()> {
        let Some(current) = self.queue.current_index() else {
            return Ok(());
        };
        let target = if current == 0 {
            self.queue.len() - 1
        } else {
            current - 1
        };
        let resume = self.resume_after_advance();
        let previous = self.current_track_id();
        self.queue.select(target);
        self.emit_track_changed(previous);
        self.begin_load(resume)
    }

    /// Jump to `position` in the current track, clamped to the track
    /// duration.
    ///
    /// The mirrored position updates immediately (optimistic); a seek
    /// issued during a load is queued for that load, last writer wins.
    pub fn seek(&mut self, position: Duration) {
        if self.state == TransportState::Empty {
            return;
        }
        let clamped = position.min(self.duration);
        self.position = clamped;
        if self.state == TransportState::Loading {
            if let Some(pending) = self.pending_load.as_mut() {
                pending.seek_to = Some(clamped);
            }
            return;
        }
        if let Err(err) = self.backend.seek(clamped) {
            self.last_error = Some(err.kind());
            self.emit_error(err.to_string());
        }
    }

    // ===== Volume & Rate =====

    /// Set the stored volume, clamped to 0.0-1.0
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.push_gain();
        self.emit_volume_changed();
    }

    /// Flip the mute flag; the stored volume is preserved
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.push_gain();
        self.emit_volume_changed();
    }

    /// Set the playback rate, clamped to 0.5-2.0
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate.clamp(MIN_RATE, MAX_RATE);
        let rate = self.rate;
        self.backend.set_rate(rate);
        self.emit_rate_changed();
    }

    // ===== Shuffle & Repeat =====

    /// Set the repeat mode
    pub fn set_repeat(&mut self, mode: RepeatMode) {
        if self.repeat == mode {
            return;
        }
        self.repeat = mode;
        self.emit_repeat_changed();
    }

    /// Flip the shuffle flag, always forcing a fresh shuffle cycle on
    /// the next advance
    pub fn toggle_shuffle(&mut self) {
        self.shuffled = !self.shuffled;
        self.shuffle_cycle.clear();
        self.emit_shuffle_changed();
    }

    // ===== Backend Synchronization =====

    /// Drive asynchronous backend notifications into the engine.
    ///
    /// Drains buffered backend events (dropping any from superseded load
    /// generations), enforces the load timeout, and mirrors playback
    /// timing into the snapshot while playing. The host event loop calls
    /// this at a bounded interval, at most 250 ms apart while playing.
    pub fn poll(&mut self, now: Instant) {
        for event in self.backend.take_events() {
            self.apply_media_event(event);
        }

        // A load still pending past its deadline is a media failure.
        if let Some(pending) = &self.pending_load {
            if now >= pending.deadline {
                self.pending_load = None;
                let err = PlaybackError::MediaLoad(
                    "timed out waiting for media to become ready".to_string(),
                );
                self.enter_error(&err);
            }
        }

        if self.state == TransportState::Playing {
            self.position = self.backend.position();
            let duration = self.backend.duration();
            if duration > Duration::ZERO {
                self.duration = duration;
            }
            self.emit_position_update();
        }
    }

    fn apply_media_event(&mut self, event: MediaEvent) {
        if event.generation() != self.generation {
            debug!(
                event_generation = event.generation(),
                current_generation = self.generation,
                "dropping stale media event"
            );
            return;
        }
        match event {
            MediaEvent::Ready { .. } => self.on_ready(),
            MediaEvent::Progress {
                position, duration, ..
            } => {
                self.position = position;
                if duration > Duration::ZERO {
                    self.duration = duration;
                }
            }
            MediaEvent::Ended { .. } => self.on_ended(),
            MediaEvent::Error { message, .. } => {
                self.pending_load = None;
                let err = PlaybackError::MediaLoad(message);
                self.enter_error(&err);
            }
        }
    }

    fn on_ready(&mut self) {
        let Some(pending) = self.pending_load.take() else {
            return;
        };
        debug!(generation = pending.generation, "media ready");

        // Loading a new source may reset per-source settings.
        self.push_gain();
        let rate = self.rate;
        self.backend.set_rate(rate);

        let reported = self.backend.duration();
        if reported > Duration::ZERO {
            self.duration = reported;
        }

        if let Some(position) = pending.seek_to {
            let clamped = position.min(self.duration);
            self.position = clamped;
            if let Err(err) = self.backend.seek(clamped) {
                self.last_error = Some(err.kind());
                self.emit_error(err.to_string());
            }
        }

        if pending.resume {
            match self.backend.play() {
                Ok(()) => self.set_state(TransportState::Playing),
                Err(err) => {
                    self.set_state(TransportState::Ready);
                    self.last_error = Some(err.kind());
                    self.emit_error(err.to_string());
                }
            }
        } else {
            self.set_state(TransportState::Ready);
        }
    }

    fn on_ended(&mut self) {
        if let Some(track_id) = self.current_track_id() {
            self.emit_track_finished(track_id);
        }

        if self.repeat == RepeatMode::One {
            // Natural end under repeat-one replays the same track; an
            // explicit next() still advances.
            self.position = Duration::ZERO;
            let replayed = self
                .backend
                .seek(Duration::ZERO)
                .and_then(|()| self.backend.play());
            if let Err(err) = replayed {
                self.set_state(TransportState::Ready);
                self.last_error = Some(err.kind());
                self.emit_error(err.to_string());
            }
            return;
        }

        let resume = self.state == TransportState::Playing;
        let _ = self.advance(resume);
    }

    // ===== Advance =====

    fn advance(&mut self, resume: bool) -> Result<()> {
        match self.next_index() {
            Some(index) => {
                let previous = self.current_track_id();
                self.queue.select(index);
                self.emit_track_changed(previous);
                self.begin_load(resume)
            }
            None => {
                // End of queue: keep the last-played track selected.
                if self.state == TransportState::Playing {
                    self.backend.pause();
                    self.set_state(TransportState::Ready);
                } else if let Some(pending) = self.pending_load.as_mut() {
                    pending.resume = false;
                }
                Ok(())
            }
        }
    }

    /// Resolve the next index per the advance policy: shuffle cycle
    /// first, then repeat-all wrap-around, then linear order.
    fn next_index(&mut self) -> Option<usize> {
        let len = self.queue.len();
        let current = self.queue.current_index()?;
        if self.shuffled {
            return self
                .shuffle_cycle
                .next_index(len, Some(current))
                .or_else(|| (self.repeat == RepeatMode::All).then_some(0));
        }
        if self.repeat == RepeatMode::All {
            return Some((current + 1) % len);
        }
        if current + 1 < len {
            Some(current + 1)
        } else {
            None
        }
    }

    /// Whether playback should resume after the next track loads
    fn resume_after_advance(&self) -> bool {
        self.state == TransportState::Playing
            || self
                .pending_load
                .as_ref()
                .is_some_and(|pending| pending.resume)
    }

    // ===== Loading =====

    fn begin_load(&mut self, resume: bool) -> Result<()> {
        let track = match self.queue.current_track() {
            Some(track) => track.clone(),
            None => return Err(self.fail(PlaybackError::NoTrackSelected)),
        };
        if track.source.is_empty() {
            let err = PlaybackError::MediaLoad("track has no source locator".to_string());
            self.pending_load = None;
            self.enter_error(&err);
            return Err(err);
        }

        self.generation += 1;
        self.last_error = None;
        self.position = Duration::ZERO;
        self.duration = track.duration;
        self.pending_load = Some(PendingLoad {
            generation: self.generation,
            deadline: Instant::now() + self.load_timeout,
            resume,
            seek_to: None,
        });
        self.set_state(TransportState::Loading);
        debug!(track_id = %track.id, generation = self.generation, "loading track");

        if let Err(err) = self.backend.load(&track.source, self.generation) {
            self.pending_load = None;
            self.enter_error(&err);
            return Err(err);
        }
        Ok(())
    }

    fn unload(&mut self) {
        self.backend.pause();
        self.pending_load = None;
        self.position = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.last_error = None;
        self.set_state(TransportState::Empty);
    }

    /// Record a recoverable failure without leaving the current state
    fn fail(&mut self, err: PlaybackError) -> PlaybackError {
        self.last_error = Some(err.kind());
        self.emit_error(err.to_string());
        err
    }

    /// Record a load failure and move the transport to the error state;
    /// the current track and index stay put so the caller can retry or
    /// skip.
    fn enter_error(&mut self, err: &PlaybackError) {
        warn!(error = %err, "playback error");
        self.last_error = Some(err.kind());
        self.emit_error(err.to_string());
        self.set_state(TransportState::Error);
    }

    fn push_gain(&mut self) {
        let gain = if self.muted { 0.0 } else { self.volume };
        self.backend.set_gain(gain);
    }

    // ===== State Queries =====

    /// Read-only snapshot of the observable session state
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_track: self.queue.current_track().cloned(),
            current_index: self.queue.current_index(),
            queue_length: self.queue.len(),
            state: self.state,
            is_playing: self.is_playing(),
            is_loading: self.state == TransportState::Loading,
            position: self.position,
            duration: self.duration,
            volume: self.volume,
            is_muted: self.muted,
            repeat: self.repeat,
            is_shuffled: self.shuffled,
            rate: self.rate,
            last_error: self.last_error,
        }
    }

    /// Current transport state
    pub fn get_state(&self) -> TransportState {
        self.state
    }

    /// Currently selected track
    pub fn get_current_track(&self) -> Option<&Track> {
        self.queue.current_track()
    }

    /// Index of the current track in the queue
    pub fn get_current_index(&self) -> Option<usize> {
        self.queue.current_index()
    }

    /// All tracks in queue order
    pub fn get_queue(&self) -> &[Track] {
        self.queue.tracks()
    }

    /// Number of tracks in the queue
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Mirrored playback position
    pub fn get_position(&self) -> Duration {
        self.position
    }

    /// Mirrored track duration
    pub fn get_duration(&self) -> Duration {
        self.duration
    }

    /// Stored volume (0.0-1.0)
    pub fn get_volume(&self) -> f32 {
        self.volume
    }

    /// Playback rate (0.5-2.0)
    pub fn get_rate(&self) -> f32 {
        self.rate
    }

    /// Current repeat mode
    pub fn get_repeat(&self) -> RepeatMode {
        self.repeat
    }

    /// Whether shuffle traversal is on
    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Whether audio is muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Whether audio is playing right now
    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    /// Whether a load is in flight
    pub fn is_loading(&self) -> bool {
        self.state == TransportState::Loading
    }

    /// Last recorded error, if any
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    /// Whether an advance would land on another track
    pub fn has_next(&self) -> bool {
        let Some(current) = self.queue.current_index() else {
            return false;
        };
        if self.shuffled {
            return self.queue.len() > 1 || self.repeat == RepeatMode::All;
        }
        if self.repeat == RepeatMode::All {
            return true;
        }
        current + 1 < self.queue.len()
    }

    /// Whether previous() would land on a track
    pub fn has_previous(&self) -> bool {
        self.queue.current_index().is_some()
    }

    fn current_track_id(&self) -> Option<String> {
        self.queue.current_track().map(|t| t.id.clone())
    }

    // ===== Events =====

    /// Drain all pending notifications
    ///
    /// Returns everything emitted since the last drain; the UI calls
    /// this after its poll tick to synchronize with playback state.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check whether notifications are waiting
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn set_state(&mut self, state: TransportState) {
        if self.state != state {
            self.state = state;
            self.pending_events.push(PlaybackEvent::StateChanged { state });
        }
    }

    fn emit_track_changed(&mut self, previous_track_id: Option<String>) {
        if let Some(track_id) = self.current_track_id() {
            self.pending_events.push(PlaybackEvent::TrackChanged {
                track_id,
                previous_track_id,
            });
        }
    }

    fn emit_track_finished(&mut self, track_id: String) {
        self.pending_events
            .push(PlaybackEvent::TrackFinished { track_id });
    }

    fn emit_position_update(&mut self) {
        self.pending_events.push(PlaybackEvent::PositionUpdate {
            position_ms: self.position.as_millis() as u64,
            duration_ms: self.duration.as_millis() as u64,
        });
    }

    fn emit_volume_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::VolumeChanged {
            volume: self.volume,
            is_muted: self.muted,
        });
    }

    fn emit_rate_changed(&mut self) {
        self.pending_events
            .push(PlaybackEvent::RateChanged { rate: self.rate });
    }

    fn emit_repeat_changed(&mut self) {
        self.pending_events
            .push(PlaybackEvent::RepeatChanged { mode: self.repeat });
    }

    fn emit_shuffle_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::ShuffleChanged {
            enabled: self.shuffled,
        });
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    fn emit_error(&mut self, message: String) {
        self.pending_events.push(PlaybackEvent::Error { message });
    }
}
