//! Keyboard transport adapter
//!
//! Thin mapping from keyboard input to engine operations, for shell
//! embeddings that forward keydown events. Not part of the engine core;
//! hosts that bind media keys elsewhere can ignore this module.

use crate::engine::PlaybackEngine;

/// Volume step applied by the arrow-up/arrow-down bindings
const VOLUME_STEP: f32 = 0.1;

/// Keys the adapter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Toggle play/pause
    Space,

    /// Previous track
    ArrowLeft,

    /// Next track
    ArrowRight,

    /// Volume up by 0.1
    ArrowUp,

    /// Volume down by 0.1
    ArrowDown,

    /// Toggle mute
    KeyM,
}

/// Apply a key press to the engine.
///
/// Returns true when the key was consumed. Inert while a text input has
/// focus, so typing never fights the transport.
pub fn handle_key(engine: &mut PlaybackEngine, key: Key, text_input_focused: bool) -> bool {
    if text_input_focused {
        return false;
    }
    match key {
        Key::Space => {
            let _ = engine.toggle_play();
        }
        Key::ArrowRight => {
            let _ = engine.next();
        }
        Key::ArrowLeft => {
            let _ = engine.previous();
        }
        Key::ArrowUp => engine.set_volume(engine.get_volume() + VOLUME_STEP),
        Key::ArrowDown => engine.set_volume(engine.get_volume() - VOLUME_STEP),
        Key::KeyM => engine.toggle_mute(),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NullBackend;
    use crate::types::{EngineConfig, Track, TransportState};
    use std::time::{Duration, Instant};

    fn create_test_track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Track {}", id),
            artist: "Test Artist".to_string(),
            album: None,
            duration: Duration::from_secs(180),
            source: format!("https://media.example.com/stream/{}", id),
            artwork: None,
        }
    }

    fn ready_engine() -> PlaybackEngine {
        let mut engine = PlaybackEngine::new(Box::new(NullBackend::new()), EngineConfig::default());
        engine
            .set_queue(
                vec![
                    create_test_track("1"),
                    create_test_track("2"),
                    create_test_track("3"),
                ],
                0,
            )
            .unwrap();
        engine.poll(Instant::now());
        engine
    }

    #[test]
    fn space_toggles_play_pause() {
        let mut engine = ready_engine();

        assert!(handle_key(&mut engine, Key::Space, false));
        assert!(engine.is_playing());

        assert!(handle_key(&mut engine, Key::Space, false));
        assert_eq!(engine.get_state(), TransportState::Paused);
    }

    #[test]
    fn arrows_navigate_queue() {
        let mut engine = ready_engine();

        handle_key(&mut engine, Key::ArrowRight, false);
        engine.poll(Instant::now());
        assert_eq!(engine.get_current_index(), Some(1));

        handle_key(&mut engine, Key::ArrowLeft, false);
        engine.poll(Instant::now());
        assert_eq!(engine.get_current_index(), Some(0));
    }

    #[test]
    fn arrows_step_volume() {
        let mut engine = ready_engine();
        engine.set_volume(0.5);

        handle_key(&mut engine, Key::ArrowUp, false);
        assert!((engine.get_volume() - 0.6).abs() < 1e-6);

        handle_key(&mut engine, Key::ArrowDown, false);
        handle_key(&mut engine, Key::ArrowDown, false);
        assert!((engine.get_volume() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn volume_steps_clamp_at_bounds() {
        let mut engine = ready_engine();
        engine.set_volume(0.95);

        handle_key(&mut engine, Key::ArrowUp, false);
        assert_eq!(engine.get_volume(), 1.0);

        engine.set_volume(0.05);
        handle_key(&mut engine, Key::ArrowDown, false);
        assert_eq!(engine.get_volume(), 0.0);
    }

    #[test]
    fn m_toggles_mute() {
        let mut engine = ready_engine();

        handle_key(&mut engine, Key::KeyM, false);
        assert!(engine.is_muted());

        handle_key(&mut engine, Key::KeyM, false);
        assert!(!engine.is_muted());
    }

    #[test]
    fn inert_while_text_input_has_focus() {
        let mut engine = ready_engine();
        engine.set_volume(0.5);

        assert!(!handle_key(&mut engine, Key::Space, true));
        assert!(!engine.is_playing());

        assert!(!handle_key(&mut engine, Key::ArrowUp, true));
        assert_eq!(engine.get_volume(), 0.5);

        assert!(!handle_key(&mut engine, Key::KeyM, true));
        assert!(!engine.is_muted());
    }
}
