//! Session state and the engine-owned components
//!
//! The phase is private to this module tree: only `tick` moves it.

use serde::{Deserialize, Serialize};

use super::fog::FogMask;
use super::gesture::{GestureClassifier, GestureEvent};
use super::hand::{HandPosition, HandTracker};
use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Waiting for a sustained "O" breath
    Idle,
    /// Fog is up and the hand clears it
    FogActive,
    /// Enough fog is gone; the picture shows and music plays
    Revealed,
    /// Quit was requested; nothing further happens
    Ended,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::FogActive => "FogActive",
            SessionState::Revealed => "Revealed",
            SessionState::Ended => "Ended",
        }
    }

    /// User-facing hint for this state
    pub fn status_hint(&self) -> &'static str {
        match self {
            SessionState::Idle => "Make an 'O' shape with your mouth",
            SessionState::FogActive => "Use your hand to clear the fog",
            SessionState::Revealed => "Congratulations! You found the hidden picture!",
            SessionState::Ended => "Goodbye",
        }
    }

    /// Keyboard reminders shown under the status hint
    pub fn key_hints(&self) -> &'static [&'static str] {
        match self {
            SessionState::Ended => &[],
            _ => &["Press 'r' to reset", "Press 'q' to quit"],
        }
    }

    /// Whether the fog overlay should be drawn
    pub fn shows_fog(&self) -> bool {
        matches!(self, SessionState::FogActive)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Ended)
    }
}

/// Explicit user commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Reset,
    Quit,
}

/// A phase change that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: SessionState,
    pub to: SessionState,
}

/// Brush parameters converted to mask cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub radius: f32,
    pub strength: f32,
}

/// Everything the engine owns for one session
#[derive(Debug, Clone)]
pub struct GameState {
    pub(super) phase: SessionState,
    pub(super) mask: FogMask,
    pub(super) classifier: GestureClassifier,
    pub(super) tracker: HandTracker,
    pub(super) brush: Brush,
    pub(super) reveal_threshold: f32,
    pub(super) fade_in_seconds: f32,
    /// Seconds since the session started
    pub(super) clock: f64,
    /// Seconds spent in the current phase
    pub(super) state_time: f32,
    pub(super) last_gesture: GestureEvent,
    pub(super) last_hand: HandPosition,
}

impl GameState {
    /// Start a session in `Idle`. Settings are assumed validated.
    pub fn new(settings: &Settings) -> Self {
        let fog = &settings.fog;
        let mask = FogMask::new(
            settings.frame.width,
            settings.frame.height,
            fog.cell_size,
            fog.falloff,
        );
        let brush = Brush {
            radius: mask.pixels_to_cells(fog.brush_radius),
            strength: fog.brush_strength,
        };
        log::info!(
            "Session started: {}x{} frame, {}x{} fog cells",
            settings.frame.width,
            settings.frame.height,
            mask.columns(),
            mask.rows()
        );

        Self {
            phase: SessionState::Idle,
            mask,
            classifier: GestureClassifier::new(settings.gesture),
            tracker: HandTracker::new(settings.hand),
            brush,
            reveal_threshold: fog.reveal_threshold,
            fade_in_seconds: fog.fade_in_seconds,
            clock: 0.0,
            state_time: 0.0,
            last_gesture: GestureEvent::default(),
            last_hand: HandPosition::Absent,
        }
    }

    pub fn phase(&self) -> SessionState {
        self.phase
    }

    pub fn mask(&self) -> &FogMask {
        &self.mask
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn reveal_threshold(&self) -> f32 {
        self.reveal_threshold
    }

    pub fn coverage_fraction(&self) -> f32 {
        self.mask.coverage_fraction()
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    pub fn last_gesture(&self) -> GestureEvent {
        self.last_gesture
    }

    pub fn last_hand(&self) -> HandPosition {
        self.last_hand
    }

    /// Display-only fade-in of the overlay after fog appears, 0-1
    pub fn fog_opacity(&self) -> f32 {
        if !self.phase.shows_fog() {
            return 0.0;
        }
        if self.fade_in_seconds <= 0.0 {
            return 1.0;
        }
        (self.state_time / self.fade_in_seconds).clamp(0.0, 1.0)
    }

    /// Move to `to`, restarting the phase timer
    pub(super) fn enter(&mut self, to: SessionState) -> Transition {
        let from = self.phase;
        self.phase = to;
        self.state_time = 0.0;
        log::info!("State transition: {} -> {}", from.as_str(), to.as_str());
        Transition { from, to }
    }
}
