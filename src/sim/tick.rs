//! Per-frame session update
//!
//! One call per camera frame. Commands are handled first so a reset or quit
//! always lands on the tick it arrives, ahead of any automatic transition.

use super::gesture::GestureEvent;
use super::hand::HandPosition;
use super::landmarks::{HandLandmarks, MouthLandmarks};
use super::state::{Command, GameState, SessionState, Transition};
use crate::consts::MAX_TICK_DT;

/// Detector output and user input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Mouth points, `None` when no face was found
    pub mouth: Option<MouthLandmarks>,
    /// Detected hands in detector order, empty when none
    pub hands: Vec<HandLandmarks>,
    /// Reset / quit from the keyboard
    pub command: Option<Command>,
}

/// What happened during a tick. Request flags are edge-triggered: true on
/// the tick that causes them and false afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    pub state: SessionState,
    pub transition: Option<Transition>,
    pub reveal_requested: bool,
    pub audio_start_requested: bool,
    pub audio_stop_requested: bool,
    pub gesture: GestureEvent,
    pub hand: HandPosition,
}

impl TickOutput {
    fn unchanged(state: &GameState) -> Self {
        Self {
            state: state.phase,
            transition: None,
            reveal_requested: false,
            audio_start_requested: false,
            audio_stop_requested: false,
            gesture: state.last_gesture,
            hand: state.last_hand,
        }
    }
}

/// Advance the session by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> TickOutput {
    if state.phase.is_terminal() {
        return TickOutput::unchanged(state);
    }

    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_TICK_DT) } else { 0.0 };
    state.clock += f64::from(dt);
    state.state_time += dt;

    if let Some(command) = input.command {
        return apply_command(state, command);
    }

    let gesture = state.classifier.classify(input.mouth.as_ref(), dt);
    let hand = state.tracker.track(&input.hands);
    state.last_gesture = gesture;
    state.last_hand = hand;

    let mut out = TickOutput::unchanged(state);

    match state.phase {
        SessionState::Idle => {
            if gesture.breath_sustained {
                state.mask.reset();
                state.classifier.reset();
                out.transition = Some(state.enter(SessionState::FogActive));
            }
        }
        SessionState::FogActive => {
            if let HandPosition::Present(p) = hand {
                let cell = state.mask.frame_to_cell(p);
                state.mask.erode(cell, state.brush.radius, state.brush.strength);
            }

            let coverage = state.mask.coverage_fraction();
            log::debug!("Fog coverage {:.3}", coverage);
            if coverage <= state.reveal_threshold {
                out.transition = Some(state.enter(SessionState::Revealed));
                out.reveal_requested = true;
                out.audio_start_requested = true;
            }
        }
        SessionState::Revealed | SessionState::Ended => {}
    }

    out.state = state.phase;
    out
}

fn apply_command(state: &mut GameState, command: Command) -> TickOutput {
    let target = match command {
        Command::Reset => SessionState::Idle,
        Command::Quit => SessionState::Ended,
    };

    state.classifier.reset();
    state.tracker.reset();
    state.last_gesture = GestureEvent::default();
    state.last_hand = HandPosition::Absent;

    let mut out = TickOutput::unchanged(state);
    out.transition = Some(state.enter(target));
    out.audio_stop_requested = true;
    out.state = state.phase;
    out
}
