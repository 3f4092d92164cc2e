//! Fog-state engine
//!
//! All gameplay logic lives here. This module is synchronous and owns its state:
//! - One `tick` per camera frame, driven by elapsed time
//! - Detector absence is a value (`None` / empty slice), never an error
//! - No rendering, audio or platform dependencies

pub mod fog;
pub mod gesture;
pub mod hand;
pub mod landmarks;
pub mod state;
pub mod tick;

pub use fog::{Falloff, FogMask, FogSnapshot, FogView};
pub use gesture::{DwellTimer, GestureClassifier, GestureEvent};
pub use hand::{HandAnchor, HandPosition, HandTracker, select_hand};
pub use landmarks::{HandLandmarks, MouthLandmarks};
pub use state::{Brush, Command, GameState, SessionState, Transition};
pub use tick::{TickInput, TickOutput, tick};
