//! Breath Fog - a camera game driven by face and hand landmarks
//!
//! Core modules:
//! - `sim`: Fog-state engine (gesture debounce, hand tracking, fog mask, session state)
//! - `renderer`: Compositor contract and CPU overlay compositor
//! - `platform`: Key mapping and the browser bridge
//! - `audio`: Fire-and-forget music playback
//! - `game`: Driver that applies engine side effects

pub mod audio;
pub mod game;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Engine constants that are not tunable at runtime
pub mod consts {
    /// Tolerance applied when comparing accumulated dwell time against the threshold
    pub const DWELL_EPSILON: f64 = 1e-6;

    /// Largest elapsed time accepted for a single tick (seconds).
    /// A stalled camera must not complete a dwell in one frame. Dwell timing
    /// is frame-rate independent only above 4 fps; slower feeds hold the "O"
    /// longer in wall-clock time.
    pub const MAX_TICK_DT: f32 = 0.25;

    /// Number of points in a MediaPipe face mesh (478 with iris refinement)
    pub const FACE_MESH_POINTS: usize = 468;
    /// Number of points in a MediaPipe hand
    pub const HAND_POINTS: usize = 21;
    /// Floats per landmark in flat arrays coming from the detectors (x, y, z)
    pub const LANDMARK_STRIDE: usize = 3;
}

/// Scale a normalized (0-1) detector coordinate to frame pixels
#[inline]
pub fn to_frame_pixels(normalized: Vec2, frame_size: Vec2) -> Vec2 {
    normalized * frame_size
}
