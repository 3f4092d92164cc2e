//! What the renderer gets to see each tick
//!
//! `FrameView` borrows the engine immutably; `FrameSnapshot` is an owned copy
//! for crossing into JavaScript or another thread.

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::sim::{FogSnapshot, FogView, GameState, HandPosition, SessionState, TickOutput};

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

/// Overlay uniforms for a GPU renderer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct OverlayParams {
    /// Mask grid size in cells
    pub grid: [f32; 2],     // offset 0
    /// Frame pixels per cell
    pub cell_size: f32,     // offset 8
    /// Alpha of a fully fogged pixel, already multiplied by the fade-in
    pub fog_alpha: f32,     // offset 12
    /// Weight of the reveal image (0 until revealed)
    pub reveal_blend: f32,  // offset 16
    pub _pad: [f32; 3],     // pad to 32 bytes
}

/// Read-only view of the engine's visual state for one tick
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub state: SessionState,
    pub fog: FogView<'a>,
    pub status_hint: &'static str,
    pub key_hints: &'static [&'static str],
    /// Display-only fade-in of the overlay, 0-1
    pub fog_opacity: f32,
    pub reveal_requested: bool,
    pub audio_start_requested: bool,
    pub hand: HandPosition,
    /// Dwell progress of the breath gesture, 0-1
    pub breath_progress: f32,
}

impl<'a> FrameView<'a> {
    pub fn new(state: &'a GameState, output: &TickOutput) -> Self {
        Self {
            state: state.phase(),
            fog: state.mask().view(),
            status_hint: state.phase().status_hint(),
            key_hints: state.phase().key_hints(),
            fog_opacity: state.fog_opacity(),
            reveal_requested: output.reveal_requested,
            audio_start_requested: output.audio_start_requested,
            hand: output.hand,
            breath_progress: output.gesture.progress,
        }
    }

    /// Whether the hidden image should be drawn
    pub fn shows_reveal(&self) -> bool {
        self.state == SessionState::Revealed
    }

    /// Uniform block for a GPU overlay pass
    pub fn overlay_params(&self, max_alpha: f32, reveal_blend: f32) -> OverlayParams {
        let fog_alpha = if self.state.shows_fog() {
            max_alpha * self.fog_opacity
        } else {
            0.0
        };
        OverlayParams {
            grid: [self.fog.columns() as f32, self.fog.rows() as f32],
            cell_size: self.fog.cell_size() as f32,
            fog_alpha,
            reveal_blend: if self.shows_reveal() { reveal_blend } else { 0.0 },
            _pad: [0.0; 3],
        }
    }

    /// Owned copy; the fog grid is included only when asked for
    pub fn to_snapshot(&self, include_fog: bool) -> FrameSnapshot {
        FrameSnapshot {
            state: self.state,
            status_hint: self.status_hint.to_string(),
            key_hints: self.key_hints.iter().map(|h| h.to_string()).collect(),
            fog_opacity: self.fog_opacity,
            coverage: self.fog.coverage_fraction(),
            reveal_requested: self.reveal_requested,
            audio_start_requested: self.audio_start_requested,
            hand: self.hand.position().map(|p| [p.x, p.y]),
            breath_progress: self.breath_progress,
            fog: include_fog.then(|| FogSnapshot {
                columns: self.fog.columns(),
                rows: self.fog.rows(),
                cell_size: self.fog.cell_size(),
                coverage: self.fog.cells().to_vec(),
            }),
        }
    }
}

/// Owned, serializable frame state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub state: SessionState,
    pub status_hint: String,
    pub key_hints: Vec<String>,
    pub fog_opacity: f32,
    pub coverage: f32,
    pub reveal_requested: bool,
    pub audio_start_requested: bool,
    pub hand: Option<[f32; 2]>,
    pub breath_progress: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fog: Option<FogSnapshot>,
}

/// Something that draws the engine's state over a camera frame
pub trait Compositor {
    type Frame;

    fn composite(&mut self, frame: &mut Self::Frame, view: &FrameView<'_>);
}
