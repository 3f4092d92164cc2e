//! JavaScript bridge
//!
//! MediaPipe runs in the page. Each camera frame, JS pushes flat landmark
//! arrays (`x, y, z` per point, normalized 0-1), forwards key presses, then
//! calls `tick` and draws from the returned snapshot and fog grid.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use super::input::command_for_key;
use crate::audio::MusicPlayer;
use crate::game::Game;
use crate::settings::Settings;
use crate::sim::{HandLandmarks, MouthLandmarks, TickInput};

/// Called automatically when the WASM module loads
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier init
        return;
    }
    log::info!("Breath Fog module loaded");
}

/// A game session driven from JavaScript
#[wasm_bindgen]
pub struct FogGame {
    game: Game<MusicPlayer>,
    frame_size: Vec2,
    /// Detector results for the next tick; consumed by `tick`
    input: TickInput,
}

#[wasm_bindgen]
impl FogGame {
    /// Start a session for a `width` x `height` camera feed, using stored settings
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> FogGame {
        let mut settings = Settings::load();
        settings.frame.width = width;
        settings.frame.height = height;
        if let Err(e) = settings.validate() {
            log::warn!("Invalid settings ({}), using defaults", e);
            settings = Settings::for_frame(width.max(1), height.max(1));
        }

        let audio = MusicPlayer::new(settings.audio.volume);
        let frame_size = Vec2::new(settings.frame.width as f32, settings.frame.height as f32);
        FogGame {
            game: Game::new(settings, audio),
            frame_size,
            input: TickInput::default(),
        }
    }

    /// Face mesh of the first detected face; an empty array means no face
    pub fn update_face_landmarks(&mut self, data: &[f32]) {
        self.input.mouth = MouthLandmarks::from_face_mesh(data, self.frame_size);
    }

    /// Concatenated 21-point hands in detector order
    pub fn update_hand_landmarks(&mut self, data: &[f32], num_hands: usize) {
        self.input.hands = HandLandmarks::parse_many(data, num_hands, self.frame_size);
    }

    /// Forward a `KeyboardEvent.key`; unknown keys are ignored
    pub fn key_pressed(&mut self, key: &str) {
        if let Some(command) = command_for_key(key) {
            log::info!("Key {:?} -> {:?}", key, command);
            self.game.queue_command(command);
        }
    }

    /// Advance by `dt` seconds and return the frame as JSON (without the fog grid)
    pub fn tick(&mut self, dt: f32) -> String {
        let input = std::mem::take(&mut self.input);
        self.game.update(input, dt);

        let snapshot = self.game.frame().to_snapshot(false);
        serde_json::to_string(&snapshot).unwrap_or_else(|e| {
            log::warn!("Failed to serialize frame: {}", e);
            String::from("{}")
        })
    }

    /// Row-major fog coverage, `fog_columns() * fog_rows()` values in 0-1
    pub fn fog_alpha(&self) -> Vec<f32> {
        self.game.frame().fog.cells().to_vec()
    }

    pub fn fog_columns(&self) -> usize {
        self.game.state().mask().columns()
    }

    pub fn fog_rows(&self) -> usize {
        self.game.state().mask().rows()
    }

    /// Overlay opacity of fully fogged cells, already faded in (0-1)
    pub fn fog_opacity(&self) -> f32 {
        self.game.settings().fog.max_alpha * self.game.frame().fog_opacity
    }

    pub fn is_running(&self) -> bool {
        self.game.is_running()
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.game.audio_mut().set_volume(volume);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.game.audio_mut().set_muted(muted);
    }

    /// Persist the current settings to LocalStorage
    pub fn save_settings(&self) {
        self.game.settings().save();
    }
}
