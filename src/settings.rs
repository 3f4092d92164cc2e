//! Game settings and tunables
//!
//! Loaded from a JSON file on native builds and from LocalStorage on the web.
//! Every section is `#[serde(default)]`, so a partial file only overrides
//! what it names.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{Falloff, HandAnchor};

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl SettingsError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SettingsError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Camera frame geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
        }
    }
}

/// Mouth-shape classification and debounce
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    /// Minimum inner-lip height / mouth width to count as open
    pub min_openness: f32,
    /// Maximum mouth width / face width; wider mouths are smiles or yawns, not an "O"
    pub max_width_ratio: f32,
    /// Seconds the O-shape must be held without interruption
    pub dwell_seconds: f32,
    /// Ticks averaged when smoothing the openness ratio (1 = no smoothing)
    pub smoothing_window: usize,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            min_openness: 0.30,
            max_width_ratio: 0.40,
            dwell_seconds: 1.0,
            smoothing_window: 5,
        }
    }
}

/// Hand pointer extraction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandSettings {
    pub anchor: HandAnchor,
    /// Exponential smoothing weight on the previous position (0 = raw)
    pub smoothing: f32,
}

impl Default for HandSettings {
    fn default() -> Self {
        Self {
            anchor: HandAnchor::BoundingBoxCenter,
            smoothing: 0.25,
        }
    }
}

/// Fog mask, brush and reveal tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogSettings {
    /// Frame pixels per mask cell
    pub cell_size: u32,
    /// Brush radius in frame pixels
    pub brush_radius: f32,
    /// Coverage removed per tick at the brush centre
    pub brush_strength: f32,
    pub falloff: Falloff,
    /// Remaining coverage at or below which the image is revealed
    pub reveal_threshold: f32,
    /// Seconds for the fog to fade in after it appears (display only)
    pub fade_in_seconds: f32,
    /// Overlay opacity of fully fogged cells
    pub max_alpha: f32,
    /// Seed for the procedural fog texture
    pub texture_seed: u64,
}

impl Default for FogSettings {
    fn default() -> Self {
        Self {
            cell_size: 8,
            brush_radius: 80.0,
            brush_strength: 0.12,
            falloff: Falloff::Quadratic,
            reveal_threshold: 0.15,
            fade_in_seconds: 1.2,
            max_alpha: 200.0 / 255.0,
            texture_seed: 0x5eed,
        }
    }
}

/// Reveal music
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub track: String,
    /// Playback volume (0.0 - 1.0)
    pub volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            track: "assets/music.mp3".to_string(),
            volume: 0.5,
        }
    }
}

/// Hidden picture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealSettings {
    pub image: String,
    /// Weight of the reveal image when blended over the camera frame
    pub blend: f32,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            image: "assets/tree.png".to_string(),
            blend: 0.8,
        }
    }
}

/// All tunables for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub frame: FrameSettings,
    pub gesture: GestureSettings,
    pub hand: HandSettings,
    pub fog: FogSettings,
    pub audio: AudioSettings,
    pub reveal: RevealSettings,
}

impl Settings {
    /// Settings for a specific camera resolution, everything else default
    pub fn for_frame(width: u32, height: u32) -> Self {
        let mut settings = Self::default();
        settings.frame = FrameSettings { width, height };
        settings
    }

    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Check every value is in its usable range
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(SettingsError::invalid(
                "frame",
                format!("{}x{} has no area", self.frame.width, self.frame.height),
            ));
        }

        let g = &self.gesture;
        if !(g.min_openness > 0.0) {
            return Err(SettingsError::invalid("gesture.min_openness", "must be > 0"));
        }
        if !(g.max_width_ratio > 0.0) {
            return Err(SettingsError::invalid("gesture.max_width_ratio", "must be > 0"));
        }
        if !(g.dwell_seconds > 0.0) {
            return Err(SettingsError::invalid("gesture.dwell_seconds", "must be > 0"));
        }
        if g.smoothing_window == 0 {
            return Err(SettingsError::invalid("gesture.smoothing_window", "must be >= 1"));
        }

        if !(0.0..1.0).contains(&self.hand.smoothing) {
            return Err(SettingsError::invalid("hand.smoothing", "must be in [0, 1)"));
        }

        let f = &self.fog;
        if f.cell_size == 0 {
            return Err(SettingsError::invalid("fog.cell_size", "must be >= 1"));
        }
        if !(f.brush_radius > 0.0) {
            return Err(SettingsError::invalid("fog.brush_radius", "must be > 0"));
        }
        if !(f.brush_strength >= 0.0) {
            return Err(SettingsError::invalid("fog.brush_strength", "must be >= 0"));
        }
        if !(0.0..1.0).contains(&f.reveal_threshold) {
            return Err(SettingsError::invalid("fog.reveal_threshold", "must be in [0, 1)"));
        }
        if !(f.fade_in_seconds >= 0.0) {
            return Err(SettingsError::invalid("fog.fade_in_seconds", "must be >= 0"));
        }
        if !(0.0..=1.0).contains(&f.max_alpha) {
            return Err(SettingsError::invalid("fog.max_alpha", "must be in [0, 1]"));
        }

        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(SettingsError::invalid("audio.volume", "must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.reveal.blend) {
            return Err(SettingsError::invalid("reveal.blend", "must be in [0, 1]"));
        }

        Ok(())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "breath_fog_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }
}
