//! Reveal music playback
//!
//! The engine only asks for "start" and "stop"; players are fire-and-forget
//! and report nothing back except whether something is currently playing.

/// A music player the game driver can start and stop
pub trait AudioSink {
    /// Start playing `track` from the beginning. Failures are logged, not returned.
    fn play(&mut self, track: &str);
    /// Stop playback if anything is playing
    fn stop(&mut self);
    /// Whether a track is currently audible
    fn is_playing(&self) -> bool;
}

/// Player with no output device; tracks state and logs requests
#[derive(Debug, Default)]
pub struct SilentAudio {
    current: Option<String>,
}

impl SilentAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track started by the last `play`, if still playing
    pub fn current_track(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

impl AudioSink for SilentAudio {
    fn play(&mut self, track: &str) {
        log::info!("Playing {} (no audio device)", track);
        self.current = Some(track.to_string());
    }

    fn stop(&mut self) {
        if let Some(track) = self.current.take() {
            log::info!("Stopped {}", track);
        }
    }

    fn is_playing(&self) -> bool {
        self.current.is_some()
    }
}

/// Music player backed by an `<audio>` element
#[cfg(target_arch = "wasm32")]
pub struct MusicPlayer {
    element: Option<web_sys::HtmlAudioElement>,
    volume: f32,
    muted: bool,
}

#[cfg(target_arch = "wasm32")]
impl MusicPlayer {
    pub fn new(volume: f32) -> Self {
        Self {
            element: None,
            volume: volume.clamp(0.0, 1.0),
            muted: false,
        }
    }

    /// Set volume (0.0 - 1.0), applied to the current and future tracks
    pub fn set_volume(&mut self, vol: f32) {
        self.volume = vol.clamp(0.0, 1.0);
        self.apply_volume();
    }

    /// Mute/unmute without stopping playback
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_volume();
    }

    fn effective_volume(&self) -> f64 {
        if self.muted { 0.0 } else { f64::from(self.volume) }
    }

    fn apply_volume(&self) {
        if let Some(element) = &self.element {
            element.set_volume(self.effective_volume());
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl AudioSink for MusicPlayer {
    fn play(&mut self, track: &str) {
        self.stop();

        let element = match web_sys::HtmlAudioElement::new_with_src(track) {
            Ok(element) => element,
            Err(e) => {
                log::warn!("Failed to create audio element for {}: {:?}", track, e);
                return;
            }
        };
        element.set_volume(self.effective_volume());

        // Browsers may refuse autoplay until a user gesture; the promise is not awaited
        if let Err(e) = element.play() {
            log::warn!("Failed to start {}: {:?}", track, e);
            return;
        }
        log::info!("Playing {}", track);
        self.element = Some(element);
    }

    fn stop(&mut self) {
        if let Some(element) = self.element.take() {
            let _ = element.pause();
            element.set_current_time(0.0);
        }
    }

    fn is_playing(&self) -> bool {
        self.element
            .as_ref()
            .map(|e| !e.paused() && !e.ended())
            .unwrap_or(false)
    }
}
