//! Session driver
//!
//! Owns the engine state and an audio sink, runs one tick per camera frame
//! and turns the tick's request flags into side effects.

use crate::audio::AudioSink;
use crate::renderer::FrameView;
use crate::settings::Settings;
use crate::sim::{Command, GameState, SessionState, TickInput, TickOutput, tick};

/// One running session
pub struct Game<A: AudioSink> {
    state: GameState,
    audio: A,
    settings: Settings,
    /// Command waiting for the next tick (keys arrive between frames)
    pending_command: Option<Command>,
    last_output: TickOutput,
}

impl<A: AudioSink> Game<A> {
    pub fn new(settings: Settings, audio: A) -> Self {
        let mut state = GameState::new(&settings);
        // Zero-length tick to seed the output with the initial state
        let last_output = tick(&mut state, &TickInput::default(), 0.0);
        Self {
            state,
            audio,
            settings,
            pending_command: None,
            last_output,
        }
    }

    /// Queue a command for the next update. A later command replaces an
    /// earlier one, except that quit is never replaced, not even by a
    /// command carried in the next update's input.
    pub fn queue_command(&mut self, command: Command) {
        if self.pending_command != Some(Command::Quit) {
            self.pending_command = Some(command);
        }
    }

    /// Run one tick and apply its audio requests
    pub fn update(&mut self, mut input: TickInput, dt: f32) -> TickOutput {
        match self.pending_command.take() {
            Some(Command::Quit) => input.command = Some(Command::Quit),
            Some(command) => {
                input.command.get_or_insert(command);
            }
            None => {}
        }

        let out = tick(&mut self.state, &input, dt);

        if out.audio_stop_requested && self.audio.is_playing() {
            self.audio.stop();
        }
        if out.audio_start_requested && !self.audio.is_playing() {
            self.audio.play(&self.settings.audio.track);
        }
        if out.reveal_requested {
            log::info!("Revealing {}", self.settings.reveal.image);
        }

        self.last_output = out;
        out
    }

    /// What the renderer should draw for the latest tick
    pub fn frame(&self) -> FrameView<'_> {
        FrameView::new(&self.state, &self.last_output)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> SessionState {
        self.state.phase()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn last_output(&self) -> &TickOutput {
        &self.last_output
    }

    pub fn is_running(&self) -> bool {
        !self.state.phase().is_terminal()
    }
}
