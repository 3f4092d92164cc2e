//! Breath Fog entry point
//!
//! The browser build is driven from JavaScript through `FogGame`. Natively
//! there is no camera, so this runs a scripted session with synthetic
//! landmarks and logs what happens.
//!
//! Usage: `breath-fog [settings.json] [final-frame.png]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Breath Fog (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match breath_fog::Settings::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{}; using defaults", e);
                breath_fog::Settings::default()
            }
        },
        None => breath_fog::Settings::default(),
    };

    demo::run(settings, std::env::args().nth(2));
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use breath_fog::audio::SilentAudio;
    use breath_fog::consts::HAND_POINTS;
    use breath_fog::platform::command_for_key;
    use breath_fog::renderer::{Compositor, OverlayCompositor, Rgb, RgbImage};
    use breath_fog::sim::{HandLandmarks, MouthLandmarks, SessionState, TickInput};
    use breath_fog::{Game, Settings};
    use glam::Vec2;

    /// Simulated camera rate
    const FRAME_DT: f32 = 1.0 / 30.0;
    /// Give up if the script hasn't revealed by then
    const MAX_FRAMES: usize = 30 * 120;

    /// An "O" mouth centred in the frame
    fn o_mouth(size: Vec2) -> MouthLandmarks {
        let c = size * Vec2::new(0.5, 0.55);
        let face = size.x * 0.2;
        MouthLandmarks {
            left_corner: c - Vec2::new(face * 0.15, 0.0),
            right_corner: c + Vec2::new(face * 0.15, 0.0),
            upper_lip: c - Vec2::new(0.0, face * 0.1),
            lower_lip: c + Vec2::new(0.0, face * 0.1),
            face_left: c - Vec2::new(face * 0.5, 0.0),
            face_right: c + Vec2::new(face * 0.5, 0.0),
        }
    }

    /// Hand position sweeping the frame in horizontal passes
    fn sweep(size: Vec2, t: f32) -> Vec2 {
        const PASSES: f32 = 6.0;
        let pass = (t * 0.5).floor();
        let phase = t * 0.5 - pass;
        let x = if pass as i32 % 2 == 0 { phase } else { 1.0 - phase };
        let row = (pass % PASSES + 0.5) / PASSES;
        Vec2::new(x * size.x, row * size.y)
    }

    /// Run the script; if `output` is set, the final composited frame is saved there
    pub fn run(settings: Settings, output: Option<String>) {
        let size = Vec2::new(settings.frame.width as f32, settings.frame.height as f32);
        let mut compositor = OverlayCompositor::new(&settings);
        let mut game = Game::new(settings, SilentAudio::new());

        let mut t = 0.0f32;
        for frame in 0..MAX_FRAMES {
            let input = match game.phase() {
                SessionState::Idle => TickInput {
                    mouth: Some(o_mouth(size)),
                    ..Default::default()
                },
                SessionState::FogActive => TickInput {
                    hands: vec![HandLandmarks::new([sweep(size, t); HAND_POINTS])],
                    ..Default::default()
                },
                SessionState::Revealed | SessionState::Ended => break,
            };

            let out = game.update(input, FRAME_DT);
            t += FRAME_DT;
            if frame % 30 == 0 && out.state == SessionState::FogActive {
                log::info!("t={:.1}s coverage {:.2}", t, game.state().coverage_fraction());
            }
        }

        let frame = game.frame();
        log::info!(
            "Finished in {} after {:.1}s: {}",
            frame.state.as_str(),
            game.state().clock(),
            frame.status_hint
        );

        // Stand-in camera frame
        let mut camera = RgbImage::filled(size.x as usize, size.y as usize, Rgb::gray(96));
        compositor.composite(&mut camera, &frame);
        if let Some(path) = output {
            match camera.to_buffer().map(|buffer| buffer.save(&path)) {
                Some(Ok(())) => log::info!("Saved final frame to {}", path),
                Some(Err(e)) => log::error!("Failed to save {}: {}", path, e),
                None => log::error!("Final frame has no pixels"),
            }
        }

        for key in ["r", "q"] {
            if let Some(command) = command_for_key(key) {
                game.queue_command(command);
                game.update(TickInput::default(), FRAME_DT);
            }
        }
        log::info!("Session over, running: {}", game.is_running());
    }
}
