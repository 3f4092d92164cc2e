//! Mouth-shape gesture classification with dwell debounce
//!
//! A "breath" is an O-shaped mouth held without interruption for the dwell
//! time. The raw O-shape test runs every tick; the dwell timer turns it into
//! a sustained event and restarts from zero on any miss.

use std::collections::VecDeque;

use super::landmarks::MouthLandmarks;
use crate::consts::DWELL_EPSILON;
use crate::settings::GestureSettings;

/// Output of the classifier for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureEvent {
    /// The O-shape has held for at least the dwell time, ending at this tick
    pub breath_sustained: bool,
    /// Classifier clock (seconds since creation)
    pub timestamp: f64,
    /// Smoothed openness ratio (0 with no face)
    pub openness: f32,
    /// Fraction of the dwell time completed, 0-1
    pub progress: f32,
}

/// Continuous-run timer: any interruption restarts the count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DwellTimer {
    threshold: f64,
    held: f64,
}

impl DwellTimer {
    pub fn new(threshold_seconds: f32) -> Self {
        Self {
            threshold: f64::from(threshold_seconds),
            held: 0.0,
        }
    }

    /// Record one tick of `dt` seconds. Returns true once the run reaches the threshold.
    pub fn observe(&mut self, condition: bool, dt: f32) -> bool {
        if condition {
            self.held += f64::from(dt.max(0.0));
        } else {
            self.held = 0.0;
        }
        self.is_sustained()
    }

    pub fn is_sustained(&self) -> bool {
        self.held + DWELL_EPSILON >= self.threshold
    }

    /// Length of the current run in seconds
    pub fn held(&self) -> f64 {
        self.held
    }

    pub fn progress(&self) -> f32 {
        (self.held / self.threshold).clamp(0.0, 1.0) as f32
    }

    pub fn reset(&mut self) {
        self.held = 0.0;
    }
}

/// Debounced O-mouth detector
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: GestureSettings,
    dwell: DwellTimer,
    history: VecDeque<f32>,
    clock: f64,
}

impl GestureClassifier {
    pub fn new(config: GestureSettings) -> Self {
        Self {
            config,
            dwell: DwellTimer::new(config.dwell_seconds),
            history: VecDeque::with_capacity(config.smoothing_window),
            clock: 0.0,
        }
    }

    /// Raw shape test on an already-smoothed openness ratio
    pub fn is_o_shape(&self, openness: f32, width_ratio: f32) -> bool {
        openness >= self.config.min_openness && width_ratio <= self.config.max_width_ratio
    }

    /// Classify one tick. `None` means no face was found this tick.
    pub fn classify(&mut self, mouth: Option<&MouthLandmarks>, dt: f32) -> GestureEvent {
        self.clock += f64::from(dt.max(0.0));

        let (openness, o_shape) = match mouth {
            Some(mouth) => {
                let openness = self.smooth(mouth.openness());
                (openness, self.is_o_shape(openness, mouth.width_ratio()))
            }
            None => {
                self.history.clear();
                (0.0, false)
            }
        };

        let breath_sustained = self.dwell.observe(o_shape, dt);
        GestureEvent {
            breath_sustained,
            timestamp: self.clock,
            openness,
            progress: self.dwell.progress(),
        }
    }

    /// Moving mean over the last `smoothing_window` ratios
    fn smooth(&mut self, openness: f32) -> f32 {
        if self.history.len() == self.config.smoothing_window {
            self.history.pop_front();
        }
        self.history.push_back(openness);
        self.history.iter().sum::<f32>() / self.history.len() as f32
    }

    /// Seconds the current O-shape run has lasted
    pub fn held(&self) -> f64 {
        self.dwell.held()
    }

    /// Drop the dwell run and smoothing history; the clock keeps running
    pub fn reset(&mut self) {
        self.dwell.reset();
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    /// Mouth with the given openness and width, on a 100 px wide face
    fn mouth(openness: f32, mouth_width: f32) -> MouthLandmarks {
        let half = mouth_width / 2.0;
        let height = openness * mouth_width;
        MouthLandmarks {
            left_corner: Vec2::new(50.0 - half, 50.0),
            right_corner: Vec2::new(50.0 + half, 50.0),
            upper_lip: Vec2::new(50.0, 50.0 - height / 2.0),
            lower_lip: Vec2::new(50.0, 50.0 + height / 2.0),
            face_left: Vec2::new(0.0, 50.0),
            face_right: Vec2::new(100.0, 50.0),
        }
    }

    fn unsmoothed() -> GestureSettings {
        GestureSettings {
            smoothing_window: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_o_shape_needs_open_and_narrow() {
        let classifier = GestureClassifier::new(unsmoothed());
        assert!(classifier.is_o_shape(0.6, 0.3));
        // Closed mouth
        assert!(!classifier.is_o_shape(0.05, 0.3));
        // Wide open: a yawn or shout, not an "O"
        assert!(!classifier.is_o_shape(0.6, 0.55));
    }

    #[test]
    fn test_sustained_after_dwell() {
        let mut classifier = GestureClassifier::new(unsmoothed());
        let o = mouth(0.6, 30.0);

        for _ in 0..9 {
            assert!(!classifier.classify(Some(&o), 0.1).breath_sustained);
        }
        let event = classifier.classify(Some(&o), 0.1);
        assert!(event.breath_sustained);
        assert_eq!(event.progress, 1.0);
        assert!((event.timestamp - 1.0).abs() < 1e-6);

        // Stays true while held
        assert!(classifier.classify(Some(&o), 0.1).breath_sustained);
    }

    #[test]
    fn test_interruption_restarts_dwell() {
        let mut classifier = GestureClassifier::new(unsmoothed());
        let o = mouth(0.6, 30.0);
        let closed = mouth(0.05, 30.0);

        for _ in 0..8 {
            classifier.classify(Some(&o), 0.1);
        }
        assert!(!classifier.classify(Some(&closed), 0.1).breath_sustained);
        assert_eq!(classifier.held(), 0.0);

        // Needs the full dwell again
        for _ in 0..9 {
            assert!(!classifier.classify(Some(&o), 0.1).breath_sustained);
        }
        assert!(classifier.classify(Some(&o), 0.1).breath_sustained);
    }

    #[test]
    fn test_missing_face_is_no_gesture() {
        let mut classifier = GestureClassifier::new(unsmoothed());
        let o = mouth(0.6, 30.0);
        for _ in 0..5 {
            classifier.classify(Some(&o), 0.1);
        }
        let event = classifier.classify(None, 0.1);
        assert!(!event.breath_sustained);
        assert_eq!(event.openness, 0.0);
        assert_eq!(classifier.held(), 0.0);
    }

    #[test]
    fn test_wide_mouth_never_triggers() {
        let mut classifier = GestureClassifier::new(unsmoothed());
        let wide = mouth(0.7, 60.0);
        for _ in 0..30 {
            assert!(!classifier.classify(Some(&wide), 0.1).breath_sustained);
        }
    }

    #[test]
    fn test_smoothing_averages_recent_ratios() {
        let mut classifier = GestureClassifier::new(GestureSettings::default());
        let window = GestureSettings::default().smoothing_window;

        // One open frame after closed frames is diluted below the threshold
        for _ in 0..window {
            classifier.classify(Some(&mouth(0.0, 30.0)), 0.1);
        }
        let event = classifier.classify(Some(&mouth(0.6, 30.0)), 0.1);
        assert!((event.openness - 0.6 / window as f32).abs() < 1e-5);
        assert_eq!(classifier.held(), 0.0);
    }

    #[test]
    fn test_reset_clears_run() {
        let mut classifier = GestureClassifier::new(unsmoothed());
        let o = mouth(0.6, 30.0);
        for _ in 0..10 {
            classifier.classify(Some(&o), 0.1);
        }
        classifier.reset();
        assert_eq!(classifier.held(), 0.0);
        assert!(!classifier.classify(Some(&o), 0.1).breath_sustained);
    }

    #[test]
    fn test_negative_dt_does_not_rewind() {
        let mut timer = DwellTimer::new(1.0);
        timer.observe(true, 0.5);
        timer.observe(true, -10.0);
        assert_eq!(timer.held(), 0.5);
    }

    proptest! {
        /// Sustained iff the trailing run of true ticks covers the dwell time
        #[test]
        fn prop_dwell_matches_trailing_run(
            ticks in proptest::collection::vec((any::<bool>(), 0.0f32..0.2), 1..200)
        ) {
            let mut timer = DwellTimer::new(1.0);
            for (i, &(condition, dt)) in ticks.iter().enumerate() {
                let sustained = timer.observe(condition, dt);

                let run_len = ticks[..=i].iter().rev().take_while(|(c, _)| *c).count();
                let mut run = 0.0f64;
                for (_, dt) in &ticks[i + 1 - run_len..=i] {
                    run += f64::from(*dt);
                }
                prop_assert_eq!(sustained, run + DWELL_EPSILON >= 1.0);
                if !condition {
                    prop_assert_eq!(timer.held(), 0.0);
                }
            }
        }
    }
}
