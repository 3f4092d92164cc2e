//! Hand landmarks to a single pointer position
//!
//! When several hands are visible the one with the largest bounding box is
//! used; equal areas go to the hand the detector listed first. The choice is
//! recomputed every tick from geometry alone, so the same input always picks
//! the same hand.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::landmarks::HandLandmarks;
use crate::settings::HandSettings;

/// Which point of the hand drives the brush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HandAnchor {
    /// Centre of the landmark bounding box
    #[default]
    BoundingBoxCenter,
    /// Mean of the wrist and the four knuckles
    PalmCentroid,
    /// Index fingertip
    IndexTip,
}

impl HandAnchor {
    pub fn locate(&self, hand: &HandLandmarks) -> Vec2 {
        match self {
            HandAnchor::BoundingBoxCenter => hand.bounding_box_center(),
            HandAnchor::PalmCentroid => hand.palm_centroid(),
            HandAnchor::IndexTip => hand.index_tip(),
        }
    }
}

/// Pointer position for one tick, in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HandPosition {
    Present(Vec2),
    #[default]
    Absent,
}

impl HandPosition {
    pub fn position(&self) -> Option<Vec2> {
        match self {
            HandPosition::Present(p) => Some(*p),
            HandPosition::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, HandPosition::Present(_))
    }
}

/// Pick the hand that drives the brush (largest bounding box, first on ties)
pub fn select_hand(hands: &[HandLandmarks]) -> Option<&HandLandmarks> {
    hands.iter().fold(None, |best: Option<&HandLandmarks>, hand| match best {
        Some(b) if b.bounding_box_area() >= hand.bounding_box_area() => Some(b),
        _ => Some(hand),
    })
}

/// Converts detected hands into a smoothed pointer
#[derive(Debug, Clone)]
pub struct HandTracker {
    config: HandSettings,
    smoothed: Option<Vec2>,
}

impl HandTracker {
    pub fn new(config: HandSettings) -> Self {
        Self {
            config,
            smoothed: None,
        }
    }

    /// Track one tick. An empty slice means no hand was found.
    pub fn track(&mut self, hands: &[HandLandmarks]) -> HandPosition {
        let Some(hand) = select_hand(hands) else {
            self.smoothed = None;
            return HandPosition::Absent;
        };

        let raw = self.config.anchor.locate(hand);
        if !raw.is_finite() {
            self.smoothed = None;
            return HandPosition::Absent;
        }

        // Smoothing restarts from the raw point after the hand was lost
        let pos = match self.smoothed {
            Some(prev) => prev.lerp(raw, 1.0 - self.config.smoothing),
            None => raw,
        };
        self.smoothed = Some(pos);
        HandPosition::Present(pos)
    }

    pub fn reset(&mut self) {
        self.smoothed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::HAND_POINTS;
    use crate::sim::landmarks::{INDEX_TIP, WRIST};

    /// Square hand spanning `min..min+size` with the index tip at the far corner
    fn hand(min: Vec2, size: f32) -> HandLandmarks {
        let mut points = [min; HAND_POINTS];
        points[INDEX_TIP] = min + Vec2::splat(size);
        HandLandmarks::new(points)
    }

    fn raw_tracker(anchor: HandAnchor) -> HandTracker {
        HandTracker::new(HandSettings {
            anchor,
            smoothing: 0.0,
        })
    }

    #[test]
    fn test_no_hand_is_absent() {
        let mut tracker = raw_tracker(HandAnchor::BoundingBoxCenter);
        assert_eq!(tracker.track(&[]), HandPosition::Absent);
        assert_eq!(HandPosition::Absent.position(), None);
    }

    #[test]
    fn test_anchor_points() {
        let h = hand(Vec2::new(100.0, 100.0), 40.0);
        assert_eq!(
            raw_tracker(HandAnchor::BoundingBoxCenter).track(&[h]),
            HandPosition::Present(Vec2::new(120.0, 120.0))
        );
        assert_eq!(
            raw_tracker(HandAnchor::IndexTip).track(&[h]),
            HandPosition::Present(Vec2::new(140.0, 140.0))
        );
        assert_eq!(
            raw_tracker(HandAnchor::PalmCentroid).track(&[h]),
            HandPosition::Present(h.points[WRIST])
        );
    }

    #[test]
    fn test_largest_hand_wins() {
        let small = hand(Vec2::new(0.0, 0.0), 10.0);
        let large = hand(Vec2::new(200.0, 0.0), 50.0);
        let mut tracker = raw_tracker(HandAnchor::BoundingBoxCenter);

        let expected = HandPosition::Present(Vec2::new(225.0, 25.0));
        assert_eq!(tracker.track(&[small, large]), expected);
        assert_eq!(tracker.track(&[large, small]), expected);
    }

    #[test]
    fn test_tie_goes_to_first_hand() {
        let a = hand(Vec2::new(0.0, 0.0), 20.0);
        let b = hand(Vec2::new(300.0, 0.0), 20.0);
        let hands = [a, b];
        let selected = select_hand(&hands).unwrap();
        assert_eq!(selected.points[WRIST], Vec2::ZERO);
    }

    #[test]
    fn test_smoothing_blends_toward_raw() {
        let mut tracker = HandTracker::new(HandSettings {
            anchor: HandAnchor::BoundingBoxCenter,
            smoothing: 0.5,
        });
        let first = tracker.track(&[hand(Vec2::ZERO, 20.0)]);
        assert_eq!(first, HandPosition::Present(Vec2::new(10.0, 10.0)));

        let second = tracker.track(&[hand(Vec2::new(100.0, 0.0), 20.0)]);
        assert_eq!(second, HandPosition::Present(Vec2::new(60.0, 10.0)));

        // Losing the hand drops the history
        assert_eq!(tracker.track(&[]), HandPosition::Absent);
        let third = tracker.track(&[hand(Vec2::new(100.0, 0.0), 20.0)]);
        assert_eq!(third, HandPosition::Present(Vec2::new(110.0, 10.0)));
    }

    #[test]
    fn test_non_finite_landmarks_are_absent() {
        let mut tracker = raw_tracker(HandAnchor::IndexTip);
        let mut h = hand(Vec2::ZERO, 10.0);
        h.points[INDEX_TIP] = Vec2::new(f32::NAN, 0.0);
        assert_eq!(tracker.track(&[h]), HandPosition::Absent);
    }
}
