//! Detector landmarks in frame-pixel coordinates
//!
//! The face and hand models run outside the engine (MediaPipe in the browser).
//! They hand over flat `x, y, z` arrays in normalized coordinates; this module
//! picks out the points the engine needs and scales them to frame pixels.
//! Aspect ratios are only meaningful in pixels, so scaling happens here and
//! nowhere else.

use glam::Vec2;

use crate::consts::{FACE_MESH_POINTS, HAND_POINTS, LANDMARK_STRIDE};
use crate::to_frame_pixels;

// ============================================================================
// FACE MESH INDICES (MediaPipe Face Mesh)
// ============================================================================

pub const MOUTH_LEFT: usize = 61;
pub const MOUTH_RIGHT: usize = 291;
pub const LIP_UPPER_INNER: usize = 13;
pub const LIP_LOWER_INNER: usize = 14;
pub const FACE_LEFT: usize = 234;
pub const FACE_RIGHT: usize = 454;

// ============================================================================
// HAND LANDMARK INDICES (MediaPipe Hands)
// ============================================================================

pub const WRIST: usize = 0;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const RING_MCP: usize = 13;
pub const PINKY_MCP: usize = 17;

/// Joints averaged for the palm centroid
pub const PALM: [usize; 5] = [WRIST, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

/// Read landmark `index` from a flat stride-3 array
#[inline]
fn point_at(data: &[f32], index: usize) -> Vec2 {
    let base = index * LANDMARK_STRIDE;
    Vec2::new(data[base], data[base + 1])
}

/// The mouth and face-width points used for mouth-shape classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouthLandmarks {
    pub left_corner: Vec2,
    pub right_corner: Vec2,
    pub upper_lip: Vec2,
    pub lower_lip: Vec2,
    pub face_left: Vec2,
    pub face_right: Vec2,
}

impl MouthLandmarks {
    /// Extract mouth points from a flat face mesh (`x, y, z` per point, normalized).
    ///
    /// An empty slice means no face was found. A short slice is malformed
    /// detector output; it is logged and treated the same way.
    pub fn from_face_mesh(data: &[f32], frame_size: Vec2) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        if data.len() < FACE_MESH_POINTS * LANDMARK_STRIDE {
            log::warn!(
                "Invalid face mesh length: {} (expected at least {})",
                data.len(),
                FACE_MESH_POINTS * LANDMARK_STRIDE
            );
            return None;
        }

        let px = |index| to_frame_pixels(point_at(data, index), frame_size);
        Some(Self {
            left_corner: px(MOUTH_LEFT),
            right_corner: px(MOUTH_RIGHT),
            upper_lip: px(LIP_UPPER_INNER),
            lower_lip: px(LIP_LOWER_INNER),
            face_left: px(FACE_LEFT),
            face_right: px(FACE_RIGHT),
        })
    }

    /// Horizontal mouth opening (corner to corner)
    pub fn mouth_width(&self) -> f32 {
        self.left_corner.distance(self.right_corner)
    }

    /// Vertical mouth opening (inner lip to inner lip)
    pub fn mouth_height(&self) -> f32 {
        self.upper_lip.distance(self.lower_lip)
    }

    /// Face width at the cheeks, used to normalize mouth width
    pub fn face_width(&self) -> f32 {
        self.face_left.distance(self.face_right)
    }

    /// Mouth height over mouth width (0 for a degenerate mouth)
    pub fn openness(&self) -> f32 {
        let width = self.mouth_width();
        if width > f32::EPSILON {
            self.mouth_height() / width
        } else {
            0.0
        }
    }

    /// Mouth width over face width (infinite for a degenerate face so it never passes a bound)
    pub fn width_ratio(&self) -> f32 {
        let face = self.face_width();
        if face > f32::EPSILON {
            self.mouth_width() / face
        } else {
            f32::INFINITY
        }
    }
}

/// All 21 points of one detected hand, in frame pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandLandmarks {
    pub points: [Vec2; HAND_POINTS],
}

impl HandLandmarks {
    pub fn new(points: [Vec2; HAND_POINTS]) -> Self {
        Self { points }
    }

    /// Parse one hand from a flat stride-3 array of normalized coordinates
    pub fn from_flat(data: &[f32], frame_size: Vec2) -> Option<Self> {
        if data.len() < HAND_POINTS * LANDMARK_STRIDE {
            return None;
        }
        let mut points = [Vec2::ZERO; HAND_POINTS];
        for (i, p) in points.iter_mut().enumerate() {
            *p = to_frame_pixels(point_at(data, i), frame_size);
        }
        Some(Self { points })
    }

    /// Parse up to `num_hands` consecutive hands. Truncated trailing data is dropped with a warning.
    pub fn parse_many(data: &[f32], num_hands: usize, frame_size: Vec2) -> Vec<Self> {
        let per_hand = HAND_POINTS * LANDMARK_STRIDE;
        let available = data.len() / per_hand;
        if available < num_hands {
            log::warn!(
                "Hand data holds {} hands but {} were reported",
                available,
                num_hands
            );
        }
        data.chunks_exact(per_hand)
            .take(num_hands)
            .filter_map(|chunk| Self::from_flat(chunk, frame_size))
            .collect()
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounds(&self) -> (Vec2, Vec2) {
        self.points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(*p), hi.max(*p)),
        )
    }

    pub fn bounding_box_center(&self) -> Vec2 {
        let (lo, hi) = self.bounds();
        (lo + hi) * 0.5
    }

    pub fn bounding_box_area(&self) -> f32 {
        let (lo, hi) = self.bounds();
        let size = hi - lo;
        size.x * size.y
    }

    pub fn palm_centroid(&self) -> Vec2 {
        PALM.iter().map(|&i| self.points[i]).sum::<Vec2>() / PALM.len() as f32
    }

    pub fn index_tip(&self) -> Vec2 {
        self.points[INDEX_TIP]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_face() -> Vec<f32> {
        let mut data = vec![0.0; FACE_MESH_POINTS * LANDMARK_STRIDE];
        let mut set = |i: usize, x: f32, y: f32| {
            data[i * 3] = x;
            data[i * 3 + 1] = y;
        };
        set(MOUTH_LEFT, 0.4, 0.5);
        set(MOUTH_RIGHT, 0.6, 0.5);
        set(LIP_UPPER_INNER, 0.5, 0.45);
        set(LIP_LOWER_INNER, 0.5, 0.55);
        set(FACE_LEFT, 0.25, 0.5);
        set(FACE_RIGHT, 0.75, 0.5);
        data
    }

    #[test]
    fn test_face_mesh_scaled_to_pixels() {
        let mouth = MouthLandmarks::from_face_mesh(&flat_face(), Vec2::new(100.0, 200.0)).unwrap();
        assert_eq!(mouth.left_corner, Vec2::new(40.0, 100.0));
        assert!((mouth.mouth_width() - 20.0).abs() < 1e-4);
        assert!((mouth.mouth_height() - 20.0).abs() < 1e-4);
        assert!((mouth.openness() - 1.0).abs() < 1e-4);
        assert!((mouth.width_ratio() - 0.4).abs() < 1e-4);
    }

    #[test]
    fn test_face_mesh_absent_or_short() {
        let size = Vec2::new(640.0, 360.0);
        assert!(MouthLandmarks::from_face_mesh(&[], size).is_none());
        assert!(MouthLandmarks::from_face_mesh(&[0.5; 30], size).is_none());
    }

    #[test]
    fn test_degenerate_mouth() {
        let p = Vec2::new(1.0, 1.0);
        let mouth = MouthLandmarks {
            left_corner: p,
            right_corner: p,
            upper_lip: p,
            lower_lip: p + Vec2::Y,
            face_left: p,
            face_right: p,
        };
        assert_eq!(mouth.openness(), 0.0);
        assert!(mouth.width_ratio().is_infinite());
    }

    #[test]
    fn test_parse_many_hands() {
        let per_hand = HAND_POINTS * LANDMARK_STRIDE;
        let mut data = vec![0.25; per_hand];
        data.extend(vec![0.75; per_hand]);
        let size = Vec2::new(100.0, 100.0);

        let hands = HandLandmarks::parse_many(&data, 2, size);
        assert_eq!(hands.len(), 2);
        assert_eq!(hands[1].points[INDEX_TIP], Vec2::new(75.0, 75.0));

        // Reported count larger than the data: keep what is there
        assert_eq!(HandLandmarks::parse_many(&data, 3, size).len(), 2);
        assert!(HandLandmarks::parse_many(&data, 0, size).is_empty());
    }

    #[test]
    fn test_hand_geometry() {
        let mut points = [Vec2::new(10.0, 10.0); HAND_POINTS];
        points[INDEX_TIP] = Vec2::new(30.0, 50.0);
        let hand = HandLandmarks::new(points);
        assert_eq!(hand.bounds(), (Vec2::new(10.0, 10.0), Vec2::new(30.0, 50.0)));
        assert_eq!(hand.bounding_box_center(), Vec2::new(20.0, 30.0));
        assert_eq!(hand.bounding_box_area(), 800.0);
        assert_eq!(hand.palm_centroid(), Vec2::new(10.0, 10.0));
        assert_eq!(hand.index_tip(), Vec2::new(30.0, 50.0));
    }
}
