//! Scale-invariant geometric features over face-mesh reference points.
//!
//! Every distance is normalized by the inter-eye distance (between the two
//! inner-eye corners) so the features are independent of how close the face
//! is to the camera. Coordinates are y-down: "corners above the lip center"
//! means a smaller y, and `mouth_curvature` is signed so that positive means
//! smile-like.

use crate::shared::constants::{
    LEFT_EYEBROW, LEFT_EYE_INNER, LEFT_EYE_OUTER, LEFT_MOUTH_CORNER, LOWER_LIP,
    MIN_EYE_DISTANCE, MIN_LANDMARK_COUNT, RIGHT_EYEBROW, RIGHT_EYE_INNER, RIGHT_EYE_OUTER,
    RIGHT_MOUTH_CORNER, SMILE_RATIO_EPSILON, UPPER_LIP,
};
use crate::shared::landmarks::LandmarkSet;

/// Normalized feature vector for one face, or nothing if the mesh is
/// unusable. Pure value object; nothing here touches I/O.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FacialFeatures {
    pub mouth_width: f64,
    pub mouth_height: f64,
    pub smile_ratio: f64,
    /// Positive = mouth corners above the lip center (smile-like).
    pub mouth_curvature: f64,
    pub eye_opening: f64,
    pub eyebrow_position: f64,
    pub mouth_relative_position: f64,
}

impl FacialFeatures {
    /// Derive features from a landmark set.
    ///
    /// Returns `None` (never panics, never fabricates zeros) when:
    /// - the set has fewer than `MIN_LANDMARK_COUNT` points,
    /// - any of the eleven reference indices is missing or non-finite,
    /// - the inter-eye distance is below `MIN_EYE_DISTANCE`.
    pub fn from_landmarks(landmarks: &LandmarkSet) -> Option<FacialFeatures> {
        if landmarks.len() < MIN_LANDMARK_COUNT || !landmarks.has_reference_points() {
            return None;
        }

        let left_mouth = landmarks.get(LEFT_MOUTH_CORNER)?;
        let right_mouth = landmarks.get(RIGHT_MOUTH_CORNER)?;
        let upper_lip = landmarks.get(UPPER_LIP)?;
        let lower_lip = landmarks.get(LOWER_LIP)?;
        let left_eye_outer = landmarks.get(LEFT_EYE_OUTER)?;
        let left_eye_inner = landmarks.get(LEFT_EYE_INNER)?;
        let right_eye_inner = landmarks.get(RIGHT_EYE_INNER)?;
        let right_eye_outer = landmarks.get(RIGHT_EYE_OUTER)?;
        let left_brow = landmarks.get(LEFT_EYEBROW)?;
        let right_brow = landmarks.get(RIGHT_EYEBROW)?;

        let eye_distance = left_eye_inner.distance_to(&right_eye_inner);
        if eye_distance < MIN_EYE_DISTANCE {
            return None;
        }

        let mouth_width = left_mouth.distance_to(&right_mouth) / eye_distance;
        let mouth_height = (lower_lip.y - upper_lip.y).abs() / eye_distance;
        let smile_ratio = mouth_width / (mouth_height + SMILE_RATIO_EPSILON);

        let lip_center_y = (upper_lip.y + lower_lip.y) / 2.0;
        let corners_y = (left_mouth.y + right_mouth.y) / 2.0;
        let mouth_curvature = (lip_center_y - corners_y) / eye_distance;

        let left_opening = left_eye_outer.distance_to(&left_eye_inner) / eye_distance;
        let right_opening = right_eye_outer.distance_to(&right_eye_inner) / eye_distance;
        let eye_opening = (left_opening + right_opening) / 2.0;

        let eye_inner_y = (left_eye_inner.y + right_eye_inner.y) / 2.0;
        let eyebrow_position = ((left_brow.y + right_brow.y) / 2.0 - eye_inner_y) / eye_distance;

        let mouth_relative_position = (lip_center_y - eye_inner_y) / eye_distance;

        Some(FacialFeatures {
            mouth_width,
            mouth_height,
            smile_ratio,
            mouth_curvature,
            eye_opening,
            eyebrow_position,
            mouth_relative_position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::NOSE_TIP;
    use crate::shared::landmarks::Landmark;
    use approx::assert_relative_eq;
    use rstest::rstest;

    /// Full 468-point mesh with a smiling reference face. Inter-eye
    /// distance is 0.2 so all normalized values are easy to verify by hand.
    fn smiling_mesh() -> LandmarkSet {
        let mut pts = vec![Landmark::new(0.5, 0.5); 468];
        pts[LEFT_EYE_INNER] = Landmark::new(0.4, 0.4);
        pts[RIGHT_EYE_INNER] = Landmark::new(0.6, 0.4);
        pts[LEFT_EYE_OUTER] = Landmark::new(0.34, 0.4);
        pts[RIGHT_EYE_OUTER] = Landmark::new(0.66, 0.4);
        pts[LEFT_MOUTH_CORNER] = Landmark::new(0.42, 0.575);
        pts[RIGHT_MOUTH_CORNER] = Landmark::new(0.58, 0.575);
        pts[UPPER_LIP] = Landmark::new(0.5, 0.55);
        pts[LOWER_LIP] = Landmark::new(0.5, 0.62);
        pts[LEFT_EYEBROW] = Landmark::new(0.38, 0.33);
        pts[RIGHT_EYEBROW] = Landmark::new(0.62, 0.33);
        pts[NOSE_TIP] = Landmark::new(0.5, 0.47);
        LandmarkSet::new(pts)
    }

    #[test]
    fn test_smiling_mesh_features() {
        let f = FacialFeatures::from_landmarks(&smiling_mesh()).unwrap();
        // eye_distance = 0.2
        // mouth_width = 0.16 / 0.2 = 0.8
        assert_relative_eq!(f.mouth_width, 0.8, epsilon = 1e-9);
        // mouth_height = 0.07 / 0.2 = 0.35
        assert_relative_eq!(f.mouth_height, 0.35, epsilon = 1e-9);
        // smile_ratio = 0.8 / 0.351
        assert_relative_eq!(f.smile_ratio, 0.8 / 0.351, epsilon = 1e-9);
        // lip center y = 0.585, corners y = 0.575 → corners above center
        assert_relative_eq!(f.mouth_curvature, 0.05, epsilon = 1e-9);
        // each eye opening = 0.06 / 0.2 = 0.3
        assert_relative_eq!(f.eye_opening, 0.3, epsilon = 1e-9);
        // brows at 0.33 vs inner eyes at 0.4 → (0.33 - 0.4) / 0.2
        assert_relative_eq!(f.eyebrow_position, -0.35, epsilon = 1e-9);
        // (0.585 - 0.4) / 0.2
        assert_relative_eq!(f.mouth_relative_position, 0.925, epsilon = 1e-9);
    }

    #[test]
    fn test_frown_has_negative_curvature() {
        let mut pts = smiling_mesh().points().to_vec();
        // Drop the corners below the lip center (0.585)
        pts[LEFT_MOUTH_CORNER] = Landmark::new(0.42, 0.60);
        pts[RIGHT_MOUTH_CORNER] = Landmark::new(0.58, 0.60);
        let f = FacialFeatures::from_landmarks(&LandmarkSet::new(pts)).unwrap();
        assert!(f.mouth_curvature < 0.0);
    }

    #[test]
    fn test_scale_invariance() {
        let base = FacialFeatures::from_landmarks(&smiling_mesh()).unwrap();
        // Shrink the whole face by 4x around the origin
        let shrunk: Vec<Landmark> = smiling_mesh()
            .points()
            .iter()
            .map(|p| Landmark::new(p.x / 4.0, p.y / 4.0))
            .collect();
        let f = FacialFeatures::from_landmarks(&LandmarkSet::new(shrunk)).unwrap();
        assert_relative_eq!(f.smile_ratio, base.smile_ratio, epsilon = 1e-6);
        assert_relative_eq!(f.mouth_curvature, base.mouth_curvature, epsilon = 1e-6);
        assert_relative_eq!(f.eye_opening, base.eye_opening, epsilon = 1e-6);
    }

    #[rstest]
    #[case::empty(0)]
    #[case::one(1)]
    #[case::just_below_floor(199)]
    fn test_too_few_landmarks_is_invalid(#[case] count: usize) {
        let set = LandmarkSet::new(vec![Landmark::new(0.5, 0.5); count]);
        assert!(FacialFeatures::from_landmarks(&set).is_none());
    }

    #[rstest]
    #[case::mouth_corner(LEFT_MOUTH_CORNER)]
    #[case::upper_lip(UPPER_LIP)]
    #[case::eye_inner(RIGHT_EYE_INNER)]
    #[case::eyebrow(LEFT_EYEBROW)]
    #[case::nose(NOSE_TIP)]
    fn test_missing_reference_point_is_invalid(#[case] index: usize) {
        let mut pts = smiling_mesh().points().to_vec();
        pts[index] = Landmark::new(f64::NAN, f64::NAN);
        assert!(FacialFeatures::from_landmarks(&LandmarkSet::new(pts)).is_none());
    }

    #[test]
    fn test_degenerate_eye_distance_is_invalid() {
        let mut pts = smiling_mesh().points().to_vec();
        // Inner eyes 0.005 apart, below the 0.01 floor
        pts[LEFT_EYE_INNER] = Landmark::new(0.500, 0.4);
        pts[RIGHT_EYE_INNER] = Landmark::new(0.505, 0.4);
        assert!(FacialFeatures::from_landmarks(&LandmarkSet::new(pts)).is_none());
    }

    #[test]
    fn test_closed_mouth_smile_ratio_is_finite() {
        let mut pts = smiling_mesh().points().to_vec();
        // Lips touching: height 0, the epsilon keeps the ratio finite
        pts[UPPER_LIP] = Landmark::new(0.5, 0.58);
        pts[LOWER_LIP] = Landmark::new(0.5, 0.58);
        let f = FacialFeatures::from_landmarks(&LandmarkSet::new(pts)).unwrap();
        assert!(f.smile_ratio.is_finite());
        // width 0.8 over epsilon alone
        assert_relative_eq!(f.smile_ratio, 0.8 / SMILE_RATIO_EPSILON, epsilon = 1e-6);
    }
}
