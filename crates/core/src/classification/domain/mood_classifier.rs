//! Rule-based mood classification over normalized facial features.
//!
//! The decision table is ordered and the ranges overlap, so rules must be
//! evaluated top to bottom: a wide grin with open eyes is `excited` even
//! though it also satisfies the `happy` thresholds. The constants are
//! hand-tuned; they are the behavioral contract, not a validated model.

use crate::classification::domain::features::FacialFeatures;
use crate::classification::domain::mood::{Mood, MoodReading};

const EXCITED_SMILE_RATIO: f64 = 2.8;
const EXCITED_CURVATURE: f64 = 0.015;
const EXCITED_EYE_OPENING: f64 = 0.075;

const HAPPY_SMILE_RATIO: f64 = 2.0;
const HAPPY_CURVATURE: f64 = 0.008;

const SAD_SMILE_RATIO: f64 = 2.0;
const SAD_CURVATURE: f64 = -0.003;

const FOCUSED_SMILE_RATIO_MIN: f64 = 1.9;
const FOCUSED_SMILE_RATIO_MAX: f64 = 2.3;
const FOCUSED_EYE_OPENING_MIN: f64 = 0.055;
const FOCUSED_EYE_OPENING_MAX: f64 = 0.085;
const FOCUSED_CURVATURE_BAND: f64 = 0.012;

/// Map a valid feature vector to a mood and confidence. Pure and
/// deterministic: the same vector always yields the same reading.
pub fn classify(features: &FacialFeatures) -> MoodReading {
    let sr = features.smile_ratio;
    let mc = features.mouth_curvature;
    let eo = features.eye_opening;

    if sr > EXCITED_SMILE_RATIO && mc > EXCITED_CURVATURE && eo > EXCITED_EYE_OPENING {
        let confidence = (0.8 + (sr - EXCITED_SMILE_RATIO) * 0.1).min(0.95);
        return MoodReading::new(Mood::Excited, confidence);
    }

    if sr > HAPPY_SMILE_RATIO && mc > HAPPY_CURVATURE {
        let confidence = (0.75 + (sr - HAPPY_SMILE_RATIO) * 0.15).min(0.95);
        return MoodReading::new(Mood::Happy, confidence);
    }

    if sr < SAD_SMILE_RATIO && mc < SAD_CURVATURE {
        let confidence = (0.7 + mc.abs() * 25.0).min(0.9);
        return MoodReading::new(Mood::Sad, confidence);
    }

    if (FOCUSED_SMILE_RATIO_MIN..=FOCUSED_SMILE_RATIO_MAX).contains(&sr)
        && (FOCUSED_EYE_OPENING_MIN..=FOCUSED_EYE_OPENING_MAX).contains(&eo)
        && mc.abs() < FOCUSED_CURVATURE_BAND
    {
        return MoodReading::new(Mood::Focused, 0.75);
    }

    MoodReading::new(Mood::Relaxed, 0.7)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn features(smile_ratio: f64, mouth_curvature: f64, eye_opening: f64) -> FacialFeatures {
        FacialFeatures {
            mouth_width: 0.8,
            mouth_height: 0.3,
            smile_ratio,
            mouth_curvature,
            eye_opening,
            eyebrow_position: -0.3,
            mouth_relative_position: 0.9,
        }
    }

    #[test]
    fn test_deterministic_for_fixed_vector() {
        let f = features(2.5, 0.01, 0.07);
        let first = classify(&f);
        for _ in 0..10 {
            assert_eq!(classify(&f), first);
        }
    }

    #[test]
    fn test_excited_takes_precedence_over_happy() {
        // Satisfies both rule 1 and rule 2; rule 1 must win.
        let reading = classify(&features(3.0, 0.02, 0.08));
        assert_eq!(reading.mood, Mood::Excited);
    }

    #[test]
    fn test_confident_excited_smile_scenario() {
        let reading = classify(&features(3.2, 0.02, 0.08));
        assert_eq!(reading.mood, Mood::Excited);
        // 0.8 + (3.2 - 2.8) * 0.1 = 0.84
        assert!(reading.confidence >= 0.82 && reading.confidence <= 0.95);
        assert_relative_eq!(reading.confidence, 0.84, epsilon = 1e-9);
    }

    #[test]
    fn test_excited_confidence_caps_at_095() {
        let reading = classify(&features(5.0, 0.02, 0.08));
        assert_relative_eq!(reading.confidence, 0.95);
    }

    #[test]
    fn test_happy_when_eyes_not_wide_enough_for_excited() {
        let reading = classify(&features(3.0, 0.02, 0.05));
        assert_eq!(reading.mood, Mood::Happy);
        // 0.75 + (3.0 - 2.0) * 0.15 = 0.9
        assert_relative_eq!(reading.confidence, 0.9, epsilon = 1e-9);
    }

    #[test]
    fn test_frown_scenario() {
        let reading = classify(&features(1.5, -0.01, 0.07));
        assert_eq!(reading.mood, Mood::Sad);
        // 0.7 + 0.01 * 25 = 0.95 capped at 0.9
        assert!(reading.confidence >= 0.7 && reading.confidence <= 0.9);
        assert_relative_eq!(reading.confidence, 0.9, epsilon = 1e-9);
    }

    #[test]
    fn test_mild_frown_confidence() {
        let reading = classify(&features(1.8, -0.004, 0.07));
        assert_eq!(reading.mood, Mood::Sad);
        // 0.7 + 0.004 * 25 = 0.8
        assert_relative_eq!(reading.confidence, 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_neutral_focused_scenario() {
        let reading = classify(&features(2.1, 0.005, 0.07));
        assert_eq!(reading.mood, Mood::Focused);
        assert_relative_eq!(reading.confidence, 0.75);
    }

    #[test]
    fn test_default_is_relaxed() {
        // Wide-ish mouth but flat curvature, eyes outside the focused band
        let reading = classify(&features(2.5, 0.0, 0.2));
        assert_eq!(reading.mood, Mood::Relaxed);
        assert_relative_eq!(reading.confidence, 0.7);
    }

    #[rstest]
    // sad is checked before focused: overlapping SR band, negative curvature
    #[case::sad_beats_focused(1.95, -0.005, 0.07, Mood::Sad)]
    // positive curvature above the happy floor inside the focused SR band
    #[case::happy_beats_focused(2.1, 0.009, 0.07, Mood::Happy)]
    // flat face outside every rule
    #[case::flat_wide_eyes(1.0, 0.0, 0.3, Mood::Relaxed)]
    fn test_rule_ordering(
        #[case] sr: f64,
        #[case] mc: f64,
        #[case] eo: f64,
        #[case] expected: Mood,
    ) {
        assert_eq!(classify(&features(sr, mc, eo)).mood, expected);
    }

    #[test]
    fn test_confidence_always_in_unit_range() {
        for sr in [0.0, 1.0, 2.0, 2.8, 3.5, 10.0] {
            for mc in [-0.1, -0.01, 0.0, 0.01, 0.1] {
                for eo in [0.0, 0.06, 0.08, 0.5] {
                    let r = classify(&features(sr, mc, eo));
                    assert!((0.0..=1.0).contains(&r.confidence), "{sr} {mc} {eo}");
                }
            }
        }
    }
}
