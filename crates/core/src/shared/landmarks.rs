//! Face-mesh landmark containers.
//!
//! One `LandmarkSet` per detected face, produced fresh for each frame by a
//! `LandmarkExtractor` and consumed by feature normalization. Coordinates
//! are in normalized image space (0..1, y grows downward).

use crate::shared::constants::REFERENCE_INDICES;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn with_depth(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Euclidean distance in the image plane (z ignored).
    pub fn distance_to(&self, other: &Landmark) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Ordered keypoints for one face, indexed by the face-mesh numbering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    /// Look up a landmark by mesh index, rejecting non-finite points.
    pub fn get(&self, index: usize) -> Option<Landmark> {
        self.points.get(index).copied().filter(Landmark::is_finite)
    }

    /// True when every reference index resolves to a finite point.
    pub fn has_reference_points(&self) -> bool {
        REFERENCE_INDICES.iter().all(|&i| self.get(i).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance_is_planar() {
        let a = Landmark::with_depth(0.0, 0.0, 5.0);
        let b = Landmark::with_depth(3.0, 4.0, -5.0);
        assert_relative_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_get_out_of_range_is_none() {
        let set = LandmarkSet::new(vec![Landmark::new(0.5, 0.5); 10]);
        assert!(set.get(9).is_some());
        assert!(set.get(10).is_none());
    }

    #[test]
    fn test_get_rejects_non_finite() {
        let mut pts = vec![Landmark::new(0.5, 0.5); 10];
        pts[3] = Landmark::new(f64::NAN, 0.5);
        let set = LandmarkSet::new(pts);
        assert!(set.get(3).is_none());
    }

    #[test]
    fn test_reference_points_present_in_full_mesh() {
        let set = LandmarkSet::new(vec![Landmark::new(0.5, 0.5); 468]);
        assert!(set.has_reference_points());
    }

    #[test]
    fn test_reference_points_missing_in_short_mesh() {
        // 200 points is above the usable-count floor but still misses the
        // high-numbered eye and mouth indices.
        let set = LandmarkSet::new(vec![Landmark::new(0.5, 0.5); 200]);
        assert!(!set.has_reference_points());
    }

    #[test]
    fn test_empty_set() {
        let set = LandmarkSet::default();
        assert!(set.is_empty());
        assert!(!set.has_reference_points());
    }
}
