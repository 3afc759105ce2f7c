/// A blob centroid observed in a single frame.
///
/// Coordinates are in pixels. Only strictly positive, finite coordinates are
/// usable; anything else is treated as an absent detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Detection {
    pub x: f64,
    pub y: f64,
}

impl Detection {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether the point can be fed to the association step.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &Detection) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<(f64, f64)> for Detection {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Detection {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

/// Drop unusable detections, keeping the order of the rest.
///
/// Returns the kept detections and the number that were excluded.
pub fn filter_valid(detections: &[Detection]) -> (Vec<Detection>, usize) {
    let valid: Vec<Detection> = detections.iter().copied().filter(Detection::is_valid).collect();
    let excluded = detections.len() - valid.len();
    (valid, excluded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_coordinates_are_invalid() {
        assert!(Detection::new(1.0, 1.0).is_valid());
        assert!(!Detection::new(0.0, 10.0).is_valid());
        assert!(!Detection::new(10.0, -3.0).is_valid());
        assert!(!Detection::new(f64::NAN, 10.0).is_valid());
    }

    #[test]
    fn test_filter_valid_keeps_order() {
        let dets = vec![
            Detection::new(5.0, 5.0),
            Detection::new(0.0, 0.0),
            Detection::new(7.0, 3.0),
        ];
        let (valid, excluded) = filter_valid(&dets);
        assert_eq!(excluded, 1);
        assert_eq!(valid, vec![Detection::new(5.0, 5.0), Detection::new(7.0, 3.0)]);
    }

    #[test]
    fn test_distance() {
        let a = Detection::new(3.0, 4.0);
        let b = Detection::new(6.0, 8.0);
        assert_eq!(a.distance(&b), 5.0);
    }
}
