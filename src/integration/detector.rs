//! Trait for blob detectors feeding the tracker.

use crate::tracker::Detection;

/// Trait for blob detection backends.
///
/// Implement this trait to connect any frame preprocessing and blob
/// detection stage to the tracker. The tracker only ever sees the returned
/// centroids.
///
/// # Example
///
/// ```
/// use blobtrack_rs::{Detection, DetectionSource};
///
/// struct Precomputed(Vec<Vec<(f64, f64)>>);
///
/// impl DetectionSource for Precomputed {
///     type Frame = usize;
///     type Error = std::convert::Infallible;
///
///     fn detect(&mut self, frame: &usize) -> Result<Vec<Detection>, Self::Error> {
///         Ok(self.0[*frame].iter().map(|&p| Detection::from(p)).collect())
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Frame representation consumed by the detector.
    type Frame;

    /// Error type for detection failures.
    type Error;

    /// Find the blob centroids of one frame.
    fn detect(&mut self, frame: &Self::Frame) -> Result<Vec<Detection>, Self::Error>;
}

/// Helper trait for converting detector-specific outputs to `Detection`.
pub trait IntoDetections {
    /// Convert the output into a vector of detections.
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

impl IntoDetections for Vec<(f64, f64)> {
    fn into_detections(self) -> Vec<Detection> {
        self.into_iter().map(Detection::from).collect()
    }
}

impl IntoDetections for Vec<[f64; 2]> {
    fn into_detections(self) -> Vec<Detection> {
        self.into_iter().map(Detection::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_conversion() {
        let dets = vec![(1.0, 2.0), (3.0, 4.0)].into_detections();
        assert_eq!(dets, vec![Detection::new(1.0, 2.0), Detection::new(3.0, 4.0)]);
    }
}
