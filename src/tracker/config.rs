//! Tracker configuration.

use serde::{Deserialize, Serialize};

use crate::tracker::error::TrackerError;

/// Diagonal noise parameters for the shared Kalman filter.
///
/// Each triple holds the variance for the (position, velocity, acceleration)
/// components and is applied to both the x and y axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Diagonal of the initial state covariance `P`.
    pub initial_covariance: [f64; 3],
    /// Diagonal of the process noise `Q`.
    pub process_noise: [f64; 3],
    /// Variance of each measured coordinate, the diagonal of `R`.
    pub measurement_variance: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            initial_covariance: [100.0, 10.0, 1.0],
            process_noise: [100.0, 10.0, 1.0],
            measurement_variance: 1.0,
        }
    }
}

impl NoiseConfig {
    /// Expand a (position, velocity, acceleration) triple to the six state
    /// components `[x, y, vx, vy, ax, ay]`.
    pub(crate) fn expand(triple: [f64; 3]) -> [f64; 6] {
        [
            triple[0], triple[0], triple[1], triple[1], triple[2], triple[2],
        ]
    }

    fn validate(&self) -> Result<(), TrackerError> {
        let non_negative = |v: &f64| v.is_finite() && *v >= 0.0;
        if !self.initial_covariance.iter().all(non_negative) {
            return Err(TrackerError::InvalidConfig {
                field: "noise.initial_covariance",
                reason: "must be finite and non-negative",
            });
        }
        if !self.process_noise.iter().all(non_negative) {
            return Err(TrackerError::InvalidConfig {
                field: "noise.process_noise",
                reason: "must be finite and non-negative",
            });
        }
        if !(self.measurement_variance.is_finite() && self.measurement_variance > 0.0) {
            return Err(TrackerError::InvalidConfig {
                field: "noise.measurement_variance",
                reason: "must be finite and positive",
            });
        }
        Ok(())
    }
}

/// Configuration for the [`BlobTracker`](crate::tracker::BlobTracker).
///
/// The value is immutable once handed to the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum number of track slots the table can ever hold.
    pub max_tracks: usize,
    /// Consecutive misses after which a track is retired.
    pub retirement_threshold: u32,
    /// Largest accepted distance between a prediction and its detection.
    pub gating_distance: f64,
    /// Number of frames `BlobTracker::run` analyses; `None` means all of them.
    pub stop_frame: Option<usize>,
    pub noise: NoiseConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_tracks: 75_000,
            retirement_threshold: 4,
            gating_distance: 20.0,
            stop_frame: None,
            noise: NoiseConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Default configuration with the given track capacity.
    pub fn new(max_tracks: usize) -> Self {
        Self {
            max_tracks,
            ..Self::default()
        }
    }

    pub fn with_retirement_threshold(mut self, threshold: u32) -> Self {
        self.retirement_threshold = threshold;
        self
    }

    pub fn with_gating_distance(mut self, distance: f64) -> Self {
        self.gating_distance = distance;
        self
    }

    pub fn with_stop_frame(mut self, stop_frame: usize) -> Self {
        self.stop_frame = Some(stop_frame);
        self
    }

    pub fn with_noise(mut self, noise: NoiseConfig) -> Self {
        self.noise = noise;
        self
    }

    /// Check every field, failing on the first out-of-range value.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.max_tracks == 0 {
            return Err(TrackerError::InvalidConfig {
                field: "max_tracks",
                reason: "must be positive",
            });
        }
        if self.retirement_threshold == 0 {
            return Err(TrackerError::InvalidConfig {
                field: "retirement_threshold",
                reason: "must be positive",
            });
        }
        if !(self.gating_distance.is_finite() && self.gating_distance > 0.0) {
            return Err(TrackerError::InvalidConfig {
                field: "gating_distance",
                reason: "must be finite and positive",
            });
        }
        self.noise.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TrackerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retirement_threshold, 4);
        assert_eq!(config.gating_distance, 20.0);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = TrackerConfig::new(0).validate().unwrap_err();
        assert_eq!(
            err,
            TrackerError::InvalidConfig {
                field: "max_tracks",
                reason: "must be positive"
            }
        );
    }

    #[test]
    fn test_bad_gate_and_threshold_rejected() {
        assert!(TrackerConfig::new(5).with_gating_distance(0.0).validate().is_err());
        assert!(TrackerConfig::new(5).with_gating_distance(f64::NAN).validate().is_err());
        assert!(TrackerConfig::new(5).with_retirement_threshold(0).validate().is_err());
    }

    #[test]
    fn test_measurement_variance_must_be_positive() {
        let noise = NoiseConfig {
            measurement_variance: 0.0,
            ..NoiseConfig::default()
        };
        let err = TrackerConfig::new(5).with_noise(noise).validate().unwrap_err();
        assert!(matches!(
            err,
            TrackerError::InvalidConfig {
                field: "noise.measurement_variance",
                ..
            }
        ));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"max_tracks": 12, "gating_distance": 35.5}"#).unwrap();
        assert_eq!(config.max_tracks, 12);
        assert_eq!(config.gating_distance, 35.5);
        assert_eq!(config.retirement_threshold, 4);
        assert_eq!(config.noise, NoiseConfig::default());
    }

    #[test]
    fn test_expand_triple() {
        assert_eq!(
            NoiseConfig::expand([1.0, 2.0, 3.0]),
            [1.0, 1.0, 2.0, 2.0, 3.0, 3.0]
        );
    }
}
