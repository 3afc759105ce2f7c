//! Error and anomaly types for the tracker.

use thiserror::Error;

/// Errors surfaced to the caller of the tracker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// A configuration value is out of range. Raised before any frame runs.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },

    /// The track table is full and a new track cannot be spawned.
    #[error("track table full: capacity of {capacity} tracks reached")]
    CapacityExceeded { capacity: usize },

    /// The innovation covariance `H·P·Hᵗ + R` could not be inverted.
    #[error("innovation covariance is singular")]
    SingularInnovation,
}

/// Per-frame condition that was handled locally and did not stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameAnomaly {
    /// Detection `detection_index` could not be spawned because the table is full.
    /// The remaining unmatched detections of the frame were dropped with it.
    CapacityExceeded {
        detection_index: usize,
        capacity: usize,
    },
    /// No active tracks and/or no detections; the matching was empty.
    DegenerateAssociation { tracks: usize, detections: usize },
    /// Detections with non-positive or non-finite coordinates were excluded.
    InvalidDetections { count: usize },
    /// An optimal pair was rejected because its distance exceeded the gate.
    GatedOut {
        slot: usize,
        detection_index: usize,
        cost: f64,
    },
    /// The assignment solver reported a failure; every track was left unmatched.
    AssignmentFailed,
}
