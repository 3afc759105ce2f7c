//! Multi-target tracking of blob centroids across video frames.
//!
//! The [`tracker`] module holds the predict/associate/correct/age/record
//! engine. The [`integration`] module connects an external blob detector to
//! the tracker.

pub mod integration;
pub mod tracker;

pub use integration::{DetectionSource, IntoDetections, PipelineError, TrackerPipeline};
pub use tracker::{
    BlobTracker, Detection, FrameAnomaly, FrameReport, NoiseConfig, TrackStatus, TrackerConfig,
    TrackerError, TrackingRun, TrajectoryPoint,
};
