//! Integration module for connecting blob detectors with the tracker.
//!
//! Frame decoding, preprocessing and blob detection live outside this crate.
//! This module provides the trait seam they plug into and a pipeline that
//! drives detection and tracking together.

mod detector;
mod pipeline;

pub use detector::{DetectionSource, IntoDetections};
pub use pipeline::{PipelineError, TrackerPipeline};
