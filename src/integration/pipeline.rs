//! TrackerPipeline for combining blob detection with tracking.

use thiserror::Error;

use crate::tracker::{BlobTracker, FrameReport, TrackerConfig, TrackerError, TrackingRun};

use super::DetectionSource;

/// Failure of either stage of a [`TrackerPipeline`].
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    #[error("detection failed on frame {frame}")]
    Detector { frame: usize, source: E },
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// A detector bundled with a [`BlobTracker`].
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    tracker: BlobTracker,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    /// Create a new tracking pipeline with the given detector and tracker config.
    pub fn new(detector: D, config: TrackerConfig) -> Result<Self, TrackerError> {
        Ok(Self {
            detector,
            tracker: BlobTracker::new(config)?,
        })
    }

    /// Create a new tracking pipeline with default tracker configuration.
    pub fn with_default_config(detector: D) -> Result<Self, TrackerError> {
        Self::new(detector, TrackerConfig::default())
    }

    /// Detect blobs in a single frame and advance the tracker by one frame.
    pub fn process_frame(
        &mut self,
        frame: &D::Frame,
    ) -> Result<FrameReport, PipelineError<D::Error>> {
        let detections = self
            .detector
            .detect(frame)
            .map_err(|source| PipelineError::Detector {
                frame: self.tracker.frame_id(),
                source,
            })?;
        Ok(self.tracker.update(&detections)?)
    }

    /// Detect every frame first, then track them in order.
    ///
    /// Honors the configured stop frame, counting frames already fed
    /// through [`process_frame`](Self::process_frame).
    pub fn run<'a, I>(mut self, frames: I) -> Result<TrackingRun, PipelineError<D::Error>>
    where
        I: IntoIterator<Item = &'a D::Frame>,
        D::Frame: 'a,
    {
        let first_frame = self.tracker.frame_id();
        let limit = self
            .tracker
            .config()
            .stop_frame
            .map_or(usize::MAX, |stop| stop.saturating_sub(first_frame));
        let detections = frames
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(offset, f)| {
                let frame = first_frame + offset;
                self.detector
                    .detect(f)
                    .map_err(|source| PipelineError::Detector { frame, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for frame_detections in &detections {
            self.tracker.update(frame_detections)?;
        }
        Ok(self.tracker.finish())
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &BlobTracker {
        &self.tracker
    }

    /// Stop feeding frames and collect the trajectories.
    pub fn finish(self) -> TrackingRun {
        self.tracker.finish()
    }
}
