//! A single tracked blob.

use ndarray::{Array1, Array2};

use crate::tracker::detection::Detection;
use crate::tracker::kalman_filter::SharedKalmanFilter;
use crate::tracker::track_state::TrackStatus;

/// One slot of the track table.
#[derive(Debug, Clone)]
pub struct Track {
    /// Slot index, the stable identity of the track
    pub slot: usize,
    /// Current lifecycle status
    pub status: TrackStatus,
    /// Consecutive frames without an accepted detection
    pub misses: u32,
    /// Frames in which the track received an accepted detection
    pub hits: u32,
    /// Frame in which the track was spawned
    pub start_frame: usize,
    /// Last frame with an accepted detection
    pub last_matched_frame: Option<usize>,
    /// State `[x, y, vx, vy, ax, ay]`, `None` once retired
    pub mean: Option<Array1<f64>>,
}

impl Track {
    pub fn new(
        slot: usize,
        detection: Detection,
        kalman_filter: &SharedKalmanFilter,
        frame: usize,
    ) -> Self {
        Self {
            slot,
            status: TrackStatus::Active,
            misses: 0,
            hits: 0,
            start_frame: frame,
            last_matched_frame: None,
            mean: Some(kalman_filter.initiate(detection.to_array())),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Current position estimate, if the track is still active.
    pub fn position(&self) -> Option<Detection> {
        self.mean.as_ref().map(|m| Detection::new(m[0], m[1]))
    }

    pub fn predict(&mut self, kalman_filter: &SharedKalmanFilter) {
        if let Some(mean) = &self.mean {
            self.mean = Some(kalman_filter.predict_state(mean));
        }
    }

    /// Apply an accepted detection and reset the miss counter.
    pub fn update(
        &mut self,
        detection: Detection,
        kalman_filter: &SharedKalmanFilter,
        gain: &Array2<f64>,
        frame: usize,
    ) -> Option<Array1<f64>> {
        let mean = self.mean.as_ref()?;
        let (new_mean, residual) = kalman_filter.correct(mean, gain, detection.to_array());
        self.mean = Some(new_mean);
        self.misses = 0;
        self.hits += 1;
        self.last_matched_frame = Some(frame);
        Some(residual)
    }

    /// Count one missed frame. Returns `true` if this miss retired the track.
    pub fn mark_missed(&mut self, retirement_threshold: u32) -> bool {
        if !self.is_active() {
            return false;
        }
        self.misses += 1;
        if self.misses >= retirement_threshold {
            self.mark_retired();
            return true;
        }
        false
    }

    pub fn mark_retired(&mut self) {
        self.status = TrackStatus::Retired;
        self.mean = None;
    }
}
