//! Frame-by-frame driver: predict, associate, correct, spawn, age, record.

use log::{debug, info, trace};

use crate::tracker::config::TrackerConfig;
use crate::tracker::detection::{Detection, filter_valid};
use crate::tracker::error::{FrameAnomaly, TrackerError};
use crate::tracker::kalman_filter::SharedKalmanFilter;
use crate::tracker::matching::associate;
use crate::tracker::track_table::TrackTable;
use crate::tracker::trajectory::{self, TrajectoryPoint, TrajectoryRecorder};

/// Phase of the per-frame cycle. Every active track goes through a phase
/// before any track enters the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramePhase {
    /// Waiting for the next frame
    #[default]
    Idle,
    /// Motion model applied to every active track and to `P`
    Predict,
    /// Predictions matched against detections
    Associate,
    /// Accepted detections applied, then the shared posterior
    Correct,
    /// Tracks created for unmatched detections
    Spawn,
    /// Miss counters advanced, stale tracks retired
    Age,
    /// Accepted estimates appended to trajectories
    Record,
}

/// What happened to the track population in one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub frame: usize,
    /// Accepted `(track_slot, detection_index)` pairs. Detection indices
    /// refer to the frame's detections after invalid ones were removed.
    pub matches: Vec<(usize, usize)>,
    pub spawned: Vec<usize>,
    pub retired: Vec<usize>,
    /// Active tracks at the end of the frame
    pub active_tracks: usize,
    /// Sum of the accepted pair distances
    pub total_cost: f64,
    pub anomalies: Vec<FrameAnomaly>,
}

impl FrameReport {
    fn new(frame: usize) -> Self {
        Self {
            frame,
            ..Default::default()
        }
    }

    /// Whether the frame hit the track capacity.
    pub fn capacity_exceeded(&self) -> bool {
        self.anomalies
            .iter()
            .any(|a| matches!(a, FrameAnomaly::CapacityExceeded { .. }))
    }
}

/// Result of a complete run.
#[derive(Debug, Clone, Default)]
pub struct TrackingRun {
    /// Trajectory of every slot ever instantiated, indexed by slot
    pub trajectories: Vec<Vec<TrajectoryPoint>>,
    /// Number of slots ever instantiated
    pub track_count: usize,
    pub frames_processed: usize,
}

impl TrackingRun {
    pub fn trajectory(&self, track_id: usize) -> &[TrajectoryPoint] {
        self.trajectories
            .get(track_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All points ordered by frame, then by track id.
    pub fn points_by_frame(&self) -> Vec<TrajectoryPoint> {
        trajectory::sorted_points(&self.trajectories)
    }

    /// Write the `frame,ID,x,y` result stream.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> std::io::Result<()> {
        trajectory::write_csv(&self.trajectories, writer)
    }
}

/// Multi-target tracker for blob centroids.
pub struct BlobTracker {
    config: TrackerConfig,
    table: TrackTable,
    kalman_filter: SharedKalmanFilter,
    recorder: TrajectoryRecorder,
    frame_id: usize,
    phase: FramePhase,
}

impl BlobTracker {
    /// Validate the configuration and build an empty tracker.
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self {
            table: TrackTable::new(config.max_tracks),
            kalman_filter: SharedKalmanFilter::new(&config.noise),
            recorder: TrajectoryRecorder::new(),
            frame_id: 0,
            phase: FramePhase::Idle,
            config,
        })
    }

    /// Track a whole sequence of frames and collect the trajectories.
    ///
    /// Stops early after `config.stop_frame` frames when it is set.
    pub fn run<I, F>(config: TrackerConfig, frames: I) -> Result<TrackingRun, TrackerError>
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[Detection]>,
    {
        let mut tracker = Self::new(config)?;
        let limit = tracker.config.stop_frame.unwrap_or(usize::MAX);
        for detections in frames.into_iter().take(limit) {
            tracker.update(detections.as_ref())?;
        }
        Ok(tracker.finish())
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Index of the next frame to be processed.
    pub fn frame_id(&self) -> usize {
        self.frame_id
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    pub fn tracks(&self) -> &TrackTable {
        &self.table
    }

    pub fn recorder(&self) -> &TrajectoryRecorder {
        &self.recorder
    }

    pub fn kalman_filter(&self) -> &SharedKalmanFilter {
        &self.kalman_filter
    }

    /// Number of track slots ever instantiated.
    pub fn track_count(&self) -> usize {
        self.table.len()
    }

    pub fn active_count(&self) -> usize {
        self.table.active_count()
    }

    /// Process the next frame's detections.
    ///
    /// Per-frame problems (full table, nothing to match, gated pairs) are
    /// reported in the returned [`FrameReport`]; only a numerical failure of
    /// the filter is an error.
    pub fn update(&mut self, detections: &[Detection]) -> Result<FrameReport, TrackerError> {
        let frame = self.frame_id;
        let mut report = FrameReport::new(frame);
        let mut capacity_hit = false;

        let (detections, excluded) = filter_valid(detections);
        if excluded > 0 {
            debug!("Frame {}: {} invalid detections excluded", frame, excluded);
            report
                .anomalies
                .push(FrameAnomaly::InvalidDetections { count: excluded });
        }

        // The first frame seeds one track per detection, so that those
        // detections are corrected and recorded in this same frame.
        if frame == 0 {
            for (idx, det) in detections.iter().enumerate() {
                match self.table.spawn(*det, &self.kalman_filter, frame) {
                    Ok(slot) => report.spawned.push(slot),
                    Err(TrackerError::CapacityExceeded { capacity }) => {
                        self.report_capacity(&mut report, idx, capacity);
                        capacity_hit = true;
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        self.enter(FramePhase::Predict);
        self.table.predict_all(&self.kalman_filter);
        self.kalman_filter.predict_covariance();
        let gain = self.kalman_filter.gain()?;

        self.enter(FramePhase::Associate);
        let (active_slots, predictions): (Vec<usize>, Vec<Detection>) = self
            .table
            .iter()
            .filter(|t| t.is_active())
            .filter_map(|t| t.position().map(|p| (t.slot, p)))
            .unzip();
        let association = associate(
            &active_slots,
            &predictions,
            &detections,
            self.config.gating_distance,
        );
        if association.is_degenerate() {
            debug!(
                "Frame {}: degenerate association ({} tracks, {} detections)",
                frame,
                active_slots.len(),
                detections.len()
            );
            report.anomalies.push(FrameAnomaly::DegenerateAssociation {
                tracks: active_slots.len(),
                detections: detections.len(),
            });
        }
        if association.solver_failed {
            report.anomalies.push(FrameAnomaly::AssignmentFailed);
        }
        for &(slot, detection_index, cost) in &association.rejected {
            debug!(
                "Frame {}: track {} gated out from detection {} (distance {:.2})",
                frame, slot, detection_index, cost
            );
            report.anomalies.push(FrameAnomaly::GatedOut {
                slot,
                detection_index,
                cost,
            });
        }

        self.enter(FramePhase::Correct);
        for &(slot, det_idx) in &association.matches {
            let Some(track) = self.table.get_mut(slot) else {
                continue;
            };
            if let Some(residual) =
                track.update(detections[det_idx], &self.kalman_filter, &gain, frame)
            {
                trace!(
                    "Frame {}: track {} corrected by detection {} residual ({:.3}, {:.3})",
                    frame, slot, det_idx, residual[0], residual[1]
                );
            }
        }
        self.kalman_filter.apply_posterior(&gain);

        self.enter(FramePhase::Spawn);
        if !capacity_hit {
            for &idx in &association.unmatched_detections {
                match self.table.spawn(detections[idx], &self.kalman_filter, frame) {
                    Ok(slot) => report.spawned.push(slot),
                    Err(TrackerError::CapacityExceeded { capacity }) => {
                        self.report_capacity(&mut report, idx, capacity);
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        self.recorder.ensure_slots(self.table.len());

        self.enter(FramePhase::Age);
        for &slot in &association.unmatched_slots {
            let Some(track) = self.table.get_mut(slot) else {
                continue;
            };
            if track.mark_missed(self.config.retirement_threshold) {
                debug!(
                    "Track {} retired in frame {} after {} missed frames",
                    slot, frame, track.misses
                );
                report.retired.push(slot);
            }
        }

        self.enter(FramePhase::Record);
        for &(slot, _) in &association.matches {
            if let Some(pos) = self.table.get(slot).and_then(|t| t.position()) {
                self.recorder.record(slot, frame, pos.x, pos.y);
            }
        }

        report.matches = association.matches;
        report.total_cost = association.total_cost;
        report.active_tracks = self.table.active_count();
        debug_assert!(report.active_tracks <= self.config.max_tracks);

        self.enter(FramePhase::Idle);
        self.frame_id += 1;
        Ok(report)
    }

    /// Consume the tracker and hand out the collected trajectories.
    pub fn finish(mut self) -> TrackingRun {
        self.recorder.ensure_slots(self.table.len());
        info!(
            "Tracking finished: {} frames, {} tracks instantiated, {} still active",
            self.frame_id,
            self.table.len(),
            self.table.active_count()
        );
        TrackingRun {
            track_count: self.table.len(),
            frames_processed: self.frame_id,
            trajectories: self.recorder.into_trajectories(),
        }
    }

    fn enter(&mut self, phase: FramePhase) {
        trace!("Frame {}: {:?}", self.frame_id, phase);
        self.phase = phase;
    }

    fn report_capacity(&self, report: &mut FrameReport, detection_index: usize, capacity: usize) {
        debug!(
            "Frame {}: track table full ({} tracks), dropping detection {} and the rest of the frame's new detections",
            self.frame_id, capacity, detection_index
        );
        report.anomalies.push(FrameAnomaly::CapacityExceeded {
            detection_index,
            capacity,
        });
    }
}
