//! Per-track position history and the `frame,ID,x,y` result stream.

use std::io::{self, Write};

use csv::WriterBuilder;
use log::warn;
use serde::{Deserialize, Serialize};

/// Accepted position estimate of one track in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub frame: usize,
    #[serde(rename = "ID")]
    pub track_id: usize,
    pub x: f64,
    pub y: f64,
}

/// Append-only trajectories keyed by track slot.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryRecorder {
    trajectories: Vec<Vec<TrajectoryPoint>>,
}

impl TrajectoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure slots `0..count` exist, so tracks that are never matched
    /// still show up with an empty trajectory.
    pub fn ensure_slots(&mut self, count: usize) {
        if self.trajectories.len() < count {
            self.trajectories.resize_with(count, Vec::new);
        }
    }

    /// Append an estimate. Returns `false` and records nothing if the slot
    /// already has an estimate for this frame or a later one.
    pub fn record(&mut self, track_id: usize, frame: usize, x: f64, y: f64) -> bool {
        self.ensure_slots(track_id + 1);
        let trajectory = &mut self.trajectories[track_id];
        if let Some(last) = trajectory.last().filter(|p| p.frame >= frame) {
            warn!(
                "Refusing estimate for track {} in frame {}: already recorded frame {}",
                track_id, frame, last.frame
            );
            return false;
        }
        trajectory.push(TrajectoryPoint {
            frame,
            track_id,
            x,
            y,
        });
        true
    }

    pub fn trajectory(&self, track_id: usize) -> &[TrajectoryPoint] {
        self.trajectories
            .get(track_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn trajectories(&self) -> &[Vec<TrajectoryPoint>] {
        &self.trajectories
    }

    pub fn into_trajectories(self) -> Vec<Vec<TrajectoryPoint>> {
        self.trajectories
    }

    /// Number of track slots known to the recorder.
    pub fn slot_count(&self) -> usize {
        self.trajectories.len()
    }

    /// All points ordered by frame, then by track id.
    pub fn points_by_frame(&self) -> Vec<TrajectoryPoint> {
        sorted_points(&self.trajectories)
    }

    /// Write the `frame,ID,x,y` result stream.
    pub fn write_csv<W: Write>(&self, writer: W) -> io::Result<()> {
        write_csv(&self.trajectories, writer)
    }
}

pub(crate) fn sorted_points(trajectories: &[Vec<TrajectoryPoint>]) -> Vec<TrajectoryPoint> {
    let mut points: Vec<TrajectoryPoint> = trajectories.iter().flatten().copied().collect();
    points.sort_by_key(|p| (p.frame, p.track_id));
    points
}

pub(crate) fn write_csv<W: Write>(
    trajectories: &[Vec<TrajectoryPoint>],
    writer: W,
) -> io::Result<()> {
    // The header is written by hand so that an empty run still produces it.
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(["frame", "ID", "x", "y"])?;
    for point in sorted_points(trajectories) {
        wtr.serialize(point)?;
    }
    wtr.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_frame_refused() {
        let mut recorder = TrajectoryRecorder::new();
        assert!(recorder.record(0, 3, 1.0, 2.0));
        assert!(!recorder.record(0, 3, 5.0, 5.0));
        assert!(!recorder.record(0, 2, 5.0, 5.0));
        assert_eq!(recorder.trajectory(0).len(), 1);
    }

    #[test]
    fn test_unmatched_slots_have_empty_trajectories() {
        let mut recorder = TrajectoryRecorder::new();
        recorder.ensure_slots(2);
        recorder.record(2, 0, 1.0, 1.0);
        assert_eq!(recorder.slot_count(), 3);
        assert!(recorder.trajectory(0).is_empty());
        assert!(recorder.trajectory(1).is_empty());
        assert!(recorder.trajectory(9).is_empty());
    }

    #[test]
    fn test_csv_ordered_by_frame_then_id() {
        let mut recorder = TrajectoryRecorder::new();
        recorder.record(1, 0, 10.0, 20.0);
        recorder.record(1, 1, 11.5, 20.0);
        recorder.record(0, 1, 3.0, 4.25);
        let mut out = Vec::new();
        recorder.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "frame,ID,x,y\n0,1,10.0,20.0\n1,0,3.0,4.25\n1,1,11.5,20.0\n"
        );
    }

    #[test]
    fn test_csv_header_without_points() {
        let recorder = TrajectoryRecorder::new();
        let mut out = Vec::new();
        recorder.write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "frame,ID,x,y\n");
    }
}
