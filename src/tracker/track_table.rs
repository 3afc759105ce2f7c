//! Fixed-capacity store of track slots.
//!
//! Slots are handed out in increasing order and never reused, so a slot
//! index identifies one track for the whole run.

use log::debug;

use crate::tracker::detection::Detection;
use crate::tracker::error::TrackerError;
use crate::tracker::kalman_filter::SharedKalmanFilter;
use crate::tracker::track::Track;

#[derive(Debug, Clone)]
pub struct TrackTable {
    tracks: Vec<Track>,
    capacity: usize,
}

impl TrackTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            tracks: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots ever instantiated.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tracks.len() >= self.capacity
    }

    /// Create a track in the next free slot.
    pub fn spawn(
        &mut self,
        detection: Detection,
        kalman_filter: &SharedKalmanFilter,
        frame: usize,
    ) -> Result<usize, TrackerError> {
        if self.is_full() {
            return Err(TrackerError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let slot = self.tracks.len();
        self.tracks.push(Track::new(slot, detection, kalman_filter, frame));
        debug!(
            "Track {} spawned at ({}, {}) in frame {}",
            slot, detection.x, detection.y, frame
        );
        Ok(slot)
    }

    /// Ordered list of active slot indices.
    pub fn active_slots(&self) -> Vec<usize> {
        self.tracks
            .iter()
            .filter(|t| t.is_active())
            .map(|t| t.slot)
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_active()).count()
    }

    pub fn get(&self, slot: usize) -> Option<&Track> {
        self.tracks.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Track> {
        self.tracks.get_mut(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Advance every active track by one step of the motion model.
    pub fn predict_all(&mut self, kalman_filter: &SharedKalmanFilter) {
        for track in self.tracks.iter_mut().filter(|t| t.is_active()) {
            track.predict(kalman_filter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_until_full() {
        let kf = SharedKalmanFilter::default();
        let mut table = TrackTable::new(2);
        assert_eq!(table.spawn(Detection::new(1.0, 1.0), &kf, 0), Ok(0));
        assert_eq!(table.spawn(Detection::new(2.0, 2.0), &kf, 0), Ok(1));
        assert_eq!(
            table.spawn(Detection::new(3.0, 3.0), &kf, 0),
            Err(TrackerError::CapacityExceeded { capacity: 2 })
        );
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_active_slots_skip_retired() {
        let kf = SharedKalmanFilter::default();
        let mut table = TrackTable::new(4);
        for i in 0..3 {
            table.spawn(Detection::new(10.0 * (i + 1) as f64, 5.0), &kf, 0).unwrap();
        }
        table.get_mut(1).unwrap().mark_retired();
        assert_eq!(table.active_slots(), vec![0, 2]);
        assert_eq!(table.active_count(), 2);
    }

    #[test]
    fn test_retired_slots_are_not_reused() {
        let kf = SharedKalmanFilter::default();
        let mut table = TrackTable::new(2);
        table.spawn(Detection::new(1.0, 1.0), &kf, 0).unwrap();
        table.get_mut(0).unwrap().mark_retired();
        assert_eq!(table.spawn(Detection::new(2.0, 2.0), &kf, 1), Ok(1));
        assert!(table.spawn(Detection::new(3.0, 3.0), &kf, 1).is_err());
    }
}
