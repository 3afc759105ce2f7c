mod blob_tracker;
mod config;
mod detection;
mod error;
mod kalman_filter;
mod matching;
mod track;
mod track_state;
mod track_table;
mod trajectory;

pub use blob_tracker::{BlobTracker, FramePhase, FrameReport, TrackingRun};
pub use config::{NoiseConfig, TrackerConfig};
pub use detection::{Detection, filter_valid};
pub use error::{FrameAnomaly, TrackerError};
pub use kalman_filter::SharedKalmanFilter;
pub use matching::{Association, AssignmentResult, associate, euclidean_distance, linear_assignment};
pub use track::Track;
pub use track_state::TrackStatus;
pub use track_table::TrackTable;
pub use trajectory::{TrajectoryPoint, TrajectoryRecorder};
