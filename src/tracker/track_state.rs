/// Lifecycle status of a track slot.
///
/// A slot starts `Active` and moves to `Retired` at most once; there is no
/// way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackStatus {
    /// Predicted, associated and corrected every frame
    #[default]
    Active,
    /// Missed too many consecutive frames; state is no longer defined
    Retired,
}

impl TrackStatus {
    pub fn is_active(self) -> bool {
        self == TrackStatus::Active
    }
}
