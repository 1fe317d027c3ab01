//! DST transition policies for slot anchors.

use serde::{Deserialize, Serialize};

/// Policy for anchor times that fall inside a spring-forward gap.
///
/// Ambiguous local times (the repeated hour after a fall-back transition)
/// always resolve to the earlier instant; this policy only covers local times
/// that do not exist at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Skip anchors that fall in the DST gap (e.g., 2:30 AM during spring forward)
    Skip,
    /// Shift to the first valid instant after the gap (2:30 AM becomes 3:00 AM)
    ShiftForward,
    /// Keep the wall-clock distance using the pre-transition offset (2:30 AM becomes 3:30 AM)
    #[default]
    WallClock,
}
