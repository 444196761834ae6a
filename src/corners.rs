// Corner geometry mapping: assigns track corner indices to detected
// segments by start distance.

use serde::{Deserialize, Serialize};

use crate::detect::Segment;

/// One corner window of an externally supplied track layout. Windows are
/// expected ordered and non-overlapping by the geometry store; this is not
/// validated here, and with overlapping windows the first match wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CornerWindow {
    pub corner_index: u32,
    pub name: String,
    pub start_distance: f64,
    pub end_distance: f64,
}

impl CornerWindow {
    /// Half-open containment: `[start_distance, end_distance)`.
    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.start_distance && distance < self.end_distance
    }
}

/// Annotate a segment with the first corner window containing its start
/// distance. No match leaves both fields unset; callers default to a
/// sentinel. A linear scan is plenty for the expected tens of corners.
pub fn map_segment_to_corner(segment: &mut Segment, windows: &[CornerWindow]) {
    for window in windows {
        if window.contains(segment.start_dist) {
            segment.corner_index = Some(window.corner_index);
            segment.segment_name = Some(window.name.clone());
            return;
        }
    }
}
