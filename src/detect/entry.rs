// Corner-entry detection: simultaneous partial braking and steering input.

use log::debug;

use super::{Segment, SegmentKind};
use crate::series::LapSeries;

/// Brake must be above this to count as applied
pub(crate) const ENTRY_MIN_BRAKE: f64 = 0.05;
/// Full-scale brake readings are ignored as entry candidates
pub(crate) const ENTRY_MAX_BRAKE: f64 = 100.0;
/// Steering angle (deg) above which the car counts as turning in
pub(crate) const ENTRY_MIN_STEER_DEG: f64 = 5.0;

/// Two-state machine: inside while brake sits in the partial range and the
/// wheel is turned; released brake ends the segment. A segment still open
/// at the end of the series closes at the last sample.
pub fn detect_corner_entries(series: &LapSeries) -> Vec<Segment> {
    let samples = &series.samples;
    let mut segments = Vec::new();
    let mut in_entry = false;
    let mut start_idx = 0usize;

    for (i, sample) in samples.iter().enumerate() {
        let brake = sample.brake;
        let steer = sample.steerangle.abs();
        if !in_entry {
            if brake > ENTRY_MIN_BRAKE && brake < ENTRY_MAX_BRAKE && steer > ENTRY_MIN_STEER_DEG {
                in_entry = true;
                start_idx = i;
            }
        } else if brake <= ENTRY_MIN_BRAKE {
            segments.push(Segment::from_range(
                SegmentKind::CornerEntry,
                series,
                start_idx,
                i - 1,
            ));
            in_entry = false;
        }
    }
    if in_entry {
        segments.push(Segment::from_range(
            SegmentKind::CornerEntry,
            series,
            start_idx,
            samples.len() - 1,
        ));
    }

    debug!("detected {} corner-entry segments", segments.len());
    segments
}
