// Driving-phase segment detection: three independent single-pass state
// machines over the canonical sample series.

pub(crate) mod braking;
pub(crate) mod entry;
pub(crate) mod exit;

pub use braking::detect_braking_zones;
pub use entry::detect_corner_entries;
pub use exit::detect_corner_exits;

use serde::{Deserialize, Serialize};

use crate::dynamics::SegmentMetrics;
use crate::series::LapSeries;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Braking,
    CornerEntry,
    CornerExit,
}

/// A contiguous index range of a lap's samples representing one instance of
/// a driving phase. Created by a detector, enriched in place by the
/// dynamics calculator, optionally annotated by the corner mapper, and
/// never mutated after that.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub start_idx: usize,
    /// inclusive
    pub end_idx: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub start_dist: f64,
    pub end_dist: f64,
    pub corner_index: Option<u32>,
    pub segment_name: Option<String>,
    pub metrics: Option<SegmentMetrics>,
}

impl Segment {
    pub(crate) fn from_range(
        kind: SegmentKind,
        series: &LapSeries,
        start_idx: usize,
        end_idx: usize,
    ) -> Self {
        let start = &series.samples[start_idx];
        let end = &series.samples[end_idx];
        Self {
            kind,
            start_idx,
            end_idx,
            start_time: start.time,
            end_time: end.time,
            start_dist: start.distance,
            end_dist: end.distance,
            corner_index: None,
            segment_name: None,
            metrics: None,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}
