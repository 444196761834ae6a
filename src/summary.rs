// Lap aggregation: folds per-segment braking metrics into lap-level means.

use serde::{Deserialize, Serialize};

use crate::detect::Segment;
use crate::dynamics::{BrakingMetrics, SegmentMetrics};

/// Lap-level averages over all enriched braking segments. Every averaged
/// field is None when no segment contributed a defined value; a lap with no
/// braking activity yields `num_segments = 0` and no averages, which is a
/// valid, non-error output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LapSummary {
    pub num_segments: usize,
    pub avg_decel: Option<f64>,
    pub avg_brake_peak: Option<f64>,
    pub avg_trail_ratio: Option<f64>,
    pub avg_abs_on_ratio: Option<f64>,
    pub avg_slip_lock_front: Option<f64>,
    pub avg_slip_lock_rear: Option<f64>,
    pub avg_slip_lr_diff_front: Option<f64>,
    pub avg_slip_lr_diff_rear: Option<f64>,
    pub avg_slip_fb_diff: Option<f64>,
    pub avg_g_lon_min: Option<f64>,
    pub avg_g_lat_peak_abs: Option<f64>,
    pub avg_sus_lr_diff_front: Option<f64>,
    pub avg_sus_lr_diff_rear: Option<f64>,
    pub avg_sus_fb_diff: Option<f64>,
    pub avg_bump_contact_front: Option<f64>,
    pub avg_bump_contact_rear: Option<f64>,
    pub avg_brake_temp_rise_front: Option<f64>,
    pub avg_brake_temp_rise_rear: Option<f64>,
}

/// Mean over the defined values only; None when nothing is defined.
fn mean_defined<I: IntoIterator<Item = Option<f64>>>(values: I) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values.into_iter().flatten() {
        sum += value;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

pub fn summarize_lap(segments: &[Segment]) -> LapSummary {
    let metrics: Vec<&BrakingMetrics> = segments
        .iter()
        .filter_map(|segment| match &segment.metrics {
            Some(SegmentMetrics::Braking(m)) => Some(m.as_ref()),
            _ => None,
        })
        .collect();

    if metrics.is_empty() {
        return LapSummary::default();
    }

    let avg = |f: fn(&BrakingMetrics) -> Option<f64>| mean_defined(metrics.iter().map(|m| f(m)));

    LapSummary {
        num_segments: metrics.len(),
        avg_decel: avg(|m| m.decel_avg),
        avg_brake_peak: avg(|m| Some(m.brake_peak)),
        avg_trail_ratio: avg(|m| Some(m.trail_braking_ratio)),
        avg_abs_on_ratio: avg(|m| Some(m.abs_on_ratio)),
        avg_slip_lock_front: avg(|m| Some(m.slip_lock_ratio_front)),
        avg_slip_lock_rear: avg(|m| Some(m.slip_lock_ratio_rear)),
        avg_slip_lr_diff_front: avg(|m| Some(m.slip_lr_diff_front_mean)),
        avg_slip_lr_diff_rear: avg(|m| Some(m.slip_lr_diff_rear_mean)),
        avg_slip_fb_diff: avg(|m| Some(m.slip_fb_diff_mean)),
        avg_g_lon_min: avg(|m| Some(m.g_lon_min)),
        avg_g_lat_peak_abs: avg(|m| Some(m.g_lat_peak_abs)),
        avg_sus_lr_diff_front: avg(|m| Some(m.sus_lr_diff_front)),
        avg_sus_lr_diff_rear: avg(|m| Some(m.sus_lr_diff_rear)),
        avg_sus_fb_diff: avg(|m| Some(m.sus_fb_diff)),
        avg_bump_contact_front: avg(|m| Some(m.bump_contact_count_front as f64)),
        avg_bump_contact_rear: avg(|m| Some(m.bump_contact_count_rear as f64)),
        avg_brake_temp_rise_front: avg(|m| Some(m.brake_temp_rise_front)),
        avg_brake_temp_rise_rear: avg(|m| Some(m.brake_temp_rise_rear)),
    }
}
