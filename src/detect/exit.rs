// Corner-exit detection: brake released, steering settled, throttle
// climbing through an up-held gear; a throttle lift ends the segment.

use log::debug;

use super::{Segment, SegmentKind};
use crate::dynamics::smoothing::rolling_std_centered;
use crate::series::LapSeries;

/// Brake must be below this for the car to count as off the brakes
pub(crate) const EXIT_MAX_BRAKE: f64 = 5.0;
/// Rolling steering std below which steering counts as settled
pub(crate) const EXIT_MAX_STEER_STD: f64 = 5.0;
/// Window (samples) for the rolling steering std
pub(crate) const STEER_STD_WINDOW: usize = 5;
/// Per-sample throttle increase required to open a segment
pub(crate) const EXIT_MIN_THROTTLE_DELTA: f64 = 0.5;
/// Throttle must be above this to open a segment
pub(crate) const EXIT_MIN_THROTTLE: f64 = 5.0;
/// Mean per-sample throttle change below which the exit is over
pub(crate) const EXIT_END_THROTTLE_DELTA: f64 = -0.5;
/// Throttle below this confirms the closing lift
pub(crate) const EXIT_END_MAX_THROTTLE: f64 = 10.0;
/// Trailing samples averaged for the closing condition
pub(crate) const EXIT_END_WINDOW: usize = 4;

pub fn detect_corner_exits(series: &LapSeries) -> Vec<Segment> {
    let samples = &series.samples;
    let n = samples.len();
    if n < 2 {
        return Vec::new();
    }

    let mut throttle_diff = vec![0.0; n];
    let mut gear_diff = vec![0.0; n];
    for i in 1..n {
        throttle_diff[i] = samples[i].throttle - samples[i - 1].throttle;
        gear_diff[i] = (samples[i].gear - samples[i - 1].gear) as f64;
    }
    let steer: Vec<f64> = samples.iter().map(|s| s.steerangle).collect();
    let steer_std = rolling_std_centered(&steer, STEER_STD_WINDOW);

    let mut segments = Vec::new();
    let mut in_exit = false;
    let mut start_idx = 0usize;

    for i in 1..n {
        if !in_exit {
            if samples[i].brake < EXIT_MAX_BRAKE
                && steer_std[i] < EXIT_MAX_STEER_STD
                && throttle_diff[i] > EXIT_MIN_THROTTLE_DELTA
                && samples[i].throttle > EXIT_MIN_THROTTLE
                && gear_diff[i] >= 0.0
            {
                in_exit = true;
                start_idx = i;
            }
        } else {
            let window_start = i.saturating_sub(EXIT_END_WINDOW - 1);
            let window = &throttle_diff[window_start..=i];
            let window_mean = window.iter().sum::<f64>() / window.len() as f64;
            if window_mean < EXIT_END_THROTTLE_DELTA && samples[i].throttle < EXIT_END_MAX_THROTTLE {
                segments.push(Segment::from_range(
                    SegmentKind::CornerExit,
                    series,
                    start_idx,
                    i,
                ));
                in_exit = false;
            }
        }
    }
    if in_exit {
        segments.push(Segment::from_range(
            SegmentKind::CornerExit,
            series,
            start_idx,
            n - 1,
        ));
    }

    debug!("detected {} corner-exit segments", segments.len());
    segments
}
