// Per-segment dynamics calculator: enriches detected segments with
// kinematic, braking-intensity, slip, suspension, tire, brake-temperature
// and timing-alignment metrics.

pub(crate) mod smoothing;

use itertools::izip;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::detect::{Segment, SegmentKind};
use crate::series::{LapSeries, Sample, WheelValues};

use smoothing::{
    argmax, argmin, least_squares_slope, mean, ratio, smooth_centered, trapezoid,
};

/// Floor applied to vehicle speed in slip denominators
const SLIP_SPEED_EPS: f64 = 0.1;
/// Durations at or below this count as undefined for rate metrics
const MIN_DURATION_EPS: f64 = 1e-6;

/// Metrics computed for one braking zone. Ratios are fractions of
/// in-segment samples in [0, 1]; slip values are clamped to [-1, 1];
/// undefined values (near-zero denominators, failed extremum lookups) are
/// None rather than an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrakingMetrics {
    pub duration: f64,
    pub speed_start: f64,
    pub speed_end: f64,
    pub delta_v: f64,
    pub decel_avg: Option<f64>,

    pub brake_peak: f64,
    pub brake_auc: f64,
    pub brake_slope_initial: Option<f64>,
    pub trail_braking_ratio: f64,
    pub abs_on_ratio: f64,

    pub slip_peak: WheelValues,
    pub slip_lock_ratio_front: f64,
    pub slip_lock_ratio_rear: f64,
    pub slip_lr_diff_front_mean: f64,
    pub slip_lr_diff_rear_mean: f64,
    pub slip_fb_diff_mean: f64,

    pub g_lon_min: f64,
    pub g_lon_mean: f64,
    pub g_lat_peak_abs: f64,

    pub sus_peak: WheelValues,
    pub sus_front_avg: f64,
    pub sus_rear_avg: f64,
    pub sus_lr_diff_front: f64,
    pub sus_lr_diff_rear: f64,
    pub sus_fb_diff: f64,

    pub bump_contact_count_front: usize,
    pub bump_contact_count_rear: usize,
    pub bump_force_peak: WheelValues,

    pub tyre_press_mean: WheelValues,
    pub tyre_tair_mean: WheelValues,

    pub brake_temp_max: WheelValues,
    pub brake_temp_rise_front: f64,
    pub brake_temp_rise_rear: f64,

    pub delta_t_brake_to_g_lon: Option<f64>,
    pub delta_t_brake_to_g_lat: Option<f64>,
}

/// Lightweight metrics for a corner-entry segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryMetrics {
    pub duration: f64,
    /// Mean per-sample speed drop (km/h per sample)
    pub avg_deceleration: Option<f64>,
    /// Mean |Δsteerangle| per sample
    pub steer_variability: Option<f64>,
    pub avg_brake: f64,
}

/// Lightweight metrics for a corner-exit segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExitMetrics {
    pub duration: f64,
    /// Peak of max(|ws_lf - ws_rf|, |ws_lr - ws_rr|) over the segment
    pub max_slip_ratio: Option<f64>,
    /// Mean per-sample throttle change
    pub avg_throttle_gradient: Option<f64>,
    pub steer_variability: Option<f64>,
    /// Mean left-right front wheel-speed difference
    pub wheel_slip_lr: Option<f64>,
    /// Mean front-back wheel-speed difference
    pub wheel_slip_fb: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SegmentMetrics {
    Braking(Box<BrakingMetrics>),
    Entry(EntryMetrics),
    Exit(ExitMetrics),
}

/// Enrich a segment in place with the metrics for its kind. Returns false
/// when the segment had to be skipped (inverted range, empty sub-window,
/// unusable duration); the reason is logged and the caller drops the
/// segment from its output.
pub fn enrich_segment(series: &LapSeries, segment: &mut Segment, config: &AnalysisConfig) -> bool {
    if segment.end_idx < segment.start_idx {
        warn!(
            "skipping segment: end index {} before start index {}",
            segment.end_idx, segment.start_idx
        );
        return false;
    }
    let sub = &series.samples[segment.start_idx..=segment.end_idx];
    if sub.is_empty() {
        warn!("skipping segment: no samples in range");
        return false;
    }
    if segment.kind != SegmentKind::Braking && segment.duration() <= MIN_DURATION_EPS {
        warn!(
            "skipping {:?} segment at t={:.3}: zero duration",
            segment.kind, segment.start_time
        );
        return false;
    }

    let metrics = match segment.kind {
        SegmentKind::Braking => SegmentMetrics::Braking(Box::new(braking_metrics(sub, config))),
        SegmentKind::CornerEntry => SegmentMetrics::Entry(entry_metrics(sub, segment.duration())),
        SegmentKind::CornerExit => SegmentMetrics::Exit(exit_metrics(sub, segment.duration())),
    };
    segment.metrics = Some(metrics);
    true
}

fn channel<F: Fn(&Sample) -> f64>(sub: &[Sample], f: F) -> Vec<f64> {
    sub.iter().map(f).collect()
}

fn braking_metrics(sub: &[Sample], config: &AnalysisConfig) -> BrakingMetrics {
    let window = config.smooth_window;
    let time = channel(sub, |s| s.time);

    // smoothing suppresses sensor jitter before peak/threshold extraction
    let brake_s = smooth_centered(&channel(sub, |s| s.brake), window);
    let speed_s = smooth_centered(&channel(sub, |s| s.speed), window);
    let abs_s = smooth_centered(&channel(sub, |s| s.abs), window);
    let g_lon_s = smooth_centered(&channel(sub, |s| s.g_lon), window);
    let g_lat_s = smooth_centered(&channel(sub, |s| s.g_lat), window);
    let ws_lf_s = smooth_centered(&channel(sub, |s| s.wheel_speed.lf), window);
    let ws_rf_s = smooth_centered(&channel(sub, |s| s.wheel_speed.rf), window);
    let ws_lr_s = smooth_centered(&channel(sub, |s| s.wheel_speed.lr), window);
    let ws_rr_s = smooth_centered(&channel(sub, |s| s.wheel_speed.rr), window);

    // per-wheel slip ratios against the (floored) smoothed vehicle speed
    let slip = |wheel: &[f64]| -> Vec<f64> {
        izip!(&speed_s, wheel)
            .map(|(&vs, &ws)| {
                let vs = vs.max(SLIP_SPEED_EPS);
                ((vs - ws) / vs).clamp(-1.0, 1.0)
            })
            .collect()
    };
    let slip_lf = slip(&ws_lf_s);
    let slip_rf = slip(&ws_rf_s);
    let slip_lr = slip(&ws_lr_s);
    let slip_rr = slip(&ws_rr_s);

    let duration = time[time.len() - 1] - time[0];
    let speed_start = speed_s[0];
    let speed_end = speed_s[speed_s.len() - 1];
    let delta_v = speed_start - speed_end;
    let decel_avg = (duration > MIN_DURATION_EPS).then(|| delta_v / duration);

    let brake_peak = brake_s.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let brake_auc = trapezoid(&brake_s, &time);
    let brake_slope_initial = initial_brake_slope(sub, config.init_slope_window);

    let trail_braking_ratio = izip!(&brake_s, sub)
        .filter(|&(&b, s)| b >= config.brake_off && s.steerangle.abs() >= config.steer_on)
        .count() as f64
        / sub.len() as f64;
    let abs_on_ratio = ratio(&abs_s, |v| v >= config.abs_on_value);

    let peak = |values: &[f64]| values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let slip_peak = WheelValues {
        lf: peak(&slip_lf),
        rf: peak(&slip_rf),
        lr: peak(&slip_lr),
        rr: peak(&slip_rr),
    };
    let lockup = config.slip_lockup;
    let slip_lock_ratio_front = izip!(&slip_lf, &slip_rf)
        .filter(|&(&l, &r)| l >= lockup || r >= lockup)
        .count() as f64
        / sub.len() as f64;
    let slip_lock_ratio_rear = izip!(&slip_lr, &slip_rr)
        .filter(|&(&l, &r)| l >= lockup || r >= lockup)
        .count() as f64
        / sub.len() as f64;
    let abs_diff_mean = |a: &[f64], b: &[f64]| {
        izip!(a, b).map(|(&x, &y)| (x - y).abs()).sum::<f64>() / a.len() as f64
    };
    let slip_lr_diff_front_mean = abs_diff_mean(&slip_lf, &slip_rf);
    let slip_lr_diff_rear_mean = abs_diff_mean(&slip_lr, &slip_rr);
    let slip_fb_diff_mean = izip!(&slip_lf, &slip_rf, &slip_lr, &slip_rr)
        .map(|(&lf, &rf, &lr, &rr)| ((lf + rf) / 2.0 - (lr + rr) / 2.0).abs())
        .sum::<f64>()
        / sub.len() as f64;

    let g_lon_min = g_lon_s.iter().copied().fold(f64::INFINITY, f64::min);
    let g_lon_mean = g_lon_s.iter().sum::<f64>() / g_lon_s.len() as f64;
    let g_lat_peak_abs = g_lat_s.iter().map(|v| v.abs()).fold(f64::NEG_INFINITY, f64::max);

    let sus_peak = WheelValues {
        lf: peak(&channel(sub, |s| s.sus_travel.lf)),
        rf: peak(&channel(sub, |s| s.sus_travel.rf)),
        lr: peak(&channel(sub, |s| s.sus_travel.lr)),
        rr: peak(&channel(sub, |s| s.sus_travel.rr)),
    };
    let sus_front_avg = sus_peak.front_avg();
    let sus_rear_avg = sus_peak.rear_avg();

    let bump_contact_count_front = sub
        .iter()
        .filter(|s| {
            s.bumpstop_up.lf > 0.0
                || s.bumpstop_dn.lf > 0.0
                || s.bumpstop_up.rf > 0.0
                || s.bumpstop_dn.rf > 0.0
        })
        .count();
    let bump_contact_count_rear = sub
        .iter()
        .filter(|s| {
            s.bumpstop_up.lr > 0.0
                || s.bumpstop_dn.lr > 0.0
                || s.bumpstop_up.rr > 0.0
                || s.bumpstop_dn.rr > 0.0
        })
        .count();
    let bump_force_peak = WheelValues {
        lf: peak(&channel(sub, |s| s.bumpstop_force.lf)),
        rf: peak(&channel(sub, |s| s.bumpstop_force.rf)),
        lr: peak(&channel(sub, |s| s.bumpstop_force.lr)),
        rr: peak(&channel(sub, |s| s.bumpstop_force.rr)),
    };

    let wheel_mean = |f: fn(&Sample) -> &WheelValues| WheelValues {
        lf: sub.iter().map(|s| f(s).lf).sum::<f64>() / sub.len() as f64,
        rf: sub.iter().map(|s| f(s).rf).sum::<f64>() / sub.len() as f64,
        lr: sub.iter().map(|s| f(s).lr).sum::<f64>() / sub.len() as f64,
        rr: sub.iter().map(|s| f(s).rr).sum::<f64>() / sub.len() as f64,
    };
    let tyre_press_mean = wheel_mean(|s| &s.tyre_press);
    let tyre_tair_mean = wheel_mean(|s| &s.tyre_tair);

    let brake_temp_max = WheelValues {
        lf: peak(&channel(sub, |s| s.brake_temp.lf)),
        rf: peak(&channel(sub, |s| s.brake_temp.rf)),
        lr: peak(&channel(sub, |s| s.brake_temp.lr)),
        rr: peak(&channel(sub, |s| s.brake_temp.rr)),
    };
    let first = &sub[0];
    let last = &sub[sub.len() - 1];
    let brake_temp_rise_front = last.brake_temp.front_avg() - first.brake_temp.front_avg();
    let brake_temp_rise_rear = last.brake_temp.rear_avg() - first.brake_temp.rear_avg();

    // time-of-peak alignment between the brake input and the G responses
    let t_brake_peak = argmax(&brake_s).map(|i| time[i]);
    let t_g_lon_min = argmin(&g_lon_s).map(|i| time[i]);
    let g_lat_abs: Vec<f64> = g_lat_s.iter().map(|v| v.abs()).collect();
    let t_g_lat_peak = argmax(&g_lat_abs).map(|i| time[i]);
    let delta_t_brake_to_g_lon = match (t_brake_peak, t_g_lon_min) {
        (Some(tb), Some(tg)) => Some(tg - tb),
        _ => None,
    };
    let delta_t_brake_to_g_lat = match (t_brake_peak, t_g_lat_peak) {
        (Some(tb), Some(tg)) => Some(tg - tb),
        _ => None,
    };

    BrakingMetrics {
        duration,
        speed_start,
        speed_end,
        delta_v,
        decel_avg,
        brake_peak,
        brake_auc,
        brake_slope_initial,
        trail_braking_ratio,
        abs_on_ratio,
        slip_peak,
        slip_lock_ratio_front,
        slip_lock_ratio_rear,
        slip_lr_diff_front_mean,
        slip_lr_diff_rear_mean,
        slip_fb_diff_mean,
        g_lon_min,
        g_lon_mean,
        g_lat_peak_abs,
        sus_peak,
        sus_front_avg,
        sus_rear_avg,
        sus_lr_diff_front: (sus_peak.lf - sus_peak.rf).abs(),
        sus_lr_diff_rear: (sus_peak.lr - sus_peak.rr).abs(),
        sus_fb_diff: (sus_front_avg - sus_rear_avg).abs(),
        bump_contact_count_front,
        bump_contact_count_rear,
        bump_force_peak,
        tyre_press_mean,
        tyre_tair_mean,
        brake_temp_max,
        brake_temp_rise_front,
        brake_temp_rise_rear,
        delta_t_brake_to_g_lon,
        delta_t_brake_to_g_lat,
    }
}

/// Least-squares slope of raw brake vs. time over the first
/// `slope_window` seconds of the segment. None with fewer than 2 samples in
/// the window.
fn initial_brake_slope(sub: &[Sample], slope_window: f64) -> Option<f64> {
    let t0 = sub[0].time;
    let (mut x, mut y) = (Vec::new(), Vec::new());
    for sample in sub {
        if sample.time > t0 + slope_window {
            break;
        }
        x.push(sample.time - t0);
        y.push(sample.brake);
    }
    least_squares_slope(&x, &y)
}

fn entry_metrics(sub: &[Sample], duration: f64) -> EntryMetrics {
    let speed_drops: Vec<f64> = sub
        .windows(2)
        .map(|w| -(w[1].speed - w[0].speed))
        .collect();
    let steer_deltas: Vec<f64> = sub
        .windows(2)
        .map(|w| (w[1].steerangle - w[0].steerangle).abs())
        .collect();
    EntryMetrics {
        duration,
        avg_deceleration: mean(&speed_drops),
        steer_variability: mean(&steer_deltas),
        avg_brake: sub.iter().map(|s| s.brake).sum::<f64>() / sub.len() as f64,
    }
}

fn exit_metrics(sub: &[Sample], duration: f64) -> ExitMetrics {
    let axle_slip: Vec<f64> = sub
        .iter()
        .map(|s| {
            let front = (s.wheel_speed.lf - s.wheel_speed.rf).abs();
            let rear = (s.wheel_speed.lr - s.wheel_speed.rr).abs();
            front.max(rear)
        })
        .collect();
    let throttle_deltas: Vec<f64> = sub.windows(2).map(|w| w[1].throttle - w[0].throttle).collect();
    let steer_deltas: Vec<f64> = sub
        .windows(2)
        .map(|w| (w[1].steerangle - w[0].steerangle).abs())
        .collect();
    let lr_diffs: Vec<f64> = sub
        .iter()
        .map(|s| (s.wheel_speed.lf - s.wheel_speed.rf).abs())
        .collect();
    let fb_diffs: Vec<f64> = sub
        .iter()
        .map(|s| (s.wheel_speed.lf - s.wheel_speed.lr).abs())
        .collect();
    ExitMetrics {
        duration,
        max_slip_ratio: axle_slip
            .iter()
            .copied()
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v)))),
        avg_throttle_gradient: mean(&throttle_deltas),
        steer_variability: mean(&steer_deltas),
        wheel_slip_lr: mean(&lr_diffs),
        wheel_slip_fb: mean(&fb_diffs),
    }
}
