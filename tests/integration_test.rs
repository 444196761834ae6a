// Integration tests for the full lap-analysis pipeline
//
// These build a synthetic telemetry export the way a logger would write it
// (metadata lines, header row, units row, data rows) and drive it through
// normalization, segment detection, dynamics enrichment, corner mapping and
// lap aggregation.

use apexline::{
    AnalysisConfig, ApexlineError, CornerWindow, SegmentMetrics, analyze_lap,
};

const HZ: f64 = 60.0;

/// A 10 second lap at 60Hz: full throttle to t=3, a clean triangular brake
/// pulse 0 -> 80 -> 0 over t=3..5 with the speed falling 180 -> 100 km/h, a
/// steered phase through t=4..5.5, a downshift (with throttle blip) at t=4,
/// and a corner-exit throttle ramp from t=5.5 ending in a lift at t=8.
fn synthetic_lap_lines() -> Vec<String> {
    let mut lines = vec![
        "Format,Telemetry Export".to_string(),
        "Vehicle,GT3 Test Car".to_string(),
        "Time,Speed,Brake,Throttle,SteerAngle,Gear,ABS,G_Lon,G_Lat,wheel_speed_lf,wheel_speed_rf,wheel_speed_lr,wheel_speed_rr".to_string(),
        "s,km/h,%,%,deg,,,g,g,km/h,km/h,km/h,km/h".to_string(),
    ];

    let n = (10.0 * HZ) as usize + 1;
    for k in 0..n {
        let t = k as f64 / HZ;

        let brake = if (3.0..=4.0).contains(&t) {
            80.0 * (t - 3.0)
        } else if (4.0..=5.0).contains(&t) {
            80.0 * (5.0 - t)
        } else {
            0.0
        };

        let speed = if t < 3.0 {
            180.0
        } else if t <= 5.0 {
            180.0 - 40.0 * (t - 3.0)
        } else {
            100.0 + 4.0 * (t - 5.0)
        };

        let throttle = if t < 3.0 {
            100.0
        } else if (4.0..=4.1).contains(&t) {
            30.0 // auto-blip artifact on the downshift
        } else if (5.5..=8.0).contains(&t) {
            (40.0 * (t - 5.5)).min(100.0)
        } else if (8.0..8.5).contains(&t) {
            (100.0 - 200.0 * (t - 8.0)).max(0.0)
        } else {
            0.0
        };

        let steer = if (4.0..=4.1).contains(&t) {
            100.0 * (t - 4.0)
        } else if (4.1..=5.5).contains(&t) {
            10.0
        } else {
            0.0
        };

        let gear = if t < 4.0 { 4 } else { 3 };
        let abs = if (3.5..=4.5).contains(&t) { 1.0 } else { 0.0 };
        let g_lon = if (3.0..=5.0).contains(&t) { -1.1 } else { 0.1 };
        let g_lat = if (4.0..=5.5).contains(&t) { 1.2 } else { 0.0 };
        let ws = speed * 0.98;

        lines.push(format!(
            "{t:.4},{speed:.4},{brake:.4},{throttle:.4},{steer:.4},{gear},{abs:.1},{g_lon:.2},{g_lat:.2},{ws:.4},{ws:.4},{ws:.4},{ws:.4}"
        ));
    }
    lines
}

fn corner_windows() -> Vec<CornerWindow> {
    vec![
        CornerWindow {
            corner_index: 1,
            name: "T1".to_string(),
            start_distance: 100.0,
            end_distance: 300.0,
        },
        CornerWindow {
            corner_index: 2,
            name: "T2".to_string(),
            start_distance: 300.0,
            end_distance: 500.0,
        },
    ]
}

#[test]
fn test_triangular_pulse_yields_one_braking_segment() {
    let lines = synthetic_lap_lines();
    let analysis = analyze_lap(&lines, None, &AnalysisConfig::default()).unwrap();

    assert_eq!(analysis.braking_segments.len(), 1);
    let segment = &analysis.braking_segments[0];
    // the zone opens where brake crosses 3.0 and runs until it falls
    // below 1.0 on the way down
    assert!(segment.start_time > 3.0 && segment.start_time < 3.1);
    assert!(segment.end_time > 4.9 && segment.end_time < 5.0);

    let metrics = match segment.metrics.as_ref().unwrap() {
        SegmentMetrics::Braking(m) => m,
        other => panic!("expected braking metrics, got {other:?}"),
    };
    // smoothing flattens the triangle tip only slightly at 60Hz
    assert!(metrics.brake_peak > 78.0 && metrics.brake_peak <= 80.0);
    // analytically the speed falls 40 km/h per second through the pulse
    let decel = metrics.decel_avg.unwrap();
    assert!((decel - 40.0).abs() < 1.0, "decel_avg = {decel}");
    assert!(metrics.brake_auc > 0.0);
    assert!(metrics.brake_slope_initial.unwrap() > 0.0);
}

#[test]
fn test_ratios_and_slip_within_invariant_bounds() {
    let lines = synthetic_lap_lines();
    let analysis = analyze_lap(&lines, None, &AnalysisConfig::default()).unwrap();
    let metrics = match analysis.braking_segments[0].metrics.as_ref().unwrap() {
        SegmentMetrics::Braking(m) => m,
        other => panic!("expected braking metrics, got {other:?}"),
    };

    for ratio in [
        metrics.trail_braking_ratio,
        metrics.abs_on_ratio,
        metrics.slip_lock_ratio_front,
        metrics.slip_lock_ratio_rear,
    ] {
        assert!((0.0..=1.0).contains(&ratio));
    }
    // steering is active through roughly the second half of the zone
    assert!(metrics.trail_braking_ratio > 0.3 && metrics.trail_braking_ratio < 0.7);
    assert!(metrics.abs_on_ratio > 0.3 && metrics.abs_on_ratio < 0.7);
    // wheels run 2% under vehicle speed: small positive slip, no lockup
    for slip in [
        metrics.slip_peak.lf,
        metrics.slip_peak.rf,
        metrics.slip_peak.lr,
        metrics.slip_peak.rr,
    ] {
        assert!((-1.0..=1.0).contains(&slip));
        assert!(slip > 0.0 && slip < 0.1);
    }
    assert_eq!(metrics.slip_lock_ratio_front, 0.0);
    // the G trough and lateral peak both resolve, so the deltas are defined
    assert!(metrics.delta_t_brake_to_g_lon.is_some());
    assert!(metrics.delta_t_brake_to_g_lat.is_some());
    assert!(metrics.g_lon_min < -1.0);
    assert!(metrics.g_lat_peak_abs > 1.0);
}

#[test]
fn test_entry_and_exit_segments_detected() {
    let lines = synthetic_lap_lines();
    let analysis = analyze_lap(&lines, None, &AnalysisConfig::default()).unwrap();

    assert_eq!(analysis.entry_segments.len(), 1);
    let entry = &analysis.entry_segments[0];
    // entry opens once the wheel passes 5 deg under partial braking and
    // closes when the brake releases
    assert!(entry.start_time > 4.0 && entry.start_time < 4.2);
    assert!(entry.end_time > 4.9 && entry.end_time < 5.1);
    match entry.metrics.as_ref().unwrap() {
        SegmentMetrics::Entry(m) => {
            assert!(m.avg_deceleration.unwrap() > 0.0);
            assert!(m.avg_brake > 0.0);
        }
        other => panic!("expected entry metrics, got {other:?}"),
    }

    assert_eq!(analysis.exit_segments.len(), 1);
    let exit = &analysis.exit_segments[0];
    assert!(exit.start_time > 5.5 && exit.start_time < 5.8);
    assert!(exit.end_time > 8.0);
    match exit.metrics.as_ref().unwrap() {
        SegmentMetrics::Exit(m) => {
            assert!(m.avg_throttle_gradient.is_some());
            assert!(m.max_slip_ratio.is_some());
        }
        other => panic!("expected exit metrics, got {other:?}"),
    }
}

#[test]
fn test_autoblip_correction_applied() {
    let lines = synthetic_lap_lines();
    let analysis = analyze_lap(&lines, None, &AnalysisConfig::default()).unwrap();
    // the 30% blip at the t=4 downshift must be zeroed and counted
    assert!(analysis.series.corrected_throttle_rows > 0);
    let blip_region = analysis
        .series
        .samples
        .iter()
        .filter(|s| s.time >= 4.0 && s.time <= 4.1);
    for sample in blip_region {
        assert_eq!(sample.throttle, 0.0);
    }
}

#[test]
fn test_corner_mapping_assigns_first_matching_window() {
    let lines = synthetic_lap_lines();
    let windows = corner_windows();
    let analysis = analyze_lap(&lines, Some(&windows), &AnalysisConfig::default()).unwrap();

    let segment = &analysis.braking_segments[0];
    // 3 seconds at 180 km/h put the braking point around 150m
    assert!(segment.start_dist > 100.0 && segment.start_dist < 300.0);
    assert_eq!(segment.corner_index, Some(1));
    assert_eq!(segment.segment_name.as_deref(), Some("T1"));
}

#[test]
fn test_summary_folds_braking_segments() {
    let lines = synthetic_lap_lines();
    let analysis = analyze_lap(&lines, None, &AnalysisConfig::default()).unwrap();

    assert_eq!(analysis.summary.num_segments, 1);
    let metrics = match analysis.braking_segments[0].metrics.as_ref().unwrap() {
        SegmentMetrics::Braking(m) => m,
        other => panic!("expected braking metrics, got {other:?}"),
    };
    // with a single segment the averages equal the segment's own values
    assert_eq!(analysis.summary.avg_brake_peak, Some(metrics.brake_peak));
    assert_eq!(analysis.summary.avg_decel, metrics.decel_avg);
    assert_eq!(
        analysis.summary.avg_trail_ratio,
        Some(metrics.trail_braking_ratio)
    );
}

#[test]
fn test_analysis_is_deterministic() {
    let lines = synthetic_lap_lines();
    let windows = corner_windows();
    let config = AnalysisConfig::default();
    let first = analyze_lap(&lines, Some(&windows), &config).unwrap();
    let second = analyze_lap(&lines, Some(&windows), &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_lap_without_braking_yields_empty_summary() {
    let mut lines = vec![
        "Time,Speed,Brake,Throttle,Gear".to_string(),
    ];
    for k in 0..200 {
        let t = k as f64 / HZ;
        lines.push(format!("{t:.4},200.0,0.0,100.0,6"));
    }
    let analysis = analyze_lap(&lines, None, &AnalysisConfig::default()).unwrap();
    assert!(analysis.braking_segments.is_empty());
    assert_eq!(analysis.summary.num_segments, 0);
    assert!(analysis.summary.avg_decel.is_none());
    assert!(analysis.summary.avg_brake_peak.is_none());
}

#[test]
fn test_analysis_from_export_file_on_disk() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in synthetic_lap_lines() {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();

    let content = std::fs::read_to_string(file.path()).unwrap();
    let lines: Vec<String> = content.lines().map(str::to_owned).collect();
    let analysis = analyze_lap(&lines, None, &AnalysisConfig::default()).unwrap();
    assert_eq!(analysis.braking_segments.len(), 1);

    // the result must survive a JSON round trip unchanged
    let json = serde_json::to_string(&analysis).unwrap();
    let parsed: apexline::LapAnalysis = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.summary, analysis.summary);
    assert_eq!(parsed.braking_segments, analysis.braking_segments);
}

#[test]
fn test_missing_header_is_fatal() {
    let lines = vec![
        "no,header".to_string(),
        "in,sight".to_string(),
    ];
    match analyze_lap(&lines, None, &AnalysisConfig::default()) {
        Err(ApexlineError::HeaderNotFound) => {}
        other => panic!("expected HeaderNotFound, got {other:?}"),
    }
}

#[test]
fn test_normalized_time_and_distance_monotonic() {
    let lines = synthetic_lap_lines();
    let analysis = analyze_lap(&lines, None, &AnalysisConfig::default()).unwrap();
    let samples = &analysis.series.samples;
    assert!(samples.windows(2).all(|w| w[0].time <= w[1].time));
    // derived from strictly positive speed, distance must climb
    assert!(analysis.series.presence.distance_derived);
    assert!(samples.windows(2).all(|w| w[0].distance < w[1].distance));
}

#[test]
fn test_custom_thresholds_respected() {
    let lines = synthetic_lap_lines();
    // raising the on-threshold far above the pulse suppresses detection
    let config = AnalysisConfig {
        brake_on: 90.0,
        ..AnalysisConfig::default()
    };
    let analysis = analyze_lap(&lines, None, &config).unwrap();
    assert!(analysis.braking_segments.is_empty());
    assert_eq!(analysis.summary.num_segments, 0);
}
