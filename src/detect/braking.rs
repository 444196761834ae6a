// Braking-zone detection over the raw brake channel.

use log::debug;

use super::{Segment, SegmentKind};
use crate::config::AnalysisConfig;
use crate::series::LapSeries;

/// Slack on the minimum-duration cut; sample times accumulate float error,
/// so a pulse nominally at the minimum can land one ULP short.
pub(crate) const DURATION_TOLERANCE: f64 = 1e-9;

/// Hysteresis state machine: a zone opens when brake reaches
/// `config.brake_on` and stays open until brake falls below
/// `config.brake_off`. Zones shorter than `config.min_brake_duration` are
/// discarded; a zone still open at the end of the series closes at the last
/// sample.
pub fn detect_braking_zones(series: &LapSeries, config: &AnalysisConfig) -> Vec<Segment> {
    let samples = &series.samples;
    let n = samples.len();
    let mut segments = Vec::new();

    let mut i = 0usize;
    while i < n {
        if samples[i].brake < config.brake_on {
            i += 1;
            continue;
        }
        let start = i;
        let mut j = i + 1;
        while j < n && samples[j].brake >= config.brake_off {
            j += 1;
        }
        let end = j - 1;
        if samples[end].time - samples[start].time >= config.min_brake_duration - DURATION_TOLERANCE {
            segments.push(Segment::from_range(SegmentKind::Braking, series, start, end));
        }
        i = j;
    }

    debug!("detected {} braking zones", segments.len());
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Sample;

    fn series_from_brake(brake: &[f64], hz: f64) -> LapSeries {
        LapSeries {
            samples: brake
                .iter()
                .enumerate()
                .map(|(i, &b)| Sample {
                    time: i as f64 / hz,
                    brake: b,
                    speed: 100.0 - 5.0 * i as f64,
                    ..Sample::default()
                })
                .collect(),
            ..LapSeries::default()
        }
    }

    #[test]
    fn test_single_zone_with_hysteresis_tail() {
        // 10 samples at 10Hz; the zone opens at the first brake >= 3.0 and
        // runs until brake drops below 1.0
        let series = series_from_brake(&[0.0, 0.0, 5.0, 20.0, 50.0, 80.0, 50.0, 20.0, 2.0, 0.0], 10.0);
        let zones = detect_braking_zones(&series, &AnalysisConfig::default());
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].start_idx, 2);
        assert_eq!(zones[0].end_idx, 8);
        assert_eq!(zones[0].kind, SegmentKind::Braking);
        assert!((zones[0].duration() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_dip_inside_hysteresis_band_does_not_split() {
        // brake dips to 2.0, between off (1.0) and on (3.0): still one zone
        let series = series_from_brake(&[0.0, 10.0, 2.0, 10.0, 0.0], 10.0);
        let zones = detect_braking_zones(&series, &AnalysisConfig::default());
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].start_idx, 1);
        assert_eq!(zones[0].end_idx, 3);
    }

    #[test]
    fn test_short_zone_discarded() {
        let series = series_from_brake(&[0.0, 50.0, 0.0, 0.0], 100.0);
        let zones = detect_braking_zones(&series, &AnalysisConfig::default());
        assert!(zones.is_empty());
    }

    #[test]
    fn test_open_zone_closes_at_last_sample() {
        let series = series_from_brake(&[0.0, 20.0, 50.0, 80.0], 10.0);
        let zones = detect_braking_zones(&series, &AnalysisConfig::default());
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].end_idx, 3);
    }

    #[test]
    fn test_no_braking_activity_yields_empty_list() {
        let series = series_from_brake(&[0.0, 1.0, 2.0, 2.5, 0.0], 10.0);
        let zones = detect_braking_zones(&series, &AnalysisConfig::default());
        assert!(zones.is_empty());
    }

    #[test]
    fn test_two_separate_zones_time_ordered() {
        let series = series_from_brake(
            &[0.0, 40.0, 40.0, 40.0, 0.0, 0.0, 60.0, 60.0, 60.0, 0.0],
            10.0,
        );
        let zones = detect_braking_zones(&series, &AnalysisConfig::default());
        assert_eq!(zones.len(), 2);
        assert!(zones[0].end_time < zones[1].start_time);
        assert_eq!(zones[0].start_idx, 1);
        assert_eq!(zones[1].start_idx, 6);
    }

    #[test]
    fn test_pulse_at_nominal_minimum_duration_kept() {
        // two samples at 10Hz span nominally exactly 0.1s, but the times
        // 0.5 and 0.6 differ by one ULP less; the zone must still survive
        // the minimum-duration cut
        let series = series_from_brake(&[0.0, 0.0, 0.0, 0.0, 0.0, 40.0, 40.0, 0.0], 10.0);
        let zones = detect_braking_zones(&series, &AnalysisConfig::default());
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].start_idx, 5);
        assert_eq!(zones[0].end_idx, 6);
    }
}
