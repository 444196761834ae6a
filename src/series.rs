// Canonical sample table produced by the normalizer and consumed by the
// detectors and the dynamics calculator.

use serde::{Deserialize, Serialize};

/// One value per car corner, in the usual LF/RF/LR/RR order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelValues {
    pub lf: f64,
    pub rf: f64,
    pub lr: f64,
    pub rr: f64,
}

impl WheelValues {
    pub fn front_avg(&self) -> f64 {
        (self.lf + self.rf) / 2.0
    }

    pub fn rear_avg(&self) -> f64 {
        (self.lr + self.rr) / 2.0
    }
}

/// One time-indexed telemetry row in canonical units: seconds, meters,
/// km/h for all speed channels, 0-100 pedals, degrees for steering.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub distance: f64,
    pub speed: f64,
    pub throttle: f64,
    pub brake: f64,
    pub steerangle: f64,
    pub gear: i32,
    /// ABS intervention indicator, 0/1 or a 0..1 duty value depending on
    /// the logger
    pub abs: f64,
    pub g_lon: f64,
    pub g_lat: f64,
    pub wheel_speed: WheelValues,
    pub sus_travel: WheelValues,
    pub brake_temp: WheelValues,
    pub tyre_press: WheelValues,
    pub tyre_tair: WheelValues,
    pub bumpstop_up: WheelValues,
    pub bumpstop_dn: WheelValues,
    pub bumpstop_force: WheelValues,
}

/// Which optional channels the export actually carried. Absent channels are
/// defaulted to 0.0 in every [`Sample`], so downstream code never probes for
/// presence; this record exists for logging and for callers that want to
/// qualify derived metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelPresence {
    pub throttle: bool,
    pub steerangle: bool,
    pub gear: bool,
    pub abs: bool,
    pub g_lon: bool,
    pub g_lat: bool,
    /// true when the distance channel was integrated from speed rather than
    /// read from the export
    pub distance_derived: bool,
    pub wheel_speed: bool,
    pub sus_travel: bool,
    pub brake_temp: bool,
    pub tyre_press: bool,
    pub tyre_tair: bool,
    pub bumpstop: bool,
}

/// One lap's worth of samples, sorted by time. Immutable once built; every
/// analysis invocation owns its own series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LapSeries {
    pub samples: Vec<Sample>,
    pub presence: ChannelPresence,
    /// Rows touched by the auto-blip throttle correction pass
    pub corrected_throttle_rows: usize,
}

impl LapSeries {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
