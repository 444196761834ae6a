use serde::{Deserialize, Serialize};

/// Detection and metric thresholds for one analysis invocation.
///
/// All values are read-only once the pipeline starts; construct a modified
/// copy to override a threshold for a single call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Brake percentage at or above which a braking zone opens
    pub brake_on: f64,
    /// Brake percentage below which an open braking zone closes. Kept below
    /// `brake_on` so the hysteresis band suppresses chatter at the boundary.
    pub brake_off: f64,
    /// Braking zones shorter than this many seconds are discarded
    pub min_brake_duration: f64,
    /// Steering angle (deg) above which steering counts as active for the
    /// trail-braking ratio
    pub steer_on: f64,
    /// Slip ratio at or above which a wheel counts as locking
    pub slip_lockup: f64,
    /// Smoothed ABS channel value at or above which ABS counts as intervening
    pub abs_on_value: f64,
    /// Centered moving-average window (samples) applied before peak and
    /// threshold extraction
    pub smooth_window: usize,
    /// Seconds from segment start over which the initial brake slope is fit
    pub init_slope_window: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            brake_on: 3.0,
            brake_off: 1.0,
            min_brake_duration: 0.1,
            steer_on: 2.0,
            slip_lockup: 0.20,
            abs_on_value: 0.5,
            smooth_window: 5,
            init_slope_window: 0.3,
        }
    }
}
