// Sensor-artifact correction for logged throttle channels.
//
// Cars with auto-blip register short throttle spikes on downshifts even
// though the driver never touched the pedal. The spikes land both right
// around the shift and, on some loggers, up to a second later; both windows
// are zeroed.

use crate::series::Sample;

/// Samples before the downshift covered by the immediate window
const PRE_SHIFT_SAMPLES: usize = 3;
/// Samples after the downshift covered by the immediate window (~1s at the
/// usual 60 Hz logging rate)
const POST_SHIFT_SAMPLES: usize = 60;
/// Start of the delayed window, relative to the shift sample
const LATE_WINDOW_START: usize = 30;
/// End of the delayed window (inclusive), relative to the shift sample
const LATE_WINDOW_END: usize = 70;

/// Zero out positive throttle readings around every downshift. Returns the
/// number of corrected rows.
pub(crate) fn correct_autoblip_throttle(samples: &mut [Sample]) -> usize {
    let n = samples.len();
    if n <= PRE_SHIFT_SAMPLES + LATE_WINDOW_END {
        return 0;
    }

    let mut fixed = 0usize;
    for i in PRE_SHIFT_SAMPLES..(n - LATE_WINDOW_END) {
        if samples[i].gear >= samples[i - 1].gear {
            continue;
        }

        // immediate window around the shift
        for j in (i - PRE_SHIFT_SAMPLES)..(i + POST_SHIFT_SAMPLES).min(n) {
            if samples[j].throttle > 0.0 {
                samples[j].throttle = 0.0;
                fixed += 1;
            }
        }
        // delayed window for late spikes
        for j in (i + LATE_WINDOW_START)..(i + LATE_WINDOW_END + 1).min(n) {
            if samples[j].throttle > 0.0 {
                samples[j].throttle = 0.0;
                fixed += 1;
            }
        }
    }
    fixed
}
