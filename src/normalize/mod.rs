// Schema & unit normalizer: turns the raw text lines of a telemetry export
// into a canonical LapSeries.

pub(crate) mod artifact;
pub(crate) mod schema;
pub(crate) mod units;

use std::cmp::Ordering;
use std::collections::HashMap;

use log::{debug, info};

use crate::errors::ApexlineError;
use crate::series::{ChannelPresence, LapSeries, Sample, WheelValues};

const WHEEL_SUFFIXES: [&str; 4] = ["lf", "rf", "lr", "rr"];

/// Normalize a raw telemetry export into a [`LapSeries`].
///
/// Detects delimiter, header and units rows, deduplicates column names,
/// coerces every cell to a float in canonical units (seconds, km/h), drops
/// rows with missing values, derives a distance channel when the export has
/// none, and applies the auto-blip throttle correction.
pub fn normalize_lines(lines: &[String]) -> Result<LapSeries, ApexlineError> {
    let delimiter = schema::guess_delimiter(lines);
    let table = schema::parse_table(lines, delimiter)?;
    let time_idx = resolve_time_column(&table)?;

    // column-major numeric coercion
    let col_count = table.columns.len();
    let mut parsed: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(table.rows.len()); col_count];
    for row in &table.rows {
        for (j, cell) in row.iter().enumerate() {
            parsed[j].push(coerce_numeric(cell));
        }
    }

    // unit conversions: ms -> s on the time axis, m/s / mph -> km/h elsewhere
    for (j, column) in parsed.iter_mut().enumerate() {
        let name = &table.columns[j];
        if j == time_idx {
            if table.units.get(name).is_some_and(|unit| unit == "ms") {
                for value in column.iter_mut().flatten() {
                    *value /= 1000.0;
                }
            }
            continue;
        }
        let factor = table
            .units
            .get(name)
            .and_then(|unit| units::speed_conversion_factor(unit));
        if let Some(factor) = factor {
            for value in column.iter_mut().flatten() {
                *value *= factor;
            }
        }
    }

    // conservative row policy: a row must carry a parsable time and no
    // remaining missing value in any column
    let mut kept_rows: Vec<usize> = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        if parsed[time_idx][row].is_none() {
            continue;
        }
        if (0..col_count).any(|j| parsed[j][row].is_none()) {
            continue;
        }
        kept_rows.push(row);
    }
    if kept_rows.is_empty() {
        return Err(ApexlineError::NoParsableRows);
    }
    debug!(
        "kept {}/{} data rows after numeric coercion",
        kept_rows.len(),
        table.rows.len()
    );

    // assemble the per-channel vectors, renaming the resolved time column and
    // discarding duplicate time channels picked up by the dedup pass
    let mut channels: HashMap<String, Vec<f64>> = HashMap::new();
    for (j, name) in table.columns.iter().enumerate() {
        let key = if j == time_idx {
            "time".to_string()
        } else if name.starts_with("time_") {
            continue;
        } else {
            name.clone()
        };
        let values = kept_rows
            .iter()
            .map(|&row| parsed[j][row].unwrap_or_default())
            .collect();
        channels.insert(key, values);
    }

    for required in ["speed", "brake"] {
        if !channels.contains_key(required) {
            return Err(ApexlineError::MissingRequiredColumn {
                column: required.to_string(),
            });
        }
    }

    let presence = ChannelPresence {
        throttle: channels.contains_key("throttle"),
        steerangle: channels.contains_key("steerangle"),
        gear: channels.contains_key("gear"),
        abs: channels.contains_key("abs"),
        g_lon: channels.contains_key("g_lon"),
        g_lat: channels.contains_key("g_lat"),
        distance_derived: !channels.contains_key("distance"),
        wheel_speed: group_present(&channels, "wheel_speed"),
        sus_travel: group_present(&channels, "sus_travel"),
        brake_temp: group_present(&channels, "brake_temp"),
        tyre_press: group_present(&channels, "tyre_press"),
        tyre_tair: group_present(&channels, "tyre_tair"),
        bumpstop: group_present(&channels, "bumpstopup_ride")
            && group_present(&channels, "bumpstopdn_ride")
            && group_present(&channels, "bumpstop_force"),
    };

    let scalar = |name: &str, row: usize| -> f64 {
        channels.get(name).map_or(0.0, |values| values[row])
    };
    let mut samples: Vec<Sample> = (0..kept_rows.len())
        .map(|row| Sample {
            time: scalar("time", row),
            distance: scalar("distance", row),
            speed: scalar("speed", row),
            throttle: scalar("throttle", row),
            brake: scalar("brake", row),
            steerangle: scalar("steerangle", row),
            gear: scalar("gear", row).round() as i32,
            abs: scalar("abs", row),
            g_lon: scalar("g_lon", row),
            g_lat: scalar("g_lat", row),
            wheel_speed: wheel_group(&channels, "wheel_speed", row),
            sus_travel: wheel_group(&channels, "sus_travel", row),
            brake_temp: wheel_group(&channels, "brake_temp", row),
            tyre_press: wheel_group(&channels, "tyre_press", row),
            tyre_tair: wheel_group(&channels, "tyre_tair", row),
            bumpstop_up: wheel_group(&channels, "bumpstopup_ride", row),
            bumpstop_dn: wheel_group(&channels, "bumpstopdn_ride", row),
            bumpstop_force: wheel_group(&channels, "bumpstop_force", row),
        })
        .collect();

    samples.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(Ordering::Equal));

    if presence.distance_derived {
        derive_distance(&mut samples);
    }

    let corrected_throttle_rows = artifact::correct_autoblip_throttle(&mut samples);
    if corrected_throttle_rows > 0 {
        info!("auto-blip correction zeroed throttle on {corrected_throttle_rows} rows");
    }

    Ok(LapSeries {
        samples,
        presence,
        corrected_throttle_rows,
    })
}

/// Locate the time column: exact `time`, then any `time*`-prefixed name
/// (which also covers `timestamp`), then any column whose recorded unit is
/// seconds or milliseconds.
fn resolve_time_column(table: &schema::RawTable) -> Result<usize, ApexlineError> {
    let columns = &table.columns;
    if let Some(idx) = columns.iter().position(|name| name == "time") {
        return Ok(idx);
    }
    if let Some(idx) = columns.iter().position(|name| name.starts_with("time")) {
        return Ok(idx);
    }
    columns
        .iter()
        .position(|name| {
            table
                .units
                .get(name)
                .is_some_and(|unit| units::is_time_unit(unit))
        })
        .ok_or(ApexlineError::TimeColumnNotFound)
}

/// Strip non-numeric characters and parse what is left.
fn coerce_numeric(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn group_present(channels: &HashMap<String, Vec<f64>>, prefix: &str) -> bool {
    WHEEL_SUFFIXES
        .iter()
        .all(|suffix| channels.contains_key(&format!("{prefix}_{suffix}")))
}

fn wheel_group(channels: &HashMap<String, Vec<f64>>, prefix: &str, row: usize) -> WheelValues {
    let value = |suffix: &str| {
        channels
            .get(&format!("{prefix}_{suffix}"))
            .map_or(0.0, |values| values[row])
    };
    WheelValues {
        lf: value("lf"),
        rf: value("rf"),
        lr: value("lr"),
        rr: value("rr"),
    }
}

/// Trapezoidal integration of speed over time, km/h converted to m/s per
/// step, starting at 0.
fn derive_distance(samples: &mut [Sample]) {
    if let Some(first) = samples.first_mut() {
        first.distance = 0.0;
    }
    for i in 1..samples.len() {
        let dt = samples[i].time - samples[i - 1].time;
        let speed_avg_ms = (samples[i - 1].speed + samples[i].speed) / 2.0 / units::MPS_TO_KMH;
        samples[i].distance = samples[i - 1].distance + speed_avg_ms * dt;
    }
}
