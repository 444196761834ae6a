// Unit vocabulary for the units-row detector and the canonical-unit
// conversions applied during column coercion.

/// Tokens accepted as unit strings when deciding whether a row below the
/// header is a units row.
const UNIT_TOKENS: &[&str] = &[
    "s",
    "sec",
    "second",
    "seconds",
    "ms",
    "millisecond",
    "milliseconds",
    "km/h",
    "kph",
    "kmh",
    "m/s",
    "mps",
    "mph",
    "mi/h",
    "deg",
    "deg/s",
    "%",
    "no",
    "1/min",
    "c",
    "°c",
    "mm",
    "bar",
    "psi",
    "g",
    "m",
    "n",
    "kn",
    "pa",
    "-",
];

/// Multiplier applied to reach km/h for speed channels logged in m/s.
pub(crate) const MPS_TO_KMH: f64 = 3.6;
/// Multiplier applied to reach km/h for speed channels logged in mph.
pub(crate) const MPH_TO_KMH: f64 = 1.609;

/// True when a token reads as a unit string. Blank tokens count: unit rows
/// routinely leave unitless columns empty.
pub(crate) fn is_unit_token(token: &str) -> bool {
    let token = token.trim().to_lowercase();
    if token.is_empty() || UNIT_TOKENS.contains(&token.as_str()) {
        return true;
    }
    // rate spellings like "mm/s" built from a known base unit
    token
        .strip_suffix("/s")
        .is_some_and(|base| UNIT_TOKENS.contains(&base))
}

/// Collapse spelling variants onto a canonical unit name. Unknown units pass
/// through lowercased; blank tokens normalize to `None`.
pub(crate) fn normalize_unit(raw: &str) -> Option<String> {
    let unit = raw.trim().to_lowercase();
    if unit.is_empty() {
        return None;
    }
    let canonical = match unit.as_str() {
        "km/h" | "kph" | "kmh" => "km/h",
        "m/s" | "mps" => "m/s",
        "mph" | "mi/h" => "mph",
        "s" | "sec" | "second" | "seconds" => "s",
        "ms" | "millisecond" | "milliseconds" => "ms",
        other => other,
    };
    Some(canonical.to_string())
}

/// Conversion factor from a recorded unit to the canonical km/h speed unit,
/// when one applies.
pub(crate) fn speed_conversion_factor(unit: &str) -> Option<f64> {
    match unit {
        "m/s" => Some(MPS_TO_KMH),
        "mph" => Some(MPH_TO_KMH),
        _ => None,
    }
}

/// True for units that identify a time axis.
pub(crate) fn is_time_unit(unit: &str) -> bool {
    matches!(unit, "s" | "ms")
}
