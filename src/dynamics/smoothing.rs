// Small numeric kernels shared by the detectors and the dynamics
// calculator: centered rolling statistics, trapezoidal integration, and a
// least-squares slope fit.

/// Centered moving average, edge-safe: windows that stick out past either
/// end shrink to the available samples instead of going missing.
pub(crate) fn smooth_centered(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    if window <= 1 || n == 0 {
        return values.to_vec();
    }
    let left = (window - 1) / 2;
    let right = window / 2;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(left);
            let hi = (i + right).min(n - 1);
            let slice = &values[lo..=hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Centered rolling sample standard deviation. Windows truncated by either
/// end yield 0.0, so edge samples never read as unstable.
pub(crate) fn rolling_std_centered(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    if window <= 1 || n == 0 {
        return vec![0.0; n];
    }
    let left = (window - 1) / 2;
    let right = window / 2;
    (0..n)
        .map(|i| {
            if i < left || i + right > n - 1 {
                return 0.0;
            }
            let slice = &values[i - left..=i + right];
            let mean = slice.iter().sum::<f64>() / slice.len() as f64;
            let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (slice.len() - 1) as f64;
            var.sqrt()
        })
        .collect()
}

/// Trapezoidal integral of `y` over `x`.
pub(crate) fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    y.windows(2)
        .zip(x.windows(2))
        .map(|(yw, xw)| (yw[0] + yw[1]) / 2.0 * (xw[1] - xw[0]))
        .sum()
}

/// Least-squares linear slope of `y` against `x`. None with fewer than two
/// points or a degenerate x spread.
pub(crate) fn least_squares_slope(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() < 2 || x.len() != y.len() {
        return None;
    }
    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        cov += (xi - x_mean) * (yi - y_mean);
        var += (xi - x_mean).powi(2);
    }
    if var < 1e-12 {
        return None;
    }
    Some(cov / var)
}

/// Arithmetic mean, None for an empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Fraction of values for which the predicate holds, 0.0 for empty input.
pub(crate) fn ratio<F: Fn(f64) -> bool>(values: &[f64], predicate: F) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|&&v| predicate(v)).count() as f64 / values.len() as f64
}

/// Index of the first maximum, None for empty or all-NaN input.
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, bv)) if v <= bv => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Index of the first minimum, None for empty or all-NaN input.
pub(crate) fn argmin(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, bv)) if v >= bv => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
