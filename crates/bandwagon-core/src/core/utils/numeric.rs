/// Rounds to `decimals` places, ties to even. Negative `decimals` round to
/// tens, hundreds and so on.
pub fn round_half_even(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals.abs());
    if decimals >= 0 {
        (value * factor).round_ties_even() / factor
    } else {
        (value / factor).round_ties_even() * factor
    }
}

/// `n` evenly spaced samples over `[start, stop]`, both ends included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Piecewise-linear interpolation over ascending `xs`, clamping to the end
/// values outside the sampled range.
pub fn interp(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if n == 0 {
        return f64::NAN;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    let upper = xs.partition_point(|&v| v <= x).min(n - 1);
    let lower = upper - 1;
    let t = (x - xs[lower]) / (xs[upper] - xs[lower]);
    ys[lower] + t * (ys[upper] - ys[lower])
}
