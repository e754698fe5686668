use std::f64::consts::PI;

pub const T_MEAN: f64 = 50.0;
pub const T_SD: f64 = 10.0;

/// Standard normal density.
pub fn normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Sample the standard normal density on `[from, to]` at `step` intervals.
pub fn normal_curve(from: f64, to: f64, step: f64) -> Vec<(f64, f64)> {
    if step <= 0.0 || to < from {
        return Vec::new();
    }
    let n = ((to - from) / step).round() as usize;
    (0..=n)
        .map(|i| {
            let x = from + i as f64 * step;
            (x, normal_pdf(x))
        })
        .collect()
}

pub fn z_score(x: f64, mean: f64, sd: f64) -> Option<f64> {
    if sd <= 0.0 {
        return None;
    }
    Some((x - mean) / sd)
}

pub fn t_score(z: f64) -> f64 {
    T_MEAN + T_SD * z
}

/// Share of the population within `k` standard deviations of the mean,
/// by the empirical rule.
pub fn empirical_share(k: u8) -> Option<f64> {
    match k {
        1 => Some(0.6827),
        2 => Some(0.9545),
        3 => Some(0.9973),
        _ => None,
    }
}
