use crate::core::utils::numeric::{interp, linspace};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const EXPONENTIAL_OFFSET_STEPS: usize = 10;
const BISECTION_ITERATIONS: usize = 100;

#[derive(Debug, Error, PartialEq)]
pub enum CalibrationError {
    #[error("Calibration needs at least 2 control points, found {found}")]
    TooFewPoints { found: usize },
    #[error("Invalid DNA size {size}: sizes must be finite and positive")]
    InvalidSize { size: f64 },
    #[error("Invalid migration distance {migration} for size {size}")]
    InvalidMigration { size: f64, migration: f64 },
    #[error("DNA size {size} appears more than once")]
    DuplicateSize { size: f64 },
    #[error("Migration must strictly decrease with size, but size {size} migrates at least as far as a smaller fragment")]
    NonMonotonic { size: f64 },
    #[error("Least-squares fit failed: {0}")]
    FitFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalibrationModel {
    #[default]
    Linear,
    LogLinear,
    MonotoneSpline,
    Exponential,
}

impl CalibrationModel {
    pub const ALL: [CalibrationModel; 4] = [
        CalibrationModel::Linear,
        CalibrationModel::LogLinear,
        CalibrationModel::MonotoneSpline,
        CalibrationModel::Exponential,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CalibrationModel::Linear => "linear",
            CalibrationModel::LogLinear => "log-linear",
            CalibrationModel::MonotoneSpline => "monotone-spline",
            CalibrationModel::Exponential => "exponential",
        }
    }
}

impl fmt::Display for CalibrationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CalibrationModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|model| model.name() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown calibration model '{s}' (expected one of: linear, log-linear, monotone-spline, exponential)"
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Curve {
    /// Piecewise interpolation over `xs` (raw or log10 sizes) and migrations.
    Piecewise { xs: Vec<f64> },
    /// Monotone cubic Hermite over log10 sizes with per-knot tangents.
    Spline { xs: Vec<f64>, tangents: Vec<f64> },
    /// `m = exp(a * s + b) + c`.
    Exponential { a: f64, b: f64, c: f64 },
}

/// A fitted size ↔ migration relation.
///
/// Sizes are stored ascending and migrations strictly descending, so every
/// model is a decreasing function of size.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    model: CalibrationModel,
    sizes: Vec<f64>,
    migrations: Vec<f64>,
    curve: Curve,
}

impl Calibration {
    pub fn fit(points: &[(f64, f64)], model: CalibrationModel) -> Result<Self, CalibrationError> {
        let (sizes, migrations) = validate(points)?;
        let curve = match model {
            CalibrationModel::Linear => Curve::Piecewise { xs: sizes.clone() },
            CalibrationModel::LogLinear => Curve::Piecewise {
                xs: sizes.iter().map(|s| s.log10()).collect(),
            },
            CalibrationModel::MonotoneSpline => {
                let xs: Vec<f64> = sizes.iter().map(|s| s.log10()).collect();
                let tangents = fritsch_carlson_tangents(&xs, &migrations);
                Curve::Spline { xs, tangents }
            }
            CalibrationModel::Exponential => fit_exponential(&sizes, &migrations)?,
        };
        Ok(Self {
            model,
            sizes,
            migrations,
            curve,
        })
    }

    pub fn model(&self) -> CalibrationModel {
        self.model
    }

    /// Control points as `(size, migration)`, ascending in size.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.sizes.iter().copied().zip(self.migrations.iter().copied())
    }

    /// `(min, max)` migration distance of the control points.
    pub fn migration_span(&self) -> (f64, f64) {
        (self.migrations[self.migrations.len() - 1], self.migrations[0])
    }

    /// `(min, max)` DNA size of the control points.
    pub fn size_span(&self) -> (f64, f64) {
        (self.sizes[0], self.sizes[self.sizes.len() - 1])
    }

    pub fn size_to_migration(&self, size: f64) -> f64 {
        match &self.curve {
            Curve::Piecewise { xs } => {
                let x = match self.model {
                    CalibrationModel::LogLinear => log10_or_floor(size, xs[0]),
                    _ => size,
                };
                interp(x, xs, &self.migrations)
            }
            Curve::Spline { xs, tangents } => {
                hermite(log10_or_floor(size, xs[0]), xs, &self.migrations, tangents)
            }
            Curve::Exponential { a, b, c } => (a * size + b).exp() + c,
        }
    }

    pub fn migration_to_size(&self, migration: f64) -> f64 {
        let (min_size, max_size) = self.size_span();
        match &self.curve {
            Curve::Piecewise { xs } => {
                let ms: Vec<f64> = self.migrations.iter().rev().copied().collect();
                let targets: Vec<f64> = xs.iter().rev().copied().collect();
                let x = interp(migration, &ms, &targets);
                match self.model {
                    CalibrationModel::LogLinear => 10f64.powf(x),
                    _ => x,
                }
            }
            Curve::Spline { xs, tangents } => {
                let (min_m, max_m) = self.migration_span();
                if migration >= max_m {
                    return min_size;
                }
                if migration <= min_m {
                    return max_size;
                }
                let (mut lo, mut hi) = (xs[0], xs[xs.len() - 1]);
                for _ in 0..BISECTION_ITERATIONS {
                    let mid = 0.5 * (lo + hi);
                    if hermite(mid, xs, &self.migrations, tangents) > migration {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
                10f64.powf(0.5 * (lo + hi))
            }
            Curve::Exponential { a, b, c } => {
                if migration <= *c {
                    return max_size;
                }
                (((migration - c).ln() - b) / a).clamp(min_size, max_size)
            }
        }
    }
}

fn log10_or_floor(size: f64, floor: f64) -> f64 {
    if size > 0.0 { size.log10() } else { floor }
}

fn validate(points: &[(f64, f64)]) -> Result<(Vec<f64>, Vec<f64>), CalibrationError> {
    if points.len() < 2 {
        return Err(CalibrationError::TooFewPoints {
            found: points.len(),
        });
    }
    for &(size, migration) in points {
        if !size.is_finite() || size <= 0.0 {
            return Err(CalibrationError::InvalidSize { size });
        }
        if !migration.is_finite() {
            return Err(CalibrationError::InvalidMigration { size, migration });
        }
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    for pair in sorted.windows(2) {
        let ((s0, m0), (s1, m1)) = (pair[0], pair[1]);
        if s0 == s1 {
            return Err(CalibrationError::DuplicateSize { size: s1 });
        }
        if m1 >= m0 {
            return Err(CalibrationError::NonMonotonic { size: s1 });
        }
    }
    Ok(sorted.into_iter().unzip())
}

fn fritsch_carlson_tangents(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let delta: Vec<f64> = (0..n - 1).map(|k| (ys[k + 1] - ys[k]) / h[k]).collect();

    if n == 2 {
        return vec![delta[0], delta[0]];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        if delta[k - 1] * delta[k] <= 0.0 {
            continue;
        }
        let w1 = 2.0 * h[k] + h[k - 1];
        let w2 = h[k] + 2.0 * h[k - 1];
        d[k] = (w1 + w2) / (w1 / delta[k - 1] + w2 / delta[k]);
    }
    d[0] = edge_tangent(h[0], h[1], delta[0], delta[1]);
    d[n - 1] = edge_tangent(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
    d
}

/// One-sided three-point tangent, limited so the end intervals stay monotone.
fn edge_tangent(h0: f64, h1: f64, delta0: f64, delta1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * delta0 - h0 * delta1) / (h0 + h1);
    if d.signum() != delta0.signum() {
        0.0
    } else if delta0.signum() != delta1.signum() && d.abs() > 3.0 * delta0.abs() {
        3.0 * delta0
    } else {
        d
    }
}

fn hermite(x: f64, xs: &[f64], ys: &[f64], d: &[f64]) -> f64 {
    let n = xs.len();
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    let k = xs.partition_point(|&v| v <= x).min(n - 1) - 1;
    let h = xs[k + 1] - xs[k];
    let t = (x - xs[k]) / h;
    let (t2, t3) = (t * t, t * t * t);
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    h00 * ys[k] + h10 * h * d[k] + h01 * ys[k + 1] + h11 * h * d[k + 1]
}

/// Fits `ln(m - c) = a * s + b` by least squares for each candidate offset `c`
/// and keeps the offset with the smallest residual.
fn fit_exponential(sizes: &[f64], migrations: &[f64]) -> Result<Curve, CalibrationError> {
    if let Some(i) = migrations.iter().position(|&m| m <= 0.0) {
        return Err(CalibrationError::InvalidMigration {
            size: sizes[i],
            migration: migrations[i],
        });
    }
    let min_migration = migrations.iter().copied().fold(f64::INFINITY, f64::min);
    let n = sizes.len();
    let design = DMatrix::from_fn(n, 2, |row, col| if col == 0 { sizes[row] } else { 1.0 });
    let svd = design.clone().svd(true, true);

    let mut best: Option<(f64, Curve)> = None;
    for c in linspace(0.0, 0.9 * min_migration, EXPONENTIAL_OFFSET_STEPS) {
        let target = DVector::from_iterator(n, migrations.iter().map(|m| (m - c).ln()));
        let coefficients = svd
            .solve(&target, 1e-12)
            .map_err(|e| CalibrationError::FitFailed(e.to_string()))?;
        let residual = (&design * &coefficients - &target).norm_squared();
        let (a, b) = (coefficients[0], coefficients[1]);
        if !a.is_finite() || !b.is_finite() {
            continue;
        }
        if best.as_ref().is_none_or(|(r, _)| residual < *r) {
            best = Some((residual, Curve::Exponential { a, b, c }));
        }
    }

    match best {
        Some((_, Curve::Exponential { a, .. })) if a >= 0.0 => Err(CalibrationError::FitFailed(
            "fitted curve does not decrease with size".to_string(),
        )),
        Some((_, curve)) => Ok(curve),
        None => Err(CalibrationError::FitFailed(
            "no finite solution for any offset".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder_points() -> Vec<(f64, f64)> {
        vec![
            (100.0, 205.0),
            (200.0, 186.0),
            (300.0, 171.0),
            (400.0, 158.0),
            (500.0, 149.0),
            (650.0, 139.0),
            (850.0, 128.0),
            (1000.0, 121.0),
            (1650.0, 100.0),
            (2000.0, 90.0),
            (3000.0, 73.0),
            (4000.0, 65.0),
        ]
    }

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "{a} vs {b} (tolerance {tol})");
    }

    #[test]
    fn interpolating_models_reproduce_control_points() {
        for model in [
            CalibrationModel::Linear,
            CalibrationModel::LogLinear,
            CalibrationModel::MonotoneSpline,
        ] {
            let calibration = Calibration::fit(&ladder_points(), model).unwrap();
            for (size, migration) in ladder_points() {
                assert_close(calibration.size_to_migration(size), migration, 1e-9);
            }
        }
    }

    #[test]
    fn linear_model_matches_numpy_interp_between_points() {
        let calibration = Calibration::fit(&ladder_points(), CalibrationModel::Linear).unwrap();
        assert_close(calibration.size_to_migration(150.0), 195.5, 1e-12);
        assert_close(calibration.size_to_migration(2500.0), 81.5, 1e-12);
    }

    #[test]
    fn every_model_decreases_with_size() {
        for model in CalibrationModel::ALL {
            let calibration = Calibration::fit(&ladder_points(), model).unwrap();
            let mut previous = f64::INFINITY;
            for size in (100..=4000).step_by(25) {
                let migration = calibration.size_to_migration(size as f64);
                assert!(migration <= previous, "{model} not monotone at {size}");
                previous = migration;
            }
        }
    }

    #[test]
    fn sizes_outside_the_span_clamp_to_endpoint_migrations() {
        for model in [
            CalibrationModel::Linear,
            CalibrationModel::LogLinear,
            CalibrationModel::MonotoneSpline,
        ] {
            let calibration = Calibration::fit(&ladder_points(), model).unwrap();
            assert_eq!(calibration.size_to_migration(10.0), 205.0);
            assert_eq!(calibration.size_to_migration(0.0), 205.0);
            assert_eq!(calibration.size_to_migration(50_000.0), 65.0);
        }
    }

    #[test]
    fn inverse_round_trips_inside_the_span() {
        for model in CalibrationModel::ALL {
            let calibration = Calibration::fit(&ladder_points(), model).unwrap();
            for size in [150.0, 420.0, 777.0, 1800.0, 3500.0] {
                let migration = calibration.size_to_migration(size);
                assert_close(calibration.migration_to_size(migration), size, size * 1e-6);
            }
        }
    }

    #[test]
    fn inverse_clamps_to_the_size_span() {
        let calibration = Calibration::fit(&ladder_points(), CalibrationModel::Linear).unwrap();
        assert_eq!(calibration.migration_to_size(300.0), 100.0);
        assert_eq!(calibration.migration_to_size(10.0), 4000.0);
        let spline = Calibration::fit(&ladder_points(), CalibrationModel::MonotoneSpline).unwrap();
        assert_eq!(spline.migration_to_size(300.0), 100.0);
        assert_eq!(spline.migration_to_size(10.0), 4000.0);
    }

    #[test]
    fn exponential_fit_tracks_the_ladder() {
        let calibration = Calibration::fit(&ladder_points(), CalibrationModel::Exponential).unwrap();
        for (size, migration) in ladder_points() {
            assert_close(calibration.size_to_migration(size), migration, 0.15 * migration);
        }
    }

    #[test]
    fn exponential_fit_recovers_an_exact_curve() {
        let points: Vec<(f64, f64)> = [100.0, 500.0, 1000.0, 2000.0, 5000.0]
            .iter()
            .map(|&s| (s, (-0.0005 * s + 5.0f64).exp()))
            .collect();
        let calibration = Calibration::fit(&points, CalibrationModel::Exponential).unwrap();
        for (size, migration) in points {
            assert_close(calibration.size_to_migration(size), migration, 1e-6 * migration);
        }
    }

    #[test]
    fn span_reports_control_extremes() {
        let calibration = Calibration::fit(&ladder_points(), CalibrationModel::Linear).unwrap();
        assert_eq!(calibration.migration_span(), (65.0, 205.0));
        assert_eq!(calibration.size_span(), (100.0, 4000.0));
    }

    #[test]
    fn unsorted_points_are_accepted() {
        let mut points = ladder_points();
        points.reverse();
        let calibration = Calibration::fit(&points, CalibrationModel::Linear).unwrap();
        assert_eq!(calibration.size_to_migration(1000.0), 121.0);
    }

    #[test]
    fn invalid_ladders_are_rejected() {
        assert_eq!(
            Calibration::fit(&[(100.0, 1.0)], CalibrationModel::Linear),
            Err(CalibrationError::TooFewPoints { found: 1 })
        );
        assert_eq!(
            Calibration::fit(&[(100.0, 10.0), (100.0, 5.0)], CalibrationModel::Linear),
            Err(CalibrationError::DuplicateSize { size: 100.0 })
        );
        assert_eq!(
            Calibration::fit(&[(100.0, 10.0), (200.0, 12.0)], CalibrationModel::Linear),
            Err(CalibrationError::NonMonotonic { size: 200.0 })
        );
        assert!(matches!(
            Calibration::fit(&[(-5.0, 10.0), (200.0, 2.0)], CalibrationModel::Linear),
            Err(CalibrationError::InvalidSize { .. })
        ));
        assert!(matches!(
            Calibration::fit(&[(5.0, f64::NAN), (200.0, 2.0)], CalibrationModel::Linear),
            Err(CalibrationError::InvalidMigration { .. })
        ));
    }

    #[test]
    fn exponential_model_needs_positive_migrations() {
        assert!(matches!(
            Calibration::fit(&[(100.0, 10.0), (200.0, -2.0)], CalibrationModel::Exponential),
            Err(CalibrationError::InvalidMigration { .. })
        ));
    }

    #[test]
    fn model_names_parse_back() {
        for model in CalibrationModel::ALL {
            assert_eq!(model.name().parse::<CalibrationModel>().unwrap(), model);
        }
        assert_eq!(
            "monotone_spline".parse::<CalibrationModel>().unwrap(),
            CalibrationModel::MonotoneSpline
        );
        assert!("cubic".parse::<CalibrationModel>().is_err());
    }
}
