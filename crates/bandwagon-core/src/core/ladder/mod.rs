//! # Ladder Module
//!
//! Reference ladders and the size ↔ migration calibration built on them.
//!
//! ## Overview
//!
//! A ladder is a lane of bands whose sizes and migration distances were measured
//! on a real gel. Every other lane in a plot is positioned by converting its
//! fragment sizes into migration distances through the ladder's [`Calibration`].
//!
//! ## Architecture
//!
//! - **Calibration** ([`calibration`]) - Fitted models (piecewise-linear, log-linear,
//!   monotone spline, exponential) and their inverses
//! - **Presets** ([`presets`]) - Ladders shipped with the library, looked up by name
//! - **Ladder files** ([`io`]) - Custom ladders loaded from TOML or CSV tables

pub mod calibration;
pub mod io;
pub mod presets;

use crate::core::models::band::Band;
use crate::core::models::pattern::{BandsPattern, PatternError};
use crate::core::models::style::Color;
use calibration::{Calibration, CalibrationError, CalibrationModel};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

const LADDER_BAND_COLOR: Color = Color::rgb(0x8b, 0x00, 0x00);

#[derive(Debug, Error)]
pub enum LadderError {
    #[error("Invalid ladder calibration: {0}")]
    Calibration(#[from] CalibrationError),
    #[error("Invalid ladder pattern: {0}")]
    Pattern(#[from] PatternError),
    #[error("Unknown ladder preset '{name}' (available: {available})")]
    UnknownPreset { name: String, available: String },
    #[error("I/O error for ladder file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parsing error in ladder file '{path}': {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("CSV parsing error in ladder file '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("Unsupported ladder file format: {0} (expected .toml or .csv)")]
    UnsupportedFormat(PathBuf),
}

/// A calibrated reference lane.
#[derive(Debug, Clone, PartialEq)]
pub struct Ladder {
    pattern: BandsPattern,
    calibration: Calibration,
}

impl Ladder {
    pub fn from_pattern(pattern: BandsPattern, model: CalibrationModel) -> Result<Self, LadderError> {
        let points = pattern.calibration_points()?;
        let calibration = Calibration::fit(&points, model)?;
        debug!(
            label = pattern.label.as_deref().unwrap_or(""),
            bands = points.len(),
            %model,
            "Calibrated ladder"
        );
        Ok(Self {
            pattern,
            calibration,
        })
    }

    /// Builds a dark-red ladder on a white background from `(size, migration)`
    /// pairs, shifting migrations so the fastest band sits a tenth of the ladder
    /// span above the bottom of the plot.
    pub fn generate(label: &str, bands: &[(f64, f64)]) -> Result<Self, LadderError> {
        Self::generate_with_model(label, bands, CalibrationModel::default())
    }

    pub fn generate_with_model(
        label: &str,
        bands: &[(f64, f64)],
        model: CalibrationModel,
    ) -> Result<Self, LadderError> {
        let min = bands.iter().map(|b| b.1).fold(f64::INFINITY, f64::min);
        let max = bands.iter().map(|b| b.1).fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;
        let shift = if min < span / 10.0 { 0.0 } else { min - span / 10.0 };

        let pattern = BandsPattern::new(
            bands
                .iter()
                .map(|&(size, migration)| {
                    Band::new(size)
                        .with_migration(migration - shift)
                        .with_color(LADDER_BAND_COLOR)
                })
                .collect(),
        )
        .with_background_color(Color::WHITE)
        .with_label(label);
        Self::from_pattern(pattern, model)
    }

    pub fn pattern(&self) -> &BandsPattern {
        &self.pattern
    }

    pub fn into_pattern(self) -> BandsPattern {
        self.pattern
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn model(&self) -> CalibrationModel {
        self.calibration.model()
    }

    pub fn label(&self) -> Option<&str> {
        self.pattern.label.as_deref()
    }

    /// Same bands refitted with another model.
    pub fn with_model(&self, model: CalibrationModel) -> Result<Self, LadderError> {
        Self::from_pattern(self.pattern.clone(), model)
    }

    /// Changes only the displayed label; the calibration is untouched.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.pattern.label = Some(label.into());
        self
    }

    pub fn with_background_color(mut self, color: Color) -> Self {
        self.pattern.background_color = Some(color);
        self
    }

    pub fn dna_size_to_migration(&self, dna_size: f64) -> f64 {
        self.calibration.size_to_migration(dna_size)
    }

    pub fn migration_to_dna_size(&self, migration: f64) -> f64 {
        self.calibration.migration_to_size(migration)
    }

    pub fn migration_distance_span(&self) -> (f64, f64) {
        self.calibration.migration_span()
    }

    pub fn dna_size_span(&self) -> (f64, f64) {
        self.calibration.size_span()
    }
}
