use super::band::{Band, BandOverrides};
use super::gel_image::GelImage;
use super::style::{Color, FontOverrides, FontSpec};
use super::topology::Topology;
use crate::core::ladder::Ladder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_GEL_IMAGE_WIDTH: f64 = 0.2;

#[derive(Debug, Error, PartialEq)]
pub enum PatternError {
    #[error("A calibration pattern needs at least 2 bands, found {found}")]
    TooFewBands { found: usize },
    #[error("Band of size {dna_size} has no migration distance")]
    UnplacedBand { dna_size: f64 },
}

/// One lane of a gel: the bands it shows and how the lane is decorated.
#[derive(Debug, Clone, PartialEq)]
pub struct BandsPattern {
    pub bands: Vec<Band>,
    pub label: Option<String>,
    pub label_font: FontOverrides,
    pub corner_note: Option<String>,
    pub corner_note_font: FontOverrides,
    pub background_color: Option<Color>,
    pub width: f64,
    pub band_overrides: BandOverrides,
    pub gel_image: Option<GelImage>,
    pub gel_image_width: f64,
    pub topology: Option<Topology>,
    pub uncut: bool,
}

impl Default for BandsPattern {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl BandsPattern {
    pub fn new(bands: Vec<Band>) -> Self {
        Self {
            bands,
            label: None,
            label_font: FontOverrides::default(),
            corner_note: None,
            corner_note_font: FontOverrides::default(),
            background_color: None,
            width: 1.0,
            band_overrides: BandOverrides::default(),
            gel_image: None,
            gel_image_width: DEFAULT_GEL_IMAGE_WIDTH,
            topology: None,
            uncut: false,
        }
    }

    /// Builds a lane from bare fragment sizes placed on the ladder.
    pub fn from_sizes(sizes: &[f64], ladder: &Ladder) -> Self {
        Self::new(
            sizes
                .iter()
                .map(|&size| Band::placed(size, ladder))
                .collect(),
        )
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_label_font(mut self, label_font: FontOverrides) -> Self {
        self.label_font = label_font;
        self
    }

    pub fn with_corner_note(mut self, note: impl Into<String>) -> Self {
        self.corner_note = Some(note.into());
        self
    }

    pub fn with_background_color(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_band_overrides(mut self, overrides: BandOverrides) -> Self {
        self.band_overrides = overrides;
        self
    }

    pub fn with_gel_image(mut self, image: GelImage, width: f64) -> Self {
        self.gel_image = Some(image);
        self.gel_image_width = width;
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = Some(topology);
        self
    }

    pub fn with_uncut(mut self, uncut: bool) -> Self {
        self.uncut = uncut;
        self
    }

    pub fn label_font(&self) -> FontSpec {
        FontSpec::pattern_label().merged(&self.label_font)
    }

    pub fn corner_note_font(&self) -> FontSpec {
        FontSpec::corner_note().merged(&self.corner_note_font)
    }

    pub fn processed_bands(&self) -> Vec<Band> {
        self.bands
            .iter()
            .map(|band| band.apply(&self.band_overrides))
            .collect()
    }

    /// Concatenates the bands of both lanes, keeping this lane's decorations.
    pub fn merge_with(&self, other: &BandsPattern) -> Self {
        let mut merged = self.clone();
        merged.bands.extend(other.bands.iter().cloned());
        merged
    }

    pub fn apply(&self, overrides: &PatternOverrides) -> Self {
        let mut pattern = self.clone();
        if let Some(label) = &overrides.label {
            pattern.label = Some(label.clone());
        }
        pattern.label_font = pattern.label_font.then(&overrides.label_font);
        pattern.corner_note_font = pattern.corner_note_font.then(&overrides.corner_note_font);
        if let Some(color) = overrides.background_color {
            pattern.background_color = Some(color);
        }
        if let Some(width) = overrides.width {
            pattern.width = width;
        }
        if let Some(width) = overrides.gel_image_width {
            pattern.gel_image_width = width;
        }
        pattern.band_overrides = pattern.band_overrides.then(&overrides.band_overrides);
        pattern
    }

    pub fn dna_sizes(&self) -> Vec<f64> {
        self.bands.iter().map(|band| band.dna_size).collect()
    }

    pub fn max_migration(&self) -> Option<f64> {
        self.bands
            .iter()
            .filter_map(|band| band.migration_distance)
            .reduce(f64::max)
    }

    /// `(size, migration)` pairs sorted by size, for calibrating a ladder.
    pub fn calibration_points(&self) -> Result<Vec<(f64, f64)>, PatternError> {
        if self.bands.len() < 2 {
            return Err(PatternError::TooFewBands {
                found: self.bands.len(),
            });
        }
        let mut points = self
            .bands
            .iter()
            .map(|band| {
                band.migration_distance
                    .map(|migration| (band.dna_size, migration))
                    .ok_or(PatternError::UnplacedBand {
                        dna_size: band.dna_size,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(points)
    }
}

/// Partial lane attributes, applied to every lane of a set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PatternOverrides {
    pub label: Option<String>,
    pub label_font: FontOverrides,
    pub corner_note_font: FontOverrides,
    pub background_color: Option<Color>,
    pub width: Option<f64>,
    pub gel_image_width: Option<f64>,
    pub band_overrides: BandOverrides,
}
