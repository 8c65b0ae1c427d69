use super::style::{Color, FontOverrides, FontSpec};
use crate::core::ladder::Ladder;
use crate::core::utils::numeric::round_half_even;
use serde::{Deserialize, Serialize};

/// Label value replaced by the band's formatted size when the label is resolved.
pub const SIZE_LABEL_DIRECTIVE: &str = "=size";

pub const DEFAULT_BAND_THICKNESS: f64 = 2.0;
pub const DEFAULT_BAND_WIDTH: f64 = 0.7;

/// Formats a fragment size the way gel annotations read: `650`, `2k`, `13.3k`.
pub fn format_dna_size(size: f64) -> String {
    if size >= 1000.0 {
        let kb = round_half_even(size / 1000.0, 1);
        if kb.fract() == 0.0 {
            format!("{}k", kb as i64)
        } else {
            format!("{kb:.1}k")
        }
    } else {
        format!("{}", size.trunc() as i64)
    }
}

/// One DNA fragment drawn as a horizontal mark in a lane.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub dna_size: f64,
    pub migration_distance: Option<f64>,
    pub color: Color,
    pub thickness: f64,
    pub width: f64,
    pub label: Option<String>,
    pub label_font: FontOverrides,
    pub html: Option<String>,
}

impl Band {
    pub fn new(dna_size: f64) -> Self {
        Self {
            dna_size,
            migration_distance: None,
            color: Color::BLACK,
            thickness: DEFAULT_BAND_THICKNESS,
            width: DEFAULT_BAND_WIDTH,
            label: None,
            label_font: FontOverrides::default(),
            html: None,
        }
    }

    /// A band whose migration distance comes from the ladder calibration.
    pub fn placed(dna_size: f64, ladder: &Ladder) -> Self {
        Self::new(dna_size).with_migration(ladder.dna_size_to_migration(dna_size))
    }

    pub fn with_migration(mut self, migration_distance: f64) -> Self {
        self.migration_distance = Some(migration_distance);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_label_font(mut self, label_font: FontOverrides) -> Self {
        self.label_font = label_font;
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn resolved_label(&self) -> Option<String> {
        self.label.as_deref().map(|label| {
            if label == SIZE_LABEL_DIRECTIVE {
                format_dna_size(self.dna_size)
            } else {
                label.to_string()
            }
        })
    }

    pub fn label_font(&self) -> FontSpec {
        FontSpec::band_label().merged(&self.label_font)
    }

    /// Migration distance, falling back to the given ladder for unplaced bands.
    pub fn migration_on(&self, ladder: &Ladder) -> f64 {
        self.migration_distance
            .unwrap_or_else(|| ladder.dna_size_to_migration(self.dna_size))
    }

    pub fn hover_text(&self) -> String {
        self.html
            .clone()
            .or_else(|| self.resolved_label())
            .unwrap_or_else(|| format!("{} bp", self.dna_size.trunc() as i64))
    }

    pub fn apply(&self, overrides: &BandOverrides) -> Self {
        let mut band = self.clone();
        if let Some(color) = overrides.color {
            band.color = color;
        }
        if let Some(thickness) = overrides.thickness {
            band.thickness = thickness;
        }
        if let Some(width) = overrides.width {
            band.width = width;
        }
        if let Some(label) = &overrides.label {
            band.label = Some(label.clone());
        }
        if let Some(html) = &overrides.html {
            band.html = Some(html.clone());
        }
        band.label_font = band.label_font.then(&overrides.label_font);
        band
    }

    pub fn to_json(&self) -> BandJson {
        BandJson {
            dna_size: self.dna_size,
            migration_distance: self.migration_distance,
            color: self.color.to_hex(),
            width: self.width,
            thickness: self.thickness,
            label: self.resolved_label(),
            html: self.html.clone(),
        }
    }
}

/// Partial band attributes applied on top of existing bands.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct BandOverrides {
    pub color: Option<Color>,
    pub thickness: Option<f64>,
    pub width: Option<f64>,
    pub label: Option<String>,
    pub label_font: FontOverrides,
    pub html: Option<String>,
}

impl BandOverrides {
    pub fn then(&self, other: &BandOverrides) -> Self {
        Self {
            color: other.color.or(self.color),
            thickness: other.thickness.or(self.thickness),
            width: other.width.or(self.width),
            label: other.label.clone().or_else(|| self.label.clone()),
            label_font: self.label_font.then(&other.label_font),
            html: other.html.clone().or_else(|| self.html.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandJson {
    pub dna_size: f64,
    pub migration_distance: Option<f64>,
    pub color: String,
    pub width: f64,
    pub thickness: f64,
    pub label: Option<String>,
    pub html: Option<String>,
}
