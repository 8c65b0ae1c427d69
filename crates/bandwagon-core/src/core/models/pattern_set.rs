use super::pattern::{BandsPattern, PatternOverrides};
use super::style::{Color, FontOverrides, FontSpec};
use crate::core::ladder::Ladder;
use crate::core::utils::numeric::{linspace, round_half_even};

pub const DEFAULT_ALTERNATE_BACKGROUNDS: [Color; 2] =
    [Color::rgb(0xe2, 0xed, 0xff), Color::rgb(0xff, 0xfa, 0xe2)];

/// Which DNA sizes get a tick on the left axis.
#[derive(Debug, Clone, PartialEq)]
pub enum LadderTicks {
    /// Evenly spaced along the ladder's migration span, rounded to 100 bp.
    Count(usize),
    Sizes(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub dna_size: f64,
    pub migration: f64,
    pub label: String,
}

/// Several lanes drawn side by side against one ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct BandsPatternsSet {
    pub patterns: Vec<BandsPattern>,
    pub ladder: Ladder,
    pub label: Option<String>,
    pub label_font: FontOverrides,
    pub pattern_overrides: PatternOverrides,
    pub ladder_ticks: Option<LadderTicks>,
    pub ticks_font: FontOverrides,
    /// `None` leaves lanes without an explicit background uncolored.
    pub alternate_background_colors: Option<Vec<Color>>,
}

impl BandsPatternsSet {
    pub fn new(patterns: Vec<BandsPattern>, ladder: Ladder) -> Self {
        Self {
            patterns,
            ladder,
            label: None,
            label_font: FontOverrides::default(),
            pattern_overrides: PatternOverrides::default(),
            ladder_ticks: None,
            ticks_font: FontOverrides::default(),
            alternate_background_colors: Some(DEFAULT_ALTERNATE_BACKGROUNDS.to_vec()),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_label_font(mut self, font: FontOverrides) -> Self {
        self.label_font = font;
        self
    }

    pub fn with_pattern_overrides(mut self, overrides: PatternOverrides) -> Self {
        self.pattern_overrides = overrides;
        self
    }

    pub fn with_ladder_ticks(mut self, ticks: LadderTicks) -> Self {
        self.ladder_ticks = Some(ticks);
        self
    }

    pub fn with_ticks_font(mut self, font: FontOverrides) -> Self {
        self.ticks_font = font;
        self
    }

    pub fn with_alternate_background_colors(mut self, colors: Option<Vec<Color>>) -> Self {
        self.alternate_background_colors = colors;
        self
    }

    pub fn label_font(&self) -> FontSpec {
        FontSpec::set_label().merged(&self.label_font)
    }

    pub fn ticks_font(&self) -> FontSpec {
        FontSpec::ticks().merged(&self.ticks_font)
    }

    pub fn processed_patterns(&self) -> Vec<BandsPattern> {
        let alternate = self
            .alternate_background_colors
            .as_deref()
            .filter(|colors| !colors.is_empty());
        self.patterns
            .iter()
            .enumerate()
            .map(|(i, pattern)| {
                let mut pattern = pattern.apply(&self.pattern_overrides);
                if pattern.background_color.is_none() {
                    pattern.background_color = alternate.map(|colors| colors[i % colors.len()]);
                }
                pattern
            })
            .collect()
    }

    /// Largest migration distance among the ladder bands, which sets the plot depth.
    pub fn max_ladder_migration(&self) -> f64 {
        self.ladder.migration_distance_span().1
    }

    pub fn tick_positions(&self) -> Vec<Tick> {
        let sizes = match &self.ladder_ticks {
            None => return Vec::new(),
            Some(LadderTicks::Count(n)) => {
                let (low, high) = self.ladder.migration_distance_span();
                linspace(low, high, *n)
                    .into_iter()
                    .map(|m| round_half_even(self.ladder.migration_to_dna_size(m), -2))
                    .collect()
            }
            Some(LadderTicks::Sizes(sizes)) => sizes.clone(),
        };
        sizes
            .into_iter()
            .map(|dna_size| Tick {
                dna_size,
                migration: self.ladder.dna_size_to_migration(dna_size),
                label: tick_label(dna_size),
            })
            .collect()
    }
}

fn tick_label(size: f64) -> String {
    if size.fract() == 0.0 {
        format!("{}", size as i64)
    } else {
        format!("{size}")
    }
}
