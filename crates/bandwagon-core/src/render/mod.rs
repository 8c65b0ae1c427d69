//! # Render Module
//!
//! Turns band models into drawings and writes them to disk.
//!
//! ## Overview
//!
//! Rendering happens in two steps. [`layout`] and [`record_map`] translate
//! models into a backend-agnostic [`scene::Scene`]: a flat, ordered list of
//! rectangles, lines, text runs and rasters in pixel coordinates. Each backend
//! then paints a scene in its own format.
//!
//! ## Key Components
//!
//! - [`scene`] - Drawing primitives and scene composition
//! - [`layout`] - Pattern sets as gel plots, and vertical stacking of plots
//! - [`record_map`] - Sequence feature tracks for digestion reports
//! - [`svg`], [`png`], [`html`], [`pdf`] - Output backends
//! - [`export`] - Backend selection from the output file extension

pub mod export;
pub mod html;
pub mod layout;
pub mod pdf;
pub mod png;
pub mod record_map;
pub mod scene;
pub mod svg;

pub use export::{OutputFormat, export, export_pages};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error for output file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("PNG rendering failed: {0}")]
    Png(String),
    #[error("PDF rendering failed: {0}")]
    Pdf(String),
    #[error("Failed to serialize band data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("'{0}' output requires the library to be built with the '{0}' feature")]
    FeatureDisabled(&'static str),
    #[error("Unsupported output format: {0} (expected .svg, .png, .html or .pdf)")]
    UnsupportedFormat(PathBuf),
    #[error("Nothing to render: the document has no pages")]
    EmptyDocument,
    #[error("Nothing to render: the pattern set has no patterns")]
    EmptyPatternSet,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 110.0,
            right: 20.0,
            bottom: 20.0,
            left: 60.0,
        }
    }
}

/// Pixel geometry and output settings shared by all backends.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Width of one pattern column, in pixels.
    pub column_width: f64,
    /// Height of the plot area below the pattern labels, in pixels.
    pub plot_height: f64,
    pub margins: Margins,
    /// Pixels per font point.
    pub font_scale: f64,
    /// Columns shown at once by the interactive page before it scrolls.
    pub max_visible_patterns: usize,
    /// TrueType font used by the PNG backend.
    pub font_path: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            column_width: 60.0,
            plot_height: 400.0,
            margins: Margins::default(),
            font_scale: 1.0,
            max_visible_patterns: 12,
            font_path: None,
        }
    }
}

impl RenderOptions {
    pub fn with_column_width(mut self, width: f64) -> Self {
        self.column_width = width;
        self
    }

    pub fn with_plot_height(mut self, height: f64) -> Self {
        self.plot_height = height;
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_font_scale(mut self, scale: f64) -> Self {
        self.font_scale = scale;
        self
    }

    pub fn with_max_visible_patterns(mut self, count: usize) -> Self {
        self.max_visible_patterns = count;
        self
    }

    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }
}
