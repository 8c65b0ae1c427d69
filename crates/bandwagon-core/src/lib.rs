//! # BandWagon Core Library
//!
//! Simulated agarose gel electrophoresis: restriction digests, ladder
//! calibration and rendering of band patterns to SVG, PNG, HTML and PDF.
//!
//! ## Architectural Philosophy
//!
//! The library is organized in three layers, each depending only on the ones
//! below it.
//!
//! - **[`core`]: The Foundation.** Plain data models (`Band`, `BandsPattern`,
//!   `BandsPatternsSet`, `Ladder`), the restriction enzyme table and cut site
//!   search, pattern comparison, and sequence record I/O for FASTA and GenBank.
//!
//! - **[`render`]: The Drawing Layer.** Lays models out as backend-neutral
//!   [`render::scene::Scene`]s and writes them through the SVG, PNG, HTML or
//!   PDF exporters.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `render` together into
//!   complete procedures, such as plotting a digestion grid or writing an
//!   annotated digestion report.

pub mod core;
pub mod error;
pub mod render;
pub mod workflows;

pub use error::BandwagonError;
