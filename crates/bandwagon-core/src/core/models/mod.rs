//! # Core Models Module
//!
//! Data structures describing what ends up on a simulated gel.
//!
//! ## Overview
//!
//! A plot is a [`pattern_set::BandsPatternsSet`]: lanes ([`pattern::BandsPattern`]) drawn
//! side by side against a calibrated ladder, each lane holding [`band::Band`]s.
//! All models are plain values. Display tweaks are expressed as partial
//! overrides (`BandOverrides`, `PatternOverrides`, `FontOverrides`) that are
//! layered onto copies, never onto the originals.
//!
//! ## Key Components
//!
//! - [`style`] - Colors, font specifications and font overrides
//! - [`band`] - Single fragments, size label formatting and band overrides
//! - [`pattern`] - Lanes of bands with their decorations
//! - [`pattern_set`] - Multi-lane plots, background alternation and ladder ticks
//! - [`topology`] - Linear or circular molecules
//! - [`gel_image`] - Grayscale pictures of real gel lanes
//!
//! ## Usage
//!
//! ```ignore
//! use bandwagon::core::ladder::presets;
//! use bandwagon::core::models::{pattern::BandsPattern, pattern_set::{BandsPatternsSet, LadderTicks}};
//!
//! let ladder = presets::ladder_100_to_4k();
//! let lane = BandsPattern::from_sizes(&[500.0, 1200.0, 3000.0], &ladder).with_label("Digest");
//! let set = BandsPatternsSet::new(vec![ladder.pattern().clone(), lane], ladder)
//!     .with_ladder_ticks(LadderTicks::Count(5));
//! ```

pub mod band;
pub mod gel_image;
pub mod pattern;
pub mod pattern_set;
pub mod style;
pub mod topology;
