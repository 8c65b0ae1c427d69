//! # Core Module
//!
//! The data models and pure algorithms behind BandWagon's simulated gels.
//!
//! ## Overview
//!
//! Nothing in this module draws anything. It describes what a gel contains
//! (bands, patterns, pattern sets), where each fragment migrates (ladder
//! calibration), and which fragments a digestion produces.
//!
//! ## Architecture
//!
//! - **Models** ([`models`]) - Colors, fonts, bands, patterns and pattern sets
//! - **Calibration** ([`ladder`]) - Reference ladders and the size ↔ migration models fitted on them
//! - **Digestion** ([`digestion`]) - Restriction enzyme table, cut-site search and fragment sizes
//! - **Records** ([`io`]) - Annotated sequence records and their FASTA/GenBank readers
//! - **Comparison** ([`compare`]) - Tolerance-based similarity between band sets
//! - **Utilities** ([`utils`]) - Numeric helpers shared by the modules above

pub mod compare;
pub mod digestion;
pub mod io;
pub mod ladder;
pub mod models;
pub mod utils;
