//! # Workflows Module
//!
//! High-level entry points that turn records and digestions into finished
//! figures.
//!
//! ## Overview
//!
//! Each workflow digests its inputs, builds the band patterns against a ladder,
//! lays them out and hands the scenes to an exporter, reporting progress
//! through a [`progress::ProgressReporter`] along the way.
//!
//! ## Architecture
//!
//! - **Digestion Grid** ([`digestion_grid`]) - One gel row per digestion (or per
//!   record), with one lane per record (or per digestion).
//! - **Record Digestion** ([`record_digestion`]) - Annotates a record with the
//!   band regions of a digestion and plots a report page per record and
//!   digestion pair.
//! - **Progress** ([`progress`]) - Event types and the reporter passed to every
//!   workflow.

pub mod digestion_grid;
pub mod progress;
pub mod record_digestion;
