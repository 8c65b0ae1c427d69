//! # Digestion Module
//!
//! Restriction enzymes and the fragments they produce.
//!
//! ## Overview
//!
//! [`enzymes`] holds a static table of commercial enzymes with their IUPAC
//! recognition sites and cut offsets. [`search`] scans a sequence for those
//! sites on both strands (and across the origin of circular molecules) and
//! turns the cut positions into fragment sizes.

pub mod enzymes;
pub mod search;

pub use search::{compute_digestion_bands, find_cut_sites, fragment_sizes};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DigestionError {
    #[error("Unknown restriction enzyme '{0}'")]
    UnknownEnzyme(String),
}
