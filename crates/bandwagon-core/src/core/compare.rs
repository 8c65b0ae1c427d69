//! Tolerance-based comparison of band patterns, used to decide whether two
//! digestions would be told apart on a gel.

pub const DEFAULT_SIMILARITY_TOLERANCE: f64 = 0.3;
pub const DEFAULT_MERGE_TOLERANCE: f64 = 0.2;

/// Two bands are similar when their relative difference is below `tolerance`.
pub fn bands_are_similar(b1: f64, b2: f64, tolerance: f64) -> bool {
    (b1 - b2).abs() / b1.min(b2) < tolerance
}

/// Sorts the bands and folds each one into the previous kept band when they are
/// similar, replacing that band by the mean of the two.
pub fn merge_bands_in_pattern(bands: &[f64], tolerance: f64) -> Vec<f64> {
    let mut sorted = bands.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut merged: Vec<f64> = Vec::with_capacity(sorted.len());
    for band in sorted {
        match merged.last_mut() {
            Some(last) if bands_are_similar(band, *last, tolerance) => {
                *last = 0.5 * (band + *last);
            }
            _ => merged.push(band),
        }
    }
    merged
}

pub fn bands_patterns_are_similar(
    bands1: &[f64],
    bands2: &[f64],
    tolerance: f64,
    merge_tolerance: f64,
) -> bool {
    if bands1.is_empty() || bands2.is_empty() {
        return false;
    }
    let merged1 = merge_bands_in_pattern(bands1, merge_tolerance);
    let merged2 = merge_bands_in_pattern(bands2, merge_tolerance);
    merged1.len() == merged2.len()
        && merged1
            .iter()
            .zip(&merged2)
            .all(|(&b1, &b2)| bands_are_similar(b1, b2, tolerance))
}
