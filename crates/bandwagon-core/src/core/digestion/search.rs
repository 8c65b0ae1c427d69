use super::DigestionError;
use super::enzymes::{self, RestrictionEnzyme, iupac_matches, reverse_complement};
use std::collections::BTreeSet;
use tracing::trace;

pub fn resolve_enzymes<S: AsRef<str>>(
    names: &[S],
) -> Result<Vec<&'static RestrictionEnzyme>, DigestionError> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            enzymes::lookup(name).ok_or_else(|| DigestionError::UnknownEnzyme(name.to_string()))
        })
        .collect()
}

/// Top-strand cut positions of one enzyme, as the number of bases before each cut.
pub fn enzyme_cut_sites(sequence: &str, enzyme: &RestrictionEnzyme, linear: bool) -> Vec<usize> {
    let seq = sequence.as_bytes();
    let n = seq.len();
    let site = enzyme.site.as_bytes();
    let l = site.len();
    if n == 0 || l == 0 || l > n {
        return Vec::new();
    }

    let reverse_site = (!enzyme.is_palindromic()).then(|| reverse_complement(site));
    let matches_at = |pattern: &[u8], start: usize| {
        pattern
            .iter()
            .enumerate()
            .all(|(k, &code)| iupac_matches(code, seq[(start + k) % n]))
    };

    // Circular molecules also have sites straddling the origin.
    let last_start = if linear { n - l } else { n - 1 };
    let mut raw_cuts: Vec<i64> = Vec::new();
    for start in 0..=last_start {
        if matches_at(site, start) {
            raw_cuts.push(start as i64 + enzyme.top_cut as i64);
        }
        if let Some(reverse) = &reverse_site {
            if matches_at(reverse, start) {
                raw_cuts.push((start + l) as i64 - enzyme.bottom_cut as i64);
            }
        }
    }

    let n = n as i64;
    let cuts: BTreeSet<usize> = raw_cuts
        .into_iter()
        .filter_map(|cut| {
            if linear {
                (cut > 0 && cut < n).then_some(cut as usize)
            } else {
                Some(cut.rem_euclid(n) as usize)
            }
        })
        .collect();
    trace!(enzyme = enzyme.name, cuts = cuts.len(), "Scanned sequence");
    cuts.into_iter().collect()
}

/// Cut positions of each enzyme in the mix, in the order the enzymes were given.
pub fn find_cut_sites_by_enzyme<S: AsRef<str>>(
    sequence: &str,
    enzymes: &[S],
    linear: bool,
) -> Result<Vec<(&'static RestrictionEnzyme, Vec<usize>)>, DigestionError> {
    Ok(resolve_enzymes(enzymes)?
        .into_iter()
        .map(|enzyme| (enzyme, enzyme_cut_sites(sequence, enzyme, linear)))
        .collect())
}

/// Cut positions of a digestion mix: merged, deduplicated and ascending.
pub fn find_cut_sites<S: AsRef<str>>(
    sequence: &str,
    enzymes: &[S],
    linear: bool,
) -> Result<Vec<usize>, DigestionError> {
    let cuts: BTreeSet<usize> = find_cut_sites_by_enzyme(sequence, enzymes, linear)?
        .into_iter()
        .flat_map(|(_, cuts)| cuts)
        .collect();
    Ok(cuts.into_iter().collect())
}

/// Fragment lengths produced by cutting a molecule of `length` bases at `cuts`.
///
/// `cuts` must be ascending and unique. On a circular molecule the stretch
/// across the origin is one fragment; without any cut the molecule stays whole.
pub fn fragment_sizes(length: usize, cuts: &[usize], linear: bool) -> Vec<usize> {
    if length == 0 {
        return Vec::new();
    }
    let mut sizes: Vec<usize> = if linear {
        std::iter::once(0)
            .chain(cuts.iter().copied().filter(|&c| c > 0 && c < length))
            .chain(std::iter::once(length))
            .collect::<Vec<_>>()
            .windows(2)
            .map(|w| w[1] - w[0])
            .collect()
    } else {
        match (cuts.first(), cuts.last()) {
            (Some(&first), Some(&last)) => {
                let mut sizes: Vec<usize> = cuts.windows(2).map(|w| w[1] - w[0]).collect();
                sizes.push(length - last + first);
                sizes
            }
            _ => vec![length],
        }
    };
    sizes.sort_unstable();
    sizes
}

pub fn compute_digestion_bands<S: AsRef<str>>(
    sequence: &str,
    enzymes: &[S],
    linear: bool,
) -> Result<Vec<usize>, DigestionError> {
    let cuts = find_cut_sites(sequence, enzymes, linear)?;
    Ok(fragment_sizes(sequence.len(), &cuts, linear))
}
