use super::{Ladder, LadderError};

/// Sizes (bp) and measured migrations of the 100 bp to 4 kb ladder.
pub const LADDER_100_TO_4K: [(f64, f64); 12] = [
    (100.0, 205.0),
    (200.0, 186.0),
    (300.0, 171.0),
    (400.0, 158.0),
    (500.0, 149.0),
    (650.0, 139.0),
    (850.0, 128.0),
    (1000.0, 121.0),
    (1650.0, 100.0),
    (2000.0, 90.0),
    (3000.0, 73.0),
    (4000.0, 65.0),
];

const PRESETS: &[(&str, &[(f64, f64)])] = &[("100-4k", &LADDER_100_TO_4K)];

pub fn names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|(name, _)| *name)
}

pub fn by_name(name: &str) -> Result<Ladder, LadderError> {
    let (label, bands) = PRESETS
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| LadderError::UnknownPreset {
            name: name.to_string(),
            available: names().collect::<Vec<_>>().join(", "),
        })?;
    Ladder::generate(label, bands)
}

pub fn ladder_100_to_4k() -> Ladder {
    // The table above is a valid, strictly decreasing ladder.
    Ladder::generate("100-4k", &LADDER_100_TO_4K).expect("built-in 100-4k ladder is valid")
}
