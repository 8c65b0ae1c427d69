use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidKeyValue(String),

    #[error("Invalid pattern '{0}'. Expected 'LABEL:SIZE,SIZE,...' or 'SIZE,SIZE,...'.")]
    InvalidPattern(String),

    #[error("Invalid fragment size '{size}' in pattern '{pattern}'.")]
    InvalidSize { size: String, pattern: String },
}

/// Splits `key=value` at the first `=`.
pub fn parse_key_value(input: &str) -> Result<(&str, &str), ParseError> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(ParseError::InvalidKeyValue(input.to_string())),
    }
}

/// Parses a lane given as `LABEL:500,1200` or as bare sizes `500,1200`.
pub fn parse_pattern(input: &str) -> Result<(Option<String>, Vec<f64>), ParseError> {
    let (label, sizes) = match input.rsplit_once(':') {
        Some((label, sizes)) => (Some(label.trim().to_string()).filter(|l| !l.is_empty()), sizes),
        None => (None, input),
    };
    let sizes = sizes
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .ok()
                .filter(|size| size.is_finite() && *size > 0.0)
                .ok_or_else(|| ParseError::InvalidSize {
                    size: s.to_string(),
                    pattern: input.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if sizes.is_empty() {
        return Err(ParseError::InvalidPattern(input.to_string()));
    }
    Ok((label, sizes))
}

/// Whether a `--ladder` value names a file rather than a built-in preset.
pub fn looks_like_path(name_or_path: &str) -> bool {
    let path = Path::new(name_or_path);
    path.is_absolute()
        || name_or_path.contains(['/', '\\'])
        || matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("toml" | "csv")
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_values_split_at_first_equals() {
        assert_eq!(parse_key_value("ladder.name=100-4k"), Ok(("ladder.name", "100-4k")));
        assert_eq!(parse_key_value("a = b=c"), Ok(("a", "b=c")));
        assert_eq!(
            parse_key_value("ticks.count"),
            Err(ParseError::InvalidKeyValue("ticks.count".to_string()))
        );
        assert!(parse_key_value("=5").is_err());
    }

    #[test]
    fn patterns_take_an_optional_label() {
        assert_eq!(
            parse_pattern("EcoRI:500, 1200"),
            Ok((Some("EcoRI".to_string()), vec![500.0, 1200.0]))
        );
        assert_eq!(parse_pattern("300,250"), Ok((None, vec![300.0, 250.0])));
        assert_eq!(
            parse_pattern("Lane 1:"),
            Err(ParseError::InvalidPattern("Lane 1:".to_string()))
        );
        assert_eq!(
            parse_pattern("A:500,abc"),
            Err(ParseError::InvalidSize {
                size: "abc".to_string(),
                pattern: "A:500,abc".to_string(),
            })
        );
        assert!(parse_pattern("A:-5").is_err());
    }

    #[test]
    fn ladder_paths_are_told_apart_from_presets() {
        assert!(looks_like_path("ladders/custom.toml"));
        assert!(looks_like_path("custom.csv"));
        assert!(looks_like_path("/tmp/ladder"));
        assert!(!looks_like_path("100-4k"));
    }
}
