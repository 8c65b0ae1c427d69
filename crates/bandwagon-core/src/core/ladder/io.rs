use super::calibration::CalibrationModel;
use super::{Ladder, LadderError};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct LadderFile {
    label: Option<String>,
    #[serde(default)]
    model: CalibrationModel,
    bands: Vec<LadderRow>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LadderRow {
    size: f64,
    migration: f64,
}

/// Loads a ladder from a `.toml` or `.csv` table.
///
/// TOML files carry an optional `label`, an optional calibration `model` and a
/// `[[bands]]` array of `size`/`migration` entries. CSV files have a
/// `size,migration` header. An explicit `model` argument wins over the file's.
/// The label defaults to the file stem.
pub fn load_ladder(path: &Path, model: Option<CalibrationModel>) -> Result<Ladder, LadderError> {
    let path_str = path.to_string_lossy().to_string();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "ladder".to_string());
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    let (label, file_model, rows) = match extension.as_deref() {
        Some("toml") => {
            let content = std::fs::read_to_string(path).map_err(|e| LadderError::Io {
                path: path_str.clone(),
                source: e,
            })?;
            let file: LadderFile = toml::from_str(&content).map_err(|e| LadderError::Toml {
                path: path_str.clone(),
                source: e,
            })?;
            (file.label.unwrap_or(stem), Some(file.model), file.bands)
        }
        Some("csv") => {
            let mut reader = csv::Reader::from_path(path).map_err(|e| LadderError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
            let rows = reader
                .deserialize()
                .collect::<Result<Vec<LadderRow>, _>>()
                .map_err(|e| LadderError::Csv {
                    path: path_str.clone(),
                    source: e,
                })?;
            (stem, None, rows)
        }
        _ => return Err(LadderError::UnsupportedFormat(path.to_path_buf())),
    };

    let model = model.or(file_model).unwrap_or_default();
    let points: Vec<(f64, f64)> = rows.iter().map(|r| (r.size, r.migration)).collect();
    let ladder = Ladder::generate_with_model(&label, &points, model)?;
    info!(path = %path_str, bands = points.len(), %model, "Loaded ladder");
    Ok(ladder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_toml_ladder_with_model() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            r#"
label = "Custom"
model = "log-linear"

[[bands]]
size = 100
migration = 50

[[bands]]
size = 1000
migration = 2
"#,
        )
        .unwrap();

        let ladder = load_ladder(&path, None).unwrap();
        assert_eq!(ladder.label(), Some("Custom"));
        assert_eq!(ladder.model(), CalibrationModel::LogLinear);
        assert_eq!(ladder.migration_distance_span(), (2.0, 50.0));
    }

    #[test]
    fn explicit_model_wins_over_file_model() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            "model = \"log-linear\"\n[[bands]]\nsize = 100\nmigration = 50\n[[bands]]\nsize = 1000\nmigration = 5\n",
        )
        .unwrap();
        let ladder = load_ladder(&path, Some(CalibrationModel::MonotoneSpline)).unwrap();
        assert_eq!(ladder.model(), CalibrationModel::MonotoneSpline);
        assert_eq!(ladder.label(), Some("custom"));
    }

    #[test]
    fn loads_csv_ladder_labelled_by_file_stem() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gel_2024.csv");
        fs::write(&path, "size,migration\n100,40\n500,20\n2000,6\n").unwrap();

        let ladder = load_ladder(&path, None).unwrap();
        assert_eq!(ladder.label(), Some("gel_2024"));
        assert_eq!(ladder.model(), CalibrationModel::Linear);
        assert_eq!(ladder.dna_size_span(), (100.0, 2000.0));
    }

    #[test]
    fn reports_typed_errors() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("missing.toml");
        assert!(matches!(load_ladder(&missing, None), Err(LadderError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "bands = 3").unwrap();
        assert!(matches!(load_ladder(&broken, None), Err(LadderError::Toml { .. })));

        let bad_csv = dir.path().join("bad.csv");
        fs::write(&bad_csv, "size,migration\n100,abc\n").unwrap();
        assert!(matches!(load_ladder(&bad_csv, None), Err(LadderError::Csv { .. })));

        let other = dir.path().join("ladder.json");
        assert!(matches!(
            load_ladder(&other, None),
            Err(LadderError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn rejects_single_band_tables() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.csv");
        fs::write(&path, "size,migration\n100,40\n").unwrap();
        assert!(matches!(
            load_ladder(&path, None),
            Err(LadderError::Pattern(_))
        ));
    }
}
