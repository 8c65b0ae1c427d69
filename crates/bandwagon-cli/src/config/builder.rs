use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileLadderConfig, FilePatternConfig};
use super::models::{AppConfig, PatternConfig};
use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use bandwagon::core::ladder::calibration::CalibrationModel;
use bandwagon::core::ladder::io::load_ladder;
use bandwagon::core::ladder::{Ladder, presets};
use bandwagon::core::models::style::Color;
use std::path::PathBuf;
use tracing::{debug, info};

/// Values given through dedicated command-line flags of a subcommand.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub ticks: Option<usize>,
    /// Lanes appended after the ones from the config file.
    pub patterns: Vec<FilePatternConfig>,
}

/// Layers built-in defaults, the config file, command-line flags and `--set`
/// values (in increasing precedence) into the settings of one run.
pub fn build_config(args: &ConfigArgs, overrides: &CliOverrides) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let file_config = apply_cli_flags(file_config, args, overrides);
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let ladder = resolve_ladder(file_config.ladder.take().unwrap_or_default(), &defaults)?;

    let render_file = file_config.render.take().unwrap_or_default();
    let mut render = defaults.render;
    if let Some(width) = render_file.column_width {
        render = render.with_column_width(positive(width, "render.column-width")?);
    }
    if let Some(height) = render_file.plot_height {
        render = render.with_plot_height(positive(height, "render.plot-height")?);
    }
    if let Some(count) = render_file.max_visible_patterns {
        render = render.with_max_visible_patterns(count);
    }
    if let Some(path) = render_file.font_path {
        render = render.with_font_path(path);
    }

    let ticks = file_config.ticks.and_then(|t| t.count).filter(|&count| count > 0);

    let patterns = file_config
        .patterns
        .into_iter()
        .map(|p| {
            let background_color = p.background_color.as_deref().map(Color::parse).transpose()?;
            Ok(PatternConfig {
                label: p.label,
                sizes: p.sizes,
                background_color,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        ladder = ?ladder.label(),
        model = %ladder.model(),
        patterns = patterns.len(),
        "Configuration resolved"
    );

    Ok(AppConfig {
        ladder,
        render,
        ticks,
        patterns,
    })
}

fn positive(value: f64, key: &str) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CliError::Config(format!("`{key}` must be positive, got {value}")))
    }
}

fn set_ladder_source(ladder: &mut FileLadderConfig, name_or_path: &str) {
    if parser::looks_like_path(name_or_path) {
        ladder.path = Some(PathBuf::from(name_or_path));
        ladder.name = None;
    } else {
        ladder.name = Some(name_or_path.to_string());
        ladder.path = None;
    }
}

fn apply_cli_flags(mut config: FileConfig, args: &ConfigArgs, overrides: &CliOverrides) -> FileConfig {
    if let Some(name_or_path) = &args.ladder {
        set_ladder_source(config.ladder.get_or_insert_with(Default::default), name_or_path);
    }
    if let Some(model) = &args.ladder_model {
        config.ladder.get_or_insert_with(Default::default).model = Some(model.clone());
    }
    if let Some(path) = &args.font_path {
        config.render.get_or_insert_with(Default::default).font_path = Some(path.clone());
    }
    if let Some(count) = overrides.ticks {
        config.ticks.get_or_insert_with(Default::default).count = Some(count);
    }
    config.patterns.extend(overrides.patterns.iter().cloned());
    config
}

fn resolve_ladder(file: FileLadderConfig, defaults: &DefaultsConfig) -> Result<Ladder> {
    let model = file
        .model
        .as_deref()
        .map(str::parse::<CalibrationModel>)
        .transpose()
        .map_err(CliError::Config)?;

    match (file.path, file.name) {
        (Some(_), Some(_)) => Err(CliError::Config(
            "Set either `ladder.name` or `ladder.path`, not both.".to_string(),
        )),
        (Some(path), None) => {
            info!("Loading ladder from {:?}", path);
            Ok(load_ladder(&path, model)?)
        }
        (None, name) => {
            let name = name.unwrap_or_else(|| defaults.ladder.clone());
            let ladder = presets::by_name(&name)?;
            Ok(match model {
                Some(model) => ladder.with_model(model)?,
                None => ladder,
            })
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {kind} value for {key}: {value}")))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value) =
            parser::parse_key_value(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;

        match key {
            "ladder.name" | "ladder.path" => {
                let ladder = config.ladder.get_or_insert_with(Default::default);
                if key == "ladder.path" {
                    ladder.path = Some(PathBuf::from(value));
                    ladder.name = None;
                } else {
                    ladder.name = Some(value.to_string());
                    ladder.path = None;
                }
            }
            "ladder.model" => {
                config.ladder.get_or_insert_with(Default::default).model = Some(value.to_string());
            }
            "render.column-width" => {
                config.render.get_or_insert_with(Default::default).column_width =
                    Some(parse_value(key, value, "float")?);
            }
            "render.plot-height" => {
                config.render.get_or_insert_with(Default::default).plot_height =
                    Some(parse_value(key, value, "float")?);
            }
            "render.max-visible-patterns" => {
                config.render.get_or_insert_with(Default::default).max_visible_patterns =
                    Some(parse_value(key, value, "integer")?);
            }
            "render.font-path" => {
                config.render.get_or_insert_with(Default::default).font_path = Some(PathBuf::from(value));
            }
            "ticks.count" => {
                config.ticks.get_or_insert_with(Default::default).count =
                    Some(parse_value(key, value, "integer")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args_with_config(content: &str) -> (tempfile::TempDir, ConfigArgs) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bandwagon.toml");
        fs::write(&path, content).unwrap();
        let args = ConfigArgs {
            config: Some(path),
            ..ConfigArgs::default()
        };
        (dir, args)
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let app = build_config(&ConfigArgs::default(), &CliOverrides::default()).unwrap();
        assert_eq!(app.ladder.label(), Some("100-4k"));
        assert_eq!(app.render.column_width, 60.0);
        assert_eq!(app.render.plot_height, 400.0);
        assert_eq!(app.ticks, None);
        assert!(app.patterns.is_empty());
    }

    #[test]
    fn file_values_override_defaults() {
        let (_dir, args) = args_with_config(
            r##"
            [ladder]
            model = "linear"
            [render]
            column-width = 80
            [ticks]
            count = 4
            [[patterns]]
            label = "EcoRI"
            sizes = [500, 1200]
            background-color = "#fffae2"
            "##,
        );
        let app = build_config(&args, &CliOverrides::default()).unwrap();
        assert_eq!(app.ladder.model(), CalibrationModel::Linear);
        assert_eq!(app.render.column_width, 80.0);
        assert_eq!(app.render.plot_height, 400.0);
        assert_eq!(app.ticks, Some(4));
        assert_eq!(app.patterns[0].label.as_deref(), Some("EcoRI"));
        assert_eq!(app.patterns[0].background_color, Some(Color::rgb(0xff, 0xfa, 0xe2)));
    }

    #[test]
    fn cli_flags_override_file_values() {
        let (_dir, mut args) = args_with_config("[ticks]\ncount = 4\n[ladder]\nmodel = \"linear\"\n");
        args.ladder_model = Some("exponential".to_string());
        let overrides = CliOverrides {
            ticks: Some(6),
            patterns: vec![FilePatternConfig {
                label: Some("cli".to_string()),
                sizes: vec![700.0],
                background_color: None,
            }],
        };
        let app = build_config(&args, &overrides).unwrap();
        assert_eq!(app.ticks, Some(6));
        assert_eq!(app.ladder.model(), CalibrationModel::Exponential);
        assert_eq!(app.patterns.len(), 1);
        assert_eq!(app.patterns[0].sizes, vec![700.0]);
    }

    #[test]
    fn set_values_override_cli_flags() {
        let (_dir, mut args) = args_with_config("[render]\nplot-height = 300\n");
        args.ladder_model = Some("exponential".to_string());
        args.set_values = vec![
            "ladder.model=log-linear".to_string(),
            "render.plot-height=250".to_string(),
            "render.column-width=45.5".to_string(),
            "ticks.count=3".to_string(),
        ];
        let overrides = CliOverrides {
            ticks: Some(6),
            ..CliOverrides::default()
        };
        let app = build_config(&args, &overrides).unwrap();
        assert_eq!(app.ladder.model(), CalibrationModel::LogLinear);
        assert_eq!(app.render.plot_height, 250.0);
        assert_eq!(app.render.column_width, 45.5);
        assert_eq!(app.ticks, Some(3));
    }

    #[test]
    fn ladder_path_replaces_preset() {
        let dir = tempdir().unwrap();
        let ladder_path = dir.path().join("mini.csv");
        fs::write(&ladder_path, "size,migration\n3000,20\n1000,60\n500,90\n100,150\n").unwrap();
        let args = ConfigArgs {
            ladder: Some(ladder_path.to_string_lossy().to_string()),
            ..ConfigArgs::default()
        };
        let app = build_config(&args, &CliOverrides::default()).unwrap();
        assert_eq!(app.ladder.label(), Some("mini"));
        assert_eq!(app.ladder.dna_size_span(), (100.0, 3000.0));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let bad_key = ConfigArgs {
            set_values: vec!["render.colour=red".to_string()],
            ..ConfigArgs::default()
        };
        assert!(matches!(
            build_config(&bad_key, &CliOverrides::default()),
            Err(CliError::Config(_))
        ));

        let bad_number = ConfigArgs {
            set_values: vec!["ticks.count=many".to_string()],
            ..ConfigArgs::default()
        };
        assert!(matches!(
            build_config(&bad_number, &CliOverrides::default()),
            Err(CliError::Config(_))
        ));

        let bad_model = ConfigArgs {
            ladder_model: Some("cubic".to_string()),
            ..ConfigArgs::default()
        };
        assert!(matches!(
            build_config(&bad_model, &CliOverrides::default()),
            Err(CliError::Config(_))
        ));

        let (_dir, both) = args_with_config("[ladder]\nname = \"100-4k\"\npath = \"x.csv\"\n");
        assert!(matches!(
            build_config(&both, &CliOverrides::default()),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn unknown_presets_surface_the_ladder_error() {
        let args = ConfigArgs {
            ladder: Some("1kb-plus".to_string()),
            ..ConfigArgs::default()
        };
        assert!(matches!(
            build_config(&args, &CliOverrides::default()),
            Err(CliError::Core(_))
        ));
    }
}
