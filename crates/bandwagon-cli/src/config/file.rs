use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileLadderConfig {
    pub name: Option<String>,
    pub path: Option<PathBuf>,
    pub model: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileRenderConfig {
    pub column_width: Option<f64>,
    pub plot_height: Option<f64>,
    pub font_path: Option<PathBuf>,
    pub max_visible_patterns: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileTicksConfig {
    pub count: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilePatternConfig {
    pub label: Option<String>,
    pub sizes: Vec<f64>,
    pub background_color: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub ladder: Option<FileLadderConfig>,
    pub render: Option<FileRenderConfig>,
    pub ticks: Option<FileTicksConfig>,
    #[serde(default)]
    pub patterns: Vec<FilePatternConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
