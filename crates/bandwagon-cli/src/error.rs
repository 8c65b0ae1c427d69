use bandwagon::BandwagonError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BandwagonError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

macro_rules! core_error {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for CliError {
                fn from(e: $source) -> Self {
                    CliError::Core(e.into())
                }
            }
        )*
    };
}

core_error!(
    bandwagon::core::models::style::StyleError,
    bandwagon::core::ladder::LadderError,
    bandwagon::core::digestion::DigestionError,
    bandwagon::core::io::RecordError,
    bandwagon::render::RenderError,
);
