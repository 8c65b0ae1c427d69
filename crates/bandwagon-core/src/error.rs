use crate::core::digestion::DigestionError;
use crate::core::io::RecordError;
use crate::core::ladder::LadderError;
use crate::core::models::style::StyleError;
use crate::render::RenderError;
use thiserror::Error;

/// Any failure of the library's high-level entry points.
#[derive(Debug, Error)]
pub enum BandwagonError {
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error(transparent)]
    Ladder(#[from] LadderError),
    #[error(transparent)]
    Digestion(#[from] DigestionError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
