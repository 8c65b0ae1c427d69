use bandwagon::core::ladder::Ladder;
use bandwagon::core::models::style::Color;
use bandwagon::render::RenderOptions;

/// A lane given as plain fragment sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternConfig {
    pub label: Option<String>,
    pub sizes: Vec<f64>,
    pub background_color: Option<Color>,
}

pub struct AppConfig {
    pub ladder: Ladder,
    pub render: RenderOptions,
    /// `None` leaves the left axis without size ticks.
    pub ticks: Option<usize>,
    pub patterns: Vec<PatternConfig>,
}
