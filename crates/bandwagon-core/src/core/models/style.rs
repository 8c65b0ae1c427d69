use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StyleError {
    #[error("Invalid color '{0}': expected #rgb, #rrggbb, #rrggbbaa or a known color name")]
    InvalidColor(String),
    #[error("Invalid font weight '{0}': expected 'normal' or 'bold'")]
    InvalidWeight(String),
}

static NAMED_COLORS: Map<&'static str, [u8; 3]> = phf_map! {
    "k" => [0, 0, 0],
    "w" => [255, 255, 255],
    "r" => [255, 0, 0],
    "g" => [0, 128, 0],
    "b" => [0, 0, 255],
    "c" => [0, 191, 191],
    "m" => [191, 0, 191],
    "y" => [191, 191, 0],
    "black" => [0, 0, 0],
    "white" => [255, 255, 255],
    "red" => [255, 0, 0],
    "darkred" => [139, 0, 0],
    "green" => [0, 128, 0],
    "darkgreen" => [0, 100, 0],
    "lightgreen" => [144, 238, 144],
    "blue" => [0, 0, 255],
    "darkblue" => [0, 0, 139],
    "lightblue" => [173, 216, 230],
    "navy" => [0, 0, 128],
    "skyblue" => [135, 206, 235],
    "cyan" => [0, 255, 255],
    "magenta" => [255, 0, 255],
    "yellow" => [255, 255, 0],
    "orange" => [255, 165, 0],
    "purple" => [128, 0, 128],
    "pink" => [255, 192, 203],
    "brown" => [165, 42, 42],
    "gold" => [255, 215, 0],
    "grey" => [128, 128, 128],
    "gray" => [128, 128, 128],
    "lightgrey" => [211, 211, 211],
    "lightgray" => [211, 211, 211],
    "darkgrey" => [169, 169, 169],
    "darkgray" => [169, 169, 169],
    "silver" => [192, 192, 192],
    "teal" => [0, 128, 128],
    "olive" => [128, 128, 0],
    "maroon" => [128, 0, 0],
    "salmon" => [250, 128, 114],
    "coral" => [255, 127, 80],
    "tomato" => [255, 99, 71],
    "crimson" => [220, 20, 60],
    "indigo" => [75, 0, 130],
    "violet" => [238, 130, 238],
    "khaki" => [240, 230, 140],
    "beige" => [245, 245, 220],
    "ivory" => [255, 255, 240],
    "lavender" => [230, 230, 250],
};

/// An sRGB color with an alpha channel.
///
/// Colors deserialize from (and serialize to) their textual form, so config
/// files can write `background-color = "#e2edff"` or `color = "darkred"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn parse(value: &str) -> Result<Self, StyleError> {
        let trimmed = value.trim();
        let invalid = || StyleError::InvalidColor(value.to_string());

        if let Some(hex) = trimmed.strip_prefix('#') {
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
            return match hex.len() {
                3 => {
                    let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                    Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
                }
                6 => Ok(Self::rgb(
                    channel(&hex[0..2])?,
                    channel(&hex[2..4])?,
                    channel(&hex[4..6])?,
                )),
                8 => Ok(Self {
                    r: channel(&hex[0..2])?,
                    g: channel(&hex[2..4])?,
                    b: channel(&hex[4..6])?,
                    a: channel(&hex[6..8])?,
                }),
                _ => Err(invalid()),
            };
        }

        NAMED_COLORS
            .get(trimmed.to_ascii_lowercase().as_str())
            .map(|[r, g, b]| Self::rgb(*r, *g, *b))
            .ok_or_else(invalid)
    }

    /// Lowercase `#rrggbb`, with `aa` appended only for translucent colors.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Relative luminance in `[0, 1]` (ITU-R BT.709 weights on linearized channels).
    pub fn luminance(&self) -> f64 {
        let linear = |c: u8| {
            let c = c as f64 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FromStr for FontWeight {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "bold" => Ok(Self::Bold),
            _ => Err(StyleError::InvalidWeight(s.to_string())),
        }
    }
}

/// A fully resolved text style. `size` is in points and `rotation` in degrees,
/// counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub size: f64,
    pub weight: FontWeight,
    pub family: String,
    pub color: Color,
    pub rotation: f64,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            size: 10.0,
            weight: FontWeight::Normal,
            family: "sans-serif".to_string(),
            color: Color::BLACK,
            rotation: 0.0,
        }
    }
}

impl FontSpec {
    pub fn band_label() -> Self {
        Self {
            size: 10.0,
            weight: FontWeight::Bold,
            color: Color::WHITE,
            ..Self::default()
        }
    }

    pub fn pattern_label() -> Self {
        Self {
            size: 11.0,
            weight: FontWeight::Bold,
            rotation: 90.0,
            ..Self::default()
        }
    }

    pub fn corner_note() -> Self {
        Self {
            size: 5.5,
            rotation: 90.0,
            ..Self::default()
        }
    }

    pub fn set_label() -> Self {
        Self {
            size: 12.0,
            weight: FontWeight::Bold,
            rotation: 90.0,
            ..Self::default()
        }
    }

    pub fn ticks() -> Self {
        Self {
            size: 7.0,
            rotation: 90.0,
            ..Self::default()
        }
    }

    pub fn merged(&self, overrides: &FontOverrides) -> Self {
        Self {
            size: overrides.size.unwrap_or(self.size),
            weight: overrides.weight.unwrap_or(self.weight),
            family: overrides
                .family
                .clone()
                .unwrap_or_else(|| self.family.clone()),
            color: overrides.color.unwrap_or(self.color),
            rotation: overrides.rotation.unwrap_or(self.rotation),
        }
    }

    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }
}

/// Partial font settings. Unset fields fall back to whatever they are merged onto.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FontOverrides {
    pub size: Option<f64>,
    pub weight: Option<FontWeight>,
    pub family: Option<String>,
    pub color: Option<Color>,
    pub rotation: Option<f64>,
}

impl FontOverrides {
    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Layers `other` on top of `self`; fields set in `other` win.
    pub fn then(&self, other: &FontOverrides) -> Self {
        Self {
            size: other.size.or(self.size),
            weight: other.weight.or(self.weight),
            family: other.family.clone().or_else(|| self.family.clone()),
            color: other.color.or(self.color),
            rotation: other.rotation.or(self.rotation),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors_of_every_length() {
        assert_eq!(Color::parse("#e2edff").unwrap(), Color::rgb(0xe2, 0xed, 0xff));
        assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
        let translucent = Color::parse("#11223380").unwrap();
        assert_eq!(translucent.a, 0x80);
        assert_eq!(translucent.to_hex(), "#11223380");
    }

    #[test]
    fn parses_named_colors_case_insensitively() {
        assert_eq!(Color::parse("DarkRed").unwrap(), Color::rgb(139, 0, 0));
        assert_eq!(Color::parse("k").unwrap(), Color::BLACK);
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(matches!(
            Color::parse("#12345"),
            Err(StyleError::InvalidColor(_))
        ));
        assert!(Color::parse("#zzzzzz").is_err());
        assert!(Color::parse("not-a-color").is_err());
    }

    #[test]
    fn color_hex_form_is_lowercase_without_opaque_alpha() {
        assert_eq!(Color::parse("#8B0000").unwrap().to_hex(), "#8b0000");
    }

    #[test]
    fn luminance_orders_black_below_white() {
        assert_eq!(Color::BLACK.luminance(), 0.0);
        assert!((Color::WHITE.luminance() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn color_deserializes_from_toml_string() {
        #[derive(Deserialize)]
        struct Holder {
            color: Color,
        }
        let holder: Holder = toml::from_str("color = \"#fffae2\"").unwrap();
        assert_eq!(holder.color, Color::rgb(0xff, 0xfa, 0xe2));
        assert!(toml::from_str::<Holder>("color = \"nope\"").is_err());
    }

    #[test]
    fn merged_font_keeps_defaults_for_unset_fields() {
        let merged = FontSpec::pattern_label().merged(&FontOverrides::default().size(6.0));
        assert_eq!(merged.size, 6.0);
        assert_eq!(merged.rotation, 90.0);
        assert!(merged.is_bold());
    }

    #[test]
    fn later_overrides_win_when_layered() {
        let base = FontOverrides::default().size(9.0).rotation(70.0);
        let top = FontOverrides::default().size(6.0);
        let layered = base.then(&top);
        assert_eq!(layered.size, Some(6.0));
        assert_eq!(layered.rotation, Some(70.0));
    }

    #[test]
    fn font_weight_parses_from_text() {
        assert_eq!("BOLD".parse::<FontWeight>().unwrap(), FontWeight::Bold);
        assert!("heavy".parse::<FontWeight>().is_err());
    }
}
