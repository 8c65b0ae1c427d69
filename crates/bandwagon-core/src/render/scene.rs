use crate::core::models::band::BandJson;
use crate::core::models::gel_image::GelImage;
use crate::core::models::style::{Color, FontSpec};

/// Average glyph advance as a fraction of the font size, used wherever text
/// extents must be known without a font rasterizer.
const GLYPH_WIDTH_RATIO: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAnchor {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Color,
    pub opacity: f64,
    pub corner_radius: f64,
    /// Tooltip shown by interactive backends.
    pub html: Option<String>,
    /// The band this rectangle draws, embedded by the interactive page.
    pub band: Option<BandJson>,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64, fill: Color) -> Self {
        Self {
            x,
            y,
            width,
            height,
            fill,
            opacity: 1.0,
            corner_radius: 0.0,
            html: None,
            band: None,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_band(mut self, band: BandJson) -> Self {
        self.band = Some(band);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub color: Color,
    pub width: f64,
    pub dashed: bool,
}

impl Line {
    pub fn new(from: (f64, f64), to: (f64, f64), color: Color, width: f64) -> Self {
        Self {
            x1: from.0,
            y1: from.1,
            x2: to.0,
            y2: to.1,
            color,
            width,
            dashed: false,
        }
    }

    pub fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }
}

/// A text run. `font.size` is already in pixels; `font.rotation` turns the run
/// counter-clockwise around the anchor point.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub x: f64,
    pub y: f64,
    pub content: String,
    pub font: FontSpec,
    pub h_anchor: HAnchor,
    pub v_anchor: VAnchor,
    /// Fill of a rounded box drawn behind the text.
    pub background: Option<Color>,
}

impl Text {
    pub fn new(x: f64, y: f64, content: impl Into<String>, font: FontSpec) -> Self {
        Self {
            x,
            y,
            content: content.into(),
            font,
            h_anchor: HAnchor::Middle,
            v_anchor: VAnchor::Middle,
            background: None,
        }
    }

    pub fn anchored(mut self, h_anchor: HAnchor, v_anchor: VAnchor) -> Self {
        self.h_anchor = h_anchor;
        self.v_anchor = v_anchor;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Estimated `(width, height)` of the unrotated run.
    pub fn extent(&self) -> (f64, f64) {
        let chars = self.content.chars().count() as f64;
        (chars * self.font.size * GLYPH_WIDTH_RATIO, self.font.size)
    }

    /// Offset from the anchor point to the top-left corner of the unrotated
    /// text box, in the text's own frame.
    pub fn anchor_offset(&self) -> (f64, f64) {
        let (width, height) = self.extent();
        let dx = match self.h_anchor {
            HAnchor::Start => 0.0,
            HAnchor::Middle => -width / 2.0,
            HAnchor::End => -width,
        };
        let dy = match self.v_anchor {
            VAnchor::Top => 0.0,
            VAnchor::Middle => -height / 2.0,
            VAnchor::Bottom => -height,
        };
        (dx, dy)
    }

    /// Padded box drawn behind the text, in the text's own frame relative to
    /// the anchor point: `(x, y, width, height)`.
    pub fn background_box(&self) -> (f64, f64, f64, f64) {
        let (width, height) = self.extent();
        let (dx, dy) = self.anchor_offset();
        let pad = height * 0.25;
        (dx - pad, dy - pad, width + 2.0 * pad, height + 2.0 * pad)
    }
}

/// A grayscale picture stretched over a rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub image: GelImage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect(Rect),
    Line(Line),
    Text(Text),
    Raster(Raster),
}

impl Primitive {
    fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Primitive::Rect(r) => {
                r.x += dx;
                r.y += dy;
            }
            Primitive::Line(l) => {
                l.x1 += dx;
                l.x2 += dx;
                l.y1 += dy;
                l.y2 += dy;
            }
            Primitive::Text(t) => {
                t.x += dx;
                t.y += dy;
            }
            Primitive::Raster(r) => {
                r.x += dx;
                r.y += dy;
            }
        }
    }
}

impl From<Rect> for Primitive {
    fn from(rect: Rect) -> Self {
        Primitive::Rect(rect)
    }
}

impl From<Line> for Primitive {
    fn from(line: Line) -> Self {
        Primitive::Line(line)
    }
}

impl From<Text> for Primitive {
    fn from(text: Text) -> Self {
        Primitive::Text(text)
    }
}

impl From<Raster> for Primitive {
    fn from(raster: Raster) -> Self {
        Primitive::Raster(raster)
    }
}

/// A drawing in pixel coordinates, y pointing down. Primitives are painted in
/// order, later ones on top.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            primitives: Vec::new(),
        }
    }

    pub fn push(&mut self, primitive: impl Into<Primitive>) {
        self.primitives.push(primitive.into());
    }

    /// Copies every primitive of `other` into this scene, shifted by `(dx, dy)`.
    pub fn place(&mut self, other: &Scene, dx: f64, dy: f64) {
        self.primitives.extend(other.primitives.iter().cloned().map(|mut p| {
            p.translate(dx, dy);
            p
        }));
    }

    pub fn rects(&self) -> impl Iterator<Item = &Rect> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Rect(r) => Some(r),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Line(l) => Some(l),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &Text> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn rasters(&self) -> impl Iterator<Item = &Raster> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Raster(r) => Some(r),
            _ => None,
        })
    }
}
