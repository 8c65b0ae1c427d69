use super::scene::{HAnchor, Line, Primitive, Raster, Rect, Scene, Text, VAnchor};
use super::{RenderError, RenderOptions};
use crate::core::models::style::Color;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontStyle, FontTransform, RGBAColor, register_font};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

const FONT_FAMILY: &str = "sans-serif";
const DASH_LENGTH: f64 = 2.0;
const DASH_GAP: f64 = 3.0;

const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Path of the font currently registered with plotters, if any.
static REGISTERED_FONT: Mutex<Option<PathBuf>> = Mutex::new(None);

fn font_candidates(options: &RenderOptions) -> impl Iterator<Item = PathBuf> + '_ {
    options
        .font_path
        .iter()
        .cloned()
        .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from))
}

/// Picks the first candidate that is already registered or that `load`
/// manages to register, and records it in `registered`.
fn select_font<I, F>(registered: &mut Option<PathBuf>, candidates: I, mut load: F) -> bool
where
    I: IntoIterator<Item = PathBuf>,
    F: FnMut(&Path) -> bool,
{
    for path in candidates {
        if registered.as_deref() == Some(path.as_path()) {
            return true;
        }
        if load(&path) {
            *registered = Some(path);
            return true;
        }
    }
    false
}

fn register_font_file(path: &Path) -> bool {
    let Ok(bytes) = std::fs::read(path) else {
        return false;
    };
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    let registered = register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok()
        && register_font(FONT_FAMILY, FontStyle::Bold, bytes).is_ok();
    if registered {
        debug!(font = %path.display(), "Registered PNG font");
    }
    registered
}

/// Makes the preferred readable font the one plotters draws with. A font is
/// loaded again only when a different path is requested.
fn ensure_font(options: &RenderOptions) -> bool {
    let mut registered = REGISTERED_FONT.lock().unwrap_or_else(|e| e.into_inner());
    select_font(&mut *registered, font_candidates(options), register_font_file)
}

fn rgba(color: Color, opacity: f64) -> RGBAColor {
    RGBAColor(color.r, color.g, color.b, color.alpha() * opacity)
}

fn px(value: f64) -> i32 {
    value.round() as i32
}

/// Rotations snap to the nearest quarter turn.
fn font_transform(rotation: f64) -> FontTransform {
    match rotation.rem_euclid(360.0) {
        r if !(45.0..315.0).contains(&r) => FontTransform::None,
        r if r < 135.0 => FontTransform::Rotate270,
        r if r < 225.0 => FontTransform::Rotate180,
        _ => FontTransform::Rotate90,
    }
}

fn snapped_degrees(rotation: f64) -> f64 {
    match font_transform(rotation) {
        FontTransform::Rotate270 => 90.0,
        FontTransform::Rotate180 => 180.0,
        FontTransform::Rotate90 => 270.0,
        _ => 0.0,
    }
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, plotters::coord::Shift>;

fn draw_rect(area: &Area, rect: &Rect) -> Result<(), RenderError> {
    let style = ShapeStyle {
        color: rgba(rect.fill, rect.opacity),
        filled: true,
        stroke_width: 0,
    };
    area.draw(&Rectangle::new(
        [
            (px(rect.x), px(rect.y)),
            (px(rect.x + rect.width), px(rect.y + rect.height)),
        ],
        style,
    ))
    .map_err(|e| RenderError::Png(e.to_string()))
}

fn draw_line(area: &Area, line: &Line) -> Result<(), RenderError> {
    let style = ShapeStyle {
        color: rgba(line.color, 1.0),
        filled: false,
        stroke_width: line.width.round().max(1.0) as u32,
    };
    let segments = if line.dashed {
        let length = (line.x2 - line.x1).hypot(line.y2 - line.y1);
        let (ux, uy) = if length > 0.0 {
            ((line.x2 - line.x1) / length, (line.y2 - line.y1) / length)
        } else {
            (0.0, 0.0)
        };
        let mut dashes = Vec::new();
        let mut t = 0.0;
        while t < length {
            let end = (t + DASH_LENGTH).min(length);
            dashes.push((
                (line.x1 + ux * t, line.y1 + uy * t),
                (line.x1 + ux * end, line.y1 + uy * end),
            ));
            t += DASH_LENGTH + DASH_GAP;
        }
        dashes
    } else {
        vec![((line.x1, line.y1), (line.x2, line.y2))]
    };
    for (from, to) in segments {
        area.draw(&PathElement::new(
            vec![(px(from.0), px(from.1)), (px(to.0), px(to.1))],
            style,
        ))
        .map_err(|e| RenderError::Png(e.to_string()))?;
    }
    Ok(())
}

/// Axis-aligned bounds of a box given in the text frame, after rotation
/// around the anchor.
fn rotated_bounds(text: &Text, (bx, by, bw, bh): (f64, f64, f64, f64)) -> (f64, f64, f64, f64) {
    let theta = snapped_degrees(text.font.rotation).to_radians();
    let (sin, cos) = theta.sin_cos();
    let corners = [(bx, by), (bx + bw, by), (bx, by + bh), (bx + bw, by + bh)];
    let rotated = corners.map(|(dx, dy)| (dx * cos + dy * sin, -dx * sin + dy * cos));
    let min_x = rotated.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_x = rotated.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let min_y = rotated.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_y = rotated.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    (text.x + min_x, text.y + min_y, max_x - min_x, max_y - min_y)
}

fn draw_text(area: &Area, text: &Text) -> Result<(), RenderError> {
    if let Some(background) = text.background {
        let (x, y, width, height) = rotated_bounds(text, text.background_box());
        draw_rect(
            area,
            &Rect::new(x, y, width, height, background).with_corner_radius(height / 4.0),
        )?;
    }
    let pos = Pos::new(
        match text.h_anchor {
            HAnchor::Start => HPos::Left,
            HAnchor::Middle => HPos::Center,
            HAnchor::End => HPos::Right,
        },
        match text.v_anchor {
            VAnchor::Top => VPos::Top,
            VAnchor::Middle => VPos::Center,
            VAnchor::Bottom => VPos::Bottom,
        },
    );
    let font_style = if text.font.is_bold() {
        FontStyle::Bold
    } else {
        FontStyle::Normal
    };
    let style = (FONT_FAMILY, text.font.size)
        .into_font()
        .style(font_style)
        .transform(font_transform(text.font.rotation))
        .color(&rgba(text.font.color, 1.0))
        .pos(pos);
    area.draw_text(&text.content, &style, (px(text.x), px(text.y)))
        .map_err(|e| RenderError::Png(e.to_string()))
}

fn draw_raster(area: &Area, raster: &Raster) -> Result<(), RenderError> {
    let image = &raster.image;
    let (width, height) = (raster.width.round() as usize, raster.height.round() as usize);
    if image.width() == 0 || image.height() == 0 {
        return Ok(());
    }
    for y in 0..height {
        let source_y = (y * image.height() / height.max(1)).min(image.height() - 1);
        for x in 0..width {
            let source_x = (x * image.width() / width.max(1)).min(image.width() - 1);
            let value = image.pixel(source_x, source_y).unwrap_or(255);
            area.draw_pixel(
                (px(raster.x) + x as i32, px(raster.y) + y as i32),
                &RGBColor(value, value, value),
            )
            .map_err(|e| RenderError::Png(e.to_string()))?;
        }
    }
    Ok(())
}

/// Paints a scene into a PNG file. Text needs a TrueType font from
/// `options.font_path` or a usual system location; without one, text is left
/// out and a warning is logged.
pub fn write_png(scene: &Scene, path: &Path, options: &RenderOptions) -> Result<(), RenderError> {
    let size = (scene.width.ceil() as u32, scene.height.ceil() as u32);
    let area = BitMapBackend::new(path, size).into_drawing_area();
    area.fill(&WHITE).map_err(|e| RenderError::Png(e.to_string()))?;

    let has_text = scene.texts().next().is_some();
    let font_available = has_text && ensure_font(options);
    if has_text && !font_available {
        warn!("No TrueType font found for PNG output; text is omitted. Set a font path to include it.");
    }

    for primitive in &scene.primitives {
        match primitive {
            Primitive::Rect(rect) => draw_rect(&area, rect)?,
            Primitive::Line(line) => draw_line(&area, line)?,
            Primitive::Text(text) if font_available => draw_text(&area, text)?,
            Primitive::Text(_) => {}
            Primitive::Raster(raster) => draw_raster(&area, raster)?,
        }
    }
    area.present().map_err(|e| RenderError::Png(e.to_string()))?;
    debug!(path = %path.display(), width = size.0, height = size.1, "Wrote PNG");
    Ok(())
}
