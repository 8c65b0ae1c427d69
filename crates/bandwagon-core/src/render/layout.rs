use super::scene::{HAnchor, Line, Raster, Rect, Scene, Text, VAnchor};
use super::{RenderError, RenderOptions};
use crate::core::models::pattern::BandsPattern;
use crate::core::models::pattern_set::BandsPatternsSet;
use crate::core::models::style::{Color, FontSpec};
use tracing::debug;

/// The plot extends this far below the deepest ladder band.
const PLOT_DEPTH_FACTOR: f64 = 1.1;
const UNCUT_OPACITY: f64 = 0.5;
/// Column offset of slanted pattern labels, so they start left of the lane centre.
const SLANTED_LABEL_SHIFT: f64 = -0.2;
const GEL_IMAGE_HEIGHT_FRACTION: f64 = 0.9;
const LABEL_GAP: f64 = 6.0;
const TICK_LENGTH: f64 = 5.0;
const AXIS_COLOR: Color = Color::rgb(0x44, 0x44, 0x44);

/// Maps plot coordinates to pixels. Column `i` is centred at `x = i + 1`; `y`
/// runs from `0` at the top of the plot to `-depth` at the bottom.
struct Frame {
    left: f64,
    top: f64,
    column_width: f64,
    plot_height: f64,
    depth: f64,
}

impl Frame {
    fn x(&self, x: f64) -> f64 {
        self.left + (x - 0.5) * self.column_width
    }

    fn y(&self, y: f64) -> f64 {
        self.top + (-y / self.depth) * self.plot_height
    }

    fn bottom(&self) -> f64 {
        self.top + self.plot_height
    }
}

fn scaled(font: FontSpec, options: &RenderOptions) -> FontSpec {
    FontSpec {
        size: font.size * options.font_scale,
        ..font
    }
}

fn pattern_label(label: &str, font: FontSpec, center: f64, frame: &Frame) -> Text {
    let rotation = font.rotation.rem_euclid(360.0);
    let y = frame.top - LABEL_GAP;
    if rotation > 10.0 && rotation < 80.0 {
        Text::new(frame.x(center + SLANTED_LABEL_SHIFT), y, label, font)
            .anchored(HAnchor::Start, VAnchor::Middle)
    } else if rotation < 10.0 || rotation > 350.0 {
        Text::new(frame.x(center), y, label, font).anchored(HAnchor::Middle, VAnchor::Bottom)
    } else {
        Text::new(frame.x(center), y, label, font).anchored(HAnchor::Start, VAnchor::Middle)
    }
}

/// Lays out a pattern set as a gel plot.
///
/// Backgrounds go first, then bands (at half opacity for uncut lanes), band
/// labels, pattern labels, gel images, corner notes, ladder ticks and finally
/// the set label on the far left.
///
/// # Errors
///
/// Returns [`RenderError::EmptyPatternSet`] when the set has no patterns.
pub fn pattern_set(set: &BandsPatternsSet, options: &RenderOptions) -> Result<Scene, RenderError> {
    if set.patterns.is_empty() {
        return Err(RenderError::EmptyPatternSet);
    }
    let patterns = set.processed_patterns();
    let margins = options.margins;
    let frame = Frame {
        left: margins.left,
        top: margins.top,
        column_width: options.column_width,
        plot_height: options.plot_height,
        depth: PLOT_DEPTH_FACTOR * set.max_ladder_migration(),
    };
    let mut scene = Scene::new(
        margins.left + patterns.len() as f64 * options.column_width + margins.right,
        margins.top + options.plot_height + margins.bottom,
    );
    let lanes = || {
        patterns
            .iter()
            .enumerate()
            .map(|(i, pattern)| (i as f64 + 1.0, pattern))
    };
    let span = |center: f64, width: f64| (frame.x(center - width / 2.0), frame.x(center + width / 2.0));

    for (center, pattern) in lanes() {
        if let Some(color) = pattern.background_color {
            let (x0, x1) = span(center, pattern.width);
            scene.push(Rect::new(x0, frame.top, x1 - x0, frame.plot_height, color));
        }
    }

    for (center, pattern) in lanes() {
        let opacity = if pattern.uncut { UNCUT_OPACITY } else { 1.0 };
        for band in pattern.processed_bands() {
            let y = frame.y(-band.migration_on(&set.ladder));
            let (x0, x1) = span(center, band.width * pattern.width);
            scene.push(
                Rect::new(x0, y - band.thickness / 2.0, x1 - x0, band.thickness, band.color)
                    .with_opacity(opacity)
                    .with_html(band.hover_text())
                    .with_band(band.to_json()),
            );
        }
    }

    for (center, pattern) in lanes() {
        for band in pattern.processed_bands() {
            if let Some(label) = band.resolved_label() {
                let y = frame.y(-band.migration_on(&set.ladder));
                scene.push(
                    Text::new(frame.x(center), y, label, scaled(band.label_font(), options))
                        .with_background(band.color),
                );
            }
        }
    }

    for (center, pattern) in lanes() {
        if let Some(label) = &pattern.label {
            scene.push(pattern_label(
                label,
                scaled(pattern.label_font(), options),
                center,
                &frame,
            ));
        }
    }

    for (center, pattern) in lanes() {
        if let Some(image) = &pattern.gel_image {
            let (_, right) = span(center, pattern.width);
            let width = pattern.gel_image_width * frame.column_width;
            let height = GEL_IMAGE_HEIGHT_FRACTION * frame.plot_height;
            scene.push(Raster {
                x: right - width,
                y: frame.top + (frame.plot_height - height) / 2.0,
                width,
                height,
                image: image.clone(),
            });
        }
    }

    for (center, pattern) in lanes() {
        if let Some(note) = &pattern.corner_note {
            let (left, _) = span(center, pattern.width);
            scene.push(
                Text::new(left + 2.0, frame.top + 2.0, note, scaled(pattern.corner_note_font(), options))
                    .anchored(HAnchor::End, VAnchor::Top),
            );
        }
    }

    let ticks = set.tick_positions();
    if !ticks.is_empty() {
        let font = scaled(set.ticks_font(), options);
        scene.push(Line::new(
            (frame.left, frame.top),
            (frame.left, frame.bottom()),
            AXIS_COLOR,
            1.0,
        ));
        for tick in &ticks {
            let y = frame.y(-tick.migration);
            scene.push(Line::new(
                (frame.left - TICK_LENGTH, y),
                (frame.left, y),
                AXIS_COLOR,
                1.0,
            ));
            scene.push(
                Text::new(frame.left - TICK_LENGTH - 2.0, y, &tick.label, font.clone())
                    .anchored(HAnchor::Middle, VAnchor::Bottom),
            );
        }
    }

    if let Some(label) = &set.label {
        scene.push(
            Text::new(4.0, frame.top + frame.plot_height / 2.0, label, scaled(set.label_font(), options))
                .anchored(HAnchor::Middle, VAnchor::Top),
        );
    }

    debug!(
        patterns = patterns.len(),
        primitives = scene.primitives.len(),
        "Laid out pattern set"
    );
    Ok(scene)
}

/// Single-lane plot of a pattern against a ladder.
pub fn single_pattern(
    pattern: BandsPattern,
    set_template: &BandsPatternsSet,
    options: &RenderOptions,
) -> Result<Scene, RenderError> {
    let mut set = set_template.clone();
    set.patterns = vec![pattern];
    pattern_set(&set, options)
}

/// Stacks scenes vertically, left-aligned, in order.
pub fn stack(scenes: &[Scene]) -> Scene {
    let width = scenes.iter().map(|s| s.width).fold(0.0, f64::max);
    let height = scenes.iter().map(|s| s.height).sum();
    let mut stacked = Scene::new(width, height);
    let mut offset = 0.0;
    for scene in scenes {
        stacked.place(scene, 0.0, offset);
        offset += scene.height;
    }
    stacked
}
