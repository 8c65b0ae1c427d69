use super::scene::{HAnchor, Line, Primitive, Raster, Rect, Scene, Text, VAnchor};
use crate::core::models::style::Color;
use std::fmt::Write;

pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn fill(color: Color, opacity: f64) -> String {
    let alpha = color.alpha() * opacity;
    if alpha < 1.0 {
        format!(
            "fill=\"#{:02x}{:02x}{:02x}\" fill-opacity=\"{alpha:.3}\"",
            color.r, color.g, color.b
        )
    } else {
        format!("fill=\"#{:02x}{:02x}{:02x}\"", color.r, color.g, color.b)
    }
}

fn write_rect(out: &mut String, rect: &Rect, hover_index: Option<usize>) {
    let _ = write!(
        out,
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" {}",
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        fill(rect.fill, rect.opacity)
    );
    if rect.corner_radius > 0.0 {
        let _ = write!(out, " rx=\"{:.2}\"", rect.corner_radius);
    }
    match hover_index {
        Some(index) => {
            let _ = writeln!(out, " class=\"band\" data-band=\"{index}\"/>");
        }
        None => out.push_str("/>\n"),
    }
}

fn write_line(out: &mut String, line: &Line) {
    let _ = write!(
        out,
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{:.2}\"",
        line.x1,
        line.y1,
        line.x2,
        line.y2,
        line.color.to_hex(),
        line.width
    );
    if line.dashed {
        out.push_str(" stroke-dasharray=\"2,3\"");
    }
    out.push_str("/>\n");
}

fn write_text(out: &mut String, text: &Text) {
    let transform = if text.font.rotation != 0.0 {
        format!(
            " transform=\"rotate({:.2} {:.2} {:.2})\"",
            -text.font.rotation, text.x, text.y
        )
    } else {
        String::new()
    };
    let _ = write!(out, "<g{transform}>");
    if let Some(background) = text.background {
        let (bx, by, bw, bh) = text.background_box();
        let _ = write!(
            out,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{:.2}\" {}/>",
            text.x + bx,
            text.y + by,
            bw,
            bh,
            bh / 4.0,
            fill(background, 1.0)
        );
    }
    let anchor = match text.h_anchor {
        HAnchor::Start => "start",
        HAnchor::Middle => "middle",
        HAnchor::End => "end",
    };
    let baseline = match text.v_anchor {
        VAnchor::Top => "hanging",
        VAnchor::Middle => "central",
        VAnchor::Bottom => "alphabetic",
    };
    let _ = writeln!(
        out,
        "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{:.2}\" font-weight=\"{}\" {} text-anchor=\"{anchor}\" dominant-baseline=\"{baseline}\">{}</text></g>",
        text.x,
        text.y,
        escape(&text.font.family),
        text.font.size,
        if text.font.is_bold() { "bold" } else { "normal" },
        fill(text.font.color, 1.0),
        escape(&text.content)
    );
}

fn write_raster(out: &mut String, raster: &Raster) {
    let image = &raster.image;
    if image.width() == 0 || image.height() == 0 {
        return;
    }
    let cell_w = raster.width / image.width() as f64;
    let cell_h = raster.height / image.height() as f64;
    out.push_str("<g shape-rendering=\"crispEdges\">");
    for (row, pixels) in image.rows().enumerate() {
        for (col, &value) in pixels.iter().enumerate() {
            let _ = write!(
                out,
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" {}/>",
                raster.x + col as f64 * cell_w,
                raster.y + row as f64 * cell_h,
                cell_w,
                cell_h,
                fill(Color::rgb(value, value, value), 1.0)
            );
        }
    }
    out.push_str("</g>\n");
}

/// Writes the primitives of a scene as SVG elements. With `interactive`,
/// rectangles carrying hover text are tagged with their index among such
/// rectangles.
pub(crate) fn write_primitives(out: &mut String, scene: &Scene, interactive: bool) {
    let mut hover_count = 0;
    for primitive in &scene.primitives {
        match primitive {
            Primitive::Rect(rect) => {
                let index = (interactive && rect.html.is_some()).then(|| {
                    hover_count += 1;
                    hover_count - 1
                });
                write_rect(out, rect, index);
            }
            Primitive::Line(line) => write_line(out, line),
            Primitive::Text(text) => write_text(out, text),
            Primitive::Raster(raster) => write_raster(out, raster),
        }
    }
}

/// Renders a scene as a standalone SVG document on a white background.
pub fn to_svg(scene: &Scene) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.0}\" height=\"{h:.0}\" viewBox=\"0 0 {w:.2} {h:.2}\">",
        w = scene.width,
        h = scene.height
    );
    out.push_str("<rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
    write_primitives(&mut out, scene, false);
    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::style::FontSpec;

    #[test]
    fn text_content_is_escaped() {
        let mut scene = Scene::new(100.0, 50.0);
        scene.push(Text::new(10.0, 10.0, "A<B & \"C\"", FontSpec::default()));
        let svg = to_svg(&scene);
        assert!(svg.contains("A&lt;B &amp; &quot;C&quot;"));
        assert!(!svg.contains("A<B"));
    }

    #[test]
    fn document_contains_each_primitive() {
        let mut scene = Scene::new(120.0, 80.0);
        scene.push(Rect::new(1.0, 2.0, 3.0, 4.0, Color::rgb(255, 0, 0)).with_opacity(0.5));
        scene.push(Line::new((0.0, 0.0), (10.0, 0.0), Color::BLACK, 1.0).dashed());
        let rotated = FontSpec {
            rotation: 90.0,
            ..FontSpec::default()
        };
        scene.push(Text::new(5.0, 5.0, "lane", rotated).with_background(Color::BLACK));

        let svg = to_svg(&scene);
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"120\" height=\"80\""));
        assert!(svg.contains("fill=\"#ff0000\" fill-opacity=\"0.500\""));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("rotate(-90.00 5.00 5.00)"));
        assert!(svg.contains(">lane</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn interactive_output_indexes_hover_rects() {
        let mut scene = Scene::new(10.0, 10.0);
        scene.push(Rect::new(0.0, 0.0, 1.0, 1.0, Color::WHITE));
        scene.push(Rect::new(0.0, 0.0, 1.0, 1.0, Color::BLACK).with_html("a"));
        scene.push(Rect::new(0.0, 0.0, 1.0, 1.0, Color::BLACK).with_html("b"));
        let mut out = String::new();
        write_primitives(&mut out, &scene, true);
        assert!(out.contains("data-band=\"0\""));
        assert!(out.contains("data-band=\"1\""));
        assert!(!out.contains("data-band=\"2\""));
    }
}
