//! Standalone interactive pages: every scene is inlined as SVG, bands show a
//! tooltip on hover, and the mouse wheel zooms along x while dragging pans.

use super::scene::Scene;
use crate::core::models::band::BandJson;
use super::svg::{escape, write_primitives};
use super::{RenderError, RenderOptions};
use serde::Serialize;
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 16px; }
.bandwagon-viewport { overflow-x: auto; border: 1px solid #ddd; margin-bottom: 12px; }
.bandwagon-viewport svg { display: block; cursor: grab; }
.bandwagon-viewport svg.dragging { cursor: grabbing; }
.band:hover { stroke: #ff8c00; stroke-width: 1; }
#bandwagon-tooltip { position: fixed; pointer-events: none; display: none; padding: 4px 8px;
  background: #ffffff; border: 1px solid #888; border-radius: 3px; font-size: 12px; }
"#;

const SCRIPT: &str = r#"
(function () {
  const tooltip = document.getElementById("bandwagon-tooltip");
  const views = [];
  document.querySelectorAll(".bandwagon-viewport svg").forEach(function (svg, page) {
    const full = svg.viewBox.baseVal;
    const initial = { x: full.x, width: full.width };
    const view = { svg: svg, initial: initial };
    views.push(view);
    const setX = function (x, width) {
      width = Math.min(Math.max(width, initial.width / 50), initial.width);
      x = Math.min(Math.max(x, initial.x), initial.x + initial.width - width);
      svg.setAttribute("viewBox", x + " " + full.y + " " + width + " " + full.height);
    };
    svg.addEventListener("wheel", function (event) {
      event.preventDefault();
      const box = svg.viewBox.baseVal;
      const rect = svg.getBoundingClientRect();
      const focus = box.x + (event.clientX - rect.left) / rect.width * box.width;
      const factor = event.deltaY < 0 ? 0.9 : 1 / 0.9;
      const width = box.width * factor;
      setX(focus - (focus - box.x) * factor, width);
    }, { passive: false });
    let drag = null;
    svg.addEventListener("mousedown", function (event) {
      drag = { start: event.clientX, x: svg.viewBox.baseVal.x };
      svg.classList.add("dragging");
    });
    window.addEventListener("mouseup", function () {
      drag = null;
      svg.classList.remove("dragging");
    });
    window.addEventListener("mousemove", function (event) {
      if (!drag) { return; }
      const box = svg.viewBox.baseVal;
      const scale = box.width / svg.getBoundingClientRect().width;
      setX(drag.x - (event.clientX - drag.start) * scale, box.width);
    });
    svg.querySelectorAll(".band").forEach(function (band) {
      const entry = BANDWAGON_BANDS[page][Number(band.dataset.band)];
      band.addEventListener("mousemove", function (event) {
        tooltip.innerHTML = entry.html;
        tooltip.style.left = (event.clientX + 12) + "px";
        tooltip.style.top = (event.clientY + 12) + "px";
        tooltip.style.display = "block";
      });
      band.addEventListener("mouseleave", function () { tooltip.style.display = "none"; });
    });
  });
  document.getElementById("bandwagon-reset").addEventListener("click", function () {
    views.forEach(function (view) {
      const box = view.svg.viewBox.baseVal;
      view.svg.setAttribute("viewBox", view.initial.x + " " + box.y + " " + view.initial.width + " " + box.height);
    });
  });
})();
"#;

/// Tooltip text plus the band record behind it, indexed by `data-band`.
#[derive(Debug, Serialize)]
struct HoverEntry<'a> {
    html: &'a str,
    #[serde(flatten)]
    band: Option<&'a BandJson>,
}

fn hover_entries(scene: &Scene) -> Vec<HoverEntry<'_>> {
    scene
        .rects()
        .filter_map(|rect| {
            rect.html.as_deref().map(|html| HoverEntry {
                html,
                band: rect.band.as_ref(),
            })
        })
        .collect()
}

/// Width of the scrolling viewport: enough for `max_visible_patterns` columns.
fn visible_width(scene: &Scene, options: &RenderOptions) -> f64 {
    let margins = options.margins.left + options.margins.right;
    let columns = options.max_visible_patterns.max(1) as f64 * options.column_width + margins;
    scene.width.min(columns)
}

/// Renders scenes as one interactive HTML page, one viewport per scene.
///
/// # Errors
///
/// Returns an error when there is nothing to render or the hover data cannot
/// be serialized.
pub fn to_html(pages: &[Scene], title: &str, options: &RenderOptions) -> Result<String, RenderError> {
    if pages.is_empty() {
        return Err(RenderError::EmptyDocument);
    }
    let bands: Vec<Vec<HoverEntry>> = pages.iter().map(hover_entries).collect();
    let bands_json = serde_json::to_string(&bands)?.replace("</", "<\\/");

    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{}</title>", escape(title));
    let _ = writeln!(out, "<style>{STYLE}</style>\n</head>\n<body>");
    out.push_str("<button id=\"bandwagon-reset\">Reset view</button>\n");
    for scene in pages {
        let _ = writeln!(
            out,
            "<div class=\"bandwagon-viewport\" style=\"max-width: {:.0}px\">",
            visible_width(scene, options)
        );
        let _ = writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.0}\" height=\"{h:.0}\" viewBox=\"0 0 {w:.2} {h:.2}\">",
            w = scene.width,
            h = scene.height
        );
        out.push_str("<rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
        write_primitives(&mut out, scene, true);
        out.push_str("</svg>\n</div>\n");
    }
    out.push_str("<div id=\"bandwagon-tooltip\"></div>\n");
    let _ = writeln!(out, "<script>const BANDWAGON_BANDS = {bands_json};</script>");
    let _ = writeln!(out, "<script>{SCRIPT}</script>\n</body>\n</html>");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::band::Band;
    use crate::render::scene::Rect;
    use crate::core::models::style::Color;

    #[test]
    fn page_embeds_svg_and_band_data() {
        let mut scene = Scene::new(200.0, 100.0);
        scene.push(Rect::new(0.0, 0.0, 10.0, 2.0, Color::BLACK).with_html("<b>1.5k</b>"));
        let html = to_html(&[scene], "Digest & ladder", &RenderOptions::default()).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Digest &amp; ladder</title>"));
        assert!(html.contains("data-band=\"0\""));
        assert!(html.contains(r#"const BANDWAGON_BANDS = [[{"html":"<b>1.5k<\/b>"}]];"#));
        assert!(html.contains("bandwagon-reset"));
    }

    #[test]
    fn band_records_are_embedded_with_their_tooltip() {
        let band = Band::new(1500.0).with_migration(120.0).with_label("=size");
        let mut scene = Scene::new(200.0, 100.0);
        scene.push(
            Rect::new(0.0, 0.0, 10.0, 2.0, Color::BLACK)
                .with_html(band.hover_text())
                .with_band(band.to_json()),
        );
        let html = to_html(&[scene], "gel", &RenderOptions::default()).unwrap();

        assert!(html.contains(r#""html":"1.5k""#));
        assert!(html.contains(r#""dna_size":1500.0"#));
        assert!(html.contains(r#""migration_distance":120.0"#));
        assert!(html.contains(r##""color":"#000000""##));
    }

    #[test]
    fn viewport_is_limited_to_visible_patterns() {
        let options = RenderOptions::default().with_max_visible_patterns(2);
        let wide = Scene::new(2000.0, 100.0);
        assert_eq!(visible_width(&wide, &options), 2.0 * 60.0 + 80.0);
        let narrow = Scene::new(100.0, 100.0);
        assert_eq!(visible_width(&narrow, &options), 100.0);
    }

    #[test]
    fn default_viewport_shows_twelve_columns() {
        let options = RenderOptions::default();
        assert_eq!(options.max_visible_patterns, 12);
        let wide = Scene::new(5000.0, 100.0);
        assert_eq!(visible_width(&wide, &options), 12.0 * 60.0 + 80.0);
    }

    #[test]
    fn empty_documents_are_rejected() {
        assert!(matches!(
            to_html(&[], "x", &RenderOptions::default()),
            Err(RenderError::EmptyDocument)
        ));
    }
}
