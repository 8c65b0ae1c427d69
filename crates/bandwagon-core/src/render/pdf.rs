//! Multi-page PDF output. Requires the `pdf` cargo feature; without it every
//! call returns [`RenderError::FeatureDisabled`].

use super::RenderError;
use super::scene::Scene;
use std::path::Path;

#[cfg(feature = "pdf")]
mod backend {
    use super::super::RenderError;
    use super::super::scene::{Line, Primitive, Raster, Rect, Scene, Text};
    use crate::core::models::style::Color;
    use printpdf::path::{PaintMode, WindingOrder};
    use printpdf::{
        BuiltinFont, IndirectFontRef, LineDashPattern, Mm, PdfDocument, PdfLayerReference, Point,
        Polygon, Pt, Rgb, TextMatrix,
    };
    use std::fs::File;
    use std::io::BufWriter;
    use std::path::Path;

    /// Pixels are laid out at 96 dpi.
    const PT_PER_PX: f64 = 0.75;

    struct Fonts {
        regular: IndirectFontRef,
        bold: IndirectFontRef,
    }

    struct Page<'a> {
        layer: PdfLayerReference,
        height: f64,
        fonts: &'a Fonts,
    }

    /// Blends a translucent color onto the white page.
    fn pdf_color(color: Color, opacity: f64) -> printpdf::Color {
        let alpha = color.alpha() * opacity;
        let channel = |c: u8| (1.0 - alpha + alpha * c as f64 / 255.0) as f32;
        printpdf::Color::Rgb(Rgb::new(channel(color.r), channel(color.g), channel(color.b), None))
    }

    impl Page<'_> {
        fn point(&self, x: f64, y: f64) -> Point {
            Point::new(
                Mm::from(Pt((x * PT_PER_PX) as f32)),
                Mm::from(Pt(((self.height - y) * PT_PER_PX) as f32)),
            )
        }

        fn fill_box(&self, x: f64, y: f64, width: f64, height: f64, color: printpdf::Color) {
            self.layer.set_fill_color(color);
            self.layer.add_polygon(Polygon {
                rings: vec![vec![
                    (self.point(x, y), false),
                    (self.point(x + width, y), false),
                    (self.point(x + width, y + height), false),
                    (self.point(x, y + height), false),
                ]],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            });
        }

        fn rect(&self, rect: &Rect) {
            self.fill_box(rect.x, rect.y, rect.width, rect.height, pdf_color(rect.fill, rect.opacity));
        }

        fn line(&self, line: &Line) {
            self.layer.set_outline_color(pdf_color(line.color, 1.0));
            self.layer.set_outline_thickness((line.width * PT_PER_PX) as f32);
            let dash = if line.dashed {
                LineDashPattern {
                    dash_1: Some(2),
                    gap_1: Some(3),
                    ..LineDashPattern::default()
                }
            } else {
                LineDashPattern::default()
            };
            self.layer.set_line_dash_pattern(dash);
            self.layer.add_line(printpdf::Line {
                points: vec![
                    (self.point(line.x1, line.y1), false),
                    (self.point(line.x2, line.y2), false),
                ],
                is_closed: false,
            });
        }

        fn text(&self, text: &Text) {
            let (sin, cos) = text.font.rotation.to_radians().sin_cos();
            if let Some(background) = text.background {
                // Boxes are only drawn upright; labels with backgrounds are not rotated.
                let (bx, by, bw, bh) = text.background_box();
                self.fill_box(text.x + bx, text.y + by, bw, bh, pdf_color(background, 1.0));
            }
            // Baseline origin: the anchor offset rotated into page space.
            let (dx, dy) = text.anchor_offset();
            let dy = dy + text.font.size * 0.8;
            let x = text.x + dx * cos + dy * sin;
            let y = text.y - dx * sin + dy * cos;
            let font = if text.font.is_bold() {
                &self.fonts.bold
            } else {
                &self.fonts.regular
            };
            self.layer.begin_text_section();
            self.layer.set_fill_color(pdf_color(text.font.color, 1.0));
            self.layer.set_font(font, (text.font.size * PT_PER_PX) as f32);
            self.layer.set_text_matrix(TextMatrix::TranslateRotate(
                Pt((x * PT_PER_PX) as f32),
                Pt(((self.height - y) * PT_PER_PX) as f32),
                text.font.rotation as f32,
            ));
            self.layer.write_text(text.content.clone(), font);
            self.layer.end_text_section();
        }

        fn raster(&self, raster: &Raster) {
            let image = &raster.image;
            if image.width() == 0 || image.height() == 0 {
                return;
            }
            let cell_w = raster.width / image.width() as f64;
            let cell_h = raster.height / image.height() as f64;
            for (row, pixels) in image.rows().enumerate() {
                for (col, &value) in pixels.iter().enumerate() {
                    self.fill_box(
                        raster.x + col as f64 * cell_w,
                        raster.y + row as f64 * cell_h,
                        cell_w,
                        cell_h,
                        pdf_color(Color::rgb(value, value, value), 1.0),
                    );
                }
            }
        }

        fn draw(&self, scene: &Scene) {
            self.fill_box(0.0, 0.0, scene.width, scene.height, pdf_color(Color::WHITE, 1.0));
            for primitive in &scene.primitives {
                match primitive {
                    Primitive::Rect(rect) => self.rect(rect),
                    Primitive::Line(line) => self.line(line),
                    Primitive::Text(text) => self.text(text),
                    Primitive::Raster(raster) => self.raster(raster),
                }
            }
        }
    }

    fn page_size(scene: &Scene) -> (Mm, Mm) {
        (
            Mm::from(Pt((scene.width * PT_PER_PX) as f32)),
            Mm::from(Pt((scene.height * PT_PER_PX) as f32)),
        )
    }

    pub fn write(pages: &[Scene], title: &str, path: &Path) -> Result<(), RenderError> {
        let pdf_error = |e: printpdf::Error| RenderError::Pdf(e.to_string());
        let Some((first, rest)) = pages.split_first() else {
            return Err(RenderError::EmptyDocument);
        };
        let (width, height) = page_size(first);
        let (doc, page, layer) = PdfDocument::new(title, width, height, "Page 1");
        let fonts = Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
        };

        Page {
            layer: doc.get_page(page).get_layer(layer),
            height: first.height,
            fonts: &fonts,
        }
        .draw(first);
        for (i, scene) in rest.iter().enumerate() {
            let (width, height) = page_size(scene);
            let (page, layer) = doc.add_page(width, height, format!("Page {}", i + 2));
            Page {
                layer: doc.get_page(page).get_layer(layer),
                height: scene.height,
                fonts: &fonts,
            }
            .draw(scene);
        }

        let file = File::create(path).map_err(|source| RenderError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        doc.save(&mut BufWriter::new(file)).map_err(pdf_error)
    }
}

/// Writes scenes as the pages of one PDF document.
///
/// # Errors
///
/// Returns [`RenderError::FeatureDisabled`] when built without the `pdf`
/// feature, [`RenderError::EmptyDocument`] for an empty page list, or the
/// I/O or PDF error that interrupted writing.
#[cfg(feature = "pdf")]
pub fn write_pdf(pages: &[Scene], title: &str, path: &Path) -> Result<(), RenderError> {
    backend::write(pages, title, path)?;
    tracing::debug!(path = %path.display(), pages = pages.len(), "Wrote PDF");
    Ok(())
}

#[cfg(not(feature = "pdf"))]
pub fn write_pdf(_pages: &[Scene], _title: &str, _path: &Path) -> Result<(), RenderError> {
    Err(RenderError::FeatureDisabled("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[cfg(not(feature = "pdf"))]
    #[test]
    fn pdf_output_requires_the_feature() {
        let dir = tempdir().unwrap();
        let result = write_pdf(&[Scene::new(10.0, 10.0)], "t", &dir.path().join("x.pdf"));
        assert!(matches!(result, Err(RenderError::FeatureDisabled("pdf"))));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn writes_one_page_per_scene() {
        use crate::core::models::style::{Color, FontSpec};
        use crate::render::scene::{Line, Rect, Text};

        let dir = tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        let mut scene = Scene::new(200.0, 100.0);
        scene.push(Rect::new(10.0, 10.0, 50.0, 2.0, Color::BLACK));
        scene.push(Line::new((0.0, 50.0), (200.0, 50.0), Color::BLACK, 1.0).dashed());
        scene.push(Text::new(20.0, 20.0, "a - 1.2k", FontSpec::default()));
        write_pdf(&[scene.clone(), scene], "report", &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
