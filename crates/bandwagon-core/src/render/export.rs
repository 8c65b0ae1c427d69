use super::layout::stack;
use super::scene::Scene;
use super::{RenderError, RenderOptions, html, pdf, png, svg};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Html,
    Pdf,
}

impl OutputFormat {
    /// Picks the backend from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "html" | "htm" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            _ => Err(RenderError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

fn write_text_file(path: &Path, content: &str) -> Result<(), RenderError> {
    fs::write(path, content).map_err(|source| RenderError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    })
}

fn title_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "BandWagon".to_string())
}

/// Writes a single scene, choosing the backend from the extension of `path`.
pub fn export(scene: &Scene, path: &Path, options: &RenderOptions) -> Result<(), RenderError> {
    export_pages(std::slice::from_ref(scene), path, options)
}

/// Writes several scenes to one file. PDF gets one page per scene and HTML one
/// viewport per scene; SVG and PNG stack the scenes vertically.
///
/// # Errors
///
/// Returns [`RenderError::EmptyDocument`] for an empty page list, or the
/// backend's error.
pub fn export_pages(pages: &[Scene], path: &Path, options: &RenderOptions) -> Result<(), RenderError> {
    let format = OutputFormat::from_path(path)?;
    if pages.is_empty() {
        return Err(RenderError::EmptyDocument);
    }
    match format {
        OutputFormat::Svg => write_text_file(path, &svg::to_svg(&stack(pages)))?,
        OutputFormat::Png => png::write_png(&stack(pages), path, options)?,
        OutputFormat::Html => write_text_file(path, &html::to_html(pages, &title_of(path), options)?)?,
        OutputFormat::Pdf => pdf::write_pdf(pages, &title_of(path), path)?,
    }
    info!("Wrote {} page(s) to '{}'.", pages.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::style::Color;
    use crate::render::scene::Rect;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn formats_follow_extensions() {
        assert_eq!(OutputFormat::from_path(Path::new("a.SVG")).unwrap(), OutputFormat::Svg);
        assert_eq!(OutputFormat::from_path(Path::new("a.htm")).unwrap(), OutputFormat::Html);
        assert_eq!(OutputFormat::from_path(Path::new("a.pdf")).unwrap(), OutputFormat::Pdf);
        match OutputFormat::from_path(Path::new("a.jpg")) {
            Err(RenderError::UnsupportedFormat(path)) => assert_eq!(path, PathBuf::from("a.jpg")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn svg_export_stacks_pages() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.svg");
        let mut scene = Scene::new(100.0, 50.0);
        scene.push(Rect::new(0.0, 0.0, 10.0, 10.0, Color::BLACK));
        export_pages(&[scene.clone(), scene], &path, &RenderOptions::default()).unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("height=\"100\""));
        assert_eq!(svg.matches("<rect x=").count(), 2);
    }

    #[test]
    fn html_export_writes_one_viewport_per_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.html");
        let scene = Scene::new(100.0, 50.0);
        export_pages(&[scene.clone(), scene], &path, &RenderOptions::default()).unwrap();
        let html = fs::read_to_string(&path).unwrap();
        assert_eq!(html.matches("class=\"bandwagon-viewport\"").count(), 2);
        assert!(html.contains("<title>report</title>"));
    }

    #[test]
    fn empty_page_lists_are_rejected() {
        let dir = tempdir().unwrap();
        let result = export_pages(&[], &dir.path().join("x.svg"), &RenderOptions::default());
        assert!(matches!(result, Err(RenderError::EmptyDocument)));
    }
}
