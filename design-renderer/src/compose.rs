//! Document compositing.
//!
//! Flattens a layer document into a single raster image through an SVG
//! intermediate: visible layers are painted back to front with their
//! rotation, opacity, and mask clips applied, then the SVG is rasterized
//! with resvg/tiny-skia and encoded as PNG.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use design_core::layer::{FontStyle, Layer, LayerId, LayerKind, TextAlign, TextDecoration};
use design_core::Document;
use tracing::{info, warn};

use crate::assets::load_image_source;
use crate::error::{RenderError, RenderResult};

/// File name used by [`Compositor::compose_and_export`].
pub const EXPORT_FILE_NAME: &str = "mode-design-composition.png";

/// Configuration for document compositing.
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    /// Background color as RGBA bytes. Defaults to transparent.
    pub background: [u8; 4],
    /// Scale factor (e.g. 2.0 for retina output).
    pub scale: f32,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            background: [0, 0, 0, 0],
            scale: 1.0,
        }
    }
}

/// Flattens documents to SVG and PNG.
pub struct Compositor {
    config: ComposeConfig,
}

impl Compositor {
    /// Create a compositor with the given configuration.
    #[must_use]
    pub fn new(config: ComposeConfig) -> Self {
        Self { config }
    }

    /// Create a compositor with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ComposeConfig::default())
    }

    /// Flatten the document to an SVG string.
    ///
    /// Hidden layers and groups are not painted. Mask layers are emitted as
    /// clip paths instead of paint; the layers they clip reference them by
    /// id. Image sources that cannot be loaded paint a labeled placeholder.
    ///
    /// # Errors
    ///
    /// Currently infallible for any well-formed document; the `Result` is
    /// kept for parity with the rasterizing entry points.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn compose_to_svg(&self, doc: &Document) -> RenderResult<String> {
        let view_w = doc.width();
        let view_h = doc.height();
        let out_w = ((view_w as f32 * self.config.scale) as u32).max(1);
        let out_h = ((view_h as f32 * self.config.scale) as u32).max(1);

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
        );

        let bg = &self.config.background;
        if bg[3] > 0 {
            let _ = write!(
                svg,
                "<rect width=\"100%\" height=\"100%\" fill=\"rgba({},{},{},{})\"/>",
                bg[0],
                bg[1],
                bg[2],
                f32::from(bg[3]) / 255.0,
            );
        }

        // Back to front; the list stores the front-most layer first.
        let paint_order: Vec<&Layer> = doc.layers().iter().rev().filter(|l| l.visible).collect();

        let referenced_masks: Vec<&Layer> = paint_order
            .iter()
            .filter(|l| l.is_mask && paint_order.iter().any(|m| m.masked_by == Some(l.id)))
            .copied()
            .collect();
        if !referenced_masks.is_empty() {
            svg.push_str("<defs>");
            for mask in &referenced_masks {
                let _ = write!(svg, "<clipPath id=\"clip-{}\">", mask.id);
                let (cx, cy) = mask.center();
                if mask.rotation.abs() > f32::EPSILON {
                    let _ = write!(
                        svg,
                        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" transform=\"rotate({} {cx} {cy})\"/>",
                        mask.x, mask.y, mask.width, mask.height, mask.rotation,
                    );
                } else {
                    let _ = write!(
                        svg,
                        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>",
                        mask.x, mask.y, mask.width, mask.height,
                    );
                }
                svg.push_str("</clipPath>");
            }
            svg.push_str("</defs>");
        }

        // A hidden mask emits no def, so its content must not reference it.
        let clip_ids: Vec<LayerId> = referenced_masks.iter().map(|m| m.id).collect();
        for layer in paint_order {
            if layer.is_mask || layer.is_group() {
                continue;
            }
            render_layer_svg(&mut svg, layer, &clip_ids);
        }

        svg.push_str("</svg>");
        Ok(svg)
    }

    /// Flatten the document to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the SVG intermediate cannot be parsed or the
    /// result cannot be encoded.
    pub fn compose_to_png(&self, doc: &Document) -> RenderResult<Vec<u8>> {
        let svg_string = self.compose_to_svg(doc)?;
        let pixmap = rasterize_svg(&svg_string)?;
        pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Flatten the document to PNG and write it into `dir` under
    /// [`EXPORT_FILE_NAME`]. Returns the written path.
    ///
    /// # Errors
    ///
    /// Returns an error if compositing fails or the file cannot be written.
    pub fn compose_and_export(&self, doc: &Document, dir: &Path) -> RenderResult<PathBuf> {
        let png = self.compose_to_png(doc)?;
        let path = dir.join(EXPORT_FILE_NAME);
        std::fs::write(&path, png)?;
        info!(path = %path.display(), "composition exported");
        Ok(path)
    }
}

/// Rasterize an SVG string to a tiny-skia pixmap.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rasterize_svg(svg_string: &str) -> RenderResult<tiny_skia::Pixmap> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_string, &opt).map_err(|e| RenderError::Svg(e.to_string()))?;

    let px_w = tree.size().width() as u32;
    let px_h = tree.size().height() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
        .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    Ok(pixmap)
}

/// Paint one layer into the SVG buffer.
fn render_layer_svg(svg: &mut String, layer: &Layer, clip_ids: &[LayerId]) {
    svg.push_str("<g");
    if layer.rotation.abs() > f32::EPSILON {
        let (cx, cy) = layer.center();
        let _ = write!(svg, " transform=\"rotate({} {cx} {cy})\"", layer.rotation);
    }
    if layer.opacity < 1.0 {
        let _ = write!(svg, " opacity=\"{}\"", layer.opacity);
    }
    if let Some(mask_id) = layer.masked_by {
        if clip_ids.contains(&mask_id) {
            let _ = write!(svg, " clip-path=\"url(#clip-{mask_id})\"");
        }
    }
    svg.push('>');

    match &layer.kind {
        LayerKind::Image { src, fill } => render_image_svg(svg, layer, src.as_deref(), fill),
        LayerKind::Text { content, style } => render_text_svg(svg, layer, content, style),
        LayerKind::Group { .. } => {}
    }

    svg.push_str("</g>");
}

fn render_image_svg(svg: &mut String, layer: &Layer, src: Option<&str>, fill: &str) {
    match src {
        None => {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
                layer.x,
                layer.y,
                layer.width,
                layer.height,
                escape_xml(fill),
            );
        }
        Some(source) => match load_image_source(source) {
            Ok(loaded) => {
                let _ = write!(
                    svg,
                    "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{}\"/>",
                    layer.x, layer.y, layer.width, layer.height, loaded.data_uri,
                );
            }
            Err(e) => {
                warn!(layer = %layer.name, error = %e, "asset unavailable, painting placeholder");
                let _ = write!(
                    svg,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"rgba(255,0,0,0.5)\"/>",
                    layer.x, layer.y, layer.width, layer.height,
                );
                let _ = write!(
                    svg,
                    "<text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"#FFFFFF\" font-family=\"sans-serif\">Error</text>",
                    layer.x + 5.0,
                    layer.y + 15.0,
                );
            }
        },
    }
}

#[allow(clippy::cast_precision_loss)]
fn render_text_svg(svg: &mut String, layer: &Layer, content: &str, style: &design_core::TextStyle) {
    let (anchor_x, anchor) = match style.align {
        TextAlign::Left | TextAlign::Justify => (layer.x, None),
        TextAlign::Center => (layer.x + layer.width / 2.0, Some("middle")),
        TextAlign::Right => (layer.x + layer.width, Some("end")),
    };

    for (i, line) in content.split('\n').enumerate() {
        let line_y = layer.y + i as f32 * style.font_size * style.line_height;
        let _ = write!(
            svg,
            "<text x=\"{anchor_x}\" y=\"{line_y}\" dominant-baseline=\"text-before-edge\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\"",
            escape_xml(&style.font_family),
            style.font_size,
            style.weight.css_value(),
            escape_xml(&style.color),
        );
        if style.style == FontStyle::Italic {
            svg.push_str(" font-style=\"italic\"");
        }
        match style.decoration {
            TextDecoration::None => {}
            TextDecoration::Underline => svg.push_str(" text-decoration=\"underline\""),
            TextDecoration::LineThrough => svg.push_str(" text-decoration=\"line-through\""),
        }
        if style.letter_spacing.abs() > f32::EPSILON {
            let _ = write!(svg, " letter-spacing=\"{}\"", style.letter_spacing);
        }
        if let Some(anchor) = anchor {
            let _ = write!(svg, " text-anchor=\"{anchor}\"");
        }
        let _ = write!(svg, ">{}</text>", escape_xml(line));
    }
}

/// Escape XML special characters for safe embedding.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use design_core::document::LayerPatch;
    use design_core::FontWeight;

    fn doc() -> Document {
        let mut doc = Document::new(400, 300);
        doc.grid.snap_to_grid = false;
        doc
    }

    #[test]
    fn test_svg_paints_back_to_front() {
        let mut doc = doc();
        doc.add_layer(Layer::image("Back", None).with_fill("#111111"));
        doc.add_layer(Layer::image("Front", None).with_fill("#222222"));

        let svg = Compositor::with_defaults()
            .compose_to_svg(&doc)
            .expect("compose");
        let back_pos = svg.find("#111111").expect("back layer painted");
        let front_pos = svg.find("#222222").expect("front layer painted");
        assert!(back_pos < front_pos);
    }

    #[test]
    fn test_hidden_layer_not_painted() {
        let mut doc = doc();
        let id = doc.add_layer(Layer::image("Ghost", None).with_fill("#333333"));
        doc.toggle_visibility(id);

        let svg = Compositor::with_defaults()
            .compose_to_svg(&doc)
            .expect("compose");
        assert!(!svg.contains("#333333"));
    }

    #[test]
    fn test_multi_line_text_offsets() {
        let mut doc = doc();
        doc.add_layer(Layer::text("Caption", "One\nTwo").with_position(0.0, 0.0));

        let svg = Compositor::with_defaults()
            .compose_to_svg(&doc)
            .expect("compose");
        assert!(svg.contains(">One</text>"));
        assert!(svg.contains(">Two</text>"));
        let second_line_y = 24.0_f32 * 1.2;
        assert!(svg.contains(&format!("y=\"{second_line_y}\"")));
    }

    #[test]
    fn test_text_styling_attributes() {
        let mut doc = doc();
        let id = doc.add_text("styled");
        doc.update_layer(
            id,
            &LayerPatch {
                font_weight: Some(FontWeight::Bold),
                text_align: Some(design_core::TextAlign::Center),
                letter_spacing: Some(2.5),
                text_decoration: Some(TextDecoration::Underline),
                ..LayerPatch::default()
            },
            true,
        );

        let svg = Compositor::with_defaults()
            .compose_to_svg(&doc)
            .expect("compose");
        assert!(svg.contains("font-weight=\"700\""));
        assert!(svg.contains("text-anchor=\"middle\""));
        assert!(svg.contains("letter-spacing=\"2.5\""));
        assert!(svg.contains("text-decoration=\"underline\""));
    }

    #[test]
    fn test_rotation_and_opacity_attributes() {
        let mut doc = doc();
        doc.add_layer(
            Layer::image("Tilted", None)
                .with_rotation(45.0)
                .with_opacity(0.5),
        );

        let svg = Compositor::with_defaults()
            .compose_to_svg(&doc)
            .expect("compose");
        assert!(svg.contains("rotate(45"));
        assert!(svg.contains("opacity=\"0.5\""));
    }

    #[test]
    fn test_mask_becomes_clip_path() {
        let mut doc = doc();
        let content = doc.add_layer(Layer::image("Content", None).with_fill("#444444"));
        let mask = doc.add_layer(Layer::image("Shape", None).with_fill("#555555"));
        doc.select(content, false);
        doc.select(mask, true);
        doc.create_mask().expect("mask");

        let svg = Compositor::with_defaults()
            .compose_to_svg(&doc)
            .expect("compose");
        assert!(svg.contains(&format!("clipPath id=\"clip-{mask}\"")));
        assert!(svg.contains(&format!("clip-path=\"url(#clip-{mask})\"")));
        // The mask itself is a clip region, not paint.
        assert!(!svg.contains("#555555"));
    }

    #[test]
    fn test_hidden_mask_drops_clip_reference() {
        let mut doc = doc();
        let content = doc.add_layer(Layer::image("Content", None).with_fill("#444444"));
        let mask = doc.add_layer(Layer::image("Shape", None).with_fill("#555555"));
        doc.select(content, false);
        doc.select(mask, true);
        doc.create_mask().expect("mask");
        doc.toggle_visibility(mask);

        let svg = Compositor::with_defaults()
            .compose_to_svg(&doc)
            .expect("compose");
        // The content paints unclipped instead of pointing at a missing def.
        assert!(svg.contains("#444444"));
        assert!(!svg.contains("clipPath"));
        assert!(!svg.contains("clip-path"));
    }

    #[test]
    fn test_remote_source_paints_placeholder() {
        let mut doc = doc();
        doc.add_image(Some("https://example.com/far-away.png".to_string()));

        let svg = Compositor::with_defaults()
            .compose_to_svg(&doc)
            .expect("compose");
        assert!(svg.contains("rgba(255,0,0,0.5)"));
        assert!(svg.contains(">Error</text>"));
    }

    #[test]
    fn test_background_config() {
        let doc = doc();
        let compositor = Compositor::new(ComposeConfig {
            background: [255, 255, 255, 255],
            scale: 1.0,
        });
        let svg = compositor.compose_to_svg(&doc).expect("compose");
        assert!(svg.contains("rgba(255,255,255,1)"));

        let transparent = Compositor::with_defaults().compose_to_svg(&doc).expect("compose");
        assert!(!transparent.contains("rgba(0,0,0,0)"));
    }

    #[test]
    fn test_png_export_magic_bytes() {
        let mut doc = doc();
        doc.add_layer(Layer::image("Fill", None));
        let png = Compositor::with_defaults()
            .compose_to_png(&doc)
            .expect("compose png");
        assert_eq!(&png[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_export_writes_named_file() {
        let mut doc = doc();
        doc.add_layer(Layer::image("Fill", None));
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Compositor::with_defaults()
            .compose_and_export(&doc, dir.path())
            .expect("export");
        assert!(path.ends_with(EXPORT_FILE_NAME));
        let bytes = std::fs::read(&path).expect("read export");
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_scale_doubles_output_size() {
        let doc = doc();
        let compositor = Compositor::new(ComposeConfig {
            background: [0, 0, 0, 0],
            scale: 2.0,
        });
        let svg = compositor.compose_to_svg(&doc).expect("compose");
        assert!(svg.contains("width=\"800\" height=\"600\""));
        assert!(svg.contains("viewBox=\"0 0 400 300\""));
    }
}
