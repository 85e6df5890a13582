//! Composition export to image formats.
//!
//! Renders a [`RenderFrame`] to SVG, then to PNG or JPEG through the
//! resvg/tiny-skia rasterization pipeline.

use std::fmt::Write;
use std::path::PathBuf;

use composer_core::{
    EditorResult, ElementRef, FontStyle, FontVariant, Placement, RenderFrame, RenderNode,
    SceneRenderer, StickerElement, TextAlign, TextElement,
};
#[cfg(feature = "raster")]
use image::ImageEncoder;

use crate::error::{RenderError, RenderResult};

/// Padding between a text element's box and its glyphs.
pub const TEXT_PADDING: f32 = 8.0;

/// Outline colour for selected elements.
pub const SELECTION_COLOR: &str = "#4A90E2";

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.6;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// SVG vector graphics (the SVG XML string as UTF-8 bytes).
    Svg,
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// Pick a format from a file extension, case-insensitively.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// Configuration for composition export.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Format produced through [`SceneRenderer::flatten`].
    pub format: ExportFormat,
    /// Edge length, in pixels, of an unscaled sticker.
    pub sticker_size: f32,
    /// Directory that root-relative sticker paths such as `/1.svg` resolve against.
    pub asset_root: Option<PathBuf>,
    /// Fill behind everything as RGBA bytes, also used to flatten JPEG alpha.
    pub background: [u8; 4],
    /// JPEG quality 1-100 (default: 90).
    pub jpeg_quality: u8,
    /// Outline selected elements.
    pub show_selection: bool,
    /// Load system fonts for rasterizing text.
    pub load_system_fonts: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            sticker_size: 100.0,
            asset_root: None,
            background: [255, 255, 255, 255],
            jpeg_quality: 90,
            show_selection: true,
            load_system_fonts: true,
        }
    }
}

/// Draws composition frames.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    config: RendererConfig,
    transformer: Option<ElementRef>,
}

impl SvgRenderer {
    /// Create a new renderer with the given configuration.
    #[must_use]
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            transformer: None,
        }
    }

    /// Create a renderer with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RendererConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Element the transform control was last attached to.
    #[must_use]
    pub const fn transformer(&self) -> Option<ElementRef> {
        self.transformer
    }

    /// Export a frame to the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be rasterized or encoded, or the
    /// format is not compiled in.
    pub fn export(&self, frame: &RenderFrame, format: ExportFormat) -> RenderResult<Vec<u8>> {
        match format {
            ExportFormat::Svg => Ok(self.render_to_svg(frame).into_bytes()),
            #[cfg(feature = "raster")]
            ExportFormat::Png => self.render_to_png(frame),
            #[cfg(feature = "raster")]
            ExportFormat::Jpeg => self.render_to_jpeg(frame),
            #[cfg(not(feature = "raster"))]
            ExportFormat::Png | ExportFormat::Jpeg => {
                Err(RenderError::Unsupported(format.extension()))
            }
        }
    }

    /// Render the frame to an SVG document at the canvas's pixel size.
    #[must_use]
    pub fn render_to_svg(&self, frame: &RenderFrame) -> String {
        let (w, h) = (frame.size.width, frame.size.height);

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        );

        let bg = &self.config.background;
        let bg_alpha = f32::from(bg[3]) / 255.0;
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"rgba({},{},{},{})\"/>",
            bg[0], bg[1], bg[2], bg_alpha,
        );

        if let Some(background) = &frame.background {
            let _ = write!(
                svg,
                "<image x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" preserveAspectRatio=\"none\" xlink:href=\"{}\"/>",
                background.to_data_url(),
            );
        }

        for node in &frame.nodes {
            match node {
                RenderNode::Sticker(sticker) => self.render_sticker(&mut svg, sticker),
                RenderNode::Text(text) => self.render_text(&mut svg, text),
            }
        }

        svg.push_str("</svg>");
        svg
    }

    /// Export the frame to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization or encoding fails.
    #[cfg(feature = "raster")]
    pub fn render_to_png(&self, frame: &RenderFrame) -> RenderResult<Vec<u8>> {
        let pixmap = self.rasterize(frame)?;
        pixmap.encode_png().map_err(|e| RenderError::Encode {
            format: "PNG",
            reason: e.to_string(),
        })
    }

    /// Export the frame to JPEG bytes, flattening alpha onto the configured
    /// background colour.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization or encoding fails.
    #[cfg(feature = "raster")]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_to_jpeg(&self, frame: &RenderFrame) -> RenderResult<Vec<u8>> {
        let pixmap = self.rasterize(frame)?;
        let (width, height) = (pixmap.width(), pixmap.height());
        let bg = &self.config.background;

        // tiny-skia pixels are premultiplied
        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        for pixel in pixmap.data().chunks_exact(4) {
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            for (&fg, &back) in pixel[..3].iter().zip(bg.iter()) {
                let value = f32::from(back).mul_add(inv, f32::from(fg));
                rgb.push(value.min(255.0) as u8);
            }
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Encode {
                format: "JPEG",
                reason: e.to_string(),
            })?;

        Ok(buf.into_inner())
    }

    #[cfg(feature = "raster")]
    fn rasterize(&self, frame: &RenderFrame) -> RenderResult<tiny_skia::Pixmap> {
        let svg = self.render_to_svg(frame);

        let mut opt = usvg::Options {
            resources_dir: self.config.asset_root.clone(),
            ..usvg::Options::default()
        };
        if self.config.load_system_fonts {
            opt.fontdb_mut().load_system_fonts();
        }
        let tree = usvg::Tree::from_str(&svg, &opt).map_err(|e| RenderError::Svg(e.to_string()))?;

        let (w, h) = (frame.size.width.max(1), frame.size.height.max(1));
        let mut pixmap = tiny_skia::Pixmap::new(w, h).ok_or(RenderError::Pixmap(w, h))?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        tracing::debug!(width = w, height = h, "Rasterized composition");
        Ok(pixmap)
    }

    fn render_text(&self, svg: &mut String, el: &TextElement) {
        let style = &el.style;
        let p = &el.placement;
        let font_size = style.font_size;
        let box_w = approx_text_width(&el.text, font_size) + 2.0 * TEXT_PADDING;
        let box_h = font_size + 2.0 * TEXT_PADDING;

        open_group(svg, p);

        if style.has_background {
            let pad_x = TEXT_PADDING / p.scale_x;
            let pad_y = TEXT_PADDING / p.scale_y;
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" fill=\"{}\" fill-opacity=\"{}\"",
                -pad_x,
                -pad_y,
                box_w + 2.0 * pad_x,
                box_h + 2.0 * pad_y,
                style.background_radius,
                escape_xml(&style.background_color),
                style.background_opacity,
            );
            if style.has_border {
                let _ = write!(
                    svg,
                    " stroke=\"{}\" stroke-width=\"{}\"",
                    escape_xml(&style.border_color),
                    style.border_width,
                );
            }
            svg.push_str("/>");
        }

        let (text_x, anchor) = match style.align {
            TextAlign::Left => (TEXT_PADDING, "start"),
            TextAlign::Center => (box_w / 2.0, "middle"),
            TextAlign::Right => (box_w - TEXT_PADDING, "end"),
        };
        let baseline = TEXT_PADDING + font_size * 0.8;
        let _ = write!(
            svg,
            "<text x=\"{text_x}\" y=\"{baseline}\" text-anchor=\"{anchor}\" font-size=\"{font_size}\" font-family=\"{}\" fill=\"{}\" opacity=\"{}\"",
            escape_xml(&style.font_family),
            escape_xml(&style.fill),
            style.opacity,
        );
        match style.font_style {
            FontStyle::Bold => svg.push_str(" font-weight=\"bold\""),
            FontStyle::Italic => svg.push_str(" font-style=\"italic\""),
            FontStyle::Normal => {}
        }
        if style.font_variant == FontVariant::SmallCaps {
            svg.push_str(" font-variant=\"small-caps\"");
        }
        if style.has_border {
            let _ = write!(
                svg,
                " stroke=\"{}\" stroke-width=\"{}\"",
                escape_xml(&style.border_color),
                style.border_width,
            );
        }
        let _ = write!(svg, ">{}</text>", escape_xml(&el.text));

        if el.is_selected && self.config.show_selection {
            selection_outline(svg, box_w, box_h);
        }
        svg.push_str("</g>");
    }

    fn render_sticker(&self, svg: &mut String, sticker: &StickerElement) {
        let size = self.config.sticker_size;
        open_group(svg, &sticker.placement);
        let _ = write!(
            svg,
            "<image width=\"{size}\" height=\"{size}\" xlink:href=\"{}\"/>",
            escape_xml(&self.resolve_href(&sticker.src)),
        );
        if sticker.is_selected && self.config.show_selection {
            selection_outline(svg, size, size);
        }
        svg.push_str("</g>");
    }

    /// Map a sticker `src` to something the rasterizer can load.
    fn resolve_href(&self, src: &str) -> String {
        if src.starts_with("data:") || src.contains("://") {
            return src.to_string();
        }
        match &self.config.asset_root {
            Some(root) => root
                .join(src.trim_start_matches('/'))
                .to_string_lossy()
                .into_owned(),
            None => src.to_string(),
        }
    }
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SceneRenderer for SvgRenderer {
    fn refresh_transformer(&mut self, target: Option<ElementRef>) {
        tracing::trace!(?target, "Transformer refreshed");
        self.transformer = target;
    }

    fn flatten(&mut self, frame: &RenderFrame) -> EditorResult<Vec<u8>> {
        Ok(self.export(frame, self.config.format)?)
    }

    fn file_extension(&self) -> &'static str {
        self.config.format.extension()
    }
}

fn open_group(svg: &mut String, p: &Placement) {
    let _ = write!(
        svg,
        "<g transform=\"translate({} {}) rotate({}) scale({} {})\">",
        p.x, p.y, p.rotation, p.scale_x, p.scale_y,
    );
}

fn selection_outline(svg: &mut String, width: f32, height: f32) {
    let _ = write!(
        svg,
        "<rect width=\"{width}\" height=\"{height}\" fill=\"none\" stroke=\"{SELECTION_COLOR}\" stroke-width=\"2\" stroke-dasharray=\"4 2\"/>",
    );
}

#[allow(clippy::cast_precision_loss)]
fn approx_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * GLYPH_ADVANCE
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
