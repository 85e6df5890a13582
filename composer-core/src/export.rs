//! Flattening the composition into an image.
//!
//! The core does not draw anything itself. A [`SceneRenderer`] turns a
//! [`RenderFrame`] into encoded bytes; the session decides when that happens.

use serde::Serialize;

use crate::document::{CanvasSize, Document, ImageHandle};
use crate::element::{ElementRef, StickerElement, TextElement};
use crate::error::EditorResult;

/// One drawable element, in paint order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderNode {
    /// A placed sticker.
    Sticker(StickerElement),
    /// A text element.
    Text(TextElement),
}

impl RenderNode {
    /// Z-index of the node.
    #[must_use]
    pub const fn z_index(&self) -> i64 {
        match self {
            Self::Sticker(s) => s.z_index,
            Self::Text(t) => t.style.z_index,
        }
    }
}

/// Everything a renderer needs to draw the composition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    /// Output dimensions.
    pub size: CanvasSize,
    /// Background drawn at the origin, stretched to `size`.
    pub background: Option<ImageHandle>,
    /// Elements from bottom to top.
    pub nodes: Vec<RenderNode>,
}

impl RenderFrame {
    /// Build the frame for `document`.
    ///
    /// Nodes are ordered by ascending z-index. On equal z-index stickers
    /// paint before text.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        let mut nodes: Vec<RenderNode> = document
            .stickers
            .iter()
            .cloned()
            .map(RenderNode::Sticker)
            .chain(document.text_elements.iter().cloned().map(RenderNode::Text))
            .collect();
        nodes.sort_by_key(RenderNode::z_index);

        Self {
            size: document.canvas_size,
            background: document.background_image.clone(),
            nodes,
        }
    }
}

/// Drawing backend used by the session.
pub trait SceneRenderer {
    /// Re-attach the transform control after the element set changed.
    ///
    /// `target` is the element the control should wrap, if any.
    fn refresh_transformer(&mut self, target: Option<ElementRef>) {
        let _ = target;
    }

    /// Encode the frame as an image.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot produce the image.
    fn flatten(&mut self, frame: &RenderFrame) -> EditorResult<Vec<u8>>;

    /// File extension of the encoded output, without the dot.
    fn file_extension(&self) -> &'static str;
}

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Encoded image.
    pub bytes: Vec<u8>,
    /// Suggested download name, `composition_{w}x{h}.{ext}`.
    pub file_name: String,
}

impl ExportedImage {
    /// Wrap renderer output for a canvas of `size`.
    #[must_use]
    pub fn new(size: CanvasSize, bytes: Vec<u8>, extension: &str) -> Self {
        Self {
            width: size.width,
            height: size.height,
            bytes,
            file_name: format!("composition_{}x{}.{extension}", size.width, size.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementId, ElementStyle, Placement};

    #[test]
    fn test_frame_orders_by_z_with_stickers_first_on_ties() {
        let mut doc = Document::default();
        doc.text_elements.push(TextElement {
            id: ElementId::new(),
            text: "top".to_string(),
            placement: Placement::default(),
            style: ElementStyle {
                z_index: 4,
                ..ElementStyle::default()
            },
            is_selected: false,
        });
        doc.text_elements.push(TextElement {
            id: ElementId::new(),
            text: "tie".to_string(),
            placement: Placement::default(),
            style: ElementStyle {
                z_index: 2,
                ..ElementStyle::default()
            },
            is_selected: false,
        });
        for z in [2, 1] {
            doc.stickers.push(StickerElement {
                id: ElementId::new(),
                placement: Placement::default(),
                is_selected: false,
                src: format!("/{z}.svg"),
                z_index: z,
            });
        }

        let frame = RenderFrame::from_document(&doc);
        let order: Vec<(i64, bool)> = frame
            .nodes
            .iter()
            .map(|n| (n.z_index(), matches!(n, RenderNode::Text(_))))
            .collect();
        assert_eq!(order, vec![(1, false), (2, false), (2, true), (4, true)]);
    }

    #[test]
    fn test_file_name() {
        let export = ExportedImage::new(CanvasSize::new(640, 480), vec![1], "png");
        assert_eq!(export.file_name, "composition_640x480.png");
    }
}
