//! The editor document: element collections, palette, background and canvas size.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::element::{
    AvailableSticker, CanvasElement, ElementId, ElementKind, ElementRef, StickerElement,
    TextElement,
};

/// Default canvas width in pixels when no background is loaded.
pub const DEFAULT_CANVAS_WIDTH: u32 = 1024;

/// Default canvas height in pixels when no background is loaded.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 700;

/// Pixel dimensions of the composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width in pixels (> 0).
    pub width: u32,
    /// Height in pixels (> 0).
    pub height: u32,
}

impl CanvasSize {
    /// Create a canvas size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

/// Identity of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(Uuid);

impl ImageId {
    /// Create a new unique image ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// GIF image.
    Gif,
    /// WebP image.
    WebP,
    /// SVG vector image.
    Svg,
}

impl ImageFormat {
    /// MIME type used for data URLs.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Svg => "image/svg+xml",
        }
    }
}

/// A decoded background image.
///
/// Two handles are equal when they refer to the same decoded image; the pixel
/// bytes are shared and never compared.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageHandle {
    /// Identity of this decode.
    pub id: ImageId,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Encoded format of `bytes`.
    pub format: ImageFormat,
    /// Encoded image bytes.
    #[serde(skip)]
    pub bytes: Arc<Vec<u8>>,
}

impl ImageHandle {
    /// Natural dimensions of the image.
    #[must_use]
    pub const fn size(&self) -> CanvasSize {
        CanvasSize::new(self.width, self.height)
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// The complete editor document.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Placed stickers.
    pub stickers: Vec<StickerElement>,
    /// Sticker palette.
    pub available_stickers: Vec<AvailableSticker>,
    /// Placed text elements.
    pub text_elements: Vec<TextElement>,
    /// Text of the selected text element, or the draft of the next one.
    pub current_text_input: String,
    /// Loaded background image.
    pub background_image: Option<ImageHandle>,
    /// Pixel dimensions of the composition.
    pub canvas_size: CanvasSize,
    /// Highest z-index handed out so far.
    pub max_z_index: i64,
}

impl Document {
    /// Create an empty document with the given palette and canvas size.
    #[must_use]
    pub fn new(available_stickers: Vec<AvailableSticker>, canvas_size: CanvasSize) -> Self {
        Self {
            available_stickers,
            canvas_size,
            ..Self::default()
        }
    }

    /// Apply a partial patch; fields absent from the patch are kept.
    pub fn apply(&mut self, patch: DocumentPatch) {
        if let Some(stickers) = patch.stickers {
            self.stickers = stickers;
        }
        if let Some(available) = patch.available_stickers {
            self.available_stickers = available;
        }
        if let Some(text_elements) = patch.text_elements {
            self.text_elements = text_elements;
        }
        if let Some(input) = patch.current_text_input {
            self.current_text_input = input;
        }
        if let Some(background) = patch.background_image {
            self.background_image = background;
        }
        if let Some(size) = patch.canvas_size {
            self.canvas_size = size;
        }
        if let Some(max_z) = patch.max_z_index {
            self.max_z_index = max_z;
        }
    }

    /// Look up a text element by id.
    #[must_use]
    pub fn text_element(&self, id: ElementId) -> Option<&TextElement> {
        self.text_elements.iter().find(|el| el.id == id)
    }

    /// Look up a sticker by id.
    #[must_use]
    pub fn sticker(&self, id: ElementId) -> Option<&StickerElement> {
        self.stickers.iter().find(|el| el.id == id)
    }

    /// Whether `target` resolves to a live element.
    #[must_use]
    pub fn contains(&self, target: ElementRef) -> bool {
        match target.kind {
            ElementKind::Text => self.text_element(target.id).is_some(),
            ElementKind::Sticker => self.sticker(target.id).is_some(),
        }
    }

    /// The selected text element, if any.
    #[must_use]
    pub fn selected_text(&self) -> Option<&TextElement> {
        self.text_elements.iter().find(|el| el.is_selected)
    }

    /// The selected sticker, if any.
    #[must_use]
    pub fn selected_sticker(&self) -> Option<&StickerElement> {
        self.stickers.iter().find(|el| el.is_selected)
    }

    /// The selected element across both collections.
    #[must_use]
    pub fn selected(&self) -> Option<ElementRef> {
        self.selected_text()
            .map(CanvasElement::element_ref)
            .or_else(|| self.selected_sticker().map(CanvasElement::element_ref))
    }

    /// Number of selected elements across both collections.
    #[must_use]
    pub fn selection_count(&self) -> usize {
        self.text_elements.iter().filter(|el| el.is_selected).count()
            + self.stickers.iter().filter(|el| el.is_selected).count()
    }

    /// Total number of placed elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.text_elements.len() + self.stickers.len()
    }

    /// Whether no elements are placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text_elements.is_empty() && self.stickers.is_empty()
    }

    /// Serialize the document to JSON (background pixels excluded).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> crate::EditorResult<String> {
        serde_json::to_string(self).map_err(crate::EditorError::Serialization)
    }
}

/// A partial document update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    /// Replacement sticker collection.
    pub stickers: Option<Vec<StickerElement>>,
    /// Replacement palette.
    pub available_stickers: Option<Vec<AvailableSticker>>,
    /// Replacement text collection.
    pub text_elements: Option<Vec<TextElement>>,
    /// Replacement text input.
    pub current_text_input: Option<String>,
    /// Replacement background; `Some(None)` removes it.
    pub background_image: Option<Option<ImageHandle>>,
    /// Replacement canvas size.
    pub canvas_size: Option<CanvasSize>,
    /// Replacement z-index counter.
    pub max_z_index: Option<i64>,
}

impl DocumentPatch {
    /// Whether the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementStyle, Placement};

    fn text(label: &str, selected: bool, z: i64) -> TextElement {
        TextElement {
            id: ElementId::new(),
            text: label.to_string(),
            placement: Placement::default(),
            style: ElementStyle {
                z_index: z,
                ..ElementStyle::default()
            },
            is_selected: selected,
        }
    }

    #[test]
    fn test_patch_keeps_unspecified_fields() {
        let mut doc = Document::new(
            vec![AvailableSticker::new("a", "/a.svg")],
            CanvasSize::default(),
        );
        doc.text_elements.push(text("Hi", false, 1));
        doc.current_text_input = "draft".to_string();

        doc.apply(DocumentPatch {
            max_z_index: Some(4),
            ..DocumentPatch::default()
        });

        assert_eq!(doc.max_z_index, 4);
        assert_eq!(doc.text_elements.len(), 1);
        assert_eq!(doc.current_text_input, "draft");
        assert_eq!(doc.available_stickers.len(), 1);
    }

    #[test]
    fn test_patch_can_clear_background() {
        let mut doc = Document::default();
        doc.background_image = Some(ImageHandle {
            id: ImageId::new(),
            width: 10,
            height: 20,
            format: ImageFormat::Png,
            bytes: Arc::new(Vec::new()),
        });

        doc.apply(DocumentPatch::default());
        assert!(doc.background_image.is_some());

        doc.apply(DocumentPatch {
            background_image: Some(None),
            ..DocumentPatch::default()
        });
        assert!(doc.background_image.is_none());
    }

    #[test]
    fn test_selection_queries() {
        let mut doc = Document::default();
        assert!(doc.selected().is_none());
        assert!(DocumentPatch::default().is_empty());

        let selected = text("b", true, 3);
        let selected_ref = selected.element_ref();
        doc.text_elements.push(text("a", false, 1));
        doc.text_elements.push(selected);

        assert_eq!(doc.selected(), Some(selected_ref));
        assert_eq!(doc.selection_count(), 1);
        assert!(doc.contains(selected_ref));
    }

    #[test]
    fn test_image_handles_compare_by_identity() {
        let a = ImageHandle {
            id: ImageId::new(),
            width: 1,
            height: 1,
            format: ImageFormat::Png,
            bytes: Arc::new(vec![1, 2, 3]),
        };
        let mut b = a.clone();
        assert_eq!(a, b);
        b.id = ImageId::new();
        assert_ne!(a, b);
    }
}
