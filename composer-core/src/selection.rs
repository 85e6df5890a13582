//! Selection exclusivity and z-order allocation.
//!
//! Both element engines edit a [`SceneDraft`], a working copy of the element
//! collections, and commit it as a single [`DocumentPatch`]. Every select,
//! create and deselect path goes through [`SceneDraft::select_only`], which
//! keeps these rules in one place:
//!
//! - at most one element across both collections is selected;
//! - a text element with blank text does not survive losing the selection;
//! - `current_text_input` follows the selected text element.
//!
//! Z-indices come from [`SceneDraft::allocate_z_index`], a single counter
//! shared by text and stickers, so anything brought to front renders above
//! every other element regardless of type.

use crate::document::{Document, DocumentPatch};
use crate::element::{
    CanvasElement, ElementId, ElementKind, ElementRef, StickerElement, TextElement,
};

/// Working copy of the element collections for one editing operation.
#[derive(Debug, Clone)]
pub struct SceneDraft {
    /// Text elements being edited.
    pub text_elements: Vec<TextElement>,
    /// Stickers being edited.
    pub stickers: Vec<StickerElement>,
    max_z_index: i64,
    text_was_selected: bool,
    reset_text_input: bool,
}

impl SceneDraft {
    /// Start a draft from the live document.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        Self {
            text_elements: document.text_elements.clone(),
            stickers: document.stickers.clone(),
            max_z_index: document.max_z_index,
            text_was_selected: document.selected_text().is_some(),
            reset_text_input: false,
        }
    }

    /// Current value of the z-index counter.
    #[must_use]
    pub const fn max_z_index(&self) -> i64 {
        self.max_z_index
    }

    /// Hand out the next z-index, strictly above every previous one.
    pub fn allocate_z_index(&mut self) -> i64 {
        self.max_z_index += 1;
        self.max_z_index
    }

    /// Whether `target` exists in the draft.
    #[must_use]
    pub fn contains(&self, target: ElementRef) -> bool {
        match target.kind {
            ElementKind::Text => self.text_elements.iter().any(|el| el.id == target.id),
            ElementKind::Sticker => self.stickers.iter().any(|el| el.id == target.id),
        }
    }

    /// Mutable access to a text element.
    pub fn text_mut(&mut self, id: ElementId) -> Option<&mut TextElement> {
        self.text_elements.iter_mut().find(|el| el.id == id)
    }

    /// Mutable access to a sticker.
    pub fn sticker_mut(&mut self, id: ElementId) -> Option<&mut StickerElement> {
        self.stickers.iter_mut().find(|el| el.id == id)
    }

    /// The selected element, if any.
    #[must_use]
    pub fn selected(&self) -> Option<ElementRef> {
        self.text_elements
            .iter()
            .find(|el| el.is_selected)
            .map(CanvasElement::element_ref)
            .or_else(|| {
                self.stickers
                    .iter()
                    .find(|el| el.is_selected)
                    .map(CanvasElement::element_ref)
            })
    }

    /// Make `target` the only selected element, or clear the selection when
    /// `target` is `None`.
    ///
    /// Blank text elements that lose the selection are removed. Returns
    /// `false` (changing nothing) if `target` does not exist.
    pub fn select_only(&mut self, target: Option<ElementRef>) -> bool {
        if let Some(target) = target {
            if !self.contains(target) {
                return false;
            }
        }

        let is_target = |r: ElementRef| Some(r) == target;

        self.text_elements.retain(|el| {
            let losing = el.is_selected && !is_target(el.element_ref());
            !(losing && el.is_blank())
        });
        for el in &mut self.text_elements {
            el.set_selected(is_target(el.element_ref()));
        }
        for el in &mut self.stickers {
            el.set_selected(is_target(el.element_ref()));
        }
        true
    }

    /// Clear the selection on both collections.
    pub fn deselect_all(&mut self) {
        self.select_only(None);
    }

    /// Reset `current_text_input` to empty on commit, even if no text element
    /// was selected.
    pub fn reset_text_input(&mut self) {
        self.reset_text_input = true;
    }

    /// Assign the next z-index to `target`. Returns the new z-index, or
    /// `None` if `target` does not exist.
    pub fn bring_to_front(&mut self, target: ElementRef) -> Option<i64> {
        if !self.contains(target) {
            return None;
        }
        let z = self.allocate_z_index();
        match target.kind {
            ElementKind::Text => self.text_mut(target.id).map(|el| el.set_z_index(z)),
            ElementKind::Sticker => self.sticker_mut(target.id).map(|el| el.set_z_index(z)),
        };
        Some(z)
    }

    /// Remove `target`. Returns `false` if it does not exist.
    pub fn remove(&mut self, target: ElementRef) -> bool {
        let before = self.text_elements.len() + self.stickers.len();
        match target.kind {
            ElementKind::Text => self.text_elements.retain(|el| el.id != target.id),
            ElementKind::Sticker => self.stickers.retain(|el| el.id != target.id),
        }
        before != self.text_elements.len() + self.stickers.len()
    }

    /// Turn the draft into a single store patch.
    #[must_use]
    pub fn into_patch(self) -> DocumentPatch {
        let selected_text = self
            .text_elements
            .iter()
            .find(|el| el.is_selected)
            .map(|el| el.text.clone());

        let current_text_input = match selected_text {
            Some(text) => Some(text),
            None if self.reset_text_input || self.text_was_selected => Some(String::new()),
            None => None,
        };

        DocumentPatch {
            stickers: Some(self.stickers),
            text_elements: Some(self.text_elements),
            max_z_index: Some(self.max_z_index),
            current_text_input,
            ..DocumentPatch::default()
        }
    }
}
