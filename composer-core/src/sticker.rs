//! Sticker placement and palette management.

use crate::config::EditorConfig;
use crate::document::Document;
use crate::element::{
    AvailableSticker, ElementId, ElementRef, Placement, Point, StickerElement, TransformUpdate,
};
use crate::selection::SceneDraft;
use crate::store::DocumentStore;

/// Operations on the sticker collection and palette.
#[derive(Debug, Clone)]
pub struct StickerEngine {
    spawn: Point,
}

impl Default for StickerEngine {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl StickerEngine {
    /// Create an engine using the spawn point from `config`.
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            spawn: config.sticker_spawn,
        }
    }

    /// The selected sticker, if any.
    #[must_use]
    pub fn selected<'a>(&self, document: &'a Document) -> Option<&'a StickerElement> {
        document.selected_sticker()
    }

    /// Place a new sticker on top of everything and select it.
    pub fn add_sticker(&self, store: &mut DocumentStore, src: impl Into<String>) -> ElementId {
        let mut draft = SceneDraft::from_document(store.document());
        let z_index = draft.allocate_z_index();
        let sticker = StickerElement {
            id: ElementId::new(),
            placement: Placement::at(self.spawn),
            is_selected: false,
            src: src.into(),
            z_index,
        };
        let target = ElementRef::sticker(sticker.id);
        draft.stickers.push(sticker);
        draft.select_only(Some(target));
        store.update(draft.into_patch());

        tracing::debug!(id = %target.id, z_index, "Added sticker");
        target.id
    }

    /// Append a palette entry named `Sticker N`. Does not place it.
    pub fn add_available_sticker(&self, store: &mut DocumentStore, src: impl Into<String>) {
        let mut palette = store.document().available_stickers.clone();
        let name = format!("Sticker {}", palette.len() + 1);
        palette.push(AvailableSticker::new(name, src));
        store.set_available_stickers(palette);
    }

    /// Select a sticker and bring it to front.
    pub fn select(&self, store: &mut DocumentStore, id: ElementId) -> bool {
        let target = ElementRef::sticker(id);
        let mut draft = SceneDraft::from_document(store.document());
        if !draft.select_only(Some(target)) {
            return false;
        }
        draft.bring_to_front(target);
        store.update(draft.into_patch());
        true
    }

    /// Pointer went down on a sticker: make it the selected element.
    pub fn handle_drag_start(&self, store: &mut DocumentStore, id: ElementId) -> bool {
        let mut draft = SceneDraft::from_document(store.document());
        if !draft.select_only(Some(ElementRef::sticker(id))) {
            return false;
        }
        store.update(draft.into_patch());
        true
    }

    /// Commit the final position of a drag.
    pub fn handle_drag_end(
        &self,
        store: &mut DocumentStore,
        id: ElementId,
        position: Point,
    ) -> bool {
        self.edit(store, id, |el| el.placement.move_to(position))
    }

    /// Commit a transform gesture. `font_size` is ignored for stickers.
    pub fn handle_transform(
        &self,
        store: &mut DocumentStore,
        id: ElementId,
        update: &TransformUpdate,
    ) -> bool {
        self.edit(store, id, |el| el.placement.apply(update))
    }

    /// Remove a sticker.
    pub fn remove(&self, store: &mut DocumentStore, id: ElementId) -> bool {
        let mut draft = SceneDraft::from_document(store.document());
        if !draft.remove(ElementRef::sticker(id)) {
            return false;
        }
        store.update(draft.into_patch());
        tracing::debug!(%id, "Removed sticker");
        true
    }

    fn edit<F>(&self, store: &mut DocumentStore, id: ElementId, f: F) -> bool
    where
        F: FnOnce(&mut StickerElement),
    {
        let mut draft = SceneDraft::from_document(store.document());
        let Some(sticker) = draft.sticker_mut(id) else {
            return false;
        };
        f(sticker);
        store.update(draft.into_patch());
        true
    }
}
