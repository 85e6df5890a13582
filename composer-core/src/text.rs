//! Text element editing: creation, content, styling, transforms and removal.

use crate::config::EditorConfig;
use crate::document::Document;
use crate::element::{
    CanvasElement, ElementId, ElementRef, ElementStyle, FontStyle, Placement, Point, StyleChange,
    TextAlign, TextElement, TransformUpdate,
};
use crate::selection::SceneDraft;
use crate::store::DocumentStore;

/// Operations on the text element collection.
#[derive(Debug, Clone)]
pub struct TextEngine {
    spawn: Point,
    default_style: ElementStyle,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl TextEngine {
    /// Create an engine using the spawn point and style from `config`.
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            spawn: config.text_spawn,
            default_style: config.text_style.clone(),
        }
    }

    /// The selected text element, if any.
    #[must_use]
    pub fn selected<'a>(&self, document: &'a Document) -> Option<&'a TextElement> {
        document.selected_text()
    }

    /// Style of the selected element, or the default style when none is selected.
    #[must_use]
    pub fn current_style(&self, document: &Document) -> ElementStyle {
        document
            .selected_text()
            .map_or_else(|| self.default_style.clone(), |el| el.style.clone())
    }

    /// Edit the selected element's text, or create a new element when none is
    /// selected and `text` has visible content.
    ///
    /// Returns the id of the edited or created element.
    pub fn set_text_content(&self, store: &mut DocumentStore, text: &str) -> Option<ElementId> {
        let mut draft = SceneDraft::from_document(store.document());

        if let Some(selected) = draft.text_elements.iter_mut().find(|el| el.is_selected) {
            selected.text = text.to_string();
            let id = selected.id;
            store.update(draft.into_patch());
            return Some(id);
        }

        if text.trim().is_empty() {
            return None;
        }

        let z_index = draft.allocate_z_index();
        let element = TextElement {
            id: ElementId::new(),
            text: text.to_string(),
            placement: Placement::at(self.spawn),
            style: ElementStyle {
                z_index,
                ..self.default_style.clone()
            },
            is_selected: false,
        };
        let target = ElementRef::text(element.id);
        draft.text_elements.push(element);
        draft.select_only(Some(target));
        store.update(draft.into_patch());

        tracing::debug!(id = %target.id, z_index, "Created text element");
        Some(target.id)
    }

    /// Select a text element and bring it to front.
    ///
    /// Returns `false` if the element no longer exists.
    pub fn select(&self, store: &mut DocumentStore, id: ElementId) -> bool {
        let target = ElementRef::text(id);
        let mut draft = SceneDraft::from_document(store.document());
        if !draft.select_only(Some(target)) {
            return false;
        }
        draft.bring_to_front(target);
        store.update(draft.into_patch());
        true
    }

    /// Pointer went down on a text element: select it if it is not already
    /// selected, without changing its z-order.
    pub fn handle_drag_start(&self, store: &mut DocumentStore, id: ElementId) -> bool {
        let target = ElementRef::text(id);
        if store.document().selected() == Some(target) {
            return true;
        }
        let mut draft = SceneDraft::from_document(store.document());
        if !draft.select_only(Some(target)) {
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

    /// Commit a transform gesture.
    pub fn handle_transform(
        &self,
        store: &mut DocumentStore,
        id: ElementId,
        update: &TransformUpdate,
    ) -> bool {
        self.edit(store, id, |el| {
            el.placement.apply(update);
            if let Some(size) = update.font_size {
                el.style.apply(StyleChange::FontSize(size));
            }
        })
    }

    /// Apply a style change to the selected element.
    ///
    /// Returns `false` if nothing is selected or the change had no effect.
    pub fn change_style(&self, store: &mut DocumentStore, change: StyleChange) -> bool {
        let Some(id) = store.document().selected_text().map(|el| el.id) else {
            return false;
        };
        let mut changed = false;
        self.edit(store, id, |el| changed = el.style.apply(change));
        changed
    }

    /// Set the font style of the selected element.
    pub fn change_font_style(&self, store: &mut DocumentStore, style: FontStyle) -> bool {
        self.change_style(store, StyleChange::FontStyle(style))
    }

    /// Set the alignment of the selected element.
    pub fn change_align(&self, store: &mut DocumentStore, align: TextAlign) -> bool {
        self.change_style(store, StyleChange::Align(align))
    }

    /// Flip the selected element between normal and small caps.
    pub fn toggle_small_caps(&self, store: &mut DocumentStore) -> bool {
        let Some(variant) = store
            .document()
            .selected_text()
            .map(|el| el.style.font_variant.toggled())
        else {
            return false;
        };
        self.change_style(store, StyleChange::FontVariant(variant))
    }

    /// Remove the element with `id`, or the selected element when `id` is `None`.
    pub fn remove(&self, store: &mut DocumentStore, id: Option<ElementId>) -> bool {
        let Some(id) = id.or_else(|| store.document().selected_text().map(|el| el.id)) else {
            return false;
        };
        let mut draft = SceneDraft::from_document(store.document());
        if !draft.remove(ElementRef::text(id)) {
            return false;
        }
        store.update(draft.into_patch());
        tracing::debug!(%id, "Removed text element");
        true
    }

    /// Deselect every text element, pruning the previously selected one if
    /// its text is blank, and clear the text input.
    pub fn deselect_all(&self, store: &mut DocumentStore) {
        let keep = store
            .document()
            .selected_sticker()
            .map(CanvasElement::element_ref);
        let mut draft = SceneDraft::from_document(store.document());
        draft.select_only(keep);
        draft.reset_text_input();
        store.update(draft.into_patch());
    }

    fn edit<F>(&self, store: &mut DocumentStore, id: ElementId, f: F) -> bool
    where
        F: FnOnce(&mut TextElement),
    {
        let mut draft = SceneDraft::from_document(store.document());
        let Some(element) = draft.text_mut(id) else {
            return false;
        };
        f(element);
        store.update(draft.into_patch());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::FontVariant;

    fn setup() -> (TextEngine, DocumentStore) {
        (TextEngine::default(), DocumentStore::default())
    }

    #[test]
    fn test_whitespace_does_not_create_element() {
        let (engine, mut store) = setup();
        assert!(engine.set_text_content(&mut store, "   ").is_none());
        assert!(store.document().is_empty());
        assert!(!store.history().can_undo());
    }

    #[test]
    fn test_typing_edits_selected_element() {
        let (engine, mut store) = setup();
        let id = engine.set_text_content(&mut store, "H").expect("created");
        assert_eq!(engine.set_text_content(&mut store, "Hello"), Some(id));

        let doc = store.document();
        assert_eq!(doc.text_elements.len(), 1);
        assert_eq!(doc.text_elements[0].text, "Hello");
        assert_eq!(doc.current_text_input, "Hello");
    }

    #[test]
    fn test_new_element_uses_spawn_point() {
        let (engine, mut store) = setup();
        engine.set_text_content(&mut store, "Hi");
        let el = &store.document().text_elements[0];
        assert!((el.placement.x - 200.0).abs() < f32::EPSILON);
        assert!((el.placement.y - 200.0).abs() < f32::EPSILON);
        assert_eq!(el.style.font_family, "Arial");
    }

    #[test]
    fn test_style_requires_selection() {
        let (engine, mut store) = setup();
        assert!(!engine.change_font_style(&mut store, FontStyle::Bold));

        engine.set_text_content(&mut store, "Hi");
        assert!(engine.change_font_style(&mut store, FontStyle::Italic));
        assert!(engine.change_align(&mut store, TextAlign::Left));
        assert!(engine.toggle_small_caps(&mut store));

        let style = engine.current_style(store.document());
        assert_eq!(style.font_style, FontStyle::Italic);
        assert_eq!(style.align, TextAlign::Left);
        assert_eq!(style.font_variant, FontVariant::SmallCaps);

        assert!(engine.toggle_small_caps(&mut store));
        assert_eq!(
            engine.current_style(store.document()).font_variant,
            FontVariant::Normal
        );
    }

    #[test]
    fn test_current_style_falls_back_to_default() {
        let (engine, mut store) = setup();
        engine.set_text_content(&mut store, "Hi");
        engine.change_style(&mut store, StyleChange::Fill("#ff0000".to_string()));
        engine.deselect_all(&mut store);
        assert_eq!(engine.current_style(store.document()), ElementStyle::default());
    }

    #[test]
    fn test_transform_overwrites_font_size() {
        let (engine, mut store) = setup();
        let id = engine.set_text_content(&mut store, "Hi").expect("created");
        let update = TransformUpdate {
            x: 12.0,
            y: 34.0,
            rotation: 90.0,
            scale_x: 2.0,
            scale_y: 3.0,
            font_size: Some(48.0),
        };
        assert!(engine.handle_transform(&mut store, id, &update));

        let el = store.document().text_element(id).expect("exists");
        assert!((el.style.font_size - 48.0).abs() < f32::EPSILON);
        assert!((el.placement.scale_y - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_stale_ids_are_ignored() {
        let (engine, mut store) = setup();
        let stale = ElementId::new();
        assert!(!engine.select(&mut store, stale));
        assert!(!engine.handle_drag_start(&mut store, stale));
        assert!(!engine.handle_drag_end(&mut store, stale, Point::new(1.0, 1.0)));
        assert!(!engine.remove(&mut store, Some(stale)));
        assert!(!engine.remove(&mut store, None));
        assert!(!store.history().can_undo());
    }

    #[test]
    fn test_drag_start_selects_without_reordering() {
        let (engine, mut store) = setup();
        let first = engine.set_text_content(&mut store, "one").expect("created");
        engine.deselect_all(&mut store);
        engine.set_text_content(&mut store, "two");

        assert!(engine.handle_drag_start(&mut store, first));
        let doc = store.document();
        let el = doc.text_element(first).expect("exists");
        assert!(el.is_selected);
        assert_eq!(el.style.z_index, 1);
        assert_eq!(doc.max_z_index, 2);
        assert_eq!(doc.current_text_input, "one");
    }
}
