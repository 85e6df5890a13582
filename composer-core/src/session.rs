//! The editor session: one document, its history and the element engines.
//!
//! A host (browser bindings, the CLI, tests) owns an [`EditorSession`] and
//! feeds it user events. Work that has to wait for the renderer to catch up
//! with a state change is queued and handed to the renderer on the next
//! [`EditorSession::run_deferred`] call, which the host makes once per tick.

use std::collections::VecDeque;

use crate::config::EditorConfig;
use crate::document::{CanvasSize, Document, DocumentPatch, ImageHandle};
use crate::element::{
    ElementId, ElementKind, ElementRef, ElementStyle, FontStyle, Point, StyleChange, TextAlign,
    TransformUpdate,
};
use crate::error::{EditorError, EditorResult};
use crate::export::{ExportedImage, RenderFrame, SceneRenderer};
use crate::input::{HitTarget, KeyEvent, Shortcut};
use crate::intake;
use crate::selection::SceneDraft;
use crate::sticker::StickerEngine;
use crate::store::{DocumentStore, SubscriptionId};
use crate::text::TextEngine;

/// Work queued for the next renderer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    RefreshTransformer,
    Capture,
}

/// An interactive editing session.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    store: DocumentStore,
    text: TextEngine,
    stickers: StickerEngine,
    transformer: Option<ElementRef>,
    deferred: VecDeque<Deferred>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::build(EditorConfig::default())
    }
}

impl EditorSession {
    /// Start an empty session.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: EditorConfig) -> EditorResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EditorConfig) -> Self {
        let document = Document::new(
            config.available_stickers.clone(),
            config.default_canvas_size,
        );
        let store = DocumentStore::new(
            document,
            config.history_capacity,
            config.default_canvas_size,
        );
        tracing::debug!(
            history_capacity = config.history_capacity,
            width = config.default_canvas_size.width,
            height = config.default_canvas_size.height,
            "Editor session created"
        );
        Self {
            text: TextEngine::new(&config),
            stickers: StickerEngine::new(&config),
            config,
            store,
            transformer: None,
            deferred: VecDeque::new(),
        }
    }

    /// The configuration this session was built with.
    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The live document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        self.store.document()
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Register a callback invoked after every document change.
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&Document) + 'static,
    {
        self.store.subscribe(subscriber)
    }

    /// Remove a subscriber.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Element the transform control is attached to.
    #[must_use]
    pub const fn transformer(&self) -> Option<ElementRef> {
        self.transformer
    }

    /// Whether work is waiting for [`Self::run_deferred`].
    #[must_use]
    pub fn has_pending_tasks(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Whether an export capture is queued.
    #[must_use]
    pub fn export_pending(&self) -> bool {
        self.deferred.contains(&Deferred::Capture)
    }

    // Text

    /// Type into the text input.
    pub fn set_text_content(&mut self, text: &str) -> Option<ElementId> {
        let id = self.text.set_text_content(&mut self.store, text);
        self.sync_transformer();
        id
    }

    /// Select a text element and bring it to front.
    pub fn select_text(&mut self, id: ElementId) -> bool {
        let changed = self.text.select(&mut self.store, id);
        self.sync_transformer();
        changed
    }

    /// Pointer went down on a text element.
    pub fn text_drag_start(&mut self, id: ElementId) -> bool {
        let changed = self.text.handle_drag_start(&mut self.store, id);
        self.sync_transformer();
        changed
    }

    /// Commit a text drag.
    pub fn text_drag_end(&mut self, id: ElementId, position: Point) -> bool {
        self.text.handle_drag_end(&mut self.store, id, position)
    }

    /// Commit a transform gesture on a text element.
    pub fn text_transform(&mut self, id: ElementId, update: &TransformUpdate) -> bool {
        let changed = self.text.handle_transform(&mut self.store, id, update);
        if changed {
            self.defer(Deferred::RefreshTransformer);
        }
        changed
    }

    /// Apply a style change to the selected text element.
    pub fn change_style(&mut self, change: StyleChange) -> bool {
        self.text.change_style(&mut self.store, change)
    }

    /// Set the font style of the selected text element.
    pub fn change_font_style(&mut self, style: FontStyle) -> bool {
        self.text.change_font_style(&mut self.store, style)
    }

    /// Set the alignment of the selected text element.
    pub fn change_align(&mut self, align: TextAlign) -> bool {
        self.text.change_align(&mut self.store, align)
    }

    /// Toggle small caps on the selected text element.
    pub fn toggle_small_caps(&mut self) -> bool {
        self.text.toggle_small_caps(&mut self.store)
    }

    /// Style of the selected text element, or the default style.
    #[must_use]
    pub fn current_text_style(&self) -> ElementStyle {
        self.text.current_style(self.store.document())
    }

    /// Remove a text element, or the selected one when `id` is `None`.
    pub fn remove_text(&mut self, id: Option<ElementId>) -> bool {
        let changed = self.text.remove(&mut self.store, id);
        self.sync_transformer();
        changed
    }

    /// Deselect every text element.
    pub fn deselect_text(&mut self) {
        self.text.deselect_all(&mut self.store);
        self.sync_transformer();
    }

    // Stickers

    /// Place a sticker from the palette or any image reference.
    pub fn add_sticker(&mut self, src: impl Into<String>) -> ElementId {
        let id = self.stickers.add_sticker(&mut self.store, src);
        self.sync_transformer();
        id
    }

    /// Add a palette entry without placing it.
    pub fn add_available_sticker(&mut self, src: impl Into<String>) {
        self.stickers.add_available_sticker(&mut self.store, src);
    }

    /// Add an uploaded sticker file to the palette and place it.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ImageDecode`] if the file is not a recognised
    /// image. The document is left unchanged.
    pub fn upload_sticker(&mut self, bytes: &[u8]) -> EditorResult<ElementId> {
        let src = intake::sticker_source(bytes)?;
        self.add_available_sticker(src.clone());
        Ok(self.add_sticker(src))
    }

    /// Select a sticker and bring it to front.
    pub fn select_sticker(&mut self, id: ElementId) -> bool {
        let changed = self.stickers.select(&mut self.store, id);
        self.sync_transformer();
        changed
    }

    /// Pointer went down on a sticker.
    pub fn sticker_drag_start(&mut self, id: ElementId) -> bool {
        let changed = self.stickers.handle_drag_start(&mut self.store, id);
        self.sync_transformer();
        changed
    }

    /// Commit a sticker drag.
    pub fn sticker_drag_end(&mut self, id: ElementId, position: Point) -> bool {
        self.stickers.handle_drag_end(&mut self.store, id, position)
    }

    /// Commit a transform gesture on a sticker.
    pub fn sticker_transform(&mut self, id: ElementId, update: &TransformUpdate) -> bool {
        let changed = self.stickers.handle_transform(&mut self.store, id, update);
        if changed {
            self.defer(Deferred::RefreshTransformer);
        }
        changed
    }

    /// Remove a sticker.
    pub fn remove_sticker(&mut self, id: ElementId) -> bool {
        let changed = self.stickers.remove(&mut self.store, id);
        self.sync_transformer();
        changed
    }

    // Cross-collection

    /// Select any element and bring it to front.
    pub fn select(&mut self, target: ElementRef) -> bool {
        match target.kind {
            ElementKind::Text => self.select_text(target.id),
            ElementKind::Sticker => self.select_sticker(target.id),
        }
    }

    /// Move `target` above every other element without touching the selection.
    pub fn bring_to_front(&mut self, target: ElementRef) -> Option<i64> {
        let mut draft = SceneDraft::from_document(self.store.document());
        let z_index = draft.bring_to_front(target)?;
        self.store.update(draft.into_patch());
        Some(z_index)
    }

    /// Clear the selection on both collections and empty the text input.
    pub fn deselect_all(&mut self) {
        let mut draft = SceneDraft::from_document(self.store.document());
        draft.deselect_all();
        draft.reset_text_input();
        self.store.update(draft.into_patch());
        self.sync_transformer();
    }

    /// Delete whichever element is selected.
    pub fn delete_selected(&mut self) -> bool {
        match self.store.document().selected() {
            Some(ElementRef {
                id,
                kind: ElementKind::Text,
            }) => self.remove_text(Some(id)),
            Some(ElementRef {
                id,
                kind: ElementKind::Sticker,
            }) => self.remove_sticker(id),
            None => false,
        }
    }

    /// Route a pointer press on the stage.
    ///
    /// Returns `true` if the press cleared the selection.
    pub fn handle_stage_click(&mut self, target: HitTarget) -> bool {
        if !target.is_canvas_background() {
            return false;
        }
        self.deselect_all();
        self.transformer = None;
        true
    }

    /// Run the shortcut bound to `event`, if any.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<Shortcut> {
        let shortcut = Shortcut::from_key_event(event)?;
        match shortcut {
            Shortcut::DeleteSelected => {
                self.delete_selected();
            }
            Shortcut::Undo => {
                self.undo(1);
            }
            Shortcut::Redo => {
                self.redo(1);
            }
        }
        Some(shortcut)
    }

    // Background

    /// Decode an uploaded file and make it the background.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ImageDecode`] if the bytes cannot be decoded.
    /// The document is left unchanged in that case.
    pub fn upload_background(&mut self, bytes: &[u8]) -> EditorResult<()> {
        let handle = intake::decode_image(bytes)?;
        self.set_background(handle);
        Ok(())
    }

    /// Replace the background, clearing all elements and sizing the canvas
    /// to the image.
    pub fn set_background(&mut self, handle: ImageHandle) {
        let size = handle.size();
        tracing::info!(
            id = %handle.id,
            width = size.width,
            height = size.height,
            "Background image set"
        );
        self.replace_background(Some(handle), size);
    }

    /// Remove the background, clearing all elements and resetting the canvas
    /// size.
    pub fn remove_background(&mut self) {
        tracing::info!("Background image removed");
        self.replace_background(None, self.store.default_canvas_size());
    }

    fn replace_background(&mut self, background: Option<ImageHandle>, size: CanvasSize) {
        self.store.update(DocumentPatch {
            stickers: Some(Vec::new()),
            text_elements: Some(Vec::new()),
            current_text_input: Some(String::new()),
            background_image: Some(background),
            canvas_size: Some(size),
            ..DocumentPatch::default()
        });
        self.sync_transformer();
    }

    // History

    /// Undo up to `steps` operations.
    pub fn undo(&mut self, steps: usize) -> bool {
        let changed = self.store.undo(steps);
        self.sync_transformer();
        changed
    }

    /// Redo up to `steps` operations.
    pub fn redo(&mut self, steps: usize) -> bool {
        let changed = self.store.redo(steps);
        self.sync_transformer();
        changed
    }

    /// Forget all history.
    pub fn clear_history(&mut self) {
        self.store.clear_history();
    }

    // Export

    /// Clear the selection and queue a capture for the next tick.
    ///
    /// The capture runs in [`Self::run_deferred`], after the renderer has had
    /// a chance to draw the deselected state.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoBackground`] if there is nothing to export.
    pub fn prepare_for_export(&mut self) -> EditorResult<()> {
        if self.store.document().background_image.is_none() {
            return Err(EditorError::NoBackground);
        }
        self.deselect_all();
        self.transformer = None;
        self.defer(Deferred::RefreshTransformer);
        self.defer(Deferred::Capture);
        tracing::debug!("Export queued");
        Ok(())
    }

    /// Hand queued work to `renderer`.
    ///
    /// Returns the export result when a capture was queued.
    pub fn run_deferred(
        &mut self,
        renderer: &mut dyn SceneRenderer,
    ) -> Option<EditorResult<ExportedImage>> {
        let mut exported = None;
        while let Some(task) = self.deferred.pop_front() {
            match task {
                Deferred::RefreshTransformer => renderer.refresh_transformer(self.transformer),
                Deferred::Capture => exported = Some(self.capture(renderer)),
            }
        }
        exported
    }

    fn capture(&self, renderer: &mut dyn SceneRenderer) -> EditorResult<ExportedImage> {
        let frame = RenderFrame::from_document(self.store.document());
        let bytes = renderer.flatten(&frame)?;
        let image = ExportedImage::new(frame.size, bytes, renderer.file_extension());
        tracing::info!(
            file_name = %image.file_name,
            bytes = image.bytes.len(),
            "Composition exported"
        );
        Ok(image)
    }

    fn defer(&mut self, task: Deferred) {
        if !self.deferred.contains(&task) {
            self.deferred.push_back(task);
        }
    }

    /// Keep the transform control on the selected element.
    fn sync_transformer(&mut self) {
        let selected = self.store.document().selected();
        if selected != self.transformer {
            self.transformer = selected;
            self.defer(Deferred::RefreshTransformer);
        }
    }
}
