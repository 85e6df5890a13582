//! Document storage for one editor session.
//!
//! [`DocumentStore`] is the sole writer of the live [`Document`]. Every
//! mutation is a replace-with-patch: the patch is applied, the settled state is
//! offered to the [`History`], and subscribers are notified synchronously
//! before the call returns.

use crate::document::{CanvasSize, Document, DocumentPatch, ImageHandle};
use crate::element::{AvailableSticker, StickerElement, TextElement};
use crate::history::{History, HistoryState};

type Subscriber = Box<dyn FnMut(&Document)>;

/// Handle returned by [`DocumentStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Canonical state holder with snapshot history and change notification.
///
/// # Example
///
/// ```
/// use composer_core::store::DocumentStore;
/// use composer_core::{CanvasSize, Document, DocumentPatch};
///
/// let mut store = DocumentStore::new(Document::default(), 50, CanvasSize::default());
/// store.update(DocumentPatch {
///     current_text_input: Some("Hello".to_string()),
///     ..DocumentPatch::default()
/// });
/// assert_eq!(store.document().current_text_input, "Hello");
/// ```
pub struct DocumentStore {
    document: Document,
    history: History,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    default_canvas_size: CanvasSize,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("document", &self.document)
            .field("history", &self.history)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl DocumentStore {
    /// Create a store around `document`.
    ///
    /// `default_canvas_size` is the size the canvas falls back to whenever the
    /// background is cleared.
    #[must_use]
    pub fn new(document: Document, history_capacity: usize, default_canvas_size: CanvasSize) -> Self {
        let history = History::new(HistoryState::capture(&document), history_capacity);
        Self {
            document,
            history,
            subscribers: Vec::new(),
            next_subscription: 0,
            default_canvas_size,
        }
    }

    /// The live document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// The snapshot history.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Canvas size used when no background is loaded.
    #[must_use]
    pub const fn default_canvas_size(&self) -> CanvasSize {
        self.default_canvas_size
    }

    /// Register a callback invoked after every mutation.
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&Document) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Apply a multi-field patch atomically.
    ///
    /// Produces at most one history entry, and none when the restricted
    /// fields are unchanged.
    pub fn update(&mut self, patch: DocumentPatch) {
        if patch.is_empty() {
            return;
        }
        self.document.apply(patch);
        self.settle();
    }

    /// Replace the sticker collection.
    pub fn set_stickers(&mut self, stickers: Vec<StickerElement>) {
        self.update(DocumentPatch {
            stickers: Some(stickers),
            ..DocumentPatch::default()
        });
    }

    /// Replace the sticker palette.
    pub fn set_available_stickers(&mut self, available: Vec<AvailableSticker>) {
        self.update(DocumentPatch {
            available_stickers: Some(available),
            ..DocumentPatch::default()
        });
    }

    /// Replace the text collection.
    pub fn set_text_elements(&mut self, text_elements: Vec<TextElement>) {
        self.update(DocumentPatch {
            text_elements: Some(text_elements),
            ..DocumentPatch::default()
        });
    }

    /// Replace the current text input.
    pub fn set_current_text_input(&mut self, text: impl Into<String>) {
        self.update(DocumentPatch {
            current_text_input: Some(text.into()),
            ..DocumentPatch::default()
        });
    }

    /// Replace or remove the background image.
    pub fn set_background_image(&mut self, image: Option<ImageHandle>) {
        self.update(DocumentPatch {
            background_image: Some(image),
            ..DocumentPatch::default()
        });
    }

    /// Replace the canvas size.
    pub fn set_canvas_size(&mut self, size: CanvasSize) {
        self.update(DocumentPatch {
            canvas_size: Some(size),
            ..DocumentPatch::default()
        });
    }

    /// Replace the z-index counter.
    pub fn set_max_z_index(&mut self, max_z_index: i64) {
        self.update(DocumentPatch {
            max_z_index: Some(max_z_index),
            ..DocumentPatch::default()
        });
    }

    /// Undo up to `steps` snapshots. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self, steps: usize) -> bool {
        let Some(state) = self.history.undo(steps).cloned() else {
            return false;
        };
        self.restore(state);
        true
    }

    /// Redo up to `steps` snapshots. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self, steps: usize) -> bool {
        let Some(state) = self.history.redo(steps).cloned() else {
            return false;
        };
        self.restore(state);
        true
    }

    /// Discard all history, keeping the current state as the only snapshot.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn settle(&mut self) {
        if self.history.observe(&self.document) {
            tracing::trace!(
                past = self.history.past_len(),
                "Captured history snapshot"
            );
        }
        self.notify();
    }

    /// Swap a snapshot in and re-derive the untracked fields that mirror it.
    fn restore(&mut self, state: HistoryState) {
        let background_changed = state.background_image != self.document.background_image;
        let had_text_selected = self.document.selected_text().is_some();
        state.restore_into(&mut self.document);

        if background_changed {
            self.document.canvas_size = self
                .document
                .background_image
                .as_ref()
                .map_or(self.default_canvas_size, ImageHandle::size);
        }
        match self.document.selected_text() {
            Some(selected) => self.document.current_text_input = selected.text.clone(),
            // A draft typed with nothing selected is kept.
            None if had_text_selected => self.document.current_text_input.clear(),
            None => {}
        }
        self.notify();
    }

    fn notify(&mut self) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.document);
        }
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(
            Document::default(),
            crate::history::DEFAULT_HISTORY_CAPACITY,
            CanvasSize::default(),
        )
    }
}
