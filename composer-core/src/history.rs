//! # Snapshot History
//!
//! Linear undo/redo over a bounded window of [`HistoryState`] snapshots.
//!
//! ```text
//!   past (oldest .. newest)      present        future (newest-undone .. )
//!  [s0] [s1] ... [s48] [s49]  ->  [live]  <-  [f0] [f1] ...
//! ```
//!
//! Every settled store mutation is offered to [`History::observe`]. Only a
//! change to the restricted fields (stickers, text elements, z-index counter,
//! background) moves the previous present into `past`; anything else is
//! coalesced away. When `past` exceeds the capacity the oldest snapshot is
//! dropped silently.

use std::collections::VecDeque;

use crate::document::{Document, ImageHandle};
use crate::element::{StickerElement, TextElement};

/// Default number of snapshots kept behind the present state.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// The subset of document fields tracked by history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryState {
    /// Placed stickers.
    pub stickers: Vec<StickerElement>,
    /// Placed text elements.
    pub text_elements: Vec<TextElement>,
    /// Z-index counter.
    pub max_z_index: i64,
    /// Background image.
    pub background_image: Option<ImageHandle>,
}

impl HistoryState {
    /// Capture the restricted fields of `document`.
    #[must_use]
    pub fn capture(document: &Document) -> Self {
        Self {
            stickers: document.stickers.clone(),
            text_elements: document.text_elements.clone(),
            max_z_index: document.max_z_index,
            background_image: document.background_image.clone(),
        }
    }

    /// Structural equality against the live document, without cloning it.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        self.max_z_index == document.max_z_index
            && self.background_image == document.background_image
            && self.stickers == document.stickers
            && self.text_elements == document.text_elements
    }

    /// Write the restricted fields back into `document`.
    pub fn restore_into(self, document: &mut Document) {
        document.stickers = self.stickers;
        document.text_elements = self.text_elements;
        document.max_z_index = self.max_z_index;
        document.background_image = self.background_image;
    }
}

/// Bounded linear undo/redo history.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<HistoryState>,
    present: HistoryState,
    future: Vec<HistoryState>,
    capacity: usize,
}

impl History {
    /// Create a history whose present is `initial`.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(initial: HistoryState, capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Offer a settled document state. Returns `true` if a snapshot was pushed.
    pub fn observe(&mut self, document: &Document) -> bool {
        if self.present.matches(document) {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, HistoryState::capture(document));
        self.past.push_back(previous);
        if self.past.len() > self.capacity {
            self.past.pop_front();
        }
        self.future.clear();
        true
    }

    /// Step back up to `steps` snapshots. Returns the new present, or `None`
    /// if there was nothing to undo.
    pub fn undo(&mut self, steps: usize) -> Option<&HistoryState> {
        let steps = steps.min(self.past.len());
        if steps == 0 {
            return None;
        }
        for _ in 0..steps {
            if let Some(state) = self.past.pop_back() {
                let current = std::mem::replace(&mut self.present, state);
                self.future.push(current);
            }
        }
        tracing::debug!(steps, remaining = self.past.len(), "History undo");
        Some(&self.present)
    }

    /// Step forward up to `steps` snapshots. Returns the new present, or
    /// `None` if there was nothing to redo.
    pub fn redo(&mut self, steps: usize) -> Option<&HistoryState> {
        let steps = steps.min(self.future.len());
        if steps == 0 {
            return None;
        }
        for _ in 0..steps {
            if let Some(state) = self.future.pop() {
                let current = std::mem::replace(&mut self.present, state);
                self.past.push_back(current);
            }
        }
        tracing::debug!(steps, remaining = self.future.len(), "History redo");
        Some(&self.present)
    }

    /// Discard every snapshot except the present one.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// The snapshot matching the live document.
    #[must_use]
    pub const fn present(&self) -> &HistoryState {
        &self.present
    }

    /// Number of snapshots available to undo.
    #[must_use]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Whether there is anything to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether there is anything to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Maximum number of snapshots kept behind the present.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(HistoryState::capture(&Document::default()), DEFAULT_HISTORY_CAPACITY)
    }
}
