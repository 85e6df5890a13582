//! Editor action scripts.
//!
//! A script is a JSON document listing user actions in order:
//!
//! ```json
//! {
//!   "actions": [
//!     { "action": "uploadBackground", "path": "photo.png" },
//!     { "action": "setText", "text": "Hello" },
//!     { "action": "changeStyle", "change": { "key": "fill", "value": "#ff0000" } },
//!     { "action": "addSticker", "src": "/1.svg" },
//!     { "action": "export" }
//!   ]
//! }
//! ```
//!
//! Elements are addressed by their position in the text or sticker
//! collection, since ids are generated at run time.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use composer_core::{
    EditorSession, ElementId, FontStyle, HitTarget, KeyEvent, Point, StyleChange, TextAlign,
    TransformUpdate,
};
use serde::Deserialize;

/// A parsed script.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Actions in execution order.
    pub actions: Vec<Action>,
}

impl Script {
    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a script.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Malformed action script")
    }

    /// Read and parse a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::from_json(&json)
    }
}

const fn one() -> usize {
    1
}

/// One user action.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    /// Load a background image file.
    UploadBackground {
        /// Image file, relative to the script.
        path: PathBuf,
    },
    /// Remove the background and every element.
    RemoveBackground,
    /// Add a sticker file to the palette and place it.
    UploadSticker {
        /// Image file, relative to the script.
        path: PathBuf,
    },
    /// Place a sticker.
    AddSticker {
        /// Sticker image reference.
        src: String,
    },
    /// Place the palette entry at `index`.
    PlacePaletteSticker {
        /// Palette position.
        index: usize,
    },
    /// Type into the text input.
    SetText {
        /// New input content.
        text: String,
    },
    /// Select a text element.
    SelectText {
        /// Position in the text collection.
        index: usize,
    },
    /// Select a sticker.
    SelectSticker {
        /// Position in the sticker collection.
        index: usize,
    },
    /// Drag a text element to a new position.
    DragText {
        /// Position in the text collection.
        index: usize,
        /// Drop X.
        x: f32,
        /// Drop Y.
        y: f32,
    },
    /// Drag a sticker to a new position.
    DragSticker {
        /// Position in the sticker collection.
        index: usize,
        /// Drop X.
        x: f32,
        /// Drop Y.
        y: f32,
    },
    /// Commit a transform on a text element.
    TransformText {
        /// Position in the text collection.
        index: usize,
        /// Transformed values.
        transform: TransformUpdate,
    },
    /// Commit a transform on a sticker.
    TransformSticker {
        /// Position in the sticker collection.
        index: usize,
        /// Transformed values.
        transform: TransformUpdate,
    },
    /// Change a style property of the selected text element.
    ChangeStyle {
        /// The property and its new value.
        change: StyleChange,
    },
    /// Set the font style of the selected text element.
    SetFontStyle {
        /// New font style.
        style: FontStyle,
    },
    /// Set the alignment of the selected text element.
    SetAlign {
        /// New alignment.
        align: TextAlign,
    },
    /// Toggle small caps on the selected text element.
    ToggleSmallCaps,
    /// Remove a text element, or the selected one.
    RemoveText {
        /// Position in the text collection.
        #[serde(default)]
        index: Option<usize>,
    },
    /// Remove a sticker.
    RemoveSticker {
        /// Position in the sticker collection.
        index: usize,
    },
    /// Clear the selection.
    DeselectAll,
    /// Press on the stage.
    StageClick {
        /// What the press landed on.
        target: HitTarget,
    },
    /// Press a key.
    Key {
        /// The key event.
        event: KeyEvent,
    },
    /// Undo operations.
    Undo {
        /// Number of operations.
        #[serde(default = "one")]
        steps: usize,
    },
    /// Redo operations.
    Redo {
        /// Number of operations.
        #[serde(default = "one")]
        steps: usize,
    },
    /// Forget undo history.
    ClearHistory,
    /// Deselect everything and export on the next tick.
    Export,
}

impl Action {
    /// Run the action against `session`.
    ///
    /// Element positions that do not resolve are logged and skipped, the
    /// same way the editor ignores stale element ids.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced file cannot be read or decoded, or an
    /// export is requested without a background.
    pub fn apply(&self, session: &mut EditorSession, base_dir: &Path) -> Result<()> {
        match self {
            Self::UploadBackground { path } => {
                let bytes = read_asset(base_dir, path)?;
                session
                    .upload_background(&bytes)
                    .with_context(|| format!("Background {} rejected", path.display()))?;
            }
            Self::RemoveBackground => session.remove_background(),
            Self::UploadSticker { path } => {
                let bytes = read_asset(base_dir, path)?;
                session
                    .upload_sticker(&bytes)
                    .with_context(|| format!("Sticker {} rejected", path.display()))?;
            }
            Self::AddSticker { src } => {
                session.add_sticker(src.as_str());
            }
            Self::PlacePaletteSticker { index } => {
                let src = session
                    .document()
                    .available_stickers
                    .get(*index)
                    .map(|entry| entry.src.clone());
                match src {
                    Some(src) => {
                        session.add_sticker(src);
                    }
                    None => tracing::warn!(index, "No palette entry at index"),
                }
            }
            Self::SetText { text } => {
                session.set_text_content(text);
            }
            Self::SelectText { index } => {
                if let Some(id) = text_at(session, *index) {
                    session.select_text(id);
                }
            }
            Self::SelectSticker { index } => {
                if let Some(id) = sticker_at(session, *index) {
                    session.select_sticker(id);
                }
            }
            Self::DragText { index, x, y } => {
                if let Some(id) = text_at(session, *index) {
                    session.text_drag_start(id);
                    session.text_drag_end(id, Point::new(*x, *y));
                }
            }
            Self::DragSticker { index, x, y } => {
                if let Some(id) = sticker_at(session, *index) {
                    session.sticker_drag_start(id);
                    session.sticker_drag_end(id, Point::new(*x, *y));
                }
            }
            Self::TransformText { index, transform } => {
                if let Some(id) = text_at(session, *index) {
                    session.text_transform(id, transform);
                }
            }
            Self::TransformSticker { index, transform } => {
                if let Some(id) = sticker_at(session, *index) {
                    session.sticker_transform(id, transform);
                }
            }
            Self::ChangeStyle { change } => {
                if !session.change_style(change.clone()) {
                    tracing::debug!(?change, "Style change had no effect");
                }
            }
            Self::SetFontStyle { style } => {
                session.change_font_style(*style);
            }
            Self::SetAlign { align } => {
                session.change_align(*align);
            }
            Self::ToggleSmallCaps => {
                session.toggle_small_caps();
            }
            Self::RemoveText { index } => {
                let id = match index {
                    Some(index) => match text_at(session, *index) {
                        Some(id) => Some(id),
                        None => return Ok(()),
                    },
                    None => None,
                };
                session.remove_text(id);
            }
            Self::RemoveSticker { index } => {
                if let Some(id) = sticker_at(session, *index) {
                    session.remove_sticker(id);
                }
            }
            Self::DeselectAll => session.deselect_all(),
            Self::StageClick { target } => {
                session.handle_stage_click(*target);
            }
            Self::Key { event } => {
                if session.handle_key(event).is_none() {
                    tracing::debug!(key = %event.key, "Key has no binding");
                }
            }
            Self::Undo { steps } => {
                session.undo(*steps);
            }
            Self::Redo { steps } => {
                session.redo(*steps);
            }
            Self::ClearHistory => session.clear_history(),
            Self::Export => session.prepare_for_export()?,
        }
        Ok(())
    }
}

fn read_asset(base_dir: &Path, path: &Path) -> Result<Vec<u8>> {
    let full = base_dir.join(path);
    std::fs::read(&full).with_context(|| format!("Failed to read {}", full.display()))
}

fn text_at(session: &EditorSession, index: usize) -> Option<ElementId> {
    let id = session.document().text_elements.get(index).map(|t| t.id);
    if id.is_none() {
        tracing::warn!(index, "No text element at index");
    }
    id
}

fn sticker_at(session: &EditorSession, index: usize) -> Option<ElementId> {
    let id = session.document().stickers.get(index).map(|s| s.id);
    if id.is_none() {
        tracing::warn!(index, "No sticker at index");
    }
    id
}
