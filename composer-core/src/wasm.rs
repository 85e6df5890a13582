//! WebAssembly bindings for composer-core.
//!
//! The browser owns the canvas. It calls into [`WasmEditor`] for every user
//! event, re-renders from [`WasmEditor::get_document_json`], and calls
//! [`WasmEditor::run_deferred`] once per animation frame.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{
    EditorConfig, EditorResult, EditorSession, ElementId, ElementRef, HitTarget, KeyEvent, Point,
    RenderFrame, SceneRenderer, StyleChange, TransformUpdate,
};

/// Initialize the composer WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Work the page has to carry out after a tick.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct TickReport {
    refresh_transformer: bool,
    transformer: Option<ElementRef>,
    export: Option<ExportRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRequest {
    file_name: String,
    frame: RenderFrame,
}

/// Collects renderer calls so they can be handed to JavaScript.
#[derive(Default)]
struct PageBridge {
    report: TickReport,
    frame: Option<RenderFrame>,
}

impl SceneRenderer for PageBridge {
    fn refresh_transformer(&mut self, target: Option<ElementRef>) {
        self.report.refresh_transformer = true;
        self.report.transformer = target;
    }

    fn flatten(&mut self, frame: &RenderFrame) -> EditorResult<Vec<u8>> {
        self.frame = Some(frame.clone());
        Ok(Vec::new())
    }

    fn file_extension(&self) -> &'static str {
        "png"
    }
}

/// Editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    session: EditorSession,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor with the default configuration.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: EditorSession::default(),
        }
    }

    /// Create an editor from a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error string if the configuration is malformed or invalid.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<WasmEditor, String> {
        let config = EditorConfig::from_json(json).map_err(|e| e.to_string())?;
        let session = EditorSession::new(config).map_err(|e| e.to_string())?;
        Ok(Self { session })
    }

    /// Get the current document as JSON.
    #[wasm_bindgen(js_name = getDocumentJson)]
    #[must_use]
    pub fn get_document_json(&self) -> String {
        self.session.document().to_json().unwrap_or_default()
    }

    /// Get the current elements in paint order as JSON.
    #[wasm_bindgen(js_name = getRenderFrameJson)]
    #[must_use]
    pub fn get_render_frame_json(&self) -> String {
        serde_json::to_string(&RenderFrame::from_document(self.session.document()))
            .unwrap_or_default()
    }

    /// Type into the text input. Returns the edited or created element id.
    #[wasm_bindgen(js_name = setTextContent)]
    pub fn set_text_content(&mut self, text: &str) -> Option<String> {
        self.session.set_text_content(text).map(|id| id.to_string())
    }

    /// Select a text element.
    ///
    /// # Errors
    ///
    /// Returns an error string if `id` is not a valid element id.
    #[wasm_bindgen(js_name = selectText)]
    pub fn select_text(&mut self, id: &str) -> Result<bool, String> {
        Ok(self.session.select_text(parse_id(id)?))
    }

    /// Pointer down on a text element.
    ///
    /// # Errors
    ///
    /// Returns an error string if `id` is not a valid element id.
    #[wasm_bindgen(js_name = textDragStart)]
    pub fn text_drag_start(&mut self, id: &str) -> Result<bool, String> {
        Ok(self.session.text_drag_start(parse_id(id)?))
    }

    /// Commit a text drag.
    ///
    /// # Errors
    ///
    /// Returns an error string if `id` is not a valid element id.
    #[wasm_bindgen(js_name = textDragEnd)]
    pub fn text_drag_end(&mut self, id: &str, x: f32, y: f32) -> Result<bool, String> {
        Ok(self.session.text_drag_end(parse_id(id)?, Point::new(x, y)))
    }

    /// Commit a text transform given as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the id or transform JSON is invalid.
    #[wasm_bindgen(js_name = textTransform)]
    pub fn text_transform(&mut self, id: &str, json: &str) -> Result<bool, String> {
        let update = parse_transform(json)?;
        Ok(self.session.text_transform(parse_id(id)?, &update))
    }

    /// Apply a `{"key": ..., "value": ...}` style change to the selected text.
    ///
    /// # Errors
    ///
    /// Returns an error string if the change JSON is invalid.
    #[wasm_bindgen(js_name = changeStyle)]
    pub fn change_style(&mut self, json: &str) -> Result<bool, String> {
        let change: StyleChange = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(self.session.change_style(change))
    }

    /// Toggle small caps on the selected text.
    #[wasm_bindgen(js_name = toggleSmallCaps)]
    pub fn toggle_small_caps(&mut self) -> bool {
        self.session.toggle_small_caps()
    }

    /// Style shown in the text controls, as JSON.
    #[wasm_bindgen(js_name = getCurrentTextStyleJson)]
    #[must_use]
    pub fn get_current_text_style_json(&self) -> String {
        serde_json::to_string(&self.session.current_text_style()).unwrap_or_default()
    }

    /// Remove a text element, or the selected one when `id` is absent.
    ///
    /// # Errors
    ///
    /// Returns an error string if `id` is not a valid element id.
    #[wasm_bindgen(js_name = removeText)]
    pub fn remove_text(&mut self, id: Option<String>) -> Result<bool, String> {
        let id = id.as_deref().map(parse_id).transpose()?;
        Ok(self.session.remove_text(id))
    }

    /// Place a sticker. Returns its id.
    #[wasm_bindgen(js_name = addSticker)]
    pub fn add_sticker(&mut self, src: &str) -> String {
        self.session.add_sticker(src).to_string()
    }

    /// Add an uploaded sticker file to the palette and place it.
    ///
    /// # Errors
    ///
    /// Returns an error string if the file is not a recognised image.
    #[wasm_bindgen(js_name = uploadSticker)]
    pub fn upload_sticker(&mut self, bytes: &[u8]) -> Result<String, String> {
        self.session
            .upload_sticker(bytes)
            .map(|id| id.to_string())
            .map_err(|e| e.to_string())
    }

    /// Select a sticker.
    ///
    /// # Errors
    ///
    /// Returns an error string if `id` is not a valid element id.
    #[wasm_bindgen(js_name = selectSticker)]
    pub fn select_sticker(&mut self, id: &str) -> Result<bool, String> {
        Ok(self.session.select_sticker(parse_id(id)?))
    }

    /// Pointer down on a sticker.
    ///
    /// # Errors
    ///
    /// Returns an error string if `id` is not a valid element id.
    #[wasm_bindgen(js_name = stickerDragStart)]
    pub fn sticker_drag_start(&mut self, id: &str) -> Result<bool, String> {
        Ok(self.session.sticker_drag_start(parse_id(id)?))
    }

    /// Commit a sticker drag.
    ///
    /// # Errors
    ///
    /// Returns an error string if `id` is not a valid element id.
    #[wasm_bindgen(js_name = stickerDragEnd)]
    pub fn sticker_drag_end(&mut self, id: &str, x: f32, y: f32) -> Result<bool, String> {
        Ok(self.session.sticker_drag_end(parse_id(id)?, Point::new(x, y)))
    }

    /// Commit a sticker transform given as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the id or transform JSON is invalid.
    #[wasm_bindgen(js_name = stickerTransform)]
    pub fn sticker_transform(&mut self, id: &str, json: &str) -> Result<bool, String> {
        let update = parse_transform(json)?;
        Ok(self.session.sticker_transform(parse_id(id)?, &update))
    }

    /// Remove a sticker.
    ///
    /// # Errors
    ///
    /// Returns an error string if `id` is not a valid element id.
    #[wasm_bindgen(js_name = removeSticker)]
    pub fn remove_sticker(&mut self, id: &str) -> Result<bool, String> {
        Ok(self.session.remove_sticker(parse_id(id)?))
    }

    /// Route a stage press described as JSON, e.g. `{"type":"stage"}`.
    ///
    /// # Errors
    ///
    /// Returns an error string if the hit target JSON is invalid.
    #[wasm_bindgen(js_name = handleStageClick)]
    pub fn handle_stage_click(&mut self, json: &str) -> Result<bool, String> {
        let target: HitTarget = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(self.session.handle_stage_click(target))
    }

    /// Route a key press described as JSON. Returns the shortcut name, if any.
    ///
    /// # Errors
    ///
    /// Returns an error string if the key event JSON is invalid.
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, json: &str) -> Result<Option<String>, String> {
        let event: KeyEvent = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(self
            .session
            .handle_key(&event)
            .map(|shortcut| format!("{shortcut:?}")))
    }

    /// Deselect everything.
    #[wasm_bindgen(js_name = deselectAll)]
    pub fn deselect_all(&mut self) {
        self.session.deselect_all();
    }

    /// Decode an uploaded background file.
    ///
    /// # Errors
    ///
    /// Returns an error string if the image cannot be decoded.
    #[wasm_bindgen(js_name = uploadBackground)]
    pub fn upload_background(&mut self, bytes: &[u8]) -> Result<(), String> {
        self.session
            .upload_background(bytes)
            .map_err(|e| e.to_string())
    }

    /// Remove the background.
    #[wasm_bindgen(js_name = removeBackground)]
    pub fn remove_background(&mut self) {
        self.session.remove_background();
    }

    /// Undo `steps` operations.
    pub fn undo(&mut self, steps: usize) -> bool {
        self.session.undo(steps)
    }

    /// Redo `steps` operations.
    pub fn redo(&mut self, steps: usize) -> bool {
        self.session.redo(steps)
    }

    /// Whether undo is available.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.session.store().history().can_undo()
    }

    /// Whether redo is available.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.session.store().history().can_redo()
    }

    /// Deselect everything and queue an export for the next tick.
    ///
    /// # Errors
    ///
    /// Returns an error string if no background is loaded.
    #[wasm_bindgen(js_name = prepareForExport)]
    pub fn prepare_for_export(&mut self) -> Result<(), String> {
        self.session.prepare_for_export().map_err(|e| e.to_string())
    }

    /// Run queued work and describe what the page must do, as JSON.
    ///
    /// An `export` entry carries the frame to draw at full canvas size and
    /// the download file name.
    #[wasm_bindgen(js_name = runDeferred)]
    pub fn run_deferred(&mut self) -> String {
        let mut bridge = PageBridge::default();
        let exported = self.session.run_deferred(&mut bridge);
        if let (Some(Ok(image)), Some(frame)) = (exported, bridge.frame.take()) {
            bridge.report.export = Some(ExportRequest {
                file_name: image.file_name,
                frame,
            });
        }
        serde_json::to_string(&bridge.report).unwrap_or_default()
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_id(id: &str) -> Result<ElementId, String> {
    ElementId::parse(id).map_err(|e| e.to_string())
}

fn parse_transform(json: &str) -> Result<TransformUpdate, String> {
    serde_json::from_str(json).map_err(|e| e.to_string())
}
