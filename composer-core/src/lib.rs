//! # Saorsa Composer Core
//!
//! Editor state for sticker and text compositions over a background image.
//! Compiles to WASM for use behind a browser canvas.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               EditorSession                 │
//! ├──────────────────────┬──────────────────────┤
//! │  TextEngine          │  StickerEngine       │
//! │  - Content, style    │  - Palette           │
//! │  - Drag, transform   │  - Drag, transform   │
//! ├──────────────────────┴──────────────────────┤
//! │  SceneDraft: selection exclusivity, z-order │
//! ├─────────────────────────────────────────────┤
//! │  DocumentStore  ──►  History (bounded)      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Rendering lives behind [`SceneRenderer`]; the `composer-renderer` crate
//! provides an SVG/PNG backend.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unused_self)]

pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod export;
pub mod history;
pub mod input;
pub mod intake;
pub mod selection;
pub mod session;
pub mod store;
pub mod sticker;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::EditorConfig;
pub use document::{CanvasSize, Document, DocumentPatch, ImageFormat, ImageHandle, ImageId};
pub use element::{
    AvailableSticker, CanvasElement, ElementId, ElementKind, ElementRef, ElementStyle, FontStyle,
    FontVariant, Placement, Point, StickerElement, StyleChange, TextAlign, TextElement,
    TransformUpdate,
};
pub use error::{EditorError, EditorResult};
pub use export::{ExportedImage, RenderFrame, RenderNode, SceneRenderer};
pub use history::{History, HistoryState};
pub use input::{HitTarget, KeyEvent, KeyModifiers, Shortcut};
pub use session::EditorSession;
pub use store::{DocumentStore, SubscriptionId};
pub use sticker::StickerEngine;
pub use text::TextEngine;

/// Composer core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
