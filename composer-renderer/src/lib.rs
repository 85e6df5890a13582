//! # Saorsa Composer Renderer
//!
//! Reference [`SceneRenderer`](composer_core::SceneRenderer) for composer
//! sessions. Frames are drawn to SVG and rasterized with resvg.
//!
//! ```text
//! ┌───────────────┐    ┌───────────┐    ┌──────────────────┐
//! │ RenderFrame   │ -> │ SVG       │ -> │ tiny-skia Pixmap │ -> PNG / JPEG
//! │ (z-ordered)   │    │ document  │    │ (raster feature) │
//! └───────────────┘    └───────────┘    └──────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;

pub use error::{RenderError, RenderResult};
pub use export::{ExportFormat, RendererConfig, SvgRenderer};
