//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::document::CanvasSize;
use crate::element::{AvailableSticker, ElementStyle, Point};
use crate::error::{EditorError, EditorResult};
use crate::history::DEFAULT_HISTORY_CAPACITY;

/// Tunables for one editor session.
///
/// Every field has a default, so a JSON file only needs to name what it
/// overrides. Keys are camelCase like every other JSON the editor reads:
///
/// ```
/// use composer_core::EditorConfig;
///
/// let config = EditorConfig::from_json(r#"{"historyCapacity": 10}"#).unwrap();
/// assert_eq!(config.history_capacity, 10);
/// assert_eq!(config.available_stickers.len(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EditorConfig {
    /// Snapshots kept behind the present state.
    pub history_capacity: usize,
    /// Canvas size while no background is loaded.
    pub default_canvas_size: CanvasSize,
    /// Where new text elements are placed.
    pub text_spawn: Point,
    /// Where new stickers are placed.
    pub sticker_spawn: Point,
    /// Style given to new text elements.
    pub text_style: ElementStyle,
    /// Initial sticker palette.
    pub available_stickers: Vec<AvailableSticker>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            default_canvas_size: CanvasSize::default(),
            text_spawn: Point::new(200.0, 200.0),
            sticker_spawn: Point::new(100.0, 100.0),
            text_style: ElementStyle::default(),
            available_stickers: default_palette(),
        }
    }
}

fn default_palette() -> Vec<AvailableSticker> {
    [7, 8, 1, 2, 3, 4, 5, 6]
        .into_iter()
        .map(|n| AvailableSticker::new(format!("Sticker {n}"), format!("/{n}.svg")))
        .collect()
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails [`Self::validate`].
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the editor cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> EditorResult<()> {
        if self.history_capacity == 0 {
            return Err(invalid("historyCapacity must be at least 1"));
        }
        if self.default_canvas_size.width == 0 || self.default_canvas_size.height == 0 {
            return Err(invalid("defaultCanvasSize must be non-zero"));
        }
        let style = &self.text_style;
        if !(style.font_size.is_finite() && style.font_size > 0.0) {
            return Err(invalid("textStyle.fontSize must be positive"));
        }
        if style.font_family.trim().is_empty() {
            return Err(invalid("textStyle.fontFamily must not be empty"));
        }
        if !(0.0..=1.0).contains(&style.opacity) || !(0.0..=1.0).contains(&style.background_opacity)
        {
            return Err(invalid("textStyle opacities must be within [0, 1]"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> EditorError {
    tracing::warn!("Rejected editor configuration: {reason}");
    EditorError::InvalidConfig(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EditorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.default_canvas_size, CanvasSize::new(1024, 700));
        assert_eq!(config.available_stickers[0].name, "Sticker 7");
        assert_eq!(config.available_stickers[2].src, "/1.svg");
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = EditorConfig::from_json(
            r#"{"textSpawn": {"x": 10.0, "y": 20.0}, "textStyle": {"fontFamily": "Georgia"}}"#,
        )
        .expect("should parse");
        assert_eq!(config.text_spawn, Point::new(10.0, 20.0));
        assert_eq!(config.text_style.font_family, "Georgia");
        assert!((config.text_style.font_size - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let result = EditorConfig::from_json(r#"{"historyCapacity": 0}"#);
        assert!(matches!(result, Err(EditorError::InvalidConfig(_))));
    }

    #[test]
    fn test_keys_are_camel_case() {
        let config = EditorConfig::from_json(
            r#"{"historyCapacity": 7, "defaultCanvasSize": {"width": 640, "height": 480}}"#,
        )
        .expect("should parse");
        assert_eq!(config.history_capacity, 7);
        assert_eq!(config.default_canvas_size, CanvasSize::new(640, 480));

        let result = EditorConfig::from_json(r#"{"history_capacity": 7}"#);
        assert!(matches!(result, Err(EditorError::Serialization(_))));
    }

    #[test]
    fn test_rejects_blank_font() {
        let result = EditorConfig::from_json(r#"{"textStyle": {"fontFamily": "  "}}"#);
        assert!(matches!(result, Err(EditorError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = EditorConfig::from_json("{ nope");
        assert!(matches!(result, Err(EditorError::Serialization(_))));
    }
}
