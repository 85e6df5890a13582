//! Canvas elements - the text and sticker instances placed on a composition.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest scale factor an element may carry.
pub const MIN_SCALE: f32 = 0.01;

/// Unique identifier for an element.
///
/// Ids are random v4 UUIDs, so an id is never handed out twice in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an element id from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if `s` is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which collection an element lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A styled text element.
    Text,
    /// A placed sticker image.
    Sticker,
}

/// A typed reference to an element in either collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    /// Element identifier.
    pub id: ElementId,
    /// Collection the element belongs to.
    pub kind: ElementKind,
}

impl ElementRef {
    /// Reference a text element.
    #[must_use]
    pub const fn text(id: ElementId) -> Self {
        Self {
            id,
            kind: ElementKind::Text,
        }
    }

    /// Reference a sticker element.
    #[must_use]
    pub const fn sticker(id: ElementId) -> Self {
        Self {
            id,
            kind: ElementKind::Sticker,
        }
    }
}

/// A canvas-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Position, rotation and scale of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// X position in canvas space.
    pub x: f32,
    /// Y position in canvas space.
    pub y: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Horizontal scale factor (always > 0).
    pub scale_x: f32,
    /// Vertical scale factor (always > 0).
    pub scale_y: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self::at(Point::default())
    }
}

impl Placement {
    /// Unrotated, unscaled placement at `origin`.
    #[must_use]
    pub const fn at(origin: Point) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Update the position only.
    pub fn move_to(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    /// Overwrite position, rotation and scale from a committed transform.
    pub fn apply(&mut self, update: &TransformUpdate) {
        self.x = update.x;
        self.y = update.y;
        self.rotation = update.rotation;
        self.scale_x = sanitize_scale(update.scale_x);
        self.scale_y = sanitize_scale(update.scale_y);
    }
}

/// Mirrored transforms arrive as negative scales; the magnitude is kept.
fn sanitize_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale.abs() >= MIN_SCALE {
        scale.abs()
    } else {
        MIN_SCALE
    }
}

/// Values read off a transformed node when a transform gesture commits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformUpdate {
    /// New X position.
    pub x: f32,
    /// New Y position.
    pub y: f32,
    /// New rotation in degrees.
    pub rotation: f32,
    /// New horizontal scale.
    pub scale_x: f32,
    /// New vertical scale.
    pub scale_y: f32,
    /// New font size (text elements only).
    #[serde(default)]
    pub font_size: Option<f32>,
}

/// Font weight/slant of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Bold weight.
    Bold,
    /// Regular weight.
    #[default]
    Normal,
    /// Italic slant.
    Italic,
}

/// Font variant of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontVariant {
    /// Regular glyphs.
    #[default]
    Normal,
    /// Small capitals.
    SmallCaps,
}

impl FontVariant {
    /// The other variant.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::SmallCaps,
            Self::SmallCaps => Self::Normal,
        }
    }
}

/// Horizontal alignment of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Align left.
    Left,
    /// Center.
    #[default]
    Center,
    /// Align right.
    Right,
}

/// Visual style shared by text elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ElementStyle {
    /// Font size in pixels (> 0).
    pub font_size: f32,
    /// Font family name (non-empty).
    pub font_family: String,
    /// Weight/slant.
    pub font_style: FontStyle,
    /// Normal or small caps.
    pub font_variant: FontVariant,
    /// Text color.
    pub fill: String,
    /// Text opacity in `[0, 1]`.
    pub opacity: f32,
    /// Horizontal alignment.
    pub align: TextAlign,
    /// Whether a background box is drawn behind the text.
    pub has_background: bool,
    /// Background box color.
    pub background_color: String,
    /// Background box opacity in `[0, 1]`.
    pub background_opacity: f32,
    /// Background box corner radius (>= 0).
    pub background_radius: f32,
    /// Whether a border is drawn.
    pub has_border: bool,
    /// Border color.
    pub border_color: String,
    /// Border width (>= 0).
    pub border_width: f32,
    /// Z-index for layering.
    pub z_index: i64,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            font_size: 30.0,
            font_family: "Arial".to_string(),
            font_style: FontStyle::Normal,
            font_variant: FontVariant::Normal,
            fill: "#000000".to_string(),
            opacity: 1.0,
            align: TextAlign::Center,
            has_background: false,
            background_color: "#ffffff".to_string(),
            background_opacity: 0.8,
            background_radius: 0.0,
            has_border: false,
            border_color: "#000000".to_string(),
            border_width: 2.0,
            z_index: 0,
        }
    }
}

impl ElementStyle {
    /// Apply a single style change, normalizing the value into its valid range.
    ///
    /// Returns `false` when the change was rejected or left the style as it was.
    pub fn apply(&mut self, change: StyleChange) -> bool {
        let before = self.clone();
        match change {
            StyleChange::FontSize(size) => {
                if size.is_finite() && size > 0.0 {
                    self.font_size = size;
                }
            }
            StyleChange::FontFamily(family) => {
                let family = family.trim();
                if !family.is_empty() {
                    self.font_family = family.to_string();
                }
            }
            StyleChange::FontStyle(style) => self.font_style = style,
            StyleChange::FontVariant(variant) => self.font_variant = variant,
            StyleChange::Fill(color) => self.fill = color,
            StyleChange::Opacity(opacity) => self.opacity = unit_interval(opacity),
            StyleChange::Align(align) => self.align = align,
            StyleChange::HasBackground(on) => self.has_background = on,
            StyleChange::BackgroundColor(color) => self.background_color = color,
            StyleChange::BackgroundOpacity(opacity) => {
                self.background_opacity = unit_interval(opacity);
            }
            StyleChange::BackgroundRadius(radius) => {
                self.background_radius = non_negative(radius);
            }
            StyleChange::HasBorder(on) => self.has_border = on,
            StyleChange::BorderColor(color) => self.border_color = color,
            StyleChange::BorderWidth(width) => self.border_width = non_negative(width),
        }
        *self != before
    }
}

fn unit_interval(value: f32) -> f32 {
    if value.is_nan() {
        1.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// One keyed style-panel edit.
///
/// Serialized as `{"key": "fontSize", "value": 42}` so panel widgets can send
/// the property name they edit alongside the new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
#[allow(missing_docs)] // Variants mirror the ElementStyle fields
pub enum StyleChange {
    FontSize(f32),
    FontFamily(String),
    FontStyle(FontStyle),
    FontVariant(FontVariant),
    Fill(String),
    Opacity(f32),
    Align(TextAlign),
    HasBackground(bool),
    BackgroundColor(String),
    BackgroundOpacity(f32),
    BackgroundRadius(f32),
    HasBorder(bool),
    BorderColor(String),
    BorderWidth(f32),
}

/// A styled text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    /// Unique identifier.
    pub id: ElementId,
    /// Text content; only transiently empty.
    pub text: String,
    /// Position, rotation and scale.
    #[serde(flatten)]
    pub placement: Placement,
    /// Font, colors, decorations and z-index.
    #[serde(flatten)]
    pub style: ElementStyle,
    /// Whether this element is selected.
    pub is_selected: bool,
}

impl TextElement {
    /// Whether the element holds only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A sticker image placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerElement {
    /// Unique identifier.
    pub id: ElementId,
    /// Position, rotation and scale.
    #[serde(flatten)]
    pub placement: Placement,
    /// Whether this element is selected.
    pub is_selected: bool,
    /// Image reference: URL or embedded data URL.
    pub src: String,
    /// Z-index for layering.
    pub z_index: i64,
}

/// A palette entry that can be placed as a sticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSticker {
    /// Display name.
    pub name: String,
    /// Image reference.
    pub src: String,
}

impl AvailableSticker {
    /// Create a palette entry.
    #[must_use]
    pub fn new(name: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            src: src.into(),
        }
    }
}

/// Behaviour shared by both element collections.
pub trait CanvasElement {
    /// Collection this element type lives in.
    const KIND: ElementKind;

    /// Element identifier.
    fn id(&self) -> ElementId;
    /// Current z-index.
    fn z_index(&self) -> i64;
    /// Reassign the z-index.
    fn set_z_index(&mut self, z_index: i64);
    /// Whether the element is selected.
    fn is_selected(&self) -> bool;
    /// Set the selection flag.
    fn set_selected(&mut self, selected: bool);

    /// Typed reference to this element.
    fn element_ref(&self) -> ElementRef {
        ElementRef {
            id: self.id(),
            kind: Self::KIND,
        }
    }
}

impl CanvasElement for TextElement {
    const KIND: ElementKind = ElementKind::Text;

    fn id(&self) -> ElementId {
        self.id
    }
    fn z_index(&self) -> i64 {
        self.style.z_index
    }
    fn set_z_index(&mut self, z_index: i64) {
        self.style.z_index = z_index;
    }
    fn is_selected(&self) -> bool {
        self.is_selected
    }
    fn set_selected(&mut self, selected: bool) {
        self.is_selected = selected;
    }
}

impl CanvasElement for StickerElement {
    const KIND: ElementKind = ElementKind::Sticker;

    fn id(&self) -> ElementId {
        self.id
    }
    fn z_index(&self) -> i64 {
        self.z_index
    }
    fn set_z_index(&mut self, z_index: i64) {
        self.z_index = z_index;
    }
    fn is_selected(&self) -> bool {
        self.is_selected
    }
    fn set_selected(&mut self, selected: bool) {
        self.is_selected = selected;
    }
}
