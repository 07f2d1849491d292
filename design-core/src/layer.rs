//! Layers - the building blocks of a composition.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(Uuid);

impl LayerId {
    /// Create a new unique layer ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a layer ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid UUID.
    pub fn parse(input: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(input)?))
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An axis-aligned rectangle in canvas pixel coordinates (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Geometric center `(cx, cy)`.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Smallest rectangle covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(x, y, right - x, bottom - y)
    }
}

/// Font weight for text layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontWeight {
    /// 100.
    Thin,
    /// 200.
    ExtraLight,
    /// 300.
    Light,
    /// 400.
    #[default]
    Normal,
    /// 500.
    Medium,
    /// 600.
    SemiBold,
    /// 700.
    Bold,
    /// 800.
    ExtraBold,
    /// 900.
    Black,
}

impl FontWeight {
    /// Numeric CSS weight value.
    #[must_use]
    pub const fn css_value(self) -> u16 {
        match self {
            Self::Thin => 100,
            Self::ExtraLight => 200,
            Self::Light => 300,
            Self::Normal => 400,
            Self::Medium => 500,
            Self::SemiBold => 600,
            Self::Bold => 700,
            Self::ExtraBold => 800,
            Self::Black => 900,
        }
    }
}

/// Font style for text layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright glyphs.
    #[default]
    Normal,
    /// Italic glyphs.
    Italic,
}

/// Text decoration for text layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    /// No decoration.
    #[default]
    None,
    /// Underline below the baseline.
    Underline,
    /// Strike through the glyphs.
    LineThrough,
}

/// Horizontal text alignment within the layer box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Align to the left edge.
    #[default]
    Left,
    /// Center within the box.
    Center,
    /// Align to the right edge.
    Right,
    /// Justified (rendered as left-aligned by the compositor).
    Justify,
}

/// Styling attributes of a text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font family name.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Font weight.
    pub weight: FontWeight,
    /// Normal or italic.
    pub style: FontStyle,
    /// Underline / line-through.
    pub decoration: TextDecoration,
    /// Horizontal alignment.
    pub align: TextAlign,
    /// Line height as a multiplier of font size.
    pub line_height: f32,
    /// Additional advance between glyphs, in pixels.
    pub letter_spacing: f32,
    /// Text color as a hex string.
    pub color: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
            font_size: 24.0,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            decoration: TextDecoration::None,
            align: TextAlign::Left,
            line_height: 1.2,
            letter_spacing: 0.0,
            color: "#FFFFFF".to_string(),
        }
    }
}

/// The content a layer carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LayerKind {
    /// A raster image.
    Image {
        /// Source reference (URL, file path, or `data:` URI). `None` draws the
        /// fallback fill.
        src: Option<String>,
        /// Fallback fill color as a hex string.
        fill: String,
    },

    /// A block of styled text. Content may contain embedded newlines.
    Text {
        /// Text content.
        content: String,
        /// Styling attributes.
        style: TextStyle,
    },

    /// A non-visual container owning child layer ids. Grouping is a
    /// relationship, not containment: children stay in the flat collection.
    Group {
        /// Child layer ids in display order.
        children: Vec<LayerId>,
        /// Whether the group is expanded in the layers panel.
        expanded: bool,
    },
}

/// A positioned, transformable visual element on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique identifier. Never reused within a session.
    pub id: LayerId,
    /// Display name.
    pub name: String,
    /// Whether the layer is drawn.
    pub visible: bool,
    /// Locked layers reject all user-driven geometry/content edits.
    pub locked: bool,
    /// Left edge in canvas pixels.
    pub x: f32,
    /// Top edge in canvas pixels.
    pub y: f32,
    /// Width in canvas pixels.
    pub width: f32,
    /// Height in canvas pixels.
    pub height: f32,
    /// Stacking order; dense, derived from list order, higher = on top.
    pub z_index: i32,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Rotation in degrees about the layer center.
    pub rotation: f32,
    /// Owning group, if any.
    pub parent: Option<LayerId>,
    /// Whether this layer defines a clip region for another layer.
    pub is_mask: bool,
    /// Id of the mask layer clipping this one, if any.
    pub masked_by: Option<LayerId>,
    /// Layer content.
    pub kind: LayerKind,
}

impl Layer {
    fn base(name: &str, kind: LayerKind) -> Self {
        Self {
            id: LayerId::new(),
            name: name.to_string(),
            visible: true,
            locked: false,
            x: 20.0,
            y: 20.0,
            width: 120.0,
            height: 80.0,
            z_index: 0,
            opacity: 1.0,
            rotation: 0.0,
            parent: None,
            is_mask: false,
            masked_by: None,
            kind,
        }
    }

    /// Create an image layer with default geometry (120x80 at 20,20).
    #[must_use]
    pub fn image(name: &str, src: Option<String>) -> Self {
        Self::base(
            name,
            LayerKind::Image {
                src,
                fill: "#22c55e4d".to_string(),
            },
        )
    }

    /// Create a text layer with default style (24px, white, left-aligned).
    #[must_use]
    pub fn text(name: &str, content: &str) -> Self {
        let mut layer = Self::base(
            name,
            LayerKind::Text {
                content: content.to_string(),
                style: TextStyle::default(),
            },
        );
        layer.width = 150.0;
        layer.height = 40.0;
        layer
    }

    /// Create an expanded group layer owning the given children.
    #[must_use]
    pub fn group(name: &str, children: Vec<LayerId>) -> Self {
        Self::base(
            name,
            LayerKind::Group {
                children,
                expanded: true,
            },
        )
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the size.
    #[must_use]
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the rotation in degrees.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the locked flag.
    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Set the image fill color. No-op for non-image layers.
    #[must_use]
    pub fn with_fill(mut self, color: &str) -> Self {
        if let LayerKind::Image { ref mut fill, .. } = self.kind {
            *fill = color.to_string();
        }
        self
    }

    /// The layer's bounding rectangle (ignores rotation).
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Replace the bounding rectangle.
    pub fn set_bounds(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }

    /// Geometric center `(cx, cy)`.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        self.bounds().center()
    }

    /// Whether this is a group layer.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self.kind, LayerKind::Group { .. })
    }

    /// Child ids when this is a group.
    #[must_use]
    pub fn group_children(&self) -> Option<&[LayerId]> {
        match &self.kind {
            LayerKind::Group { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Whether a group is expanded in the layers panel. Non-groups report false.
    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        matches!(self.kind, LayerKind::Group { expanded: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        let b = Rect::new(200.0, 100.0, 50.0, 50.0);
        let u = a.union(&b);
        assert!((u.x - 0.0).abs() < f32::EPSILON);
        assert!((u.width - 250.0).abs() < f32::EPSILON);
        assert!((u.height - 150.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_text_defaults() {
        let layer = Layer::text("Caption", "Hello");
        match &layer.kind {
            LayerKind::Text { style, .. } => {
                assert!((style.font_size - 24.0).abs() < f32::EPSILON);
                assert_eq!(style.color, "#FFFFFF");
                assert_eq!(style.align, TextAlign::Left);
                assert_eq!(style.weight, FontWeight::Normal);
                assert!((style.line_height - 1.2).abs() < f32::EPSILON);
            }
            _ => panic!("expected text layer"),
        }
    }

    #[test]
    fn test_layer_json_roundtrip() {
        let layer = Layer::image("Background", Some("bg.png".to_string()))
            .with_position(10.0, 10.0)
            .with_size(300.0, 200.0)
            .with_locked(true);
        let json = serde_json::to_string(&layer).expect("serialize");
        let back: Layer = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, layer);
    }

    #[test]
    fn test_font_weight_css_values() {
        assert_eq!(FontWeight::Thin.css_value(), 100);
        assert_eq!(FontWeight::Normal.css_value(), 400);
        assert_eq!(FontWeight::Bold.css_value(), 700);
        assert_eq!(FontWeight::Black.css_value(), 900);
    }
}
