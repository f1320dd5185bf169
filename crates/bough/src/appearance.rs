//! Appearance values carried by nodes.
//!
//! Colors, fonts, cursors and locales are all optional on a node. When a node
//! has no value of its own, lookups delegate to the parent at query time
//! instead of copying the value down the tree, so changing a container's font
//! is immediately visible through every child that never set one.

use std::fmt;
use std::sync::Arc;

/// An RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 is opaque).
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);
    /// Opaque light gray, the classic control background.
    pub const LIGHT_GRAY: Self = Self::from_rgb(192, 192, 192);

    /// Create an opaque color.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with an explicit alpha.
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Font style flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    /// Upright, regular weight.
    #[default]
    Plain,
    /// Bold weight.
    Bold,
    /// Italic.
    Italic,
    /// Bold and italic.
    BoldItalic,
}

/// A font request. Shaping and metrics belong to the platform layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Font {
    family: Arc<str>,
    style: FontStyle,
    size: u16,
}

impl Font {
    /// Create a font request.
    pub fn new(family: impl Into<Arc<str>>, style: FontStyle, size: u16) -> Self {
        Self {
            family: family.into(),
            style,
            size,
        }
    }

    /// The font family name.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// The style.
    pub fn style(&self) -> FontStyle {
        self.style
    }

    /// Point size.
    pub fn size(&self) -> u16 {
        self.size
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} {}", self.family, self.style, self.size)
    }
}

/// Standard mouse cursor shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum CursorShape {
    /// The platform default arrow.
    #[default]
    Arrow,
    /// A crosshair, for precise selection.
    Crosshair,
    /// A pointing hand, for clickable elements.
    Hand,
    /// An I-beam, for text.
    Text,
    /// A busy indicator.
    Wait,
    /// Something can be moved.
    Move,
    /// Resize along the north/south axis.
    ResizeNs,
    /// Resize along the east/west axis.
    ResizeEw,
}

/// A locale tag such as `en-US`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale(Arc<str>);

impl Locale {
    /// Create a locale from a language tag.
    pub fn new(tag: impl Into<Arc<str>>) -> Self {
        Self(tag.into())
    }

    /// The language tag.
    pub fn tag(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
