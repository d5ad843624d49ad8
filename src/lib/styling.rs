//! Visual configuration passed next to a document into the render call.
//!
//! A [`Style`] groups three independent parts: [`Colors`], [`Fonts`] and [`Margins`]. Each part
//! implements `Default`, so partial construction is plain struct-update syntax:
//!
//! ```rust
//! use internship2pdf::styling::{Margins, Style};
//!
//! let style = Style::default().with_margins(Margins { top: 30.0, ..Margins::default() });
//! assert_eq!(style.margins.left, Margins::default().left);
//! ```
//!
//! Two presets ship with the crate: [`Style::default`] and [`Style::professional`].

use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    /// The requested color role does not exist.
    UnknownColorRole { role: String },
    /// A hex color string could not be parsed.
    InvalidColor { value: String },
}

impl fmt::Display for StyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleError::UnknownColorRole { role } => write!(
                f,
                "unknown color role '{}' (expected primary, text, secondary or border)",
                role
            ),
            StyleError::InvalidColor { value } => {
                write!(f, "invalid color '{}', expected #rrggbb", value)
            }
        }
    }
}

impl Error for StyleError {}

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(value: &str) -> Result<Rgb, StyleError> {
        let invalid = || StyleError::InvalidColor {
            value: value.to_string(),
        };
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Named color roles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Colors {
    /// Titles and headings.
    pub primary: Rgb,
    /// Body text and table cells.
    pub text: Rgb,
    /// Subtitles, footers and page decorations.
    pub secondary: Rgb,
    /// Table frames and separator rules.
    pub border: Rgb,
}

impl Default for Colors {
    fn default() -> Self {
        Colors {
            primary: Rgb(0x1a, 0x73, 0xe8),
            text: Rgb(0x33, 0x33, 0x33),
            secondary: Rgb(0x80, 0x80, 0x80),
            border: Rgb(0xd3, 0xd3, 0xd3),
        }
    }
}

impl Colors {
    /// Resolves a color role by name. Unknown roles are an error.
    pub fn to_rgb(&self, role: &str) -> Result<Rgb, StyleError> {
        match role.trim().to_lowercase().as_str() {
            "primary" => Ok(self.primary),
            "text" => Ok(self.text),
            "secondary" => Ok(self.secondary),
            "border" => Ok(self.border),
            _ => Err(StyleError::UnknownColorRole {
                role: role.to_string(),
            }),
        }
    }
}

/// Typeface families available without embedding font files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

impl FontFamily {
    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Helvetica => "helvetica",
            FontFamily::Times => "times",
            FontFamily::Courier => "courier",
        }
    }

    /// Maps common family names and aliases, e.g. `"Times New Roman"` or `"arial"`.
    pub fn from_name(name: &str) -> Option<FontFamily> {
        match name.trim().to_lowercase().as_str() {
            "helvetica" | "arial" | "sans" | "sans-serif" => Some(FontFamily::Helvetica),
            "times" | "times new roman" | "timesnewroman" | "serif" => Some(FontFamily::Times),
            "courier" | "courier new" | "couriernew" | "monospace" => Some(FontFamily::Courier),
            _ => None,
        }
    }
}

/// Font family and point sizes per typographic role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fonts {
    pub family: FontFamily,
    pub title: u8,
    pub heading: u8,
    pub body: u8,
    pub subtitle: u8,
    pub footer: u8,
    pub table: u8,
}

impl Default for Fonts {
    fn default() -> Self {
        Fonts {
            family: FontFamily::Helvetica,
            title: 18,
            heading: 12,
            body: 10,
            subtitle: 10,
            footer: 9,
            table: 10,
        }
    }
}

/// Page insets in millimetres.
#[derive(Debug, Clone, Copy)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Margins {
            top: 25.0,
            right: 25.0,
            bottom: 25.0,
            left: 25.0,
        }
    }
}

impl Margins {
    pub fn uniform(value: f32) -> Margins {
        Margins {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

// Margins hold floats; equality and hashing both use the bit pattern so that `Style` can key
// the typography cache.
impl Margins {
    fn bits(&self) -> [u32; 4] {
        [self.top, self.right, self.bottom, self.left].map(f32::to_bits)
    }
}

impl PartialEq for Margins {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Margins {}

impl std::hash::Hash for Margins {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

/// Complete visual configuration of a rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub colors: Colors,
    pub fonts: Fonts,
    pub margins: Margins,
}

impl Style {
    /// Serif preset with a navy palette, slightly larger text and denser margins.
    pub fn professional() -> Style {
        Style {
            colors: Colors {
                primary: Rgb(0x1f, 0x2a, 0x44),
                text: Rgb(0x22, 0x22, 0x22),
                secondary: Rgb(0x5f, 0x6b, 0x7a),
                border: Rgb(0xb0, 0xb7, 0xc3),
            },
            fonts: Fonts {
                family: FontFamily::Times,
                title: 20,
                heading: 13,
                body: 11,
                subtitle: 11,
                footer: 9,
                table: 10,
            },
            margins: Margins::uniform(18.0),
        }
    }

    /// Looks up a preset by name (`"default"` or `"professional"`).
    pub fn preset(name: &str) -> Option<Style> {
        match name.trim().to_lowercase().as_str() {
            "default" => Some(Style::default()),
            "professional" => Some(Style::professional()),
            _ => None,
        }
    }

    pub fn with_colors(self, colors: Colors) -> Style {
        Style { colors, ..self }
    }

    pub fn with_fonts(self, fonts: Fonts) -> Style {
        Style { fonts, ..self }
    }

    pub fn with_margins(self, margins: Margins) -> Style {
        Style { margins, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgb::from_hex("#1a73e8").unwrap(), Rgb(26, 115, 232));
        assert_eq!(Rgb::from_hex("FFFFFF").unwrap(), Rgb(255, 255, 255));
        assert_eq!(Rgb(26, 115, 232).to_hex(), "#1a73e8");
        for bad in ["", "#fff", "#12345g", "#1234567", "#ééé"] {
            assert!(matches!(
                Rgb::from_hex(bad),
                Err(StyleError::InvalidColor { .. })
            ));
        }
    }

    #[test]
    fn test_color_role_lookup() {
        let colors = Colors::default();
        assert_eq!(colors.to_rgb("primary").unwrap(), colors.primary);
        assert_eq!(colors.to_rgb(" Border ").unwrap(), colors.border);
        assert_eq!(
            colors.to_rgb("accent").unwrap_err(),
            StyleError::UnknownColorRole {
                role: "accent".to_string()
            }
        );
    }

    #[test]
    fn test_presets_differ() {
        let default = Style::default();
        let professional = Style::professional();
        assert_ne!(default, professional);
        assert_eq!(professional.fonts.family, FontFamily::Times);
        assert!(professional.margins.top < default.margins.top);
        assert_eq!(Style::preset("Professional"), Some(professional));
        assert_eq!(Style::preset("nope"), None);
    }

    #[test]
    fn test_partial_override_keeps_other_parts() {
        let style = Style::professional().with_fonts(Fonts {
            body: 12,
            ..Fonts::default()
        });
        assert_eq!(style.fonts.body, 12);
        assert_eq!(style.fonts.family, FontFamily::Helvetica);
        assert_eq!(style.colors, Style::professional().colors);
        assert_eq!(style.margins, Margins::uniform(18.0));
    }

    #[test]
    fn test_font_family_aliases() {
        assert_eq!(FontFamily::from_name("Arial"), Some(FontFamily::Helvetica));
        assert_eq!(
            FontFamily::from_name("Times New Roman"),
            Some(FontFamily::Times)
        );
        assert_eq!(FontFamily::from_name("monospace"), Some(FontFamily::Courier));
        assert_eq!(FontFamily::from_name("Comic Sans"), None);
    }
}
