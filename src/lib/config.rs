//! Configuration module for the look of generated documents.
//!
//! Styling is read from a TOML file. Every key is optional: anything missing keeps the value of
//! the selected preset, and a file that cannot be read or parsed yields the defaults.
//!
//! # Configuration Structure
//!
//! - `preset` selects the base style (`"default"` or `"professional"`)
//! - `colors` overrides the `primary`, `text`, `secondary` and `border` colors, either as a hex
//!   string (`"#1a73e8"`) or as an RGB table (`{ r = 26, g = 115, b = 232 }`)
//! - `fonts` sets the `family` (`helvetica`, `times`, `courier`) and the point sizes `title`,
//!   `heading`, `body`, `subtitle`, `footer` and `table`
//! - `margin` sets the page insets in millimetres (`top`, `right`, `bottom`, `left`)
//! - `document` holds the letterhead `logo` path, the recorded `author`, the `page_size`
//!   (`a4`, `letter`, `legal`, `a3`, `a5`) and the `orientation` (`portrait`, `landscape`)
//!
//! # Configuration Example
//!
//! ```toml
//! preset = "professional"
//!
//! [colors]
//! primary = "#003366"
//! border = { r = 200, g = 200, b = 200 }
//!
//! [fonts]
//! body = 11
//!
//! [margin]
//! top = 20.0
//!
//! [document]
//! logo = "assets/logo.png"
//! author = "Secretaría de Extensión"
//! page_size = "letter"
//! ```
//!
//! The per-user configuration lives in `<config dir>/internship2pdf/config.toml`, see
//! [`default_config_path`].

use crate::builders::BuilderOptions;
use crate::document::{Orientation, PageSize};
use crate::styling::{Colors, FontFamily, Fonts, Margins, Rgb, Style};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;

/// Configuration source for the styling configuration.
#[derive(Debug, Clone)]
pub enum ConfigSource<'a> {
    /// Use the built-in default style
    Default,
    /// Load configuration from a file path
    File(&'a str),
    /// Use an embedded TOML configuration string
    Embedded(&'a str),
}

/// Everything a configuration file can set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppSettings {
    pub style: Style,
    pub logo: Option<PathBuf>,
    pub author: Option<String>,
    pub page_size: Option<PageSize>,
    pub orientation: Option<Orientation>,
}

impl AppSettings {
    /// Builder options carrying the configured logo and author.
    pub fn builder_options(&self) -> BuilderOptions {
        let mut options = BuilderOptions::default();
        if let Some(logo) = &self.logo {
            options = options.with_logo(logo);
        }
        if let Some(author) = &self.author {
            options = options.with_author(author);
        }
        if let Some(page_size) = self.page_size {
            options = options.with_page_size(page_size);
        }
        if let Some(orientation) = self.orientation {
            options = options.with_orientation(orientation);
        }
        options
    }
}

/// Parses a color given either as a hex string or as an `{ r, g, b }` table.
fn parse_color(value: Option<&Value>, field: &str) -> Option<Rgb> {
    let color = value?.get(field)?;
    if let Some(hex) = color.as_str() {
        return match Rgb::from_hex(hex) {
            Ok(rgb) => Some(rgb),
            Err(e) => {
                warn!("Ignoring colors.{}: {}", field, e);
                None
            }
        };
    }
    let channel = |name: &str| -> Option<u8> {
        let v = color.get(name)?.as_integer()?;
        u8::try_from(v).ok()
    };
    Some(Rgb(channel("r")?, channel("g")?, channel("b")?))
}

/// Reads a number that may be written as an integer or a float.
fn number(value: Option<&Value>, field: &str) -> Option<f64> {
    let v = value?.get(field)?;
    v.as_float().or_else(|| v.as_integer().map(|i| i as f64))
}

fn font_size(value: Option<&Value>, field: &str) -> Option<u8> {
    let size = value?.get(field)?.as_integer()?;
    u8::try_from(size).ok().filter(|s| *s > 0)
}

fn parse_colors(value: Option<&Value>, base: Colors) -> Colors {
    Colors {
        primary: parse_color(value, "primary").unwrap_or(base.primary),
        text: parse_color(value, "text").unwrap_or(base.text),
        secondary: parse_color(value, "secondary").unwrap_or(base.secondary),
        border: parse_color(value, "border").unwrap_or(base.border),
    }
}

fn parse_fonts(value: Option<&Value>, base: Fonts) -> Fonts {
    let family = value
        .and_then(|v| v.get("family"))
        .and_then(|v| v.as_str())
        .and_then(|name| {
            let family = FontFamily::from_name(name);
            if family.is_none() {
                warn!("Unknown font family '{}', keeping {}", name, base.family.name());
            }
            family
        })
        .unwrap_or(base.family);

    Fonts {
        family,
        title: font_size(value, "title").unwrap_or(base.title),
        heading: font_size(value, "heading").unwrap_or(base.heading),
        body: font_size(value, "body").unwrap_or(base.body),
        subtitle: font_size(value, "subtitle").unwrap_or(base.subtitle),
        footer: font_size(value, "footer").unwrap_or(base.footer),
        table: font_size(value, "table").unwrap_or(base.table),
    }
}

fn parse_margins(value: Option<&Value>, base: Margins) -> Margins {
    let side = |field: &str, fallback: f32| -> f32 {
        number(value, field)
            .filter(|v| *v >= 0.0)
            .map(|v| v as f32)
            .unwrap_or(fallback)
    };
    Margins {
        top: side("top", base.top),
        right: side("right", base.right),
        bottom: side("bottom", base.bottom),
        left: side("left", base.left),
    }
}

/// Parses a TOML configuration string.
///
/// Invalid TOML yields the default settings; unknown or malformed keys are ignored.
///
/// # Example
/// ```rust
/// use internship2pdf::config::parse_config_string;
/// use internship2pdf::styling::FontFamily;
///
/// let settings = parse_config_string(
///     r##"
///     preset = "professional"
///     [fonts]
///     body = 12
///     [document]
///     logo = "logo.png"
///     "##,
/// );
/// assert_eq!(settings.style.fonts.family, FontFamily::Times);
/// assert_eq!(settings.style.fonts.body, 12);
/// assert_eq!(settings.logo.as_deref(), Some(std::path::Path::new("logo.png")));
/// ```
pub fn parse_config_string(config_str: &str) -> AppSettings {
    let config: Value = match toml::from_str(config_str) {
        Ok(v) => v,
        Err(e) => {
            warn!("Invalid configuration, using defaults: {}", e);
            return AppSettings::default();
        }
    };

    let base = match config.get("preset").and_then(|v| v.as_str()) {
        Some(name) => Style::preset(name).unwrap_or_else(|| {
            warn!("Unknown preset '{}', using the default style", name);
            Style::default()
        }),
        None => Style::default(),
    };

    let style = Style {
        colors: parse_colors(config.get("colors"), base.colors),
        fonts: parse_fonts(config.get("fonts"), base.fonts),
        margins: parse_margins(config.get("margin"), base.margins),
    };

    let document = config.get("document");
    let text = |field: &str| -> Option<String> {
        document?
            .get(field)?
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let page_size = text("page_size").and_then(|name| {
        let size = PageSize::from_name(&name);
        if size.is_none() {
            warn!("Unknown page size '{}', keeping A4", name);
        }
        size
    });
    let orientation = text("orientation").and_then(|name| {
        let orientation = Orientation::from_name(&name);
        if orientation.is_none() {
            warn!("Unknown orientation '{}', keeping portrait", name);
        }
        orientation
    });

    AppSettings {
        style,
        logo: text("logo").map(PathBuf::from),
        author: text("author"),
        page_size,
        orientation,
    }
}

/// Loads the settings from the given source. Never fails: a missing file yields the defaults.
///
/// # Example
/// ```rust
/// use internship2pdf::config::{load_config_from_source, ConfigSource};
///
/// let settings = load_config_from_source(ConfigSource::File("/no/such/config.toml"));
/// assert_eq!(settings, Default::default());
/// ```
pub fn load_config_from_source(source: ConfigSource) -> AppSettings {
    match source {
        ConfigSource::Default => AppSettings::default(),
        ConfigSource::File(path) => {
            let config_str = match fs::read_to_string(Path::new(path)) {
                Ok(s) => s,
                Err(e) => {
                    warn!("Cannot read configuration {}: {}", path, e);
                    return AppSettings::default();
                }
            };
            debug!("Loaded configuration from {}", path);
            parse_config_string(&config_str)
        }
        ConfigSource::Embedded(content) => parse_config_string(content),
    }
}

/// Location of the per-user configuration file, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("internship2pdf").join("config.toml"))
}

/// The default configuration, documented, as TOML text.
pub fn default_config_toml() -> String {
    let style = Style::default();
    let c = &style.colors;
    let f = &style.fonts;
    let m = &style.margins;
    format!(
        r##"# internship2pdf configuration
# Base style: "default" or "professional"
preset = "default"

[colors]
# Hex strings or {{ r = 0, g = 0, b = 0 }} tables
primary = "{}"
text = "{}"
secondary = "{}"
border = "{}"

[fonts]
# helvetica, times or courier
family = "{}"
title = {}
heading = {}
body = {}
subtitle = {}
footer = {}
table = {}

[margin]
# Millimetres
top = {:.1}
right = {:.1}
bottom = {:.1}
left = {:.1}

[document]
# logo = "path/to/logo.png"
# author = "Sistema de Pasantías"
# a4, letter, legal, a3 or a5
# page_size = "a4"
# portrait or landscape
# orientation = "portrait"
"##,
        c.primary.to_hex(),
        c.text.to_hex(),
        c.secondary.to_hex(),
        c.border.to_hex(),
        f.family.name(),
        f.title,
        f.heading,
        f.body,
        f.subtitle,
        f.footer,
        f.table,
        m.top,
        m.right,
        m.bottom,
        m.left,
    )
}
