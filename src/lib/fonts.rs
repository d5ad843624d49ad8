//! Font loading for the render engine.
//!
//! Documents use the standard PDF base fonts (Helvetica, Times, Courier), so no font file is
//! embedded in the output. The layout engine still needs glyph metrics to break lines, which
//! are taken from a metrically compatible system font (Liberation, Arial, Times New Roman, ...).
//! When the system has none, the DejaVu faces bundled in `fonts/` are used instead.
//! Those bytes are read once per family and kept by the [`FontStore`] owned by each engine.

use crate::styling::FontFamily;
use fontdb::Database;
use genpdfi_extended::error::Error;
use genpdfi_extended::fonts::{FontData, FontFamily as PdfFontFamily};
use log::{debug, info, warn};
use parking_lot::Mutex;
use printpdf::BuiltinFont;
use rusttype::Font;
use std::collections::HashMap;
use std::fs;
use std::panic;
use std::path::Path;
use std::sync::Arc;

// Bundled metrics, used when no system font can be found.
static SANS_METRICS: &[u8] = include_bytes!("../../fonts/DejaVuSans.ttf");
static SERIF_METRICS: &[u8] = include_bytes!("../../fonts/DejaVuSerif.ttf");
static MONO_METRICS: &[u8] = include_bytes!("../../fonts/DejaVuSansMono.ttf");

#[derive(Clone, Copy)]
enum Variant {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

fn builtin(family: FontFamily, variant: Variant) -> BuiltinFont {
    match family {
        FontFamily::Helvetica => match variant {
            Variant::Regular => BuiltinFont::Helvetica,
            Variant::Bold => BuiltinFont::HelveticaBold,
            Variant::Italic => BuiltinFont::HelveticaOblique,
            Variant::BoldItalic => BuiltinFont::HelveticaBoldOblique,
        },
        FontFamily::Times => match variant {
            Variant::Regular => BuiltinFont::TimesRoman,
            Variant::Bold => BuiltinFont::TimesBold,
            Variant::Italic => BuiltinFont::TimesItalic,
            Variant::BoldItalic => BuiltinFont::TimesBoldItalic,
        },
        FontFamily::Courier => match variant {
            Variant::Regular => BuiltinFont::Courier,
            Variant::Bold => BuiltinFont::CourierBold,
            Variant::Italic => BuiltinFont::CourierOblique,
            Variant::BoldItalic => BuiltinFont::CourierBoldOblique,
        },
    }
}

/// System font file name fragments whose metrics match each base family, best first.
fn metric_candidates(family: FontFamily) -> &'static [&'static str] {
    match family {
        FontFamily::Helvetica => &[
            "liberationsans-regular",
            "arial",
            "helvetica",
            "dejavusans",
            "freesans",
        ],
        FontFamily::Times => &[
            "liberationserif-regular",
            "times",
            "dejavuserif",
            "freeserif",
        ],
        FontFamily::Courier => &[
            "liberationmono-regular",
            "cour",
            "dejavusansmono",
            "freemono",
        ],
    }
}

fn embedded_metrics(family: FontFamily) -> &'static [u8] {
    match family {
        FontFamily::Helvetica => SANS_METRICS,
        FontFamily::Times => SERIF_METRICS,
        FontFamily::Courier => MONO_METRICS,
    }
}

fn is_loadable_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map_or(false, |ext| {
            ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf")
        })
}

/// rusttype may panic on malformed tables, so parsing is guarded.
fn parses_as_font(bytes: &[u8]) -> bool {
    panic::catch_unwind(|| Font::try_from_bytes(bytes).is_some()).unwrap_or(false)
}

/// Reads the first usable system font matching one of `candidates`, falling back to any
/// TrueType/OpenType file that parses.
fn load_system_font_bytes(candidates: &[&str]) -> Option<Vec<u8>> {
    let mut db = Database::new();
    db.load_system_fonts();

    let paths: Vec<&Path> = db
        .faces()
        .filter_map(|face| match &face.source {
            fontdb::Source::File(p) if is_loadable_extension(p) => Some(p.as_path()),
            _ => None,
        })
        .collect();

    for candidate in candidates {
        for path in &paths {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("")
                .to_lowercase()
                .replace([' ', '_'], "");
            if !file_name.contains(candidate) {
                continue;
            }
            if let Ok(bytes) = fs::read(path) {
                if parses_as_font(&bytes) {
                    debug!("Using {} for font metrics", path.display());
                    return Some(bytes);
                }
            }
        }
    }

    for path in &paths {
        if let Ok(bytes) = fs::read(path) {
            if parses_as_font(&bytes) {
                warn!(
                    "No metric-compatible font found, using {} for metrics",
                    path.display()
                );
                return Some(bytes);
            }
        }
    }
    None
}

/// Where a family's metrics were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsSource {
    System,
    Embedded,
}

/// Per-engine store of font metric bytes, keyed by base family.
pub struct FontStore {
    scan_system: bool,
    metrics: Mutex<HashMap<FontFamily, (Arc<Vec<u8>>, MetricsSource)>>,
}

impl Default for FontStore {
    fn default() -> Self {
        FontStore::new()
    }
}

impl FontStore {
    /// A store preferring system fonts, with the bundled faces as fallback.
    pub fn new() -> FontStore {
        FontStore {
            scan_system: true,
            metrics: Mutex::new(HashMap::new()),
        }
    }

    /// A store that never scans the system and always uses the bundled faces.
    pub fn embedded() -> FontStore {
        FontStore {
            scan_system: false,
            metrics: Mutex::new(HashMap::new()),
        }
    }

    fn metrics_for(&self, family: FontFamily) -> (Arc<Vec<u8>>, MetricsSource) {
        if let Some((bytes, source)) = self.metrics.lock().get(&family) {
            return (Arc::clone(bytes), *source);
        }
        // Scanning system fonts is slow; do it without holding the lock.
        let system = if self.scan_system {
            load_system_font_bytes(metric_candidates(family))
        } else {
            None
        };
        let loaded = match system {
            Some(bytes) => (Arc::new(bytes), MetricsSource::System),
            None => {
                if self.scan_system {
                    warn!(
                        "No usable system font for {}, using bundled metrics",
                        family.name()
                    );
                }
                (
                    Arc::new(embedded_metrics(family).to_vec()),
                    MetricsSource::Embedded,
                )
            }
        };
        info!(
            "Loaded metrics for the {} font family ({:?})",
            family.name(),
            loaded.1
        );
        let mut metrics = self.metrics.lock();
        let entry = metrics.entry(family).or_insert(loaded);
        (Arc::clone(&entry.0), entry.1)
    }

    /// Builds the four-variant font family referencing the PDF base font for `family`.
    pub fn family(&self, family: FontFamily) -> Result<PdfFontFamily<FontData>, Error> {
        let (bytes, _) = self.metrics_for(family);
        let data = |variant: Variant| -> Result<FontData, Error> {
            FontData::new_shared(Arc::clone(&bytes), Some(builtin(family, variant)))
        };
        Ok(PdfFontFamily {
            regular: data(Variant::Regular)?,
            bold: data(Variant::Bold)?,
            italic: data(Variant::Italic)?,
            bold_italic: data(Variant::BoldItalic)?,
        })
    }

    /// Source of the metrics loaded for `family`, if any were loaded yet.
    pub fn metrics_source(&self, family: FontFamily) -> Option<MetricsSource> {
        self.metrics.lock().get(&family).map(|(_, source)| *source)
    }

    /// Number of families whose metrics are already loaded.
    pub fn loaded_families(&self) -> usize {
        self.metrics.lock().len()
    }
}
