//! Typographic roles derived from a [`Style`], and the bounded cache that memoizes them.
//!
//! The render engine never reads a `Style` directly while laying out text: it asks its
//! [`StyleCache`] for the [`Typography`] of that style, which is derived once per distinct
//! style value and shared behind an `Arc` afterwards.

use crate::styling::{FontFamily, Margins, Rgb, Style};
use genpdfi_extended::style::{Color, Style as PdfStyle};
use genpdfi_extended::Alignment;
use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Number of distinct styles kept by [`StyleCache::new`].
pub const DEFAULT_CACHE_CAPACITY: usize = 16;

/// Text treatment for one role (title, body, footer, ...).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRole {
    pub size: u8,
    pub color: Rgb,
    pub bold: bool,
    pub italic: bool,
    pub alignment: Alignment,
    /// Vertical space before the block, in lines.
    pub before: f32,
    /// Vertical space after the block, in lines.
    pub after: f32,
}

impl TextRole {
    fn new(size: u8, color: Rgb) -> TextRole {
        TextRole {
            size,
            color,
            bold: false,
            italic: false,
            alignment: Alignment::Left,
            before: 0.0,
            after: 0.0,
        }
    }

    fn bold(mut self) -> TextRole {
        self.bold = true;
        self
    }

    fn italic(mut self) -> TextRole {
        self.italic = true;
        self
    }

    fn aligned(mut self, alignment: Alignment) -> TextRole {
        self.alignment = alignment;
        self
    }

    fn spaced(mut self, before: f32, after: f32) -> TextRole {
        self.before = before;
        self.after = after;
        self
    }

    /// Converts the role into a layout engine text style.
    pub fn pdf_style(&self) -> PdfStyle {
        let mut style = PdfStyle::new()
            .with_font_size(self.size)
            .with_color(Color::Rgb(self.color.0, self.color.1, self.color.2));
        if self.bold {
            style = style.bold();
        }
        if self.italic {
            style = style.italic();
        }
        style
    }
}

/// The reusable set of text roles for one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Typography {
    pub font_family: FontFamily,
    pub margins: Margins,
    pub title: TextRole,
    pub heading: TextRole,
    pub body: TextRole,
    pub subtitle: TextRole,
    pub footer: TextRole,
    pub table_header: TextRole,
    pub table_cell: TextRole,
    pub border: Rgb,
}

impl Typography {
    /// Maps a style onto concrete text roles.
    pub fn derive(style: &Style) -> Typography {
        let colors = &style.colors;
        let fonts = &style.fonts;
        Typography {
            font_family: fonts.family,
            margins: style.margins,
            title: TextRole::new(fonts.title, colors.primary)
                .bold()
                .aligned(Alignment::Center)
                .spaced(0.0, 1.0),
            heading: TextRole::new(fonts.heading, colors.primary)
                .bold()
                .spaced(0.6, 0.3),
            body: TextRole::new(fonts.body, colors.text).spaced(0.0, 0.5),
            subtitle: TextRole::new(fonts.subtitle, colors.secondary)
                .aligned(Alignment::Center)
                .spaced(0.0, 0.8),
            footer: TextRole::new(fonts.footer, colors.secondary)
                .italic()
                .aligned(Alignment::Right)
                .spaced(0.3, 0.0),
            table_header: TextRole::new(fonts.table, colors.primary).bold(),
            table_cell: TextRole::new(fonts.table, colors.text),
            border: colors.border,
        }
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Bounded, thread-safe memo of [`Typography::derive`] keyed by style value.
///
/// Entries are kept in recency order; a hit moves the entry to the back and inserting into a
/// full cache evicts the least recently used one.
pub struct StyleCache {
    capacity: usize,
    entries: Mutex<Vec<(Style, Arc<Typography>)>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for StyleCache {
    fn default() -> Self {
        StyleCache::new()
    }
}

impl StyleCache {
    pub fn new() -> StyleCache {
        StyleCache::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Creates a cache holding at most `capacity` styles (at least one).
    pub fn with_capacity(capacity: usize) -> StyleCache {
        let capacity = capacity.max(1);
        StyleCache {
            capacity,
            entries: Mutex::new(Vec::with_capacity(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the typography for `style`, deriving and caching it on first use.
    pub fn get_or_derive(&self, style: &Style) -> Arc<Typography> {
        let mut entries = self.entries.lock();
        if let Some(pos) = entries.iter().position(|(s, _)| s == style) {
            let entry = entries.remove(pos);
            let typography = Arc::clone(&entry.1);
            entries.push(entry);
            self.hits.fetch_add(1, Ordering::Relaxed);
            return typography;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let typography = Arc::new(Typography::derive(style));
        if entries.len() >= self.capacity {
            entries.remove(0);
        }
        entries.push((style.clone(), Arc::clone(&typography)));
        debug!(
            "Derived typography for a new style ({} of {} cache slots used)",
            entries.len(),
            self.capacity
        );
        typography
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: self.entries.lock().len(),
            capacity: self.capacity,
        }
    }

    /// Drops every entry and resets the counters.
    pub fn clear(&self) {
        self.entries.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
