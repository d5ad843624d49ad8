//! In-memory document model handed to the render engine.
//!
//! A [`Document`] is an ordered list of [`Section`]s plus free-form metadata. Sections carry a
//! [`SectionRole`] that tells the renderer how to treat them visually, and an ordered list of
//! embedded [`SectionElement`]s (only tables today). Nothing in this module knows about PDF
//! primitives or about the business vocabulary of the builders.
//!
//! ```rust
//! use internship2pdf::document::{Document, Section, SectionRole, Table};
//!
//! let mut doc = Document::new("Report").unwrap();
//! doc.add_section(Section::new("Intro", "First paragraph.\n\nSecond one.", SectionRole::SubHeading))
//!     .unwrap();
//! let table = Table::new(vec!["Field".into(), "Value".into()], vec![vec!["a".into(), "b".into()]])
//!     .unwrap();
//! doc.add_table(table, Some(0)).unwrap();
//! assert_eq!(doc.section_count(), 1);
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use uuid::Uuid;

/// Title given to a section created implicitly by [`Document::add_table`] for an untitled table.
pub const FALLBACK_TABLE_TITLE: &str = "Tabla";

/// Errors raised by the mutation API of the document model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Document titles must contain at least one non-whitespace character.
    InvalidTitle,
    /// A numeric heading level outside `1..=6` was supplied.
    InvalidLevel { level: u8 },
    /// A table was built without any header.
    EmptyHeaders,
    /// A table row does not have as many cells as there are headers.
    TableShape {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// The document was already rendered and can no longer change.
    InvalidState { message: String },
    /// A section index passed to [`Document::add_table`] does not exist.
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::InvalidTitle => write!(f, "document title cannot be empty"),
            DocumentError::InvalidLevel { level } => {
                write!(f, "section level must be between 1 and 6, got {}", level)
            }
            DocumentError::EmptyHeaders => write!(f, "table must have at least one header"),
            DocumentError::TableShape {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {} has {} columns, expected {}",
                row, found, expected
            ),
            DocumentError::InvalidState { message } => write!(f, "invalid state: {}", message),
            DocumentError::IndexOutOfRange { index, len } => write!(
                f,
                "section index {} out of range (document has {} sections)",
                index, len
            ),
        }
    }
}

impl Error for DocumentError {}

/// Paper formats understood by the render engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
    A3,
    A5,
}

impl PageSize {
    /// Width and height in millimetres for portrait orientation.
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::A3 => (297.0, 420.0),
            PageSize::A5 => (148.0, 210.0),
        }
    }

    /// Parses a case-insensitive page size name such as `"a4"` or `"letter"`.
    pub fn from_name(name: &str) -> Option<PageSize> {
        match name.trim().to_lowercase().as_str() {
            "a4" => Some(PageSize::A4),
            "letter" => Some(PageSize::Letter),
            "legal" => Some(PageSize::Legal),
            "a3" => Some(PageSize::A3),
            "a5" => Some(PageSize::A5),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn from_name(name: &str) -> Option<Orientation> {
        match name.trim().to_lowercase().as_str() {
            "portrait" | "vertical" => Some(Orientation::Portrait),
            "landscape" | "horizontal" => Some(Orientation::Landscape),
            _ => None,
        }
    }
}

/// Visual role of a section.
///
/// The renderer dispatches on this directly: there is no numeric heading level to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionRole {
    /// Centered page title. Without a title, the content is rendered as a centered subtitle.
    MainTitle,
    /// Left-aligned sub-heading followed by body paragraphs.
    SubHeading,
    /// Body paragraphs continuing the previous flow.
    BodyText,
    /// Compact footer-style lines.
    FooterLine,
}

impl SectionRole {
    /// Maps a legacy numeric heading level to a role.
    ///
    /// Level 1 is a main title, level 3 a footer line, every other level in `1..=6` a
    /// sub-heading. Anything outside that range is rejected.
    pub fn from_level(level: u8) -> Result<SectionRole, DocumentError> {
        match level {
            1 => Ok(SectionRole::MainTitle),
            3 => Ok(SectionRole::FooterLine),
            2 | 4..=6 => Ok(SectionRole::SubHeading),
            _ => Err(DocumentError::InvalidLevel { level }),
        }
    }
}

/// A table embedded in a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    title: Option<String>,
}

impl Table {
    /// Builds a table, checking that headers exist and every row matches their count.
    ///
    /// # Returns
    /// * `Err(DocumentError::EmptyHeaders)` when `headers` is empty
    /// * `Err(DocumentError::TableShape)` for the first row whose length differs
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Table, DocumentError> {
        if headers.is_empty() {
            return Err(DocumentError::EmptyHeaders);
        }
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != headers.len())
        {
            return Err(DocumentError::TableShape {
                row,
                expected: headers.len(),
                found: cells.len(),
            });
        }
        Ok(Table {
            headers,
            rows,
            title: None,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Table {
        let title = title.into();
        self.title = if title.trim().is_empty() {
            None
        } else {
            Some(title)
        };
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// Content blocks that can be embedded in a section after its text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SectionElement {
    Table(Table),
}

/// One block of the document flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub content: String,
    pub role: SectionRole,
    pub elements: Vec<SectionElement>,
    pub metadata: BTreeMap<String, Value>,
}

impl Section {
    /// Creates a section with a visual role. An empty title continues the previous flow.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        role: SectionRole,
    ) -> Section {
        Section {
            title: title.into(),
            content: content.into(),
            role,
            elements: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Creates a section from a numeric heading level, see [`SectionRole::from_level`].
    pub fn with_level(
        title: impl Into<String>,
        content: impl Into<String>,
        level: u8,
    ) -> Result<Section, DocumentError> {
        Ok(Section::new(title, content, SectionRole::from_level(level)?))
    }

    /// Appends a table after the section text.
    pub fn with_table(mut self, table: Table) -> Section {
        self.elements.push(SectionElement::Table(table));
        self
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Splits the content on blank lines into trimmed, non-empty paragraph blocks.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.content
            .split("\n\n")
            .map(|p| p.trim_matches('\n'))
            .filter(|p| !p.trim().is_empty())
            .collect()
    }
}

/// Serializable overview of a document, without its section contents.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub section_count: usize,
    pub metadata: BTreeMap<String, Value>,
}

/// A paginated document ready to be rendered.
#[derive(Debug, Clone)]
pub struct Document {
    id: Uuid,
    title: String,
    author: String,
    created_at: DateTime<Utc>,
    page_size: PageSize,
    orientation: Orientation,
    sections: Vec<Section>,
    metadata: BTreeMap<String, Value>,
    generated: bool,
}

impl Document {
    /// Default author recorded when none is given.
    pub const DEFAULT_AUTHOR: &'static str = "System";

    /// Creates an empty A4 portrait document with a fresh identity.
    ///
    /// Fails with [`DocumentError::InvalidTitle`] when `title` is blank.
    pub fn new(title: impl Into<String>) -> Result<Document, DocumentError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DocumentError::InvalidTitle);
        }
        Ok(Document {
            id: Uuid::new_v4(),
            title,
            author: Self::DEFAULT_AUTHOR.to_string(),
            created_at: Utc::now(),
            page_size: PageSize::default(),
            orientation: Orientation::default(),
            sections: Vec::new(),
            metadata: BTreeMap::new(),
            generated: false,
        })
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Document {
        self.author = author.into();
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Document {
        self.page_size = page_size;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Document {
        self.orientation = orientation;
        self
    }

    /// Sets a metadata entry. Metadata carries rendering hints such as `logo_path`.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Document {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    /// Returns a metadata entry as a non-empty string, if it is one.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Flags the document as rendered. Calling it again has no effect.
    pub fn mark_as_generated(&mut self) {
        self.generated = true;
    }

    fn ensure_mutable(&self, what: &str) -> Result<(), DocumentError> {
        if self.generated {
            return Err(DocumentError::InvalidState {
                message: format!("cannot {} to an already generated document", what),
            });
        }
        Ok(())
    }

    /// Appends a section at the end of the flow.
    pub fn add_section(&mut self, section: Section) -> Result<(), DocumentError> {
        self.ensure_mutable("add a section")?;
        self.sections.push(section);
        Ok(())
    }

    /// Adds a table to an existing section, or to a new one when no index is given.
    ///
    /// # Arguments
    /// * `table` - The table to embed
    /// * `section_index` - Target section; `None` wraps the table in a new sub-heading section
    ///   titled with the table title or [`FALLBACK_TABLE_TITLE`]
    pub fn add_table(
        &mut self,
        table: Table,
        section_index: Option<usize>,
    ) -> Result<(), DocumentError> {
        self.ensure_mutable("add a table")?;
        match section_index {
            Some(index) => {
                let len = self.sections.len();
                let section = self
                    .sections
                    .get_mut(index)
                    .ok_or(DocumentError::IndexOutOfRange { index, len })?;
                section.elements.push(SectionElement::Table(table));
            }
            None => {
                let title = table.title().unwrap_or(FALLBACK_TABLE_TITLE).to_string();
                self.sections
                    .push(Section::new(title, "", SectionRole::SubHeading).with_table(table));
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            title: self.title.clone(),
            author: self.author.clone(),
            created_at: self.created_at,
            page_size: self.page_size,
            orientation: self.orientation,
            section_count: self.sections.len(),
            metadata: self.metadata.clone(),
        }
    }
}
