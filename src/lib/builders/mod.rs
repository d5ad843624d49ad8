//! Document builders: from a business payload to a rendered, named PDF.
//!
//! A [`DocumentBuilder`] knows how to check and assemble one kind of document. A [`Generator`]
//! pairs a builder with an injected [`PdfRenderer`] and drives one request through
//! validating, assembling, rendering and finalizing, in that order and without retries.

mod contract;
mod receipt;

pub use contract::ContractBuilder;
pub use receipt::ReceiptBuilder;

use crate::document::{Document, DocumentError, Orientation, PageSize};
use crate::pdf::{PdfRenderer, CONTENT_TYPE, META_INSTITUTION_NAME, META_LOGO_PATH};
use crate::styling::Style;
use crate::GenerationError;
use log::{debug, info, warn};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Author recorded on generated documents unless configured otherwise.
pub const DEFAULT_AUTHOR: &str = "Sistema de Pasantías";

pub const META_DOCUMENT_TYPE: &str = "document_type";
pub const META_RECORD_NUMBER: &str = "record_number";
pub const META_STUDENT_ID: &str = "student_id";

/// Settings shared by every builder.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderOptions {
    /// Logo drawn in the letterhead. Ignored when the file does not exist.
    pub logo_path: Option<PathBuf>,
    pub author: String,
    pub page_size: PageSize,
    pub orientation: Orientation,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        BuilderOptions {
            logo_path: None,
            author: DEFAULT_AUTHOR.to_string(),
            page_size: PageSize::default(),
            orientation: Orientation::default(),
        }
    }
}

impl BuilderOptions {
    pub fn with_logo(mut self, path: impl Into<PathBuf>) -> BuilderOptions {
        self.logo_path = Some(path.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> BuilderOptions {
        self.author = author.into();
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> BuilderOptions {
        self.page_size = page_size;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> BuilderOptions {
        self.orientation = orientation;
        self
    }

    /// Creates the empty document every builder starts from, with its identifying metadata.
    fn base_document(
        &self,
        title: String,
        document_type: &str,
        record_number: i64,
        student_id: &str,
        institution: &str,
    ) -> Result<Document, DocumentError> {
        let mut document = Document::new(title)?
            .with_author(self.author.clone())
            .with_page_size(self.page_size)
            .with_orientation(self.orientation)
            .with_metadata(META_DOCUMENT_TYPE, document_type)
            .with_metadata(META_RECORD_NUMBER, record_number)
            .with_metadata(META_STUDENT_ID, student_id)
            .with_metadata(META_INSTITUTION_NAME, institution);

        if let Some(logo) = &self.logo_path {
            if logo.exists() {
                document = document.with_metadata(META_LOGO_PATH, logo.display().to_string());
            } else {
                warn!("Logo {} not found, rendering without it", logo.display());
            }
        }
        Ok(document)
    }
}

/// One kind of document: how a request is checked and turned into a [`Document`].
pub trait DocumentBuilder {
    type Request;

    /// Prefix of the output filename, also stored as `document_type` metadata.
    const DOCUMENT_TYPE: &'static str;

    /// Checks the parts of the request the document cannot be built without.
    fn validate(&self, request: &Self::Request) -> Result<(), GenerationError>;

    /// The business number identifying the document.
    fn record_number(&self, request: &Self::Request) -> i64;

    /// Builds the section flow. Only called on validated requests.
    fn assemble(&self, request: &Self::Request) -> Result<Document, DocumentError>;
}

/// Result of a successful generation.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    /// The PDF bytes; `None` when the document was streamed to a writer.
    pub content: Option<Vec<u8>>,
    pub filename: String,
    pub document_id: Uuid,
    pub record_number: i64,
}

impl GeneratedDocument {
    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    /// Writes the buffered content into `dir` under [`GeneratedDocument::filename`].
    ///
    /// Returns the path of the written file.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, GenerationError> {
        let path = dir.as_ref().join(&self.filename);
        let content = self.content.as_deref().ok_or_else(|| GenerationError::Io {
            path: path.clone(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "document was streamed, no buffered content to write",
            ),
        })?;
        fs::write(&path, content).map_err(|source| GenerationError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Drives a [`DocumentBuilder`] with an injected renderer.
pub struct Generator<B, R> {
    builder: B,
    renderer: R,
}

/// Generator of application receipts.
pub type ReceiptGenerator<R> = Generator<ReceiptBuilder, R>;
/// Generator of internship contracts.
pub type ContractGenerator<R> = Generator<ContractBuilder, R>;

impl<B: DocumentBuilder + Default, R: PdfRenderer> Generator<B, R> {
    /// Creates a generator with the builder's default options.
    pub fn with_renderer(renderer: R) -> Generator<B, R> {
        Generator::new(B::default(), renderer)
    }
}

impl<B: DocumentBuilder, R: PdfRenderer> Generator<B, R> {
    pub fn new(builder: B, renderer: R) -> Generator<B, R> {
        Generator { builder, renderer }
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn filename(record_number: i64) -> String {
        format!("{}_{}.pdf", B::DOCUMENT_TYPE, record_number)
    }

    /// Validates and assembles the document without rendering it.
    pub fn build_document(&self, request: &B::Request) -> Result<Document, GenerationError> {
        debug!("Validating {} request", B::DOCUMENT_TYPE);
        self.builder.validate(request)?;
        debug!(
            "Assembling {} {}",
            B::DOCUMENT_TYPE,
            self.builder.record_number(request)
        );
        Ok(self.builder.assemble(request)?)
    }

    /// Generates the document into memory.
    ///
    /// `style` is used verbatim when given, otherwise [`Style::default`] applies.
    pub fn generate(
        &self,
        request: &B::Request,
        style: Option<&Style>,
    ) -> Result<GeneratedDocument, GenerationError> {
        let mut document = self.build_document(request)?;
        let record_number = self.builder.record_number(request);
        let style = resolve_style(style);

        debug!("Rendering {} {}", B::DOCUMENT_TYPE, record_number);
        let bytes = self
            .renderer
            .render(&document, &style)
            .map_err(|source| GenerationError::DocumentGeneration {
                document_id: document.id(),
                record_number,
                source,
            })?;

        Ok(self.finalize(&mut document, record_number, Some(bytes)))
    }

    /// Generates the document straight into `sink`. The returned value carries no content.
    pub fn generate_to_writer(
        &self,
        request: &B::Request,
        sink: &mut dyn Write,
        style: Option<&Style>,
    ) -> Result<GeneratedDocument, GenerationError> {
        let mut document = self.build_document(request)?;
        let record_number = self.builder.record_number(request);
        let style = resolve_style(style);

        debug!("Streaming {} {}", B::DOCUMENT_TYPE, record_number);
        self.renderer
            .render_to_writer(&document, &style, sink)
            .map_err(|source| GenerationError::DocumentGeneration {
                document_id: document.id(),
                record_number,
                source,
            })?;

        Ok(self.finalize(&mut document, record_number, None))
    }

    fn finalize(
        &self,
        document: &mut Document,
        record_number: i64,
        content: Option<Vec<u8>>,
    ) -> GeneratedDocument {
        document.mark_as_generated();
        let filename = Self::filename(record_number);
        info!(
            "Generated {} ({} sections, document {})",
            filename,
            document.section_count(),
            document.id()
        );
        GeneratedDocument {
            content,
            filename,
            document_id: document.id(),
            record_number,
        }
    }
}

fn resolve_style(style: Option<&Style>) -> Style {
    style.cloned().unwrap_or_default()
}

/// Prints a value or a placeholder when it is missing or blank.
fn or_unspecified(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "No especificado",
    }
}

fn require_text(field: &str, value: &str, what: &str) -> Result<(), GenerationError> {
    if value.trim().is_empty() {
        return Err(GenerationError::invalid(
            field,
            format!("{} is required", what),
        ));
    }
    Ok(())
}

fn require_number(field: &str, value: i64) -> Result<(), GenerationError> {
    if value < 1 {
        return Err(GenerationError::invalid(
            field,
            "number is required and must be positive",
        ));
    }
    Ok(())
}

/// Weekly hours without a trailing `.0` for whole values.
fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}", hours as i64)
    } else {
        format!("{}", hours)
    }
}
