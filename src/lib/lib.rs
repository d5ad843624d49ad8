//! The internship2pdf library produces the PDF paperwork of an internship program: the receipt
//! handed to a student after applying to a position, and the internship contract signed once the
//! application is accepted.
//!
//! The pipeline is split in four layers. Business payloads ([`dto`]) are turned by a builder
//! ([`builders`]) into a renderer-agnostic [`document::Document`]; the document is laid out by a
//! [`pdf::PdfRenderer`] using a [`styling::Style`]; the bytes come back as a
//! [`builders::GeneratedDocument`] carrying the filename and identity of the document.
//!
//! Basic usage renders a receipt straight from its JSON payload:
//! ```rust,no_run
//! use internship2pdf::builders::ReceiptGenerator;
//! use internship2pdf::dto::ReceiptRequest;
//! use internship2pdf::pdf::PdfEngine;
//! use std::error::Error;
//!
//! fn example() -> Result<(), Box<dyn Error>> {
//!     let json = std::fs::read_to_string("postulacion.json")?;
//!     let request: ReceiptRequest = serde_json::from_str(&json)?;
//!
//!     let generator = ReceiptGenerator::with_renderer(PdfEngine::new());
//!     let receipt = generator.generate(&request, None)?;
//!     receipt.write_to("out")?;
//!     Ok(())
//! }
//! ```
//!
//! Styling is a plain value. Presets and overrides can be loaded from a TOML file:
//! ```rust
//! use internship2pdf::config::{load_config_from_source, ConfigSource};
//!
//! let settings = load_config_from_source(ConfigSource::Embedded(
//!     r##"
//!     preset = "professional"
//!     [colors]
//!     primary = "#003366"
//!     "##,
//! ));
//! assert_eq!(settings.style.colors.primary.to_hex(), "#003366");
//! ```
//!
//! Several generators may share one [`pdf::PdfEngine`] (by reference or through an `Arc`); the
//! engine only holds a bounded, mutex-guarded typography cache and the font metrics it loaded.

pub mod builders;
pub mod config;
pub mod dates;
pub mod document;
pub mod dto;
pub mod fonts;
pub mod letterhead;
pub mod pdf;
pub mod styling;
pub mod typography;
pub mod validation;

use document::DocumentError;
use pdf::RenderFailure;
use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use uuid::Uuid;

/// Errors reported by the document builders.
///
/// `InvalidDocument` is the caller's fault (a client error for an outer surface); every other
/// variant is a failure on the producing side.
#[derive(Debug)]
pub enum GenerationError {
    /// A required part of the payload is missing or unusable
    InvalidDocument { field: String, message: String },
    /// The renderer failed for an assembled document
    DocumentGeneration {
        document_id: Uuid,
        record_number: i64,
        source: RenderFailure,
    },
    /// The document model rejected an operation while assembling
    Model(DocumentError),
    /// Writing a generated document failed
    Io { path: PathBuf, source: io::Error },
}

impl GenerationError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> GenerationError {
        GenerationError::InvalidDocument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the error was caused by the request rather than by the generator.
    pub fn is_client_error(&self) -> bool {
        matches!(self, GenerationError::InvalidDocument { .. })
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GenerationError::InvalidDocument { field, message } => {
                write!(f, "Invalid document data in '{}': {}", field, message)
            }
            GenerationError::DocumentGeneration {
                document_id,
                record_number,
                source,
            } => write!(
                f,
                "Document generation failed for record {} (document {}): {}",
                record_number, document_id, source.message
            ),
            GenerationError::Model(e) => write!(f, "Document model error: {}", e),
            GenerationError::Io { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl Error for GenerationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GenerationError::InvalidDocument { .. } => None,
            GenerationError::DocumentGeneration { source, .. } => Some(source),
            GenerationError::Model(e) => Some(e),
            GenerationError::Io { source, .. } => Some(source),
        }
    }
}

impl From<DocumentError> for GenerationError {
    fn from(e: DocumentError) -> Self {
        GenerationError::Model(e)
    }
}
