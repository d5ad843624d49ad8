//! PDF rendering of the document model.
//!
//! The [`PdfEngine`] walks a [`Document`] section by section and lays it out with
//! `genpdfi_extended`. It only understands titles, content, roles, tables and metadata; all
//! business wording is produced upstream by the builders.
//!
//! Visual treatment per [`SectionRole`]:
//! - `MainTitle`: centered title; without a title the content becomes a centered subtitle
//! - `SubHeading`: left-aligned heading followed by body paragraphs
//! - `BodyText`: body paragraphs continuing the previous flow
//! - `FooterLine`: compact right-aligned lines
//!
//! Content is split into paragraph blocks on blank lines, and into lines on single newlines.
//! `**bold**` spans are the only inline markup.
//!
//! When the document metadata carries both `logo_path` and `institution_name`, every page gets
//! a [`Letterhead`].
//!
//! The encoder stamps the current time and a fresh file identifier into every PDF. Both are
//! rewritten in place from the document's own creation time and id, so rendering the same
//! document with the same style always yields the same bytes.

use crate::document::{Document, Orientation, Section, SectionElement, SectionRole, Table};
use crate::fonts::FontStore;
use crate::letterhead::Letterhead;
use crate::styling::Style;
use crate::typography::{StyleCache, TextRole, Typography};
use genpdfi_extended::elements::{Break, FrameCellDecorator, Paragraph, TableLayout};
use genpdfi_extended::style::{Color, LineStyle};
use genpdfi_extended::{Element, Margins, SimplePageDecorator, Size};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::any::Any;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::{Cursor, Write};
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// MIME type of the produced documents.
pub const CONTENT_TYPE: &str = "application/pdf";

/// Metadata key holding the path of the letterhead logo.
pub const META_LOGO_PATH: &str = "logo_path";
/// Metadata key holding the institution name printed in the letterhead.
pub const META_INSTITUTION_NAME: &str = "institution_name";

const CELL_PADDING_MM: f32 = 1.5;
const MAX_COLUMN_WEIGHT: usize = 40;
const TABLE_RULE_MM: f32 = 0.2;

static INFO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(D:(\d{14})").expect("info date pattern is a valid regex"));
static XMP_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<xmp:(?:CreateDate|ModifyDate|MetadataDate)>(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})")
        .expect("xmp date pattern is a valid regex")
});
static FILE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/ID\s*\[\s*[<(]([0-9A-Za-z]+)[>)]\s*[<(]([0-9A-Za-z]+)[>)]\s*\]")
        .expect("file id pattern is a valid regex")
});
static XMP_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<xmpMM:(?:DocumentID|InstanceID)>([^<]*)<")
        .expect("xmp id pattern is a valid regex")
});

#[derive(Debug)]
struct EngineError(String);

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for EngineError {}

/// The single error kind leaving the render boundary.
///
/// Whatever went wrong inside the layout engine (fonts, page geometry, page building, or a
/// panic) is reported through this type with the identity of the document being rendered.
#[derive(Debug)]
pub struct RenderFailure {
    pub document_id: Uuid,
    pub message: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl RenderFailure {
    pub fn new(document_id: Uuid, message: impl Into<String>) -> RenderFailure {
        RenderFailure {
            document_id,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a cause, keeping it available through [`Error::source`].
    pub fn with_source(
        document_id: Uuid,
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> RenderFailure {
        RenderFailure {
            document_id,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    fn engine(document_id: Uuid, message: &str, cause: impl fmt::Display) -> RenderFailure {
        RenderFailure::with_source(document_id, message, EngineError(cause.to_string()))
    }
}

impl fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to render document {}: {}",
            self.document_id, self.message
        )
    }
}

impl Error for RenderFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

/// Anything able to turn a document and a style into PDF bytes.
///
/// Builders are generic over this trait so tests can substitute a recording renderer.
pub trait PdfRenderer: Send + Sync {
    /// Renders the whole document into memory.
    fn render(&self, document: &Document, style: &Style) -> Result<Vec<u8>, RenderFailure>;

    /// Renders the document and writes it into `sink`.
    ///
    /// If writing fails midway, the sink may hold a partial document.
    fn render_to_writer(
        &self,
        document: &Document,
        style: &Style,
        sink: &mut dyn Write,
    ) -> Result<(), RenderFailure> {
        let bytes = self.render(document, style)?;
        sink.write_all(&bytes)
            .and_then(|_| sink.flush())
            .map_err(|e| {
                RenderFailure::with_source(document.id(), "failed to write the output stream", e)
            })
    }
}

impl<R: PdfRenderer + ?Sized> PdfRenderer for &R {
    fn render(&self, document: &Document, style: &Style) -> Result<Vec<u8>, RenderFailure> {
        (**self).render(document, style)
    }

    fn render_to_writer(
        &self,
        document: &Document,
        style: &Style,
        sink: &mut dyn Write,
    ) -> Result<(), RenderFailure> {
        (**self).render_to_writer(document, style, sink)
    }
}

impl<R: PdfRenderer + ?Sized> PdfRenderer for Arc<R> {
    fn render(&self, document: &Document, style: &Style) -> Result<Vec<u8>, RenderFailure> {
        (**self).render(document, style)
    }

    fn render_to_writer(
        &self,
        document: &Document,
        style: &Style,
        sink: &mut dyn Write,
    ) -> Result<(), RenderFailure> {
        (**self).render_to_writer(document, style, sink)
    }
}

/// Page width and height in millimetres for the document's size and orientation.
pub fn page_dimensions(document: &Document) -> (f32, f32) {
    let (width, height) = document.page_size().dimensions_mm();
    match document.orientation() {
        Orientation::Portrait => (width, height),
        Orientation::Landscape => (height, width),
    }
}

/// Splits text into `(segment, bold)` runs on `**` markers.
///
/// An unmatched trailing marker is kept as literal text.
pub fn inline_spans(text: &str) -> Vec<(String, bool)> {
    let parts: Vec<&str> = text.split("**").collect();
    let unbalanced = parts.len() % 2 == 0;
    let mut spans: Vec<(String, bool)> = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let (segment, bold) = if unbalanced && i == parts.len() - 1 {
            (format!("**{}", part), false)
        } else {
            (part.to_string(), i % 2 == 1)
        };
        if segment.is_empty() {
            continue;
        }
        match spans.last_mut() {
            Some((last, last_bold)) if *last_bold == bold => last.push_str(&segment),
            _ => spans.push((segment, bold)),
        }
    }
    spans
}

/// Relative column widths for a table.
///
/// Two-column tables are label/value pairs and get a fixed 1:2 split. Wider tables are weighted
/// by the longest text in each column.
pub fn column_weights(table: &Table) -> Vec<usize> {
    if table.column_count() == 2 {
        return vec![1, 2];
    }
    (0..table.column_count())
        .map(|col| {
            let header = table.headers()[col].chars().count();
            let widest = table
                .rows()
                .iter()
                .map(|row| row[col].chars().count())
                .max()
                .unwrap_or(0);
            header.max(widest).clamp(1, MAX_COLUMN_WEIGHT)
        })
        .collect()
}

/// Replaces the encoder's timestamps and file identifiers with values derived from `document`.
///
/// Every edit keeps the byte length, so the cross-reference offsets stay valid.
fn pin_volatile_fields(mut pdf: Vec<u8>, document: &Document) -> Vec<u8> {
    let created = document.created_at();
    let info_date = created.format("%Y%m%d%H%M%S").to_string();
    let xmp_date = created.format("%Y-%m-%dT%H:%M:%S").to_string();
    let seed = document.id().simple().to_string();

    let mut dates: Vec<(Range<usize>, &str)> = Vec::new();
    let mut ids: Vec<Range<usize>> = Vec::new();
    for caps in INFO_DATE.captures_iter(&pdf) {
        if let Some(m) = caps.get(1) {
            dates.push((m.range(), &info_date));
        }
    }
    for caps in XMP_DATE.captures_iter(&pdf) {
        if let Some(m) = caps.get(1) {
            dates.push((m.range(), &xmp_date));
        }
    }
    for caps in FILE_ID.captures_iter(&pdf) {
        ids.extend(caps.iter().skip(1).flatten().map(|m| m.range()));
    }
    for caps in XMP_ID.captures_iter(&pdf) {
        if let Some(m) = caps.get(1) {
            ids.push(m.range());
        }
    }

    for (range, value) in dates {
        if range.len() == value.len() {
            pdf[range].copy_from_slice(value.as_bytes());
        }
    }
    let seed = seed.as_bytes();
    for range in ids {
        let mut next = seed.iter().cycle();
        for byte in pdf[range].iter_mut().filter(|b| b.is_ascii_alphanumeric()) {
            if let Some(s) = next.next() {
                *byte = *s;
            }
        }
    }
    pdf
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Builds one paragraph holding a single line with inline bold spans.
fn styled_line(line: &str, role: &TextRole) -> Paragraph {
    let mut para = Paragraph::default();
    para.set_alignment(role.alignment);
    let base = role.pdf_style();
    for (segment, bold) in inline_spans(line) {
        let style = if bold { base.clone().bold() } else { base.clone() };
        para.push_styled(segment, style);
    }
    para
}

/// The production renderer, backed by `genpdfi_extended`.
///
/// Holds the typography cache and the font store; both are safe to share, so one engine can
/// serve concurrent renders of independent documents.
pub struct PdfEngine {
    styles: StyleCache,
    fonts: FontStore,
}

impl Default for PdfEngine {
    fn default() -> Self {
        PdfEngine::new()
    }
}

impl PdfEngine {
    pub fn new() -> PdfEngine {
        PdfEngine::with_cache(StyleCache::new())
    }

    pub fn with_cache(styles: StyleCache) -> PdfEngine {
        PdfEngine {
            styles,
            fonts: FontStore::new(),
        }
    }

    /// Replaces the font store, e.g. with [`FontStore::embedded`] for reproducible metrics.
    pub fn with_font_store(mut self, fonts: FontStore) -> PdfEngine {
        self.fonts = fonts;
        self
    }

    pub fn font_store(&self) -> &FontStore {
        &self.fonts
    }

    pub fn style_cache(&self) -> &StyleCache {
        &self.styles
    }

    /// Renders the document straight into a file.
    pub fn render_to_file(
        &self,
        document: &Document,
        style: &Style,
        path: impl AsRef<Path>,
    ) -> Result<(), RenderFailure> {
        let path = path.as_ref();
        let bytes = self.render(document, style)?;
        fs::write(path, bytes).map_err(|e| {
            RenderFailure::with_source(
                document.id(),
                format!("failed to write {}", path.display()),
                e,
            )
        })
    }

    /// Lays out the whole document. Everything below this call may fail or panic; the caller
    /// normalises both.
    fn layout(
        &self,
        document: &Document,
        style: &Style,
    ) -> Result<genpdfi_extended::Document, RenderFailure> {
        let id = document.id();
        let typography = self.styles.get_or_derive(style);
        let font_family = self
            .fonts
            .family(typography.font_family)
            .map_err(|e| RenderFailure::engine(id, "failed to load fonts", e))?;

        let mut doc = genpdfi_extended::Document::new(font_family);
        doc.set_title(document.title());
        let (width, height) = page_dimensions(document);
        doc.set_paper_size(Size::new(width, height));
        doc.set_font_size(typography.body.size);

        let m = typography.margins;
        match (
            document.metadata_str(META_LOGO_PATH),
            document.metadata_str(META_INSTITUTION_NAME),
        ) {
            (Some(logo), Some(institution)) => {
                debug!("Decorating pages of {} with the letterhead", id);
                let letterhead = Letterhead::new(
                    Path::new(logo),
                    institution,
                    typography.subtitle,
                    typography.footer,
                    typography.border,
                )
                .with_margins(m.top, m.right, m.bottom, m.left);
                doc.set_page_decorator(letterhead);
            }
            _ => {
                let mut decorator = SimplePageDecorator::new();
                decorator.set_margins(Margins::trbl(m.top, m.right, m.bottom, m.left));
                doc.set_page_decorator(decorator);
            }
        }

        for (index, section) in document.sections().iter().enumerate() {
            self.push_section(&mut doc, section, &typography)
                .map_err(|e| RenderFailure::engine(id, &format!("section {}", index), e))?;
        }
        Ok(doc)
    }

    fn push_block(&self, doc: &mut genpdfi_extended::Document, block: &str, role: &TextRole) {
        if role.before > 0.0 {
            doc.push(Break::new(role.before));
        }
        for line in block.lines().filter(|l| !l.trim().is_empty()) {
            doc.push(styled_line(line.trim_end(), role));
        }
        if role.after > 0.0 {
            doc.push(Break::new(role.after));
        }
    }

    fn push_paragraphs(
        &self,
        doc: &mut genpdfi_extended::Document,
        section: &Section,
        role: &TextRole,
    ) {
        for block in section.paragraphs() {
            self.push_block(doc, block, role);
        }
    }

    fn push_section(
        &self,
        doc: &mut genpdfi_extended::Document,
        section: &Section,
        t: &Typography,
    ) -> Result<(), genpdfi_extended::error::Error> {
        match section.role {
            SectionRole::MainTitle => {
                if section.has_title() {
                    self.push_block(doc, &section.title, &t.title);
                    self.push_paragraphs(doc, section, &t.body);
                } else {
                    self.push_paragraphs(doc, section, &t.subtitle);
                }
            }
            SectionRole::SubHeading | SectionRole::BodyText => {
                if section.has_title() {
                    self.push_block(doc, &section.title, &t.heading);
                }
                self.push_paragraphs(doc, section, &t.body);
            }
            SectionRole::FooterLine => {
                if section.has_title() {
                    self.push_block(doc, &section.title, &t.footer);
                }
                self.push_paragraphs(doc, section, &t.footer);
            }
        }

        for element in &section.elements {
            match element {
                SectionElement::Table(table) => self.push_table(doc, table, t)?,
            }
        }
        Ok(())
    }

    fn push_table(
        &self,
        doc: &mut genpdfi_extended::Document,
        table: &Table,
        t: &Typography,
    ) -> Result<(), genpdfi_extended::error::Error> {
        if let Some(title) = table.title() {
            self.push_block(doc, title, &t.heading);
        }

        let mut layout = TableLayout::new(column_weights(table));
        let (r, g, b) = (t.border.0, t.border.1, t.border.2);
        layout.set_cell_decorator(FrameCellDecorator::with_line_style(
            true,
            true,
            false,
            LineStyle::new()
                .with_color(Color::Rgb(r, g, b))
                .with_thickness(TABLE_RULE_MM),
        ));
        let padding = Margins::trbl(
            CELL_PADDING_MM,
            CELL_PADDING_MM * 1.5,
            CELL_PADDING_MM,
            CELL_PADDING_MM * 1.5,
        );

        let mut header = layout.row();
        for cell in table.headers() {
            header.push_element(styled_line(cell, &t.table_header).padded(padding));
        }
        header.push()?;

        for row in table.rows() {
            let mut table_row = layout.row();
            for cell in row {
                table_row.push_element(styled_line(cell, &t.table_cell).padded(padding));
            }
            table_row.push()?;
        }

        doc.push(layout);
        doc.push(Break::new(t.body.after.max(0.5)));
        Ok(())
    }
}

impl PdfRenderer for PdfEngine {
    fn render(&self, document: &Document, style: &Style) -> Result<Vec<u8>, RenderFailure> {
        let id = document.id();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<Vec<u8>, RenderFailure> {
            let pdf = self.layout(document, style)?;
            let mut buffer = Cursor::new(Vec::new());
            pdf.render(&mut buffer)
                .map_err(|e| RenderFailure::engine(id, "page building failed", e))?;
            Ok(pin_volatile_fields(buffer.into_inner(), document))
        }));

        let bytes = match outcome {
            Ok(result) => result?,
            Err(payload) => {
                return Err(RenderFailure::engine(
                    id,
                    "layout engine panicked",
                    panic_message(payload.as_ref()),
                ))
            }
        };
        info!(
            "Rendered document {} ({} sections, {} bytes)",
            id,
            document.section_count(),
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PageSize;
    use crate::styling::{Margins as PageMargins, Rgb};

    fn sample_document() -> Document {
        let mut doc = Document::new("Informe").unwrap();
        doc.add_section(Section::new("Universidad X", "", SectionRole::MainTitle))
            .unwrap();
        doc.add_section(Section::new("", "Subtítulo centrado", SectionRole::MainTitle))
            .unwrap();
        let table = Table::new(
            vec!["Campo".into(), "Información".into()],
            vec![vec!["Estudiante".into(), "Ana".into()]],
        )
        .unwrap();
        doc.add_section(
            Section::new("Datos", "Primer párrafo.\n\nSegundo **en negrita**.", SectionRole::SubHeading)
                .with_table(table),
        )
        .unwrap();
        doc.add_section(Section::new("", "____\nFirma", SectionRole::FooterLine))
            .unwrap();
        doc
    }

    #[test]
    fn test_page_dimensions() {
        let doc = Document::new("d").unwrap();
        assert_eq!(page_dimensions(&doc), (210.0, 297.0));
        let doc = doc
            .with_page_size(PageSize::Letter)
            .with_orientation(Orientation::Landscape);
        assert_eq!(page_dimensions(&doc), (279.4, 215.9));
    }

    #[test]
    fn test_inline_spans() {
        assert_eq!(
            inline_spans("Hola **Ana**, bienvenida"),
            vec![
                ("Hola ".to_string(), false),
                ("Ana".to_string(), true),
                (", bienvenida".to_string(), false)
            ]
        );
        assert_eq!(
            inline_spans("**PRIMERA: ANTECEDENTES. -** texto"),
            vec![
                ("PRIMERA: ANTECEDENTES. -".to_string(), true),
                (" texto".to_string(), false)
            ]
        );
        assert_eq!(
            inline_spans("sin cierre **abierto"),
            vec![("sin cierre **abierto".to_string(), false)]
        );
        assert!(inline_spans("").is_empty());
    }

    #[test]
    fn test_column_weights() {
        let two = Table::new(vec!["a".into(), "b".into()], vec![]).unwrap();
        assert_eq!(column_weights(&two), vec![1, 2]);

        let three = Table::new(
            vec!["Nombre".into(), "N".into(), "".into()],
            vec![vec!["Ana".into(), "12345678".into(), "".into()]],
        )
        .unwrap();
        assert_eq!(column_weights(&three), vec![6, 8, 1]);
    }

    fn embedded_engine() -> PdfEngine {
        PdfEngine::new().with_font_store(FontStore::embedded())
    }

    /// Stroke colors set in the page content streams, as 0-1 channels.
    fn stroke_colors(pdf: &[u8]) -> Vec<[f32; 3]> {
        let doc = lopdf::Document::load_mem(pdf).unwrap();
        let mut colors = Vec::new();
        for (_, page_id) in doc.get_pages() {
            let content = doc.get_and_decode_page_content(page_id).unwrap();
            for op in content.operations {
                if matches!(op.operator.as_str(), "RG" | "SC" | "SCN") && op.operands.len() == 3 {
                    let c: Vec<f32> = op.operands.iter().map(|o| o.as_float().unwrap()).collect();
                    colors.push([c[0], c[1], c[2]]);
                }
            }
        }
        colors
    }

    fn strokes_with(strokes: &[[f32; 3]], color: Rgb) -> bool {
        let expected = [color.0, color.1, color.2].map(|c| c as f32 / 255.0);
        strokes
            .iter()
            .any(|s| s.iter().zip(expected).all(|(a, b)| (a - b).abs() < 0.01))
    }

    #[test]
    fn test_pin_volatile_fields_keeps_length() {
        let doc = Document::new("d").unwrap();
        let raw = b"<< /CreationDate (D:20991231235959+00'00') >>\ntrailer << /ID [<0A1B2C> <3D4E5F>] >>\n<xmp:CreateDate>2099-12-31T23:59:59+00:00</xmp:CreateDate><xmpMM:InstanceID>uuid:abc-def</xmpMM:InstanceID>".to_vec();
        let pinned = pin_volatile_fields(raw.clone(), &doc);
        assert_eq!(pinned.len(), raw.len());

        let text = String::from_utf8(pinned).unwrap();
        let created = doc.created_at();
        assert!(text.contains(&format!("(D:{}+00'00')", created.format("%Y%m%d%H%M%S"))));
        assert!(text.contains(&format!(
            "<xmp:CreateDate>{}+00:00",
            created.format("%Y-%m-%dT%H:%M:%S")
        )));
        let seed = doc.id().simple().to_string();
        assert!(text.contains(&format!("/ID [<{}> <{}>]", &seed[..6], &seed[..6])));
        assert!(text.contains(&format!(
            "<xmpMM:InstanceID>{}:{}-{}<",
            &seed[..4],
            &seed[4..7],
            &seed[7..10]
        )));
    }

    #[test]
    fn test_same_input_renders_identical_bytes() {
        let engine = embedded_engine();
        let doc = sample_document();
        let first = engine.render(&doc, &Style::default()).unwrap();
        let second = engine.render(&doc, &Style::default()).unwrap();
        assert_eq!(first, second);

        let other = embedded_engine().render(&doc, &Style::default()).unwrap();
        assert_eq!(first, other);
    }

    #[test]
    fn test_table_frame_uses_border_color() {
        let engine = embedded_engine();
        let doc = sample_document();

        let default_border = Style::default().colors.border;
        let strokes = stroke_colors(&engine.render(&doc, &Style::default()).unwrap());
        assert!(strokes_with(&strokes, default_border));

        let professional_border = Style::professional().colors.border;
        let strokes = stroke_colors(&engine.render(&doc, &Style::professional()).unwrap());
        assert!(strokes_with(&strokes, professional_border));
        assert!(!strokes_with(&strokes, default_border));
    }

    #[test]
    fn test_layout_error_becomes_render_failure() {
        let doc = sample_document().with_page_size(PageSize::A5);
        let style = Style::default().with_margins(PageMargins::uniform(200.0));
        let err = embedded_engine().render(&doc, &style).unwrap_err();
        assert_eq!(err.document_id, doc.id());
        assert!(err.source().is_some());
        assert!(err.to_string().contains(&doc.id().to_string()));
    }

    #[test]
    fn test_render_failure_chains_cause() {
        let id = Uuid::new_v4();
        let failure = RenderFailure::engine(id, "failed to load fonts", "no fonts");
        assert!(failure.to_string().contains(&id.to_string()));
        assert_eq!(failure.source().unwrap().to_string(), "no fonts");
        assert!(RenderFailure::new(id, "x").source().is_none());
    }

    #[test]
    fn test_render_produces_pdf() {
        let engine = embedded_engine();
        let doc = sample_document();
        let bytes = engine.render(&doc, &Style::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let professional = engine.render(&doc, &Style::professional()).unwrap();
        assert!(professional.starts_with(b"%PDF-"));
        assert_eq!(engine.style_cache().stats().misses, 2);
    }

    #[test]
    fn test_render_to_writer_and_file() {
        let engine = PdfEngine::new();
        let doc = sample_document();
        let mut sink = Vec::new();
        engine
            .render_to_writer(&doc, &Style::default(), &mut sink)
            .unwrap();
        assert!(sink.starts_with(b"%PDF-"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        engine.render_to_file(&doc, &Style::default(), &path).unwrap();
        assert!(fs::read(&path).unwrap().starts_with(b"%PDF-"));
    }

    #[test]
    fn test_render_with_missing_logo_still_decorates() {
        let doc = sample_document()
            .with_metadata(META_LOGO_PATH, "/no/such/logo.png")
            .with_metadata(META_INSTITUTION_NAME, "Universidad X");
        let bytes = PdfEngine::new().render(&doc, &Style::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_write_failure_is_reported() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        struct Fixed;
        impl PdfRenderer for Fixed {
            fn render(&self, _: &Document, _: &Style) -> Result<Vec<u8>, RenderFailure> {
                Ok(b"%PDF-1.7".to_vec())
            }
        }

        let doc = Document::new("d").unwrap();
        let err = Fixed
            .render_to_writer(&doc, &Style::default(), &mut Broken)
            .unwrap_err();
        assert_eq!(err.document_id, doc.id());
        assert_eq!(err.source().unwrap().to_string(), "closed");
    }
}
