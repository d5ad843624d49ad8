use internship2pdf::builders::{
    BuilderOptions, ContractBuilder, ContractGenerator, Generator, ReceiptGenerator,
};
use internship2pdf::fonts::FontStore;
use internship2pdf::GenerationError;
use internship2pdf::document::{Document, Section, SectionRole, Table};
use internship2pdf::dto::{ContractRequest, ReceiptRequest};
use internship2pdf::pdf::{PdfEngine, PdfRenderer, META_INSTITUTION_NAME, META_LOGO_PATH};
use internship2pdf::styling::{Margins, Style};
use std::sync::Arc;
use std::thread;

fn receipt_request() -> ReceiptRequest {
    serde_json::from_str(
        r#"{
            "estudiante": { "nombre": "Ana", "apellido": "Gómez", "dni": "12345678" },
            "universidad": { "nombre": "Universidad X" },
            "carrera": { "nombre": "Ingeniería en Sistemas" },
            "empresa": { "nombre": "TechCorp SA" },
            "proyecto": { "nombre": "Sistema de Gestión", "fecha_inicio": "2024-03-01" },
            "puesto": { "nombre": "Desarrollador Backend", "horas_dedicadas": 20 },
            "postulacion": { "numero": 42, "fecha": "2024-02-20T14:30:00Z",
                             "cantidad_materias_aprobadas": 18, "cantidad_materias_regulares": 4 }
        }"#,
    )
    .unwrap()
}

fn contract_request() -> ContractRequest {
    serde_json::from_str(
        r#"{
            "estudiante": { "nombre": "Ana", "apellido": "Gómez", "dni": "12345678" },
            "universidad": { "nombre": "Universidad X", "correo": "practicas@x.edu.ar" },
            "carrera": { "nombre": "Ingeniería en Sistemas" },
            "empresa": { "nombre": "TechCorp SA", "direccion": "Av. Colón 123" },
            "proyecto": { "nombre": "Sistema de Gestión" },
            "puesto": { "nombre": "Desarrollador Backend", "horas_dedicadas": 20 },
            "postulacion": { "numero": 42, "fecha": "2024-02-20" },
            "contrato": { "numero": 7, "fecha_inicio": "2024-03-01", "fecha_fin": "2024-09-30",
                          "fecha_emision": "2024-02-25T12:00:00Z" }
        }"#,
    )
    .unwrap()
}

/// A one-pixel PNG used as a letterhead logo.
const PNG_PIXEL: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53,
    0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x90, 0x2A, 0x7E, 0x01,
    0x00, 0x02, 0x20, 0x01, 0x76, 0x66, 0x36, 0xE2, 0xB5, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E,
    0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[test]
fn test_receipt_renders_to_valid_pdf() {
    let generator = ReceiptGenerator::with_renderer(PdfEngine::new());
    let generated = generator.generate(&receipt_request(), None).unwrap();
    assert_eq!(generated.filename, "receipt_42.pdf");

    let bytes = generated.content.unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    let pdf = lopdf::Document::load_mem(&bytes).unwrap();
    assert!(!pdf.get_pages().is_empty());
}

#[test]
fn test_contract_streams_into_writer() {
    let generator = ContractGenerator::with_renderer(PdfEngine::new());
    let mut sink = Vec::new();
    let generated = generator
        .generate_to_writer(&contract_request(), &mut sink, Some(&Style::professional()))
        .unwrap();
    assert!(generated.content.is_none());
    assert_eq!(generated.filename, "contract_7.pdf");
    let pdf = lopdf::Document::load_mem(&sink).unwrap();
    assert!(!pdf.get_pages().is_empty());
}

#[test]
fn test_contract_with_letterhead_logo() {
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    std::fs::write(&logo, PNG_PIXEL).unwrap();

    let builder = ContractBuilder::new(BuilderOptions::default().with_logo(&logo));
    let generator = Generator::new(builder, PdfEngine::new());
    let document = generator.build_document(&contract_request()).unwrap();
    assert!(document.metadata_str(META_LOGO_PATH).is_some());
    assert_eq!(
        document.metadata_str(META_INSTITUTION_NAME),
        Some("Universidad X")
    );

    let generated = generator.generate(&contract_request(), None).unwrap();
    let path = generated.write_to(dir.path()).unwrap();
    let pdf = lopdf::Document::load(&path).unwrap();
    assert!(!pdf.get_pages().is_empty());
}

#[test]
fn test_long_document_spans_several_pages() {
    let mut document = Document::new("Largo").unwrap();
    let rows: Vec<Vec<String>> = (0..120)
        .map(|i| vec![format!("Fila {}", i), "valor".to_string()])
        .collect();
    document
        .add_section(
            Section::new("Tabla extensa", "", SectionRole::SubHeading)
                .with_table(Table::new(vec!["Campo".into(), "Valor".into()], rows).unwrap()),
        )
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    std::fs::write(&logo, PNG_PIXEL).unwrap();
    let document = document
        .with_metadata(META_LOGO_PATH, logo.display().to_string())
        .with_metadata(META_INSTITUTION_NAME, "Universidad X");

    let bytes = PdfEngine::new()
        .render(&document, &Style::default())
        .unwrap();
    let pdf = lopdf::Document::load_mem(&bytes).unwrap();
    assert!(pdf.get_pages().len() > 1);
}

#[test]
fn test_engine_shared_across_threads() {
    let engine = Arc::new(PdfEngine::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let generator = ReceiptGenerator::with_renderer(engine);
                let style = if i % 2 == 0 {
                    Style::default()
                } else {
                    Style::professional()
                };
                generator
                    .generate(&receipt_request(), Some(&style))
                    .unwrap()
                    .content
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().starts_with(b"%PDF-"));
    }
    let stats = engine.style_cache().stats();
    assert_eq!(stats.len, 2);
    assert_eq!(stats.misses, 2);
}

#[test]
fn test_impossible_margins_surface_as_generation_error() {
    let generator =
        ReceiptGenerator::with_renderer(PdfEngine::new().with_font_store(FontStore::embedded()));
    let style = Style::default().with_margins(Margins::uniform(200.0));
    let err = generator
        .generate(&receipt_request(), Some(&style))
        .unwrap_err();

    assert!(!err.is_client_error());
    match &err {
        GenerationError::DocumentGeneration {
            document_id,
            record_number,
            source,
        } => {
            assert_eq!(*record_number, 42);
            assert_eq!(source.document_id, *document_id);
            assert!(std::error::Error::source(source).is_some());
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_embedded_fonts_render_every_family() {
    let engine = PdfEngine::new().with_font_store(FontStore::embedded());
    let generator = ContractGenerator::with_renderer(&engine);
    for style in [Style::default(), Style::professional()] {
        let generated = generator.generate(&contract_request(), Some(&style)).unwrap();
        let pdf = lopdf::Document::load_mem(&generated.content.unwrap()).unwrap();
        assert!(!pdf.get_pages().is_empty());
    }
    assert_eq!(engine.font_store().loaded_families(), 2);
}
