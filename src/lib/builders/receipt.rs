use super::{require_number, require_text, BuilderOptions, DocumentBuilder};
use crate::dates::format_spanish;
use crate::document::{Document, DocumentError, Section, SectionRole, Table};
use crate::dto::ReceiptRequest;
use crate::GenerationError;

const SIGNATURE_BLOCK: &str = "\n\n__________________________________\n\
Firma del responsable académico / Empresa\n\n\
Este comprobante es emitido electrónicamente y puede ser impreso para presentar en la empresa.";

/// Builds the receipt a student gets after applying to an internship position.
///
/// The receipt has four sections: the institution header, the title with the key facts table,
/// a narrative certifying the application, and a signature block.
#[derive(Debug, Clone, Default)]
pub struct ReceiptBuilder {
    options: BuilderOptions,
}

impl ReceiptBuilder {
    pub fn new(options: BuilderOptions) -> ReceiptBuilder {
        ReceiptBuilder { options }
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    fn title_section(&self, request: &ReceiptRequest) -> Result<Section, DocumentError> {
        let student = &request.student;
        let application = &request.application;
        let start = format_spanish(request.project.start_date.as_deref());
        let start = if start.is_empty() {
            "No especificada".to_string()
        } else {
            start
        };

        let rows = vec![
            vec!["Estudiante".into(), student.full_name()],
            vec!["DNI".into(), student.national_id.clone()],
            vec!["Carrera".into(), request.career.name.clone()],
            vec!["Empresa".into(), request.company.name.clone()],
            vec!["Puesto".into(), request.position.name.clone()],
            vec![
                "Proyecto".into(),
                format!("{} (inicio: {})", request.project.name, start),
            ],
            vec![
                "Materias aprobadas".into(),
                application.approved_subjects.to_string(),
            ],
            vec![
                "Materias en condición regular".into(),
                application.regular_subjects.to_string(),
            ],
        ];
        let table = Table::new(vec!["Campo".into(), "Información".into()], rows)?;

        Ok(Section::new(
            format!("COMPROBANTE DE POSTULACIÓN N° {}", application.number),
            format!(
                "Fecha de postulación: {}",
                format_spanish(Some(application.date.as_str()))
            ),
            SectionRole::MainTitle,
        )
        .with_table(table))
    }

    fn narrative(&self, request: &ReceiptRequest) -> Section {
        let application = &request.application;
        let mut text = format!(
            "Por medio del presente se certifica que **{}**, alumno/a de **{}** de la institución \
             **{}**, con DNI **{}**, se postuló para el proyecto **\"{}\"** ofrecido por **{}** \
             para el puesto de **{}**.",
            request.student.full_name(),
            request.career.name,
            request.institution.name,
            request.student.national_id,
            request.project.name,
            request.company.name,
            request.position.name,
        );

        let start = format_spanish(request.project.start_date.as_deref());
        if !start.is_empty() {
            text.push_str(&format!(
                " El proyecto tiene fecha de inicio estimada: **{}**.",
                start
            ));
        }

        text.push_str(&format!(
            "\n\nAl momento de la postulación, el/la estudiante registra **{} materias aprobadas** \
             y **{} materias en condición regular**. Esta postulación queda registrada bajo el \
             número **{}**",
            application.approved_subjects, application.regular_subjects, application.number,
        ));
        let applied_on = format_spanish(Some(application.date.as_str()));
        if applied_on.is_empty() {
            text.push('.');
        } else {
            text.push_str(&format!(" y fue realizada el **{}**.", applied_on));
        }

        Section::new("", text, SectionRole::BodyText)
    }
}

impl DocumentBuilder for ReceiptBuilder {
    type Request = ReceiptRequest;

    const DOCUMENT_TYPE: &'static str = "receipt";

    fn validate(&self, request: &ReceiptRequest) -> Result<(), GenerationError> {
        require_text("student", &request.student.first_name, "student name")?;
        require_number("application", request.application.number)?;
        require_text("institution", &request.institution.name, "institution name")
    }

    fn record_number(&self, request: &ReceiptRequest) -> i64 {
        request.application.number
    }

    fn assemble(&self, request: &ReceiptRequest) -> Result<Document, DocumentError> {
        let number = request.application.number;
        let mut document = self.options.base_document(
            format!("Comprobante de Postulación N° {}", number),
            Self::DOCUMENT_TYPE,
            number,
            &request.student.national_id,
            &request.institution.name,
        )?;

        document.add_section(Section::new(
            request.institution.name.clone(),
            "",
            SectionRole::MainTitle,
        ))?;
        document.add_section(self.title_section(request)?)?;
        document.add_section(self.narrative(request))?;
        document.add_section(Section::new("", SIGNATURE_BLOCK, SectionRole::FooterLine))?;
        Ok(document)
    }
}
