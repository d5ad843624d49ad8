use super::{
    format_hours, or_unspecified, require_number, require_text, BuilderOptions, DocumentBuilder,
};
use crate::dates::format_spanish;
use crate::document::{Document, DocumentError, Section, SectionRole, Table};
use crate::dto::ContractRequest;
use crate::GenerationError;

const SIGNATURE_RULE: &str = "__________________________________";

/// Builds the internship contract signed by the company and the student.
///
/// Layout: institution header, contract title, key facts table, the five clauses in their fixed
/// order, and the signature block.
#[derive(Debug, Clone, Default)]
pub struct ContractBuilder {
    options: BuilderOptions,
}

fn unspecified_date(value: Option<&str>) -> String {
    let formatted = format_spanish(value);
    if formatted.is_empty() {
        "No especificada".to_string()
    } else {
        formatted
    }
}

fn clause(label: &str, body: String) -> Section {
    Section::new("", format!("**{}**\n\n{}", label, body), SectionRole::BodyText)
}

impl ContractBuilder {
    pub fn new(options: BuilderOptions) -> ContractBuilder {
        ContractBuilder { options }
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    fn header(&self, request: &ContractRequest) -> Section {
        let email = request.institution.email.clone().unwrap_or_default();
        Section::new(
            request.institution.name.clone(),
            email,
            SectionRole::MainTitle,
        )
    }

    fn title(&self, request: &ContractRequest) -> Section {
        let issued = format_spanish(Some(request.contract.issue_date.as_str()));
        Section::new(
            "CONTRATO DE PASANTÍA",
            format!(
                "Nº: **{}**\n\nPostulación Nº: **{}**\n\nFecha de emisión: **{}**",
                request.contract.number, request.application.number, issued
            ),
            SectionRole::MainTitle,
        )
    }

    fn key_facts(&self, request: &ContractRequest) -> Result<Section, DocumentError> {
        let student = &request.student;
        let company = &request.company;
        let application = &request.application;
        let row = |label: &str, value: String| vec![label.to_string(), value];

        let rows = vec![
            row("Estudiante:", student.full_name()),
            row(
                "DNI / Email:",
                format!(
                    "{} / {}",
                    student.national_id,
                    or_unspecified(student.email.as_deref())
                ),
            ),
            row(
                "Carrera:",
                format!(
                    "{} ({})",
                    request.career.name,
                    or_unspecified(request.career.study_plan.as_deref())
                ),
            ),
            row("Empresa:", company.name.clone()),
            row(
                "Dirección / Tel:",
                format!(
                    "{} / {}",
                    or_unspecified(company.address.as_deref()),
                    or_unspecified(company.phone.as_deref())
                ),
            ),
            row("Proyecto:", request.project.name.clone()),
            row(
                "Periodo del proyecto:",
                format!(
                    "{} — {}",
                    unspecified_date(request.project.start_date.as_deref()),
                    unspecified_date(request.project.end_date.as_deref())
                ),
            ),
            row(
                "Puesto / Horas sem.:",
                format!(
                    "{} / {} hs sem.",
                    request.position.name,
                    format_hours(request.position.weekly_hours)
                ),
            ),
            row(
                "Materias aprobadas / regulares:",
                format!(
                    "{} / {}",
                    application.approved_subjects, application.regular_subjects
                ),
            ),
            row("Estado de la postulación:", application.status.clone()),
        ];
        let table = Table::new(vec!["Campo".into(), "Información".into()], rows)?;
        Ok(Section::new("", "", SectionRole::SubHeading).with_table(table))
    }

    fn clauses(&self, request: &ContractRequest) -> Vec<Section> {
        let company = &request.company;
        let address = or_unspecified(company.address.as_deref());
        let hours = format_hours(request.position.weekly_hours);

        vec![
            clause(
                "PRIMERA: ANTECEDENTES. -",
                format!(
                    "Comparecen a la suscripción del presente Contrato, por una parte la Empresa \
                     **{}**, con domicilio en **{}**, representada para estos actos por su \
                     representante legal, y por otra parte, el/la estudiante **{}**, DNI **{}**, \
                     alumno/a de la carrera **{}**, quien se presenta voluntariamente para \
                     realizar las prácticas previstas en el presente contrato.",
                    company.name,
                    address,
                    request.student.full_name(),
                    request.student.national_id,
                    request.career.name,
                ),
            ),
            clause(
                "SEGUNDA: OBJETO. -",
                format!(
                    "El objeto del presente contrato es que el/la estudiante realice prácticas \
                     profesionales en el proyecto denominado **\"{}\"** con funciones de **{}**, \
                     bajo la supervisión y dirección de la Empresa. Las tareas estarán \
                     relacionadas con la formación académica del/la estudiante y con las \
                     necesidades del proyecto.",
                    request.project.name, request.position.name,
                ),
            ),
            clause(
                "TERCERA: LUGAR DE PRÁCTICAS Y HORARIO. -",
                format!(
                    "Las prácticas se desarrollarán en las oficinas de la Empresa ubicadas en \
                     **{}** y/o en modalidad remota según lo acuerden las partes. El/la \
                     estudiante dedicará aproximadamente **{} horas semanales**, en jornadas \
                     compatibles con sus obligaciones académicas.",
                    address, hours,
                ),
            ),
            clause(
                "CUARTA: PENSIÓN / REMUNERACIÓN. -",
                "Las partes acuerdan que la pasantía será no remunerada. En caso de \
                 corresponder, la determinación y forma de pago se registrará en anexo aparte. \
                 El/la estudiante conservará los derechos y beneficios de orden legal que \
                 correspondan."
                    .to_string(),
            ),
            clause(
                "QUINTA: DURACIÓN. -",
                format!(
                    "El presente contrato tendrá vigencia desde **{}** hasta **{}**, sin \
                     perjuicio de su prórroga por acuerdo expreso de las partes.",
                    format_spanish(Some(request.contract.start_date.as_str())),
                    format_spanish(Some(request.contract.end_date.as_str())),
                ),
            ),
        ]
    }

    fn signatures(&self, request: &ContractRequest) -> Section {
        let mut text = format!(
            "\n\n{rule}\nFirma y sello - {}\n\n{rule}\nFirma del/de la estudiante: {}",
            request.company.name,
            request.student.full_name(),
            rule = SIGNATURE_RULE,
        );
        if let Some(email) = request
            .institution
            .email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
        {
            text.push_str(&format!("\n\nContacto prácticas: {}", email));
        }
        Section::new("", text, SectionRole::FooterLine)
    }
}

impl DocumentBuilder for ContractBuilder {
    type Request = ContractRequest;

    const DOCUMENT_TYPE: &'static str = "contract";

    fn validate(&self, request: &ContractRequest) -> Result<(), GenerationError> {
        require_text("student", &request.student.first_name, "student name")?;
        require_number("contract", request.contract.number)?;
        require_text("institution", &request.institution.name, "institution name")
    }

    fn record_number(&self, request: &ContractRequest) -> i64 {
        request.contract.number
    }

    fn assemble(&self, request: &ContractRequest) -> Result<Document, DocumentError> {
        let number = request.contract.number;
        let mut document = self.options.base_document(
            format!("Contrato de Pasantía N° {}", number),
            Self::DOCUMENT_TYPE,
            number,
            &request.student.national_id,
            &request.institution.name,
        )?;

        document.add_section(self.header(request))?;
        document.add_section(self.title(request))?;
        document.add_section(self.key_facts(request)?)?;
        for section in self.clauses(request) {
            document.add_section(section)?;
        }
        document.add_section(self.signatures(request))?;
        Ok(document)
    }
}
