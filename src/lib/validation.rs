//! Inbound payload checks run before a request reaches the builders.
//!
//! The builders only verify what they cannot work without (student name, record number,
//! institution name). The checks here enforce the full schema of an incoming payload: string
//! lengths, numeric ranges, date parseability and a few formats. They never fail fast; every
//! problem found is reported so a caller can show them all at once.

use crate::dates::{parse_iso, IsoValue};
use crate::dto::{
    Application, Career, Company, Contract, ContractRequest, Institution, Position, Project,
    ReceiptRequest, Student,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static CUIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}-\d{7,8}-\d$").expect("CUIL pattern is a valid regex"));

/// One schema violation, keyed by a dotted field path such as `student.national_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Default)]
struct Checker {
    issues: Vec<ValidationIssue>,
}

impl Checker {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.trim().chars().count();
        if len < min {
            if min == 1 {
                self.push(field, "is required");
            } else {
                self.push(field, format!("must have at least {} characters", min));
            }
        } else if len > max {
            self.push(field, format!("must have at most {} characters", max));
        }
    }

    fn optional_length(&mut self, field: &str, value: Option<&str>, min: usize, max: usize) {
        if let Some(value) = value {
            self.length(field, value, min, max);
        }
    }

    fn email(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value {
            if !value.contains('@') || !value.contains('.') {
                self.push(field, "is not a valid e-mail address");
            }
        }
    }

    fn postal_code(&mut self, field: &str, value: Option<u32>) {
        if let Some(code) = value {
            if !(1000..=9999).contains(&code) {
                self.push(field, "must be between 1000 and 9999");
            }
        }
    }

    fn positive(&mut self, field: &str, value: i64) {
        if value < 1 {
            self.push(field, "must be greater than or equal to 1");
        }
    }

    fn date(&mut self, field: &str, value: &str) -> Option<IsoValue> {
        if value.trim().is_empty() {
            self.push(field, "is required");
            return None;
        }
        let parsed = parse_iso(value);
        if parsed.is_none() {
            self.push(field, format!("'{}' is not an ISO-8601 date", value));
        }
        parsed
    }

    fn optional_date(&mut self, field: &str, value: Option<&str>) -> Option<IsoValue> {
        value.and_then(|v| self.date(field, v))
    }
}

fn check_student(c: &mut Checker, student: &Student) {
    c.length("student.first_name", &student.first_name, 1, 100);
    c.length("student.last_name", &student.last_name, 1, 100);
    c.length("student.national_id", &student.national_id, 7, 10);
    c.length("student.id_type", &student.id_type, 0, 20);
    c.email("student.email", student.email.as_deref());
    if let Some(cuil) = student.cuil.as_deref() {
        if !CUIL_PATTERN.is_match(cuil) {
            c.push("student.cuil", "must follow the XX-XXXXXXXX-X format");
        }
    }
    if let Some(birth) = c.optional_date("student.birth_date", student.birth_date.as_deref()) {
        if birth.date() > Utc::now().date_naive() {
            c.push("student.birth_date", "cannot be in the future");
        }
    }
}

fn check_institution(c: &mut Checker, institution: &Institution) {
    c.length("institution.name", &institution.name, 1, 200);
    c.optional_length("institution.address", institution.address.as_deref(), 1, 300);
    c.postal_code("institution.postal_code", institution.postal_code);
    c.email("institution.email", institution.email.as_deref());
    c.optional_length("institution.phone", institution.phone.as_deref(), 0, 14);
}

fn check_career(c: &mut Checker, career: &Career) {
    c.length("career.name", &career.name, 1, 200);
    c.optional_length("career.code", career.code.as_deref(), 1, 50);
    c.optional_length("career.description", career.description.as_deref(), 0, 100);
    c.optional_length("career.study_plan", career.study_plan.as_deref(), 0, 100);
}

fn check_company(c: &mut Checker, company: &Company) {
    c.length("company.name", &company.name, 1, 200);
    c.optional_length("company.address", company.address.as_deref(), 1, 300);
    c.postal_code("company.postal_code", company.postal_code);
    c.email("company.email", company.email.as_deref());
    c.optional_length("company.phone", company.phone.as_deref(), 0, 50);
    if let Some(code) = company.code {
        c.positive("company.code", code);
    }
}

fn check_project(c: &mut Checker, project: &Project) {
    c.length("project.name", &project.name, 1, 200);
    c.optional_date("project.start_date", project.start_date.as_deref());
    c.optional_date("project.end_date", project.end_date.as_deref());
    c.optional_length("project.description", project.description.as_deref(), 1, 1000);
    c.optional_length("project.status", project.status.as_deref(), 0, 50);
    if let Some(number) = project.number {
        c.positive("project.number", number);
    }
}

fn check_position(c: &mut Checker, position: &Position) {
    c.length("position.name", &position.name, 1, 200);
    c.optional_length("position.description", position.description.as_deref(), 1, 1000);
    if !(0.0..=168.0).contains(&position.weekly_hours) {
        c.push("position.weekly_hours", "must be between 0 and 168");
    }
    if let Some(code) = position.code {
        c.positive("position.code", code);
    }
}

fn check_application(c: &mut Checker, application: &Application) {
    c.positive("application.number", application.number);
    c.date("application.date", &application.date);
    c.length("application.status", &application.status, 1, 50);
}

fn check_contract(c: &mut Checker, contract: &Contract) {
    c.positive("contract.number", contract.number);
    c.date("contract.start_date", &contract.start_date);
    c.date("contract.end_date", &contract.end_date);
    c.date("contract.issue_date", &contract.issue_date);
}

/// Checks a receipt payload. An empty result means the payload is valid.
pub fn validate_receipt(request: &ReceiptRequest) -> Vec<ValidationIssue> {
    let mut c = Checker::default();
    check_student(&mut c, &request.student);
    check_institution(&mut c, &request.institution);
    check_career(&mut c, &request.career);
    check_company(&mut c, &request.company);
    check_project(&mut c, &request.project);
    check_position(&mut c, &request.position);
    check_application(&mut c, &request.application);
    c.issues
}

/// Checks a contract payload. An empty result means the payload is valid.
pub fn validate_contract(request: &ContractRequest) -> Vec<ValidationIssue> {
    let mut c = Checker::default();
    check_student(&mut c, &request.student);
    check_institution(&mut c, &request.institution);
    check_career(&mut c, &request.career);
    check_company(&mut c, &request.company);
    check_project(&mut c, &request.project);
    check_position(&mut c, &request.position);
    check_application(&mut c, &request.application);
    check_contract(&mut c, &request.contract);
    c.issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_receipt() -> ReceiptRequest {
        ReceiptRequest {
            student: Student {
                first_name: "Juan".into(),
                last_name: "Pérez".into(),
                national_id: "12345678".into(),
                email: Some("juan.perez@example.com".into()),
                cuil: Some("20-12345678-9".into()),
                birth_date: Some("2000-05-15".into()),
                ..Student::default()
            },
            institution: Institution {
                name: "Universidad Nacional de Córdoba".into(),
                postal_code: Some(5000),
                ..Institution::default()
            },
            career: Career {
                name: "Ingeniería en Sistemas".into(),
                ..Career::default()
            },
            company: Company {
                name: "TechCorp SA".into(),
                ..Company::default()
            },
            project: Project {
                name: "Sistema de Gestión".into(),
                start_date: Some("2026-02-01".into()),
                ..Project::default()
            },
            position: Position {
                name: "Desarrollador Backend".into(),
                weekly_hours: 20.0,
                ..Position::default()
            },
            application: Application {
                number: 5432,
                date: "2026-01-05T10:30:00".into(),
                ..Application::default()
            },
        }
    }

    fn fields(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.field.as_str()).collect()
    }

    #[test]
    fn test_valid_receipt_has_no_issues() {
        assert!(validate_receipt(&valid_receipt()).is_empty());
    }

    #[test]
    fn test_reports_every_problem() {
        let mut request = valid_receipt();
        request.student.national_id = "123".into();
        request.student.cuil = Some("20123456789".into());
        request.student.email = Some("not-an-email".into());
        request.institution.postal_code = Some(99);
        request.position.weekly_hours = 200.0;
        request.application.number = 0;
        request.application.date = "yesterday".into();

        let issues = validate_receipt(&request);
        assert_eq!(
            fields(&issues),
            vec![
                "student.national_id",
                "student.email",
                "student.cuil",
                "institution.postal_code",
                "position.weekly_hours",
                "application.number",
                "application.date",
            ]
        );
    }

    #[test]
    fn test_birth_date_in_future() {
        let mut request = valid_receipt();
        request.student.birth_date = Some("2999-01-01".into());
        let issues = validate_receipt(&request);
        assert_eq!(fields(&issues), vec!["student.birth_date"]);
        assert_eq!(issues[0].to_string(), "student.birth_date: cannot be in the future");
    }

    #[test]
    fn test_optional_institution_fields() {
        let mut request = valid_receipt();
        request.institution.postal_code = None;
        request.institution.phone = None;
        request.institution.email = None;
        assert!(validate_receipt(&request).is_empty());
    }

    #[test]
    fn test_contract_dates_required() {
        let base = valid_receipt();
        let request = ContractRequest {
            student: base.student,
            institution: base.institution,
            career: base.career,
            company: base.company,
            project: base.project,
            position: base.position,
            application: base.application,
            contract: Contract {
                number: 1,
                start_date: "2026-02-01".into(),
                end_date: "".into(),
                issue_date: "31/01/2026".into(),
                status: None,
            },
        };
        let issues = validate_contract(&request);
        assert_eq!(
            fields(&issues),
            vec!["contract.end_date", "contract.issue_date"]
        );
    }
}
