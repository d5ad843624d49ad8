//! Business payloads consumed by the document builders.
//!
//! Field names are English; the Spanish keys of the upstream API (`estudiante`, `nombre`,
//! `fecha_inicio`, ...) are accepted as aliases so the same JSON can be fed unchanged:
//!
//! ```rust
//! use internship2pdf::dto::ReceiptRequest;
//!
//! let json = r#"{
//!     "estudiante": { "nombre": "Ana", "apellido": "Gómez", "dni": "12345678" },
//!     "universidad": { "nombre": "Universidad X" },
//!     "postulacion": { "numero": 42, "fecha": "2024-02-20T14:30:00Z" }
//! }"#;
//! let request: ReceiptRequest = serde_json::from_str(json).unwrap();
//! assert_eq!(request.student.full_name(), "Ana Gómez");
//! assert_eq!(request.application.number, 42);
//! ```
//!
//! Every nested object and every identifying field has a default, so an incomplete payload
//! still deserializes and is rejected by the builder with the name of the missing part.

use serde::{Deserialize, Serialize};

fn default_id_type() -> String {
    "DNI".to_string()
}

fn default_application_status() -> String {
    "Pendiente".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    #[serde(default, alias = "nombre")]
    pub first_name: String,
    #[serde(default, alias = "apellido")]
    pub last_name: String,
    #[serde(default, alias = "dni")]
    pub national_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cuil: Option<String>,
    #[serde(default, alias = "fecha_nacimiento")]
    pub birth_date: Option<String>,
    #[serde(default = "default_id_type", alias = "tipo_dni")]
    pub id_type: String,
}

impl Default for Student {
    fn default() -> Self {
        Student {
            first_name: String::new(),
            last_name: String::new(),
            national_id: String::new(),
            email: None,
            cuil: None,
            birth_date: None,
            id_type: default_id_type(),
        }
    }
}

impl Student {
    /// First and last name joined by a space, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// The university issuing the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Institution {
    #[serde(default, alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "direccion")]
    pub address: Option<String>,
    #[serde(default, alias = "codigo_postal")]
    pub postal_code: Option<u32>,
    #[serde(default, alias = "correo")]
    pub email: Option<String>,
    #[serde(default, alias = "telefono")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Career {
    #[serde(default, alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "codigo")]
    pub code: Option<String>,
    #[serde(default, alias = "descripcion")]
    pub description: Option<String>,
    #[serde(default, alias = "plan_estudios")]
    pub study_plan: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Company {
    #[serde(default, alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "direccion")]
    pub address: Option<String>,
    #[serde(default, alias = "codigo_postal")]
    pub postal_code: Option<u32>,
    #[serde(default, alias = "correo")]
    pub email: Option<String>,
    #[serde(default, alias = "telefono")]
    pub phone: Option<String>,
    #[serde(default, alias = "codigo")]
    pub code: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Project {
    #[serde(default, alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "fecha_inicio")]
    pub start_date: Option<String>,
    #[serde(default, alias = "fecha_fin")]
    pub end_date: Option<String>,
    #[serde(default, alias = "descripcion")]
    pub description: Option<String>,
    #[serde(default, alias = "numero")]
    pub number: Option<i64>,
    #[serde(default, alias = "estado")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    #[serde(default, alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "descripcion")]
    pub description: Option<String>,
    #[serde(default, alias = "codigo")]
    pub code: Option<i64>,
    /// Weekly hours.
    #[serde(default, alias = "horas_dedicadas")]
    pub weekly_hours: f64,
}

/// A student's application to a position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Application {
    /// Record number; `0` means missing.
    #[serde(default, alias = "numero")]
    pub number: i64,
    #[serde(default, alias = "fecha")]
    pub date: String,
    #[serde(default, alias = "cantidad_materias_aprobadas")]
    pub approved_subjects: u32,
    #[serde(default, alias = "cantidad_materias_regulares")]
    pub regular_subjects: u32,
    #[serde(default = "default_application_status", alias = "estado")]
    pub status: String,
}

impl Default for Application {
    fn default() -> Self {
        Application {
            number: 0,
            date: String::new(),
            approved_subjects: 0,
            regular_subjects: 0,
            status: default_application_status(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Contract {
    /// Record number; `0` means missing.
    #[serde(default, alias = "numero")]
    pub number: i64,
    #[serde(default, alias = "fecha_inicio")]
    pub start_date: String,
    #[serde(default, alias = "fecha_fin")]
    pub end_date: String,
    #[serde(default, alias = "fecha_emision")]
    pub issue_date: String,
    #[serde(default, alias = "estado")]
    pub status: Option<String>,
}

/// Everything needed to produce an application receipt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReceiptRequest {
    #[serde(default, alias = "estudiante")]
    pub student: Student,
    #[serde(default, alias = "universidad")]
    pub institution: Institution,
    #[serde(default, alias = "carrera")]
    pub career: Career,
    #[serde(default, alias = "empresa")]
    pub company: Company,
    #[serde(default, alias = "proyecto")]
    pub project: Project,
    #[serde(default, alias = "puesto")]
    pub position: Position,
    #[serde(default, alias = "postulacion")]
    pub application: Application,
}

/// Everything needed to produce an internship contract.
///
/// The application is part of the payload: the contract quotes its number and status.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContractRequest {
    #[serde(default, alias = "estudiante")]
    pub student: Student,
    #[serde(default, alias = "universidad")]
    pub institution: Institution,
    #[serde(default, alias = "carrera")]
    pub career: Career,
    #[serde(default, alias = "empresa")]
    pub company: Company,
    #[serde(default, alias = "proyecto")]
    pub project: Project,
    #[serde(default, alias = "puesto")]
    pub position: Position,
    #[serde(default, alias = "postulacion")]
    pub application: Application,
    #[serde(default, alias = "contrato")]
    pub contract: Contract,
}
