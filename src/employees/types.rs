//! # Tipos del Roster de Empleados
//! src/employees/types.rs
//!
//! Define el registro `Employee` (esquema fijo de 6 columnas), los payloads
//! de entrada (`EmployeeDraft` para crear, `EmployeePatch` para actualizar)
//! y la validación de campos requeridos.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Columnas del esquema, en el orden en que se escriben al CSV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    #[serde(rename = "EmployeeID")]
    EmployeeId,
    FirstName,
    LastName,
    Title,
    Email,
    Status,
}

impl Field {
    /// Todas las columnas en orden de esquema
    pub const ALL: [Field; 6] = [
        Field::EmployeeId,
        Field::FirstName,
        Field::LastName,
        Field::Title,
        Field::Email,
        Field::Status,
    ];

    /// Nombre de la columna tal como aparece en el header y en JSON
    pub fn column(&self) -> &'static str {
        match self {
            Field::EmployeeId => "EmployeeID",
            Field::FirstName => "FirstName",
            Field::LastName => "LastName",
            Field::Title => "Title",
            Field::Email => "Email",
            Field::Status => "Status",
        }
    }

    /// Busca la columna por su nombre exacto
    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column() == name)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Un empleado del roster
///
/// `EmployeeID` es la llave usada por update/delete, pero no se fuerza
/// unicidad: pueden existir varios registros con el mismo ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "EmployeeID")]
    pub employee_id: String,

    #[serde(rename = "FirstName")]
    pub first_name: String,

    #[serde(rename = "LastName")]
    pub last_name: String,

    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Email")]
    pub email: String,

    #[serde(rename = "Status")]
    pub status: String,
}

impl Employee {
    /// Obtiene el valor de una columna
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::EmployeeId => &self.employee_id,
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Title => &self.title,
            Field::Email => &self.email,
            Field::Status => &self.status,
        }
    }

    /// Reemplaza el valor de una columna
    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::EmployeeId => &mut self.employee_id,
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Title => &mut self.title,
            Field::Email => &mut self.email,
            Field::Status => &mut self.status,
        };
        *slot = value;
    }

    /// Merge superficial: cada campo presente en el patch sobrescribe el actual.
    ///
    /// Incluye `EmployeeID`, así que un patch puede renombrar al empleado.
    pub fn apply(&mut self, patch: &EmployeePatch) {
        for field in Field::ALL {
            if let Some(value) = patch.get(field) {
                self.set(field, value.to_string());
            }
        }
    }
}

/// Payload de creación antes de validar
///
/// Todos los campos son opcionales para poder reportar cuáles faltan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EmployeeDraft {
    #[serde(rename = "EmployeeID")]
    pub employee_id: Option<String>,

    #[serde(rename = "FirstName")]
    pub first_name: Option<String>,

    #[serde(rename = "LastName")]
    pub last_name: Option<String>,

    #[serde(rename = "Title")]
    pub title: Option<String>,

    #[serde(rename = "Email")]
    pub email: Option<String>,

    #[serde(rename = "Status")]
    pub status: Option<String>,
}

impl EmployeeDraft {
    fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::EmployeeId => &self.employee_id,
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Title => &self.title,
            Field::Email => &self.email,
            Field::Status => &self.status,
        };
        value.as_deref()
    }

    /// Valida que los 6 campos existan y no estén vacíos (tras `trim`)
    ///
    /// Los valores se conservan tal como llegaron; el trim solo se usa
    /// para decidir si el campo está vacío.
    ///
    /// # Ejemplo
    /// ```
    /// use hr_server::employees::EmployeeDraft;
    ///
    /// let draft = EmployeeDraft {
    ///     employee_id: Some("E1".to_string()),
    ///     ..Default::default()
    /// };
    /// let err = draft.validate().unwrap_err();
    /// assert_eq!(err.fields.len(), 5);
    /// ```
    pub fn validate(self) -> Result<Employee, ValidationError> {
        let issues: Vec<FieldIssue> = Field::ALL
            .into_iter()
            .filter_map(|field| match self.get(field) {
                None => Some(FieldIssue { field, reason: IssueReason::Missing }),
                Some(value) if value.trim().is_empty() => {
                    Some(FieldIssue { field, reason: IssueReason::Empty })
                }
                Some(_) => None,
            })
            .collect();

        if !issues.is_empty() {
            return Err(ValidationError { fields: issues });
        }

        Ok(Employee {
            employee_id: self.employee_id.unwrap_or_default(),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
        })
    }
}

/// Payload parcial de actualización
///
/// Llaves desconocidas se ignoran; `null` equivale a no enviar el campo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EmployeePatch {
    #[serde(rename = "EmployeeID")]
    pub employee_id: Option<String>,

    #[serde(rename = "FirstName")]
    pub first_name: Option<String>,

    #[serde(rename = "LastName")]
    pub last_name: Option<String>,

    #[serde(rename = "Title")]
    pub title: Option<String>,

    #[serde(rename = "Email")]
    pub email: Option<String>,

    #[serde(rename = "Status")]
    pub status: Option<String>,
}

impl EmployeePatch {
    /// Valor enviado para una columna, si existe
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::EmployeeId => &self.employee_id,
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Title => &self.title,
            Field::Email => &self.email,
            Field::Status => &self.status,
        };
        value.as_deref()
    }

    /// True si el patch no trae ningún campo
    pub fn is_empty(&self) -> bool {
        Field::ALL.into_iter().all(|field| self.get(field).is_none())
    }
}

/// Motivo por el que un campo no pasó la validación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueReason {
    Missing,
    Empty,
}

/// Un campo inválido dentro de un `ValidationError`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: Field,
    pub reason: IssueReason,
}

/// Error de validación con el detalle por campo
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("missing or empty required fields: {}", describe_issues(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldIssue>,
}

fn describe_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.field.column())
        .collect::<Vec<_>>()
        .join(", ")
}
