//! # Codec CSV del Roster
//! src/employees/codec.rs
//!
//! Convierte entre el archivo de texto delimitado por comas y `Vec<Employee>`.
//!
//! ## Formato en disco
//!
//! ```text
//! EmployeeID,FirstName,LastName,Title,Email,Status\n
//! E1,Ann,Lee,Eng,a@x.com,Active\n
//! E2,Bob,Ray,Ops,b@x.com,Terminated
//! ```
//!
//! No hay comillas ni escapes: al escribir se eliminan las comas y saltos
//! de línea que traigan los valores. Por eso un valor con coma embebida no
//! sobrevive el round-trip (pierde la coma).

use super::types::{Employee, Field};
use thiserror::Error;

/// Separador de columnas
pub const DELIMITER: char = ',';

/// Header fijo, primera línea del archivo
pub const HEADER: &str = "EmployeeID,FirstName,LastName,Title,Email,Status";

/// Errores al decodificar el contenido del archivo
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// El archivo no es UTF-8 válido
    #[error("roster is not valid UTF-8 (first invalid byte at offset {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },
}

/// Decodifica el contenido completo del archivo
///
/// Las columnas se asignan por nombre según el header del archivo, no por
/// posición. Columnas desconocidas se ignoran, columnas o celdas faltantes
/// quedan como string vacío y las líneas en blanco se saltan.
///
/// # Ejemplo
/// ```
/// use hr_server::employees::codec;
///
/// let text = b"EmployeeID,FirstName,LastName,Title,Email,Status\nE1,Ann,Lee,Eng,a@x.com,Active";
/// let employees = codec::decode(text).unwrap();
/// assert_eq!(employees.len(), 1);
/// assert_eq!(employees[0].email, "a@x.com");
/// ```
pub fn decode(input: &[u8]) -> Result<Vec<Employee>, DecodeError> {
    let text = std::str::from_utf8(input).map_err(|e| DecodeError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    // `lines()` acepta tanto \n como \r\n
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header = match lines.next() {
        Some(header) => header,
        None => return Ok(Vec::new()),
    };

    let columns: Vec<Option<Field>> = header
        .split(DELIMITER)
        .map(|name| Field::from_column(name.trim()))
        .collect();

    let employees = lines
        .map(|line| {
            let mut employee = Employee::default();
            for (column, value) in columns.iter().zip(line.split(DELIMITER)) {
                if let Some(field) = column {
                    employee.set(*field, value.to_string());
                }
            }
            employee
        })
        .collect();

    Ok(employees)
}

/// Codifica el roster completo: header + una línea por empleado
///
/// No agrega salto de línea al final del último registro. Un roster vacío
/// se codifica como el header seguido de `\n`.
pub fn encode(employees: &[Employee]) -> String {
    let rows: Vec<String> = employees.iter().map(encode_row).collect();
    format!("{}\n{}", HEADER, rows.join("\n"))
}

/// Codifica un empleado en una línea, en orden de esquema
fn encode_row(employee: &Employee) -> String {
    Field::ALL
        .iter()
        .map(|field| sanitize(employee.get(*field)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Elimina los caracteres que romperían el formato (separador y saltos de línea)
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != DELIMITER && *c != '\r' && *c != '\n')
        .collect()
}
