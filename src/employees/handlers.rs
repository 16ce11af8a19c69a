//! # Handlers HTTP del Roster
//! src/employees/handlers.rs
//!
//! Implementa los endpoints de empleados:
//! - `GET    /api/employees`     - Listar
//! - `POST   /api/employees`     - Crear (contratación)
//! - `PUT    /api/employees/:id` - Actualizar (merge parcial)
//! - `DELETE /api/employees/:id` - Eliminar
//!
//! Cada operación está separada en una función de dominio que retorna
//! `Result<_, ApiError>` y un handler que la convierte en `Response`.

use super::storage::{Mutation, RosterStore, StoreError};
use super::types::{Employee, EmployeeDraft, EmployeePatch, FieldIssue, ValidationError};
use crate::http::{Request, Response, StatusCode};
use crate::router::RouteParams;
use crate::state::AppState;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errores de las operaciones del roster, cada uno con su status HTTP
#[derive(Debug, Error)]
pub enum ApiError {
    /// El body no es JSON válido o tiene tipos incorrectos
    #[error("invalid JSON body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// Faltan campos requeridos o vienen vacíos
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Ningún empleado tiene ese ID
    #[error("employee not found: {0}")]
    NotFound(String),

    /// Falló la lectura o escritura del archivo
    #[error("{message}: {source}")]
    Storage {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Body de error: `{"message": ..., "error": ..., "fields": [...]}`
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(rename = "employeeId", skip_serializing_if = "Option::is_none")]
    employee_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldIssue]>,
}

impl ApiError {
    fn storage(message: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError::Storage { message, source }
    }

    /// Código HTTP asociado al error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) | ApiError::Validation(_) => StatusCode::BadRequest,
            ApiError::NotFound(_) => StatusCode::NotFound,
            ApiError::Storage { .. } => StatusCode::InternalServerError,
        }
    }

    /// Convierte el error en la respuesta JSON correspondiente
    pub fn to_response(&self) -> Response {
        let body = match self {
            ApiError::MalformedBody(e) => ErrorBody {
                message: "Invalid JSON body",
                error: Some(e.to_string()),
                employee_id: None,
                fields: None,
            },
            ApiError::Validation(validation) => ErrorBody {
                message: "Missing or empty required fields",
                error: None,
                employee_id: None,
                fields: Some(validation.fields.as_slice()),
            },
            ApiError::NotFound(id) => ErrorBody {
                message: "Employee not found",
                error: None,
                employee_id: Some(id.as_str()),
                fields: None,
            },
            ApiError::Storage { message, source } => ErrorBody {
                message: *message,
                error: Some(source.to_string()),
                employee_id: None,
                fields: None,
            },
        };

        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "roster operation failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "roster request rejected");
        }

        Response::json(status, &body)
    }
}

/// Confirmación de creación
#[derive(Debug, Serialize)]
struct Created<'a> {
    message: &'static str,
    #[serde(rename = "newEmployee")]
    new_employee: &'a Employee,
}

/// Confirmación de update/delete
#[derive(Debug, Serialize)]
struct Acknowledged<'a> {
    message: &'static str,
    #[serde(rename = "employeeId")]
    employee_id: &'a str,
}

// ==================== Operaciones de dominio ====================

/// Lista el roster completo, en orden de inserción
pub fn list_employees(store: &RosterStore) -> Result<Vec<Employee>, ApiError> {
    store
        .load()
        .map_err(ApiError::storage("Error reading employee data"))
}

/// Valida el body y agrega el empleado al final del roster
///
/// No se verifica que el ID sea único.
pub fn create_employee(store: &RosterStore, body: &[u8]) -> Result<Employee, ApiError> {
    let draft: EmployeeDraft = serde_json::from_slice(body)?;
    let employee = draft.validate()?;

    store
        .modify(|employees| {
            employees.push(employee.clone());
            Mutation::Commit(())
        })
        .map_err(ApiError::storage("Error adding employee"))?;

    Ok(employee)
}

/// Aplica el patch al primer empleado con ese ID
///
/// Un body vacío equivale a un patch vacío: el empleado debe existir, pero
/// el archivo no se reescribe.
pub fn update_employee(store: &RosterStore, id: &str, body: &[u8]) -> Result<(), ApiError> {
    let patch: EmployeePatch = if body.iter().all(|b| b.is_ascii_whitespace()) {
        EmployeePatch::default()
    } else {
        serde_json::from_slice(body)?
    };

    let found = store
        .modify(|employees| match employees.iter_mut().find(|e| e.employee_id == id) {
            Some(_) if patch.is_empty() => Mutation::Abort(true),
            Some(employee) => {
                employee.apply(&patch);
                Mutation::Commit(true)
            }
            None => Mutation::Abort(false),
        })
        .map_err(ApiError::storage("Error updating employee"))?;

    if found {
        Ok(())
    } else {
        Err(ApiError::NotFound(id.to_string()))
    }
}

/// Elimina todos los empleados con ese ID; retorna cuántos se eliminaron
pub fn delete_employee(store: &RosterStore, id: &str) -> Result<usize, ApiError> {
    let removed = store
        .modify(|employees| {
            let before = employees.len();
            employees.retain(|e| e.employee_id != id);
            match before - employees.len() {
                0 => Mutation::Abort(0),
                removed => Mutation::Commit(removed),
            }
        })
        .map_err(ApiError::storage("Error deleting employee"))?;

    if removed == 0 {
        Err(ApiError::NotFound(id.to_string()))
    } else {
        Ok(removed)
    }
}

// ==================== Handlers HTTP ====================

/// Handler para `GET /api/employees`
pub fn list_handler(_req: &Request, _params: &RouteParams, state: &AppState) -> Response {
    match list_employees(&state.store) {
        Ok(employees) => Response::json(StatusCode::Ok, &employees),
        Err(e) => e.to_response(),
    }
}

/// Handler para `POST /api/employees`
///
/// # Ejemplo de response
/// ```json
/// {"message": "Employee added", "newEmployee": {"EmployeeID": "E1", ...}}
/// ```
pub fn create_handler(req: &Request, _params: &RouteParams, state: &AppState) -> Response {
    match create_employee(&state.store, req.body()) {
        Ok(employee) => {
            info!(employee_id = %employee.employee_id, "employee added");
            Response::json(
                StatusCode::Created,
                &Created {
                    message: "Employee added",
                    new_employee: &employee,
                },
            )
        }
        Err(e) => e.to_response(),
    }
}

/// Handler para `PUT /api/employees/:id`
pub fn update_handler(req: &Request, params: &RouteParams, state: &AppState) -> Response {
    let id = match params.get("id") {
        Some(id) => id,
        None => return Response::error(StatusCode::BadRequest, "Missing path parameter: id"),
    };

    match update_employee(&state.store, id, req.body()) {
        Ok(()) => {
            info!(employee_id = %id, "employee updated");
            Response::json(
                StatusCode::Ok,
                &Acknowledged {
                    message: "Employee updated",
                    employee_id: id,
                },
            )
        }
        Err(e) => e.to_response(),
    }
}

/// Handler para `DELETE /api/employees/:id`
pub fn delete_handler(_req: &Request, params: &RouteParams, state: &AppState) -> Response {
    let id = match params.get("id") {
        Some(id) => id,
        None => return Response::error(StatusCode::BadRequest, "Missing path parameter: id"),
    };

    match delete_employee(&state.store, id) {
        Ok(removed) => {
            info!(employee_id = %id, removed, "employee deleted");
            Response::json(
                StatusCode::Ok,
                &Acknowledged {
                    message: "Employee deleted",
                    employee_id: id,
                },
            )
        }
        Err(e) => e.to_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employees::codec::HEADER;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;

    fn temp_state() -> (TempDir, AppState) {
        let dir = TempDir::new().unwrap();
        let state = AppState::open(dir.path().join("employees.csv")).unwrap();
        (dir, state)
    }

    fn seed(state: &AppState, rows: &[&str]) {
        let mut text = format!("{}\n", HEADER);
        text.push_str(&rows.join("\n"));
        fs::write(state.store.path(), text).unwrap();
    }

    fn request(method: &str, path: &str, body: &str) -> Request {
        let raw = format!(
            "{} {} HTTP/1.0\r\nContent-Length: {}\r\n\r\n{}",
            method,
            path,
            body.len(),
            body
        );
        Request::parse(raw.as_bytes()).unwrap()
    }

    fn params_with_id(id: &str) -> RouteParams {
        let mut params = RouteParams::default();
        params.insert("id", id);
        params
    }

    /// Un directorio en la ruta del temporal hace fallar la escritura
    fn block_temp_file(state: &AppState) {
        let mut temp = state.store.path().to_path_buf().into_os_string();
        temp.push(".tmp");
        fs::create_dir(&temp).unwrap();
    }

    fn body_json(response: &Response) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    const ANN: &str = r#"{"EmployeeID":"E1","FirstName":"Ann","LastName":"Lee","Title":"Eng","Email":"a@x.com","Status":"Active"}"#;

    // ==================== List ====================

    #[test]
    fn test_list_empty_roster() {
        let (_dir, state) = temp_state();

        let response = list_handler(&request("GET", "/api/employees", ""), &RouteParams::default(), &state);

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(body_json(&response), json!([]));
    }

    #[test]
    fn test_list_returns_records_in_order() {
        let (_dir, state) = temp_state();
        seed(&state, &["E2,Bob,Ray,Ops,b@x.com,Active", "E1,Ann,Lee,Eng,a@x.com,Active"]);

        let response = list_handler(&request("GET", "/api/employees", ""), &RouteParams::default(), &state);
        let body = body_json(&response);

        assert_eq!(body[0]["EmployeeID"], "E2");
        assert_eq!(body[1]["EmployeeID"], "E1");
    }

    #[test]
    fn test_list_read_failure_is_500() {
        let (_dir, state) = temp_state();
        fs::remove_file(state.store.path()).unwrap();

        let response = list_handler(&request("GET", "/api/employees", ""), &RouteParams::default(), &state);
        let body = body_json(&response);

        assert_eq!(response.status(), StatusCode::InternalServerError);
        assert_eq!(body["message"], "Error reading employee data");
        assert!(body["error"].as_str().unwrap().contains("failed to read"));
    }

    // ==================== Create ====================

    #[test]
    fn test_create_then_list() {
        let (_dir, state) = temp_state();

        let response = create_handler(&request("POST", "/api/employees", ANN), &RouteParams::default(), &state);
        assert_eq!(response.status(), StatusCode::Created);

        let body = body_json(&response);
        assert_eq!(body["message"], "Employee added");
        assert_eq!(body["newEmployee"], serde_json::from_str::<Value>(ANN).unwrap());

        let listed = list_employees(&state.store).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(serde_json::to_value(&listed[0]).unwrap(), serde_json::from_str::<Value>(ANN).unwrap());
    }

    #[test]
    fn test_create_allows_duplicate_ids() {
        let (_dir, state) = temp_state();

        create_employee(&state.store, ANN.as_bytes()).unwrap();
        create_employee(&state.store, ANN.as_bytes()).unwrap();

        assert_eq!(list_employees(&state.store).unwrap().len(), 2);
    }

    #[test]
    fn test_create_missing_field_is_400_and_file_unchanged() {
        let (_dir, state) = temp_state();
        let before = fs::read(state.store.path()).unwrap();

        let body = r#"{"EmployeeID":"E1","FirstName":"Ann","LastName":"Lee","Title":"Eng","Status":"Active"}"#;
        let response = create_handler(&request("POST", "/api/employees", body), &RouteParams::default(), &state);

        assert_eq!(response.status(), StatusCode::BadRequest);
        let json = body_json(&response);
        assert_eq!(json["message"], "Missing or empty required fields");
        assert_eq!(json["fields"][0]["field"], "Email");
        assert_eq!(json["fields"][0]["reason"], "missing");
        assert_eq!(fs::read(state.store.path()).unwrap(), before);
    }

    #[test]
    fn test_create_empty_field_is_400() {
        let (_dir, state) = temp_state();

        let body = ANN.replace(r#""Title":"Eng""#, r#""Title":"   ""#);
        let err = create_employee(&state.store, body.as_bytes()).unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.status(), StatusCode::BadRequest);
        assert!(list_employees(&state.store).unwrap().is_empty());
    }

    #[test]
    fn test_create_malformed_json_is_400() {
        let (_dir, state) = temp_state();

        for body in ["", "not json", "[1,2]", r#"{"EmployeeID": 1}"#] {
            let err = create_employee(&state.store, body.as_bytes()).unwrap_err();
            assert!(matches!(err, ApiError::MalformedBody(_)), "body {:?}", body);
        }
    }

    #[test]
    fn test_create_strips_commas_on_disk() {
        let (_dir, state) = temp_state();
        let body = ANN.replace(r#""Title":"Eng""#, r#""Title":"VP, Eng""#);

        let created = create_employee(&state.store, body.as_bytes()).unwrap();
        assert_eq!(created.title, "VP, Eng");

        let listed = list_employees(&state.store).unwrap();
        assert_eq!(listed[0].title, "VP Eng");
        assert_eq!(listed[0].email, "a@x.com");
    }

    // ==================== Update ====================

    #[test]
    fn test_update_merges_fields() {
        let (_dir, state) = temp_state();
        seed(&state, &["E1,Ann,Lee,Eng,a@x.com,Active", "E2,Bob,Ray,Ops,b@x.com,Active"]);

        let response = update_handler(
            &request("PUT", "/api/employees/E1", r#"{"Status":"Terminated"}"#),
            &params_with_id("E1"),
            &state,
        );

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(body_json(&response), json!({"message": "Employee updated", "employeeId": "E1"}));

        let listed = list_employees(&state.store).unwrap();
        assert_eq!(listed[0].status, "Terminated");
        assert_eq!(listed[0].first_name, "Ann");
        assert_eq!(listed[0].email, "a@x.com");
        assert_eq!(listed[1].employee_id, "E2");
        assert_eq!(listed[1].status, "Active");
    }

    #[test]
    fn test_update_only_first_match() {
        let (_dir, state) = temp_state();
        seed(&state, &["E1,Ann,Lee,Eng,a@x.com,Active", "E1,Dup,Lee,Eng,d@x.com,Active"]);

        update_employee(&state.store, "E1", br#"{"Status":"Leave"}"#).unwrap();

        let listed = list_employees(&state.store).unwrap();
        assert_eq!(listed[0].status, "Leave");
        assert_eq!(listed[1].status, "Active");
    }

    #[test]
    fn test_update_not_found_leaves_file_unchanged() {
        let (_dir, state) = temp_state();
        seed(&state, &["E1,Ann,Lee,Eng,a@x.com,Active"]);
        let before = fs::read(state.store.path()).unwrap();

        let response = update_handler(
            &request("PUT", "/api/employees/E404", r#"{"Status":"Terminated"}"#),
            &params_with_id("E404"),
            &state,
        );

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(body_json(&response)["message"], "Employee not found");
        assert_eq!(fs::read(state.store.path()).unwrap(), before);
    }

    #[test]
    fn test_update_empty_body_is_noop_merge() {
        let (_dir, state) = temp_state();
        seed(&state, &["E1,Ann,Lee,Eng,a@x.com,Active"]);

        update_employee(&state.store, "E1", b"").unwrap();
        assert_eq!(list_employees(&state.store).unwrap()[0].status, "Active");
    }

    #[test]
    fn test_update_malformed_body_is_400() {
        let (_dir, state) = temp_state();
        seed(&state, &["E1,Ann,Lee,Eng,a@x.com,Active"]);

        let err = update_employee(&state.store, "E1", b"{oops").unwrap_err();
        assert_eq!(err.status(), StatusCode::BadRequest);
    }

    // ==================== Delete ====================

    #[test]
    fn test_delete_removes_all_matches() {
        let (_dir, state) = temp_state();
        seed(
            &state,
            &[
                "E1,Ann,Lee,Eng,a@x.com,Active",
                "E2,Bob,Ray,Ops,b@x.com,Active",
                "E1,Dup,Lee,Eng,d@x.com,Active",
            ],
        );

        let response = delete_handler(&request("DELETE", "/api/employees/E1", ""), &params_with_id("E1"), &state);

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(body_json(&response), json!({"message": "Employee deleted", "employeeId": "E1"}));

        let listed = list_employees(&state.store).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].employee_id, "E2");
    }

    #[test]
    fn test_delete_not_found_leaves_file_unchanged() {
        let (_dir, state) = temp_state();
        seed(&state, &["E1,Ann,Lee,Eng,a@x.com,Active"]);
        let before = fs::read(state.store.path()).unwrap();

        let response = delete_handler(&request("DELETE", "/api/employees/E404", ""), &params_with_id("E404"), &state);

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(body_json(&response)["employeeId"], "E404");
        assert_eq!(fs::read(state.store.path()).unwrap(), before);
    }

    #[test]
    fn test_delete_write_failure_is_500() {
        let (_dir, state) = temp_state();
        seed(&state, &["E1,Ann,Lee,Eng,a@x.com,Active"]);
        block_temp_file(&state);

        let err = delete_employee(&state.store, "E1").unwrap_err();

        assert_eq!(err.status(), StatusCode::InternalServerError);
        assert!(err.to_string().starts_with("Error deleting employee"));
        // El archivo original sigue intacto
        assert_eq!(list_employees(&state.store).unwrap().len(), 1);
    }

    #[test]
    fn test_create_write_failure_is_500() {
        let (_dir, state) = temp_state();
        seed(&state, &["E2,Bob,Ray,Ops,b@x.com,Active"]);
        block_temp_file(&state);
        let before = fs::read(state.store.path()).unwrap();

        let response = create_handler(&request("POST", "/api/employees", ANN), &RouteParams::default(), &state);
        let body = body_json(&response);

        assert_eq!(response.status(), StatusCode::InternalServerError);
        assert_eq!(body["message"], "Error adding employee");
        assert!(body["error"].as_str().unwrap().contains(".tmp"));
        assert_eq!(fs::read(state.store.path()).unwrap(), before);
    }

    #[test]
    fn test_update_write_failure_is_500() {
        let (_dir, state) = temp_state();
        seed(&state, &["E1,Ann,Lee,Eng,a@x.com,Active"]);
        block_temp_file(&state);
        let before = fs::read(state.store.path()).unwrap();

        let response = update_handler(
            &request("PUT", "/api/employees/E1", r#"{"Status":"Terminated"}"#),
            &params_with_id("E1"),
            &state,
        );
        let body = body_json(&response);

        assert_eq!(response.status(), StatusCode::InternalServerError);
        assert_eq!(body["message"], "Error updating employee");
        assert!(body["error"].is_string());
        assert_eq!(fs::read(state.store.path()).unwrap(), before);
    }

    #[test]
    fn test_update_empty_patch_skips_write() {
        let (_dir, state) = temp_state();
        seed(&state, &["E1,Ann,Lee,Eng,a@x.com,Active"]);
        // Si se intentara escribir, el temporal bloqueado daría 500
        block_temp_file(&state);

        for body in ["", "{}", r#"{"Salary":"1"}"#] {
            assert!(update_employee(&state.store, "E1", body.as_bytes()).is_ok());
        }
        assert!(matches!(
            update_employee(&state.store, "E9", b"{}"),
            Err(ApiError::NotFound(id)) if id == "E9"
        ));
    }

    #[test]
    fn test_missing_id_param_is_400() {
        let (_dir, state) = temp_state();

        let response = delete_handler(&request("DELETE", "/api/employees", ""), &RouteParams::default(), &state);
        assert_eq!(response.status(), StatusCode::BadRequest);
    }
}
