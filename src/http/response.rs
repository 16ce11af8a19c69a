//! # Construcción de Respuestas HTTP
//!
//! API para construir respuestas HTTP/1.0 y convertirlas a bytes.
//!
//! ## Formato de una respuesta HTTP/1.0
//!
//! ```text
//! HTTP/1.0 201 Created\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 42\r\n
//! \r\n
//! {"message":"Employee added","newEmployee":{...}}
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use hr_server::http::{Response, StatusCode};
//!
//! let response = Response::json(StatusCode::Ok, &vec!["E1", "E2"]);
//! assert_eq!(response.body(), br#"["E1","E2"]"#);
//! ```

use super::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;

/// Representa una respuesta HTTP/1.0 completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP
    status: StatusCode,

    /// Headers HTTP (ordenados para que la salida sea estable)
    headers: BTreeMap<String, String>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header (si ya existe, se sobrescribe)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el cuerpo y actualiza `Content-Length`
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.headers
            .insert("Content-Length".to_string(), body.len().to_string());
        self.body = body;
        self
    }

    /// Serializa `value` como JSON con el status indicado
    ///
    /// Si la serialización falla (no debería con nuestros tipos) se responde 500.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::new(status)
                .with_header("Content-Type", "application/json")
                .with_body_bytes(body),
            Err(e) => Self::error(
                StatusCode::InternalServerError,
                &format!("Failed to serialize response: {}", e),
            ),
        }
    }

    /// Respuesta de error con formato `{"error": "mensaje"}`
    ///
    /// # Ejemplo
    /// ```
    /// use hr_server::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::NotFound, "Route not found: /x");
    /// assert_eq!(response.body(), br#"{"error":"Route not found: /x"}"#);
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body_bytes(body.into_bytes())
    }

    /// Quita el body pero conserva `Content-Length` (respuestas a HEAD)
    pub fn strip_body(&mut self) {
        self.body.clear();
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.0 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    /// - Body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        result.extend_from_slice(format!("HTTP/1.0 {}\r\n", self.status).as_bytes());

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene un header por nombre exacto
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_new_response() {
        let response = Response::new(StatusCode::Ok);
        assert_eq!(response.status(), StatusCode::Ok);
        assert!(response.body().is_empty());
        assert_eq!(response.header("Content-Length"), None);
    }

    #[test]
    fn test_with_header_overwrites() {
        let response = Response::new(StatusCode::Ok)
            .with_header("X-Custom", "one")
            .with_header("X-Custom", "two");

        assert_eq!(response.header("X-Custom"), Some("two"));
    }

    #[test]
    fn test_json_response() {
        let response = Response::json(StatusCode::Created, &serde_json::json!({"id": "E1"}));

        assert_eq!(response.status(), StatusCode::Created);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.header("Content-Length"), Some("11"));
        assert_eq!(response.body(), br#"{"id":"E1"}"#);
    }

    #[test]
    fn test_error_response_escapes_message() {
        let response = Response::error(StatusCode::BadRequest, r#"bad "quote""#);

        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"], r#"bad "quote""#);
    }

    #[test]
    fn test_to_bytes() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_body_bytes(b"Test".to_vec());

        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 4\r\n"));
        assert!(text.ends_with("\r\n\r\nTest"));
    }

    #[test]
    fn test_strip_body_keeps_length() {
        let mut response = Response::json(StatusCode::Ok, &vec![1, 2, 3]);
        response.strip_body();

        assert!(response.body().is_empty());
        assert_eq!(response.header("Content-Length"), Some("7"));
        assert!(String::from_utf8(response.to_bytes()).unwrap().ends_with("\r\n\r\n"));
    }
}
