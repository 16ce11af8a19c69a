//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser HTTP/1.0 (y request lines HTTP/1.1) escrito desde cero.
//!
//! ## Formato de un Request
//!
//! ```text
//! PUT /api/employees/E1 HTTP/1.0\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 24\r\n
//! \r\n
//! {"Status": "Terminated"}
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path HTTP/1.0` (la query string se descarta)
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: bytes crudos, recortados a `Content-Length` si viene

use std::collections::HashMap;
use thiserror::Error;

/// Separador entre headers y body
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Obtener un recurso
    GET,

    /// HEAD - Como GET pero solo retorna headers
    HEAD,

    /// POST - Crear un recurso
    POST,

    /// PUT - Actualizar un recurso existente
    PUT,

    /// DELETE - Eliminar un recurso
    DELETE,
}

impl Method {
    /// Parsea un método HTTP desde un string
    fn from_str(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Path crudo de la petición, sin decodificar (ej: "/api/employees/E1")
    path: String,

    /// Headers HTTP con el nombre en minúsculas
    headers: HashMap<String, String>,

    /// Versión HTTP ("HTTP/1.0" o "HTTP/1.1")
    version: String,

    /// Body crudo del request
    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No se encontró el fin de los headers
    #[error("Incomplete HTTP request")]
    IncompleteRequest,

    /// Formato inválido de la request line
    #[error("Invalid request line format")]
    InvalidRequestLine,

    /// Método HTTP no soportado
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Versión HTTP incorrecta
    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    /// Header malformado
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Request vacío
    #[error("Empty request")]
    EmptyRequest,
}

impl Request {
    /// Parsea un request HTTP desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use hr_server::http::{Method, Request};
    ///
    /// let raw = b"DELETE /api/employees/E1 HTTP/1.0\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::DELETE);
    /// assert_eq!(request.path(), "/api/employees/E1");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::EmptyRequest);
        }

        // Los headers deben ser UTF-8; el body se deja como bytes
        let (head, body) = match find_header_end(buffer) {
            Some(end) => (&buffer[..end], &buffer[end + HEADER_TERMINATOR.len()..]),
            None => (buffer, &buffer[buffer.len()..]),
        };

        let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequestLine)?;
        let mut lines = head.split("\r\n");

        // 1. Request line
        let request_line = lines.next().ok_or(ParseError::IncompleteRequest)?;
        let (method, path, version) = Self::parse_request_line(request_line)?;

        // 2. Headers
        let headers = Self::parse_headers(lines)?;

        // 3. Body, recortado al Content-Length declarado
        let body = match headers.get("content-length").and_then(|v| v.parse::<usize>().ok()) {
            Some(len) if len < body.len() => body[..len].to_vec(),
            _ => body.to_vec(),
        };

        Ok(Request {
            method,
            path,
            headers,
            version,
            body,
        })
    }

    /// Parsea la request line (primera línea del request)
    ///
    /// Formato: `GET /path?query HTTP/1.0`
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        // Debe tener exactamente 3 partes: METHOD PATH VERSION
        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::from_str(parts[0])?;

        if !parts[1].starts_with('/') {
            return Err(ParseError::InvalidRequestLine);
        }
        let path = Self::strip_query(parts[1]);

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, path, version))
    }

    /// Descarta la query string: ninguna ruta la usa
    ///
    /// El path se deja sin decodificar para que el router pueda separar
    /// segmentos antes de decodificarlos (un `%2F` no debe crear segmentos).
    fn strip_query(target: &str) -> String {
        match target.split_once('?') {
            Some((path, _query)) => path.to_string(),
            None => target.to_string(),
        }
    }

    /// Parsea los headers HTTP
    ///
    /// Los nombres se guardan en minúsculas (HTTP los trata sin distinguir mayúsculas).
    fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.trim().is_empty() {
                break;
            }

            match line.split_once(':') {
                Some((name, value)) => {
                    headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
                }
                None => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Obtiene el path crudo del request (sin query string)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene un header sin distinguir mayúsculas
    ///
    /// # Ejemplo
    /// ```
    /// use hr_server::http::Request;
    ///
    /// let raw = b"GET / HTTP/1.0\r\nContent-Type: application/json\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.header("content-type"), Some("application/json"));
    /// assert_eq!(request.header("Content-Type"), Some("application/json"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Posición donde empieza `\r\n\r\n`, si ya llegó completo
pub fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
}

/// Lee el `Content-Length` declarado en un bloque de headers crudo
///
/// Se usa antes del parseo completo, para saber cuántos bytes de body esperar.
pub fn declared_content_length(head: &[u8]) -> Option<usize> {
    let head = std::str::from_utf8(head).ok()?;
    head.split("\r\n").skip(1).find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Decodifica secuencias `%XX`; las secuencias inválidas se dejan tal cual
pub fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                decoded.push(value);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}
