//! # Módulo HTTP
//!
//! Implementa el protocolo HTTP/1.0 desde cero, sin librerías de alto nivel:
//!
//! - Parsing de requests (request line, headers, body)
//! - Construcción de responses JSON
//! - Códigos de estado
//!
//! Se aceptan request lines `HTTP/1.1`, pero las respuestas siempre son
//! `HTTP/1.0` con `Connection: close` (una petición por conexión).

pub mod request;
pub mod response;
pub mod status;

// Re-exportamos los tipos principales para usar `http::Request` directamente
pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
