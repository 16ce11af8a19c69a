//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea (método, path) a handlers, con soporte para parámetros de path.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler(request, params, state) → Response
//! ```
//!
//! Los patrones usan segmentos literales y parámetros con `:`, por ejemplo
//! `/api/employees/:id`. Si ningún patrón coincide con el path se responde
//! 404; si el path coincide pero no el método, 405 con header `Allow`.

use crate::http::request::percent_decode;
use crate::http::{Method, Request, Response, StatusCode};
use crate::state::AppState;
use std::collections::HashMap;

/// Tipo de función handler
///
/// Recibe el request, los parámetros extraídos del path y el estado compartido.
pub type Handler = fn(&Request, &RouteParams, &AppState) -> Response;

/// Parámetros extraídos del path (`:id` → "E1"), ya decodificados
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    values: HashMap<String, String>,
}

impl RouteParams {
    /// Obtiene un parámetro por nombre
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }

    /// Agrega o reemplaza un parámetro
    pub fn insert(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

struct Route {
    method: Method,
    pattern: String,
    segments: Vec<Segment>,
    handler: Handler,
}

/// Resultado de despachar un request
pub struct Dispatch {
    /// Respuesta del handler (los headers de conexión los agrega el servidor)
    pub response: Response,

    /// Etiqueta de la ruta para métricas (ej: "PUT /api/employees/:id")
    pub route: String,
}

/// Router que mapea (método, patrón) a handlers
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta con su handler
    ///
    /// # Ejemplo
    /// ```
    /// use hr_server::http::{Method, Request, Response, StatusCode};
    /// use hr_server::router::{RouteParams, Router};
    /// use hr_server::state::AppState;
    ///
    /// fn hello(_req: &Request, params: &RouteParams, _state: &AppState) -> Response {
    ///     Response::json(StatusCode::Ok, &params.get("name"))
    /// }
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, "/hello/:name", hello);
    /// ```
    pub fn register(&mut self, method: Method, pattern: &str, handler: Handler) {
        self.routes.push(Route {
            method,
            pattern: pattern.to_string(),
            segments: parse_pattern(pattern),
            handler,
        });
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    ///
    /// HEAD se atiende con el handler de GET y se le quita el body.
    pub fn route(&self, request: &Request, state: &AppState) -> Dispatch {
        let path = request.path();
        let lookup_method = match request.method() {
            Method::HEAD => Method::GET,
            other => other,
        };

        let mut allowed: Vec<Method> = Vec::new();

        for route in &self.routes {
            let params = match match_segments(&route.segments, path) {
                Some(params) => params,
                None => continue,
            };

            if route.method != lookup_method {
                allowed.push(route.method);
                continue;
            }

            let mut response = (route.handler)(request, &params, state);
            if request.method() == Method::HEAD {
                response.strip_body();
            }

            return Dispatch {
                response,
                route: format!("{} {}", route.method, route.pattern),
            };
        }

        let response = if allowed.is_empty() {
            Response::error(StatusCode::NotFound, &format!("Route not found: {}", path))
        } else {
            let allow = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
            Response::error(
                StatusCode::MethodNotAllowed,
                &format!("Method {} not allowed for {}", request.method(), path),
            )
            .with_header("Allow", &allow)
        };

        Dispatch {
            response,
            route: "unmatched".to_string(),
        }
    }

}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    split_path(pattern)
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(segment.to_string()),
        })
        .collect()
}

/// Compara segmento a segmento; los parámetros capturan un segmento no vacío
fn match_segments(segments: &[Segment], path: &str) -> Option<RouteParams> {
    let parts: Vec<&str> = split_path(path).collect();
    if parts.len() != segments.len() {
        return None;
    }

    let mut params = RouteParams::default();
    for (segment, part) in segments.iter().zip(parts) {
        match segment {
            Segment::Literal(literal) => {
                if literal != part {
                    return None;
                }
            }
            Segment::Param(name) => {
                params.insert(name, &percent_decode(part));
            }
        }
    }

    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn list_handler(_req: &Request, _params: &RouteParams, _state: &AppState) -> Response {
        Response::json(StatusCode::Ok, &serde_json::json!({"route": "list"}))
    }

    fn echo_id_handler(_req: &Request, params: &RouteParams, _state: &AppState) -> Response {
        Response::json(StatusCode::Ok, &serde_json::json!({"id": params.get("id")}))
    }

    fn test_state() -> (TempDir, AppState) {
        let dir = TempDir::new().unwrap();
        let state = AppState::open(dir.path().join("employees.csv")).unwrap();
        (dir, state)
    }

    fn router() -> Router {
        let mut router = Router::new();
        router.register(Method::GET, "/api/employees", list_handler);
        router.register(Method::PUT, "/api/employees/:id", echo_id_handler);
        router.register(Method::DELETE, "/api/employees/:id", echo_id_handler);
        router
    }

    fn dispatch(raw: &[u8]) -> Dispatch {
        let (_dir, state) = test_state();
        router().route(&Request::parse(raw).unwrap(), &state)
    }

    fn body_json(response: &Response) -> serde_json::Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    // ==================== Registration ====================

    #[test]
    fn test_router_creation() {
        let router = Router::new();
        assert_eq!(router.routes.len(), 0);
    }

    #[test]
    fn test_parse_pattern() {
        assert_eq!(
            parse_pattern("/api/employees/:id"),
            vec![
                Segment::Literal("api".to_string()),
                Segment::Literal("employees".to_string()),
                Segment::Param("id".to_string()),
            ]
        );
    }

    // ==================== Matching ====================

    #[test]
    fn test_route_found() {
        let dispatch = dispatch(b"GET /api/employees HTTP/1.0\r\n\r\n");

        assert_eq!(dispatch.response.status(), StatusCode::Ok);
        assert_eq!(dispatch.route, "GET /api/employees");
        assert_eq!(dispatch.response.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_route_trailing_slash() {
        let dispatch = dispatch(b"GET /api/employees/ HTTP/1.0\r\n\r\n");
        assert_eq!(dispatch.response.status(), StatusCode::Ok);
    }

    #[test]
    fn test_route_extracts_param() {
        let dispatch = dispatch(b"PUT /api/employees/E42 HTTP/1.0\r\n\r\n");

        assert_eq!(dispatch.response.status(), StatusCode::Ok);
        assert_eq!(dispatch.route, "PUT /api/employees/:id");
        assert_eq!(body_json(&dispatch.response)["id"], "E42");
    }

    #[test]
    fn test_route_param_is_percent_decoded() {
        let dispatch = dispatch(b"DELETE /api/employees/E%201 HTTP/1.0\r\n\r\n");
        assert_eq!(body_json(&dispatch.response)["id"], "E 1");
    }

    #[test]
    fn test_route_not_found() {
        let dispatch = dispatch(b"GET /nonexistent HTTP/1.0\r\n\r\n");

        assert_eq!(dispatch.response.status(), StatusCode::NotFound);
        assert_eq!(dispatch.route, "unmatched");
        assert!(body_json(&dispatch.response)["error"]
            .as_str()
            .unwrap()
            .contains("Route not found"));
    }

    #[test]
    fn test_route_extra_segments_not_found() {
        let dispatch = dispatch(b"PUT /api/employees/E1/extra HTTP/1.0\r\n\r\n");
        assert_eq!(dispatch.response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_method_not_allowed() {
        let dispatch = dispatch(b"POST /api/employees/E1 HTTP/1.0\r\n\r\n");

        assert_eq!(dispatch.response.status(), StatusCode::MethodNotAllowed);
        assert_eq!(dispatch.response.header("Allow"), Some("PUT, DELETE"));
    }

    #[test]
    fn test_head_uses_get_handler_without_body() {
        let dispatch = dispatch(b"HEAD /api/employees HTTP/1.0\r\n\r\n");

        assert_eq!(dispatch.response.status(), StatusCode::Ok);
        assert!(dispatch.response.body().is_empty());
        assert!(dispatch.response.header("Content-Length").is_some());
    }
}
