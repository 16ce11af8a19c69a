//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Servidor TCP que maneja múltiples conexiones simultáneas usando threads.
//! Cada conexión se procesa en su propio thread; el acceso al roster se
//! serializa dentro de `RosterStore`.

use crate::config::Config;
use crate::employees::{handlers as employee_handlers, StoreError};
use crate::http::request::{declared_content_length, find_header_end};
use crate::http::{Method, Request, Response, StatusCode};
use crate::router::{RouteParams, Router};
use crate::state::AppState;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Máximo de bytes aceptados para request line + headers
const MAX_HEAD_BYTES: usize = 8192;

/// Valor del header `Server`
const SERVER_NAME: &str = "HR-Roster/0.1";

/// Tamaño del buffer de lectura
const READ_CHUNK: usize = 4096;

/// Contador para que dos requests en el mismo nanosegundo no compartan ID
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Errores al arrancar el servidor
#[derive(Debug, Error)]
pub enum ServerError {
    /// No se pudo abrir el roster
    #[error("failed to open roster: {0}")]
    Store(#[from] StoreError),

    /// No se pudo hacer bind de la dirección
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
}

/// Errores al leer un request del socket
#[derive(Debug, Error)]
enum ReadError {
    #[error("connection error: {0}")]
    Io(#[from] io::Error),

    #[error("request headers exceed {limit} bytes")]
    HeadTooLarge { limit: usize },

    #[error("request body of {declared} bytes exceeds limit of {limit} bytes")]
    BodyTooLarge { declared: usize, limit: usize },
}

/// Límites aplicados a cada conexión
#[derive(Debug, Clone, Copy)]
struct Limits {
    max_body_bytes: usize,
    read_timeout: Duration,
}

/// Servidor HTTP del roster
pub struct Server {
    router: Arc<Router>,
    state: Arc<AppState>,
    limits: Limits,
    listener: TcpListener,
}

/// Construye el router con todas las rutas del servidor
pub fn build_router() -> Router {
    let mut router = Router::new();

    // Roster de empleados
    router.register(Method::GET, "/api/employees", employee_handlers::list_handler);
    router.register(Method::POST, "/api/employees", employee_handlers::create_handler);
    router.register(Method::PUT, "/api/employees/:id", employee_handlers::update_handler);
    router.register(Method::DELETE, "/api/employees/:id", employee_handlers::delete_handler);

    // Observabilidad
    router.register(Method::GET, "/metrics", metrics_handler);
    router.register(Method::GET, "/health", health_handler);

    router
}

/// Handler para `GET /metrics`
fn metrics_handler(_req: &Request, _params: &RouteParams, state: &AppState) -> Response {
    Response::json(StatusCode::Ok, &state.metrics.snapshot())
}

/// Handler para `GET /health`
fn health_handler(_req: &Request, _params: &RouteParams, _state: &AppState) -> Response {
    Response::json(StatusCode::Ok, &serde_json::json!({ "status": "ok" }))
}

impl Server {
    /// Abre el roster y hace bind de la dirección configurada
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        let state = AppState::open(&config.data_file)?;

        let address = config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

        Ok(Self {
            router: Arc::new(build_router()),
            state: Arc::new(state),
            limits: Limits {
                max_body_bytes: config.max_body_bytes,
                read_timeout: config.read_timeout(),
            },
            listener,
        })
    }

    /// Dirección real en la que escucha (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Estado compartido del servidor
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Loop de aceptación: un thread por conexión (bloquea para siempre)
    pub fn run(&self) -> io::Result<()> {
        info!(address = %self.local_addr()?, "server listening (thread per connection)");

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let router = Arc::clone(&self.router);
                    let state = Arc::clone(&self.state);
                    let limits = self.limits;

                    let peer = stream
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());
                    debug!(peer = %peer, "connection accepted");

                    state.metrics.increment_active_threads();

                    thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(stream, &router, &state, limits) {
                            warn!(peer = %peer, error = %e, "connection error");
                        }
                        state.metrics.decrement_active_threads();
                    });
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }

        Ok(())
    }

    fn handle_connection(
        mut stream: TcpStream,
        router: &Router,
        state: &AppState,
        limits: Limits,
    ) -> io::Result<()> {
        let start = Instant::now();
        let request_id = next_request_id();

        stream.set_read_timeout(Some(limits.read_timeout))?;

        let (mut response, method, path, route) = match read_request(&mut stream, limits.max_body_bytes) {
            Ok(None) => {
                debug!(request_id = %request_id, "connection closed before request");
                return Ok(());
            }
            Ok(Some(raw)) => match Request::parse(&raw) {
                Ok(request) => {
                    let dispatch = router.route(&request, state);
                    (
                        dispatch.response,
                        request.method().as_str(),
                        request.path().to_string(),
                        dispatch.route,
                    )
                }
                Err(e) => {
                    warn!(request_id = %request_id, error = %e, "invalid request");
                    (
                        Response::error(StatusCode::BadRequest, &format!("Invalid: {}", e)),
                        "-",
                        "-".to_string(),
                        "invalid".to_string(),
                    )
                }
            },
            Err(ReadError::Io(e)) if is_timeout(&e) => {
                warn!(request_id = %request_id, timeout_ms = limits.read_timeout.as_millis() as u64, "request read timed out");
                (
                    Response::error(StatusCode::RequestTimeout, "Request not received in time"),
                    "-",
                    "-".to_string(),
                    "timeout".to_string(),
                )
            }
            Err(ReadError::Io(e)) => return Err(e),
            Err(e @ ReadError::HeadTooLarge { .. }) | Err(e @ ReadError::BodyTooLarge { .. }) => {
                warn!(request_id = %request_id, error = %e, "request rejected");
                (
                    Response::error(StatusCode::PayloadTooLarge, &e.to_string()),
                    "-",
                    "-".to_string(),
                    "rejected".to_string(),
                )
            }
        };

        // Comunes a toda respuesta, haya pasado o no por el router
        response.add_header("Server", SERVER_NAME);
        response.add_header("Connection", "close");
        response.add_header("X-Request-Id", &request_id);

        stream.write_all(&response.to_bytes())?;
        stream.flush()?;

        let latency = start.elapsed();
        let status = response.status();
        state.metrics.record_request(&route, status.as_u16(), latency);

        info!(
            request_id = %request_id,
            method,
            path = %path,
            status = status.as_u16(),
            latency_ms = latency.as_secs_f64() * 1000.0,
            "request handled"
        );

        Ok(())
    }
}

/// `set_read_timeout` vence con `WouldBlock` en Unix y `TimedOut` en Windows
fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// ID de request en hex, derivado de la hora, el thread y un contador
fn next_request_id() -> String {
    let mut hasher = DefaultHasher::new();
    SystemTime::now().hash(&mut hasher);
    thread::current().id().hash(&mut hasher);
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed).hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Lee un request completo: headers hasta `\r\n\r\n` y el body según `Content-Length`
///
/// Retorna `Ok(None)` si el cliente cerró sin enviar nada.
fn read_request(stream: &mut impl Read, max_body_bytes: usize) -> Result<Option<Vec<u8>>, ReadError> {
    let mut buffer = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    // 1. Headers
    let head_end = loop {
        if let Some(end) = find_header_end(&buffer) {
            break end;
        }
        if buffer.len() > MAX_HEAD_BYTES {
            return Err(ReadError::HeadTooLarge { limit: MAX_HEAD_BYTES });
        }

        let n = stream.read(&mut chunk)?;
        if n == 0 {
            // EOF: si no llegó nada la conexión se cerró; si llegó algo, que el parser decida
            return Ok(if buffer.is_empty() { None } else { Some(buffer) });
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    // 2. Body
    let declared = declared_content_length(&buffer[..head_end]).unwrap_or(0);
    if declared > max_body_bytes {
        return Err(ReadError::BodyTooLarge {
            declared,
            limit: max_body_bytes,
        });
    }

    let expected_len = head_end + 4 + declared;
    while buffer.len() < expected_len {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    Ok(Some(buffer))
}
