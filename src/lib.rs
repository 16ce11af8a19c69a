//! # HR Roster Server
//! src/lib.rs
//!
//! API REST mock de Recursos Humanos: un roster de empleados persistido en
//! un archivo CSV plano, servido por un servidor HTTP/1.0 concurrente
//! implementado desde cero.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing y construcción de mensajes HTTP/1.0
//! - `server`: Servidor TCP, un thread por conexión
//! - `router`: Enrutamiento (método, patrón) → handler
//! - `employees`: Esquema, codec CSV, storage y endpoints del roster
//! - `state`: Estado compartido entre threads
//! - `metrics`: Métricas de requests para `/metrics`
//! - `config`: Configuración por CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use hr_server::config::Config;
//! use hr_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(&config).expect("no se pudo iniciar el servidor");
//! server.run().expect("error en el loop de aceptación");
//! ```

pub mod config;
pub mod employees;
pub mod http;
pub mod metrics;
pub mod router;
pub mod server;
pub mod state;
