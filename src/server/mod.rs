//! # Módulo de Servidor
//!
//! Servidor TCP concurrente (un thread por conexión) y tabla de rutas.

pub mod tcp;

pub use tcp::{build_router, Server, ServerError};
