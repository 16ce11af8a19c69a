//! # Estado Compartido
//! src/state.rs
//!
//! Lo que comparten todos los threads de conexión: el storage del roster y
//! el collector de métricas. Vive detrás de un `Arc` en el servidor.

use crate::employees::{RosterStore, StoreError};
use crate::metrics::MetricsCollector;
use std::path::PathBuf;

/// Estado compartido entre handlers
pub struct AppState {
    /// Storage del roster (serializa los ciclos load-modify-save)
    pub store: RosterStore,

    /// Métricas de requests
    pub metrics: MetricsCollector,
}

impl AppState {
    /// Abre el roster en `data_file` con métricas nuevas
    pub fn open(data_file: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self {
            store: RosterStore::open(data_file)?,
            metrics: MetricsCollector::new(),
        })
    }
}
