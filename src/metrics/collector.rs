//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta métricas del servidor en tiempo real: requests por status y
//! por ruta, latencias (ventana acotada) y threads de conexión activos.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Máximo de latencias guardadas para calcular percentiles
const MAX_LATENCY_SAMPLES: usize = 10_000;

/// Cuántas rutas se reportan en `top_routes`
const TOP_ROUTES: usize = 10;

/// Collector de métricas thread-safe
///
/// Se comparte entre threads dentro del `Arc<AppState>` del servidor.
pub struct MetricsCollector {
    inner: Mutex<MetricsData>,
    start_time: Instant,
}

/// Datos internos de métricas
#[derive(Default)]
struct MetricsData {
    /// Contador total de requests
    total_requests: u64,

    /// Requests por código de estado
    status_codes: BTreeMap<u16, u64>,

    /// Últimas latencias registradas (en microsegundos)
    latencies: VecDeque<u64>,

    /// Requests por etiqueta de ruta ("PUT /api/employees/:id")
    requests_per_route: HashMap<String, u64>,

    /// Threads de conexión activos
    active_threads: u64,
}

/// Snapshot serializable de las métricas
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub total_requests: u64,
    pub active_threads: u64,
    pub status_codes: BTreeMap<u16, u64>,
    pub top_routes: Vec<RouteCount>,
    pub latency_us: LatencySummary,
}

/// Conteo de requests de una ruta
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteCount {
    pub route: String,
    pub count: u64,
}

/// Resumen de latencias en microsegundos
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LatencySummary {
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub avg: u64,
    pub samples: usize,
}

impl MetricsCollector {
    /// Crea un nuevo collector de métricas
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsData::default()),
            start_time: Instant::now(),
        }
    }

    fn data(&self) -> MutexGuard<'_, MetricsData> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registra un request atendido
    pub fn record_request(&self, route: &str, status_code: u16, latency: Duration) {
        let mut data = self.data();

        data.total_requests += 1;
        *data.status_codes.entry(status_code).or_insert(0) += 1;
        *data.requests_per_route.entry(route.to_string()).or_insert(0) += 1;

        if data.latencies.len() >= MAX_LATENCY_SAMPLES {
            data.latencies.pop_front();
        }
        data.latencies.push_back(latency.as_micros() as u64);
    }

    /// Incrementa el contador de threads activos
    pub fn increment_active_threads(&self) {
        self.data().active_threads += 1;
    }

    /// Decrementa el contador de threads activos (nunca baja de 0)
    pub fn decrement_active_threads(&self) {
        let mut data = self.data();
        data.active_threads = data.active_threads.saturating_sub(1);
    }

    /// Obtiene el número de threads activos
    pub fn active_threads(&self) -> u64 {
        self.data().active_threads
    }

    /// Obtiene un snapshot de las métricas actuales
    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.data();

        let mut routes: Vec<RouteCount> = data
            .requests_per_route
            .iter()
            .map(|(route, count)| RouteCount {
                route: route.clone(),
                count: *count,
            })
            .collect();
        // Orden estable: más requests primero, empates por nombre
        routes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.route.cmp(&b.route)));
        routes.truncate(TOP_ROUTES);

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            total_requests: data.total_requests,
            active_threads: data.active_threads,
            status_codes: data.status_codes.clone(),
            top_routes: routes,
            latency_us: summarize(&data.latencies),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Calcula percentiles y promedio de latencia
fn summarize(latencies: &VecDeque<u64>) -> LatencySummary {
    if latencies.is_empty() {
        return LatencySummary::default();
    }

    let mut sorted: Vec<u64> = latencies.iter().copied().collect();
    sorted.sort_unstable();

    let len = sorted.len();
    let sum: u64 = sorted.iter().sum();

    LatencySummary {
        p50: sorted[len * 50 / 100],
        p95: sorted[len * 95 / 100],
        p99: sorted[len * 99 / 100],
        avg: sum / len as u64,
        samples: len,
    }
}
