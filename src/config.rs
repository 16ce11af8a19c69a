//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor con soporte para argumentos CLI y variables
//! de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./hr_server --port 3000 --data-file ./data/employees.csv --log-level debug
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HR_PORT=8080 EMPLOYEES_CSV=/srv/hr/employees.csv ./hr_server
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Nivel de logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Nivel equivalente de `tracing`
    pub fn as_tracing(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Errores de configuración
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("host must not be empty")]
    EmptyHost,

    #[error("data file path must not be empty")]
    EmptyDataFile,

    #[error("max body bytes must be >= 1")]
    ZeroBodyLimit,

    #[error("read timeout must be > 0")]
    ZeroReadTimeout,
}

/// Configuración del servidor HR
#[derive(Debug, Clone, Parser)]
#[command(name = "hr_server")]
#[command(about = "Servidor HTTP mock de RRHH con roster de empleados en CSV")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "3000", env = "HR_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HR_HOST")]
    pub host: String,

    /// Archivo CSV del roster (se crea con solo el header si no existe)
    #[arg(long = "data-file", default_value = "./employees.csv", env = "EMPLOYEES_CSV")]
    pub data_file: PathBuf,

    /// Tamaño máximo del body de un request, en bytes
    #[arg(long = "max-body-bytes", default_value = "65536", env = "MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// Timeout de lectura del socket en milisegundos
    #[arg(long = "read-timeout-ms", default_value = "5000", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Nivel de logging
    #[arg(long = "log-level", value_enum, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: LogLevel,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI y entorno
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```
    /// use hr_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:3000");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Timeout de lectura del socket
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataFile);
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::ZeroReadTimeout);
        }
        Ok(())
    }

    /// Registra un resumen de la configuración al arrancar
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            data_file = %self.data_file.display(),
            max_body_bytes = self.max_body_bytes,
            read_timeout_ms = self.read_timeout_ms,
            log_level = ?self.log_level,
            "configuration loaded"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto (igual a los defaults del CLI)
    fn default() -> Self {
        Self {
            port: 3000,
            host: "127.0.0.1".to_string(),
            data_file: PathBuf::from("./employees.csv"),
            max_body_bytes: 65_536,
            read_timeout_ms: 5_000,
            log_level: LogLevel::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.data_file, PathBuf::from("./employees.csv"));
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_cli_defaults_match_default_impl() {
        let parsed = Config::try_parse_from(["hr_server"]).unwrap();
        let default = Config::default();

        // Las variables de entorno podrían alterar estos valores en CI;
        // solo comparamos si no están definidas.
        if std::env::var_os("HR_PORT").is_none() {
            assert_eq!(parsed.port, default.port);
        }
        if std::env::var_os("MAX_BODY_BYTES").is_none() {
            assert_eq!(parsed.max_body_bytes, default.max_body_bytes);
        }
        if std::env::var_os("LOG_LEVEL").is_none() {
            assert_eq!(parsed.log_level, default.log_level);
        }
    }

    #[test]
    fn test_cli_flags() {
        let config = Config::try_parse_from([
            "hr_server",
            "--port",
            "8080",
            "--host",
            "0.0.0.0",
            "--data-file",
            "/srv/hr/roster.csv",
            "--max-body-bytes",
            "1024",
            "--read-timeout-ms",
            "250",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(config.address(), "0.0.0.0:8080");
        assert_eq!(config.data_file, PathBuf::from("/srv/hr/roster.csv"));
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.read_timeout(), Duration::from_millis(250));
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_cli_rejects_unknown_log_level() {
        assert!(Config::try_parse_from(["hr_server", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "0.0.0.0".to_string();
        config.port = 8080;
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    // ==================== Validation ====================

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_host() {
        let mut config = Config::default();
        config.host = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::EmptyHost));
    }

    #[test]
    fn test_validate_empty_data_file() {
        let mut config = Config::default();
        config.data_file = PathBuf::new();
        assert_eq!(config.validate(), Err(ConfigError::EmptyDataFile));
    }

    #[test]
    fn test_validate_zero_body_limit() {
        let mut config = Config::default();
        config.max_body_bytes = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroBodyLimit));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.read_timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroReadTimeout));
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(LogLevel::Warn.as_tracing(), tracing::Level::WARN);
        assert_eq!(LogLevel::Trace.as_tracing(), tracing::Level::TRACE);
    }

    #[test]
    fn test_log_summary_does_not_panic() {
        Config::default().log_summary();
    }
}
