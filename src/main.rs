//! # HR Roster Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada: parsea la configuración, inicializa el logging y
//! arranca el servidor (bloquea el thread principal).

use hr_server::config::Config;
use hr_server::server::Server;
use tracing::error;

fn main() {
    let config = Config::new();

    tracing_subscriber::fmt()
        .with_max_level(config.log_level.as_tracing())
        .with_target(false)
        .init();

    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        std::process::exit(2);
    }

    config.log_summary();

    let server = match Server::bind(&config) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "failed to start server");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        error!(error = %e, "fatal server error");
        std::process::exit(1);
    }
}
