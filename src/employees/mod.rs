//! # Roster de Empleados
//!
//! CRUD sobre un roster persistido como archivo CSV plano.
//!
//! ## Componentes
//!
//! - `types`: esquema `Employee`, payloads de entrada y validación
//! - `codec`: texto CSV ⇄ `Vec<Employee>`
//! - `storage`: lectura/reescritura completa del archivo, con mutex
//! - `handlers`: endpoints `/api/employees`
//!
//! ## Flujo
//!
//! ```text
//! handler → validate (solo create) → store.modify(load → op → save) → Response
//! ```

pub mod codec;
pub mod handlers;
pub mod storage;
pub mod types;

pub use handlers::ApiError;
pub use storage::{Mutation, RosterStore, StoreError};
pub use types::{Employee, EmployeeDraft, EmployeePatch, Field, ValidationError};
