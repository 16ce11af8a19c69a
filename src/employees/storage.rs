//! # Persistencia del Roster
//! src/employees/storage.rs
//!
//! Lectura y reescritura completa del archivo CSV del roster.
//!
//! Cada operación vuelve a leer el archivo entero (no hay cache). Las
//! escrituras reemplazan el archivo completo usando un archivo temporal y
//! `rename`, y todo ciclo load-modify-save se hace bajo un mutex para que
//! dos requests concurrentes no se pisen.

use super::codec::{self, DecodeError};
use super::types::Employee;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info};

/// Errores del storage
#[derive(Debug, Error)]
pub enum StoreError {
    /// Falló una operación de I/O sobre el archivo
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// El contenido del archivo no se pudo decodificar
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

/// Resultado de la función pasada a [`RosterStore::modify`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation<T> {
    /// Guardar el roster modificado
    Commit(T),

    /// Descartar cambios, el archivo no se toca
    Abort(T),
}

/// Storage del roster sobre un único archivo CSV
pub struct RosterStore {
    /// Ruta al archivo CSV
    path: PathBuf,

    /// Punto de serialización de todos los accesos al archivo
    lock: Mutex<()>,
}

impl RosterStore {
    /// Abre el storage, creando un archivo con solo el header si no existe
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            lock: Mutex::new(()),
        };

        if !store.path.exists() {
            if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| io_error("create directory for", &store.path, source))?;
            }
            store.write_roster(&[])?;
            info!(path = %store.path.display(), "created empty roster file");
        }

        Ok(store)
    }

    /// Ruta del archivo respaldado
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lee y decodifica el roster completo
    pub fn load(&self) -> Result<Vec<Employee>, StoreError> {
        let _guard = self.lock();
        self.read_roster()
    }

    /// Reemplaza el roster completo
    pub fn save(&self, employees: &[Employee]) -> Result<(), StoreError> {
        let _guard = self.lock();
        self.write_roster(employees)
    }

    /// Ejecuta load → `f` → save de forma atómica respecto a otros requests
    ///
    /// Si `f` retorna [`Mutation::Abort`] el archivo queda intacto.
    ///
    /// # Ejemplo
    /// ```no_run
    /// use hr_server::employees::{Mutation, RosterStore};
    ///
    /// let store = RosterStore::open("./employees.csv").unwrap();
    /// let removed = store.modify(|employees| {
    ///     let before = employees.len();
    ///     employees.retain(|e| e.employee_id != "E1");
    ///     Mutation::Commit(before - employees.len())
    /// }).unwrap();
    /// println!("removed {}", removed);
    /// ```
    pub fn modify<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Vec<Employee>) -> Mutation<T>,
    {
        let _guard = self.lock();
        let mut employees = self.read_roster()?;

        match f(&mut employees) {
            Mutation::Commit(value) => {
                self.write_roster(&employees)?;
                Ok(value)
            }
            Mutation::Abort(value) => {
                debug!(path = %self.path.display(), "mutation aborted, roster untouched");
                Ok(value)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // El mutex no protege datos, solo ordena accesos: un panic previo no lo invalida
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_roster(&self) -> Result<Vec<Employee>, StoreError> {
        let bytes = fs::read(&self.path).map_err(|source| io_error("read", &self.path, source))?;

        codec::decode(&bytes).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    fn write_roster(&self, employees: &[Employee]) -> Result<(), StoreError> {
        let text = codec::encode(employees);

        // Escribir a un temporal primero y luego renombrar (atómico en Unix)
        let temp_path = self.temp_path();
        let file = File::create(&temp_path).map_err(|source| io_error("create", &temp_path, source))?;
        let mut writer = BufWriter::new(file);

        writer
            .write_all(text.as_bytes())
            .map_err(|source| io_error("write", &temp_path, source))?;
        let file = writer
            .into_inner()
            .map_err(|e| io_error("flush", &temp_path, e.into_error()))?;
        file.sync_all().map_err(|source| io_error("sync", &temp_path, source))?;

        fs::rename(&temp_path, &self.path).map_err(|source| io_error("replace", &self.path, source))?;

        debug!(path = %self.path.display(), records = employees.len(), "roster saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }

}

/// Error de I/O con la ruta que realmente falló (el temporal o el destino)
fn io_error(action: &'static str, path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}
