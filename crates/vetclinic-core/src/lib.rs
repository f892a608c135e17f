//! Veterinary Clinic Core Library
//!
//! Local patient list for a single-screen clinic app: one SQLite table, a
//! live query that re-emits the whole table after every write, and a
//! view-model that folds those snapshots into screen state.
//!
//! # Architecture
//!
//! ```text
//!   View (Kotlin / Swift)
//!     │ intents                          ▲ AppState snapshots
//!     ▼                                  │
//!   PatientListStore ── reduce(state, intent) ──► Effect
//!     │                                  ▲
//!     ▼                                  │ full table
//!   UseCases (observe / add / delete / change)
//!     │                                  ▲
//!     ▼                                  │
//!   PatientRepository ── write ──► SQLite ──► live query broadcast
//! ```
//!
//! The list on screen only changes when the live query re-emits; writes are
//! never applied optimistically.
//!
//! # Modules
//!
//! - [`db`]: SQLite storage for `app_patients`
//! - [`models`]: Domain types (PatientRecord, PatientForm, AppState)
//! - [`repository`]: Storage-agnostic contract and live query stream
//! - [`usecases`]: One-method seams over the repository
//! - [`reducer`]: Pure reducer and the state-owning store
//! - [`config`]: Host-supplied settings
//! - [`logging`]: `tracing` subscriber setup

pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod reducer;
pub mod repository;
pub mod usecases;

// Re-export commonly used types
pub use config::ClinicConfig;
pub use db::Database;
pub use models::{AppState, PatientForm, PatientRecord, PatientType, Sex, ValidationError};
pub use reducer::{reduce, Dispatch, Effect, Intent, PatientListStore};
pub use repository::{PatientRepository, PatientStream, SqlitePatientRepository};
pub use usecases::UseCases;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::info;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VetClinicError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl From<db::DbError> for VetClinicError {
    fn from(e: db::DbError) -> Self {
        VetClinicError::DatabaseError(e.to_string())
    }
}

impl From<repository::RepositoryError> for VetClinicError {
    fn from(e: repository::RepositoryError) -> Self {
        VetClinicError::DatabaseError(e.to_string())
    }
}

impl From<config::ConfigError> for VetClinicError {
    fn from(e: config::ConfigError) -> Self {
        VetClinicError::ConfigError(e.to_string())
    }
}

impl From<std::io::Error> for VetClinicError {
    fn from(e: std::io::Error) -> Self {
        VetClinicError::RuntimeError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for VetClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VetClinicError::RuntimeError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open a clinic session from a JSON [`ClinicConfig`].
#[uniffi::export]
pub fn open_clinic(config_json: String) -> Result<Arc<VetClinicCore>, VetClinicError> {
    let config = ClinicConfig::from_json(&config_json)?;
    VetClinicCore::open(config).map(Arc::new)
}

/// Open a clinic session backed by an in-memory database (for testing).
#[uniffi::export]
pub fn open_clinic_in_memory() -> Result<Arc<VetClinicCore>, VetClinicError> {
    VetClinicCore::open(ClinicConfig::default()).map(Arc::new)
}

/// Install the log subscriber. Returns false if one was already installed.
#[uniffi::export]
pub fn init_logging(filter: String) -> bool {
    logging::init(&filter)
}

/// Parse the age text field the way the add/edit dialog does.
#[uniffi::export]
pub fn parse_age(text: String) -> i32 {
    PatientForm::parse_age(&text)
}

/// Patient type symbols in picker order.
#[uniffi::export]
pub fn patient_type_symbols() -> Vec<String> {
    PatientType::ALL
        .iter()
        .map(|t| t.as_symbol().to_string())
        .collect()
}

/// Sex symbols in picker order.
#[uniffi::export]
pub fn sex_symbols() -> Vec<String> {
    Sex::ALL.iter().map(|s| s.as_symbol().to_string()).collect()
}

// =========================================================================
// Foreign Callbacks
// =========================================================================

/// Implemented by the view to receive every new screen state.
#[uniffi::export(callback_interface)]
pub trait StateListener: Send + Sync {
    fn on_state_changed(&self, state: FfiAppState);
}

// =========================================================================
// Main API Object
// =========================================================================

/// One clinic screen session.
///
/// Owns the background runtime; the store and its subscription live on it.
#[derive(uniffi::Object)]
pub struct VetClinicCore {
    store: PatientListStore,
    listener: Mutex<Option<JoinHandle<()>>>,
    // Declared last: dropped after the tasks that run on it.
    runtime: tokio::runtime::Runtime,
}

impl VetClinicCore {
    /// Build a session from an already validated config.
    pub fn open(config: ClinicConfig) -> Result<Self, VetClinicError> {
        config.validate()?;
        logging::init(&config.log_filter);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .thread_name("vetclinic-worker")
            .enable_all()
            .build()?;

        let db = config.open_database()?;
        let repository = SqlitePatientRepository::new(db, config.channel_capacity);
        let use_cases = UseCases::from_repository(Arc::new(repository));
        let store = PatientListStore::new(use_cases, runtime.handle().clone());

        info!(
            database = config.database_path.as_deref().unwrap_or(":memory:"),
            "clinic session opened"
        );

        Ok(Self {
            store,
            listener: Mutex::new(None),
            runtime,
        })
    }

    /// Access the underlying store.
    pub fn store(&self) -> &PatientListStore {
        &self.store
    }
}

#[uniffi::export]
impl VetClinicCore {
    // =========================================================================
    // State
    // =========================================================================

    /// Current screen state.
    pub fn current_state(&self) -> FfiAppState {
        self.store.snapshot().into()
    }

    /// Deliver the current state and every later change to `listener`.
    ///
    /// Replaces any previously set listener.
    pub fn set_state_listener(
        &self,
        listener: Box<dyn StateListener>,
    ) -> Result<(), VetClinicError> {
        let mut rx = self.store.subscribe();
        let task = self.runtime.spawn(async move {
            loop {
                let state = rx.borrow_and_update().clone();
                listener.on_state_changed(state.into());
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });
        if let Some(previous) = self.listener.lock()?.replace(task) {
            previous.abort();
        }
        Ok(())
    }

    /// Stop delivering state changes.
    pub fn clear_state_listener(&self) -> Result<(), VetClinicError> {
        if let Some(previous) = self.listener.lock()?.take() {
            previous.abort();
        }
        Ok(())
    }

    // =========================================================================
    // Add Dialog
    // =========================================================================

    pub fn open_add(&self) {
        self.store.open_add();
    }

    pub fn dismiss_add(&self) {
        self.store.dismiss_add();
    }

    pub fn confirm_add(&self, form: FfiPatientForm) -> Result<FfiDispatch, VetClinicError> {
        let form = PatientForm::try_from(form)?;
        Ok(self.store.confirm_add(form).into())
    }

    // =========================================================================
    // Edit Dialog
    // =========================================================================

    pub fn open_edit(&self, patient: FfiPatient) -> Result<(), VetClinicError> {
        self.store.open_edit(patient.try_into()?);
        Ok(())
    }

    pub fn dismiss_edit(&self) {
        self.store.dismiss_edit();
    }

    pub fn confirm_edit(
        &self,
        patient_id: i64,
        form: FfiPatientForm,
    ) -> Result<FfiDispatch, VetClinicError> {
        let form = PatientForm::try_from(form)?;
        Ok(self.store.confirm_edit(patient_id, form).into())
    }

    // =========================================================================
    // Delete Dialog
    // =========================================================================

    pub fn open_delete(&self, patient: FfiPatient) -> Result<(), VetClinicError> {
        self.store.open_delete(patient.try_into()?);
        Ok(())
    }

    pub fn dismiss_delete(&self) {
        self.store.dismiss_delete();
    }

    pub fn confirm_delete(&self) -> FfiDispatch {
        self.store.confirm_delete().into()
    }
}

impl Drop for VetClinicCore {
    fn drop(&mut self) {
        if let Ok(mut listener) = self.listener.lock() {
            if let Some(task) = listener.take() {
                task.abort();
            }
        }
    }
}

// =========================================================================
// FFI Types
// =========================================================================

fn parse_patient_type(symbol: &str) -> Result<PatientType, VetClinicError> {
    PatientType::from_symbol(symbol)
        .ok_or_else(|| VetClinicError::InvalidInput(format!("Unknown patient type: {}", symbol)))
}

fn parse_sex(symbol: &str) -> Result<Sex, VetClinicError> {
    Sex::from_symbol(symbol)
        .ok_or_else(|| VetClinicError::InvalidInput(format!("Unknown sex: {}", symbol)))
}

/// FFI-safe patient. Enums travel as their stored symbols.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: i64,
    pub name: String,
    pub patient_type: String,
    pub custom_type: Option<String>,
    pub sex: String,
    pub age_years: i32,
    pub comment: Option<String>,
    /// Display text, e.g. `Собака • Самец • 3 лет` (ignored on input)
    pub summary: String,
}

impl From<PatientRecord> for FfiPatient {
    fn from(patient: PatientRecord) -> Self {
        let summary = patient.summary_line();
        Self {
            id: patient.id,
            name: patient.name,
            patient_type: patient.patient_type.as_symbol().to_string(),
            custom_type: patient.custom_type,
            sex: patient.sex.as_symbol().to_string(),
            age_years: patient.age_years,
            comment: patient.comment,
            summary,
        }
    }
}

impl TryFrom<FfiPatient> for PatientRecord {
    type Error = VetClinicError;

    fn try_from(patient: FfiPatient) -> Result<Self, Self::Error> {
        Ok(PatientRecord {
            id: patient.id,
            name: patient.name,
            patient_type: parse_patient_type(&patient.patient_type)?,
            custom_type: patient.custom_type,
            sex: parse_sex(&patient.sex)?,
            age_years: patient.age_years,
            comment: patient.comment,
        })
    }
}

/// FFI-safe form input, exactly as typed.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientForm {
    pub name: String,
    pub patient_type: String,
    pub custom_type: String,
    pub sex: String,
    pub age_years: i32,
    pub comment: String,
}

impl TryFrom<FfiPatientForm> for PatientForm {
    type Error = VetClinicError;

    fn try_from(form: FfiPatientForm) -> Result<Self, Self::Error> {
        Ok(PatientForm {
            name: form.name,
            patient_type: parse_patient_type(&form.patient_type)?,
            custom_type: form.custom_type,
            sex: parse_sex(&form.sex)?,
            age_years: form.age_years,
            comment: form.comment,
        })
    }
}

/// FFI-safe screen state.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppState {
    pub patients: Vec<FfiPatient>,
    pub show_add_dialog: bool,
    pub editing_patient: Option<FfiPatient>,
    pub deleting_patient: Option<FfiPatient>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl From<AppState> for FfiAppState {
    fn from(state: AppState) -> Self {
        Self {
            patients: state.patients.into_iter().map(Into::into).collect(),
            show_add_dialog: state.show_add_dialog,
            editing_patient: state.editing_patient.map(Into::into),
            deleting_patient: state.deleting_patient.map(Into::into),
            is_loading: state.is_loading,
            error: state.error,
        }
    }
}

/// FFI-safe dispatch outcome.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FfiDispatch {
    Applied,
    Ignored,
    Rejected { reason: String },
}

impl From<Dispatch> for FfiDispatch {
    fn from(outcome: Dispatch) -> Self {
        match outcome {
            Dispatch::Applied => FfiDispatch::Applied,
            Dispatch::Ignored => FfiDispatch::Ignored,
            Dispatch::Rejected(e) => FfiDispatch::Rejected {
                reason: e.to_string(),
            },
        }
    }
}
