//! Storage-agnostic patient repository.
//!
//! Writers call [`PatientRepository::add`], [`PatientRepository::remove`] and
//! [`PatientRepository::update`]; readers hold a [`PatientStream`] from
//! [`PatientRepository::observe_all`] and receive the whole table again after
//! every change. Emissions are total replacements, never diffs.

mod sqlite;
mod stream;

pub use sqlite::SqlitePatientRepository;
pub use stream::{PatientSnapshot, PatientStream};

use async_trait::async_trait;
use thiserror::Error;

use crate::db::DbError;
use crate::models::PatientRecord;

/// Repository errors.
///
/// `Clone` so one failure can be fanned out to every live subscriber.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Background task failed: {0}")]
    TaskJoin(String),
}

impl From<DbError> for RepositoryError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Decode { .. } => RepositoryError::Decode(e.to_string()),
            other => RepositoryError::Storage(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for RepositoryError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        RepositoryError::Storage(format!("Lock poisoned: {}", e))
    }
}

impl From<tokio::task::JoinError> for RepositoryError {
    fn from(e: tokio::task::JoinError) -> Self {
        RepositoryError::TaskJoin(e.to_string())
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Patient persistence contract.
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Subscribe to the full patient list.
    ///
    /// The first item is the current table; every later item is the table
    /// after a write. The stream ends after yielding an error.
    async fn observe_all(&self) -> PatientStream;

    /// Store a new patient and return its assigned id. `patient.id` is ignored.
    async fn add(&self, patient: PatientRecord) -> RepoResult<i64>;

    /// Delete by id. Missing ids are not an error.
    async fn remove(&self, id: i64) -> RepoResult<()>;

    /// Replace the row with `patient.id`. Missing ids are not an error.
    async fn update(&self, patient: PatientRecord) -> RepoResult<()>;
}
