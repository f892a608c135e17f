//! Use-case seam between the list store and the repository.
//!
//! Each trait forwards one repository call unchanged. They exist so the
//! store can be tested with any single operation swapped for a fake.

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::PatientRecord;
use crate::repository::{PatientRepository, PatientStream, RepoResult};

#[async_trait]
pub trait ObservePatients: Send + Sync {
    async fn observe(&self) -> PatientStream;
}

#[async_trait]
pub trait AddPatient: Send + Sync {
    async fn add(&self, patient: PatientRecord) -> RepoResult<i64>;
}

#[async_trait]
pub trait DeletePatient: Send + Sync {
    async fn delete(&self, id: i64) -> RepoResult<()>;
}

#[async_trait]
pub trait ChangePatient: Send + Sync {
    async fn change(&self, patient: PatientRecord) -> RepoResult<()>;
}

/// All four use-cases backed by one repository.
#[derive(Clone)]
pub struct RepositoryUseCases {
    repository: Arc<dyn PatientRepository>,
}

impl RepositoryUseCases {
    pub fn new(repository: Arc<dyn PatientRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ObservePatients for RepositoryUseCases {
    async fn observe(&self) -> PatientStream {
        self.repository.observe_all().await
    }
}

#[async_trait]
impl AddPatient for RepositoryUseCases {
    async fn add(&self, patient: PatientRecord) -> RepoResult<i64> {
        self.repository.add(patient).await
    }
}

#[async_trait]
impl DeletePatient for RepositoryUseCases {
    async fn delete(&self, id: i64) -> RepoResult<()> {
        self.repository.remove(id).await
    }
}

#[async_trait]
impl ChangePatient for RepositoryUseCases {
    async fn change(&self, patient: PatientRecord) -> RepoResult<()> {
        self.repository.update(patient).await
    }
}

/// Handles the list store depends on.
#[derive(Clone)]
pub struct UseCases {
    pub observe: Arc<dyn ObservePatients>,
    pub add: Arc<dyn AddPatient>,
    pub delete: Arc<dyn DeletePatient>,
    pub change: Arc<dyn ChangePatient>,
}

impl UseCases {
    /// Wire every use-case to the same repository.
    pub fn from_repository(repository: Arc<dyn PatientRepository>) -> Self {
        let shared = Arc::new(RepositoryUseCases::new(repository));
        Self {
            observe: shared.clone(),
            add: shared.clone(),
            delete: shared.clone(),
            change: shared,
        }
    }
}
