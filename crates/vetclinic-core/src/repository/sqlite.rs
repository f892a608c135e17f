//! SQLite-backed repository with a broadcast live query.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::{PatientRepository, PatientSnapshot, PatientStream, RepoResult, RepositoryError};
use crate::db::Database;
use crate::models::PatientRecord;

/// Repository over the local SQLite database.
///
/// All SQL runs on the blocking pool. The connection lock is held across a
/// write and the re-read that follows it, so subscribers see snapshots in
/// write order.
pub struct SqlitePatientRepository {
    db: Arc<Mutex<Database>>,
    changes: broadcast::Sender<PatientSnapshot>,
}

impl SqlitePatientRepository {
    /// Wrap a database. `capacity` is how many snapshots a slow subscriber may fall behind.
    pub fn new(db: Database, capacity: usize) -> Self {
        Self::from_shared(Arc::new(Mutex::new(db)), capacity)
    }

    /// Wrap a database that is also used elsewhere.
    pub fn from_shared(db: Arc<Mutex<Database>>, capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity.max(1));
        Self { db, changes }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }

    /// Run `op` against the database on the blocking pool.
    async fn with_db<T, F>(&self, op: F) -> RepoResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database, &broadcast::Sender<PatientSnapshot>) -> RepoResult<T>
            + Send
            + 'static,
    {
        let db = Arc::clone(&self.db);
        let changes = self.changes.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db.lock()?;
            op(&guard, &changes)
        })
        .await?
    }
}

/// Re-read the table and push it to every subscriber.
fn publish(db: &Database, changes: &broadcast::Sender<PatientSnapshot>) {
    let snapshot = db.list_patients().map_err(RepositoryError::from);
    if let Err(e) = &snapshot {
        warn!(error = %e, "live patient query failed");
    }
    // No receivers is fine: nobody is watching yet.
    let _ = changes.send(snapshot);
}

#[async_trait]
impl PatientRepository for SqlitePatientRepository {
    async fn observe_all(&self) -> PatientStream {
        // Subscribe before reading so a concurrent write cannot slip between.
        let receiver = self.changes.subscribe();
        let initial = self
            .with_db(|db, _| db.list_patients().map_err(RepositoryError::from))
            .await;
        PatientStream::new(initial, receiver)
    }

    async fn add(&self, patient: PatientRecord) -> RepoResult<i64> {
        self.with_db(move |db, changes| {
            let id = db.insert_patient(&patient)?;
            debug!(id, "patient inserted");
            publish(db, changes);
            Ok(id)
        })
        .await
    }

    async fn remove(&self, id: i64) -> RepoResult<()> {
        self.with_db(move |db, changes| {
            if db.delete_patient(id)? {
                debug!(id, "patient deleted");
                publish(db, changes);
            } else {
                debug!(id, "delete matched no patient");
            }
            Ok(())
        })
        .await
    }

    async fn update(&self, patient: PatientRecord) -> RepoResult<()> {
        self.with_db(move |db, changes| {
            if db.replace_patient(&patient)? {
                debug!(id = patient.id, "patient replaced");
                publish(db, changes);
            } else {
                debug!(id = patient.id, "update matched no patient");
            }
            Ok(())
        })
        .await
    }
}
