//! Owned screen state with a single live-query subscription.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{reduce, Dispatch, Effect, Intent};
use crate::models::{AppState, PatientForm, PatientRecord};
use crate::usecases::{ObservePatients, UseCases};

/// View-model for the patient list screen.
///
/// Subscribes to the patient table once, at construction, and keeps that
/// subscription until dropped. Every state change, whether from the view, the
/// live query or a finished write, goes through one `send_if_modified` call,
/// so updates are serialized.
///
/// Writes never touch `patients` directly; the list only changes when the
/// live query re-emits.
pub struct PatientListStore {
    state: Arc<watch::Sender<AppState>>,
    use_cases: UseCases,
    runtime: Handle,
    observer: JoinHandle<()>,
}

impl PatientListStore {
    /// Create the store and start observing on `runtime`.
    pub fn new(use_cases: UseCases, runtime: Handle) -> Self {
        let (state, _) = watch::channel(AppState::default());
        let state = Arc::new(state);
        let observer = runtime.spawn(observe_patients(
            Arc::clone(&state),
            Arc::clone(&use_cases.observe),
        ));
        Self {
            state,
            use_cases,
            runtime,
            observer,
        }
    }

    /// Read-only stream of snapshots for the view.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Apply a view intent and start its storage write, if any.
    ///
    /// Returns before the write finishes.
    pub fn dispatch(&self, intent: Intent) -> Dispatch {
        debug!(?intent, "dispatch");
        let (effect, outcome) = apply(&self.state, intent);
        if let Dispatch::Rejected(reason) = &outcome {
            debug!(%reason, "form rejected");
        }
        if let Some(effect) = effect {
            self.run_effect(effect);
        }
        outcome
    }

    pub fn open_add(&self) {
        self.dispatch(Intent::OpenAdd);
    }

    pub fn dismiss_add(&self) {
        self.dispatch(Intent::DismissAdd);
    }

    pub fn confirm_add(&self, form: PatientForm) -> Dispatch {
        self.dispatch(Intent::ConfirmAdd(form))
    }

    pub fn open_edit(&self, patient: PatientRecord) {
        self.dispatch(Intent::OpenEdit(patient));
    }

    pub fn dismiss_edit(&self) {
        self.dispatch(Intent::DismissEdit);
    }

    pub fn confirm_edit(&self, id: i64, form: PatientForm) -> Dispatch {
        self.dispatch(Intent::ConfirmEdit { id, form })
    }

    pub fn open_delete(&self, patient: PatientRecord) {
        self.dispatch(Intent::OpenDelete(patient));
    }

    pub fn dismiss_delete(&self) {
        self.dispatch(Intent::DismissDelete);
    }

    pub fn confirm_delete(&self) -> Dispatch {
        self.dispatch(Intent::ConfirmDelete)
    }

    /// Check if the live-query subscription is still running.
    pub fn is_observing(&self) -> bool {
        !self.observer.is_finished()
    }

    fn run_effect(&self, effect: Effect) {
        let state = Arc::clone(&self.state);
        let use_cases = self.use_cases.clone();
        self.runtime.spawn(async move {
            let kind = effect.kind();
            let result = match effect {
                Effect::Add(patient) => use_cases.add.add(patient).await.map(|id| {
                    debug!(id, "patient added");
                }),
                Effect::Update(patient) => use_cases.change.change(patient).await,
                Effect::Remove(id) => use_cases.delete.delete(id).await,
            };
            let completion = match result {
                Ok(()) => Intent::WriteSucceeded(kind),
                Err(e) => {
                    warn!(?kind, error = %e, "patient write failed");
                    Intent::WriteFailed(kind, e.to_string())
                }
            };
            apply(&state, completion);
        });
    }
}

impl Drop for PatientListStore {
    fn drop(&mut self) {
        self.observer.abort();
    }
}

/// The single serialized update path.
fn apply(state: &watch::Sender<AppState>, intent: Intent) -> (Option<Effect>, Dispatch) {
    let mut effect = None;
    let mut outcome = Dispatch::Ignored;
    state.send_if_modified(|current| {
        let transition = reduce(current, intent);
        effect = transition.effect;
        outcome = transition.outcome;
        if transition.state == *current {
            return false;
        }
        *current = transition.state;
        true
    });
    (effect, outcome)
}

/// Long-lived subscription. Not restarted after a failure.
async fn observe_patients(state: Arc<watch::Sender<AppState>>, observe: Arc<dyn ObservePatients>) {
    apply(&state, Intent::StreamStarted);
    let mut stream = observe.observe().await;
    while let Some(snapshot) = stream.next().await {
        match snapshot {
            Ok(patients) => {
                debug!(count = patients.len(), "patient snapshot");
                apply(&state, Intent::PatientsLoaded(patients));
            }
            Err(e) => {
                warn!(error = %e, "patient observation failed");
                apply(&state, Intent::StreamFailed(e.to_string()));
                break;
            }
        }
    }
    debug!("patient observation ended");
}
