//! Patient list screen logic.
//!
//! [`reduce`] is a pure function from the current [`AppState`] and one
//! [`Intent`] to the next state plus at most one storage [`Effect`].
//! [`PatientListStore`] owns the state, feeds it live-query snapshots and
//! runs the effects.
//!
//! ```text
//! view intent ──► reduce ──► Effect ──► use-case ──► repository ──► SQLite
//!                   ▲                                                  │
//!                   └──── PatientsLoaded / Write* ◄── live query ◄─────┘
//! ```

mod store;

pub use store::PatientListStore;

use crate::models::{AppState, PatientForm, PatientRecord, ValidationError};

/// Everything that can change the screen state.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    OpenAdd,
    DismissAdd,
    ConfirmAdd(PatientForm),
    OpenEdit(PatientRecord),
    DismissEdit,
    ConfirmEdit { id: i64, form: PatientForm },
    OpenDelete(PatientRecord),
    DismissDelete,
    ConfirmDelete,

    /// Observation (re)started
    StreamStarted,
    /// Live query delivered a full table
    PatientsLoaded(Vec<PatientRecord>),
    /// Live query failed; the stream is over
    StreamFailed(String),

    WriteSucceeded(EffectKind),
    WriteFailed(EffectKind, String),
}

/// Storage call requested by a confirmed dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Add(PatientRecord),
    Update(PatientRecord),
    Remove(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Add,
    Update,
    Remove,
}

impl Effect {
    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::Add(_) => EffectKind::Add,
            Effect::Update(_) => EffectKind::Update,
            Effect::Remove(_) => EffectKind::Remove,
        }
    }
}

/// What happened to a dispatched intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Applied,
    /// Nothing to act on, e.g. confirm-delete with no patient selected
    Ignored,
    /// Form did not validate; state is untouched and no write was made
    Rejected(ValidationError),
}

/// Result of one reduction step.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: AppState,
    pub effect: Option<Effect>,
    pub outcome: Dispatch,
}

impl Transition {
    fn applied(state: AppState) -> Self {
        Self {
            state,
            effect: None,
            outcome: Dispatch::Applied,
        }
    }

    fn effect(state: AppState, effect: Effect) -> Self {
        Self {
            state,
            effect: Some(effect),
            outcome: Dispatch::Applied,
        }
    }

    fn unchanged(state: &AppState, outcome: Dispatch) -> Self {
        Self {
            state: state.clone(),
            effect: None,
            outcome,
        }
    }
}

/// Compute the next state for `intent`.
///
/// Confirm intents never close their dialog here; the dialog closes on
/// [`Intent::WriteSucceeded`], once storage has accepted the write.
pub fn reduce(state: &AppState, intent: Intent) -> Transition {
    let mut next = state.clone();
    match intent {
        Intent::OpenAdd => {
            next.show_add_dialog = true;
            Transition::applied(next)
        }
        Intent::DismissAdd => {
            next.show_add_dialog = false;
            Transition::applied(next)
        }
        Intent::ConfirmAdd(form) => match form.validate() {
            Ok(valid) => Transition::effect(next, Effect::Add(valid.into_record(0))),
            Err(e) => Transition::unchanged(state, Dispatch::Rejected(e)),
        },

        Intent::OpenEdit(patient) => {
            next.editing_patient = Some(patient);
            Transition::applied(next)
        }
        Intent::DismissEdit => {
            next.editing_patient = None;
            Transition::applied(next)
        }
        Intent::ConfirmEdit { id, form } => match form.validate() {
            Ok(valid) => Transition::effect(next, Effect::Update(valid.into_record(id))),
            Err(e) => Transition::unchanged(state, Dispatch::Rejected(e)),
        },

        Intent::OpenDelete(patient) => {
            next.deleting_patient = Some(patient);
            Transition::applied(next)
        }
        Intent::DismissDelete => {
            next.deleting_patient = None;
            Transition::applied(next)
        }
        Intent::ConfirmDelete => match &state.deleting_patient {
            Some(patient) => Transition::effect(next, Effect::Remove(patient.id)),
            None => Transition::unchanged(state, Dispatch::Ignored),
        },

        Intent::StreamStarted => {
            next.is_loading = true;
            next.error = None;
            Transition::applied(next)
        }
        Intent::PatientsLoaded(patients) => {
            next.patients = patients;
            next.is_loading = false;
            next.error = None;
            Transition::applied(next)
        }
        Intent::StreamFailed(message) => {
            // Keep the last known list on screen.
            next.is_loading = false;
            next.error = Some(message);
            Transition::applied(next)
        }

        Intent::WriteSucceeded(kind) => {
            match kind {
                EffectKind::Add => next.show_add_dialog = false,
                EffectKind::Update => next.editing_patient = None,
                EffectKind::Remove => next.deleting_patient = None,
            }
            Transition::applied(next)
        }
        Intent::WriteFailed(_, message) => {
            next.error = Some(message);
            Transition::applied(next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PatientType, Sex};

    fn loaded(patients: Vec<PatientRecord>) -> AppState {
        reduce(&AppState::default(), Intent::PatientsLoaded(patients)).state
    }

    fn rex(id: i64) -> PatientRecord {
        PatientRecord {
            id,
            name: "Rex".into(),
            patient_type: PatientType::Dog,
            custom_type: None,
            sex: Sex::Male,
            age_years: 3,
            comment: None,
        }
    }

    fn rex_form() -> PatientForm {
        PatientForm {
            name: " Rex ".into(),
            patient_type: PatientType::Dog,
            custom_type: String::new(),
            sex: Sex::Male,
            age_years: 3,
            comment: String::new(),
        }
    }

    #[test]
    fn test_add_dialog_toggles() {
        let state = loaded(vec![]);
        let opened = reduce(&state, Intent::OpenAdd).state;
        assert!(opened.show_add_dialog);
        let closed = reduce(&opened, Intent::DismissAdd).state;
        assert!(!closed.show_add_dialog);
    }

    #[test]
    fn test_confirm_add_emits_normalized_record() {
        let state = reduce(&loaded(vec![]), Intent::OpenAdd).state;
        let t = reduce(&state, Intent::ConfirmAdd(rex_form()));

        assert_eq!(t.outcome, Dispatch::Applied);
        assert_eq!(t.effect, Some(Effect::Add(rex(0))));
        // Dialog stays open until the write completes.
        assert!(t.state.show_add_dialog);

        let done = reduce(&t.state, Intent::WriteSucceeded(EffectKind::Add)).state;
        assert!(!done.show_add_dialog);
    }

    #[test]
    fn test_invalid_add_is_rejected_without_effect() {
        let state = reduce(&loaded(vec![]), Intent::OpenAdd).state;
        let form = PatientForm {
            name: String::new(),
            patient_type: PatientType::Cat,
            ..Default::default()
        };
        let t = reduce(&state, Intent::ConfirmAdd(form));

        assert_eq!(t.outcome, Dispatch::Rejected(ValidationError::BlankName));
        assert_eq!(t.effect, None);
        assert_eq!(t.state, state);
        assert!(t.state.show_add_dialog);
    }

    #[test]
    fn test_confirm_edit_replaces_whole_record() {
        let state = reduce(&loaded(vec![rex(5)]), Intent::OpenEdit(rex(5))).state;
        assert_eq!(state.editing_patient, Some(rex(5)));

        let form = PatientForm {
            name: "Kesha".into(),
            patient_type: PatientType::Other,
            custom_type: " Попугай ".into(),
            sex: Sex::Unknown,
            age_years: 1,
            comment: "talks".into(),
        };
        let t = reduce(&state, Intent::ConfirmEdit { id: 5, form });

        assert_eq!(
            t.effect,
            Some(Effect::Update(PatientRecord {
                id: 5,
                name: "Kesha".into(),
                patient_type: PatientType::Other,
                custom_type: Some("Попугай".into()),
                sex: Sex::Unknown,
                age_years: 1,
                comment: Some("talks".into()),
            }))
        );

        let done = reduce(&t.state, Intent::WriteSucceeded(EffectKind::Update)).state;
        assert!(done.editing_patient.is_none());
    }

    #[test]
    fn test_invalid_edit_keeps_dialog() {
        let state = reduce(&loaded(vec![rex(5)]), Intent::OpenEdit(rex(5))).state;
        let mut form = rex_form();
        form.age_years = -3;
        let t = reduce(&state, Intent::ConfirmEdit { id: 5, form });

        assert_eq!(t.outcome, Dispatch::Rejected(ValidationError::NegativeAge(-3)));
        assert_eq!(t.state.editing_patient, Some(rex(5)));
    }

    #[test]
    fn test_confirm_delete_uses_selected_patient() {
        let state = reduce(&loaded(vec![rex(9)]), Intent::OpenDelete(rex(9))).state;
        let t = reduce(&state, Intent::ConfirmDelete);
        assert_eq!(t.effect, Some(Effect::Remove(9)));

        let done = reduce(&t.state, Intent::WriteSucceeded(EffectKind::Remove)).state;
        assert!(done.deleting_patient.is_none());
    }

    #[test]
    fn test_confirm_delete_without_selection_is_ignored() {
        let state = loaded(vec![rex(9)]);
        let t = reduce(&state, Intent::ConfirmDelete);
        assert_eq!(t.outcome, Dispatch::Ignored);
        assert_eq!(t.effect, None);
        assert_eq!(t.state, state);
    }

    #[test]
    fn test_dismiss_edit_and_delete() {
        let mut state = loaded(vec![rex(1)]);
        state = reduce(&state, Intent::OpenEdit(rex(1))).state;
        state = reduce(&state, Intent::OpenDelete(rex(1))).state;

        state = reduce(&state, Intent::DismissEdit).state;
        assert!(state.editing_patient.is_none());
        assert!(state.deleting_patient.is_some());

        state = reduce(&state, Intent::DismissDelete).state;
        assert!(!state.has_open_dialog());
    }

    #[test]
    fn test_stream_lifecycle() {
        let mut state = AppState::default();
        assert!(state.is_loading);

        state = reduce(&state, Intent::PatientsLoaded(vec![rex(1)])).state;
        assert!(!state.is_loading);
        assert_eq!(state.patients.len(), 1);

        state = reduce(&state, Intent::StreamFailed("disk gone".into())).state;
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("disk gone"));
        assert_eq!(state.patients, vec![rex(1)], "stale list is kept");

        state = reduce(&state, Intent::StreamStarted).state;
        assert!(state.is_loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_successful_emission_clears_error() {
        let mut state = reduce(&loaded(vec![]), Intent::StreamFailed("x".into())).state;
        state = reduce(&state, Intent::PatientsLoaded(vec![])).state;
        assert!(state.error.is_none());
    }

    #[test]
    fn test_write_failure_surfaces_and_keeps_dialog() {
        let state = reduce(&loaded(vec![]), Intent::OpenAdd).state;
        let state = reduce(
            &state,
            Intent::WriteFailed(EffectKind::Add, "database is locked".into()),
        )
        .state;

        assert!(state.show_add_dialog);
        assert_eq!(state.error.as_deref(), Some("database is locked"));
    }
}
