//! UI-facing screen state.

use serde::{Deserialize, Serialize};

use super::patient::PatientRecord;

/// Snapshot rendered by the patient list screen.
///
/// Owned by [`crate::reducer::PatientListStore`]; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppState {
    /// Patients in storage order
    pub patients: Vec<PatientRecord>,
    pub show_add_dialog: bool,
    /// Target of the open edit dialog
    pub editing_patient: Option<PatientRecord>,
    /// Target of the open delete confirmation
    pub deleting_patient: Option<PatientRecord>,
    /// True until the first snapshot arrives
    pub is_loading: bool,
    /// Message for the user, e.g. a failed live query
    pub error: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            patients: Vec::new(),
            show_add_dialog: false,
            editing_patient: None,
            deleting_patient: None,
            is_loading: true,
            error: None,
        }
    }
}

impl AppState {
    /// Check if any dialog is open.
    pub fn has_open_dialog(&self) -> bool {
        self.show_add_dialog || self.editing_patient.is_some() || self.deleting_patient.is_some()
    }

    /// Check if the list should show its empty placeholder.
    pub fn is_empty(&self) -> bool {
        !self.is_loading && self.patients.is_empty()
    }
}
