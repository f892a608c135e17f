//! Add/edit form input and its validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::patient::{PatientRecord, PatientType, Sex};

/// Maximum number of digits the age field accepts.
const MAX_AGE_DIGITS: usize = 3;

/// Why a form could not be turned into a patient.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Patient name is blank")]
    BlankName,

    #[error("Age must not be negative, got {0}")]
    NegativeAge(i32),

    #[error("Custom type is required when type is OTHER")]
    MissingCustomType,
}

/// Literal field values collected by the add/edit dialog.
///
/// Text fields are kept exactly as typed; trimming happens in [`PatientForm::validate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientForm {
    pub name: String,
    pub patient_type: PatientType,
    pub custom_type: String,
    pub sex: Sex,
    pub age_years: i32,
    pub comment: String,
}

impl PatientForm {
    /// Pre-fill a form for editing an existing patient.
    pub fn from_record(record: &PatientRecord) -> Self {
        Self {
            name: record.name.clone(),
            patient_type: record.patient_type,
            custom_type: record.custom_type.clone().unwrap_or_default(),
            sex: record.sex,
            age_years: record.age_years,
            comment: record.comment.clone().unwrap_or_default(),
        }
    }

    /// Parse the age text field: digits only, at most three, empty means zero.
    pub fn parse_age(text: &str) -> i32 {
        text.chars()
            .filter(char::is_ascii_digit)
            .take(MAX_AGE_DIGITS)
            .collect::<String>()
            .parse()
            .unwrap_or(0)
    }

    /// Trim and check the form.
    ///
    /// A non-`Other` type never carries a custom type, whatever was typed in
    /// the field. A blank comment becomes absent.
    pub fn validate(&self) -> Result<ValidPatient, ValidationError> {
        let name = self.name.trim();
        let custom_type = self.custom_type.trim();
        let comment = self.comment.trim();

        if name.is_empty() {
            return Err(ValidationError::BlankName);
        }
        if self.age_years < 0 {
            return Err(ValidationError::NegativeAge(self.age_years));
        }
        if self.patient_type == PatientType::Other && custom_type.is_empty() {
            return Err(ValidationError::MissingCustomType);
        }

        Ok(ValidPatient {
            name: name.to_string(),
            patient_type: self.patient_type,
            custom_type: (self.patient_type == PatientType::Other)
                .then(|| custom_type.to_string()),
            sex: self.sex,
            age_years: self.age_years,
            comment: (!comment.is_empty()).then(|| comment.to_string()),
        })
    }
}

/// Normalized form content that satisfies every patient invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPatient {
    name: String,
    patient_type: PatientType,
    custom_type: Option<String>,
    sex: Sex,
    age_years: i32,
    comment: Option<String>,
}

impl ValidPatient {
    /// Build a full-replacement record. Pass `0` for a patient not yet stored.
    pub fn into_record(self, id: i64) -> PatientRecord {
        PatientRecord {
            id,
            name: self.name,
            patient_type: self.patient_type,
            custom_type: self.custom_type,
            sex: self.sex,
            age_years: self.age_years,
            comment: self.comment,
        }
    }
}
