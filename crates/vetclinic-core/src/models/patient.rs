//! Patient models.

use serde::{Deserialize, Serialize};

/// Kind of animal. Stored as its symbol (`"CAT"`, `"DOG"`, ...).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatientType {
    Cat,
    Dog,
    Bird,
    Rabbit,
    #[default]
    Other,
}

impl PatientType {
    /// Every variant in picker order.
    pub const ALL: [PatientType; 5] = [
        PatientType::Cat,
        PatientType::Dog,
        PatientType::Bird,
        PatientType::Rabbit,
        PatientType::Other,
    ];

    /// Stored symbol.
    pub fn as_symbol(&self) -> &'static str {
        match self {
            PatientType::Cat => "CAT",
            PatientType::Dog => "DOG",
            PatientType::Bird => "BIRD",
            PatientType::Rabbit => "RABBIT",
            PatientType::Other => "OTHER",
        }
    }

    /// Exact-case lookup of a stored symbol.
    pub fn from_symbol(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_symbol() == s)
    }

    /// Label shown in the clinic UI.
    pub fn label(&self) -> &'static str {
        match self {
            PatientType::Cat => "Кот",
            PatientType::Dog => "Собака",
            PatientType::Bird => "Птица",
            PatientType::Rabbit => "Кролик",
            PatientType::Other => "Другое",
        }
    }
}

/// Patient sex. Stored as its symbol (`"MALE"`, `"FEMALE"`, `"UNKNOWN"`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Sex {
    pub const ALL: [Sex; 3] = [Sex::Male, Sex::Female, Sex::Unknown];

    pub fn as_symbol(&self) -> &'static str {
        match self {
            Sex::Male => "MALE",
            Sex::Female => "FEMALE",
            Sex::Unknown => "UNKNOWN",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|x| x.as_symbol() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Самец",
            Sex::Female => "Самка",
            Sex::Unknown => "Не указан",
        }
    }
}

/// A clinic patient.
///
/// `id` is assigned by the storage engine on insert; a record that has not
/// been saved yet carries `0`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientRecord {
    pub id: i64,
    pub name: String,
    pub patient_type: PatientType,
    /// Free-text species, only meaningful for [`PatientType::Other`]
    pub custom_type: Option<String>,
    pub sex: Sex,
    pub age_years: i32,
    pub comment: Option<String>,
}

impl PatientRecord {
    /// Create an unsaved patient with required fields.
    pub fn new(name: String, patient_type: PatientType) -> Self {
        Self {
            id: 0,
            name,
            patient_type,
            ..Default::default()
        }
    }

    /// Check if the storage engine has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }

    /// Species text for list rows: the custom type for `Other`, the type label otherwise.
    pub fn species_label(&self) -> String {
        match self.patient_type {
            PatientType::Other => self
                .custom_type
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(PatientType::Other.label())
                .to_string(),
            other => other.label().to_string(),
        }
    }

    /// One-line description, e.g. `Собака • Самец • 3 лет`.
    pub fn summary_line(&self) -> String {
        format!(
            "{} • {} • {} лет",
            self.species_label(),
            self.sex.label(),
            self.age_years
        )
    }
}
