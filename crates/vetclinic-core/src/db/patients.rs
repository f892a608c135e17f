//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{PatientRecord, PatientType, Sex};

const SELECT_PATIENT: &str = r#"
    SELECT id, name, type, custom_type, sex, age_years, comment
    FROM app_patients
"#;

impl Database {
    /// Insert a new patient, returning the id assigned by SQLite.
    ///
    /// The record's own `id` is ignored.
    pub fn insert_patient(&self, patient: &PatientRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO app_patients (
                name, type, custom_type, sex, age_years, comment
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                patient.name,
                patient.patient_type.as_symbol(),
                patient.custom_type,
                patient.sex.as_symbol(),
                patient.age_years,
                patient.comment,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite every column of the row with `patient.id`.
    ///
    /// Returns false when no row has that id.
    pub fn replace_patient(&self, patient: &PatientRecord) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE app_patients SET
                name = ?2,
                type = ?3,
                custom_type = ?4,
                sex = ?5,
                age_years = ?6,
                comment = ?7
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.name,
                patient.patient_type.as_symbol(),
                patient.custom_type,
                patient.sex.as_symbol(),
                patient.age_years,
                patient.comment,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a patient. Returns false when no row has that id.
    pub fn delete_patient(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM app_patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by id.
    pub fn get_patient(&self, id: i64) -> DbResult<Option<PatientRecord>> {
        let sql = format!("{SELECT_PATIENT} WHERE id = ?");
        self.conn
            .query_row(&sql, [id], PatientRow::from_row)
            .optional()?
            .map(TryInto::try_into)
            .transpose()
    }

    /// List all patients in insertion order.
    pub fn list_patients(&self) -> DbResult<Vec<PatientRecord>> {
        let sql = format!("{SELECT_PATIENT} ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], PatientRow::from_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// Number of stored patients.
    pub fn count_patients(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM app_patients", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: i64,
    name: String,
    patient_type: String,
    custom_type: Option<String>,
    sex: String,
    age_years: i32,
    comment: Option<String>,
}

impl PatientRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            patient_type: row.get(2)?,
            custom_type: row.get(3)?,
            sex: row.get(4)?,
            age_years: row.get(5)?,
            comment: row.get(6)?,
        })
    }
}

impl TryFrom<PatientRow> for PatientRecord {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let patient_type =
            PatientType::from_symbol(&row.patient_type).ok_or_else(|| DbError::Decode {
                column: "type",
                value: row.patient_type.clone(),
            })?;
        let sex = Sex::from_symbol(&row.sex).ok_or_else(|| DbError::Decode {
            column: "sex",
            value: row.sex.clone(),
        })?;

        Ok(PatientRecord {
            id: row.id,
            name: row.name,
            patient_type,
            custom_type: row.custom_type,
            sex,
            age_years: row.age_years,
            comment: row.comment,
        })
    }
}
