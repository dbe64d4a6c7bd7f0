//! Patient records and intake.
//!
//! The submodules split along the save protocol:
//!
//! - [`onboarding`] — the multi-step intake session (draft, partial create,
//!   merged submit)
//! - [`documents`] — upload gating and the replace-by-kind attachment policy
//!
//! This module holds the persisted [`Patient`] model and the read-side
//! [`PatientDirectory`].

pub mod documents;
pub mod onboarding;

use crate::constants::PATIENTS_TABLE;
use crate::error::ClinicResult;
use chrono::NaiveDate;
use self::documents::Document;
use dpm_backend::{rows_to, Backend, Filter, Order, Query};
use serde::{Deserialize, Serialize};

/// Identifier of a persisted patient record, assigned by the backend on the
/// first partial save. A draft has no `PatientId` until that save succeeds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PatientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The authoritative persisted patient record.
///
/// Only the columns the client renders are modelled; unknown columns in a
/// fetched row are ignored. The record is created by the onboarding
/// session's partial save and mutated by subsequent step saves — never
/// deleted by this module.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl Patient {
    /// Display name, family name last.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Read side of the patient register.
#[derive(Clone, Debug)]
pub struct PatientDirectory {
    backend: Backend,
}

impl PatientDirectory {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Lists patients, optionally narrowed by a case-insensitive search
    /// over first and last name, ordered by family name.
    pub async fn search(&self, term: &str) -> ClinicResult<Vec<Patient>> {
        let mut query =
            Query::table(PATIENTS_TABLE).order(Order::ascending_nulls_last("last_name"));

        let term = term.trim();
        if !term.is_empty() {
            let pattern = format!("%{term}%");
            query = query.filter(Filter::Or(vec![
                Filter::ilike("first_name", pattern.clone()),
                Filter::ilike("last_name", pattern),
            ]));
        }

        let rows = self.backend.database().select(&query).await?;
        Ok(rows_to(PATIENTS_TABLE, rows)?)
    }

    /// Fetches one patient. A missing row is an empty result, not an
    /// error; the page layer decides how to present "not found".
    pub async fn fetch(&self, id: &PatientId) -> ClinicResult<Option<Patient>> {
        let query = Query::table(PATIENTS_TABLE).eq("id", id.as_str());
        let rows = self.backend.database().select(&query).await?;
        let mut patients: Vec<Patient> = rows_to(PATIENTS_TABLE, rows)?;
        Ok(if patients.is_empty() {
            None
        } else {
            Some(patients.swap_remove(0))
        })
    }
}
