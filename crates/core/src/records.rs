//! Medical-record display models.
//!
//! Record descriptions arrive as loosely-shaped JSON accumulated over years
//! of differently-versioned writers. Rather than key-sniffing, the payload
//! is parsed into a tagged union keyed by an explicit `kind` discriminant;
//! anything that does not match any variant lands in the freeform fallback.
//! Parsing never fails on the read path — unreadable history is still
//! history.

use crate::constants::MEDICAL_RECORDS_TABLE;
use crate::error::ClinicResult;
use crate::patients::PatientId;
use chrono::{DateTime, Utc};
use dpm_backend::{rows_to, Backend, Order, Query};
use serde::{Deserialize, Serialize};

/// Structured content of one medical record entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordDetail {
    /// A clinical examination.
    Examination {
        #[serde(default)]
        teeth: Vec<String>,
        #[serde(default)]
        findings: Option<String>,
        #[serde(default)]
        recommendations: Option<String>,
    },
    /// A performed procedure.
    Procedure {
        name: String,
        #[serde(default)]
        tooth: Option<String>,
        #[serde(default)]
        anaesthetic: Option<String>,
        #[serde(default)]
        notes: Option<String>,
    },
    /// A prescription issued during the visit.
    Prescription {
        medication: String,
        #[serde(default)]
        dosage: Option<String>,
        #[serde(default)]
        duration: Option<String>,
    },
    /// An imaging study (x-ray, CBCT, …).
    Imaging {
        modality: String,
        #[serde(default)]
        region: Option<String>,
        #[serde(default)]
        impression: Option<String>,
    },
    /// A plain clinical note.
    Note { text: String },
    /// Fallback for content no variant matches.
    Freeform { text: String },
}

impl RecordDetail {
    /// Parses a raw description. Unparseable content becomes
    /// [`RecordDetail::Freeform`] carrying the raw text — never an error.
    pub fn parse(raw: &str) -> RecordDetail {
        match serde_json::from_str::<RecordDetail>(raw) {
            Ok(detail) => detail,
            Err(_) => RecordDetail::Freeform {
                text: raw.to_string(),
            },
        }
    }
}

/// A persisted medical-record row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: String,
    pub patient_id: PatientId,
    #[serde(default)]
    pub title: Option<String>,
    /// Raw description payload; parse with [`MedicalRecord::detail`].
    pub description: String,
    pub recorded_at: DateTime<Utc>,
}

impl MedicalRecord {
    pub fn detail(&self) -> RecordDetail {
        RecordDetail::parse(&self.description)
    }
}

/// Read side of a patient's medical history.
#[derive(Clone, Debug)]
pub struct MedicalRecordService {
    backend: Backend,
}

impl MedicalRecordService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// A patient's records, newest first.
    pub async fn history(&self, patient_id: &PatientId) -> ClinicResult<Vec<MedicalRecord>> {
        let query = Query::table(MEDICAL_RECORDS_TABLE)
            .eq("patient_id", patient_id.as_str())
            .order(Order::descending_nulls_first("recorded_at"));
        let rows = self.backend.database().select(&query).await?;
        Ok(rows_to(MEDICAL_RECORDS_TABLE, rows)?)
    }
}
