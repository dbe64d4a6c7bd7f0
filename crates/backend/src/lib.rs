//! # DPM Backend
//!
//! Contract layer between the clinic module and its hosted backend. This
//! crate owns:
//!
//! - the typed [`Query`] description and its builder
//! - the service traits the rest of the workspace consumes:
//!   [`Database`], [`ObjectStore`], [`AuthProvider`] and [`Realtime`]
//! - the [`BackendError`] taxonomy, including unique-violation detection
//! - the [`MemoryBackend`] reference implementation used by tests and
//!   local development
//!
//! **No business logic**: validation, onboarding sequencing and lifecycle
//! rules belong in `dpm-core`; this crate only describes and simulates the
//! external collaborator.

mod client;
mod error;
pub mod memory;
mod query;

pub use client::{
    AuthProvider, Backend, ChangeEvent, ChangeKind, Database, ObjectStore, Realtime, Row, Session,
    Subscription,
};
pub use error::{BackendError, BackendResult};
pub use memory::MemoryBackend;
pub use query::{Filter, Order, Query};

use serde::de::DeserializeOwned;

/// Decodes fetched rows into a typed collection.
///
/// # Errors
///
/// Returns [`BackendError::RowDecode`] naming the table when any row does
/// not match the target shape.
pub fn rows_to<T: DeserializeOwned>(table: &str, rows: Vec<Row>) -> BackendResult<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(serde_json::Value::Object(row)).map_err(|source| {
                BackendError::RowDecode {
                    table: table.to_string(),
                    source,
                }
            })
        })
        .collect()
}

/// Decodes a single row into a typed value.
///
/// # Errors
///
/// Returns [`BackendError::RowDecode`] naming the table on shape mismatch.
pub fn row_to<T: DeserializeOwned>(table: &str, row: Row) -> BackendResult<T> {
    serde_json::from_value(serde_json::Value::Object(row)).map_err(|source| {
        BackendError::RowDecode {
            table: table.to_string(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        id: String,
        name: String,
    }

    #[test]
    fn rows_decode_into_typed_values() {
        let row = match json!({ "id": "r1", "name": "Scaler" }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };

        let decoded: Vec<Named> = rows_to("assets", vec![row]).expect("decode succeeds");
        assert_eq!(
            decoded,
            vec![Named {
                id: "r1".into(),
                name: "Scaler".into()
            }]
        );
    }

    #[test]
    fn decode_failure_names_the_table() {
        let row = match json!({ "id": 42 }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };

        let err = row_to::<Named>("assets", row).expect_err("shape mismatch");
        assert!(err.to_string().contains("assets"));
    }
}
