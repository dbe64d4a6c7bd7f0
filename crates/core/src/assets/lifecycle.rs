//! Asset lifecycle operations.
//!
//! The mutating half of the asset register. Mark-serviced and dispose run
//! through named server-side procedures — the backend owns the next-due
//! computation and the append-only history rows — while interval changes
//! and registration are plain table writes. Every operation re-checks its
//! client-side precondition before any remote call and requires an
//! authenticated session.

use crate::assets::{
    Asset, AssetCategory, AssetId, DisposalLogEntry, DisposalReason, MaintenanceLogEntry,
    MaintenanceUnit,
};
use crate::auth::require_session;
use crate::constants::{ASSETS_TABLE, DISPOSAL_LOG_TABLE, MAINTENANCE_LOG_TABLE};
use crate::error::{ClinicError, ClinicResult};
use crate::shared::{date_string, json_object};
use chrono::NaiveDate;
use dpm_backend::{row_to, rows_to, Backend, Order, Query};
use dpm_forms::normalise::{empty_to_none, parse_money};
use dpm_forms::FieldErrors;
use serde_json::json;

/// Input for registering a new asset.
#[derive(Clone, Debug)]
pub struct NewAsset {
    pub name: String,
    pub serial_number: String,
    pub category: AssetCategory,
    pub purchase_date: Option<NaiveDate>,
    /// Money text as typed; blank or unparseable becomes 0.
    pub purchase_cost: String,
    pub warranty_expiry_date: Option<NaiveDate>,
}

/// Input for the mark-serviced dialog.
#[derive(Clone, Debug)]
pub struct ServiceInput {
    pub serviced_on: NaiveDate,
    /// Money text as typed; blank or unparseable becomes 0.
    pub cost: String,
    pub notes: String,
}

/// Input for the dispose dialog.
#[derive(Clone, Debug)]
pub struct DisposeInput {
    pub disposal_date: Option<NaiveDate>,
    pub reason: DisposalReason,
    /// Money text as typed; blank or unparseable becomes 0.
    pub salvage_value: String,
    pub notes: String,
}

/// Mutating operations on the asset register.
#[derive(Clone, Debug)]
pub struct AssetService {
    backend: Backend,
}

impl AssetService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Registers a new asset in `Active` status.
    ///
    /// # Errors
    ///
    /// [`ClinicError::DuplicateValue`] naming `serial_number` when the
    /// serial is already registered.
    pub async fn register(&self, input: &NewAsset) -> ClinicResult<Asset> {
        let mut errors = FieldErrors::new();
        if input.name.trim().is_empty() {
            errors.push("name", "Asset name is required");
        }
        if !errors.is_empty() {
            return Err(ClinicError::Validation(errors));
        }

        require_session(&self.backend).await?;

        let row = json_object(json!({
            "name": input.name.trim(),
            "serial_number": empty_to_none(&input.serial_number),
            "category": input.category.tag(),
            "status": "Active",
            "purchase_date": input.purchase_date.map(date_string),
            "purchase_cost": parse_money(&input.purchase_cost),
            "warranty_expiry_date": input.warranty_expiry_date.map(date_string),
        }));

        let stored = self.backend.database().insert(ASSETS_TABLE, row).await?;
        Ok(row_to(ASSETS_TABLE, stored)?)
    }

    /// Marks an asset as serviced.
    ///
    /// Valid only when the maintenance interval is configured with a
    /// positive value; otherwise the action is blocked client-side and no
    /// remote call is made. The procedure computes the new next-due date
    /// (interval added to the service date) and appends the maintenance
    /// log entry capturing the previous and new due dates. Status is
    /// unchanged.
    pub async fn mark_serviced(&self, asset: &Asset, input: &ServiceInput) -> ClinicResult<()> {
        if !asset.can_mark_serviced() {
            let mut errors = FieldErrors::new();
            errors.push(
                "maintenance_interval_value",
                "Set a maintenance interval before marking this asset as serviced",
            );
            return Err(ClinicError::Validation(errors));
        }

        require_session(&self.backend).await?;

        self.backend
            .database()
            .rpc(
                "mark_asset_as_serviced",
                json!({
                    "asset_id": asset.id.as_str(),
                    "serviced_on": date_string(input.serviced_on),
                    "cost": parse_money(&input.cost),
                    "notes": empty_to_none(&input.notes),
                }),
            )
            .await?;

        tracing::debug!(asset_id = %asset.id, "asset marked as serviced");
        Ok(())
    }

    /// Disposes of an asset. Irreversible within this module.
    ///
    /// Requires a disposal date; the salvage text is normalised (blank or
    /// unparseable becomes 0). The procedure flips status to `Disposed`,
    /// records the disposal fields once and appends the disposal log entry.
    pub async fn dispose(&self, asset: &Asset, input: &DisposeInput) -> ClinicResult<()> {
        let mut errors = FieldErrors::new();
        if asset.status.is_out_of_service() {
            errors.push("status", "This asset is already out of service");
        }
        let Some(disposal_date) = input.disposal_date else {
            errors.push("disposal_date", "Disposal date is required");
            return Err(ClinicError::Validation(errors));
        };
        if !errors.is_empty() {
            return Err(ClinicError::Validation(errors));
        }

        require_session(&self.backend).await?;

        self.backend
            .database()
            .rpc(
                "dispose_asset",
                json!({
                    "asset_id": asset.id.as_str(),
                    "disposal_date": date_string(disposal_date),
                    "reason": input.reason.tag(),
                    "salvage_value": parse_money(&input.salvage_value),
                    "notes": empty_to_none(&input.notes),
                }),
            )
            .await?;

        tracing::debug!(asset_id = %asset.id, reason = input.reason.tag(), "asset disposed");
        Ok(())
    }

    /// Updates the maintenance interval. Pure metadata change: the next-due
    /// date is **not** recomputed here — an interval change affects future
    /// schedules from the next mark-serviced event, not past ones.
    pub async fn set_maintenance_interval(
        &self,
        asset_id: &AssetId,
        value: i64,
        unit: MaintenanceUnit,
    ) -> ClinicResult<()> {
        if value <= 0 {
            let mut errors = FieldErrors::new();
            errors.push(
                "maintenance_interval_value",
                "Interval must be a positive whole number",
            );
            return Err(ClinicError::Validation(errors));
        }

        require_session(&self.backend).await?;

        let patch = json_object(json!({
            "maintenance_interval_value": value,
            "maintenance_interval_unit": unit.tag(),
        }));
        self.backend
            .database()
            .update(ASSETS_TABLE, patch, "id", &json!(asset_id.as_str()))
            .await?;
        Ok(())
    }

    /// Maintenance history for one asset, newest first.
    pub async fn maintenance_history(
        &self,
        asset_id: &AssetId,
    ) -> ClinicResult<Vec<MaintenanceLogEntry>> {
        let query = Query::table(MAINTENANCE_LOG_TABLE)
            .eq("asset_id", asset_id.as_str())
            .order(Order::descending_nulls_first("serviced_on"));
        let rows = self.backend.database().select(&query).await?;
        Ok(rows_to(MAINTENANCE_LOG_TABLE, rows)?)
    }

    /// Disposal history for one asset, newest first.
    pub async fn disposal_history(
        &self,
        asset_id: &AssetId,
    ) -> ClinicResult<Vec<DisposalLogEntry>> {
        let query = Query::table(DISPOSAL_LOG_TABLE)
            .eq("asset_id", asset_id.as_str())
            .order(Order::descending_nulls_first("disposal_date"));
        let rows = self.backend.database().select(&query).await?;
        Ok(rows_to(DISPOSAL_LOG_TABLE, rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetStatus;
    use dpm_backend::memory::MutationKind;
    use dpm_backend::MemoryBackend;
    use serde_json::Value;

    fn seed_asset(memory: &MemoryBackend, value: Value) -> Asset {
        let row = match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        memory.seed(ASSETS_TABLE, vec![row.clone()]);
        serde_json::from_value(Value::Object(row)).expect("asset decodes")
    }

    fn autoclave(memory: &MemoryBackend, interval: Option<(i64, &str)>) -> Asset {
        let mut row = json!({
            "id": "a1",
            "name": "Autoclave",
            "serial_number": "AC-100",
            "category": "Dental Equipment",
            "status": "Active",
            "next_maintenance_due_date": "2026-02-01",
        });
        if let Some((value, unit)) = interval {
            row["maintenance_interval_value"] = json!(value);
            row["maintenance_interval_unit"] = json!(unit);
        }
        seed_asset(memory, row)
    }

    fn rpc_calls(memory: &MemoryBackend) -> Vec<String> {
        memory
            .mutations()
            .into_iter()
            .filter_map(|m| match m.kind {
                MutationKind::Rpc(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn mark_serviced_is_blocked_without_a_positive_interval() {
        for interval in [None, Some((0, "months")), Some((-2, "months"))] {
            let memory = MemoryBackend::new();
            memory.sign_in("manager@clinic.example");
            let service = AssetService::new(memory.handle());
            let asset = autoclave(&memory, interval);

            let err = service
                .mark_serviced(
                    &asset,
                    &ServiceInput {
                        serviced_on: "2026-03-15".parse().expect("valid date"),
                        cost: "120".into(),
                        notes: "".into(),
                    },
                )
                .await
                .expect_err("precondition should block");

            assert!(matches!(err, ClinicError::Validation(_)));
            assert!(rpc_calls(&memory).is_empty(), "no RPC may be issued");
        }
    }

    #[tokio::test]
    async fn mark_serviced_runs_the_procedure_and_history_grows() {
        let memory = MemoryBackend::new();
        memory.sign_in("manager@clinic.example");
        let service = AssetService::new(memory.handle());
        let asset = autoclave(&memory, Some((6, "weeks")));

        service
            .mark_serviced(
                &asset,
                &ServiceInput {
                    serviced_on: "2026-03-15".parse().expect("valid date"),
                    cost: "£120.50".into(),
                    notes: "replaced gasket".into(),
                },
            )
            .await
            .expect("mark serviced succeeds");

        assert_eq!(rpc_calls(&memory), vec!["mark_asset_as_serviced"]);

        let row = &memory.rows(ASSETS_TABLE)[0];
        assert_eq!(
            row.get("next_maintenance_due_date"),
            Some(&json!("2026-04-26")),
            "6 weeks after the service date"
        );
        assert_eq!(row.get("status"), Some(&json!("Active")), "status unchanged");

        let history = service
            .maintenance_history(&asset.id)
            .await
            .expect("history fetch succeeds");
        assert_eq!(history.len(), 1);
        assert_eq!(
            history[0].previous_due_date,
            Some("2026-02-01".parse().expect("valid date"))
        );
        assert_eq!(
            history[0].new_due_date,
            Some("2026-04-26".parse().expect("valid date"))
        );
        assert_eq!(history[0].cost, Some(120.50));
    }

    #[tokio::test]
    async fn dispose_requires_a_date_and_defaults_salvage_to_zero() {
        let memory = MemoryBackend::new();
        memory.sign_in("manager@clinic.example");
        let service = AssetService::new(memory.handle());
        let asset = autoclave(&memory, None);

        let err = service
            .dispose(
                &asset,
                &DisposeInput {
                    disposal_date: None,
                    reason: DisposalReason::Scrapped,
                    salvage_value: "".into(),
                    notes: "".into(),
                },
            )
            .await
            .expect_err("missing date should fail");
        assert!(matches!(err, ClinicError::Validation(_)));
        assert!(rpc_calls(&memory).is_empty());

        service
            .dispose(
                &asset,
                &DisposeInput {
                    disposal_date: Some("2026-05-01".parse().expect("valid date")),
                    reason: DisposalReason::Scrapped,
                    salvage_value: "not a number".into(),
                    notes: "".into(),
                },
            )
            .await
            .expect("dispose succeeds");

        let row = &memory.rows(ASSETS_TABLE)[0];
        assert_eq!(row.get("status"), Some(&json!("Disposed")));
        assert_eq!(row.get("salvage_value"), Some(&json!(0.0)));
        assert_eq!(row.get("disposal_reason"), Some(&json!("Scrapped")));

        let history = service
            .disposal_history(&asset.id)
            .await
            .expect("history fetch succeeds");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reason, DisposalReason::Scrapped);
    }

    #[tokio::test]
    async fn disposed_asset_cannot_be_disposed_again_client_side() {
        let memory = MemoryBackend::new();
        memory.sign_in("manager@clinic.example");
        let service = AssetService::new(memory.handle());
        let asset = seed_asset(
            &memory,
            json!({
                "id": "a2",
                "name": "Old Compressor",
                "category": "Other",
                "status": "Disposed",
            }),
        );

        let err = service
            .dispose(
                &asset,
                &DisposeInput {
                    disposal_date: Some("2026-05-01".parse().expect("valid date")),
                    reason: DisposalReason::Sold,
                    salvage_value: "50".into(),
                    notes: "".into(),
                },
            )
            .await
            .expect_err("double dispose blocked");
        assert!(matches!(err, ClinicError::Validation(_)));
        assert!(rpc_calls(&memory).is_empty());
    }

    #[tokio::test]
    async fn set_interval_does_not_recompute_the_next_due_date() {
        let memory = MemoryBackend::new();
        memory.sign_in("manager@clinic.example");
        let service = AssetService::new(memory.handle());
        let asset = autoclave(&memory, Some((3, "months")));

        service
            .set_maintenance_interval(&asset.id, 12, MaintenanceUnit::Months)
            .await
            .expect("interval update succeeds");

        let row = &memory.rows(ASSETS_TABLE)[0];
        assert_eq!(row.get("maintenance_interval_value"), Some(&json!(12)));
        assert_eq!(row.get("maintenance_interval_unit"), Some(&json!("months")));
        assert_eq!(
            row.get("next_maintenance_due_date"),
            Some(&json!("2026-02-01")),
            "interval changes affect future schedules only"
        );
    }

    #[tokio::test]
    async fn set_interval_rejects_non_positive_values() {
        let memory = MemoryBackend::new();
        memory.sign_in("manager@clinic.example");
        let service = AssetService::new(memory.handle());

        let err = service
            .set_maintenance_interval(&AssetId::new("a1"), 0, MaintenanceUnit::Days)
            .await
            .expect_err("zero interval rejected");
        assert!(matches!(err, ClinicError::Validation(_)));
        assert!(memory.mutations().is_empty());
    }

    #[tokio::test]
    async fn register_translates_duplicate_serial_numbers() {
        let memory = MemoryBackend::new();
        memory.add_unique(ASSETS_TABLE, "serial_number");
        memory.sign_in("manager@clinic.example");
        let service = AssetService::new(memory.handle());

        let input = NewAsset {
            name: "Intraoral Scanner".into(),
            serial_number: "IOS-7".into(),
            category: AssetCategory::Imaging,
            purchase_date: Some("2026-01-10".parse().expect("valid date")),
            purchase_cost: "£18,000".into(),
            warranty_expiry_date: None,
        };

        let asset = service.register(&input).await.expect("first register succeeds");
        assert_eq!(asset.status, AssetStatus::Active);
        assert_eq!(asset.purchase_cost, Some(18000.0));

        let err = service
            .register(&input)
            .await
            .expect_err("duplicate serial should fail");
        match err {
            ClinicError::DuplicateValue { field, .. } => {
                assert_eq!(field.as_deref(), Some("serial_number"));
            }
            other => panic!("expected DuplicateValue, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_requires_a_session() {
        let memory = MemoryBackend::new();
        let service = AssetService::new(memory.handle());

        let err = service
            .register(&NewAsset {
                name: "Curing Light".into(),
                serial_number: "".into(),
                category: AssetCategory::DentalEquipment,
                purchase_date: None,
                purchase_cost: "".into(),
                warranty_expiry_date: None,
            })
            .await
            .expect_err("no session should fail");
        assert!(matches!(err, ClinicError::Unauthenticated));
        assert!(memory.mutations().is_empty());
    }
}
