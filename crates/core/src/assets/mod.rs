//! Clinic equipment (asset) tracking.
//!
//! - [`lifecycle`] — the service/dispose/set-interval operations
//! - [`query`] — list filtering, search and sorting
//! - [`reports`] — cost-of-ownership and chart aggregations
//!
//! This module holds the persisted models and the status state machine:
//! `Active ⇄ UnderMaintenance → Retired | Disposed`.

pub mod lifecycle;
pub mod query;
pub mod reports;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a persisted asset.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Equipment category. Closed set; the register has no free-text category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetCategory {
    #[serde(rename = "Dental Equipment")]
    DentalEquipment,
    #[serde(rename = "Imaging")]
    Imaging,
    #[serde(rename = "Laboratory")]
    Laboratory,
    #[serde(rename = "IT")]
    It,
    #[serde(rename = "Furniture")]
    Furniture,
    #[serde(rename = "Other")]
    Other,
}

impl AssetCategory {
    /// Column value as stored by the hosted schema.
    pub fn tag(self) -> &'static str {
        match self {
            AssetCategory::DentalEquipment => "Dental Equipment",
            AssetCategory::Imaging => "Imaging",
            AssetCategory::Laboratory => "Laboratory",
            AssetCategory::It => "IT",
            AssetCategory::Furniture => "Furniture",
            AssetCategory::Other => "Other",
        }
    }
}

/// Asset status state machine.
///
/// `Active` and `UnderMaintenance` flip freely; `Retired` and `Disposed`
/// are terminal within this module — there is no un-dispose operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetStatus {
    #[serde(rename = "Active")]
    Active,
    #[serde(rename = "Under Maintenance")]
    UnderMaintenance,
    #[serde(rename = "Retired")]
    Retired,
    #[serde(rename = "Disposed")]
    Disposed,
}

impl AssetStatus {
    pub fn tag(self) -> &'static str {
        match self {
            AssetStatus::Active => "Active",
            AssetStatus::UnderMaintenance => "Under Maintenance",
            AssetStatus::Retired => "Retired",
            AssetStatus::Disposed => "Disposed",
        }
    }

    /// Whether salvage value counts against cost of ownership.
    pub fn is_out_of_service(self) -> bool {
        matches!(self, AssetStatus::Disposed | AssetStatus::Retired)
    }
}

/// Unit of the maintenance interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl MaintenanceUnit {
    pub fn tag(self) -> &'static str {
        match self {
            MaintenanceUnit::Days => "days",
            MaintenanceUnit::Weeks => "weeks",
            MaintenanceUnit::Months => "months",
            MaintenanceUnit::Years => "years",
        }
    }
}

/// Why an asset left service. Closed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisposalReason {
    Sold,
    Scrapped,
    Donated,
    Stolen,
    Obsolete,
    Other,
}

impl DisposalReason {
    pub fn tag(self) -> &'static str {
        match self {
            DisposalReason::Sold => "Sold",
            DisposalReason::Scrapped => "Scrapped",
            DisposalReason::Donated => "Donated",
            DisposalReason::Stolen => "Stolen",
            DisposalReason::Obsolete => "Obsolete",
            DisposalReason::Other => "Other",
        }
    }
}

/// A persisted asset row.
///
/// Disposal fields are populated exactly once, by the dispose procedure,
/// and never cleared. `next_maintenance_due_date` is computed server-side
/// at each mark-serviced event; the client never writes it directly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    pub category: AssetCategory,
    pub status: AssetStatus,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub purchase_cost: Option<f64>,
    #[serde(default)]
    pub warranty_expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_serviced_date: Option<NaiveDate>,
    #[serde(default)]
    pub maintenance_interval_value: Option<i64>,
    #[serde(default)]
    pub maintenance_interval_unit: Option<MaintenanceUnit>,
    #[serde(default)]
    pub next_maintenance_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub disposal_reason: Option<DisposalReason>,
    #[serde(default)]
    pub disposal_date: Option<NaiveDate>,
    #[serde(default)]
    pub salvage_value: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Asset {
    /// Whether the mark-serviced action is available: both halves of the
    /// maintenance interval must be configured and the value positive.
    pub fn can_mark_serviced(&self) -> bool {
        self.maintenance_interval_value.is_some_and(|v| v > 0)
            && self.maintenance_interval_unit.is_some()
    }
}

/// Append-only maintenance history row. Never mutated after creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaintenanceLogEntry {
    pub id: String,
    pub asset_id: AssetId,
    pub serviced_on: NaiveDate,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub previous_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub new_due_date: Option<NaiveDate>,
}

/// Append-only disposal history row. Never mutated after creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisposalLogEntry {
    pub id: String,
    pub asset_id: AssetId,
    pub disposal_date: NaiveDate,
    pub reason: DisposalReason,
    #[serde(default)]
    pub salvage_value: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_mark_serviced_requires_positive_value_and_unit() {
        let mut asset: Asset = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "name": "Autoclave",
            "category": "Dental Equipment",
            "status": "Active",
        }))
        .expect("asset decodes");

        assert!(!asset.can_mark_serviced(), "unset interval blocks servicing");

        asset.maintenance_interval_value = Some(0);
        asset.maintenance_interval_unit = Some(MaintenanceUnit::Months);
        assert!(!asset.can_mark_serviced(), "zero interval blocks servicing");

        asset.maintenance_interval_value = Some(-3);
        assert!(!asset.can_mark_serviced(), "negative interval blocks servicing");

        asset.maintenance_interval_value = Some(3);
        assert!(asset.can_mark_serviced());

        asset.maintenance_interval_unit = None;
        assert!(!asset.can_mark_serviced(), "missing unit blocks servicing");
    }

    #[test]
    fn wire_tags_round_trip_through_serde() {
        let encoded = serde_json::to_value(AssetStatus::UnderMaintenance).expect("encodes");
        assert_eq!(encoded, serde_json::json!("Under Maintenance"));

        let decoded: AssetCategory =
            serde_json::from_value(serde_json::json!("Dental Equipment")).expect("decodes");
        assert_eq!(decoded, AssetCategory::DentalEquipment);

        let unit: MaintenanceUnit = serde_json::from_value(serde_json::json!("weeks")).expect("decodes");
        assert_eq!(unit, MaintenanceUnit::Weeks);
    }

    #[test]
    fn salvage_counts_only_out_of_service() {
        assert!(AssetStatus::Disposed.is_out_of_service());
        assert!(AssetStatus::Retired.is_out_of_service());
        assert!(!AssetStatus::Active.is_out_of_service());
        assert!(!AssetStatus::UnderMaintenance.is_out_of_service());
    }
}
