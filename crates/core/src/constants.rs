//! Table names of the hosted schema.

pub const PATIENTS_TABLE: &str = "patients";
pub const ASSETS_TABLE: &str = "assets";
pub const MAINTENANCE_LOG_TABLE: &str = "asset_maintenance_logs";
pub const DISPOSAL_LOG_TABLE: &str = "asset_disposal_logs";
pub const REMINDERS_TABLE: &str = "reminders";
pub const MEDICAL_RECORDS_TABLE: &str = "medical_records";
