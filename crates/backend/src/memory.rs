//! In-memory reference backend.
//!
//! Implements every backend contract against process-local state. Tests and
//! local development run against this implementation; it mirrors the hosted
//! backend's observable behaviour where the client depends on it:
//!
//! - queries evaluate `ilike` patterns case-insensitively and honour the
//!   explicit null placement of each ordering key
//! - declared unique columns reject duplicates with a Postgres-style
//!   constraint name (`<table>_<column>_key`), from which the column is
//!   recoverable
//! - the `mark_asset_as_serviced` and `dispose_asset` procedures are
//!   executed locally, including the next-due-date computation
//! - every mutation emits a change event to live subscribers of the table
//!
//! The next-due arithmetic uses fixed-day addition for `days`/`weeks` and
//! calendar-aware month addition for `months`/`years` (a 31st clamps to the
//! shorter month's end). The hosted procedure is authoritative; deployments
//! must confirm it agrees before trusting reference values.
//!
//! All state sits behind one mutex. Contention is irrelevant here: the
//! backend exists for tests and single-user local runs.

use crate::client::{
    AuthProvider, Backend, ChangeEvent, ChangeKind, Database, ObjectStore, Realtime, Row, Session,
    Subscription,
};
use crate::error::{BackendError, BackendResult};
use crate::query::{Filter, Order, Query};
use chrono::{Days, Months, NaiveDate, Utc};
use serde_json::{json, Value};
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

const ASSETS_TABLE: &str = "assets";
const MAINTENANCE_LOG_TABLE: &str = "asset_maintenance_logs";
const DISPOSAL_LOG_TABLE: &str = "asset_disposal_logs";

/// The kind of mutation recorded in the call log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationKind {
    Insert,
    Update,
    Delete,
    Rpc(String),
}

/// One recorded mutation, kept for test assertions.
#[derive(Clone, Debug)]
pub struct MutationRecord {
    pub table: String,
    pub kind: MutationKind,
    pub payload: Value,
}

// json! with a braced literal always yields an object.
fn json_object(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

struct UniqueRule {
    table: String,
    column: String,
    constraint: String,
}

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Row>>,
    unique_rules: Vec<UniqueRule>,
    session: Option<Session>,
    objects: HashMap<String, Vec<u8>>,
    fail_uploads_matching: Option<String>,
    subscribers: Vec<(u64, String, mpsc::UnboundedSender<ChangeEvent>)>,
    next_subscriber_id: u64,
    mutations: Vec<MutationRecord>,
    upload_calls: Vec<String>,
}

/// Process-local backend implementing all service contracts.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<State>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an aggregate [`Backend`] handle over this instance.
    pub fn handle(&self) -> Backend {
        let shared = Arc::new(self.clone());
        Backend::new(shared.clone(), shared.clone(), shared.clone(), shared)
    }

    /// Declares a unique column; inserts and updates violating it fail with
    /// constraint name `<table>_<column>_key`.
    pub fn add_unique(&self, table: &str, column: &str) {
        let mut state = self.lock();
        state.unique_rules.push(UniqueRule {
            table: table.to_string(),
            column: column.to_string(),
            constraint: format!("{table}_{column}_key"),
        });
    }

    /// Establishes an authenticated session and returns it.
    pub fn sign_in(&self, email: &str) -> Session {
        let session = Session {
            user_id: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        self.lock().session = Some(session.clone());
        session
    }

    /// Clears the session; subsequent writes requiring an actor fail.
    pub fn sign_out(&self) {
        self.lock().session = None;
    }

    /// Inserts rows directly, bypassing unique checks and the call log.
    pub fn seed(&self, table: &str, rows: Vec<Row>) {
        let mut state = self.lock();
        state.tables.entry(table.to_string()).or_default().extend(rows);
    }

    /// Snapshot of a table's rows.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// All recorded mutations, in call order.
    pub fn mutations(&self) -> Vec<MutationRecord> {
        self.lock().mutations.clone()
    }

    /// Every `upload` call made, successful or not, as `bucket/path`.
    pub fn upload_calls(&self) -> Vec<String> {
        self.lock().upload_calls.clone()
    }

    /// Returns a stored object's bytes, if the upload succeeded.
    pub fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.lock().objects.get(&format!("{bucket}/{path}")).cloned()
    }

    /// Makes every upload whose path contains `fragment` fail. Pass `None`
    /// to restore normal behaviour.
    pub fn fail_uploads_matching(&self, fragment: Option<&str>) {
        self.lock().fail_uploads_matching = fragment.map(str::to_string);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ============================================================================
// QUERY EVALUATION
// ============================================================================

fn column_value<'a>(row: &'a Row, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&Value::Null)
}

fn is_null(value: &Value) -> bool {
    matches!(value, Value::Null)
}

/// Case-insensitive `LIKE` with `%` wildcards.
///
/// Segments between wildcards must appear in order; segments at an
/// unwildcarded start or end are anchored there.
fn ilike_matches(value: &str, pattern: &str) -> bool {
    let value = value.to_lowercase();
    let pattern = pattern.to_lowercase();
    let anchored_start = !pattern.starts_with('%');
    let anchored_end = !pattern.ends_with('%');
    let segments: Vec<&str> = pattern.split('%').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        // Pattern was empty or consisted only of wildcards.
        return if anchored_start && anchored_end {
            value.is_empty()
        } else {
            true
        };
    }

    let mut position = 0usize;
    for (index, segment) in segments.iter().enumerate() {
        if index == 0 && anchored_start {
            if !value.starts_with(segment) {
                return false;
            }
            position = segment.len();
        } else {
            match value[position..].find(segment) {
                Some(found) => position = position + found + segment.len(),
                None => return false,
            }
        }
    }

    if anchored_end {
        let last = segments[segments.len() - 1];
        if !value.ends_with(last) || position > value.len() {
            return false;
        }
    }

    true
}

fn compare_values(a: &Value, b: &Value) -> CmpOrdering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(CmpOrdering::Equal)
        }
        // ISO 8601 date and timestamp strings compare correctly as text.
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => CmpOrdering::Equal,
    }
}

fn filter_matches(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { column, value } => column_value(row, column) == value,
        Filter::In { column, values } => values.contains(column_value(row, column)),
        Filter::Ilike { column, pattern } => match column_value(row, column) {
            Value::String(text) => ilike_matches(text, pattern),
            _ => false,
        },
        Filter::Lte { column, value } => {
            let actual = column_value(row, column);
            if is_null(actual) || is_null(value) {
                return false;
            }
            compare_values(actual, value) != CmpOrdering::Greater
        }
        Filter::IsNull { column } => is_null(column_value(row, column)),
        Filter::Not(inner) => !filter_matches(row, inner),
        Filter::Or(alternatives) => alternatives.iter().any(|f| filter_matches(row, f)),
    }
}

fn compare_rows(a: &Row, b: &Row, order: &[Order]) -> CmpOrdering {
    for key in order {
        let left = column_value(a, &key.column);
        let right = column_value(b, &key.column);

        let ordering = match (is_null(left), is_null(right)) {
            (true, true) => CmpOrdering::Equal,
            (true, false) => {
                if key.nulls_first {
                    CmpOrdering::Less
                } else {
                    CmpOrdering::Greater
                }
            }
            (false, true) => {
                if key.nulls_first {
                    CmpOrdering::Greater
                } else {
                    CmpOrdering::Less
                }
            }
            (false, false) => {
                let natural = compare_values(left, right);
                if key.ascending {
                    natural
                } else {
                    natural.reverse()
                }
            }
        };

        if ordering != CmpOrdering::Equal {
            return ordering;
        }
    }
    CmpOrdering::Equal
}

// ============================================================================
// STATE HELPERS
// ============================================================================

impl State {
    fn check_unique(
        &self,
        table: &str,
        candidate: &Row,
        exclude_id: Option<&Value>,
    ) -> BackendResult<()> {
        for rule in self.unique_rules.iter().filter(|r| r.table == table) {
            let value = column_value(candidate, &rule.column);
            if is_null(value) {
                continue;
            }

            let rows = self.tables.get(table).map(Vec::as_slice).unwrap_or(&[]);
            let conflict = rows.iter().any(|existing| {
                let same_row = match exclude_id {
                    Some(id) => column_value(existing, "id") == id,
                    None => false,
                };
                !same_row && column_value(existing, &rule.column) == value
            });

            if conflict {
                return Err(BackendError::UniqueViolation {
                    constraint: rule.constraint.clone(),
                    column: Some(rule.column.clone()),
                });
            }
        }
        Ok(())
    }

    fn emit(&mut self, table: &str, kind: ChangeKind) {
        self.subscribers.retain(|(_, subscribed_table, sender)| {
            if subscribed_table != table {
                return true;
            }
            sender
                .send(ChangeEvent {
                    table: table.to_string(),
                    kind,
                })
                .is_ok()
        });
    }

    fn record(&mut self, table: &str, kind: MutationKind, payload: Value) {
        self.mutations.push(MutationRecord {
            table: table.to_string(),
            kind,
            payload,
        });
    }
}

// ============================================================================
// CONTRACT IMPLEMENTATIONS
// ============================================================================

#[async_trait::async_trait]
impl Database for MemoryBackend {
    async fn select(&self, query: &Query) -> BackendResult<Vec<Row>> {
        let state = self.lock();
        let mut rows: Vec<Row> = state
            .tables
            .get(&query.table)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .filter(|row| query.filters.iter().all(|f| filter_matches(row, f)))
            .cloned()
            .collect();

        if !query.order.is_empty() {
            rows.sort_by(|a, b| compare_rows(a, b, &query.order));
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        tracing::debug!(table = %query.table, matched = rows.len(), "select");
        Ok(rows)
    }

    async fn insert(&self, table: &str, mut row: Row) -> BackendResult<Row> {
        let mut state = self.lock();

        if !row.contains_key("id") {
            row.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
        }

        state.check_unique(table, &row, None)?;
        state.record(table, MutationKind::Insert, Value::Object(row.clone()));
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        state.emit(table, ChangeKind::Insert);
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        patch: Row,
        key: &str,
        value: &Value,
    ) -> BackendResult<Row> {
        let mut state = self.lock();

        let position = state
            .tables
            .get(table)
            .and_then(|rows| rows.iter().position(|r| column_value(r, key) == value))
            .ok_or_else(|| {
                BackendError::Transport(format!("no row in \"{table}\" where {key} = {value}"))
            })?;

        let mut updated = state.tables[table][position].clone();
        for (column, new_value) in &patch {
            updated.insert(column.clone(), new_value.clone());
        }

        let id = column_value(&updated, "id").clone();
        state.check_unique(table, &updated, Some(&id))?;
        state.record(table, MutationKind::Update, Value::Object(patch));
        if let Some(rows) = state.tables.get_mut(table) {
            rows[position] = updated.clone();
        }
        state.emit(table, ChangeKind::Update);
        Ok(updated)
    }

    async fn delete(&self, table: &str, key: &str, value: &Value) -> BackendResult<()> {
        let mut state = self.lock();
        state.record(
            table,
            MutationKind::Delete,
            json!({ "key": key, "value": value }),
        );
        if let Some(rows) = state.tables.get_mut(table) {
            rows.retain(|r| column_value(r, key) != value);
        }
        state.emit(table, ChangeKind::Delete);
        Ok(())
    }

    async fn rpc(&self, procedure: &str, args: Value) -> BackendResult<()> {
        let mut state = self.lock();
        state.record(ASSETS_TABLE, MutationKind::Rpc(procedure.to_string()), args.clone());

        match procedure {
            "mark_asset_as_serviced" => mark_asset_as_serviced(&mut state, &args)?,
            "dispose_asset" => dispose_asset(&mut state, &args)?,
            other => {
                return Err(BackendError::Procedure {
                    procedure: other.to_string(),
                    message: "unknown procedure".to_string(),
                })
            }
        }

        state.emit(ASSETS_TABLE, ChangeKind::Update);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryBackend {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> BackendResult<()> {
        let mut state = self.lock();
        let full_path = format!("{bucket}/{path}");
        state.upload_calls.push(full_path.clone());

        if let Some(fragment) = &state.fail_uploads_matching {
            if full_path.contains(fragment.as_str()) {
                return Err(BackendError::Storage {
                    path: full_path,
                    message: "simulated upload failure".to_string(),
                });
            }
        }

        state.objects.insert(full_path, bytes);
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{bucket}/{path}")
    }
}

#[async_trait::async_trait]
impl AuthProvider for MemoryBackend {
    async fn session(&self) -> BackendResult<Option<Session>> {
        Ok(self.lock().session.clone())
    }
}

impl Realtime for MemoryBackend {
    fn subscribe(&self, table: &str) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = {
            let mut state = self.lock();
            let id = state.next_subscriber_id;
            state.next_subscriber_id += 1;
            state.subscribers.push((id, table.to_string(), sender));
            id
        };

        let inner = Arc::clone(&self.inner);
        Subscription::new(
            receiver,
            Box::new(move || {
                let mut state = inner.lock().unwrap_or_else(|p| p.into_inner());
                state.subscribers.retain(|(sub_id, _, _)| *sub_id != id);
            }),
        )
    }
}

// ============================================================================
// NAMED PROCEDURES
// ============================================================================

fn procedure_error(procedure: &str, message: impl Into<String>) -> BackendError {
    BackendError::Procedure {
        procedure: procedure.to_string(),
        message: message.into(),
    }
}

fn args_str<'a>(args: &'a Value, field: &str, procedure: &str) -> BackendResult<&'a str> {
    args.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| procedure_error(procedure, format!("missing argument \"{field}\"")))
}

fn parse_date(text: &str, procedure: &str) -> BackendResult<NaiveDate> {
    text.parse::<NaiveDate>()
        .map_err(|e| procedure_error(procedure, format!("invalid date \"{text}\": {e}")))
}

/// Adds a maintenance interval to a date.
///
/// Days and weeks are fixed-length; months and years are calendar-aware and
/// clamp to the target month's last day.
fn add_interval(start: NaiveDate, value: u32, unit: &str) -> Option<NaiveDate> {
    match unit {
        "days" => start.checked_add_days(Days::new(u64::from(value))),
        "weeks" => start.checked_add_days(Days::new(u64::from(value) * 7)),
        "months" => start.checked_add_months(Months::new(value)),
        "years" => start.checked_add_months(Months::new(value.checked_mul(12)?)),
        _ => None,
    }
}

fn find_asset_position(state: &State, asset_id: &str, procedure: &str) -> BackendResult<usize> {
    state
        .tables
        .get(ASSETS_TABLE)
        .and_then(|rows| {
            rows.iter()
                .position(|r| column_value(r, "id") == &json!(asset_id))
        })
        .ok_or_else(|| procedure_error(procedure, format!("asset {asset_id} not found")))
}

fn mark_asset_as_serviced(state: &mut State, args: &Value) -> BackendResult<()> {
    const PROCEDURE: &str = "mark_asset_as_serviced";

    let asset_id = args_str(args, "asset_id", PROCEDURE)?.to_string();
    let serviced_on = parse_date(args_str(args, "serviced_on", PROCEDURE)?, PROCEDURE)?;
    let position = find_asset_position(state, &asset_id, PROCEDURE)?;
    let asset = &state.tables[ASSETS_TABLE][position];

    let interval_value = column_value(asset, "maintenance_interval_value")
        .as_i64()
        .filter(|v| *v > 0)
        .ok_or_else(|| procedure_error(PROCEDURE, "maintenance interval not configured"))?;
    let interval_unit = column_value(asset, "maintenance_interval_unit")
        .as_str()
        .ok_or_else(|| procedure_error(PROCEDURE, "maintenance interval unit not configured"))?
        .to_string();

    let previous_due = column_value(asset, "next_maintenance_due_date").clone();
    let new_due = add_interval(serviced_on, interval_value as u32, &interval_unit)
        .ok_or_else(|| procedure_error(PROCEDURE, "next due date out of range"))?;
    let new_due = json!(new_due.format("%Y-%m-%d").to_string());

    if let Some(rows) = state.tables.get_mut(ASSETS_TABLE) {
        let row = &mut rows[position];
        row.insert(
            "last_serviced_date".to_string(),
            json!(serviced_on.format("%Y-%m-%d").to_string()),
        );
        row.insert("next_maintenance_due_date".to_string(), new_due.clone());
    }

    let log_entry = json_object(json!({
        "id": Uuid::new_v4().to_string(),
        "asset_id": asset_id,
        "serviced_on": serviced_on.format("%Y-%m-%d").to_string(),
        "cost": args.get("cost").cloned().unwrap_or(Value::Null),
        "notes": args.get("notes").cloned().unwrap_or(Value::Null),
        "previous_due_date": previous_due,
        "new_due_date": new_due,
        "created_at": Utc::now().to_rfc3339(),
    }));

    state
        .tables
        .entry(MAINTENANCE_LOG_TABLE.to_string())
        .or_default()
        .push(log_entry);
    state.emit(MAINTENANCE_LOG_TABLE, ChangeKind::Insert);
    Ok(())
}

fn dispose_asset(state: &mut State, args: &Value) -> BackendResult<()> {
    const PROCEDURE: &str = "dispose_asset";

    let asset_id = args_str(args, "asset_id", PROCEDURE)?.to_string();
    let disposal_date = parse_date(args_str(args, "disposal_date", PROCEDURE)?, PROCEDURE)?;
    let reason = args_str(args, "reason", PROCEDURE)?.to_string();
    let position = find_asset_position(state, &asset_id, PROCEDURE)?;
    let asset = &state.tables[ASSETS_TABLE][position];

    if column_value(asset, "status") == &json!("Disposed") {
        return Err(procedure_error(PROCEDURE, "asset already disposed"));
    }

    let salvage = args.get("salvage_value").cloned().unwrap_or(json!(0.0));

    if let Some(rows) = state.tables.get_mut(ASSETS_TABLE) {
        let row = &mut rows[position];
        row.insert("status".to_string(), json!("Disposed"));
        row.insert("disposal_reason".to_string(), json!(reason.clone()));
        row.insert(
            "disposal_date".to_string(),
            json!(disposal_date.format("%Y-%m-%d").to_string()),
        );
        row.insert("salvage_value".to_string(), salvage.clone());
    }

    let log_entry = json_object(json!({
        "id": Uuid::new_v4().to_string(),
        "asset_id": asset_id,
        "disposal_date": disposal_date.format("%Y-%m-%d").to_string(),
        "reason": reason,
        "salvage_value": salvage,
        "notes": args.get("notes").cloned().unwrap_or(Value::Null),
        "created_at": Utc::now().to_rfc3339(),
    }));

    state
        .tables
        .entry(DISPOSAL_LOG_TABLE.to_string())
        .or_default()
        .push(log_entry);
    state.emit(DISPOSAL_LOG_TABLE, ChangeKind::Insert);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset_row(id: &str, name: &str, warranty: Option<&str>) -> Row {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "serial_number": format!("SN-{id}"),
            "category": "IT",
            "status": "Active",
            "warranty_expiry_date": warranty,
        }))
        .expect("row is an object")
    }

    #[tokio::test]
    async fn select_composes_search_and_category_filters() {
        let backend = MemoryBackend::new();
        backend.seed(
            ASSETS_TABLE,
            vec![
                asset_row("1", "Dental Chair", None),
                asset_row("2", "Office Chair", None),
                asset_row("3", "Curing Light", None),
            ],
        );
        // A row matching the search but not the category must be excluded.
        let mut other_category = asset_row("4", "Chairside Monitor", None);
        other_category.insert("category".to_string(), json!("Furniture"));
        backend.seed(ASSETS_TABLE, vec![other_category]);

        let query = Query::table(ASSETS_TABLE)
            .filter(Filter::Or(vec![
                Filter::ilike("name", "%chair%"),
                Filter::ilike("serial_number", "%chair%"),
            ]))
            .eq("category", json!("IT"));

        let rows = backend.select(&query).await.expect("select succeeds");
        let names: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.get("name").and_then(Value::as_str))
            .collect();
        assert_eq!(names, vec!["Dental Chair", "Office Chair"]);
    }

    #[tokio::test]
    async fn ascending_sort_places_null_dates_last() {
        let backend = MemoryBackend::new();
        backend.seed(
            ASSETS_TABLE,
            vec![
                asset_row("1", "No Warranty", None),
                asset_row("2", "Late", Some("2027-06-30")),
                asset_row("3", "Early", Some("2026-01-15")),
            ],
        );

        let ascending = Query::table(ASSETS_TABLE)
            .order(Order::ascending_nulls_last("warranty_expiry_date"));
        let rows = backend.select(&ascending).await.expect("select succeeds");
        let names: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.get("name").and_then(Value::as_str))
            .collect();
        assert_eq!(names, vec!["Early", "Late", "No Warranty"]);

        let descending = Query::table(ASSETS_TABLE)
            .order(Order::descending_nulls_first("warranty_expiry_date"));
        let rows = backend.select(&descending).await.expect("select succeeds");
        let names: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.get("name").and_then(Value::as_str))
            .collect();
        assert_eq!(names, vec!["No Warranty", "Late", "Early"]);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_unique_column() {
        let backend = MemoryBackend::new();
        backend.add_unique(ASSETS_TABLE, "serial_number");
        backend
            .insert(ASSETS_TABLE, asset_row("1", "Scanner", None))
            .await
            .expect("first insert succeeds");

        let mut duplicate = asset_row("2", "Second Scanner", None);
        duplicate.insert("serial_number".to_string(), json!("SN-1"));
        let err = backend
            .insert(ASSETS_TABLE, duplicate)
            .await
            .expect_err("duplicate should fail");

        assert_eq!(err.unique_violation_column(), Some("serial_number"));
    }

    #[tokio::test]
    async fn mark_serviced_computes_next_due_and_appends_log() {
        let backend = MemoryBackend::new();
        let mut asset = asset_row("a1", "Autoclave", None);
        asset.insert("maintenance_interval_value".to_string(), json!(3));
        asset.insert("maintenance_interval_unit".to_string(), json!("months"));
        asset.insert("next_maintenance_due_date".to_string(), json!("2026-02-01"));
        backend.seed(ASSETS_TABLE, vec![asset]);

        backend
            .rpc(
                "mark_asset_as_serviced",
                json!({ "asset_id": "a1", "serviced_on": "2026-03-15", "cost": 120.0 }),
            )
            .await
            .expect("rpc succeeds");

        let assets = backend.rows(ASSETS_TABLE);
        assert_eq!(
            assets[0].get("next_maintenance_due_date"),
            Some(&json!("2026-06-15"))
        );
        assert_eq!(assets[0].get("last_serviced_date"), Some(&json!("2026-03-15")));

        let log = backend.rows(MAINTENANCE_LOG_TABLE);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].get("previous_due_date"), Some(&json!("2026-02-01")));
        assert_eq!(log[0].get("new_due_date"), Some(&json!("2026-06-15")));
    }

    #[tokio::test]
    async fn month_addition_clamps_to_month_end() {
        let due = add_interval("2026-01-31".parse().expect("valid date"), 1, "months")
            .expect("in range");
        assert_eq!(due.to_string(), "2026-02-28");
    }

    #[tokio::test]
    async fn dispose_is_rejected_for_already_disposed_asset() {
        let backend = MemoryBackend::new();
        let mut asset = asset_row("a1", "Old Compressor", None);
        asset.insert("status".to_string(), json!("Disposed"));
        backend.seed(ASSETS_TABLE, vec![asset]);

        let err = backend
            .rpc(
                "dispose_asset",
                json!({ "asset_id": "a1", "disposal_date": "2026-05-01", "reason": "Scrapped" }),
            )
            .await
            .expect_err("double dispose should fail");

        assert!(matches!(err, BackendError::Procedure { .. }));
    }

    #[tokio::test]
    async fn subscription_receives_change_events_and_unsubscribes_on_drop() {
        let backend = MemoryBackend::new();
        let mut subscription = backend.subscribe(ASSETS_TABLE);

        backend
            .insert(ASSETS_TABLE, asset_row("1", "Mixer", None))
            .await
            .expect("insert succeeds");

        let event = subscription.recv().await.expect("event delivered");
        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(event.table, ASSETS_TABLE);

        drop(subscription);
        assert!(
            backend.lock().subscribers.is_empty(),
            "drop should unsubscribe"
        );
    }

    #[tokio::test]
    async fn upload_failure_is_injectable_and_logged() {
        let backend = MemoryBackend::new();
        backend.fail_uploads_matching(Some("signature"));

        let ok = backend
            .upload("patient-files", "p1/photo.png", vec![1, 2, 3])
            .await;
        assert!(ok.is_ok());

        let err = backend
            .upload("patient-files", "p1/signature.png", vec![4, 5])
            .await
            .expect_err("matching upload should fail");
        assert!(matches!(err, BackendError::Storage { .. }));

        assert_eq!(backend.upload_calls().len(), 2, "both calls are logged");
        assert!(backend.object("patient-files", "p1/signature.png").is_none());
    }

    #[test]
    fn ilike_handles_anchored_and_floating_patterns() {
        assert!(ilike_matches("Dental Chair", "%chair%"));
        assert!(ilike_matches("Dental Chair", "dental%"));
        assert!(ilike_matches("Dental Chair", "%CHAIR"));
        assert!(!ilike_matches("Dental Chair", "chair%"));
        assert!(!ilike_matches("Dental Chair", "%scanner%"));
    }
}
