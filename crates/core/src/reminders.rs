//! Reminders.
//!
//! Reminders are plain CRUD rows: a message, one `reminder_datetime`
//! (merged client-side from separate date and time inputs), a recurrence
//! configuration and an active flag. No history is kept.
//!
//! The activate toggle and delete are **optimistic**: the local list is
//! mutated immediately and the change settles when the backend answers —
//! committed on success, rolled back to the captured previous value on
//! failure. This is the one place in the module with automatic corrective
//! behaviour; everything else surfaces failures and waits for the user.

use crate::auth::require_session;
use crate::constants::REMINDERS_TABLE;
use crate::error::{ClinicError, ClinicResult};
use crate::optimistic::{OptimisticChange, OptimisticState};
use crate::shared::json_object;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use dpm_backend::{row_to, rows_to, Backend, Order, Query};
use dpm_forms::FieldErrors;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// How a reminder repeats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Weekday selection for weekly recurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderWeekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// Recurrence configuration stored alongside the reminder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceConfig {
    #[serde(rename = "type")]
    pub recurrence: RecurrenceType,
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Required (non-empty) for weekly recurrence, absent otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekdays: Option<Vec<ReminderWeekday>>,
    /// Only meaningful for daily recurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times_per_day: Option<u32>,
}

fn default_interval() -> u32 {
    1
}

impl RecurrenceConfig {
    /// A reminder that fires once.
    pub fn one_off() -> Self {
        Self {
            recurrence: RecurrenceType::None,
            interval: 1,
            weekdays: None,
            times_per_day: None,
        }
    }

    /// Checks the cross-field rules of the configuration.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.interval == 0 {
            errors.push("recurrence.interval", "Interval must be at least 1");
        }

        if self.recurrence == RecurrenceType::Weekly
            && !self.weekdays.as_ref().is_some_and(|days| !days.is_empty())
        {
            errors.push(
                "recurrence.weekdays",
                "Weekly reminders need at least one weekday",
            );
        }

        if self.times_per_day.is_some() && self.recurrence != RecurrenceType::Daily {
            errors.push(
                "recurrence.times_per_day",
                "Times per day applies to daily reminders only",
            );
        }

        if self.times_per_day == Some(0) {
            errors.push("recurrence.times_per_day", "Times per day must be at least 1");
        }

        errors.into_result(())
    }
}

/// A persisted reminder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub message: String,
    pub reminder_datetime: DateTime<Utc>,
    pub recurrence: RecurrenceConfig,
    pub is_active: bool,
}

/// Merges the separate date and time inputs into the single stored moment.
pub fn merge_reminder_datetime(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time).and_utc()
}

/// Raw client input for creating or editing a reminder.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ReminderInput {
    pub message: String,
    /// ISO date text.
    pub date: String,
    /// `HH:MM` or `HH:MM:SS`.
    pub time: String,
    pub recurrence: RecurrenceConfig,
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

fn validate_input(input: &ReminderInput) -> Result<(String, DateTime<Utc>), FieldErrors> {
    let mut errors = FieldErrors::new();

    let message = input.message.trim();
    if message.is_empty() {
        errors.push("message", "Reminder message is required");
    }

    let date = match input.date.trim().parse::<NaiveDate>() {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push("date", "Enter the date as YYYY-MM-DD");
            None
        }
    };

    let time = match parse_time(input.time.trim()) {
        Some(time) => Some(time),
        None => {
            errors.push("time", "Enter the time as HH:MM");
            None
        }
    };

    if let Err(recurrence_errors) = input.recurrence.validate() {
        for error in recurrence_errors {
            errors.push(error.field, error.message);
        }
    }

    match (date, time) {
        (Some(date), Some(time)) if errors.is_empty() => {
            Ok((message.to_string(), merge_reminder_datetime(date, time)))
        }
        _ => Err(errors),
    }
}

/// The locally-held reminder list the optimistic operations mutate.
#[derive(Clone, Debug, Default)]
pub struct ReminderList {
    items: Vec<Reminder>,
}

impl ReminderList {
    pub fn new(items: Vec<Reminder>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Reminder] {
        &self.items
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|r| r.id == id)
    }
}

/// Reminder CRUD and the optimistic list operations.
#[derive(Clone, Debug)]
pub struct ReminderService {
    backend: Backend,
}

impl ReminderService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// All reminders, soonest first.
    pub async fn list(&self) -> ClinicResult<ReminderList> {
        let query = Query::table(REMINDERS_TABLE)
            .order(Order::ascending_nulls_last("reminder_datetime"));
        let rows = self.backend.database().select(&query).await?;
        Ok(ReminderList::new(rows_to(REMINDERS_TABLE, rows)?))
    }

    /// Creates a reminder, active by default.
    pub async fn create(&self, input: &ReminderInput) -> ClinicResult<Reminder> {
        let (message, reminder_datetime) = validate_input(input)?;
        require_session(&self.backend).await?;

        let row = json_object(json!({
            "message": message,
            "reminder_datetime": reminder_datetime.to_rfc3339(),
            "recurrence": input.recurrence,
            "is_active": true,
        }));
        let stored = self.backend.database().insert(REMINDERS_TABLE, row).await?;
        Ok(row_to(REMINDERS_TABLE, stored)?)
    }

    /// Rewrites an existing reminder from fresh input.
    pub async fn update(&self, id: &str, input: &ReminderInput) -> ClinicResult<Reminder> {
        let (message, reminder_datetime) = validate_input(input)?;
        require_session(&self.backend).await?;

        let patch = json_object(json!({
            "message": message,
            "reminder_datetime": reminder_datetime.to_rfc3339(),
            "recurrence": input.recurrence,
        }));
        let stored = self
            .backend
            .database()
            .update(REMINDERS_TABLE, patch, "id", &json!(id))
            .await?;
        Ok(row_to(REMINDERS_TABLE, stored)?)
    }

    /// Flips a reminder's active flag optimistically.
    ///
    /// The local flag flips before the backend call; on failure the
    /// captured previous value is restored and the error surfaced. Returns
    /// the settled [`OptimisticState`].
    pub async fn toggle_active(
        &self,
        reminders: &mut ReminderList,
        id: &str,
    ) -> ClinicResult<OptimisticState> {
        require_session(&self.backend).await?;

        let Some(index) = reminders.position(id) else {
            let mut errors = FieldErrors::new();
            errors.push("id", "Unknown reminder");
            return Err(ClinicError::Validation(errors));
        };

        let change = OptimisticChange::applied(reminders.items[index].clone());
        reminders.items[index].is_active = !change.previous().is_active;

        let patch = json_object(json!({ "is_active": reminders.items[index].is_active }));
        match self
            .backend
            .database()
            .update(REMINDERS_TABLE, patch, "id", &json!(id))
            .await
        {
            Ok(_) => Ok(change.commit()),
            Err(error) => {
                reminders.items[index] = change.rollback();
                Err(error.into())
            }
        }
    }

    /// Deletes a reminder optimistically.
    pub async fn delete(
        &self,
        reminders: &mut ReminderList,
        id: &str,
    ) -> ClinicResult<OptimisticState> {
        require_session(&self.backend).await?;

        let Some(index) = reminders.position(id) else {
            let mut errors = FieldErrors::new();
            errors.push("id", "Unknown reminder");
            return Err(ClinicError::Validation(errors));
        };

        let removed = reminders.items.remove(index);
        let change = OptimisticChange::applied(removed);

        match self
            .backend
            .database()
            .delete(REMINDERS_TABLE, "id", &json!(id))
            .await
        {
            Ok(()) => Ok(change.commit()),
            Err(error) => {
                reminders.items.insert(index, change.rollback());
                Err(error.into())
            }
        }
    }
}
