//! Backend service contracts.
//!
//! These traits describe the hosted backend the clinic module consumes:
//! database queries and mutations, named remote procedures, object storage,
//! authentication and realtime change notifications. Services receive the
//! aggregate [`Backend`] handle at construction, never a global client, so
//! tests substitute the in-memory implementation without touching any
//! process-wide state.

use crate::error::BackendResult;
use crate::query::Query;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A fetched or stored row: column name to JSON value.
pub type Row = serde_json::Map<String, Value>;

/// Database access: queries, mutations and named remote procedures.
#[async_trait::async_trait]
pub trait Database: Send + Sync {
    /// Executes a query and returns the matching rows.
    ///
    /// A query matching no rows returns an empty vector, not an error.
    async fn select(&self, query: &Query) -> BackendResult<Vec<Row>>;

    /// Inserts one row and returns the stored row (with backend-assigned
    /// columns such as `id` populated).
    async fn insert(&self, table: &str, row: Row) -> BackendResult<Row>;

    /// Applies a patch to the row where `key = value` and returns the
    /// updated row.
    async fn update(&self, table: &str, patch: Row, key: &str, value: &Value)
        -> BackendResult<Row>;

    /// Deletes the row(s) where `key = value`.
    async fn delete(&self, table: &str, key: &str, value: &Value) -> BackendResult<()>;

    /// Invokes a named server-side procedure with a structured argument
    /// object. Success carries no payload beyond the absence of an error.
    async fn rpc(&self, procedure: &str, args: Value) -> BackendResult<()>;
}

/// Object storage: binary uploads and public URL resolution.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads `bytes` to `path` within `bucket`.
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> BackendResult<()>;

    /// Returns the public URL for an object. Resolution is purely
    /// syntactic; the object is not checked for existence.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// An authenticated session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// Authentication state access.
///
/// Both accessors may fail (transport) or return `None` (no session); either
/// outcome must be treated as "not authenticated" by callers that are about
/// to write.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    async fn session(&self) -> BackendResult<Option<Session>>;
}

/// The kind of change a realtime notification reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A change notification for one table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
}

/// A live realtime subscription.
///
/// Dropping the subscription unsubscribes from the channel. Holders must
/// keep the value alive for as long as they want notifications; this makes
/// scoped acquisition (subscribe on mount, unsubscribe on unmount) the only
/// way to use the interface.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<ChangeEvent>,
    on_drop: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Builds a subscription from an event receiver and an unsubscribe
    /// action to run on drop.
    pub fn new(
        events: mpsc::UnboundedReceiver<ChangeEvent>,
        on_drop: Box<dyn FnOnce() + Send>,
    ) -> Self {
        Self {
            events,
            on_drop: Some(on_drop),
        }
    }

    /// Waits for the next change event. Returns `None` once the backend
    /// drops the channel.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }

    /// Returns a pending event without waiting, if one has arrived.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.events.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.on_drop.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Realtime change notifications.
pub trait Realtime: Send + Sync {
    /// Subscribes to change events for one table.
    fn subscribe(&self, table: &str) -> Subscription;
}

/// Aggregate handle over all backend contracts.
///
/// Cheap to clone; passed explicitly into every service constructor.
#[derive(Clone)]
pub struct Backend {
    database: Arc<dyn Database>,
    storage: Arc<dyn ObjectStore>,
    auth: Arc<dyn AuthProvider>,
    realtime: Arc<dyn Realtime>,
}

impl Backend {
    pub fn new(
        database: Arc<dyn Database>,
        storage: Arc<dyn ObjectStore>,
        auth: Arc<dyn AuthProvider>,
        realtime: Arc<dyn Realtime>,
    ) -> Self {
        Self {
            database,
            storage,
            auth,
            realtime,
        }
    }

    pub fn database(&self) -> &dyn Database {
        self.database.as_ref()
    }

    pub fn storage(&self) -> &dyn ObjectStore {
        self.storage.as_ref()
    }

    pub fn auth(&self) -> &dyn AuthProvider {
        self.auth.as_ref()
    }

    pub fn realtime(&self) -> &dyn Realtime {
        self.realtime.as_ref()
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}
