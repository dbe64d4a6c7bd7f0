//! Optimistic update bookkeeping.
//!
//! An optimistic UI change applies the local mutation immediately, then
//! settles when the backend answers: committed on success, rolled back on
//! failure. The transition is explicit three-state so rollback is a single
//! well-defined inverse operation — the captured previous value is restored,
//! not re-derived.

/// Settlement state of an optimistic change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptimisticState {
    /// Applied locally, backend outcome unknown.
    Pending,
    /// Backend confirmed; the local change is authoritative.
    Committed,
    /// Backend rejected; the previous value was restored.
    RolledBack,
}

/// A pending local change holding the value needed to undo it.
#[derive(Clone, Debug)]
pub struct OptimisticChange<T> {
    previous: T,
    state: OptimisticState,
}

impl<T> OptimisticChange<T> {
    /// Records a change that has just been applied locally.
    pub fn applied(previous: T) -> Self {
        Self {
            previous,
            state: OptimisticState::Pending,
        }
    }

    pub fn state(&self) -> OptimisticState {
        self.state
    }

    /// Marks the change as confirmed by the backend.
    pub fn commit(mut self) -> OptimisticState {
        self.state = OptimisticState::Committed;
        self.state
    }

    /// Settles the change as rejected and yields the previous value so the
    /// caller can restore it.
    pub fn rollback(mut self) -> T {
        self.state = OptimisticState::RolledBack;
        self.previous
    }

    /// The captured previous value, without settling.
    pub fn previous(&self) -> &T {
        &self.previous
    }
}
