//! Typed query descriptions.
//!
//! A [`Query`] is a declarative description of a read: table, filters and
//! ordering. Services compose queries with the builder methods here and hand
//! them to a [`Database`](crate::Database) implementation for execution, so
//! the same description runs unchanged against the hosted backend and the
//! in-memory reference backend.
//!
//! Null ordering is always explicit. The hosted database's default null
//! placement differs between directions, so every [`Order`] carries its own
//! `nulls_first` flag and the constructors force callers to choose.

use serde_json::Value;

/// A single filter condition on a query.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Column equals value.
    Eq { column: String, value: Value },
    /// Column value is one of the given values.
    In { column: String, values: Vec<Value> },
    /// Case-insensitive pattern match; `%` is the wildcard.
    Ilike { column: String, pattern: String },
    /// Column is less than or equal to value.
    Lte { column: String, value: Value },
    /// Column is null (or absent from the row).
    IsNull { column: String },
    /// Negation of the inner filter.
    Not(Box<Filter>),
    /// Disjunction: at least one inner filter must match.
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Filter::Ilike {
            column: column.into(),
            pattern: pattern.into(),
        }
    }

    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lte {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Filter::IsNull {
            column: column.into(),
        }
    }

    pub fn not(inner: Filter) -> Self {
        Filter::Not(Box::new(inner))
    }
}

/// An ordering key with explicit null placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
    pub nulls_first: bool,
}

impl Order {
    /// Ascending order with nulls pushed after all non-null values.
    pub fn ascending_nulls_last(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
            nulls_first: false,
        }
    }

    /// Descending order with nulls pushed before all non-null values.
    pub fn descending_nulls_first(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
            nulls_first: true,
        }
    }
}

/// A declarative read against one table.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl Query {
    /// Starts a query over every row of `table`.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Adds an equality filter.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    /// Adds a membership filter.
    pub fn is_in(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = Value>,
    ) -> Self {
        self.filters.push(Filter::In {
            column: column.into(),
            values: values.into_iter().collect(),
        });
        self
    }

    /// Adds a case-insensitive pattern filter.
    pub fn ilike(mut self, column: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.filters.push(Filter::ilike(column, pattern));
        self
    }

    /// Adds a less-than-or-equal filter.
    pub fn lte(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::lte(column, value));
        self
    }

    /// Adds an arbitrary filter, useful for `Or`/`Not` compositions.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds an ordering key. Keys are applied in insertion order.
    pub fn order(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    /// Caps the number of returned rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
