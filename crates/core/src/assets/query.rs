//! Asset list queries: search, filters and sorting.
//!
//! One params tuple composes into one backend query. The rules are fixed:
//!
//! - the search term matches case-insensitively against the name and
//!   serial-number columns, OR-combined
//! - category and status filters apply only when narrowed past
//!   [`CategoryFilter::All`] / [`StatusFilter::All`]; filters and search
//!   compose, neither overrides the other
//! - ascending sorts push null values last, descending sorts push them
//!   first — an explicit policy, not the database default

use crate::assets::{Asset, AssetCategory, AssetStatus};
use crate::constants::ASSETS_TABLE;
use crate::error::ClinicResult;
use dpm_backend::{rows_to, Backend, Filter, Order, Query, Subscription};

/// Category narrowing for the list view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(AssetCategory),
}

/// Status narrowing for the list view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(AssetStatus),
}

/// Sortable columns of the asset register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortColumn {
    #[default]
    Name,
    Category,
    Status,
    PurchaseDate,
    PurchaseCost,
    WarrantyExpiryDate,
    NextMaintenanceDueDate,
}

impl SortColumn {
    fn column(self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Category => "category",
            SortColumn::Status => "status",
            SortColumn::PurchaseDate => "purchase_date",
            SortColumn::PurchaseCost => "purchase_cost",
            SortColumn::WarrantyExpiryDate => "warranty_expiry_date",
            SortColumn::NextMaintenanceDueDate => "next_maintenance_due_date",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// The full list-view parameter tuple.
#[derive(Clone, Debug, Default)]
pub struct AssetListParams {
    pub search: String,
    pub category: CategoryFilter,
    pub status: StatusFilter,
    pub sort_column: SortColumn,
    pub sort_direction: SortDirection,
}

/// Composes the params into a backend query. Pure; no I/O.
pub fn build_query(params: &AssetListParams) -> Query {
    let mut query = Query::table(ASSETS_TABLE);

    let term = params.search.trim();
    if !term.is_empty() {
        let pattern = format!("%{term}%");
        query = query.filter(Filter::Or(vec![
            Filter::ilike("name", pattern.clone()),
            Filter::ilike("serial_number", pattern),
        ]));
    }

    if let CategoryFilter::Only(category) = params.category {
        query = query.eq("category", category.tag());
    }

    if let StatusFilter::Only(status) = params.status {
        query = query.eq("status", status.tag());
    }

    let order = match params.sort_direction {
        SortDirection::Ascending => Order::ascending_nulls_last(params.sort_column.column()),
        SortDirection::Descending => Order::descending_nulls_first(params.sort_column.column()),
    };
    query.order(order)
}

/// Read side of the asset register, with realtime refetch support.
#[derive(Clone, Debug)]
pub struct AssetListService {
    backend: Backend,
}

impl AssetListService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Fetches the asset list for the given params.
    pub async fn list(&self, params: &AssetListParams) -> ClinicResult<Vec<Asset>> {
        let rows = self.backend.database().select(&build_query(params)).await?;
        Ok(rows_to(ASSETS_TABLE, rows)?)
    }

    /// Subscribes to change notifications for the assets table.
    ///
    /// Any received event means "refetch the whole list" — the notification
    /// carries no ordering guarantee, so a full refetch is the only safe
    /// reaction, and it is idempotent. Dropping the returned subscription
    /// unsubscribes; hold it for exactly the lifetime of the list view.
    pub fn watch(&self) -> Subscription {
        self.backend.realtime().subscribe(ASSETS_TABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpm_backend::MemoryBackend;
    use serde_json::json;

    fn seed_asset(memory: &MemoryBackend, id: &str, name: &str, category: &str, cost: f64) {
        let row = match json!({
            "id": id,
            "name": name,
            "serial_number": format!("SN-{id}"),
            "category": category,
            "status": "Active",
            "purchase_cost": cost,
        }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        memory.seed(ASSETS_TABLE, vec![row]);
    }

    #[test]
    fn search_and_category_filter_compose() {
        let params = AssetListParams {
            search: "chair".into(),
            category: CategoryFilter::Only(AssetCategory::It),
            ..AssetListParams::default()
        };
        let query = build_query(&params);

        assert_eq!(query.filters.len(), 2, "both search and category present");
        assert!(matches!(&query.filters[0], Filter::Or(inner) if inner.len() == 2));
        assert!(
            matches!(&query.filters[1], Filter::Eq { column, value }
                if column == "category" && value == &json!("IT"))
        );
    }

    #[test]
    fn all_sentinels_add_no_filters() {
        let params = AssetListParams::default();
        let query = build_query(&params);
        assert!(query.filters.is_empty());
        assert_eq!(query.order.len(), 1);
    }

    #[test]
    fn sort_direction_pins_null_placement() {
        let ascending = build_query(&AssetListParams {
            sort_column: SortColumn::WarrantyExpiryDate,
            sort_direction: SortDirection::Ascending,
            ..AssetListParams::default()
        });
        assert!(ascending.order[0].ascending);
        assert!(!ascending.order[0].nulls_first, "asc pushes nulls last");

        let descending = build_query(&AssetListParams {
            sort_column: SortColumn::WarrantyExpiryDate,
            sort_direction: SortDirection::Descending,
            ..AssetListParams::default()
        });
        assert!(!descending.order[0].ascending);
        assert!(descending.order[0].nulls_first, "desc pushes nulls first");
    }

    #[tokio::test]
    async fn list_applies_search_and_filters_together() {
        let memory = MemoryBackend::new();
        seed_asset(&memory, "1", "Dental Chair", "Dental Equipment", 4200.0);
        seed_asset(&memory, "2", "Chairside Terminal", "IT", 900.0);
        seed_asset(&memory, "3", "Server Rack", "IT", 1500.0);
        let service = AssetListService::new(memory.handle());

        let assets = service
            .list(&AssetListParams {
                search: "chair".into(),
                category: CategoryFilter::Only(AssetCategory::It),
                ..AssetListParams::default()
            })
            .await
            .expect("list succeeds");

        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].name, "Chairside Terminal");
    }

    #[tokio::test]
    async fn watch_receives_an_event_per_external_mutation() {
        let memory = MemoryBackend::new();
        let service = AssetListService::new(memory.handle());
        let mut subscription = service.watch();

        seed_asset(&memory, "1", "Compressor", "Other", 300.0);
        // Seeding bypasses events; a real mutation emits one.
        use dpm_backend::Database;
        let row = match json!({ "name": "Mixer", "category": "Laboratory", "status": "Active" }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        memory
            .insert(ASSETS_TABLE, row)
            .await
            .expect("insert succeeds");

        let event = subscription.recv().await.expect("event delivered");
        assert_eq!(event.table, ASSETS_TABLE);
    }
}
