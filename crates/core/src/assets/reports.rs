//! Report aggregations over the asset register.
//!
//! Everything here is a pure client-side reduction over an already-fetched
//! asset list — the report page issues no queries beyond the list fetch.
//! Chart rendering itself is out of scope; these functions produce the
//! series data.

use crate::assets::{Asset, AssetCategory, AssetStatus, MaintenanceLogEntry};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Total cost of ownership for one asset.
///
/// `purchase_cost + Σ maintenance costs − salvage value`, where salvage
/// only counts once the asset is out of service (Disposed or Retired);
/// while the asset is in use, its eventual salvage is unknown and ignored.
pub fn cost_of_ownership(asset: &Asset, maintenance_log: &[MaintenanceLogEntry]) -> f64 {
    let purchase = asset.purchase_cost.unwrap_or(0.0);
    let maintenance: f64 = maintenance_log.iter().filter_map(|entry| entry.cost).sum();
    let salvage = if asset.status.is_out_of_service() {
        asset.salvage_value.unwrap_or(0.0)
    } else {
        0.0
    };
    purchase + maintenance - salvage
}

/// Asset count per category, for the category pie chart.
pub fn category_breakdown(assets: &[Asset]) -> BTreeMap<AssetCategory, usize> {
    let mut counts = BTreeMap::new();
    for asset in assets {
        *counts.entry(asset.category).or_insert(0) += 1;
    }
    counts
}

/// Asset count per status, for the status pie chart.
pub fn status_breakdown(assets: &[Asset]) -> BTreeMap<AssetStatus, usize> {
    let mut counts = BTreeMap::new();
    for asset in assets {
        *counts.entry(asset.status).or_insert(0) += 1;
    }
    counts
}

/// One bar of the purchase-price histogram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceBucket {
    pub label: &'static str,
    pub count: usize,
}

/// Purchase-price histogram with fixed bucket boundaries. Assets without a
/// recorded purchase cost are excluded.
pub fn price_histogram(assets: &[Asset]) -> Vec<PriceBucket> {
    let mut counts = [0usize; 4];
    for cost in assets.iter().filter_map(|a| a.purchase_cost) {
        let bucket = if cost < 500.0 {
            0
        } else if cost < 2_000.0 {
            1
        } else if cost < 10_000.0 {
            2
        } else {
            3
        };
        counts[bucket] += 1;
    }

    ["under £500", "£500–2,000", "£2,000–10,000", "£10,000+"]
        .into_iter()
        .zip(counts)
        .map(|(label, count)| PriceBucket { label, count })
        .collect()
}

/// One row of the maintenance-due report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DueSoon {
    pub asset_id: String,
    pub name: String,
    pub due_date: NaiveDate,
    pub days_until: i64,
}

/// Assets whose next maintenance falls within `window_days` of `today`,
/// soonest first. Overdue assets (due date already past) are included with
/// a negative `days_until`. Out-of-service assets are skipped.
pub fn maintenance_due_soon(assets: &[Asset], today: NaiveDate, window_days: u32) -> Vec<DueSoon> {
    let horizon = today + chrono::Days::new(u64::from(window_days));
    let mut due: Vec<DueSoon> = assets
        .iter()
        .filter(|asset| !asset.status.is_out_of_service())
        .filter_map(|asset| {
            let due_date = asset.next_maintenance_due_date?;
            (due_date <= horizon).then(|| DueSoon {
                asset_id: asset.id.as_str().to_string(),
                name: asset.name.clone(),
                due_date,
                days_until: (due_date - today).num_days(),
            })
        })
        .collect();
    due.sort_by_key(|row| row.due_date);
    due
}
