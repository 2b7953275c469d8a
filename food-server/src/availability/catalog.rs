//! Restaurant-wide product listing at one instant

use std::collections::HashMap;

use shared::models::{Product, ProductTimeInfo, TimeRangeGroup};

use super::product::is_product_available_at;

/// Evaluate every product against the groups it belongs to
///
/// `memberships` are `(product_id, group_id)` pairs in per-product group
/// order. Pairs naming a group missing from `groups` are ignored.
pub fn product_time_infos(
    products: Vec<Product>,
    groups: &[TimeRangeGroup],
    memberships: &[(i64, i64)],
    restaurant_open: bool,
    now_hhmm: &str,
) -> Vec<ProductTimeInfo> {
    let by_id: HashMap<i64, &TimeRangeGroup> = groups.iter().map(|g| (g.id, g)).collect();
    let mut product_groups: HashMap<i64, Vec<TimeRangeGroup>> = HashMap::new();
    for (product_id, group_id) in memberships {
        if let Some(group) = by_id.get(group_id) {
            product_groups
                .entry(*product_id)
                .or_default()
                .push((*group).clone());
        }
    }

    products
        .into_iter()
        .map(|product| {
            let time_groups = product_groups.remove(&product.id).unwrap_or_default();
            let verdict =
                is_product_available_at(product.is_available, &time_groups, restaurant_open, now_hhmm);
            ProductTimeInfo {
                product,
                time_groups,
                is_available: verdict.available,
                reason: verdict.reason.map(str::to_string),
                next_available: verdict.next_available,
            }
        })
        .collect()
}
