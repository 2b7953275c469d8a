//! Product availability under time range groups

use shared::models::TimeRangeGroup;

use super::window::time_in_range;

pub const REASON_RESTAURANT_CLOSED: &str = "Restaurant is closed";
pub const REASON_PRODUCT_DISABLED: &str = "Product is currently unavailable";
pub const REASON_OUTSIDE_GROUPS: &str = "Product not available at this time";

/// Outcome of one availability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub available: bool,
    pub reason: Option<&'static str>,
    /// Start time of the first active group, when the product is outside all of them
    pub next_available: Option<String>,
}

impl Availability {
    fn available() -> Self {
        Self {
            available: true,
            reason: None,
            next_available: None,
        }
    }

    fn unavailable(reason: &'static str) -> Self {
        Self {
            available: false,
            reason: Some(reason),
            next_available: None,
        }
    }
}

/// Decide whether a product can be ordered at local time `now_hhmm`
///
/// A product with no groups follows the restaurant. Otherwise the time must
/// fall inside at least one active group window.
pub fn is_product_available_at(
    product_is_available: bool,
    groups: &[TimeRangeGroup],
    restaurant_open: bool,
    now_hhmm: &str,
) -> Availability {
    if !restaurant_open {
        return Availability::unavailable(REASON_RESTAURANT_CLOSED);
    }
    if !product_is_available {
        return Availability::unavailable(REASON_PRODUCT_DISABLED);
    }
    if groups.is_empty() {
        return Availability::available();
    }

    let mut active = groups.iter().filter(|g| g.is_active).peekable();
    let first_active_start = active.peek().map(|g| g.start_time.clone());
    if active.any(|g| time_in_range(now_hhmm, &g.start_time, &g.end_time)) {
        return Availability::available();
    }

    Availability {
        next_available: first_active_start,
        ..Availability::unavailable(REASON_OUTSIDE_GROUPS)
    }
}
