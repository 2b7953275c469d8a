//! Data models
//!
//! Shared between food-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis.

pub mod delivery;
pub mod order;
pub mod product;
pub mod refund;
pub mod restaurant;
pub mod schedule;
pub mod time_group;

// Re-exports
pub use delivery::*;
pub use order::*;
pub use product::*;
pub use refund::*;
pub use restaurant::*;
pub use schedule::*;
pub use time_group::*;
