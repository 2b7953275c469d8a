//! Shared types for the food platform
//!
//! Domain models, status transition tables and the unified error system used
//! by food-server and its API clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
