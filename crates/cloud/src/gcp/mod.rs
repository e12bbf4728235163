//! Compute Engine API bindings.
//!
//! Two resource surfaces are covered:
//!
//! - **Instances** (zone-scoped) - delete by project/zone/name.
//! - **Addresses** (region-scoped) - delete by project/region/name, plus
//!   the region operation-status endpoint used to settle the delete.

mod client;
mod models;

pub use client::{Gcp, DEFAULT_OPERATION_TIMEOUT_SECS};
pub use models::*;
