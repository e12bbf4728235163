//! Compute Engine client for tearing down cloud resources.
//!
//! This crate wraps the two compute API surfaces the teardown CLI needs:
//!
//! - **Instances** - delete a VM and wait on the resulting zonal operation
//!   with a bounded, error-classifying wait.
//! - **Addresses** - delete a reserved static IP and settle whatever shape
//!   of operation handle the API returns.
//!
//! All calls are scoped to a single project and authenticated with a
//! caller-supplied `OAuth2` access token.

pub mod error;
pub mod gcp;

pub use error::CloudError;
pub use gcp::Gcp;
