//! Compute Engine API client implementation.

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, warn};

use super::models::{AddressDeleteResponse, Operation};
use crate::error::CloudError;

/// Base URL for the Compute Engine API.
const API_BASE_URL: &str = "https://compute.googleapis.com/compute/v1";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default deadline when waiting for an operation to finish.
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 300;

/// Compute Engine client scoped to a single project.
#[derive(Clone)]
pub struct Gcp {
    /// HTTP client.
    client: Client,
    /// Project ID.
    project_id: String,
    /// Access token (from service account or user).
    access_token: String,
    /// API endpoint.
    endpoint: String,
}

impl Gcp {
    /// Create a new Compute Engine client.
    ///
    /// # Arguments
    /// * `project_id` - project ID or project number
    /// * `access_token` - `OAuth2` access token
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        project_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, CloudError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(CloudError::Http)?;

        Ok(Self {
            client,
            project_id: project_id.into(),
            access_token: access_token.into(),
            endpoint: API_BASE_URL.to_string(),
        })
    }

    /// Override the API endpoint (e.g. to point at a mock server).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Delete an instance and wait for the operation to finish.
    ///
    /// The wait is bounded by [`DEFAULT_OPERATION_TIMEOUT_SECS`] and
    /// classifies the finished operation's errors and warnings.
    ///
    /// # Errors
    /// Propagates HTTP failures and any failure from
    /// [`Gcp::wait_for_operation`] unchanged.
    pub async fn delete_instance(
        &self,
        zone: &str,
        instance: &str,
    ) -> Result<Operation, CloudError> {
        info!(instance = %instance, zone = %zone, "Deleting Compute Engine instance");

        let url = format!(
            "{}/projects/{}/zones/{}/instances/{}",
            self.endpoint, self.project_id, zone, instance
        );

        let operation: Operation = self.delete(&url).await?;
        let operation = self
            .wait_for_operation(operation, zone, "instance deletion", DEFAULT_OPERATION_TIMEOUT_SECS)
            .await?;

        info!(instance = %instance, "Instance deleted");
        Ok(operation)
    }

    /// Delete a reserved static IP address.
    ///
    /// The delete call's response may be a full long-running operation, a
    /// bare named reference, or neither; the first two are settled against
    /// the region operation-status endpoint, the last needs no wait.
    ///
    /// # Errors
    /// Propagates HTTP failures from the delete call and from the region
    /// wait; the finished operation itself is not inspected.
    pub async fn delete_address(&self, region: &str, address: &str) -> Result<(), CloudError> {
        info!(address = %address, region = %region, "Deleting static IP address");

        let url = format!(
            "{}/projects/{}/regions/{}/addresses/{}",
            self.endpoint, self.project_id, region, address
        );

        let response: AddressDeleteResponse = self.delete(&url).await?;
        match response {
            AddressDeleteResponse::Operation(operation) => {
                if !operation.is_done() {
                    self.wait_region_operation(region, &operation.name).await?;
                }
            }
            AddressDeleteResponse::Reference(reference) => {
                self.wait_region_operation(region, &reference.name).await?;
            }
            AddressDeleteResponse::Other(_) => {
                debug!(address = %address, "Delete response carried no operation to wait on");
            }
        }

        info!(address = %address, "Static IP address deleted");
        Ok(())
    }

    /// Wait for a zonal operation to finish, then classify its outcome.
    ///
    /// If the operation finishes with an error code set, the code, message
    /// and operation name are logged and the call fails; a set error code
    /// never yields `Ok`. Warnings are logged and do not fail the call.
    ///
    /// # Errors
    /// * [`CloudError::Timeout`] if `timeout_secs` elapses first.
    /// * [`CloudError::OperationFailed`] if the operation reports an error.
    pub async fn wait_for_operation(
        &self,
        operation: Operation,
        zone: &str,
        verbose_name: &str,
        timeout_secs: u64,
    ) -> Result<Operation, CloudError> {
        debug!(operation = %operation.name, timeout_secs, "Waiting for {verbose_name}");

        let start = Instant::now();
        let timeout = Duration::from_secs(timeout_secs);
        let mut operation = operation;

        loop {
            if operation.is_done() {
                return Self::finalize_operation(operation, verbose_name);
            }
            if start.elapsed() > timeout {
                return Err(CloudError::Timeout(timeout_secs));
            }

            // The wait endpoint blocks server-side until the operation
            // finishes or about two minutes pass, whichever comes first.
            let url = format!(
                "{}/projects/{}/zones/{}/operations/{}/wait",
                self.endpoint, self.project_id, zone, operation.name
            );
            operation = self.post(&url).await?;
        }
    }

    /// Block until the named region operation reports `DONE`.
    ///
    /// Unlike [`Gcp::wait_for_operation`] this wait has no client-side
    /// deadline and does not inspect the finished operation's error or
    /// warning fields.
    ///
    /// # Errors
    /// Propagates HTTP failures from the operation-status endpoint.
    pub async fn wait_region_operation(
        &self,
        region: &str,
        name: &str,
    ) -> Result<Operation, CloudError> {
        debug!(operation = %name, region = %region, "Waiting for region operation");

        loop {
            let url = format!(
                "{}/projects/{}/regions/{}/operations/{}/wait",
                self.endpoint, self.project_id, region, name
            );
            let operation: Operation = self.post(&url).await?;
            if operation.is_done() {
                return Ok(operation);
            }
        }
    }

    /// Classify a finished operation.
    fn finalize_operation(
        operation: Operation,
        verbose_name: &str,
    ) -> Result<Operation, CloudError> {
        let failed = operation.http_error_status_code.is_some()
            || operation.error.as_ref().is_some_and(|e| !e.errors.is_empty());

        if failed {
            let code = operation.http_error_status_code.unwrap_or_default();
            let message = operation
                .error
                .as_ref()
                .and_then(|e| e.errors.first())
                .and_then(|detail| detail.message.clone())
                .or_else(|| operation.http_error_message.clone())
                .unwrap_or_else(|| format!("{verbose_name} failed"));

            error!(
                code,
                message = %message,
                operation = %operation.name,
                "Error during {verbose_name}"
            );
            return Err(CloudError::OperationFailed {
                code,
                message,
                operation: operation.name,
            });
        }

        for warning in &operation.warnings {
            warn!(
                code = warning.code.as_deref().unwrap_or("UNKNOWN"),
                message = warning.message.as_deref().unwrap_or(""),
                "Warning during {verbose_name}"
            );
        }

        Ok(operation)
    }

    /// Make an authenticated DELETE request.
    async fn delete<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CloudError> {
        debug!(url = %url, "DELETE request");

        let response = self
            .client
            .delete(url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Make an authenticated POST request with an empty body.
    async fn post<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CloudError> {
        debug!(url = %url, "POST request");

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CloudError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "Failed to parse response");
                CloudError::Serialization(e)
            })
        } else if status == StatusCode::NOT_FOUND {
            Err(CloudError::NotFound(text))
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(CloudError::Auth(text))
        } else {
            Err(CloudError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn operation(value: serde_json::Value) -> Operation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_finalize_clean_operation() {
        let op = operation(json!({"name": "op-1", "status": "DONE"}));
        let result = Gcp::finalize_operation(op, "instance deletion").unwrap();
        assert_eq!(result.name, "op-1");
    }

    #[test]
    fn test_finalize_operation_with_error_code_fails() {
        let op = operation(json!({
            "name": "op-2",
            "status": "DONE",
            "httpErrorStatusCode": 404,
            "error": {"errors": [{"code": "RESOURCE_NOT_FOUND", "message": "not found"}]},
        }));

        match Gcp::finalize_operation(op, "instance deletion") {
            Err(CloudError::OperationFailed {
                code,
                message,
                operation,
            }) => {
                assert_eq!(code, 404);
                assert_eq!(message, "not found");
                assert_eq!(operation, "op-2");
            }
            other => panic!("expected an operation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_finalize_operation_error_without_http_code_still_fails() {
        let op = operation(json!({
            "name": "op-3",
            "status": "DONE",
            "error": {"errors": [{"code": "QUOTA_EXCEEDED", "message": "quota exceeded"}]},
        }));

        assert!(Gcp::finalize_operation(op, "instance deletion").is_err());
    }

    #[test]
    fn test_finalize_operation_with_warnings_succeeds() {
        let op = operation(json!({
            "name": "op-4",
            "status": "DONE",
            "warnings": [
                {"code": "RESOURCE_IN_USE", "message": "still referenced"},
                {"code": "DEPRECATED_RESOURCE_USED", "message": "old machine type"},
            ],
        }));

        let result = Gcp::finalize_operation(op, "instance deletion").unwrap();
        assert_eq!(result.warnings.len(), 2);
    }
}
