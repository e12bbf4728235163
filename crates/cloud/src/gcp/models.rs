//! Compute API request and response models.

use serde::Deserialize;

/// Terminal status value of a compute operation.
const STATUS_DONE: &str = "DONE";

/// A compute operation (async task).
///
/// Returned by mutating calls such as instance or address deletion, and by
/// the zone/region operation-status endpoints. Only the fields the waiter
/// consults are modeled.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation name, used to poll its status.
    pub name: String,
    /// Status: `PENDING`, `RUNNING` or `DONE`.
    pub status: String,
    /// Numeric operation ID.
    pub id: Option<String>,
    /// Operation type (e.g. `delete`).
    pub operation_type: Option<String>,
    /// Link to the resource the operation acts on.
    pub target_link: Option<String>,
    /// Link to the operation itself.
    pub self_link: Option<String>,
    /// Zone (URL) for zonal operations.
    pub zone: Option<String>,
    /// Region (URL) for regional operations.
    pub region: Option<String>,
    /// HTTP status code set when the operation failed.
    pub http_error_status_code: Option<u16>,
    /// HTTP error message set when the operation failed.
    pub http_error_message: Option<String>,
    /// Error details, present only on failure.
    pub error: Option<OperationError>,
    /// Warnings raised while processing the operation.
    #[serde(default)]
    pub warnings: Vec<OperationWarning>,
}

impl Operation {
    /// Whether the operation has reached its terminal state.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == STATUS_DONE
    }
}

/// Operation error wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationError {
    /// Errors.
    #[serde(default)]
    pub errors: Vec<OperationErrorDetail>,
}

/// Operation error detail.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationErrorDetail {
    /// Error code (e.g. `RESOURCE_NOT_FOUND`).
    pub code: Option<String>,
    /// Error message.
    pub message: Option<String>,
}

/// Warning attached to an operation.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationWarning {
    /// Warning code (e.g. `RESOURCE_IN_USE`).
    pub code: Option<String>,
    /// Warning message.
    pub message: Option<String>,
}

/// Bare operation reference carrying only a name.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationRef {
    /// Operation name.
    pub name: String,
}

/// Response shape of the address delete call.
///
/// The API may answer with a full long-running operation, with a bare
/// reference that only names one, or with neither; the variants are tried
/// in that order. A body matching neither shape needs no wait.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AddressDeleteResponse {
    /// Full long-running operation payload.
    Operation(Operation),
    /// Named reference to an operation, resolved via the region
    /// operation-status endpoint.
    Reference(OperationRef),
    /// Anything else; the delete is treated as already settled.
    Other(serde_json::Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_is_done() {
        let operation: Operation =
            serde_json::from_value(json!({"name": "op-1", "status": "DONE"})).unwrap();
        assert!(operation.is_done());

        let operation: Operation =
            serde_json::from_value(json!({"name": "op-1", "status": "RUNNING"})).unwrap();
        assert!(!operation.is_done());
    }

    #[test]
    fn test_operation_parses_error_and_warnings() {
        let operation: Operation = serde_json::from_value(json!({
            "name": "op-2",
            "status": "DONE",
            "httpErrorStatusCode": 404,
            "httpErrorMessage": "NOT FOUND",
            "error": {"errors": [{"code": "RESOURCE_NOT_FOUND", "message": "not found"}]},
            "warnings": [{"code": "RESOURCE_IN_USE", "message": "still referenced"}],
        }))
        .unwrap();

        assert_eq!(operation.http_error_status_code, Some(404));
        assert_eq!(operation.error.unwrap().errors.len(), 1);
        assert_eq!(operation.warnings.len(), 1);
    }

    #[test]
    fn test_address_delete_response_full_operation() {
        let response: AddressDeleteResponse =
            serde_json::from_value(json!({"name": "op-3", "status": "RUNNING"})).unwrap();
        assert!(matches!(response, AddressDeleteResponse::Operation(_)));
    }

    #[test]
    fn test_address_delete_response_named_reference() {
        let response: AddressDeleteResponse =
            serde_json::from_value(json!({"name": "op-4"})).unwrap();
        match response {
            AddressDeleteResponse::Reference(reference) => assert_eq!(reference.name, "op-4"),
            other => panic!("expected a named reference, got {other:?}"),
        }
    }

    #[test]
    fn test_address_delete_response_unrecognized_shape() {
        let response: AddressDeleteResponse =
            serde_json::from_value(json!({"kind": "compute#address"})).unwrap();
        assert!(matches!(response, AddressDeleteResponse::Other(_)));
    }
}
