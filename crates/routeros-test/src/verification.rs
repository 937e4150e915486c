//! Verification helpers for testing synchronizers
//!
//! Assertions over the requests a [`MockDevice`] received.

use routeros_common::CrudMethod;
use thiserror::Error;

use crate::mock_device::{MockDevice, RecordedQuery, RecordedRequest};

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Expected a {method} request to '{path}', got {seen:?}")]
    RequestNotFound {
        method: String,
        path: String,
        seen: Vec<String>,
    },

    #[error("Expected no write requests, got {count}")]
    UnexpectedWrites { count: usize },

    #[error("Expected attribute '{attr}' {expectation} in the last query on '{path}', filter was '{filter}'")]
    FilterMismatch {
        path: String,
        attr: String,
        expectation: &'static str,
        filter: String,
    },

    #[error("No query on '{path}' was recorded")]
    NoQuery { path: String },

    #[error("Field '{field}' of the request to '{path}': expected {expected:?}, got {actual:?}")]
    PayloadMismatch {
        path: String,
        field: String,
        expected: Option<String>,
        actual: Option<String>,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Request verification helper
pub struct RequestVerifier<'a> {
    device: &'a MockDevice,
}

impl<'a> RequestVerifier<'a> {
    /// Create a new verifier
    pub fn new(device: &'a MockDevice) -> Self {
        Self { device }
    }

    /// Verify that a write with `method` was sent to `path`, returning the last one
    pub fn assert_request(&self, method: CrudMethod, path: &str) -> VerifyResult<RecordedRequest> {
        let requests = self.device.requests();
        requests
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .cloned()
            .ok_or_else(|| VerificationError::RequestNotFound {
                method: method.to_string(),
                path: path.to_string(),
                seen: requests
                    .iter()
                    .map(|r| format!("{} {}", r.method, r.path))
                    .collect(),
            })
    }

    /// Verify a payload attribute of the last `method` request to `path`
    pub fn assert_payload(
        &self,
        method: CrudMethod,
        path: &str,
        field: &str,
        expected: Option<&str>,
    ) -> VerifyResult<()> {
        let request = self.assert_request(method, path)?;
        let actual = request.item.get(field);
        if actual != expected {
            return Err(VerificationError::PayloadMismatch {
                path: path.to_string(),
                field: field.to_string(),
                expected: expected.map(str::to_string),
                actual: actual.map(str::to_string),
            });
        }
        Ok(())
    }

    /// Verify that nothing was written
    pub fn assert_no_writes(&self) -> VerifyResult<()> {
        let count = self.device.requests().len();
        if count > 0 {
            return Err(VerificationError::UnexpectedWrites { count });
        }
        Ok(())
    }

    /// Verify whether the last query on `path` filtered on `attr`
    pub fn assert_last_filter(&self, path: &str, attr: &str, present: bool) -> VerifyResult<()> {
        let query: RecordedQuery = self
            .device
            .queries()
            .into_iter()
            .rev()
            .find(|q| q.path == path)
            .ok_or_else(|| VerificationError::NoQuery {
                path: path.to_string(),
            })?;

        if query.filter.contains(attr) != present {
            return Err(VerificationError::FilterMismatch {
                path: path.to_string(),
                attr: attr.to_string(),
                expectation: if present { "present" } else { "absent" },
                filter: query.filter.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{service_fixtures, IP_SERVICE_PATH};
    use routeros_common::{DeviceClient, DeviceItem, Filter};

    #[tokio::test]
    async fn test_verifier() {
        let device = MockDevice::new("7.19")
            .with_table(IP_SERVICE_PATH, service_fixtures::default_services());
        let verifier = RequestVerifier::new(&device);
        verifier.assert_no_writes().unwrap();

        device
            .query(IP_SERVICE_PATH, &Filter::new().with("name", "ssh"))
            .await
            .unwrap();
        verifier.assert_last_filter(IP_SERVICE_PATH, "name", true).unwrap();
        assert!(verifier.assert_last_filter(IP_SERVICE_PATH, "dynamic", true).is_err());

        device
            .send(
                CrudMethod::Post,
                "/ip/service/set",
                &DeviceItem::new().with("numbers", "ssh").with("port", "2222"),
            )
            .await
            .unwrap();
        verifier
            .assert_payload(CrudMethod::Post, "/ip/service/set", "port", Some("2222"))
            .unwrap();
        assert!(verifier.assert_request(CrudMethod::Delete, IP_SERVICE_PATH).is_err());
        assert!(verifier.assert_no_writes().is_err());
    }
}
