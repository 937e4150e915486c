//! REST transport client.
//!
//! RouterOS v7 exposes its configuration tree under `/rest`: the device path
//! `/ip/service` becomes `https://router/rest/ip/service`. Every attribute is
//! transferred as a JSON string.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::client::{CrudMethod, DeviceClient, Transport};
use crate::config::RestConfig;
use crate::error::{RosError, RosResult};
use crate::filter::Filter;
use crate::item::DeviceItem;

/// URL prefix of the REST API.
pub const REST_PREFIX: &str = "/rest";

/// REST implementation of [`DeviceClient`].
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl RestClient {
    /// Creates a client for the configured device.
    pub fn new(config: &RestConfig) -> RosResult<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure_tls)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| RosError::connect(&config.base_url, e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Builds the full URL for a device path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, REST_PREFIX, path)
    }

    async fn execute(
        &self,
        method: CrudMethod,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> RosResult<Value> {
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(method, path, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_reqwest_error(method, path, e))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(RosError::Auth {
                host: self.base_url.clone(),
                username: self.username.clone(),
            });
        }

        if !status.is_success() {
            return Err(RosError::transport(
                method.http_verb(),
                path,
                error_message(&body, status),
                Some(status.as_u16()),
            ));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            RosError::transport(
                method.http_verb(),
                path,
                format!("invalid JSON response: {}", e),
                Some(status.as_u16()),
            )
        })
    }

    fn map_reqwest_error(&self, method: CrudMethod, path: &str, err: reqwest::Error) -> RosError {
        if err.is_connect() {
            RosError::connect(&self.base_url, err.to_string())
        } else {
            RosError::transport(
                method.http_verb(),
                path,
                err.to_string(),
                err.status().map(|s| s.as_u16()),
            )
        }
    }
}

#[async_trait]
impl DeviceClient for RestClient {
    fn transport(&self) -> Transport {
        Transport::Rest
    }

    #[instrument(skip(self, filter), fields(filter = %filter))]
    async fn query(&self, path: &str, filter: &Filter) -> RosResult<Vec<DeviceItem>> {
        let request = self
            .http
            .request(Method::GET, self.url(path))
            .query(filter.clauses());

        let value = self.execute(CrudMethod::Read, path, request).await?;
        let items = items_from_json(value).map_err(|message| {
            RosError::transport(CrudMethod::Read.http_verb(), path, message, None)
        })?;

        debug!(path = %path, count = items.len(), "REST query complete");
        Ok(items)
    }

    #[instrument(skip(self, item))]
    async fn send(
        &self,
        method: CrudMethod,
        path: &str,
        item: &DeviceItem,
    ) -> RosResult<Option<DeviceItem>> {
        let http_method = match method {
            CrudMethod::Create => Method::PUT,
            CrudMethod::Read => Method::GET,
            CrudMethod::Update => Method::PATCH,
            CrudMethod::Delete => Method::DELETE,
            CrudMethod::Post => Method::POST,
        };

        let mut request = self.http.request(http_method, self.url(path));
        if method != CrudMethod::Delete {
            request = request.json(item);
        }

        let value = self.execute(method, path, request).await?;
        let mut items = items_from_json(value)
            .map_err(|message| RosError::transport(method.http_verb(), path, message, None))?;

        debug!(path = %path, method = %method, "REST write complete");
        Ok(if items.is_empty() {
            None
        } else {
            Some(items.swap_remove(0))
        })
    }
}

/// Converts a REST response body into device items.
///
/// Accepts an array of objects, a single object, or `null`. Non-string
/// scalars are rendered to their text form.
fn items_from_json(value: Value) -> Result<Vec<DeviceItem>, String> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(values) => values.into_iter().map(item_from_json).collect(),
        obj @ Value::Object(_) => Ok(vec![item_from_json(obj)?]),
        other => Err(format!("unexpected response shape: {}", other)),
    }
}

fn item_from_json(value: Value) -> Result<DeviceItem, String> {
    let map = match value {
        Value::Object(map) => map,
        other => return Err(format!("expected object, got {}", other)),
    };

    Ok(map
        .into_iter()
        .map(|(k, v)| {
            let text = match v {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (k, text)
        })
        .collect())
}

/// Extracts the device's error description from a failure body like
/// `{"error":400,"message":"Bad Request","detail":"no such item"}`.
fn error_message(body: &str, status: StatusCode) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    field("detail")
        .or_else(|| field("message"))
        .unwrap_or_else(|| status.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client() -> RestClient {
        RestClient::new(&RestConfig {
            base_url: "https://10.0.0.1:443/".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            insecure_tls: true,
            connect_timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_url() {
        let client = client();
        assert_eq!(client.url("/ip/service"), "https://10.0.0.1:443/rest/ip/service");
        assert_eq!(
            client.url("/ip/service/set"),
            "https://10.0.0.1:443/rest/ip/service/set"
        );
        assert_eq!(client.transport(), Transport::Rest);
    }

    #[test]
    fn test_items_from_array() {
        let value: Value = serde_json::from_str(
            r#"[{".id":"*0","name":"telnet","port":"23"},{".id":"*6","name":"www-ssl"}]"#,
        )
        .unwrap();
        let items = items_from_json(value).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id(), Some("*6"));
    }

    #[test]
    fn test_items_from_object_and_scalars() {
        let value: Value =
            serde_json::from_str(r#"{"version":"7.19 (stable)","uptime":5,"flag":true}"#)
                .unwrap();
        let items = items_from_json(value).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("version"), Some("7.19 (stable)"));
        assert_eq!(items[0].get("uptime"), Some("5"));
        assert_eq!(items[0].get("flag"), Some("true"));
    }

    #[test]
    fn test_items_from_null_and_invalid() {
        assert!(items_from_json(Value::Null).unwrap().is_empty());
        assert!(items_from_json(Value::String("x".into())).is_err());
        assert!(items_from_json(serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error":400,"message":"Bad Request","detail":"no such item"}"#;
        assert_eq!(error_message(body, StatusCode::BAD_REQUEST), "no such item");

        let body = r#"{"error":404,"message":"Not Found"}"#;
        assert_eq!(error_message(body, StatusCode::NOT_FOUND), "Not Found");

        assert_eq!(
            error_message("<html>", StatusCode::BAD_GATEWAY),
            "502 Bad Gateway"
        );
    }
}
