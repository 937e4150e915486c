//! Structured transport boundary.
//!
//! The synchronization engine talks to the device only through
//! [`DeviceClient`]. The REST transport is implemented in [`crate::rest`];
//! the legacy binary API is represented by [`Transport::Api`] and plugged in
//! by implementing the same trait.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RosError, RosResult};
use crate::filter::Filter;
use crate::item::DeviceItem;

/// Device path holding firmware metadata.
pub const SYSTEM_RESOURCE_PATH: &str = "/system/resource";

/// Attribute of `/system/resource` carrying the firmware version.
pub const VERSION_ATTR: &str = "version";

/// Transport dialect used to reach the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// REST-like HTTP API under `/rest`.
    Rest,
    /// Legacy binary management protocol.
    Api,
}

impl Transport {
    /// Returns the transport name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Rest => "rest",
            Transport::Api => "api",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical request kinds, shared by every transport.
///
/// REST maps them to `PUT`, `GET`, `PATCH`, `DELETE` and `POST`. The legacy
/// API maps them to the `/add`, `/print`, `/set`, `/remove` command words,
/// with `Post` addressing a singleton's own `set` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrudMethod {
    /// Add a new collection entry.
    Create,
    /// Query items.
    Read,
    /// Modify an entry addressed by identifier.
    Update,
    /// Remove an entry addressed by identifier.
    Delete,
    /// Run a command at the exact path (e.g. `/ip/service/set`).
    Post,
}

impl CrudMethod {
    /// Returns the HTTP verb used by the REST transport.
    pub fn http_verb(&self) -> &'static str {
        match self {
            CrudMethod::Create => "PUT",
            CrudMethod::Read => "GET",
            CrudMethod::Update => "PATCH",
            CrudMethod::Delete => "DELETE",
            CrudMethod::Post => "POST",
        }
    }

    /// Returns the command word used by the legacy API transport.
    pub fn api_command(&self) -> &'static str {
        match self {
            CrudMethod::Create => "/add",
            CrudMethod::Read => "/print",
            CrudMethod::Update | CrudMethod::Post => "/set",
            CrudMethod::Delete => "/remove",
        }
    }
}

impl fmt::Display for CrudMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.http_verb())
    }
}

/// A structured connection to a RouterOS device.
///
/// Implementations must be usable from one operation at a time; callers
/// serialize operations on the same object instance.
#[async_trait]
pub trait DeviceClient: Send + Sync {
    /// Returns the transport dialect of this client.
    fn transport(&self) -> Transport;

    /// Returns the items at `path` matching every clause of `filter`.
    async fn query(&self, path: &str, filter: &Filter) -> RosResult<Vec<DeviceItem>>;

    /// Sends a single write request.
    ///
    /// Returns the item echoed by the device, if any (e.g. the newly
    /// created entry with its `.id`).
    async fn send(
        &self,
        method: CrudMethod,
        path: &str,
        item: &DeviceItem,
    ) -> RosResult<Option<DeviceItem>>;

    /// Reads the firmware version reported by `/system/resource`.
    async fn reported_version(&self) -> RosResult<String> {
        let items = self.query(SYSTEM_RESOURCE_PATH, &Filter::new()).await?;
        items
            .first()
            .and_then(|item| item.get(VERSION_ATTR))
            .map(str::to_string)
            .ok_or_else(|| RosError::not_found(SYSTEM_RESOURCE_PATH, VERSION_ATTR))
    }
}

/// Runs `fut` under an optional deadline.
///
/// Expiry is reported as [`RosError::Timeout`] naming `operation`.
pub async fn with_deadline<F, T>(
    operation: &str,
    timeout: Option<Duration>,
    fut: F,
) -> RosResult<T>
where
    F: Future<Output = RosResult<T>>,
{
    match timeout {
        None => fut.await,
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation = %operation, timeout = ?limit, "Deadline expired");
                Err(RosError::Timeout {
                    operation: operation.to_string(),
                    timeout: limit,
                })
            }
        },
    }
}
