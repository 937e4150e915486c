//! Per-device synchronization context.

use std::fmt;
use std::time::Duration;

use routeros_common::{
    with_deadline, CommandChannel, CrudMethod, DeviceClient, DeviceItem, Filter, RosResult,
    Transport,
};
use tracing::info;

/// Everything an operation needs to reach one device: the structured
/// client, the firmware version it reported, an optional command channel
/// for identifier probes and an optional per-request deadline.
pub struct SyncContext<'a> {
    client: &'a dyn DeviceClient,
    device_version: String,
    channel: Option<&'a mut (dyn CommandChannel + 'a)>,
    timeout: Option<Duration>,
}

impl<'a> SyncContext<'a> {
    /// Creates a context for a device that reported `device_version`.
    pub fn new(client: &'a dyn DeviceClient, device_version: impl Into<String>) -> Self {
        Self {
            client,
            device_version: device_version.into(),
            channel: None,
            timeout: None,
        }
    }

    /// Creates a context by asking the device for its firmware version.
    ///
    /// `timeout` bounds the version query and every request made through
    /// the returned context.
    pub async fn discover(
        client: &'a dyn DeviceClient,
        timeout: Option<Duration>,
    ) -> RosResult<SyncContext<'a>> {
        let version = with_deadline("discover", timeout, client.reported_version()).await?;
        info!(transport = %client.transport(), version = %version, "Discovered device");
        Ok(Self::new(client, version).with_timeout(timeout))
    }

    /// Attaches a command channel used for identifier probes.
    pub fn with_channel(mut self, channel: &'a mut (dyn CommandChannel + 'a)) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Bounds every structured request by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Transport dialect of the structured client.
    pub fn transport(&self) -> Transport {
        self.client.transport()
    }

    /// Firmware version string as reported by the device.
    pub fn device_version(&self) -> &str {
        &self.device_version
    }

    /// Queries `path` under the configured deadline.
    pub async fn query(&self, path: &str, filter: &Filter) -> RosResult<Vec<DeviceItem>> {
        with_deadline("query", self.timeout, self.client.query(path, filter)).await
    }

    /// Sends one write request under the configured deadline.
    pub async fn send(
        &self,
        method: CrudMethod,
        path: &str,
        item: &DeviceItem,
    ) -> RosResult<Option<DeviceItem>> {
        with_deadline(
            method.http_verb(),
            self.timeout,
            self.client.send(method, path, item),
        )
        .await
    }

    /// The attached command channel, if any.
    pub fn channel(&mut self) -> Option<&mut (dyn CommandChannel + 'a)> {
        self.channel.as_deref_mut()
    }
}

impl fmt::Debug for SyncContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncContext")
            .field("transport", &self.client.transport())
            .field("device_version", &self.device_version)
            .field("channel", &self.channel.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}
