//! In-memory RouterOS device.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use routeros_common::client::SYSTEM_RESOURCE_PATH;
use routeros_common::{
    CrudMethod, DeviceClient, DeviceItem, Filter, RosError, RosResult, RosVersion, Transport,
    ID_KEY,
};
use tracing::debug;

/// Firmware that first accepts `dynamic` as a filter attribute.
const DYNAMIC_FILTER_SINCE: RosVersion = RosVersion::new(7, 19, 0);

/// A write request received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Request kind.
    pub method: CrudMethod,
    /// Addressed path.
    pub path: String,
    /// Payload.
    pub item: DeviceItem,
}

/// A query received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    /// Queried path.
    pub path: String,
    /// Filter as sent.
    pub filter: Filter,
}

/// Whole-device failure injected with [`MockDevice::inject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Every call is refused with [`RosError::Auth`].
    RejectCredentials,
    /// Every call fails with HTTP 500.
    ServerError,
    /// Every call is accepted and never answered.
    Stall,
}

#[derive(Debug, Default)]
struct DeviceState {
    tables: HashMap<String, Vec<DeviceItem>>,
    defaults: HashMap<String, Vec<(String, String)>>,
    failing_attrs: Vec<String>,
    fault: Option<Fault>,
    requests: Vec<RecordedRequest>,
    queries: Vec<RecordedQuery>,
    next_id: u32,
}

impl DeviceState {
    fn bump_next_id(&mut self, item: &DeviceItem) {
        let parsed = item
            .id()
            .and_then(|id| id.strip_prefix('*'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok());
        if let Some(n) = parsed {
            self.next_id = self.next_id.max(n + 1);
        }
    }

    fn allocate_id(&mut self) -> String {
        let id = format!("*{:X}", self.next_id);
        self.next_id += 1;
        id
    }
}

/// In-memory device implementing [`DeviceClient`].
///
/// Behaves like a RouterOS router for the subset the engine uses:
/// filtered queries, `add` with identifier allocation, `set` on a singleton
/// table by `numbers`, modify and remove by identifier. Filtering on
/// `dynamic` is rejected below 7.19, as real firmware does.
#[derive(Debug)]
pub struct MockDevice {
    transport: Transport,
    version: String,
    state: Mutex<DeviceState>,
}

impl MockDevice {
    /// Creates an empty REST device reporting `version`.
    pub fn new(version: &str) -> Self {
        Self {
            transport: Transport::Rest,
            version: version.to_string(),
            state: Mutex::new(DeviceState::default()),
        }
    }

    /// Changes the transport dialect the mock claims to speak.
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Seeds a table.
    pub fn with_table(self, path: &str, items: Vec<DeviceItem>) -> Self {
        for item in items {
            self.insert(path, item);
        }
        self
    }

    /// Attribute the device fills in on `add` when the request omits it.
    pub fn with_default(self, path: &str, attr: &str, value: &str) -> Self {
        self.lock()
            .defaults
            .entry(path.to_string())
            .or_default()
            .push((attr.to_string(), value.to_string()));
        self
    }

    /// Makes every query filtering on `attr` fail, as firmware that does not
    /// know the attribute does.
    pub fn fail_queries_on(&self, attr: &str) {
        self.lock().failing_attrs.push(attr.to_string());
    }

    /// Makes every subsequent call fail as `fault` describes.
    pub fn inject(&self, fault: Fault) {
        self.lock().fault = Some(fault);
    }

    /// Adds an item, allocating an identifier if it has none.
    pub fn insert(&self, path: &str, mut item: DeviceItem) -> String {
        let mut state = self.lock();
        let id = match item.id() {
            Some(id) => id.to_string(),
            None => {
                let id = state.allocate_id();
                item.set(ID_KEY, id.as_str());
                id
            }
        };
        state.bump_next_id(&item);
        state.tables.entry(path.to_string()).or_default().push(item);
        id
    }

    /// Removes an item behind the engine's back.
    pub fn remove(&self, path: &str, id: &str) -> Option<DeviceItem> {
        let mut state = self.lock();
        let table = state.tables.get_mut(path)?;
        let idx = table.iter().position(|i| i.id() == Some(id))?;
        Some(table.remove(idx))
    }

    /// Current contents of a table.
    pub fn items(&self, path: &str) -> Vec<DeviceItem> {
        self.lock().tables.get(path).cloned().unwrap_or_default()
    }

    /// Finds an item by `name`.
    pub fn find_by_name(&self, path: &str, name: &str) -> Option<DeviceItem> {
        self.items(path)
            .into_iter()
            .find(|i| i.get("name") == Some(name))
    }

    /// Write requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.lock().queries.clone()
    }

    /// Total number of calls, queries included.
    pub fn call_count(&self) -> usize {
        let state = self.lock();
        state.requests.len() + state.queries.len()
    }

    /// Forgets recorded requests and queries.
    pub fn clear_history(&self) {
        let mut state = self.lock();
        state.requests.clear();
        state.queries.clear();
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn supports_dynamic_filter(&self) -> bool {
        RosVersion::parse(&self.version)
            .map(|v| v >= DYNAMIC_FILTER_SINCE)
            .unwrap_or(false)
    }

    /// Splits an entry address into table path and identifier.
    fn entry_address(&self, path: &str, item: &DeviceItem) -> Option<(String, String)> {
        match self.transport {
            Transport::Rest => {
                let (table, id) = path.rsplit_once('/')?;
                id.starts_with('*').then(|| (table.to_string(), id.to_string()))
            }
            Transport::Api => item.id().map(|id| (path.to_string(), id.to_string())),
        }
    }

    async fn check_fault(&self, method: &str, path: &str) -> RosResult<()> {
        let fault = self.lock().fault;
        match fault {
            None => Ok(()),
            Some(Fault::RejectCredentials) => Err(RosError::Auth {
                host: "mock".to_string(),
                username: "admin".to_string(),
            }),
            Some(Fault::ServerError) => Err(RosError::transport(
                method,
                path,
                "Internal Server Error",
                Some(500),
            )),
            Some(Fault::Stall) => std::future::pending().await,
        }
    }

    fn no_such_item(method: CrudMethod, path: &str) -> RosError {
        RosError::transport(method.http_verb(), path, "no such item", Some(404))
    }

    fn set_by_numbers(&self, path: &str, item: &DeviceItem) -> RosResult<()> {
        let table_path = match self.transport {
            Transport::Rest => path.strip_suffix("/set").unwrap_or(path),
            Transport::Api => path,
        };
        let numbers = item.get("numbers").ok_or_else(|| {
            RosError::transport("POST", path, "missing value for numbers", Some(400))
        })?;

        let mut changes = item.clone();
        changes.remove("numbers");

        let mut state = self.lock();
        let table = state
            .tables
            .get_mut(table_path)
            .ok_or_else(|| Self::no_such_item(CrudMethod::Post, path))?;

        for key in numbers.split(',').map(str::trim) {
            let target = table
                .iter_mut()
                .find(|i| i.get("name") == Some(key) || i.id() == Some(key))
                .ok_or_else(|| Self::no_such_item(CrudMethod::Post, path))?;
            target.merge(&changes);
            debug!(path = %table_path, numbers = %key, "Mock set applied");
        }
        Ok(())
    }
}

#[async_trait]
impl DeviceClient for MockDevice {
    fn transport(&self) -> Transport {
        self.transport
    }

    async fn query(&self, path: &str, filter: &Filter) -> RosResult<Vec<DeviceItem>> {
        self.lock().queries.push(RecordedQuery {
            path: path.to_string(),
            filter: filter.clone(),
        });
        self.check_fault("GET", path).await?;

        let state = self.lock();

        if path == SYSTEM_RESOURCE_PATH {
            return Ok(vec![DeviceItem::new()
                .with("version", self.version.as_str())
                .with("board-name", "CHR")
                .with("architecture-name", "x86_64")]);
        }

        if filter.contains("dynamic") && !self.supports_dynamic_filter() {
            return Err(RosError::transport(
                "GET",
                path,
                "unknown parameter dynamic",
                Some(400),
            ));
        }
        if let Some(attr) = state.failing_attrs.iter().find(|a| filter.contains(a)) {
            return Err(RosError::transport(
                "GET",
                path,
                format!("unknown parameter {}", attr),
                Some(400),
            ));
        }

        Ok(state
            .tables
            .get(path)
            .map(|table| table.iter().filter(|i| filter.matches(i)).cloned().collect())
            .unwrap_or_default())
    }

    async fn send(
        &self,
        method: CrudMethod,
        path: &str,
        item: &DeviceItem,
    ) -> RosResult<Option<DeviceItem>> {
        self.lock().requests.push(RecordedRequest {
            method,
            path: path.to_string(),
            item: item.clone(),
        });
        self.check_fault(method.http_verb(), path).await?;

        match method {
            CrudMethod::Post => {
                self.set_by_numbers(path, item)?;
                Ok(None)
            }
            CrudMethod::Create => {
                let mut state = self.lock();
                let mut created = item.clone();
                let id = state.allocate_id();
                created.set(ID_KEY, id.as_str());
                if let Some(defaults) = state.defaults.get(path) {
                    for (attr, value) in defaults {
                        if !created.contains(attr) {
                            created.set(attr.as_str(), value.as_str());
                        }
                    }
                }
                state
                    .tables
                    .entry(path.to_string())
                    .or_default()
                    .push(created.clone());
                Ok(Some(created))
            }
            CrudMethod::Update => {
                let (table_path, id) = self
                    .entry_address(path, item)
                    .ok_or_else(|| Self::no_such_item(method, path))?;
                let mut changes = item.clone();
                changes.remove(ID_KEY);

                let mut state = self.lock();
                let target = state
                    .tables
                    .get_mut(&table_path)
                    .and_then(|t| t.iter_mut().find(|i| i.id() == Some(id.as_str())))
                    .ok_or_else(|| Self::no_such_item(method, path))?;
                target.merge(&changes);
                Ok(Some(target.clone()))
            }
            CrudMethod::Delete => {
                let (table_path, id) = self
                    .entry_address(path, item)
                    .ok_or_else(|| Self::no_such_item(method, path))?;
                self.remove(&table_path, &id)
                    .map(|_| None)
                    .ok_or_else(|| Self::no_such_item(method, path))
            }
            CrudMethod::Read => Err(RosError::transport(
                method.http_verb(),
                path,
                "reads go through query",
                Some(400),
            )),
        }
    }
}
