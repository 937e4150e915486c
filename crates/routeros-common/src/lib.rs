//! Common infrastructure for RouterOS configuration synchronization.
//!
//! This crate provides the pieces every synchronizer needs to reach a
//! RouterOS-family router:
//!
//! - [`error`]: Error taxonomy shared by transports and the engine
//! - [`version`]: Firmware version parsing and ordering
//! - [`item`] / [`filter`]: Device-native items and read filters
//! - [`client`]: The structured transport boundary ([`DeviceClient`])
//! - [`rest`]: REST transport client
//! - [`channel`] / [`ssh`]: Console command channel over SSH
//! - [`config`]: Connection configuration loaded from TOML
//!
//! # Example
//!
//! ```ignore
//! use routeros_common::{DeviceClient, DeviceConfig, RestClient, RosVersion};
//!
//! let config = DeviceConfig::load()?;
//! let client = RestClient::new(&config.rest_config())?;
//! let version = RosVersion::parse(&client.reported_version().await?)?;
//! ```

pub mod channel;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod item;
pub mod rest;
pub mod ssh;
pub mod version;

// Re-export commonly used items at crate root
pub use channel::{rosquote, CommandChannel};
pub use client::{with_deadline, CrudMethod, DeviceClient, Transport};
pub use config::{DeviceConfig, HostKeyPolicy, RestConfig, SshConfig};
pub use error::{RosError, RosResult};
pub use filter::Filter;
pub use item::{DeviceItem, ID_KEY};
pub use rest::RestClient;
pub use ssh::SshChannel;
pub use version::RosVersion;
