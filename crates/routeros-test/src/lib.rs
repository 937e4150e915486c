//! Test infrastructure for RouterOS synchronization
//!
//! Provides:
//! - An in-memory device implementing `DeviceClient`
//! - A scripted command channel
//! - Fixtures mirroring factory-default device tables
//! - Request verification helpers

pub mod fixtures;
mod mock_channel;
mod mock_device;
mod verification;

pub use fixtures::*;
pub use mock_channel::MockChannel;
pub use mock_device::{Fault, MockDevice, RecordedQuery, RecordedRequest};
pub use verification::*;
