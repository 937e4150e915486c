//! Resource synchronization engine for RouterOS configuration objects.
//!
//! Reconciles declared records against a device's live configuration:
//!
//! - [`field`] / [`schema`]: Declarative description of an object type
//! - [`record`]: Declared records and typed values
//! - [`context`]: Client, firmware version and command channel for one device
//! - [`synchronizer`]: Read / create-or-update / delete / import
//! - [`resolver`]: Identifier probing over the command channel
//! - [`resources`]: Concrete object types
//!
//! # Example
//!
//! ```ignore
//! use routeros_sync::{resources, DeclaredRecord, SyncContext};
//!
//! let ctx = SyncContext::discover(&client, Some(Duration::from_secs(10))).await?;
//! let sync = resources::synchronizer_for("ip_service")?;
//! let mut record = DeclaredRecord::new()
//!     .with("numbers", "www-ssl")
//!     .with("port", 443i64)
//!     .with("certificate", "https-cert");
//! sync.create_or_update(&ctx, &mut record).await?;
//! ```

pub mod context;
pub mod field;
pub mod record;
pub mod resolver;
pub mod resources;
pub mod schema;
pub mod synchronizer;

pub use context::SyncContext;
pub use field::{DiffSuppress, FieldDescriptor, FieldKind, FieldMode, Presence, Validator};
pub use record::{DeclaredRecord, Value};
pub use resolver::{resolve, ResolvedId, UNKNOWN_ID};
pub use schema::{
    DeletePolicy, FieldDrift, ImportStrategy, ResourceSchema, VersionGate, WriteStyle,
};
pub use synchronizer::{ImportKey, ReadOutcome, ResourceSynchronizer};
