//! Concrete object types built on the generic engine.
//!
//! Each submodule only declares a [`crate::ResourceSchema`]; all behavior
//! comes from [`crate::ResourceSynchronizer`].

pub mod ip_pool;
pub mod ip_service;

use std::sync::Arc;

use routeros_common::{RosError, RosResult};

use crate::synchronizer::ResourceSynchronizer;

/// Names of the object types known to this crate.
pub const RESOURCE_NAMES: &[&str] = &[ip_service::NAME, ip_pool::NAME];

/// Returns the synchronizer for an object type by name.
pub fn synchronizer_for(name: &str) -> RosResult<ResourceSynchronizer> {
    let schema = match name {
        ip_service::NAME => ip_service::schema()?,
        ip_pool::NAME => ip_pool::schema()?,
        other => {
            return Err(RosError::config(format!(
                "unknown resource type '{}', expected one of {:?}",
                other, RESOURCE_NAMES
            )))
        }
    };
    Ok(ResourceSynchronizer::new(Arc::new(schema)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_schema_builds() {
        for name in RESOURCE_NAMES {
            let sync = synchronizer_for(name).unwrap();
            assert_eq!(sync.schema().name(), *name);
        }
    }

    #[test]
    fn test_unknown_resource() {
        assert!(matches!(
            synchronizer_for("ip_firewall"),
            Err(RosError::Config { .. })
        ));
    }
}
