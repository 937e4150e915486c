//! Test fixtures for common device tables
//!
//! Items mirror what a factory-default router reports.

use routeros_common::{DeviceItem, ID_KEY};

/// Path of the management services table.
pub const IP_SERVICE_PATH: &str = "/ip/service";

/// Path of the address pool table.
pub const IP_POOL_PATH: &str = "/ip/pool";

/// Builds a device item from attribute pairs.
pub fn item(pairs: &[(&str, &str)]) -> DeviceItem {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Service fixtures (`/ip/service`)
pub mod service_fixtures {
    use super::*;

    /// Default services with their ports, in device order.
    pub const DEFAULT_SERVICES: &[(&str, &str)] = &[
        ("telnet", "23"),
        ("ftp", "21"),
        ("www", "80"),
        ("ssh", "22"),
        ("www-ssl", "443"),
        ("api", "8728"),
        ("winbox", "8291"),
        ("api-ssl", "8729"),
    ];

    /// One service entry as reported by the device.
    pub fn service(id: &str, name: &str, port: &str) -> DeviceItem {
        let mut service = item(&[
            (ID_KEY, id),
            ("address", ""),
            ("disabled", "false"),
            ("dynamic", "false"),
            ("invalid", "false"),
            ("name", name),
            ("port", port),
            ("proto", "tcp"),
            ("vrf", "main"),
        ]);
        if name.ends_with("-ssl") {
            service.set("certificate", "none");
            service.set("tls-version", "any");
        }
        service
    }

    /// The full factory-default `/ip/service` table.
    pub fn default_services() -> Vec<DeviceItem> {
        DEFAULT_SERVICES
            .iter()
            .enumerate()
            .map(|(idx, (name, port))| service(&format!("*{:X}", idx), name, port))
            .collect()
    }

    /// A dynamic service entry sharing a name with a static one, as created
    /// by container port forwarding on newer firmware.
    pub fn dynamic_duplicate(id: &str, name: &str, port: &str) -> DeviceItem {
        service(id, name, port).with("dynamic", "true")
    }
}

/// Address pool fixtures (`/ip/pool`)
pub mod pool_fixtures {
    use super::*;

    /// The default DHCP pool.
    pub fn dhcp_pool(id: &str) -> DeviceItem {
        item(&[
            (ID_KEY, id),
            ("name", "dhcp"),
            ("ranges", "192.168.88.10-192.168.88.254"),
            ("next-pool", "none"),
        ])
    }
}
