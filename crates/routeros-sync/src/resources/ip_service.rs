//! `/ip/service`: the fixed set of management services.
//!
//! Services are system singletons addressed by name through `numbers`. They
//! cannot be added or removed, only reconfigured.
//!
//! ```text
//! .id=*6 address= certificate=https-cert disabled=false invalid=false
//! name=www-ssl port=443 proto=tcp tls-version=any vrf=main
//! ```

use routeros_common::{RosResult, RosVersion};

use crate::field::{DiffSuppress, FieldDescriptor, FieldKind, Validator};
use crate::schema::{DeletePolicy, ImportStrategy, ResourceSchema, VersionGate, WriteStyle};

/// Object type name.
pub const NAME: &str = "ip_service";

/// Device path.
pub const PATH: &str = "/ip/service";

/// Service names accepted by `numbers`.
pub const SERVICE_NAMES: &[&str] = &[
    "api", "api-ssl", "ftp", "ssh", "telnet", "winbox", "www", "www-ssl",
];

/// First firmware accepting `dynamic` as a filter attribute.
pub const DYNAMIC_FILTER_SINCE: RosVersion = RosVersion::new(7, 19, 0);

/// Address value the device reports when access is unrestricted.
pub const ANY_ADDRESS: &str = "0.0.0.0/0";

/// Builds the `/ip/service` schema.
pub fn schema() -> RosResult<ResourceSchema> {
    ResourceSchema::builder(NAME, PATH)
        .field(
            FieldDescriptor::optional("address", FieldKind::String)
                .default_value("")
                .diff_suppress(DiffSuppress::EmptyMeansDefault(ANY_ADDRESS))
                .describe("List of IP/IPv6 prefixes from which the service is accessible."),
        )
        .field(
            FieldDescriptor::optional("certificate", FieldKind::String)
                .diff_suppress(DiffSuppress::AlwaysPresentNotUserProvided)
                .describe("Certificate used by TLS services (www-ssl, api-ssl)."),
        )
        .field(
            FieldDescriptor::optional("disabled", FieldKind::Bool)
                .diff_suppress(DiffSuppress::AlwaysPresentNotUserProvided),
        )
        .field(FieldDescriptor::read_only("dynamic", FieldKind::Bool))
        .field(FieldDescriptor::read_only("invalid", FieldKind::Bool))
        .field(
            FieldDescriptor::optional("max_sessions", FieldKind::Int)
                .validator(Validator::IntAtLeast(1))
                .diff_suppress(DiffSuppress::AlwaysPresentNotUserProvided)
                .describe("Maximum number of concurrent connections (RouterOS 7.16+)."),
        )
        .field(FieldDescriptor::computed("name", FieldKind::String).describe("Service name."))
        .field(
            FieldDescriptor::required("numbers", FieldKind::String)
                .write_only()
                .validator(Validator::ManyOf(SERVICE_NAMES))
                .describe("Name of the service whose settings are changed."),
        )
        .field(
            FieldDescriptor::required("port", FieldKind::Int)
                .validator(Validator::IntBetween(1, 65535))
                .describe("Port the service listens on."),
        )
        .field(FieldDescriptor::computed("proto", FieldKind::String))
        .field(
            FieldDescriptor::optional("tls_version", FieldKind::Enum)
                .validator(Validator::OneOf(&["any", "only-1.2"]))
                .diff_suppress(DiffSuppress::AlwaysPresentNotUserProvided)
                .describe("TLS versions allowed by the service."),
        )
        .field(
            FieldDescriptor::optional("vrf", FieldKind::String)
                .diff_suppress(DiffSuppress::AlwaysPresentNotUserProvided),
        )
        .natural_key("numbers", "name")
        // Older firmware rejects `dynamic` as a filter attribute
        .version_gate(VersionGate::since(DYNAMIC_FILTER_SINCE, "dynamic", "false"))
        .write_style(WriteStyle::Singleton)
        .delete_policy(DeletePolicy::ForgetOnly)
        .import_strategies(&[ImportStrategy::StructuredQuery, ImportStrategy::CommandProbe])
        .lookup_attr("name")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DeclaredRecord;
    use routeros_common::RosError;

    #[test]
    fn test_device_names() {
        let s = schema().unwrap();
        assert_eq!(s.field("max_sessions").unwrap().device_attr(), "max-sessions");
        assert_eq!(s.field("tls_version").unwrap().device_attr(), "tls-version");
    }

    #[test]
    fn test_numbers_validation() {
        let s = schema().unwrap();
        let ok = DeclaredRecord::new().with("numbers", "www-ssl").with("port", 443i64);
        assert!(s.validate(&ok).is_ok());

        let bad = DeclaredRecord::new().with("numbers", "gopher").with("port", 70i64);
        assert!(matches!(s.validate(&bad), Err(RosError::Validation { .. })));
    }

    #[test]
    fn test_tls_and_sessions_validation() {
        let s = schema().unwrap();
        let base = DeclaredRecord::new().with("numbers", "api-ssl").with("port", 8729i64);

        assert!(s.validate(&base.clone().with("tls_version", "only-1.2")).is_ok());
        assert!(s.validate(&base.clone().with("tls_version", "only-1.3")).is_err());
        assert!(s.validate(&base.clone().with("max_sessions", 0i64)).is_err());
        assert!(s.validate(&base.with("max_sessions", 20i64)).is_ok());
    }

    #[test]
    fn test_address_suppression() {
        let s = schema().unwrap();
        let suppress = s.field("address").unwrap().suppression();
        assert!(suppress.suppresses(Some(""), ANY_ADDRESS));
        assert!(!suppress.suppresses(Some(""), "10.0.0.0/24"));
    }

    #[test]
    fn test_certificate_not_user_provided() {
        let s = schema().unwrap();
        let suppress = s.field("certificate").unwrap().suppression();
        assert!(suppress.suppresses(None, "none"));
        assert!(!suppress.suppresses(Some("https-cert"), "other-cert"));
    }
}
