//! Field descriptor sets.
//!
//! A [`ResourceSchema`] describes one configuration object type: where it
//! lives on the device, which fields it has, how instances are found, how
//! writes are addressed and how identifiers are recovered on import. One
//! generic [`crate::ResourceSynchronizer`] drives every schema.

use std::fmt;

use routeros_common::{Filter, DeviceItem, RosError, RosResult, RosVersion, ID_KEY};

use crate::field::{FieldDescriptor, FieldMode, Presence};
use crate::record::{DeclaredRecord, Value};

/// Suffix addressing a singleton's `set` action on the REST transport.
pub const SET_ACTION_SUFFIX: &str = "/set";

/// Binds a declared natural-key field to the device attribute it filters on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    /// Declared field name.
    pub field: String,
    /// Device attribute compared in read filters.
    pub device_attr: String,
}

/// Firmware range in which a gated filter clause applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateBound {
    /// Device version `>=` the given version.
    Since(RosVersion),
    /// Device version `<` the given version.
    Before(RosVersion),
}

/// A filter clause added only for some firmware versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionGate {
    /// Version range.
    pub bound: GateBound,
    /// Device attribute.
    pub attr: String,
    /// Expected value.
    pub value: String,
}

impl VersionGate {
    /// Clause applied from `version` on.
    pub fn since(version: RosVersion, attr: &str, value: &str) -> Self {
        Self {
            bound: GateBound::Since(version),
            attr: attr.to_string(),
            value: value.to_string(),
        }
    }

    /// Clause applied to firmware older than `version`.
    pub fn before(version: RosVersion, attr: &str, value: &str) -> Self {
        Self {
            bound: GateBound::Before(version),
            attr: attr.to_string(),
            value: value.to_string(),
        }
    }

    /// Returns true if the clause applies to `device`.
    pub fn applies_to(&self, device: RosVersion) -> bool {
        match self.bound {
            GateBound::Since(min) => device >= min,
            GateBound::Before(max) => device < max,
        }
    }
}

impl fmt::Display for VersionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bound {
            GateBound::Since(v) => write!(f, "{}={} on {} and later", self.attr, self.value, v),
            GateBound::Before(v) => write!(f, "{}={} before {}", self.attr, self.value, v),
        }
    }
}

/// How writes are addressed on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStyle {
    /// Named singleton entries modified in place with `set`, selected by the
    /// natural key (`numbers=`). Create and update are the same request.
    Singleton,
    /// Collection entries created with `add` and modified by `.id`.
    Collection,
}

/// What delete does for this object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Remove the entry by identifier.
    Remove,
    /// System objects cannot be removed; only local state is dropped.
    ForgetOnly,
}

/// One step of the import identifier resolution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStrategy {
    /// Read through the structured transport with the import filter.
    StructuredQuery,
    /// Probe the console over the command channel.
    CommandProbe,
}

/// A discrepancy between declared and live state worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDrift {
    /// Declared field name.
    pub field: String,
    /// Declared value in device form, `None` if not declared.
    pub declared: Option<String>,
    /// Live value reported by the device, `None` if it no longer reports
    /// the field.
    pub live: Option<String>,
}

impl fmt::Display for FieldDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: declared {:?}, device has {:?}",
            self.field,
            self.declared.as_deref().unwrap_or("<unset>"),
            self.live.as_deref().unwrap_or("<absent>")
        )
    }
}

/// The declarative schema of one configuration object type.
///
/// Read-only after [`ResourceSchemaBuilder::build`].
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    name: String,
    path: String,
    id_key: String,
    fields: Vec<FieldDescriptor>,
    natural_key: Vec<KeyBinding>,
    version_gates: Vec<VersionGate>,
    write_style: WriteStyle,
    delete_policy: DeletePolicy,
    import_strategies: Vec<ImportStrategy>,
    lookup_attrs: Vec<String>,
}

impl ResourceSchema {
    /// Starts a schema for the object type `name` living at device `path`.
    pub fn builder(name: &str, path: &str) -> ResourceSchemaBuilder {
        ResourceSchemaBuilder {
            schema: ResourceSchema {
                name: name.to_string(),
                path: path.to_string(),
                id_key: ID_KEY.to_string(),
                fields: Vec::new(),
                natural_key: Vec::new(),
                version_gates: Vec::new(),
                write_style: WriteStyle::Collection,
                delete_policy: DeletePolicy::Remove,
                import_strategies: vec![ImportStrategy::StructuredQuery],
                lookup_attrs: Vec::new(),
            },
        }
    }

    /// Object type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device path (e.g. `/ip/service`).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Identifier attribute (`.id`).
    pub fn id_key(&self) -> &str {
        &self.id_key
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by declared name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Natural-key bindings.
    pub fn natural_key(&self) -> &[KeyBinding] {
        &self.natural_key
    }

    /// Version-gated filter clauses.
    pub fn version_gates(&self) -> &[VersionGate] {
        &self.version_gates
    }

    /// Write addressing style.
    pub fn write_style(&self) -> WriteStyle {
        self.write_style
    }

    /// Delete behavior.
    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    /// Ordered import strategies.
    pub fn import_strategies(&self) -> &[ImportStrategy] {
        &self.import_strategies
    }

    /// Device attributes tried, in order, by the command-channel probe.
    pub fn lookup_attrs(&self) -> &[String] {
        &self.lookup_attrs
    }

    /// Renders the natural key of a record for logs and errors.
    pub fn key_display(&self, record: &DeclaredRecord) -> String {
        let parts: Vec<String> = self
            .natural_key
            .iter()
            .map(|b| {
                let value = record
                    .get(&b.field)
                    .map(Value::to_device_string)
                    .unwrap_or_else(|| "?".to_string());
                format!("{}={}", b.device_attr, value)
            })
            .collect();
        match (&record.id, parts.is_empty()) {
            (Some(id), true) => id.clone(),
            _ => parts.join(","),
        }
    }

    /// Fills absent optional fields with their defaults.
    pub fn apply_defaults(&self, record: &mut DeclaredRecord) {
        for field in &self.fields {
            if field.presence() == Presence::Optional && record.declared(field.name()).is_none() {
                if let Some(default) = field.default_ref() {
                    record.set(field.name(), default.clone());
                }
            }
        }
    }

    /// Validates user-declared values.
    ///
    /// Rejects unknown fields, computed fields supplied as input, missing
    /// required fields, kind mismatches and validator failures.
    pub fn validate(&self, record: &DeclaredRecord) -> RosResult<()> {
        for (name, value) in record.declared_values() {
            let field = self
                .field(name)
                .ok_or_else(|| RosError::validation(name, format!("unknown field for {}", self.name)))?;
            if field.is_computed() {
                return Err(RosError::validation(
                    name,
                    "computed field cannot be set by the user",
                ));
            }
            field.check(value)?;
        }

        for field in &self.fields {
            if field.presence() == Presence::Required && record.declared(field.name()).is_none() {
                return Err(RosError::validation(field.name(), "required field is missing"));
            }
        }

        Ok(())
    }

    /// Translates a declared record into the device item to write.
    ///
    /// Computed and read-only fields are omitted.
    pub fn to_device_item(&self, record: &DeclaredRecord) -> DeviceItem {
        let mut item = DeviceItem::new();
        for field in self.fields.iter().filter(|f| f.mode().is_writable()) {
            if let Some(value) = record.declared(field.name()) {
                item.set(field.device_attr(), value.to_device_string());
            }
        }
        item
    }

    /// Updates a record from a device item.
    ///
    /// Adopts the item's identifier, overwrites declared read-write values
    /// the device reports and replaces every computed value. Write-only
    /// fields keep their declared value. The record is left untouched if
    /// any value fails to convert.
    pub fn apply_device_item(&self, item: &DeviceItem, record: &mut DeclaredRecord) -> RosResult<()> {
        let mut declared = Vec::new();
        let mut computed = Vec::new();
        for field in &self.fields {
            let Some(raw) = item.get(field.device_attr()) else {
                continue;
            };
            match field.mode() {
                FieldMode::WriteOnly => {}
                FieldMode::ReadWrite => {
                    declared.push((field.name(), field.kind().parse(field.name(), raw)?));
                }
                FieldMode::ReadOnly | FieldMode::Computed => {
                    computed.push((field.name(), field.kind().parse(field.name(), raw)?));
                }
            }
        }

        if let Some(id) = item.get(&self.id_key) {
            record.id = Some(id.to_string());
        }
        record.clear_computed();
        for (name, value) in declared {
            record.set(name, value);
        }
        for (name, value) in computed {
            record.set_computed(name, value);
        }
        Ok(())
    }

    /// Builds the read filter for a record.
    ///
    /// Collection entries with a known identifier are read by `.id`;
    /// otherwise the natural key is used and the version gates are applied
    /// for `device_version`. A version that does not parse aborts the build.
    pub fn read_filter(&self, record: &DeclaredRecord, device_version: &str) -> RosResult<Filter> {
        if let (WriteStyle::Collection, Some(id)) = (self.write_style, &record.id) {
            return Ok(Filter::new().with(self.id_key.as_str(), id.as_str()));
        }

        let mut filter = Filter::new();
        for binding in &self.natural_key {
            let value = record.get(&binding.field).ok_or_else(|| {
                RosError::validation(&binding.field, "natural key field is missing")
            })?;
            filter.insert(binding.device_attr.as_str(), value.to_device_string());
        }

        self.gate_filter(filter, device_version)
    }

    /// Applies the version-gated clauses to `filter`.
    pub fn gate_filter(&self, mut filter: Filter, device_version: &str) -> RosResult<Filter> {
        if self.version_gates.is_empty() {
            return Ok(filter);
        }

        let version = RosVersion::parse(device_version)?;
        for gate in &self.version_gates {
            if gate.applies_to(version) {
                filter.insert(gate.attr.as_str(), gate.value.as_str());
            } else {
                filter.remove(&gate.attr);
            }
        }
        Ok(filter)
    }

    /// Lists the fields whose live value differs significantly from the
    /// declared value.
    ///
    /// Only read-write fields are compared; differences accepted by the
    /// field's [`crate::DiffSuppress`] policy are skipped. A declared field
    /// the device no longer reports is compared as empty.
    pub fn drift(&self, declared: &DeclaredRecord, live: &DeclaredRecord) -> Vec<FieldDrift> {
        self.fields
            .iter()
            .filter(|f| f.mode() == FieldMode::ReadWrite)
            .filter_map(|field| {
                let live_value = live.declared(field.name()).map(Value::to_device_string);
                let declared_value = declared.declared(field.name()).map(Value::to_device_string);

                if declared_value == live_value {
                    return None;
                }
                if field
                    .suppression()
                    .suppresses(declared_value.as_deref(), live_value.as_deref().unwrap_or(""))
                {
                    return None;
                }
                Some(FieldDrift {
                    field: field.name().to_string(),
                    declared: declared_value,
                    live: live_value,
                })
            })
            .collect()
    }
}

/// Builder for [`ResourceSchema`].
#[derive(Debug)]
pub struct ResourceSchemaBuilder {
    schema: ResourceSchema,
}

impl ResourceSchemaBuilder {
    /// Adds a field.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.schema.fields.push(field);
        self
    }

    /// Binds a declared field as (part of) the natural key.
    pub fn natural_key(mut self, field: &str, device_attr: &str) -> Self {
        self.schema.natural_key.push(KeyBinding {
            field: field.to_string(),
            device_attr: device_attr.to_string(),
        });
        self
    }

    /// Adds a version-gated filter clause.
    pub fn version_gate(mut self, gate: VersionGate) -> Self {
        self.schema.version_gates.push(gate);
        self
    }

    /// Sets the write addressing style.
    pub fn write_style(mut self, style: WriteStyle) -> Self {
        self.schema.write_style = style;
        self
    }

    /// Sets the delete behavior.
    pub fn delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.schema.delete_policy = policy;
        self
    }

    /// Replaces the import strategy chain.
    pub fn import_strategies(mut self, strategies: &[ImportStrategy]) -> Self {
        self.schema.import_strategies = strategies.to_vec();
        self
    }

    /// Adds a device attribute for command-channel identifier probes.
    pub fn lookup_attr(mut self, attr: &str) -> Self {
        self.schema.lookup_attrs.push(attr.to_string());
        self
    }

    /// Checks the schema and freezes it.
    pub fn build(self) -> RosResult<ResourceSchema> {
        let schema = self.schema;

        if !schema.path.starts_with('/') {
            return Err(RosError::config(format!(
                "{}: device path '{}' must start with '/'",
                schema.name, schema.path
            )));
        }

        for (idx, field) in schema.fields.iter().enumerate() {
            if schema.fields[..idx].iter().any(|f| f.name() == field.name()) {
                return Err(RosError::config(format!(
                    "{}: duplicate field '{}'",
                    schema.name,
                    field.name()
                )));
            }
            if field.device_attr() == schema.id_key {
                return Err(RosError::config(format!(
                    "{}: field '{}' shadows the identifier key",
                    schema.name,
                    field.name()
                )));
            }
        }

        for binding in &schema.natural_key {
            match schema.field(&binding.field) {
                Some(f) if !f.is_computed() => {}
                Some(_) => {
                    return Err(RosError::config(format!(
                        "{}: natural key '{}' cannot be computed",
                        schema.name, binding.field
                    )))
                }
                None => {
                    return Err(RosError::config(format!(
                        "{}: natural key '{}' is not a declared field",
                        schema.name, binding.field
                    )))
                }
            }
        }

        if schema.write_style == WriteStyle::Singleton && schema.natural_key.is_empty() {
            return Err(RosError::config(format!(
                "{}: singleton resources need a natural key",
                schema.name
            )));
        }

        if schema.import_strategies.is_empty() {
            return Err(RosError::config(format!(
                "{}: at least one import strategy is required",
                schema.name
            )));
        }

        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{DiffSuppress, FieldKind, Validator};
    use pretty_assertions::assert_eq;

    fn schema() -> ResourceSchema {
        ResourceSchema::builder("test_service", "/test/service")
            .field(
                FieldDescriptor::required("numbers", FieldKind::String)
                    .write_only()
                    .validator(Validator::OneOf(&["a", "b"])),
            )
            .field(FieldDescriptor::required("port", FieldKind::Int).validator(Validator::IntBetween(1, 65535)))
            .field(
                FieldDescriptor::optional("address", FieldKind::String)
                    .default_value("")
                    .diff_suppress(DiffSuppress::EmptyMeansDefault("0.0.0.0/0")),
            )
            .field(FieldDescriptor::optional("disabled", FieldKind::Bool))
            .field(FieldDescriptor::optional("tls_version", FieldKind::Enum))
            .field(FieldDescriptor::computed("name", FieldKind::String))
            .field(FieldDescriptor::read_only("dynamic", FieldKind::Bool))
            .natural_key("numbers", "name")
            .version_gate(VersionGate::since(RosVersion::new(7, 19, 0), "dynamic", "false"))
            .write_style(WriteStyle::Singleton)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_rejects_duplicate_field() {
        let err = ResourceSchema::builder("x", "/x")
            .field(FieldDescriptor::optional("a", FieldKind::String))
            .field(FieldDescriptor::optional("a", FieldKind::Int))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate field"));
    }

    #[test]
    fn test_build_rejects_bad_natural_key() {
        assert!(ResourceSchema::builder("x", "/x")
            .field(FieldDescriptor::computed("name", FieldKind::String))
            .natural_key("name", "name")
            .build()
            .is_err());
        assert!(ResourceSchema::builder("x", "/x")
            .natural_key("missing", "name")
            .build()
            .is_err());
        assert!(ResourceSchema::builder("x", "x").build().is_err());
        assert!(ResourceSchema::builder("x", "/x")
            .write_style(WriteStyle::Singleton)
            .build()
            .is_err());
    }

    #[test]
    fn test_validate() {
        let s = schema();
        let ok = DeclaredRecord::new().with("numbers", "a").with("port", 22i64);
        assert!(s.validate(&ok).is_ok());

        let missing = DeclaredRecord::new().with("numbers", "a");
        assert!(s.validate(&missing).is_err());

        let bad_port = DeclaredRecord::new().with("numbers", "a").with("port", 0i64);
        assert!(s.validate(&bad_port).is_err());

        let computed = ok.clone().with("name", "a");
        match s.validate(&computed) {
            Err(RosError::Validation { field, .. }) => assert_eq!(field, "name"),
            other => panic!("Expected Validation error, got {:?}", other),
        }

        let unknown = ok.with("colour", "blue");
        assert!(s.validate(&unknown).is_err());
    }

    #[test]
    fn test_apply_defaults() {
        let s = schema();
        let mut record = DeclaredRecord::new().with("numbers", "a").with("port", 22i64);
        s.apply_defaults(&mut record);
        assert_eq!(record.declared("address"), Some(&Value::from("")));
        assert_eq!(record.declared("disabled"), None);
    }

    #[test]
    fn test_to_device_item_omits_computed() {
        let s = schema();
        let mut record = DeclaredRecord::new()
            .with("numbers", "a")
            .with("port", 8080i64)
            .with("tls_version", "any");
        record.set_computed("name", Value::from("a"));

        let item = s.to_device_item(&record);
        assert_eq!(item.get("numbers"), Some("a"));
        assert_eq!(item.get("port"), Some("8080"));
        assert_eq!(item.get("tls-version"), Some("any"));
        assert_eq!(item.get("name"), None);
    }

    #[test]
    fn test_round_trip_read_write_fields() {
        let s = schema();
        let record = DeclaredRecord::new()
            .with("numbers", "b")
            .with("port", 443i64)
            .with("address", "10.0.0.0/24")
            .with("disabled", true)
            .with("tls_version", "only-1.2");

        let item = s.to_device_item(&record);
        let mut back = DeclaredRecord::new();
        s.apply_device_item(&item, &mut back).unwrap();

        for field in s.fields().iter().filter(|f| f.mode() == FieldMode::ReadWrite) {
            assert_eq!(back.declared(field.name()), record.declared(field.name()));
        }
    }

    #[test]
    fn test_apply_device_item() {
        let s = schema();
        let item: DeviceItem = [
            (".id", "*6"),
            ("name", "b"),
            ("port", "443"),
            ("dynamic", "false"),
            ("invalid", "false"),
        ]
        .into_iter()
        .collect();

        let mut record = DeclaredRecord::new().with("numbers", "b").with("port", 8443i64);
        s.apply_device_item(&item, &mut record).unwrap();

        assert_eq!(record.id.as_deref(), Some("*6"));
        assert_eq!(record.declared("numbers"), Some(&Value::from("b")));
        assert_eq!(record.declared("port"), Some(&Value::Int(443)));
        assert_eq!(record.computed("name"), Some(&Value::from("b")));
        assert_eq!(record.computed("dynamic"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_apply_device_item_bad_value() {
        let s = schema();
        let item: DeviceItem = [("port", "https")].into_iter().collect();
        let mut record = DeclaredRecord::new();
        assert!(matches!(
            s.apply_device_item(&item, &mut record),
            Err(RosError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_apply_device_item_failure_leaves_record() {
        let s = schema();
        let mut record = DeclaredRecord::new().with("numbers", "a").with("port", 22i64);
        record.id = Some("*1".to_string());
        record.set_computed("name", Value::from("a"));
        let before = record.clone();

        // disabled fails after port and address converted
        let item: DeviceItem = [
            (".id", "*6"),
            ("name", "b"),
            ("port", "443"),
            ("address", "10.0.0.0/24"),
            ("disabled", "maybe"),
        ]
        .into_iter()
        .collect();
        assert!(s.apply_device_item(&item, &mut record).is_err());
        assert_eq!(record, before);
    }

    #[test]
    fn test_read_filter_version_gating() {
        let s = schema();
        let record = DeclaredRecord::new().with("numbers", "a").with("port", 22i64);

        let old = s.read_filter(&record, "7.16").unwrap();
        assert_eq!(old.to_string(), "name=a");

        let new = s.read_filter(&record, "7.19").unwrap();
        assert_eq!(new.to_string(), "name=a dynamic=false");

        let newer = s.read_filter(&record, "7.20.1 (stable)").unwrap();
        assert!(newer.contains("dynamic"));

        // A release candidate of 7.19 predates the final release
        let rc = s.read_filter(&record, "7.19rc3").unwrap();
        assert!(!rc.contains("dynamic"));
    }

    #[test]
    fn test_read_filter_bad_version_aborts() {
        let s = schema();
        let record = DeclaredRecord::new().with("numbers", "a");
        assert!(matches!(
            s.read_filter(&record, "unknown"),
            Err(RosError::VersionParse { .. })
        ));
    }

    #[test]
    fn test_read_filter_missing_key() {
        let s = schema();
        assert!(matches!(
            s.read_filter(&DeclaredRecord::new(), "7.19"),
            Err(RosError::Validation { .. })
        ));
    }

    #[test]
    fn test_version_gate_display() {
        let since = VersionGate::since(RosVersion::new(7, 19, 0), "dynamic", "false");
        assert_eq!(since.to_string(), "dynamic=false on 7.19 and later");
        let before = VersionGate::before(RosVersion::new(7, 0, 0), "legacy", "yes");
        assert_eq!(before.to_string(), "legacy=yes before 7.0");
    }

    #[test]
    fn test_gate_before_removes_clause() {
        let s = ResourceSchema::builder("x", "/x")
            .version_gate(VersionGate::before(RosVersion::new(7, 0, 0), "legacy", "yes"))
            .build()
            .unwrap();

        let f = s.gate_filter(Filter::new().with("legacy", "yes"), "7.1").unwrap();
        assert!(!f.contains("legacy"));
        let f = s.gate_filter(Filter::new(), "6.49.17").unwrap();
        assert_eq!(f.get("legacy"), Some("yes"));
    }

    #[test]
    fn test_collection_filter_uses_id() {
        let s = ResourceSchema::builder("pool", "/ip/pool")
            .field(FieldDescriptor::required("name", FieldKind::String))
            .natural_key("name", "name")
            .build()
            .unwrap();

        let mut record = DeclaredRecord::new().with("name", "dhcp");
        assert_eq!(s.read_filter(&record, "7.19").unwrap().to_string(), "name=dhcp");
        record.id = Some("*A".to_string());
        assert_eq!(s.read_filter(&record, "7.19").unwrap().to_string(), ".id=*A");
    }

    #[test]
    fn test_drift_with_suppression() {
        let s = schema();
        let declared = DeclaredRecord::new()
            .with("numbers", "a")
            .with("port", 22i64)
            .with("address", "");

        let live = DeclaredRecord::new()
            .with("port", 22i64)
            .with("address", "0.0.0.0/0")
            .with("disabled", false);
        // address "" vs 0.0.0.0/0 is suppressed; disabled is undeclared and
        // not suppressed
        let drift = s.drift(&declared, &live);
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].field, "disabled");
        assert_eq!(drift[0].declared, None);

        let live = DeclaredRecord::new().with("port", 2222i64).with("address", "10.0.0.0/24");
        let fields: Vec<String> = s.drift(&declared, &live).into_iter().map(|d| d.field).collect();
        assert_eq!(fields, vec!["port".to_string(), "address".to_string()]);
    }

    #[test]
    fn test_drift_reports_vanished_value() {
        let s = schema();
        let declared = DeclaredRecord::new()
            .with("numbers", "a")
            .with("port", 22i64)
            .with("address", "")
            .with("tls_version", "only-1.2");

        // address "" against an absent value is suppressed as the default
        let live = DeclaredRecord::new().with("port", 22i64);
        let drift = s.drift(&declared, &live);
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].field, "tls_version");
        assert_eq!(drift[0].declared.as_deref(), Some("only-1.2"));
        assert_eq!(drift[0].live, None);
        assert_eq!(
            drift[0].to_string(),
            "tls_version: declared \"only-1.2\", device has \"<absent>\""
        );
    }

    #[test]
    fn test_key_display() {
        let s = schema();
        let record = DeclaredRecord::new().with("numbers", "a");
        assert_eq!(s.key_display(&record), "name=a");
        assert_eq!(s.key_display(&DeclaredRecord::new()), "name=?");
    }
}
