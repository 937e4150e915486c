//! Field descriptors.
//!
//! A [`FieldDescriptor`] declares one attribute of a configuration object:
//! its kind, who may write it, its default, how it is validated and when a
//! discrepancy with the device is not worth reporting.

use routeros_common::{RosError, RosResult};

use crate::record::Value;

/// Value kind of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form string.
    String,
    /// Signed integer.
    Int,
    /// Boolean (`true`/`false`, also `yes`/`no` on the device side).
    Bool,
    /// String restricted to an allowed set (see [`Validator::OneOf`]).
    Enum,
    /// Comma-separated list.
    List,
}

impl FieldKind {
    /// Converts a device string into a typed value.
    pub fn parse(&self, field: &str, raw: &str) -> RosResult<Value> {
        let invalid = |message: &str| RosError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
            message: message.to_string(),
        };

        match self {
            FieldKind::String | FieldKind::Enum => Ok(Value::String(raw.to_string())),
            FieldKind::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| invalid("expected an integer")),
            FieldKind::Bool => match raw {
                "true" | "yes" => Ok(Value::Bool(true)),
                "false" | "no" => Ok(Value::Bool(false)),
                _ => Err(invalid("expected a boolean")),
            },
            FieldKind::List => Ok(Value::List(if raw.is_empty() {
                Vec::new()
            } else {
                raw.split(',').map(|s| s.trim().to_string()).collect()
            })),
        }
    }

    /// Returns true if the declared value has this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldKind::String | FieldKind::Enum, Value::String(_))
                | (FieldKind::Int, Value::Int(_))
                | (FieldKind::Bool, Value::Bool(_))
                | (FieldKind::List, Value::List(_))
        )
    }
}

/// Who may write a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    /// Declared by the user and reported back by the device.
    ReadWrite,
    /// Reported by the device only (status flags).
    ReadOnly,
    /// Sent to the device but never reported back (e.g. `numbers`).
    WriteOnly,
    /// Derived by the device from other attributes.
    Computed,
}

impl FieldMode {
    /// Returns true if the field is sent to the device.
    pub fn is_writable(&self) -> bool {
        matches!(self, FieldMode::ReadWrite | FieldMode::WriteOnly)
    }

    /// Returns true if the device reports the field.
    pub fn is_readable(&self) -> bool {
        !matches!(self, FieldMode::WriteOnly)
    }
}

/// Whether the user must, may or cannot supply a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Must be declared.
    Required,
    /// May be declared.
    Optional,
    /// Never declared; always taken from the device.
    Computed,
}

/// Declared-value validation rule.
#[derive(Debug, Clone)]
pub enum Validator {
    /// Integer within `[min, max]`.
    IntBetween(i64, i64),
    /// Integer `>= min`.
    IntAtLeast(i64),
    /// String equal to one of the allowed values.
    OneOf(&'static [&'static str]),
    /// Comma-separated string or list whose every element is allowed.
    ManyOf(&'static [&'static str]),
    /// Arbitrary predicate returning an error message on failure.
    Custom(fn(&Value) -> Result<(), String>),
}

impl Validator {
    /// Checks a declared value.
    pub fn check(&self, field: &str, value: &Value) -> RosResult<()> {
        let fail = |message: String| Err(RosError::validation(field, message));

        match self {
            Validator::IntBetween(min, max) => match value.as_int() {
                Some(i) if (*min..=*max).contains(&i) => Ok(()),
                _ => fail(format!("expected an integer between {} and {}", min, max)),
            },
            Validator::IntAtLeast(min) => match value.as_int() {
                Some(i) if i >= *min => Ok(()),
                _ => fail(format!("expected an integer of at least {}", min)),
            },
            Validator::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| *a == s) => Ok(()),
                _ => fail(format!("expected one of [{}]", allowed.join(", "))),
            },
            Validator::ManyOf(allowed) => {
                let parts: Vec<&str> = match value {
                    Value::String(s) => s.split(',').map(str::trim).collect(),
                    Value::List(l) => l.iter().map(String::as_str).collect(),
                    _ => return fail("expected a string or list".to_string()),
                };
                match parts.iter().find(|p| !allowed.iter().any(|a| a == *p)) {
                    None if !parts.is_empty() => Ok(()),
                    None => fail("expected at least one value".to_string()),
                    Some(bad) => fail(format!(
                        "'{}' is not one of [{}]",
                        bad,
                        allowed.join(", ")
                    )),
                }
            }
            Validator::Custom(check) => check(value).or_else(fail),
        }
    }
}

/// Decides whether a discrepancy between declared and live values is
/// insignificant. Values are compared in device string form.
#[derive(Debug, Clone)]
pub enum DiffSuppress {
    /// Report every difference.
    Never,
    /// An empty declared value is equivalent to the given device default
    /// (e.g. `""` vs `0.0.0.0/0`).
    EmptyMeansDefault(&'static str),
    /// The device always reports the attribute; accept whatever it reports
    /// when the user never supplied a value.
    AlwaysPresentNotUserProvided,
    /// Arbitrary predicate over `(declared, live)`.
    Custom(fn(Option<&str>, &str) -> bool),
}

impl DiffSuppress {
    /// Returns true if the difference between `declared` and `live` should
    /// be ignored.
    pub fn suppresses(&self, declared: Option<&str>, live: &str) -> bool {
        match self {
            DiffSuppress::Never => false,
            DiffSuppress::EmptyMeansDefault(default) => {
                declared.unwrap_or("").is_empty() && (live == *default || live.is_empty())
            }
            DiffSuppress::AlwaysPresentNotUserProvided => declared.is_none(),
            DiffSuppress::Custom(f) => f(declared, live),
        }
    }
}

/// One declared field of a configuration object type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    device_name: String,
    kind: FieldKind,
    mode: FieldMode,
    presence: Presence,
    default: Option<Value>,
    validator: Option<Validator>,
    diff_suppress: DiffSuppress,
    description: &'static str,
}

impl FieldDescriptor {
    fn new(name: &str, kind: FieldKind, mode: FieldMode, presence: Presence) -> Self {
        Self {
            name: name.to_string(),
            device_name: name.replace('_', "-"),
            kind,
            mode,
            presence,
            default: None,
            validator: None,
            diff_suppress: DiffSuppress::Never,
            description: "",
        }
    }

    /// A read-write field the user must declare.
    pub fn required(name: &str, kind: FieldKind) -> Self {
        Self::new(name, kind, FieldMode::ReadWrite, Presence::Required)
    }

    /// A read-write field the user may declare.
    pub fn optional(name: &str, kind: FieldKind) -> Self {
        Self::new(name, kind, FieldMode::ReadWrite, Presence::Optional)
    }

    /// A value the device derives.
    pub fn computed(name: &str, kind: FieldKind) -> Self {
        Self::new(name, kind, FieldMode::Computed, Presence::Computed)
    }

    /// A status attribute the device reports.
    pub fn read_only(name: &str, kind: FieldKind) -> Self {
        Self::new(name, kind, FieldMode::ReadOnly, Presence::Computed)
    }

    /// Marks a required/optional field as never reported back.
    pub fn write_only(mut self) -> Self {
        if self.presence != Presence::Computed {
            self.mode = FieldMode::WriteOnly;
        }
        self
    }

    /// Overrides the device attribute name (default: `_` replaced by `-`).
    pub fn device_name(mut self, device_name: &str) -> Self {
        self.device_name = device_name.to_string();
        self
    }

    /// Sets the value used when the user does not declare the field.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the validation rule.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Sets the diff-suppression policy.
    pub fn diff_suppress(mut self, policy: DiffSuppress) -> Self {
        self.diff_suppress = policy;
        self
    }

    /// Sets the human-readable description.
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Declared field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device attribute name.
    pub fn device_attr(&self) -> &str {
        &self.device_name
    }

    /// Value kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Read/write mode.
    pub fn mode(&self) -> FieldMode {
        self.mode
    }

    /// Required / optional / computed.
    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// Value used when the user does not declare the field.
    pub fn default_ref(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Diff-suppression policy.
    pub fn suppression(&self) -> &DiffSuppress {
        &self.diff_suppress
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Returns true if the user may not declare the field.
    pub fn is_computed(&self) -> bool {
        self.presence == Presence::Computed
    }

    /// Checks kind and validator for a declared value.
    pub fn check(&self, value: &Value) -> RosResult<()> {
        if !self.kind.accepts(value) {
            return Err(RosError::validation(
                &self.name,
                format!("expected {:?}, got {}", self.kind, value.kind_name()),
            ));
        }
        match &self.validator {
            Some(v) => v.check(&self.name, value),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_name_is_kebab() {
        let f = FieldDescriptor::optional("tls_version", FieldKind::Enum);
        assert_eq!(f.device_attr(), "tls-version");
        let f = FieldDescriptor::required("numbers", FieldKind::String).device_name("name");
        assert_eq!(f.device_attr(), "name");
    }

    #[test]
    fn test_modes_and_presence() {
        let f = FieldDescriptor::computed("proto", FieldKind::String);
        assert!(f.is_computed());
        assert_eq!(f.mode(), FieldMode::Computed);
        assert!(!f.mode().is_writable());

        // write_only does not turn a computed field writable
        let f = FieldDescriptor::computed("proto", FieldKind::String).write_only();
        assert_eq!(f.mode(), FieldMode::Computed);

        let f = FieldDescriptor::required("numbers", FieldKind::String).write_only();
        assert_eq!(f.mode(), FieldMode::WriteOnly);
        assert!(f.mode().is_writable());
        assert!(!f.mode().is_readable());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(FieldKind::Int.parse("port", "443").unwrap(), Value::Int(443));
        assert!(FieldKind::Int.parse("port", "https").is_err());
        assert_eq!(FieldKind::Bool.parse("disabled", "yes").unwrap(), Value::Bool(true));
        assert_eq!(FieldKind::Bool.parse("disabled", "false").unwrap(), Value::Bool(false));
        assert!(FieldKind::Bool.parse("disabled", "maybe").is_err());
        assert_eq!(FieldKind::List.parse("ranges", "").unwrap(), Value::List(vec![]));
        assert_eq!(
            FieldKind::List.parse("ranges", "a, b").unwrap(),
            Value::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_int_validators() {
        let v = Validator::IntBetween(1, 65535);
        assert!(v.check("port", &Value::Int(22)).is_ok());
        assert!(v.check("port", &Value::Int(0)).is_err());
        assert!(v.check("port", &Value::Int(65536)).is_err());

        let v = Validator::IntAtLeast(1);
        assert!(v.check("max_sessions", &Value::Int(1)).is_ok());
        assert!(v.check("max_sessions", &Value::Int(0)).is_err());
    }

    #[test]
    fn test_set_validators() {
        let v = Validator::OneOf(&["any", "only-1.2"]);
        assert!(v.check("tls_version", &Value::from("any")).is_ok());
        assert!(v.check("tls_version", &Value::from("only-1.3")).is_err());

        let v = Validator::ManyOf(&["ssh", "www", "www-ssl"]);
        assert!(v.check("numbers", &Value::from("ssh")).is_ok());
        assert!(v.check("numbers", &Value::from("ssh,www")).is_ok());
        assert!(v.check("numbers", &Value::from("ssh,gopher")).is_err());
        assert!(v.check("numbers", &Value::Int(1)).is_err());
    }

    #[test]
    fn test_custom_validator() {
        fn even(value: &Value) -> Result<(), String> {
            match value.as_int() {
                Some(i) if i % 2 == 0 => Ok(()),
                _ => Err("must be even".to_string()),
            }
        }
        let v = Validator::Custom(even);
        assert!(v.check("n", &Value::Int(2)).is_ok());
        match v.check("n", &Value::Int(3)) {
            Err(RosError::Validation { field, message }) => {
                assert_eq!(field, "n");
                assert_eq!(message, "must be even");
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_check_kind_mismatch() {
        let f = FieldDescriptor::required("port", FieldKind::Int);
        assert!(f.check(&Value::from("22")).is_err());
        assert!(f.check(&Value::Int(22)).is_ok());
    }

    #[test]
    fn test_empty_means_default() {
        let s = DiffSuppress::EmptyMeansDefault("0.0.0.0/0");
        assert!(s.suppresses(Some(""), "0.0.0.0/0"));
        assert!(s.suppresses(None, "0.0.0.0/0"));
        assert!(!s.suppresses(Some(""), "10.0.0.0/24"));
        assert!(!s.suppresses(Some("10.0.0.0/24"), "0.0.0.0/0"));
    }

    #[test]
    fn test_always_present_not_user_provided() {
        let s = DiffSuppress::AlwaysPresentNotUserProvided;
        assert!(s.suppresses(None, "https-cert"));
        assert!(!s.suppresses(Some("other-cert"), "https-cert"));
    }

    #[test]
    fn test_never_suppresses() {
        assert!(!DiffSuppress::Never.suppresses(None, "x"));
    }
}
