//! `/ip/pool`: named address pools, a plain collection.

use routeros_common::RosResult;

use crate::field::{DiffSuppress, FieldDescriptor, FieldKind, Validator};
use crate::record::Value;
use crate::schema::{DeletePolicy, ImportStrategy, ResourceSchema, WriteStyle};

/// Object type name.
pub const NAME: &str = "ip_pool";

/// Device path.
pub const PATH: &str = "/ip/pool";

fn check_ranges(value: &Value) -> Result<(), String> {
    let ranges = value.as_list().ok_or("expected a list of ranges")?;
    if ranges.is_empty() {
        return Err("at least one range is required".to_string());
    }
    match ranges.iter().find(|r| r.trim().is_empty()) {
        Some(_) => Err("empty range".to_string()),
        None => Ok(()),
    }
}

/// Builds the `/ip/pool` schema.
pub fn schema() -> RosResult<ResourceSchema> {
    ResourceSchema::builder(NAME, PATH)
        .field(FieldDescriptor::required("name", FieldKind::String))
        .field(
            FieldDescriptor::required("ranges", FieldKind::List)
                .validator(Validator::Custom(check_ranges))
                .describe("Address ranges, e.g. 10.0.0.10-10.0.0.100."),
        )
        .field(
            FieldDescriptor::optional("next_pool", FieldKind::String)
                .diff_suppress(DiffSuppress::AlwaysPresentNotUserProvided),
        )
        .field(FieldDescriptor::optional("comment", FieldKind::String))
        .natural_key("name", "name")
        .write_style(WriteStyle::Collection)
        .delete_policy(DeletePolicy::Remove)
        .import_strategies(&[ImportStrategy::StructuredQuery, ImportStrategy::CommandProbe])
        .lookup_attr("name")
        .lookup_attr("comment")
        .build()
}
