//! Generic CRUD engine driven by a [`ResourceSchema`].

use std::sync::Arc;

use routeros_common::{rosquote, CrudMethod, DeviceItem, Filter, RosError, RosResult, Transport};
use tracing::{debug, info, instrument, warn};

use crate::context::SyncContext;
use crate::record::DeclaredRecord;
use crate::resolver::{self, ResolvedId};
use crate::schema::{DeletePolicy, ImportStrategy, ResourceSchema, WriteStyle, SET_ACTION_SUFFIX};

/// Result of a successful read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Exactly one match; the record was refreshed.
    Present,
    /// No match; the stored identifier was cleared.
    Gone,
}

/// Key forms accepted by [`ResourceSynchronizer::import`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKey {
    /// Internal identifier (`*6`).
    Id(String),
    /// Explicit attribute match (`name=ssh`).
    Attr {
        /// Device attribute.
        attr: String,
        /// Expected value.
        value: String,
    },
    /// Value of the first natural-key field (`ssh`).
    Natural(String),
}

impl ImportKey {
    /// Parses an import key.
    pub fn parse(key: &str) -> RosResult<Self> {
        let key = key.trim();
        if key.is_empty() {
            return Err(RosError::validation("import", "empty import key"));
        }
        if key.starts_with('*') {
            return Ok(ImportKey::Id(key.to_string()));
        }
        match key.split_once('=') {
            Some((attr, value)) if !attr.is_empty() => Ok(ImportKey::Attr {
                attr: attr.to_string(),
                value: value.to_string(),
            }),
            Some(_) => Err(RosError::validation("import", format!("malformed key '{}'", key))),
            None => Ok(ImportKey::Natural(key.to_string())),
        }
    }
}

/// Read, create-or-update, delete and import for one object type.
#[derive(Debug, Clone)]
pub struct ResourceSynchronizer {
    schema: Arc<ResourceSchema>,
}

impl ResourceSynchronizer {
    /// Creates a synchronizer for `schema`.
    pub fn new(schema: Arc<ResourceSchema>) -> Self {
        Self { schema }
    }

    /// The schema driving this synchronizer.
    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    /// Refreshes `record` from the device.
    ///
    /// Zero matches clear the identifier and yield [`ReadOutcome::Gone`];
    /// more than one match is a [`RosError::DataConsistency`].
    #[instrument(
        skip(self, ctx, record),
        fields(resource = %self.schema.name(), key = %self.schema.key_display(record))
    )]
    pub async fn read(
        &self,
        ctx: &SyncContext<'_>,
        record: &mut DeclaredRecord,
    ) -> RosResult<ReadOutcome> {
        let filter = self.schema.read_filter(record, ctx.device_version())?;
        let items = ctx.query(self.schema.path(), &filter).await?;

        match items.as_slice() {
            [] => {
                info!(filter = %filter, "Resource no longer exists");
                record.clear_id();
                Ok(ReadOutcome::Gone)
            }
            [item] => {
                self.schema.apply_device_item(item, record)?;
                debug!(id = ?record.id, "Resource refreshed");
                Ok(ReadOutcome::Present)
            }
            _ => Err(RosError::DataConsistency {
                path: self.schema.path().to_string(),
                filter: filter.to_string(),
                count: items.len(),
            }),
        }
    }

    /// Writes `record` to the device, then reads it back.
    ///
    /// Singletons are modified in place by natural key, so create and
    /// update are the same request. Collection entries are added when the
    /// record has no identifier and modified by identifier otherwise.
    #[instrument(
        skip(self, ctx, record),
        fields(resource = %self.schema.name(), key = %self.schema.key_display(record))
    )]
    pub async fn create_or_update(
        &self,
        ctx: &SyncContext<'_>,
        record: &mut DeclaredRecord,
    ) -> RosResult<()> {
        self.schema.apply_defaults(record);
        self.schema.validate(record)?;
        let item = self.schema.to_device_item(record);

        match self.schema.write_style() {
            WriteStyle::Singleton => {
                let path = match ctx.transport() {
                    Transport::Rest => format!("{}{}", self.schema.path(), SET_ACTION_SUFFIX),
                    Transport::Api => self.schema.path().to_string(),
                };
                ctx.send(CrudMethod::Post, &path, &item).await?;
            }
            WriteStyle::Collection => match record.id.clone() {
                Some(id) => {
                    let (path, item) = self.entry_target(ctx.transport(), &id, item);
                    ctx.send(CrudMethod::Update, &path, &item).await?;
                }
                None => {
                    let echoed = ctx.send(CrudMethod::Create, self.schema.path(), &item).await?;
                    if let Some(id) = echoed.as_ref().and_then(DeviceItem::id) {
                        debug!(id = %id, "Device assigned identifier");
                        record.id = Some(id.to_string());
                    }
                }
            },
        }

        match self.read(ctx, record).await? {
            ReadOutcome::Present => {
                info!(id = ?record.id, "Resource written");
                Ok(())
            }
            ReadOutcome::Gone => Err(RosError::not_found(
                self.schema.path(),
                self.schema.key_display(record),
            )),
        }
    }

    /// Removes the object identified by `record`.
    ///
    /// Idempotent: a record without identifier, or one the device no longer
    /// knows, is not an error. System objects that cannot be removed are
    /// only forgotten.
    #[instrument(
        skip(self, ctx, record),
        fields(resource = %self.schema.name(), id = ?record.id)
    )]
    pub async fn delete(&self, ctx: &SyncContext<'_>, record: &mut DeclaredRecord) -> RosResult<()> {
        let Some(id) = record.id.clone() else {
            debug!("No identifier stored, nothing to delete");
            return Ok(());
        };

        match self.schema.delete_policy() {
            DeletePolicy::ForgetOnly => {
                warn!(id = %id, "System object cannot be removed from the device, forgetting it");
            }
            DeletePolicy::Remove => {
                let (path, item) = self.entry_target(ctx.transport(), &id, DeviceItem::new());
                match ctx.send(CrudMethod::Delete, &path, &item).await {
                    Ok(_) => info!(id = %id, "Resource removed"),
                    Err(e) if e.is_device_not_found() => {
                        info!(id = %id, "Resource already absent");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        record.clear_id();
        Ok(())
    }

    /// Builds a record for an existing object from an import key.
    ///
    /// Tries the schema's import strategies in order. A strategy that finds
    /// nothing, has its filter rejected by the device or cannot run (no
    /// command channel) hands over to the next one. Any other failure is
    /// returned as is. When every strategy misses, the last miss is kept as
    /// the source of [`RosError::IdentifierUnresolved`].
    #[instrument(skip(self, ctx), fields(resource = %self.schema.name()))]
    pub async fn import(&self, ctx: &mut SyncContext<'_>, key: &str) -> RosResult<DeclaredRecord> {
        let import_key = ImportKey::parse(key)?;
        let mut last_miss = None;

        for strategy in self.schema.import_strategies() {
            let attempt = match strategy {
                ImportStrategy::StructuredQuery => self.import_by_query(ctx, &import_key).await,
                ImportStrategy::CommandProbe => self.import_by_probe(ctx, &import_key).await,
            };

            match attempt {
                Ok(record) => {
                    info!(strategy = ?strategy, id = ?record.id, "Resource imported");
                    return Ok(record);
                }
                Err(e) if e.is_lookup_miss() || matches!(e, RosError::Config { .. }) => {
                    warn!(strategy = ?strategy, error = %e, "Import strategy missed");
                    last_miss = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(RosError::identifier_unresolved(
            self.schema.path(),
            key,
            last_miss,
        ))
    }

    async fn import_by_query(
        &self,
        ctx: &SyncContext<'_>,
        key: &ImportKey,
    ) -> RosResult<DeclaredRecord> {
        let filter = match key {
            ImportKey::Id(id) => Filter::new().with(self.schema.id_key(), id.as_str()),
            ImportKey::Attr { attr, value } => {
                let filter = Filter::new().with(attr.as_str(), value.as_str());
                self.schema.gate_filter(filter, ctx.device_version())?
            }
            ImportKey::Natural(value) => {
                let binding = self.schema.natural_key().first().ok_or_else(|| {
                    RosError::validation("import", format!("{} has no natural key", self.schema.name()))
                })?;
                let filter = Filter::new().with(binding.device_attr.as_str(), value.as_str());
                self.schema.gate_filter(filter, ctx.device_version())?
            }
        };

        self.import_one(ctx, &filter).await
    }

    async fn import_by_probe(
        &self,
        ctx: &mut SyncContext<'_>,
        key: &ImportKey,
    ) -> RosResult<DeclaredRecord> {
        let candidates: Vec<String> = match key {
            ImportKey::Id(id) => vec![format!("{}={}", self.schema.id_key(), id)],
            ImportKey::Attr { attr, value } => vec![format!("{}={}", attr, rosquote(value))],
            ImportKey::Natural(value) => self
                .schema
                .lookup_attrs()
                .iter()
                .map(|attr| format!("{}={}", attr, rosquote(value)))
                .collect(),
        };

        let path = self.schema.path();
        let resolved = match ctx.channel() {
            Some(channel) => resolver::resolve(channel, path, &candidates).await,
            None => {
                return Err(RosError::config(format!(
                    "no command channel attached for probing {}",
                    path
                )))
            }
        };

        match resolved {
            ResolvedId::Found(id) => {
                let filter = Filter::new().with(self.schema.id_key(), id);
                self.import_one(ctx, &filter).await
            }
            ResolvedId::Unknown => Err(RosError::identifier_unresolved(
                path,
                candidates.join(" | "),
                None,
            )),
        }
    }

    async fn import_one(&self, ctx: &SyncContext<'_>, filter: &Filter) -> RosResult<DeclaredRecord> {
        let items = ctx.query(self.schema.path(), filter).await?;
        let item = match items.as_slice() {
            [item] => item,
            [] => return Err(RosError::not_found(self.schema.path(), filter.to_string())),
            _ => {
                return Err(RosError::DataConsistency {
                    path: self.schema.path().to_string(),
                    filter: filter.to_string(),
                    count: items.len(),
                })
            }
        };

        let mut record = DeclaredRecord::new();
        self.schema.apply_device_item(item, &mut record)?;

        // Write-only key fields are never reported back; recover them from
        // the attribute they filter on.
        for binding in self.schema.natural_key() {
            if record.declared(&binding.field).is_some() {
                continue;
            }
            if let (Some(field), Some(raw)) = (
                self.schema.field(&binding.field),
                item.get(&binding.device_attr),
            ) {
                record.set(binding.field.as_str(), field.kind().parse(field.name(), raw)?);
            }
        }

        Ok(record)
    }

    /// Address of a collection entry: `<path>/<id>` over REST, the bare
    /// path with `.id` in the payload over the legacy API.
    fn entry_target(&self, transport: Transport, id: &str, mut item: DeviceItem) -> (String, DeviceItem) {
        match transport {
            Transport::Rest => (format!("{}/{}", self.schema.path(), id), item),
            Transport::Api => {
                item.set(self.schema.id_key(), id);
                (self.schema.path().to_string(), item)
            }
        }
    }
}
