//! Identifier resolution over the command channel.
//!
//! Some objects cannot be addressed through the structured transports (no
//! stable filterable key, or firmware without filter support). The console
//! still reveals their internal identifier through
//! `:put [<path> get [find <expr>]]`, whose output contains `.id=*<hex>`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use routeros_common::channel::find_get_command;
use routeros_common::CommandChannel;
use tracing::{debug, info, warn};

/// Sentinel returned when no candidate yielded an identifier.
pub const UNKNOWN_ID: &str = "?";

/// Pattern of an internal identifier in console output: `.id=*1A`.
static ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.id=(\*[0-9A-Fa-f]+)").expect("Invalid regex pattern"));

/// Outcome of an identifier probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedId {
    /// The identifier (e.g. `*6`).
    Found(String),
    /// Every candidate failed.
    Unknown,
}

impl ResolvedId {
    /// Returns the identifier, if one was found.
    pub fn as_found(&self) -> Option<&str> {
        match self {
            ResolvedId::Found(id) => Some(id),
            ResolvedId::Unknown => None,
        }
    }

    /// Returns true if no identifier was determined.
    pub fn is_unknown(&self) -> bool {
        matches!(self, ResolvedId::Unknown)
    }
}

impl fmt::Display for ResolvedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedId::Found(id) => f.write_str(id),
            ResolvedId::Unknown => f.write_str(UNKNOWN_ID),
        }
    }
}

/// Extracts the first `.id=*<hex>` token from console output.
pub fn extract_id(output: &str) -> Option<&str> {
    ID_RE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Resolves the identifier of the object at `path`.
///
/// Runs one probe per `find` expression in `candidates`, in order. A probe
/// that fails or whose output carries no identifier is logged and skipped.
/// Every candidate is tried; when several succeed the last one wins.
/// Never fails: exhaustion yields [`ResolvedId::Unknown`].
pub async fn resolve<C>(channel: &mut C, path: &str, candidates: &[String]) -> ResolvedId
where
    C: CommandChannel + ?Sized,
{
    let mut resolved = ResolvedId::Unknown;

    for candidate in candidates {
        let command = find_get_command(path, candidate);
        debug!(path = %path, candidate = %candidate, "Probing identifier");

        let output = match channel.run(&command).await {
            Ok(output) => output,
            Err(e) => {
                warn!(path = %path, candidate = %candidate, error = %e, "Identifier probe failed");
                continue;
            }
        };

        match extract_id(&output) {
            Some(id) => {
                if let ResolvedId::Found(previous) = &resolved {
                    debug!(previous = %previous, id = %id, "Later candidate overrides identifier");
                }
                resolved = ResolvedId::Found(id.to_string());
            }
            None => {
                warn!(
                    path = %path,
                    candidate = %candidate,
                    output = %output.trim(),
                    "Identifier not found in probe output"
                );
            }
        }
    }

    match &resolved {
        ResolvedId::Found(id) => info!(path = %path, id = %id, "Resolved identifier"),
        ResolvedId::Unknown => warn!(path = %path, tried = candidates.len(), "Identifier unresolved"),
    }
    resolved
}
