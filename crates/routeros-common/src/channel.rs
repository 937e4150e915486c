//! Command channel abstractions.
//!
//! The command channel runs RouterOS console commands and returns their
//! standard output. It is the fallback for information the structured
//! transports do not expose. Values interpolated into command text must go
//! through [`rosquote`].
//!
//! # Example
//!
//! ```ignore
//! use routeros_common::channel::{self, CommandChannel, rosquote};
//!
//! let cmd = channel::find_get_command("/ip/service", &format!("name={}", rosquote("ssh")));
//! let output = channel.run(&cmd).await?;
//! ```

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RosResult;

/// Dumps the whole configuration in one-line-per-item form.
pub const EXPORT_TERSE_CMD: &str = "/export terse";

/// Characters that need escaping inside RouterOS double-quoted strings.
/// Matches: $, ", \ and ?
static ROS_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$"\\?])"#).expect("Invalid regex pattern"));

/// Quotes a string for safe use in RouterOS console commands.
///
/// Wraps the string in double quotes, escapes `$` (variable expansion),
/// `"`, `\` and `?` (inline help), and encodes line breaks as `\n` / `\r`.
///
/// # Example
///
/// ```
/// use routeros_common::channel::rosquote;
///
/// assert_eq!(rosquote("ssh"), "\"ssh\"");
/// assert_eq!(rosquote("a$b"), "\"a\\$b\"");
/// ```
pub fn rosquote(s: &str) -> String {
    let escaped = ROS_ESCAPE_RE.replace_all(s, r"\$1");
    let escaped = escaped.replace('\n', r"\n").replace('\r', r"\r");
    format!("\"{}\"", escaped)
}

/// Builds the command printing every property of the object at `path`
/// selected by the `find` expression `find_expr` (e.g. `name="ssh"`).
///
/// The console prints the property array as `.id=*6;address=;...`.
pub fn find_get_command(path: &str, find_expr: &str) -> String {
    format!(":put [{} get [find {}]]", path, find_expr)
}

/// A session able to run console commands one at a time.
///
/// `run` takes `&mut self`: a channel serves a single caller. Callers that
/// need parallel command execution open independent channels.
#[async_trait]
pub trait CommandChannel: Send {
    /// Runs one command and returns its standard output.
    ///
    /// Each call is independent; no console state carries over.
    async fn run(&mut self, command: &str) -> RosResult<String>;
}

/// Fetches the device configuration as `/export terse` text.
pub async fn export_config<C: CommandChannel + ?Sized>(channel: &mut C) -> RosResult<String> {
    channel.run(EXPORT_TERSE_CMD).await
}
