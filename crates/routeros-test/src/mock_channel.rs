//! Scripted command channel.

use std::collections::HashMap;

use async_trait::async_trait;
use routeros_common::channel::find_get_command;
use routeros_common::{CommandChannel, RosError, RosResult};

/// Console error text for commands the script does not know.
const UNKNOWN_COMMAND: &str = "no such item";

/// A [`CommandChannel`] answering from a script.
///
/// Commands without a scripted reply fail with an `Exec` error, like a
/// console probe for a missing object.
#[derive(Debug, Default)]
pub struct MockChannel {
    replies: HashMap<String, String>,
    failures: HashMap<String, String>,
    commands: Vec<String>,
}

impl MockChannel {
    /// Creates a channel with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the output of `command`.
    pub fn with_reply(mut self, command: &str, output: &str) -> Self {
        self.replies.insert(command.to_string(), output.to_string());
        self
    }

    /// Scripts a failure of `command`.
    pub fn with_failure(mut self, command: &str, message: &str) -> Self {
        self.failures.insert(command.to_string(), message.to_string());
        self
    }

    /// Scripts the output of an identifier probe at `path` for `find_expr`.
    pub fn with_probe(self, path: &str, find_expr: &str, output: &str) -> Self {
        self.with_reply(&find_get_command(path, find_expr), output)
    }

    /// Commands run so far, in order.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

#[async_trait]
impl CommandChannel for MockChannel {
    async fn run(&mut self, command: &str) -> RosResult<String> {
        self.commands.push(command.to_string());

        if let Some(message) = self.failures.get(command) {
            return Err(RosError::exec(command, message.as_str()));
        }
        self.replies
            .get(command)
            .cloned()
            .ok_or_else(|| RosError::exec(command, UNKNOWN_COMMAND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use routeros_common::channel::{export_config, EXPORT_TERSE_CMD};

    #[tokio::test]
    async fn test_scripted_replies() {
        let mut channel = MockChannel::new()
            .with_probe("/ip/service", "name=\"ssh\"", ".id=*3;name=ssh")
            .with_failure("/system/reboot", "not permitted");

        let out = channel
            .run(":put [/ip/service get [find name=\"ssh\"]]")
            .await
            .unwrap();
        assert_eq!(out, ".id=*3;name=ssh");
        assert!(matches!(
            channel.run("/system/reboot").await,
            Err(RosError::Exec { .. })
        ));
        assert!(channel.run("/quit").await.is_err());
        assert_eq!(channel.commands().len(), 3);
    }

    #[tokio::test]
    async fn test_export() {
        let mut channel = MockChannel::new().with_reply(EXPORT_TERSE_CMD, "/ip service set telnet disabled=yes\n");
        let config = export_config(&mut channel).await.unwrap();
        assert!(config.contains("telnet disabled=yes"));
    }
}
