//! SSH command channel.
//!
//! Opens an authenticated SSH connection to the device and runs one console
//! command per session channel, capturing standard output only.
//!
//! Host key verification follows [`HostKeyPolicy`]: `AcceptAny` trusts the
//! management network and accepts every key, `Fingerprint` pins the key's
//! SHA-256 fingerprint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client;
use russh::keys::ssh_key::{HashAlg, PublicKey};
use russh::{ChannelMsg, Disconnect};
use tracing::{debug, instrument, warn};

use crate::channel::CommandChannel;
use crate::client::with_deadline;
use crate::config::{HostKeyPolicy, SshConfig};
use crate::error::{RosError, RosResult};

/// russh handler applying the configured host key policy.
#[derive(Debug)]
struct HostKeyVerifier {
    policy: HostKeyPolicy,
}

impl client::Handler for HostKeyVerifier {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let fingerprint = server_public_key.fingerprint(HashAlg::Sha256).to_string();
        match &self.policy {
            HostKeyPolicy::AcceptAny => {
                debug!(fingerprint = %fingerprint, "Accepting host key without verification");
                Ok(true)
            }
            HostKeyPolicy::Fingerprint(expected) => {
                let accepted = *expected == fingerprint;
                if !accepted {
                    warn!(
                        expected = %expected,
                        actual = %fingerprint,
                        "Host key fingerprint mismatch"
                    );
                }
                Ok(accepted)
            }
        }
    }
}

/// An authenticated SSH connection used as a command channel.
pub struct SshChannel {
    handle: client::Handle<HostKeyVerifier>,
    host: String,
    command_timeout: Option<Duration>,
}

impl std::fmt::Debug for SshChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshChannel")
            .field("host", &self.host)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

impl SshChannel {
    /// Dials the device and authenticates with username and password.
    ///
    /// Fails with [`RosError::Connect`] on dial failure, host key rejection or
    /// timeout, and with [`RosError::Auth`] when the credentials are refused.
    #[instrument(skip(config), fields(host = %config.host, port = config.port))]
    pub async fn open(config: &SshConfig) -> RosResult<Self> {
        let target = format!("{}:{}", config.host, config.port);

        if config.host_key == HostKeyPolicy::AcceptAny {
            warn!(host = %target, "SSH host key verification disabled (accept-any)");
        }

        let connect = async {
            let ssh_config = Arc::new(client::Config::default());
            let verifier = HostKeyVerifier {
                policy: config.host_key.clone(),
            };

            let mut handle =
                client::connect(ssh_config, (config.host.as_str(), config.port), verifier)
                    .await
                    .map_err(|e| RosError::connect(&target, e.to_string()))?;

            let auth = handle
                .authenticate_password(config.username.clone(), config.password.clone())
                .await
                .map_err(|e| RosError::connect(&target, e.to_string()))?;

            if !matches!(auth, client::AuthResult::Success) {
                return Err(RosError::Auth {
                    host: target.clone(),
                    username: config.username.clone(),
                });
            }

            Ok(handle)
        };

        let handle = match with_deadline("ssh connect", Some(config.connect_timeout), connect).await
        {
            Err(RosError::Timeout { timeout, .. }) => {
                return Err(RosError::connect(
                    &target,
                    format!("timed out after {:?}", timeout),
                ))
            }
            other => other?,
        };

        debug!(host = %target, "SSH channel established");
        Ok(Self {
            handle,
            host: target,
            command_timeout: config.command_timeout,
        })
    }

    /// Returns the `host:port` this channel is connected to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Closes the connection.
    pub async fn close(self) -> RosResult<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
            .map_err(|e| RosError::connect(&self.host, e.to_string()))
    }

    async fn run_session(&mut self, command: &str) -> RosResult<String> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| RosError::exec(command, format!("failed to create session: {}", e)))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| RosError::exec(command, format!("failed to run: {}", e)))?;

        let mut stdout = Vec::new();
        let mut exit_status = None;

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
                // stderr is discarded
                ChannelMsg::ExtendedData { .. } => {}
                ChannelMsg::ExitStatus { exit_status: code } => exit_status = Some(code),
                _ => {}
            }
        }

        session_output(command, &stdout, exit_status)
    }
}

/// Output of a finished session. A session that closed without reporting
/// an exit status was cut short and its output may be truncated.
fn session_output(command: &str, stdout: &[u8], exit_status: Option<u32>) -> RosResult<String> {
    match exit_status {
        Some(0) => Ok(String::from_utf8_lossy(stdout).into_owned()),
        Some(code) => Err(RosError::exec(command, format!("exit status {}", code))),
        None => Err(RosError::exec(command, "session closed without exit status")),
    }
}

#[async_trait]
impl CommandChannel for SshChannel {
    #[instrument(skip(self), fields(host = %self.host))]
    async fn run(&mut self, command: &str) -> RosResult<String> {
        let timeout = self.command_timeout;
        let output = with_deadline(command, timeout, self.run_session(command)).await?;
        debug!(bytes = output.len(), "Command complete");
        Ok(output)
    }
}
