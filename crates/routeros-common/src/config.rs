//! Device connection configuration.
//!
//! Loads and validates connection settings from TOML files.
//! Default location: /etc/routeros/device.toml
//!
//! ```toml
//! [device]
//! host = "192.168.88.1"
//! username = "admin"
//! transport = "rest"
//!
//! [ssh]
//! host_key = { fingerprint = "SHA256:..." }
//!
//! [timeouts]
//! operation_secs = 30
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::Transport;
use crate::error::{RosError, RosResult};

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/routeros/device.toml";

/// Environment variable overriding the configured password.
pub const PASSWORD_ENV: &str = "ROUTEROS_PASSWORD";

/// Device identity and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSection {
    /// Router address (without port)
    #[serde(default = "default_host")]
    pub host: String,

    /// Login user
    #[serde(default = "default_username")]
    pub username: String,

    /// Login password
    #[serde(default)]
    pub password: String,

    /// Structured transport used for CRUD
    #[serde(default = "default_transport")]
    pub transport: Transport,
}

/// REST transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestSection {
    /// HTTP(S) port
    #[serde(default = "default_rest_port")]
    pub port: u16,

    /// Use HTTPS
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,

    /// Accept self-signed certificates
    #[serde(default)]
    pub insecure_tls: bool,
}

/// How the SSH server's host key is verified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Accept any host key. Only for trusted management networks.
    #[default]
    AcceptAny,
    /// Require the host key's SHA-256 fingerprint (`SHA256:<base64>`).
    Fingerprint(String),
}

/// Command channel (SSH) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshSection {
    /// SSH port
    #[serde(default = "default_ssh_port")]
    pub port: u16,

    /// Host key verification policy
    #[serde(default)]
    pub host_key: HostKeyPolicy,
}

/// Deadlines applied to transport calls and channel operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutSection {
    /// Connection establishment timeout in seconds
    #[serde(default = "default_connect_secs")]
    pub connect_secs: u64,

    /// Per-request / per-command timeout in seconds (0 disables)
    #[serde(default = "default_operation_secs")]
    pub operation_secs: u64,
}

/// Complete device configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device identity and credentials
    #[serde(default)]
    pub device: DeviceSection,

    /// REST transport settings
    #[serde(default)]
    pub rest: RestSection,

    /// SSH command channel settings
    #[serde(default)]
    pub ssh: SshSection,

    /// Deadlines
    #[serde(default)]
    pub timeouts: TimeoutSection,
}

/// Resolved settings for the REST client.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL without the `/rest` prefix (e.g. `https://192.168.88.1:443`).
    pub base_url: String,
    /// Login user.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Accept self-signed certificates.
    pub insecure_tls: bool,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
}

/// Resolved settings for the SSH command channel.
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Router address.
    pub host: String,
    /// SSH port.
    pub port: u16,
    /// Login user.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Host key verification policy.
    pub host_key: HostKeyPolicy,
    /// Dial + authentication timeout.
    pub connect_timeout: Duration,
    /// Per-command timeout.
    pub command_timeout: Option<Duration>,
}

// Default functions
fn default_host() -> String {
    "192.168.88.1".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_transport() -> Transport {
    Transport::Rest
}

fn default_rest_port() -> u16 {
    443
}

fn default_use_tls() -> bool {
    true
}

fn default_ssh_port() -> u16 {
    22
}

fn default_connect_secs() -> u64 {
    10
}

fn default_operation_secs() -> u64 {
    30
}

// Default implementations
impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            username: default_username(),
            password: String::new(),
            transport: default_transport(),
        }
    }
}

impl Default for RestSection {
    fn default() -> Self {
        Self {
            port: default_rest_port(),
            use_tls: default_use_tls(),
            insecure_tls: false,
        }
    }
}

impl Default for SshSection {
    fn default() -> Self {
        Self {
            port: default_ssh_port(),
            host_key: HostKeyPolicy::default(),
        }
    }
}

impl Default for TimeoutSection {
    fn default() -> Self {
        Self {
            connect_secs: default_connect_secs(),
            operation_secs: default_operation_secs(),
        }
    }
}

impl DeviceConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> RosResult<Self> {
        let path = path.as_ref();

        let mut config: DeviceConfig = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                RosError::config(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(RosError::Io(e)),
        };

        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            config.device.password = password;
        }

        Ok(config)
    }

    /// Load from default location or defaults
    pub fn load() -> RosResult<Self> {
        Self::load_or_default(DEFAULT_CONFIG_PATH)
    }

    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.connect_secs)
    }

    /// Get per-operation deadline, `None` when disabled
    pub fn operation_timeout(&self) -> Option<Duration> {
        match self.timeouts.operation_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Settings for the REST client
    pub fn rest_config(&self) -> RestConfig {
        let scheme = if self.rest.use_tls { "https" } else { "http" };
        RestConfig {
            base_url: format!("{}://{}:{}", scheme, self.device.host, self.rest.port),
            username: self.device.username.clone(),
            password: self.device.password.clone(),
            insecure_tls: self.rest.insecure_tls,
            connect_timeout: self.connect_timeout(),
        }
    }

    /// Settings for the SSH command channel
    pub fn ssh_config(&self) -> SshConfig {
        SshConfig {
            host: self.device.host.clone(),
            port: self.ssh.port,
            username: self.device.username.clone(),
            password: self.device.password.clone(),
            host_key: self.ssh.host_key.clone(),
            connect_timeout: self.connect_timeout(),
            command_timeout: self.operation_timeout(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> RosResult<()> {
        if self.device.host.trim().is_empty() {
            return Err(RosError::config("device.host must not be empty"));
        }

        if self.device.username.is_empty() {
            return Err(RosError::config("device.username must not be empty"));
        }

        if self.rest.port == 0 || self.ssh.port == 0 {
            return Err(RosError::config("ports must be > 0"));
        }

        if self.timeouts.connect_secs == 0 {
            return Err(RosError::config("timeouts.connect_secs must be > 0"));
        }

        if let HostKeyPolicy::Fingerprint(fp) = &self.ssh.host_key {
            if !fp.starts_with("SHA256:") {
                return Err(RosError::config(
                    "ssh.host_key fingerprint must start with 'SHA256:'",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DeviceConfig::default();
        assert_eq!(config.device.host, "192.168.88.1");
        assert_eq!(config.device.username, "admin");
        assert_eq!(config.device.transport, Transport::Rest);
        assert_eq!(config.rest.port, 443);
        assert_eq!(config.ssh.port, 22);
        assert_eq!(config.ssh.host_key, HostKeyPolicy::AcceptAny);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(DeviceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_host() {
        let mut config = DeviceConfig::default();
        config.device.host = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_fingerprint() {
        let mut config = DeviceConfig::default();
        config.ssh.host_key = HostKeyPolicy::Fingerprint("md5:aa:bb".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_operation_timeout() {
        let mut config = DeviceConfig::default();
        assert_eq!(config.operation_timeout(), Some(Duration::from_secs(30)));
        config.timeouts.operation_secs = 0;
        assert_eq!(config.operation_timeout(), None);
    }

    #[test]
    fn test_rest_config_url() {
        let mut config = DeviceConfig::default();
        config.device.host = "10.0.0.1".to_string();
        config.rest.use_tls = false;
        config.rest.port = 80;
        assert_eq!(config.rest_config().base_url, "http://10.0.0.1:80");
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
[device]
host = "10.1.1.1"
transport = "api"

[ssh]
host_key = { fingerprint = "SHA256:abc" }
"#;
        let config: DeviceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.device.host, "10.1.1.1");
        assert_eq!(config.device.transport, Transport::Api);
        assert_eq!(
            config.ssh.host_key,
            HostKeyPolicy::Fingerprint("SHA256:abc".to_string())
        );
        // Unspecified values should use defaults
        assert_eq!(config.device.username, "admin");
        assert_eq!(config.timeouts.connect_secs, 10);
    }

    #[test]
    fn test_toml_accept_any() {
        let config: DeviceConfig = toml::from_str("[ssh]\nhost_key = \"accept-any\"\n").unwrap();
        assert_eq!(config.ssh.host_key, HostKeyPolicy::AcceptAny);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[device]\nhost = \"172.16.0.1\"\n[rest]\nport = 8443").unwrap();

        let config = DeviceConfig::load_or_default(file.path()).unwrap();
        assert_eq!(config.device.host, "172.16.0.1");
        assert_eq!(config.rest.port, 8443);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[device\nhost = ").unwrap();

        match DeviceConfig::load_or_default(file.path()) {
            Err(RosError::Config { message }) => assert!(message.contains("Failed to parse")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_nonexistent_file_defaults() {
        let config = DeviceConfig::load_or_default("/nonexistent/device.toml").unwrap();
        assert_eq!(config.device.username, "admin");
    }
}
