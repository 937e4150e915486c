//! routeros-importer - inspect and import RouterOS configuration objects
//!
//! # Usage
//!
//! ```bash
//! # Dump the running configuration over SSH
//! routeros-importer export --output router.rsc
//!
//! # Probe the identifier of an object through the console
//! routeros-importer resolve-id --path /ip/service --find 'name="ssh"'
//!
//! # Import an object as a declared record (JSON)
//! routeros-importer import --resource ip_pool --key dhcp
//! routeros-importer read-service --name www-ssl
//!
//! # List the fields of an object type
//! routeros-importer describe --resource ip_service
//! ```

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use routeros_common::channel::export_config;
use routeros_common::config::DEFAULT_CONFIG_PATH;
use routeros_common::{DeviceConfig, RestClient, SshChannel, Transport};
use routeros_sync::resources::{self, ip_service};
use routeros_sync::{resolve, DeclaredRecord, ResolvedId, ResourceSchema, SyncContext};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "routeros-importer")]
#[command(about = "Export and import RouterOS configuration objects", long_about = None)]
#[command(version)]
struct Args {
    /// Device configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the device configuration (`/export terse`)
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve an internal identifier through the console
    ResolveId {
        /// Device path, e.g. /ip/service
        #[arg(long)]
        path: String,

        /// `find` expressions tried in order; the last match wins
        #[arg(long = "find", required = true)]
        candidates: Vec<String>,
    },

    /// Import an object and print it as a declared record
    Import {
        /// Object type
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(resources::RESOURCE_NAMES.iter().copied()))]
        resource: String,

        /// `*ID`, `attr=value` or a natural key value
        #[arg(long)]
        key: String,

        /// Do not open an SSH channel for identifier probes
        #[arg(long)]
        no_probe: bool,
    },

    /// Read one management service
    ReadService {
        /// Service name (api, api-ssl, ftp, ssh, telnet, winbox, www, www-ssl)
        #[arg(long)]
        name: String,
    },

    /// List the fields and version-dependent filters of an object type
    Describe {
        /// Object type
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(resources::RESOURCE_NAMES.iter().copied()))]
        resource: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "routeros-importer failed");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Export { output } => {
            let config = load_config(&args.config)?;
            let mut channel = SshChannel::open(&config.ssh_config()).await?;
            let text = export_config(&mut channel).await?;
            channel.close().await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &text)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), bytes = text.len(), "Configuration exported");
                }
                None => print!("{}", text),
            }
        }

        Command::ResolveId { path, candidates } => {
            let config = load_config(&args.config)?;
            let mut channel = SshChannel::open(&config.ssh_config()).await?;
            let resolved = resolve(&mut channel, &path, &candidates).await;
            channel.close().await?;

            println!("{}", resolved);
            if let ResolvedId::Unknown = resolved {
                bail!("no candidate matched an object at {}", path);
            }
        }

        Command::Import {
            resource,
            key,
            no_probe,
        } => {
            let config = load_config(&args.config)?;
            let record = import(&config, &resource, &key, !no_probe).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Command::ReadService { name } => {
            let config = load_config(&args.config)?;
            let record = import(&config, ip_service::NAME, &name, true).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        // Offline: needs neither a configuration file nor a device
        Command::Describe { resource } => {
            let sync = resources::synchronizer_for(&resource)?;
            print!("{}", render_schema(sync.schema()));
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<DeviceConfig> {
    let config = DeviceConfig::load_or_default(path)
        .with_context(|| format!("loading {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

async fn import(
    config: &DeviceConfig,
    resource: &str,
    key: &str,
    probe: bool,
) -> Result<DeclaredRecord> {
    if config.device.transport != Transport::Rest {
        bail!(
            "transport '{}' is not supported by this tool, use 'rest'",
            config.device.transport
        );
    }

    let sync = resources::synchronizer_for(resource)?;
    let client = RestClient::new(&config.rest_config())?;
    let mut channel = if probe {
        Some(SshChannel::open(&config.ssh_config()).await?)
    } else {
        None
    };

    let result = {
        let mut ctx = SyncContext::discover(&client, config.operation_timeout()).await?;
        if let Some(channel) = channel.as_mut() {
            ctx = ctx.with_channel(channel);
        }
        sync.import(&mut ctx, key).await
    };

    if let Some(channel) = channel {
        channel.close().await?;
    }
    Ok(result?)
}

fn render_schema(schema: &ResourceSchema) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", schema.name(), schema.path());
    for field in schema.fields() {
        let _ = write!(
            out,
            "  {:<14} {:<10} {:?}/{:?}/{:?}",
            field.name(),
            field.device_attr(),
            field.kind(),
            field.mode(),
            field.presence()
        );
        if !field.description().is_empty() {
            let _ = write!(out, "  {}", field.description());
        }
        out.push('\n');
    }
    for gate in schema.version_gates() {
        let _ = writeln!(out, "  filter {}", gate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_service_schema() {
        let schema = ip_service::schema().unwrap();
        let text = render_schema(&schema);

        assert!(text.starts_with("ip_service (/ip/service)\n"));
        assert!(text.contains("Certificate used by TLS services"));
        assert!(text.contains("max-sessions"));
        assert!(text.contains("  filter dynamic=false on 7.19 and later\n"));
    }

    #[tokio::test]
    async fn test_describe_runs_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("device.toml");
        std::fs::write(&bogus, "this is not toml [").unwrap();

        let args = Args::try_parse_from([
            "routeros-importer",
            "--config",
            bogus.to_str().unwrap(),
            "describe",
            "--resource",
            "ip_pool",
        ])
        .unwrap();
        run(args).await.unwrap();

        let rejected = Args::try_parse_from(["routeros-importer", "describe", "--resource", "ip_route"]);
        assert!(rejected.is_err());
    }
}
