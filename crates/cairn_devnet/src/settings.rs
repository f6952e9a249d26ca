//! Devnet launch settings derived from the `[devnet]` section.

use std::path::Path;
use std::time::Duration;

use cairn_config::{DevnetConfig, OutputSink};
use url::Url;

use crate::error::DevnetError;

/// Image used in docker launch mode.
pub const DEVNET_IMAGE: &str = "shardlabs/starknet-devnet";

/// Port the devnet listens on inside its container.
const CONTAINER_PORT: u16 = 5050;

/// How to launch the devnet process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    /// Program to run.
    pub program: String,
    /// Full argument list.
    pub args: Vec<String>,
    /// Container to force-remove on stop, in docker mode.
    pub container: Option<String>,
}

/// Everything the supervisor needs to run one devnet.
#[derive(Debug, Clone)]
pub struct DevnetSettings {
    /// Base URL the devnet answers on.
    pub url: String,
    /// Process to launch.
    pub launch: Launch,
    /// Where the devnet's stdout goes.
    pub stdout: OutputSink,
    /// Where the devnet's stderr goes.
    pub stderr: OutputSink,
    /// How long to wait for readiness.
    pub startup_timeout: Duration,
    /// Delay between readiness probes.
    pub poll_interval: Duration,
    /// How long to wait for exit after killing.
    pub stop_grace: Duration,
}

impl DevnetSettings {
    /// Builds settings from configuration.
    ///
    /// Without `docker_tag` the configured command is run as
    /// `<command> --host <host> --port <port> <args..>`; with it, the devnet
    /// image is run through docker with the port published on the host.
    /// Relative file sinks are resolved against `project_root`.
    pub fn from_config(config: &DevnetConfig, project_root: &Path) -> Result<Self, DevnetError> {
        let invalid = |reason: &str| DevnetError::InvalidUrl {
            url: config.url.clone(),
            reason: reason.to_string(),
        };
        let url = Url::parse(&config.url).map_err(|e| invalid(&e.to_string()))?;
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid("missing port"))?;

        let launch = match &config.docker_tag {
            Some(tag) => {
                let container = format!("cairn-devnet-{port}");
                let mut args = vec![
                    "run".to_string(),
                    "--rm".to_string(),
                    "--name".to_string(),
                    container.clone(),
                    "-p".to_string(),
                    format!("{host}:{port}:{CONTAINER_PORT}"),
                    format!("{DEVNET_IMAGE}:{tag}"),
                ];
                args.extend(config.args.iter().cloned());
                Launch {
                    program: "docker".to_string(),
                    args,
                    container: Some(container),
                }
            }
            None => {
                let mut args = vec![
                    "--host".to_string(),
                    host.to_string(),
                    "--port".to_string(),
                    port.to_string(),
                ];
                args.extend(config.args.iter().cloned());
                Launch {
                    program: config.command.clone(),
                    args,
                    container: None,
                }
            }
        };

        Ok(Self {
            url: config.url.trim_end_matches('/').to_string(),
            launch,
            stdout: resolve_sink(&config.stdout, project_root),
            stderr: resolve_sink(&config.stderr, project_root),
            startup_timeout: Duration::from_millis(config.startup_timeout_ms),
            poll_interval: Duration::from_millis(500),
            stop_grace: Duration::from_secs(5),
        })
    }
}

fn resolve_sink(sink: &OutputSink, project_root: &Path) -> OutputSink {
    match sink {
        OutputSink::File(path) => OutputSink::File(project_root.join(path)),
        other => other.clone(),
    }
}
