//! Owned handle to a running devnet process.

use std::fs::OpenOptions;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use cairn_config::OutputSink;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::error::DevnetError;
use crate::settings::DevnetSettings;

/// A spawned devnet.
///
/// Dropping the handle kills the process (and removes its container in
/// docker mode), so an unwinding panic cannot leak the devnet.
#[derive(Debug)]
pub struct DevnetProcess {
    child: Child,
    container: Option<String>,
    finished: bool,
}

impl DevnetProcess {
    /// Spawns the devnet described by `settings`.
    pub fn spawn(settings: &DevnetSettings) -> Result<Self, DevnetError> {
        let launch = &settings.launch;
        debug!(program = %launch.program, args = ?launch.args, "spawning devnet");
        let child = Command::new(&launch.program)
            .args(&launch.args)
            .stdin(Stdio::null())
            .stdout(sink_stdio(&settings.stdout)?)
            .stderr(sink_stdio(&settings.stderr)?)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DevnetError::Spawn {
                program: launch.program.clone(),
                source: e,
            })?;
        Ok(Self {
            child,
            container: launch.container.clone(),
            finished: false,
        })
    }

    /// OS process id, if the process has not been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Returns the exit status if the process has already exited.
    pub fn try_exit(&mut self) -> Result<Option<ExitStatus>, DevnetError> {
        let status = self.child.try_wait().map_err(process_io)?;
        if status.is_some() {
            self.finished = true;
        }
        Ok(status)
    }

    /// Kills the process and waits up to `grace` for it to exit.
    pub async fn terminate(&mut self, grace: Duration) -> Result<ExitStatus, DevnetError> {
        let status = match self.try_exit()? {
            Some(status) => status,
            None => {
                // Already-exited races surface as InvalidInput; wait() still reaps.
                if let Err(e) = self.child.start_kill() {
                    debug!(error = %e, "kill signal not delivered");
                }
                tokio::time::timeout(grace, self.child.wait())
                    .await
                    .map_err(|_| DevnetError::StopTimeout {
                        timeout_ms: grace.as_millis(),
                    })?
                    .map_err(process_io)?
            }
        };
        self.finished = true;
        if let Some(container) = self.container.take() {
            remove_container(&container).await;
        }
        Ok(status)
    }
}

impl Drop for DevnetProcess {
    fn drop(&mut self) {
        if let Some(container) = self.container.take() {
            let _ = std::process::Command::new("docker")
                .args(["rm", "-f", &container])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
        }
        if !self.finished {
            let _ = self.child.start_kill();
        }
    }
}

async fn remove_container(container: &str) {
    let result = Command::new("docker")
        .args(["rm", "-f", container])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    if let Err(e) = result {
        debug!(container, error = %e, "docker rm failed");
    }
}

fn sink_stdio(sink: &OutputSink) -> Result<Stdio, DevnetError> {
    Ok(match sink {
        OutputSink::Ignore => Stdio::null(),
        OutputSink::Stdout => Stdio::from(std::io::stdout()),
        OutputSink::Stderr => Stdio::from(std::io::stderr()),
        OutputSink::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| DevnetError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| DevnetError::Io {
                    path: path.clone(),
                    source: e,
                })?;
            Stdio::from(file)
        }
    })
}

fn process_io(e: std::io::Error) -> DevnetError {
    DevnetError::Io {
        path: "devnet process".into(),
        source: e,
    }
}
