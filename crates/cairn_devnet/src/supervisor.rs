//! Devnet lifecycle supervisor.
//!
//! ```text
//! Idle -> Starting -> Running -> Stopping -> Idle
//!            |                      ^
//!            +--- start error ------+
//! ```

use std::fmt;
use std::future::Future;
use std::process::ExitStatus;
use std::sync::Arc;

use cairn_config::NetworkConfig;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::DevnetError;
use crate::probe::{HttpProbe, ReadinessProbe};
use crate::process::DevnetProcess;
use crate::settings::DevnetSettings;

/// Lifecycle state of the supervised devnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// No process.
    Idle,
    /// Process spawned, not yet ready.
    Starting,
    /// Process answering requests.
    Running,
    /// Process being stopped.
    Stopping,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SupervisorState::Idle => "idle",
            SupervisorState::Starting => "starting",
            SupervisorState::Running => "running",
            SupervisorState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// Owns at most one devnet process for the duration of one action.
pub struct Supervisor {
    settings: DevnetSettings,
    probe: Arc<dyn ReadinessProbe>,
    state: SupervisorState,
    process: Option<DevnetProcess>,
    stop_count: usize,
    last_exit: Option<ExitStatus>,
}

impl Supervisor {
    /// Creates an idle supervisor with an injected readiness probe.
    pub fn new(settings: DevnetSettings, probe: Arc<dyn ReadinessProbe>) -> Self {
        Self {
            settings,
            probe,
            state: SupervisorState::Idle,
            process: None,
            stop_count: 0,
            last_exit: None,
        }
    }

    /// Creates an idle supervisor probing `GET <url>/is_alive`.
    pub fn with_http_probe(settings: DevnetSettings) -> Result<Self, DevnetError> {
        let probe = HttpProbe::new(&settings.url).map_err(|e| DevnetError::InvalidUrl {
            url: settings.url.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(settings, Arc::new(probe)))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Number of times [`Supervisor::stop`] has run.
    pub fn stop_count(&self) -> usize {
        self.stop_count
    }

    /// Exit status of the last stopped process.
    pub fn last_exit(&self) -> Option<ExitStatus> {
        self.last_exit
    }

    /// Spawns the devnet and waits until it is ready.
    ///
    /// Fails if the URL already answers before spawning, if the process
    /// exits while starting, or if it is not ready within the startup
    /// timeout. On failure the process (if any) is kept so that
    /// [`Supervisor::stop`] can reap it.
    pub async fn start(&mut self) -> Result<(), DevnetError> {
        if self.probe.is_ready().await {
            return Err(DevnetError::PortOccupied {
                url: self.settings.url.clone(),
            });
        }

        self.state = SupervisorState::Starting;
        info!(url = %self.settings.url, "starting devnet");
        let process = match DevnetProcess::spawn(&self.settings) {
            Ok(process) => process,
            Err(e) => {
                self.state = SupervisorState::Idle;
                return Err(e);
            }
        };
        let process = self.process.insert(process);

        let deadline = Instant::now() + self.settings.startup_timeout;
        loop {
            if let Some(status) = process.try_exit()? {
                return Err(DevnetError::EarlyExit {
                    status: status.to_string(),
                });
            }
            if self.probe.is_ready().await {
                break;
            }
            if Instant::now() >= deadline {
                return Err(DevnetError::StartTimeout {
                    url: self.settings.url.clone(),
                    timeout_ms: self.settings.startup_timeout.as_millis(),
                });
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }

        self.state = SupervisorState::Running;
        info!(url = %self.settings.url, pid = ?process.id(), "devnet ready");
        Ok(())
    }

    /// Stops the devnet if one was spawned and returns to `Idle`.
    ///
    /// Safe to call in any state. Failures are logged, never returned.
    pub async fn stop(&mut self) {
        self.stop_count += 1;
        let Some(mut process) = self.process.take() else {
            self.state = SupervisorState::Idle;
            return;
        };

        self.state = SupervisorState::Stopping;
        match process.terminate(self.settings.stop_grace).await {
            Ok(status) => {
                debug!(%status, "devnet exited");
                self.last_exit = Some(status);
            }
            Err(e) => warn!(error = %e, "failed to stop devnet"),
        }
        self.state = SupervisorState::Idle;
        info!("devnet stopped");
    }

    /// Starts the devnet, runs `work`, and stops the devnet.
    ///
    /// `stop` runs exactly once whether `start` or `work` fails. A start
    /// failure is returned without running `work`; otherwise `work`'s
    /// output is returned after the devnet has stopped.
    pub async fn run_guarded<F, Fut, T>(&mut self, work: F) -> Result<T, DevnetError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Err(e) = self.start().await {
            self.stop().await;
            return Err(e);
        }
        let output = work().await;
        self.stop().await;
        Ok(output)
    }
}

/// Runs `work` against `network`, under a devnet supervisor if `network`
/// is the integrated devnet and directly otherwise.
pub async fn guard<F, Fut, T>(
    network: &NetworkConfig,
    settings: DevnetSettings,
    work: F,
) -> Result<T, DevnetError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    if !network.is_integrated_devnet() {
        debug!(network = %network.name, "no devnet needed");
        return Ok(work().await);
    }
    let mut supervisor = Supervisor::with_http_probe(settings)?;
    supervisor.run_guarded(work).await
}
