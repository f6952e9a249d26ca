//! Devnet readiness checks.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

/// Answers whether the devnet is accepting requests.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Returns `true` if the devnet answered.
    async fn is_ready(&self) -> bool;
}

/// Probe that calls `GET <url>/is_alive`.
pub struct HttpProbe {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpProbe {
    /// Creates a probe for the devnet at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/is_alive", base_url.trim_end_matches('/')),
        })
    }

    /// The polled URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReadinessProbe for HttpProbe {
    async fn is_ready(&self) -> bool {
        match self.client.get(&self.endpoint).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                trace!(endpoint = %self.endpoint, error = %e, "devnet not answering");
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Probe returning scripted answers in order, then `fallback` forever.
    pub(crate) struct ScriptedProbe {
        answers: Mutex<VecDeque<bool>>,
        fallback: bool,
        calls: AtomicUsize,
    }

    impl ScriptedProbe {
        pub(crate) fn new(answers: &[bool], fallback: bool) -> Self {
            Self {
                answers: Mutex::new(answers.iter().copied().collect()),
                fallback,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReadinessProbe for ScriptedProbe {
        async fn is_ready(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(self.fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_is_alive() {
        let probe = HttpProbe::new("http://127.0.0.1:5050/").unwrap();
        assert_eq!(probe.endpoint(), "http://127.0.0.1:5050/is_alive");
    }

    #[tokio::test]
    async fn unreachable_devnet_is_not_ready() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let probe = HttpProbe::new(&format!("http://127.0.0.1:{port}")).unwrap();
        assert!(!probe.is_ready().await);
    }
}
