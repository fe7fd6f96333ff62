//! Wait for a webset to finish processing

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, instrument, warn};
use webset_core::{Webset, WebsetResult};
use webset_exa::WebsetApi;

/// Delay between status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default time to wait for a webset to become idle
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// How a wait ended. Each variant carries the last webset observed.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    Idle(Webset),
    /// Exa reported a state that will never reach idle
    Failed(Webset),
    /// Still processing when the timeout elapsed
    TimedOut(Webset),
}

impl PollOutcome {
    pub fn webset(&self) -> &Webset {
        match self {
            PollOutcome::Idle(w) | PollOutcome::Failed(w) | PollOutcome::TimedOut(w) => w,
        }
    }

    pub fn into_webset(self) -> Webset {
        match self {
            PollOutcome::Idle(w) | PollOutcome::Failed(w) | PollOutcome::TimedOut(w) => w,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PollOutcome::Idle(_))
    }
}

pub struct CompletionPoller {
    api: Arc<dyn WebsetApi>,
    interval: Duration,
}

impl CompletionPoller {
    pub fn new(api: Arc<dyn WebsetApi>) -> Self {
        Self {
            api,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Poll until the webset is idle, fails, or `timeout` has elapsed.
    ///
    /// An idle webset on the first check returns without sleeping. A timeout
    /// is not an error; the caller gets the last observed webset.
    #[instrument(skip(self))]
    pub async fn await_completion(
        &self,
        webset_id: &str,
        timeout: Duration,
    ) -> WebsetResult<PollOutcome> {
        let start = Instant::now();

        loop {
            let webset = self.api.get_webset(webset_id).await?;

            if webset.status.is_idle() {
                info!("Webset {} processing complete", webset_id);
                return Ok(PollOutcome::Idle(webset));
            }

            if webset.status.is_failure() {
                warn!("Webset {} ended with status {}", webset_id, webset.status);
                return Ok(PollOutcome::Failed(webset));
            }

            if start.elapsed() > timeout {
                warn!(
                    "Timeout reached after {}s, current status: {}",
                    timeout.as_secs(),
                    webset.status
                );
                return Ok(PollOutcome::TimedOut(webset));
            }

            info!("Webset {} status: {} (waiting)", webset_id, webset.status);
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webset_core::WebsetState;
    use webset_exa::testing::FakeWebsetApi;

    #[tokio::test(start_paused = true)]
    async fn test_idle_on_first_check_does_not_sleep() {
        let api = Arc::new(FakeWebsetApi::new("webset_1"));
        let poller = CompletionPoller::new(api.clone());

        let start = Instant::now();
        let outcome = poller
            .await_completion("webset_1", DEFAULT_WAIT_TIMEOUT)
            .await
            .unwrap();

        assert!(outcome.is_idle());
        assert_eq!(api.status_calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_becomes_idle_after_polling() {
        let api = Arc::new(FakeWebsetApi::new("webset_1").with_statuses([
            WebsetState::Pending,
            WebsetState::Running,
            WebsetState::Idle,
        ]));
        let poller = CompletionPoller::new(api.clone());

        let start = Instant::now();
        let outcome = poller
            .await_completion("webset_1", DEFAULT_WAIT_TIMEOUT)
            .await
            .unwrap();

        assert!(outcome.is_idle());
        assert_eq!(api.status_calls(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_returns_last_status() {
        let api = Arc::new(FakeWebsetApi::new("webset_1").with_statuses([WebsetState::Running]));
        let poller = CompletionPoller::new(api.clone());
        let timeout = Duration::from_secs(25);

        let start = Instant::now();
        let outcome = poller.await_completion("webset_1", timeout).await.unwrap();

        assert!(matches!(outcome, PollOutcome::TimedOut(_)));
        assert_eq!(outcome.webset().status, WebsetState::Running);
        assert!(start.elapsed() <= timeout + DEFAULT_POLL_INTERVAL);
        assert_eq!(api.status_calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_state_stops_polling() {
        let api = Arc::new(
            FakeWebsetApi::new("webset_1")
                .with_statuses([WebsetState::Running, WebsetState::Canceled]),
        );
        let poller = CompletionPoller::new(api.clone());

        let outcome = poller
            .await_completion("webset_1", DEFAULT_WAIT_TIMEOUT)
            .await
            .unwrap();

        assert!(matches!(outcome, PollOutcome::Failed(_)));
        assert_eq!(outcome.into_webset().status, WebsetState::Canceled);
        assert_eq!(api.status_calls(), 2);
    }

    #[tokio::test]
    async fn test_api_errors_propagate() {
        let api = Arc::new(FakeWebsetApi::new("webset_1").with_error("401 Unauthorized"));
        let poller = CompletionPoller::new(api);

        let err = poller
            .await_completion("webset_1", DEFAULT_WAIT_TIMEOUT)
            .await
            .unwrap_err();
        assert_eq!(err.http_class().status_code(), 401);
    }
}
