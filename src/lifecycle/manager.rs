use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::BugtraceError;
use super::state::*;

const SUBSCRIBER_BUFFER: usize = 64;

struct Inner {
    state: LifecycleState,
    current: Option<CancellationScope>,
    next_generation: u64,
}

/// Gates every outbound model call through rate-limit spacing, a
/// consecutive-failure circuit breaker and per-call cancellation.
///
/// One instance is owned by whatever composes the pipeline and shared by
/// `Arc`. All state transitions go through the methods below; observers only
/// ever see snapshots and broadcast values.
pub struct RequestLifecycle {
    config: LifecycleConfig,
    inner: Mutex<Inner>,
    status_tx: broadcast::Sender<RequestStatus>,
    count_tx: broadcast::Sender<u64>,
}

impl RequestLifecycle {
    pub fn new(config: LifecycleConfig) -> Self {
        let (status_tx, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        let (count_tx, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        Self {
            config,
            inner: Mutex::new(Inner {
                state: LifecycleState::new(),
                current: None,
                next_generation: 0,
            }),
            status_tx,
            count_tx,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Wait until at least `min_interval` has passed since the last recorded
    /// dispatch. Does not record anything itself.
    pub async fn await_rate_limit_slot(&self) {
        let wait = {
            let inner = self.inner.lock().await;
            match inner.state.last_call_at {
                Some(last) => self.config.min_interval.saturating_sub(last.elapsed()),
                None => Duration::ZERO,
            }
        };
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "Waiting for rate limit slot");
            tokio::time::sleep(wait).await;
        }
    }

    /// Stamp the dispatch time and bump the total call counter. Called
    /// immediately before the request goes out.
    pub async fn record_dispatch(&self) {
        let mut inner = self.inner.lock().await;
        inner.state.last_call_at = Some(Instant::now());
        inner.state.total_call_count += 1;
        let _ = self.count_tx.send(inner.state.total_call_count);
    }

    /// Open a new call. Fails fast while the circuit breaker is open.
    pub async fn begin_call(&self) -> Result<CancellationScope, BugtraceError> {
        let mut inner = self.inner.lock().await;
        if let Some(remaining) = inner.state.breaker_remaining(Instant::now()) {
            return Err(BugtraceError::CircuitOpen { remaining });
        }
        if let Some(previous) = &inner.current {
            warn!(generation = previous.generation(), "Starting a call while another is still registered");
        }

        inner.next_generation += 1;
        let scope = CancellationScope::new(inner.next_generation);
        inner.current = Some(scope.clone());
        self.set_status(&mut inner, RequestStatus::Active);
        Ok(scope)
    }

    /// Close a call opened by `begin_call` and feed its outcome to the breaker.
    ///
    /// Status only returns to Idle if `scope` is still the current call; an
    /// outdated scope updates the counters and nothing else.
    pub async fn end_call(&self, scope: &CancellationScope, outcome: CallOutcome) {
        let mut inner = self.inner.lock().await;
        match outcome {
            CallOutcome::Success => {
                inner.state.consecutive_failures = 0;
                inner.state.breaker_open_until = None;
            }
            CallOutcome::Failure => {
                inner.state.consecutive_failures += 1;
                if inner.state.consecutive_failures >= self.config.max_failures {
                    inner.state.breaker_open_until = Some(Instant::now() + self.config.cooldown);
                    warn!(
                        failures = inner.state.consecutive_failures,
                        cooldown_secs = self.config.cooldown.as_secs(),
                        "Circuit breaker tripped, calls suspended"
                    );
                }
            }
            CallOutcome::Cancelled => {}
        }

        let is_current = inner
            .current
            .as_ref()
            .map_or(false, |c| c.generation() == scope.generation());
        if is_current {
            inner.current = None;
            self.set_status(&mut inner, RequestStatus::Idle);
        } else {
            debug!(generation = scope.generation(), "Ended an outdated call scope");
        }
    }

    /// Signal the in-flight call to stop. Returns false (and does nothing)
    /// when no call is active.
    pub async fn cancel_active(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.state.status != RequestStatus::Active {
            debug!(status = %inner.state.status, "No active call to cancel");
            return false;
        }
        self.set_status(&mut inner, RequestStatus::Stopping);
        if let Some(scope) = &inner.current {
            info!(generation = scope.generation(), "Cancelling active call");
            scope.cancel();
        }
        true
    }

    /// Every status transition, in order. Drop the receiver to unsubscribe.
    pub fn subscribe_status(&self) -> broadcast::Receiver<RequestStatus> {
        self.status_tx.subscribe()
    }

    /// The running total after each dispatch. Drop the receiver to unsubscribe.
    pub fn subscribe_call_count(&self) -> broadcast::Receiver<u64> {
        self.count_tx.subscribe()
    }

    pub async fn snapshot(&self) -> LifecycleState {
        self.inner.lock().await.state.clone()
    }

    pub async fn status(&self) -> RequestStatus {
        self.inner.lock().await.state.status
    }

    pub async fn call_count(&self) -> u64 {
        self.inner.lock().await.state.total_call_count
    }

    fn set_status(&self, inner: &mut Inner, status: RequestStatus) {
        inner.state.status = status;
        let _ = self.status_tx.send(status);
    }
}

impl Default for RequestLifecycle {
    fn default() -> Self {
        Self::new(LifecycleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fail_times(lifecycle: &RequestLifecycle, n: u32) {
        for _ in 0..n {
            let scope = lifecycle.begin_call().await.unwrap();
            lifecycle.end_call(&scope, CallOutcome::Failure).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_call_does_not_wait() {
        let lifecycle = RequestLifecycle::default();
        let start = Instant::now();
        lifecycle.await_rate_limit_slot().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_calls_are_spaced() {
        let lifecycle = RequestLifecycle::default();
        let mut dispatched = Vec::new();
        for _ in 0..4 {
            lifecycle.await_rate_limit_slot().await;
            lifecycle.record_dispatch().await;
            dispatched.push(Instant::now());
        }
        for pair in dispatched.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(500));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_when_interval_already_elapsed() {
        let lifecycle = RequestLifecycle::default();
        lifecycle.record_dispatch().await;
        tokio::time::advance(Duration::from_millis(800)).await;
        let start = Instant::now();
        lifecycle.await_rate_limit_slot().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_does_not_record() {
        let lifecycle = RequestLifecycle::default();
        lifecycle.await_rate_limit_slot().await;
        let snap = lifecycle.snapshot().await;
        assert!(snap.last_call_at.is_none());
        assert_eq!(snap.total_call_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_breaker_trips_after_max_failures() {
        let lifecycle = RequestLifecycle::default();
        fail_times(&lifecycle, 9).await;
        assert!(lifecycle.begin_call().await.is_ok_and(|s| s.generation() == 10));

        let lifecycle = RequestLifecycle::default();
        fail_times(&lifecycle, 10).await;
        match lifecycle.begin_call().await {
            Err(BugtraceError::CircuitOpen { remaining }) => {
                assert!(remaining <= Duration::from_secs(30));
                assert!(remaining > Duration::from_secs(29));
            }
            other => panic!("expected CircuitOpen, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_failure_count() {
        let lifecycle = RequestLifecycle::default();
        fail_times(&lifecycle, 9).await;
        let scope = lifecycle.begin_call().await.unwrap();
        lifecycle.end_call(&scope, CallOutcome::Success).await;
        assert_eq!(lifecycle.snapshot().await.consecutive_failures, 0);

        fail_times(&lifecycle, 9).await;
        assert!(lifecycle.begin_call().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_breaker_closes_after_cooldown() {
        let lifecycle = RequestLifecycle::default();
        fail_times(&lifecycle, 10).await;
        assert!(lifecycle.begin_call().await.is_err());

        tokio::time::advance(Duration::from_secs(30)).await;
        let scope = lifecycle.begin_call().await.unwrap();
        lifecycle.end_call(&scope, CallOutcome::Success).await;
        let snap = lifecycle.snapshot().await;
        assert_eq!(snap.consecutive_failures, 0);
        assert!(snap.breaker_open_until.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_outcome_leaves_counters() {
        let lifecycle = RequestLifecycle::default();
        fail_times(&lifecycle, 3).await;
        let scope = lifecycle.begin_call().await.unwrap();
        lifecycle.end_call(&scope, CallOutcome::Cancelled).await;
        let snap = lifecycle.snapshot().await;
        assert_eq!(snap.consecutive_failures, 3);
        assert_eq!(snap.status, RequestStatus::Idle);
    }

    #[tokio::test]
    async fn test_cancel_while_idle_is_noop() {
        let lifecycle = RequestLifecycle::default();
        let mut status_rx = lifecycle.subscribe_status();
        assert!(!lifecycle.cancel_active().await);
        assert_eq!(lifecycle.status().await, RequestStatus::Idle);
        assert!(status_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_active_signals_current_scope() {
        let lifecycle = RequestLifecycle::default();
        let scope = lifecycle.begin_call().await.unwrap();
        assert!(lifecycle.cancel_active().await);
        assert!(scope.is_cancelled());
        assert_eq!(lifecycle.status().await, RequestStatus::Stopping);

        lifecycle.end_call(&scope, CallOutcome::Cancelled).await;
        assert_eq!(lifecycle.status().await, RequestStatus::Idle);
    }

    #[tokio::test]
    async fn test_outdated_scope_does_not_touch_newer_call() {
        let lifecycle = RequestLifecycle::default();
        let old = lifecycle.begin_call().await.unwrap();
        lifecycle.end_call(&old, CallOutcome::Success).await;

        let current = lifecycle.begin_call().await.unwrap();
        assert!(current.generation() > old.generation());

        old.cancel();
        assert!(!current.is_cancelled());

        lifecycle.end_call(&old, CallOutcome::Success).await;
        assert_eq!(lifecycle.status().await, RequestStatus::Active);

        lifecycle.end_call(&current, CallOutcome::Success).await;
        assert_eq!(lifecycle.status().await, RequestStatus::Idle);
    }

    #[tokio::test]
    async fn test_each_subscriber_sees_every_transition() {
        let lifecycle = RequestLifecycle::default();
        let mut first = lifecycle.subscribe_status();
        let mut second = lifecycle.subscribe_status();

        let scope = lifecycle.begin_call().await.unwrap();
        lifecycle.cancel_active().await;
        lifecycle.end_call(&scope, CallOutcome::Cancelled).await;

        for rx in [&mut first, &mut second] {
            assert_eq!(rx.recv().await.unwrap(), RequestStatus::Active);
            assert_eq!(rx.recv().await.unwrap(), RequestStatus::Stopping);
            assert_eq!(rx.recv().await.unwrap(), RequestStatus::Idle);
        }
    }

    #[tokio::test]
    async fn test_call_count_counts_dispatches_not_outcomes() {
        let lifecycle = RequestLifecycle::default();
        let mut counts = lifecycle.subscribe_call_count();

        let scope = lifecycle.begin_call().await.unwrap();
        lifecycle.record_dispatch().await;
        lifecycle.end_call(&scope, CallOutcome::Failure).await;

        let scope = lifecycle.begin_call().await.unwrap();
        lifecycle.record_dispatch().await;
        lifecycle.end_call(&scope, CallOutcome::Success).await;

        assert_eq!(counts.recv().await.unwrap(), 1);
        assert_eq!(counts.recv().await.unwrap(), 2);
        assert_eq!(lifecycle.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_dropped_subscriber_does_not_block_transitions() {
        let lifecycle = RequestLifecycle::default();
        drop(lifecycle.subscribe_status());
        let scope = lifecycle.begin_call().await.unwrap();
        lifecycle.end_call(&scope, CallOutcome::Success).await;
        assert_eq!(lifecycle.status().await, RequestStatus::Idle);
    }
}
