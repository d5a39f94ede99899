use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Minimum spacing between two dispatched calls.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);
/// Consecutive failures that trip the circuit breaker.
pub const DEFAULT_MAX_FAILURES: u32 = 10;
/// How long the breaker stays open once tripped.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Idle,
    Active,
    Stopping,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Active => write!(f, "active"),
            Self::Stopping => write!(f, "stopping"),
        }
    }
}

/// How a dispatched call ended, as reported to `RequestLifecycle::end_call`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Success,
    Failure,
    /// User-initiated stop. Leaves the breaker counters alone.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    pub min_interval: Duration,
    pub max_failures: u32,
    pub cooldown: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            max_failures: DEFAULT_MAX_FAILURES,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

/// Point-in-time copy of the lifecycle's internal state.
#[derive(Debug, Clone)]
pub struct LifecycleState {
    pub status: RequestStatus,
    pub last_call_at: Option<Instant>,
    pub consecutive_failures: u32,
    pub breaker_open_until: Option<Instant>,
    pub total_call_count: u64,
}

impl LifecycleState {
    pub fn new() -> Self {
        Self {
            status: RequestStatus::Idle,
            last_call_at: None,
            consecutive_failures: 0,
            breaker_open_until: None,
            total_call_count: 0,
        }
    }

    /// Remaining cooldown if the breaker is open at `now`.
    pub fn breaker_remaining(&self, now: Instant) -> Option<Duration> {
        self.breaker_open_until
            .filter(|until| now < *until)
            .map(|until| until - now)
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation handle for exactly one dispatched call.
///
/// Every `begin_call` mints a new scope with a fresh token and a higher
/// generation, so a late cancel of an older scope cannot reach a newer call.
#[derive(Debug, Clone)]
pub struct CancellationScope {
    generation: u64,
    token: CancellationToken,
}

impl CancellationScope {
    pub(crate) fn new(generation: u64) -> Self {
        Self { generation, token: CancellationToken::new() }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_documented_constants() {
        let config = LifecycleConfig::default();
        assert_eq!(config.min_interval, Duration::from_millis(500));
        assert_eq!(config.max_failures, 10);
        assert_eq!(config.cooldown, Duration::from_secs(30));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(RequestStatus::Idle.to_string(), "idle");
        assert_eq!(RequestStatus::Active.to_string(), "active");
        assert_eq!(RequestStatus::Stopping.to_string(), "stopping");
    }

    #[test]
    fn test_scopes_do_not_share_tokens() {
        let a = CancellationScope::new(1);
        let b = CancellationScope::new(2);
        a.cancel();
        assert!(a.is_cancelled());
        assert!(!b.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_breaker_remaining() {
        let now = Instant::now();
        let mut state = LifecycleState::new();
        assert_eq!(state.breaker_remaining(now), None);
        state.breaker_open_until = Some(now + Duration::from_secs(5));
        assert_eq!(state.breaker_remaining(now), Some(Duration::from_secs(5)));
        assert_eq!(state.breaker_remaining(now + Duration::from_secs(5)), None);
    }
}
