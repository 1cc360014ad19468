//! Periodic dashboard refresh.
//!
//! Each cycle takes a new generation number and issues its fetches as
//! independent tasks. Older cycles are never cancelled, so a slow response
//! from an earlier cycle can land after a newer one; slots reject anything
//! tagged older than what they already hold.

use crate::dashboard::{fetch_course_shares, fetch_message_points};
use crate::models::{AnalyticsOverview, CourseShare, MessagePoint};
use crate::state::AppState;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

#[derive(Debug, Default)]
pub struct GenerationCounter {
    issued: AtomicU64,
}

impl GenerationCounter {
    /// Issues the next generation, starting at 1.
    pub fn next(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

/// A fetch outcome labelled with the generation it was issued under.
#[derive(Debug)]
pub struct Tagged<T> {
    pub generation: u64,
    pub outcome: Result<T, String>,
}

impl<T> Tagged<T> {
    pub fn new(generation: u64, outcome: Result<T, String>) -> Self {
        Self { generation, outcome }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Slot<T> {
    pub generation: u64,
    pub value: Option<T>,
    pub error: Option<String>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            value: None,
            error: None,
        }
    }
}

impl<T> Slot<T> {
    /// Applies `tagged` unless the slot already holds a newer generation.
    ///
    /// A failed fetch records the error and keeps the last good value.
    pub fn apply(&mut self, tagged: Tagged<T>) -> bool {
        if tagged.generation < self.generation {
            return false;
        }
        self.generation = tagged.generation;
        match tagged.outcome {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
            }
            Err(err) => self.error = Some(err),
        }
        true
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    pub overview: Slot<AnalyticsOverview>,
    pub messages: Slot<Vec<MessagePoint>>,
    pub courses: Slot<Vec<CourseShare>>,
}

/// Starts one refresh cycle. The returned handles are only needed by callers
/// that want to wait for it.
pub fn spawn_cycle(state: &AppState) -> Vec<JoinHandle<()>> {
    let generation = state.generations.next();
    debug!(generation, "refresh cycle started");

    let overview = {
        let state = state.clone();
        tokio::spawn(async move {
            let outcome = state.gateway.overview().await.map_err(|err| err.to_string());
            let tagged = Tagged::new(generation, outcome);
            let applied = state.dashboard.lock().await.overview.apply(tagged);
            settled("overview", generation, applied);
        })
    };

    let messages = {
        let state = state.clone();
        tokio::spawn(async move {
            let outcome = fetch_message_points(&state.gateway)
                .await
                .map_err(|err| err.to_string());
            let tagged = Tagged::new(generation, outcome);
            let applied = state.dashboard.lock().await.messages.apply(tagged);
            settled("messages", generation, applied);
        })
    };

    let courses = {
        let state = state.clone();
        tokio::spawn(async move {
            let outcome = fetch_course_shares(&state.gateway, &state.config)
                .await
                .map_err(|err| err.to_string());
            let tagged = Tagged::new(generation, outcome);
            let applied = state.dashboard.lock().await.courses.apply(tagged);
            settled("courses", generation, applied);
        })
    };

    vec![overview, messages, courses]
}

fn settled(slot: &str, generation: u64, applied: bool) {
    if applied {
        debug!(slot, generation, "dashboard slot updated");
    } else {
        info!(slot, generation, "discarded stale response");
    }
}

/// Refreshes the dashboard every `refresh_interval`, starting immediately.
pub async fn run(state: AppState) {
    let mut interval = tokio::time::interval(state.config.refresh_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        interval_secs = state.config.refresh_interval.as_secs(),
        "dashboard refresher started"
    );

    loop {
        interval.tick().await;
        let handles = spawn_cycle(&state);
        tokio::spawn(async move {
            for handle in handles {
                if let Err(err) = handle.await {
                    error!("refresh task failed: {err}");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn generations_are_monotonic() {
        let counter = GenerationCounter::default();
        assert_eq!(counter.latest(), 0);
        assert_eq!(counter.next(), 1);
        assert_eq!(counter.next(), 2);
        assert_eq!(counter.latest(), 2);
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut slot = Slot::default();
        assert!(slot.apply(Tagged::new(2, Ok("fresh"))));
        assert!(!slot.apply(Tagged::new(1, Ok("stale"))));
        assert_eq!(slot.value, Some("fresh"));
        assert_eq!(slot.generation, 2);
    }

    #[test]
    fn errors_keep_the_last_good_value() {
        let mut slot = Slot::default();
        slot.apply(Tagged::new(1, Ok(10)));
        assert!(slot.apply(Tagged::new(2, Err("API returned 500".to_string()))));
        assert_eq!(slot.value, Some(10));
        assert_eq!(slot.error.as_deref(), Some("API returned 500"));

        assert!(slot.apply(Tagged::new(3, Ok(11))));
        assert_eq!(slot.error, None);
    }

    #[test]
    fn stale_error_does_not_mask_fresh_value() {
        let mut slot = Slot::default();
        slot.apply(Tagged::new(4, Ok(1)));
        assert!(!slot.apply(Tagged::new(3, Err::<i32, _>("timeout".to_string()))));
        assert_eq!(slot.error, None);
    }

    #[tokio::test]
    async fn cycle_records_errors_when_backend_is_down() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = Config {
            backend_url: format!("http://127.0.0.1:{port}"),
            ..Config::default()
        };
        let state = AppState::new(config);

        for handle in spawn_cycle(&state) {
            handle.await.unwrap();
        }

        let snapshot = state.dashboard.lock().await;
        assert_eq!(snapshot.overview.generation, 1);
        assert!(snapshot.overview.value.is_none());
        assert!(snapshot.overview.error.is_some());
        assert!(snapshot.messages.error.is_some());
        assert!(snapshot.courses.error.is_some());
    }
}
