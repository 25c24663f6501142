//! Remaining-time projection of the next claim

use crate::format::parse_timestamp;
use crate::state::SharedState;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Remaining time until an address may claim again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    AvailableNow,
    Remaining { hours: i64, minutes: i64 },
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::AvailableNow => write!(f, "Available now"),
            Countdown::Remaining { hours, minutes } if *hours > 0 => {
                write!(f, "{}h {}m", hours, minutes)
            }
            Countdown::Remaining { minutes, .. } => write!(f, "{}m", minutes),
        }
    }
}

/// Project a parsed deadline against `now`.
/// Absent or past deadlines are available now; otherwise whole hours and minutes, floored.
pub fn project_until(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Countdown {
    let remaining = match deadline {
        Some(deadline) => deadline - now,
        None => return Countdown::AvailableNow,
    };

    if remaining <= chrono::Duration::zero() {
        return Countdown::AvailableNow;
    }

    let total_minutes = remaining.num_minutes();
    Countdown::Remaining {
        hours: total_minutes / 60,
        minutes: total_minutes % 60,
    }
}

/// Project a raw `nextClaimTime` string; unparseable values count as absent
pub fn project(next_claim_time: Option<&str>, now: DateTime<Utc>) -> Countdown {
    project_until(next_claim_time.and_then(parse_timestamp), now)
}

/// Re-renders the session countdown on a fixed tick while a deadline is active
pub(crate) struct CountdownProjector {
    state: SharedState,
    deadline: watch::Receiver<Option<DateTime<Utc>>>,
    tick: Duration,
}

impl CountdownProjector {
    pub(crate) fn new(
        state: SharedState,
        deadline: watch::Receiver<Option<DateTime<Utc>>>,
        tick: Duration,
    ) -> Self {
        Self {
            state,
            deadline,
            tick,
        }
    }

    pub(crate) fn spawn(self, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(mut self, shutdown: CancellationToken) {
        debug!("Countdown projector started");

        loop {
            let deadline = *self.deadline.borrow_and_update();

            let ticking = match deadline {
                Some(deadline) => {
                    let countdown = project_until(Some(deadline), Utc::now());
                    self.state.write().await.countdown = Some(countdown);
                    // Once due, the value cannot change until a new deadline arrives
                    countdown != Countdown::AvailableNow
                }
                None => {
                    self.state.write().await.countdown = None;
                    false
                }
            };

            if ticking {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    changed = self.deadline.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(self.tick) => {}
                }
            } else {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    changed = self.deadline.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        debug!("Countdown projector stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionState;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn at(now: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
        now + chrono::Duration::seconds(secs)
    }

    #[test]
    fn test_hours_and_minutes() {
        let now = Utc::now();
        let countdown = project_until(Some(at(now, 2 * 3600 + 5 * 60)), now);
        assert_eq!(countdown, Countdown::Remaining { hours: 2, minutes: 5 });
        assert_eq!(countdown.to_string(), "2h 5m");
    }

    #[test]
    fn test_minutes_only() {
        let now = Utc::now();
        assert_eq!(project_until(Some(at(now, 45 * 60)), now).to_string(), "45m");
        assert_eq!(project_until(Some(at(now, 59)), now).to_string(), "0m");
        assert_eq!(project_until(Some(at(now, 3600 + 59)), now).to_string(), "1h 0m");
    }

    #[test]
    fn test_past_or_absent_is_available_now() {
        let now = Utc::now();
        assert_eq!(project_until(Some(at(now, -1)), now), Countdown::AvailableNow);
        assert_eq!(project_until(Some(now), now), Countdown::AvailableNow);
        assert_eq!(project_until(None, now).to_string(), "Available now");
    }

    #[test]
    fn test_project_raw_strings() {
        let now = DateTime::parse_from_rfc3339("2026-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(project(Some("2026-05-01T12:30:59Z"), now).to_string(), "2h 30m");
        assert_eq!(project(Some("garbage"), now), Countdown::AvailableNow);
        assert_eq!(project(Some(""), now), Countdown::AvailableNow);
        assert_eq!(project(None, now), Countdown::AvailableNow);
    }

    #[tokio::test(start_paused = true)]
    async fn test_projector_follows_deadline_changes() {
        let state = Arc::new(RwLock::new(SessionState::default()));
        let (tx, rx) = watch::channel(None);
        let shutdown = CancellationToken::new();
        let handle = CountdownProjector::new(state.clone(), rx, Duration::from_secs(1))
            .spawn(shutdown.clone());

        tx.send_replace(Some(Utc::now() + chrono::Duration::seconds(2 * 3600 + 5 * 60 + 30)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(state.read().await.countdown.map(|c| c.to_string()).as_deref(), Some("2h 5m"));

        tx.send_replace(None);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(state.read().await.countdown, None);

        tx.send_replace(Some(Utc::now() - chrono::Duration::seconds(1)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(state.read().await.countdown, Some(Countdown::AvailableNow));

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_projector_is_idle_without_active_deadline() {
        let state = Arc::new(RwLock::new(SessionState::default()));
        let (tx, rx) = watch::channel(Some(Utc::now() + chrono::Duration::hours(1)));
        let shutdown = CancellationToken::new();
        let handle = CountdownProjector::new(state.clone(), rx, Duration::from_secs(1))
            .spawn(shutdown.clone());
        let marker = Some(Countdown::Remaining { hours: 99, minutes: 99 });

        // Ticking: a foreign value is overwritten within one period
        tokio::time::sleep(Duration::from_millis(10)).await;
        state.write().await.countdown = marker;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_ne!(state.read().await.countdown, marker);

        // Deadline cleared: nothing is written across several periods
        tx.send_replace(None);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(state.read().await.countdown, None);
        state.write().await.countdown = marker;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(state.read().await.countdown, marker);

        // Deadline already due: rendered once, then idle
        tx.send_replace(Some(Utc::now() - chrono::Duration::seconds(1)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(state.read().await.countdown, Some(Countdown::AvailableNow));
        state.write().await.countdown = marker;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(state.read().await.countdown, marker);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_projector_stops_when_sender_dropped() {
        let state = Arc::new(RwLock::new(SessionState::default()));
        let (tx, rx) = watch::channel(Some(Utc::now() + chrono::Duration::hours(1)));
        let handle = CountdownProjector::new(state, rx, Duration::from_secs(1))
            .spawn(CancellationToken::new());

        tokio::time::sleep(Duration::from_secs(3)).await;
        drop(tx);
        handle.await.unwrap();
    }
}
