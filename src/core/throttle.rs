//! Alert suppression for sustained degradation.
//!
//! A degraded tick re-alerts when any of these holds:
//! - nothing has been sent yet,
//! - the degraded speed differs from the last alerted speed,
//! - more than the notification interval has passed since the last alert.

use chrono::{DateTime, TimeDelta, Utc};

/// Memory of the last alert that was allowed through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThrottleState {
    pub last_notified_speed: Option<u64>,
    pub last_notified_at: Option<DateTime<Utc>>,
}

/// Decides whether a degraded sample should produce a notification.
#[derive(Debug, Default)]
pub struct NotificationThrottle {
    state: ThrottleState,
}

impl NotificationThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ThrottleState {
        self.state
    }

    /// Returns `true` when an alert should be sent for `speed_mbps` at `now`.
    ///
    /// On `true` the state is updated before returning, so the caller records the
    /// alert even if delivery later fails.
    pub fn should_notify(
        &mut self,
        speed_mbps: u64,
        now: DateTime<Utc>,
        notification_interval_secs: u64,
    ) -> bool {
        let fire = match (self.state.last_notified_speed, self.state.last_notified_at) {
            (Some(last_speed), Some(last_at)) => {
                last_speed != speed_mbps || interval_elapsed(last_at, now, notification_interval_secs)
            }
            _ => true,
        };

        if fire {
            self.state = ThrottleState {
                last_notified_speed: Some(speed_mbps),
                last_notified_at: Some(now),
            };
        }
        fire
    }
}

/// Strictly more than `interval_secs` between `last` and `now`.
fn interval_elapsed(last: DateTime<Utc>, now: DateTime<Utc>, interval_secs: u64) -> bool {
    let Some(window) = i64::try_from(interval_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
    else {
        return false;
    };
    now - last > window
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_first_alert_always_fires() {
        let mut throttle = NotificationThrottle::new();
        assert!(throttle.should_notify(100, at(0), 60));
        assert_eq!(
            throttle.state(),
            ThrottleState {
                last_notified_speed: Some(100),
                last_notified_at: Some(at(0)),
            }
        );
    }

    #[test]
    fn test_same_speed_within_window_is_suppressed() {
        let mut throttle = NotificationThrottle::new();
        assert!(throttle.should_notify(100, at(0), 60));
        assert!(!throttle.should_notify(100, at(30), 60));
        assert!(!throttle.should_notify(100, at(60), 60), "boundary is exclusive");
        assert_eq!(throttle.state().last_notified_at, Some(at(0)));
    }

    #[test]
    fn test_same_speed_after_window_reminds() {
        let mut throttle = NotificationThrottle::new();
        assert!(throttle.should_notify(100, at(0), 60));
        assert!(throttle.should_notify(100, at(61), 60));
        assert_eq!(throttle.state().last_notified_at, Some(at(61)));
        assert!(!throttle.should_notify(100, at(100), 60));
    }

    #[test]
    fn test_changed_speed_fires_immediately() {
        let mut throttle = NotificationThrottle::new();
        assert!(throttle.should_notify(100, at(0), 600));
        assert!(throttle.should_notify(10, at(0), 600));
        assert_eq!(throttle.state().last_notified_speed, Some(10));
        assert!(throttle.should_notify(100, at(1), 600));
    }

    #[test]
    fn test_interval_change_applies_to_existing_state() {
        let mut throttle = NotificationThrottle::new();
        assert!(throttle.should_notify(100, at(0), 600));
        assert!(!throttle.should_notify(100, at(30), 600));
        assert!(throttle.should_notify(100, at(31), 10));
    }

    #[test]
    fn test_huge_interval_never_elapses() {
        let mut throttle = NotificationThrottle::new();
        assert!(throttle.should_notify(100, at(0), u64::MAX));
        assert!(!throttle.should_notify(100, at(10_000_000), u64::MAX));
    }
}
