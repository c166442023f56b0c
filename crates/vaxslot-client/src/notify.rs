//! Notification throttling and message composition for search results.
//! Delivery itself belongs to the caller.

use chrono::{DateTime, Duration, Utc};

use crate::types::SlotMatch;

/// Matches listed in a summary before it is cut off.
const SUMMARY_MAX_LINES: usize = 6;

/// Suppresses repeat notifications within `min_interval` of the last
/// successful send.
#[derive(Debug, Clone)]
pub struct NotificationGate {
    min_interval: Duration,
    last_sent: Option<DateTime<Utc>>,
}

impl NotificationGate {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_sent: None,
        }
    }

    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        let secs = i64::try_from(secs).unwrap_or(i64::MAX).min(i64::MAX / 1_000);
        Self::new(Duration::seconds(secs))
    }

    #[must_use]
    pub fn should_send(&self, now: DateTime<Utc>) -> bool {
        match self.last_sent {
            None => true,
            Some(last) => {
                let elapsed = now - last;
                let elapsed = if elapsed < Duration::zero() { -elapsed } else { elapsed };
                elapsed > self.min_interval
            }
        }
    }

    pub fn record_sent(&mut self, now: DateTime<Utc>) {
        self.last_sent = Some(now);
    }

    #[must_use]
    pub fn last_sent(&self) -> Option<DateTime<Utc>> {
        self.last_sent
    }
}

/// Builds the notification body: a count line followed by the first few
/// matches, one per line.
#[must_use]
pub fn compose_summary(matches: &[SlotMatch]) -> String {
    let mut body = format!("Sessions available: {}\n", matches.len());
    for m in matches.iter().take(SUMMARY_MAX_LINES) {
        body.push_str(&m.to_string());
        body.push('\n');
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(n: usize) -> SlotMatch {
        SlotMatch {
            session_id: format!("s-{n}"),
            center_id: i64::try_from(n).unwrap(),
            center_name: format!("Center {n}"),
            district: "Pune".to_owned(),
            date: "01-06-2021".to_owned(),
            vaccine: "COVISHIELD".to_owned(),
            available_capacity: 5,
            time_slots: vec![],
        }
    }

    #[test]
    fn first_notification_is_always_allowed() {
        let gate = NotificationGate::from_secs(30);
        assert!(gate.should_send(Utc::now()));
        assert!(gate.last_sent().is_none());
    }

    #[test]
    fn repeat_within_interval_is_suppressed() {
        let mut gate = NotificationGate::from_secs(30);
        let t0 = Utc::now();
        gate.record_sent(t0);
        assert!(!gate.should_send(t0 + Duration::seconds(10)));
        assert!(!gate.should_send(t0 + Duration::seconds(30)));
        assert!(gate.should_send(t0 + Duration::seconds(31)));
        assert_eq!(gate.last_sent(), Some(t0));
    }

    #[test]
    fn summary_lists_at_most_six_matches() {
        let matches: Vec<SlotMatch> = (0..9).map(slot).collect();
        let body = compose_summary(&matches);
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "Sessions available: 9");
        assert_eq!(lines.len(), 1 + 6);
        assert!(lines[1].starts_with("Center 0, Pune"));
    }
}
