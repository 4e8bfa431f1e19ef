//! Rate limiter for outbound notifications.
//!
//! A message identified by `(category, hash(content))` is accepted when it
//! was never sent, or when its cooldown has passed and its per-window
//! budget is not spent. The cooldown follows the poll interval.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use super::category::MessageCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThrottleKey {
    pub category: MessageCategory,
    pub content_hash: u64,
}

impl ThrottleKey {
    pub fn new(category: MessageCategory, content: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        Self {
            category,
            content_hash: hasher.finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleEntry {
    pub last_sent_at: Instant,
    pub sent_count: u32,
}

#[derive(Debug)]
pub struct NotificationThrottle {
    entries: HashMap<ThrottleKey, ThrottleEntry>,
    cooldown: Duration,
    max_per_category: u32,
}

impl NotificationThrottle {
    pub fn new(cooldown: Duration, max_per_category: u32) -> Self {
        Self {
            entries: HashMap::new(),
            cooldown,
            max_per_category,
        }
    }

    /// Follow a poll-interval change; applies to the next decision.
    pub fn set_cooldown(&mut self, cooldown: Duration) {
        self.cooldown = cooldown;
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn max_per_category(&self) -> u32 {
        self.max_per_category
    }

    /// Decide whether `content` may be delivered at `now`, recording the send
    /// when it may. A rejection leaves the entry untouched.
    pub fn should_send_at(&mut self, category: MessageCategory, content: &str, now: Instant) -> bool {
        let key = ThrottleKey::new(category, content);

        if let Some(entry) = self.entries.get_mut(&key) {
            let cooled_down = now.saturating_duration_since(entry.last_sent_at) >= self.cooldown;
            if !cooled_down || entry.sent_count >= self.max_per_category {
                return false;
            }
            entry.sent_count += 1;
            entry.last_sent_at = now;
            return true;
        }

        self.entries.insert(
            key,
            ThrottleEntry {
                last_sent_at: now,
                sent_count: 1,
            },
        );
        true
    }

    pub fn entry(&self, category: MessageCategory, content: &str) -> Option<&ThrottleEntry> {
        self.entries.get(&ThrottleKey::new(category, content))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry; called when a new session window starts.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(5);

    #[test]
    fn test_first_send_is_accepted() {
        let mut throttle = NotificationThrottle::new(COOLDOWN, 3);
        let now = Instant::now();

        assert!(throttle.should_send_at(MessageCategory::Info, "started", now));
        assert_eq!(throttle.entry(MessageCategory::Info, "started").unwrap().sent_count, 1);
    }

    #[test]
    fn test_repeat_within_cooldown_is_rejected_without_mutation() {
        let mut throttle = NotificationThrottle::new(COOLDOWN, 3);
        let now = Instant::now();
        assert!(throttle.should_send_at(MessageCategory::Error, "boom", now));

        let later = now + Duration::from_secs(4);
        assert!(!throttle.should_send_at(MessageCategory::Error, "boom", later));

        let entry = throttle.entry(MessageCategory::Error, "boom").unwrap();
        assert_eq!(entry.sent_count, 1);
        assert_eq!(entry.last_sent_at, now);
    }

    #[test]
    fn test_accepted_again_once_cooldown_elapses() {
        let mut throttle = NotificationThrottle::new(COOLDOWN, 3);
        let now = Instant::now();
        assert!(throttle.should_send_at(MessageCategory::Progress, "Processed 1 colonies", now));
        assert!(throttle.should_send_at(
            MessageCategory::Progress,
            "Processed 1 colonies",
            now + COOLDOWN
        ));
    }

    #[test]
    fn test_budget_exhausts_until_cleared() {
        let mut throttle = NotificationThrottle::new(COOLDOWN, 3);
        let mut now = Instant::now();
        for _ in 0..3 {
            assert!(throttle.should_send_at(MessageCategory::Warning, "no citizen", now));
            now += COOLDOWN;
        }
        assert!(!throttle.should_send_at(MessageCategory::Warning, "no citizen", now));
        assert!(!throttle.should_send_at(
            MessageCategory::Warning,
            "no citizen",
            now + Duration::from_secs(3600)
        ));

        throttle.clear();
        assert!(throttle.should_send_at(MessageCategory::Warning, "no citizen", now));
    }

    #[test]
    fn test_category_is_part_of_key() {
        let mut throttle = NotificationThrottle::new(COOLDOWN, 1);
        let now = Instant::now();
        assert!(throttle.should_send_at(MessageCategory::Error, "same text", now));
        assert!(throttle.should_send_at(MessageCategory::Warning, "same text", now));
        assert_eq!(throttle.len(), 2);
    }

    #[test]
    fn test_cooldown_follows_interval_change() {
        let mut throttle = NotificationThrottle::new(Duration::from_secs(60), 3);
        let now = Instant::now();
        assert!(throttle.should_send_at(MessageCategory::Info, "tick", now));
        assert!(!throttle.should_send_at(MessageCategory::Info, "tick", now + Duration::from_secs(10)));

        throttle.set_cooldown(Duration::from_secs(10));
        assert!(throttle.should_send_at(MessageCategory::Info, "tick", now + Duration::from_secs(10)));
    }
}
