use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Severity level for in-app toasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

/// A transient user-visible notification for overlay rendering.
#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub text: String,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl Toast {
    /// Creates an info toast with a 4-second TTL.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            text: text.into(),
            created_at: Instant::now(),
            ttl: Duration::from_secs(4),
        }
    }

    /// Creates a warning toast with an 8-second TTL.
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Warning,
            text: text.into(),
            created_at: Instant::now(),
            ttl: Duration::from_secs(8),
        }
    }

    /// Creates an error toast with a 10-second TTL.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            text: text.into(),
            created_at: Instant::now(),
            ttl: Duration::from_secs(10),
        }
    }

    /// Returns `true` once this toast has exceeded its TTL.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// A bounded queue of toasts that evicts expired entries on access.
#[derive(Debug)]
pub struct ToastQueue {
    items: VecDeque<Toast>,
    capacity: usize,
}

impl ToastQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes a toast, evicting expired entries first. If still at
    /// capacity after eviction, the oldest entry is removed.
    pub fn push(&mut self, toast: Toast) {
        self.evict_expired();
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(toast);
    }

    /// Currently visible (non-expired) toasts, oldest first.
    pub fn visible(&mut self) -> Vec<&Toast> {
        self.evict_expired();
        self.items.iter().collect()
    }

    /// Text of the most recently pushed toast, expired or not.
    pub fn last_text(&self) -> Option<&str> {
        self.items.back().map(|t| t.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn evict_expired(&mut self) {
        self.items.retain(|t| !t.is_expired());
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_and_ttls() {
        assert_eq!(Toast::info("a").level, ToastLevel::Info);
        assert_eq!(Toast::warning("b").level, ToastLevel::Warning);
        assert_eq!(Toast::error("c").level, ToastLevel::Error);
        assert!(Toast::info("a").ttl < Toast::error("c").ttl);
    }

    #[test]
    fn fresh_toast_is_not_expired() {
        assert!(!Toast::info("hello").is_expired());
    }

    #[test]
    fn expired_toast_detected() {
        let mut toast = Toast::info("old");
        toast.ttl = Duration::ZERO;
        assert!(toast.is_expired());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut queue = ToastQueue::new(2);
        queue.push(Toast::info("one"));
        queue.push(Toast::info("two"));
        queue.push(Toast::info("three"));
        assert_eq!(queue.len(), 2);
        let texts: Vec<_> = queue.visible().iter().map(|t| t.text.clone()).collect();
        assert_eq!(texts, vec!["two", "three"]);
    }

    #[test]
    fn expired_entries_dropped_before_capacity_check() {
        let mut queue = ToastQueue::new(2);
        let mut stale = Toast::info("stale");
        stale.ttl = Duration::ZERO;
        queue.push(stale);
        queue.push(Toast::info("kept"));
        queue.push(Toast::info("new"));
        let texts: Vec<_> = queue.visible().iter().map(|t| t.text.clone()).collect();
        assert_eq!(texts, vec!["kept", "new"]);
    }

    #[test]
    fn last_text_tracks_most_recent() {
        let mut queue = ToastQueue::default();
        assert!(queue.last_text().is_none());
        queue.push(Toast::info("first"));
        queue.push(Toast::warning("second"));
        assert_eq!(queue.last_text(), Some("second"));
    }
}
