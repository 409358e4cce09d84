//! Identities currently present in a shared realtime context.

use std::collections::HashSet;

/// Set semantics, never list: re-adding a present identity and removing
/// an absent one are both no-ops.
#[derive(Debug, Default)]
pub struct PresenceSet {
    users: HashSet<String>,
}

impl PresenceSet {
    /// Full replacement from a presence snapshot.
    pub fn replace(&mut self, users: impl IntoIterator<Item = String>) {
        self.users = users.into_iter().collect();
    }

    /// Returns false when the identity was already present.
    pub fn add(&mut self, user_id: &str) -> bool {
        self.users.insert(user_id.to_string())
    }

    /// Returns false when the identity was not present.
    pub fn remove(&mut self, user_id: &str) -> bool {
        self.users.remove(user_id)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.users.contains(user_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_add_is_a_noop() {
        let mut presence = PresenceSet::default();
        assert!(presence.add("u1"));
        assert!(!presence.add("u1"));
        assert_eq!(presence.len(), 1);
    }

    #[test]
    fn removing_a_non_member_is_a_noop() {
        let mut presence = PresenceSet::default();
        presence.add("u1");
        assert!(!presence.remove("u2"));
        assert_eq!(presence.len(), 1);
    }

    #[test]
    fn replace_overwrites_the_whole_set() {
        let mut presence = PresenceSet::default();
        presence.add("u1");
        presence.replace(vec!["u2".to_string(), "u3".to_string()]);
        assert!(!presence.contains("u1"));
        assert!(presence.contains("u2"));
        assert!(presence.contains("u3"));
        assert_eq!(presence.len(), 2);
    }
}
