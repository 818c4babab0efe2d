/// The addressable location a navigator persists its focus to.
///
/// Locations are fragments without the leading `#`. The empty string is the
/// clean, fragment-free location.
pub trait History {
    /// Current fragment
    fn current(&self) -> &str;

    /// Push a new addressable location
    fn push(&mut self, fragment: &str);
}

/// Session history kept in memory, with back/forward
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl MemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::with_initial("")
    }

    /// Start at an externally supplied location, e.g. a shared link
    pub fn with_initial(fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        let fragment = fragment.strip_prefix('#').unwrap_or(&fragment).to_string();
        Self {
            entries: vec![fragment],
            cursor: 0,
        }
    }

    /// Step back; returns false at the oldest entry
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Step forward; returns false at the newest entry
    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Number of entries, including those ahead of the cursor. Never zero.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl History for MemoryHistory {
    fn current(&self) -> &str {
        &self.entries[self.cursor]
    }

    fn push(&mut self, fragment: &str) {
        // Forward entries are discarded, as in a browser
        self.entries.truncate(self.cursor + 1);
        self.entries.push(fragment.to_string());
        self.cursor = self.entries.len() - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_strips_hash() {
        let history = MemoryHistory::with_initial("#dataset=a");
        assert_eq!(history.current(), "dataset=a");
        assert_eq!(MemoryHistory::new().current(), "");
    }

    #[test]
    fn test_back_forward() {
        let mut history = MemoryHistory::new();
        history.push("dataset=a");
        history.push("dataset=b");
        assert_eq!(history.len(), 3);

        assert!(history.back());
        assert_eq!(history.current(), "dataset=a");
        assert!(history.back());
        assert_eq!(history.current(), "");
        assert!(!history.back());

        assert!(history.forward());
        assert!(history.forward());
        assert_eq!(history.current(), "dataset=b");
        assert!(!history.forward());
    }

    #[test]
    fn test_push_discards_forward_entries() {
        let mut history = MemoryHistory::new();
        history.push("dataset=a");
        history.push("dataset=b");
        history.back();
        history.push("attribute=w");
        assert_eq!(history.entries(), &["", "dataset=a", "attribute=w"]);
        assert!(!history.forward());
    }
}
