use crate::domain::item::Item;
use crate::domain::state::MeetingState;

/// Normalized-key index over facts the meeting already knows.
///
/// Keys are lower-cased and trimmed; a candidate is considered already known
/// when its key is a substring of an existing key *or* an existing key is a
/// substring of the candidate. The two extractors phrase the same fact with
/// slightly different wording or truncation, so exact-equality hashing would
/// reintroduce the duplicates this index exists to suppress.
#[derive(Clone, Debug, Default)]
pub struct KnownIndex {
    keys: Vec<String>,
}

impl KnownIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the index from accumulated state: `speaker:task` for actions,
    /// the entry text for decisions and parking-lot topics.
    pub fn from_state(state: &MeetingState) -> Self {
        let mut index = Self::new();
        for action in &state.actions {
            index.admit(&format!("{}:{}", action.speaker, action.task));
        }
        for decision in &state.decisions {
            index.admit(decision);
        }
        for topic in &state.parking_lot {
            index.admit(topic);
        }
        index
    }

    /// True when `key` is a near-duplicate of an already-indexed key.
    pub fn contains_like(&self, key: &str) -> bool {
        let normalized = normalize(key);
        if normalized.is_empty() {
            return true;
        }
        self.keys
            .iter()
            .any(|known| known.contains(&normalized) || normalized.contains(known.as_str()))
    }

    /// Indexes `key` unless a near-duplicate is already present. Returns
    /// whether the key was admitted.
    pub fn admit(&mut self, key: &str) -> bool {
        if self.contains_like(key) {
            return false;
        }
        self.keys.push(normalize(key));
        true
    }

    /// Convenience for extracted items: admit on the item's dedup key.
    pub fn admit_item(&mut self, item: &Item) -> bool {
        self.admit(&item.dedup_key())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::KnownIndex;
    use crate::domain::state::{ActionEntry, MeetingState};

    #[test]
    fn admits_unrelated_keys() {
        let mut index = KnownIndex::new();
        assert!(index.admit("pricing model"));
        assert!(index.admit("hiring plan"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn rejects_exact_resubmission() {
        let mut index = KnownIndex::new();
        assert!(index.admit("pricing model"));
        assert!(!index.admit("Pricing Model"));
    }

    #[test]
    fn rejects_candidate_contained_in_existing_key() {
        let mut index = KnownIndex::new();
        assert!(index.admit("use the new pricing model"));
        assert!(!index.admit("pricing model"));
    }

    #[test]
    fn rejects_candidate_containing_existing_key() {
        let mut index = KnownIndex::new();
        assert!(index.admit("pricing model"));
        assert!(!index.admit("the pricing model discussion"));
    }

    #[test]
    fn empty_key_is_never_admitted() {
        let mut index = KnownIndex::new();
        assert!(!index.admit("   "));
        assert!(index.is_empty());
    }

    #[test]
    fn seeds_action_keys_from_state() {
        let mut state = MeetingState::default();
        state.actions.push(ActionEntry {
            speaker: "Sarah".to_string(),
            task: "send the budget".to_string(),
            deadline: "Friday".to_string(),
            confidence: 0.85,
        });

        let index = KnownIndex::from_state(&state);
        assert!(index.contains_like("sarah:send the budget"));
        assert!(!index.contains_like("john:review it"));
    }
}
