use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    #[default]
    Neutral,
    Positive,
    Negative,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Energy {
    Low,
    #[default]
    Medium,
    High,
}

/// Per-speaker participation counters. `time` is estimated speaking seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Speaking {
    pub turns: u32,
    pub time: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub speaker: String,
    pub task: String,
    pub deadline: String,
    pub confidence: f64,
}

/// Cumulative structured record of one live meeting.
///
/// Owned exclusively by the handling session and mutated once per accepted
/// transcript fragment, in arrival order. The list fields never hold two
/// entries that are near-duplicates under the containment rule; dedup happens
/// at extraction time, so [`MeetingState::merge`] appends without re-checking.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingState {
    pub actions: Vec<ActionEntry>,
    pub decisions: Vec<String>,
    pub parking_lot: Vec<String>,
    pub participation: BTreeMap<String, Speaking>,
    pub sentiment: Sentiment,
    pub energy: Energy,
}

impl MeetingState {
    /// Folds a reconciled delta into the accumulated state. Field-wise:
    /// list fields append, `participation` merges key-wise (speakers absent
    /// from the delta keep their counters), `sentiment`/`energy` take the
    /// delta's values (the reconciler carries the prior values forward when
    /// no tone signal fired).
    pub fn merge(&mut self, delta: MeetingState) {
        self.actions.extend(delta.actions);
        self.decisions.extend(delta.decisions);
        self.parking_lot.extend(delta.parking_lot);
        for (speaker, counters) in delta.participation {
            self.participation.insert(speaker, counters);
        }
        self.sentiment = delta.sentiment;
        self.energy = delta.energy;
    }

    /// Finds an existing participation key matching `speaker` ignoring case.
    /// Participation keys keep the casing of first insertion.
    pub fn participation_key(&self, speaker: &str) -> Option<&str> {
        self.participation
            .keys()
            .find(|known| known.eq_ignore_ascii_case(speaker))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionEntry, Energy, MeetingState, Sentiment, Speaking};

    fn state_with_alex() -> MeetingState {
        let mut state = MeetingState::default();
        state.participation.insert("Alex".to_string(), Speaking { turns: 2, time: 3.2 });
        state
    }

    #[test]
    fn merge_preserves_participation_absent_from_delta() {
        let mut state = state_with_alex();
        state.merge(MeetingState::default());

        let alex = state.participation.get("Alex").expect("Alex retained");
        assert_eq!(alex.turns, 2);
        assert!((alex.time - 3.2).abs() < f64::EPSILON);
    }

    #[test]
    fn merge_overwrites_counters_the_delta_provides() {
        let mut state = state_with_alex();
        let mut delta = MeetingState::default();
        delta.participation.insert("Alex".to_string(), Speaking { turns: 3, time: 5.0 });
        state.merge(delta);

        assert_eq!(state.participation.get("Alex").expect("Alex").turns, 3);
    }

    #[test]
    fn merge_appends_list_fields() {
        let mut state = MeetingState::default();
        state.decisions.push("use staging first".to_string());

        let mut delta = MeetingState::default();
        delta.decisions.push("use the new pricing".to_string());
        delta.actions.push(ActionEntry {
            speaker: "Sarah".to_string(),
            task: "send the budget".to_string(),
            deadline: "Friday".to_string(),
            confidence: 0.85,
        });
        state.merge(delta);

        assert_eq!(state.decisions.len(), 2);
        assert_eq!(state.actions.len(), 1);
    }

    #[test]
    fn merge_replaces_tone_wholesale() {
        let mut state = MeetingState::default();
        let delta =
            MeetingState { sentiment: Sentiment::Positive, energy: Energy::High, ..Default::default() };
        state.merge(delta);

        assert_eq!(state.sentiment, Sentiment::Positive);
        assert_eq!(state.energy, Energy::High);
    }

    #[test]
    fn participation_key_lookup_ignores_case_but_keeps_original() {
        let state = state_with_alex();
        assert_eq!(state.participation_key("alex"), Some("Alex"));
        assert_eq!(state.participation_key("Maria"), None);
    }

    #[test]
    fn wire_shape_uses_snake_case_fields() {
        let state = state_with_alex();
        let json = serde_json::to_value(&state).expect("serialize");
        assert_eq!(json["sentiment"], "neutral");
        assert_eq!(json["energy"], "medium");
        assert_eq!(json["participation"]["Alex"]["turns"], 2);
        assert!(json["parking_lot"].as_array().expect("array").is_empty());
    }
}
