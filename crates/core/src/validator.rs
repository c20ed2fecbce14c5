use serde::{Deserialize, Serialize};

use crate::domain::item::{Item, ItemDetails, ItemKind};

/// Word lists backing [`ItemValidator`]. Externally configurable via the
/// `[extraction]` config section; defaults match the upstream model's known
/// failure modes and are not expanded beyond them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Phrases the upstream model echoes verbatim from its instruction
    /// schema when it finds nothing real.
    pub placeholder_denylist: Vec<String>,
    /// Generic words that disqualify a parking-lot topic on their own.
    pub parking_blacklist: Vec<String>,
    /// Speakers too generic to own an action item.
    pub generic_speakers: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            placeholder_denylist: [
                "name will",
                "task description",
                "what was decided",
                "do something",
                "nothing",
                "none",
                "n/a",
                "example",
                "placeholder",
            ]
            .map(str::to_string)
            .to_vec(),
            parking_blacklist: ["nothing", "none", "n/a", "parking", "items", "item", "lot"]
                .map(str::to_string)
                .to_vec(),
            generic_speakers: ["name", "we", "person"].map(str::to_string).to_vec(),
        }
    }
}

/// The only defense against the upstream model echoing its instruction
/// schema's example values back as extracted facts. Rejected items are
/// dropped silently and observable only via diagnostics.
#[derive(Clone, Debug, Default)]
pub struct ItemValidator {
    config: ValidatorConfig,
}

impl ItemValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, item: &Item) -> bool {
        if self.contains_placeholder(item) {
            return false;
        }

        match (&item.kind, &item.details) {
            (ItemKind::ParkingLot, ItemDetails::Parking { item: topic }) => {
                self.valid_parking_topic(topic)
            }
            (ItemKind::ActionItem, ItemDetails::Action { task, deadline, .. }) => {
                self.valid_action(&item.speaker, task, deadline)
            }
            (ItemKind::Decision, ItemDetails::Decision { what }) => what.trim().len() >= 3,
            // Kind/details mismatch only happens on hand-built items.
            _ => false,
        }
    }

    fn contains_placeholder(&self, item: &Item) -> bool {
        let serialized = serde_json::to_string(item).unwrap_or_default().to_lowercase();
        self.config
            .placeholder_denylist
            .iter()
            .any(|phrase| serialized.contains(phrase.to_lowercase().as_str()))
    }

    fn valid_parking_topic(&self, topic: &str) -> bool {
        let trimmed = topic.trim();
        if trimmed.len() < 4 {
            return false;
        }
        !self.config.parking_blacklist.iter().any(|word| trimmed.eq_ignore_ascii_case(word))
    }

    fn valid_action(&self, speaker: &str, task: &str, deadline: &str) -> bool {
        if task.trim().len() < 3 || deadline.trim().is_empty() {
            return false;
        }
        let speaker = speaker.trim().to_lowercase();
        if speaker.is_empty() {
            return false;
        }
        !self.config.generic_speakers.iter().any(|generic| speaker == generic.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemValidator, ValidatorConfig};
    use crate::domain::item::Item;

    fn validator() -> ItemValidator {
        ItemValidator::new(ValidatorConfig::default())
    }

    #[test]
    fn accepts_concrete_action() {
        let item = Item::action("Sarah", "send the budget", "Friday", 0.9);
        assert!(validator().validate(&item));
    }

    #[test]
    fn rejects_schema_echo_task() {
        let item = Item::action("Sarah", "task description", "when", 0.9);
        assert!(!validator().validate(&item));
    }

    #[test]
    fn rejects_do_something_task_from_any_source() {
        let item = Item::action("Sarah", "do something", "Friday", 0.9);
        assert!(!validator().validate(&item));
    }

    #[test]
    fn rejects_generic_speaker() {
        for speaker in ["Name", "we", "Person", ""] {
            let item = Item::action(speaker, "send the budget", "Friday", 0.9);
            assert!(!validator().validate(&item), "speaker `{speaker}` should be rejected");
        }
    }

    #[test]
    fn rejects_action_without_deadline() {
        let item = Item::action("Sarah", "send the budget", "", 0.9);
        assert!(!validator().validate(&item));
    }

    #[test]
    fn rejects_short_parking_topic() {
        assert!(!validator().validate(&Item::parking("it", 0.85)));
    }

    #[test]
    fn rejects_blacklisted_parking_topic() {
        for topic in ["nothing", "Items", "parking"] {
            assert!(!validator().validate(&Item::parking(topic, 0.85)), "topic `{topic}`");
        }
    }

    #[test]
    fn accepts_named_parking_topic() {
        assert!(validator().validate(&Item::parking("pricing model", 0.85)));
    }

    #[test]
    fn rejects_short_decision() {
        assert!(!validator().validate(&Item::decision("Team", "ok", 0.9)));
    }

    #[test]
    fn rejects_placeholder_decision_text() {
        assert!(!validator().validate(&Item::decision("Team", "what was decided", 0.9)));
    }
}
