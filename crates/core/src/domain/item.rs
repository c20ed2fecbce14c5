use serde::{Deserialize, Serialize};

/// Category of an extracted meeting fact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    ActionItem,
    Decision,
    ParkingLot,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActionItem => "action_item",
            Self::Decision => "decision",
            Self::ParkingLot => "parking_lot",
        }
    }
}

/// Kind-specific payload of an extracted item. Serialized as a bare object
/// (`{"task": ..., "deadline": ...}`, `{"what": ...}`, `{"item": ...}`) so the
/// wire shape matches the dashboard contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemDetails {
    Action {
        task: String,
        deadline: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        priority: Option<String>,
    },
    Decision {
        what: String,
    },
    Parking {
        item: String,
    },
}

/// One extracted meeting fact, normalized into the canonical schema.
///
/// `content` is always derived from `details` + `speaker` + `kind` through
/// [`render_content`]; it is never authored separately once an item exists, so
/// re-rendering is idempotent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub confidence: f64,
    pub speaker: String,
    pub content: String,
    pub details: ItemDetails,
}

impl Item {
    pub fn action(
        speaker: impl Into<String>,
        task: impl Into<String>,
        deadline: impl Into<String>,
        confidence: f64,
    ) -> Self {
        let speaker = speaker.into();
        let details =
            ItemDetails::Action { task: task.into(), deadline: deadline.into(), priority: None };
        Self {
            kind: ItemKind::ActionItem,
            confidence,
            content: render_content(ItemKind::ActionItem, &speaker, &details),
            speaker,
            details,
        }
    }

    pub fn decision(speaker: impl Into<String>, what: impl Into<String>, confidence: f64) -> Self {
        let speaker = speaker.into();
        let details = ItemDetails::Decision { what: what.into() };
        Self {
            kind: ItemKind::Decision,
            confidence,
            content: render_content(ItemKind::Decision, &speaker, &details),
            speaker,
            details,
        }
    }

    pub fn parking(topic: impl Into<String>, confidence: f64) -> Self {
        let speaker = "Team".to_string();
        let details = ItemDetails::Parking { item: topic.into() };
        Self {
            kind: ItemKind::ParkingLot,
            confidence,
            content: render_content(ItemKind::ParkingLot, &speaker, &details),
            speaker,
            details,
        }
    }

    /// Key used by the containment dedup index. Actions key on
    /// `speaker:task`; decisions and parking-lot items key on their text.
    pub fn dedup_key(&self) -> String {
        match &self.details {
            ItemDetails::Action { task, .. } => {
                format!("{}:{}", self.speaker.to_lowercase(), task.to_lowercase())
            }
            ItemDetails::Decision { what } => what.to_lowercase(),
            ItemDetails::Parking { item } => item.to_lowercase(),
        }
    }
}

/// Canonical human-readable rendering of an item.
pub fn render_content(kind: ItemKind, speaker: &str, details: &ItemDetails) -> String {
    match (kind, details) {
        (ItemKind::ActionItem, ItemDetails::Action { task, deadline, .. }) => {
            format!("{speaker} will {task} by {deadline}")
        }
        (ItemKind::Decision, ItemDetails::Decision { what }) => format!("Decision: {what}"),
        (ItemKind::ParkingLot, ItemDetails::Parking { item }) => {
            format!("Parked for later: {item}")
        }
        // Mismatched kind/details never occur through the constructors.
        _ => String::new(),
    }
}
