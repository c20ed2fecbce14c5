use regex::Regex;
use thiserror::Error;
use tracing::debug;

use minutey_core::config::ExtractionConfig;
use minutey_core::{Item, ItemValidator, KnownIndex};

const PATTERN_CONFIDENCE: f64 = 0.85;
const GENERIC_PARKING_CONFIDENCE: f64 = 0.6;

/// Conjunctions trimmed from the tail of captured tasks and deadlines.
const TRAILING_CONJUNCTIONS: [&str; 4] = ["and", "but", "or", "then"];

/// Specific parking-lot phrasings; group 1 captures the topic.
const SPECIFIC_PARKING_PATTERNS: [&str; 4] = [
    r"(?i)\bpark\s+(?:the\s+)?(.+?)\s+discussion\b",
    r"(?i)\bdiscuss\s+(?:the\s+)?(.+?)\s+(?:later|next\s+time)\b",
    r"(?i)\btable\s+(?:the\s+)?([\w\s-]+?)(?:\s+for\s+(?:later|now)|\s+until\s+later|[.,;:!?]|$)",
    r"(?i)\badd\s+(?:the\s+)?(.+?)\s+to\s+the\s+parking\s+lot\b",
];

/// Bare deferral phrases with no named topic. They map to the configured
/// generic topic, at most once per fragment.
const GENERIC_PARKING_PATTERNS: [&str; 4] = [
    r"(?i)\bdiscuss\s+(?:it|this|that)\s+later\b",
    r"(?i)\btalk\s+about\s+(?:it|this|that)\s+later\b",
    r"(?i)\bcome\s+back\s+to\s+(?:it|this|that)\b",
    r"(?i)\bput\s+a\s+pin\s+in\s+(?:it|this|that)\b",
];

/// `<Name> will <task> by <deadline>`; deadline captures one or two trailing
/// words.
const ACTION_WILL_PATTERN: &str = r"(?i)\b(\w+)\s+will\s+(.+?)\s+by\s+(\w+(?:\s+\w+)?)";

/// `<Name> to/should <task> by <deadline>`. Restricted to capitalized
/// speaker tokens, otherwise every "X to Y by Z" prepositional phrase
/// becomes an action.
const ACTION_ASSIGN_PATTERN: &str = r"\b([A-Z]\w+)\s+(?:to|should)\s+(.+?)\s+by\s+(\w+(?:\s+\w+)?)";

/// `<Name> decided to <X>`; group 1 = name, group 2 = X.
const NAMED_DECISION_PATTERN: &str = r"(?i)\b(\w+)\s+decided\s+to\s+(.+?)(?:[.,;:!?]|$)";

/// Speaker-less decision phrasings attributed to "Team"; group 1 = X.
const TEAM_DECISION_PATTERNS: [&str; 2] = [
    r"(?i)\b(?:we|the\s+team|team)\s+agreed\s+to\s+(.+?)(?:[.,;:!?]|$)",
    r"(?i)\b(?:let'?s|we'?ll)\s+(?:go\s+with|use)\s+(?:the\s+)?(.+?)(?:[.,;:!?]|$)",
];

#[derive(Debug, Error)]
#[error("invalid extraction pattern: {0}")]
pub struct PatternError(#[from] regex::Error);

/// Rule-based extractor over raw transcript text. Always runs, independent of
/// the primary extractor's success, using the caller's [`KnownIndex`] as the
/// already-known baseline so it only contributes facts still missing.
pub struct PatternExtractor {
    validator: ItemValidator,
    generic_topic: String,
    specific_parking: Vec<Regex>,
    generic_parking: Vec<Regex>,
    actions: Vec<Regex>,
    named_decision: Regex,
    team_decisions: Vec<Regex>,
}

impl PatternExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self, PatternError> {
        Ok(Self {
            validator: ItemValidator::new(config.validator_config()),
            generic_topic: config.generic_parking_topic.clone(),
            specific_parking: compile_all(&SPECIFIC_PARKING_PATTERNS)?,
            generic_parking: compile_all(&GENERIC_PARKING_PATTERNS)?,
            actions: compile_all(&[ACTION_WILL_PATTERN, ACTION_ASSIGN_PATTERN])?,
            named_decision: Regex::new(NAMED_DECISION_PATTERN)?,
            team_decisions: compile_all(&TEAM_DECISION_PATTERNS)?,
        })
    }

    /// Runs all pattern families over `transcript` in evaluation order:
    /// parking-lot specific, parking-lot generic, actions, decisions.
    /// Accepted items are admitted into `known` as they are found, so later
    /// families dedup against earlier ones within the same call.
    pub fn extract(&self, transcript: &str, known: &mut KnownIndex) -> Vec<Item> {
        let mut items = Vec::new();

        let specific_added = self.extract_specific_parking(transcript, known, &mut items);
        if !specific_added {
            self.extract_generic_parking(transcript, known, &mut items);
        }
        self.extract_actions(transcript, known, &mut items);
        self.extract_decisions(transcript, known, &mut items);

        if !items.is_empty() {
            debug!(
                event_name = "engine.patterns.items_found",
                count = items.len(),
                "deterministic pass contributed items"
            );
        }

        items
    }

    fn extract_specific_parking(
        &self,
        transcript: &str,
        known: &mut KnownIndex,
        items: &mut Vec<Item>,
    ) -> bool {
        let mut added = false;
        for regex in &self.specific_parking {
            for caps in regex.captures_iter(transcript) {
                let Some(raw_topic) = caps.get(1) else { continue };
                let topic = clean_topic(raw_topic.as_str());
                if topic.is_empty() {
                    continue;
                }
                let item = Item::parking(topic, PATTERN_CONFIDENCE);
                if self.validator.validate(&item) && known.admit_item(&item) {
                    items.push(item);
                    added = true;
                }
            }
        }
        added
    }

    fn extract_generic_parking(
        &self,
        transcript: &str,
        known: &mut KnownIndex,
        items: &mut Vec<Item>,
    ) {
        if !self.generic_parking.iter().any(|regex| regex.is_match(transcript)) {
            return;
        }
        // One entry per fragment no matter how many generic phrasings match.
        let item = Item::parking(self.generic_topic.clone(), GENERIC_PARKING_CONFIDENCE);
        if self.validator.validate(&item) && known.admit_item(&item) {
            items.push(item);
        }
    }

    fn extract_actions(&self, transcript: &str, known: &mut KnownIndex, items: &mut Vec<Item>) {
        for regex in &self.actions {
            for caps in regex.captures_iter(transcript) {
                let (Some(speaker), Some(task), Some(deadline)) =
                    (caps.get(1), caps.get(2), caps.get(3))
                else {
                    continue;
                };

                let task = trim_trailing_conjunctions(task.as_str());
                let deadline = trim_trailing_conjunctions(deadline.as_str());
                if task_looks_like_run_on(&task) {
                    continue;
                }

                let item = Item::action(
                    capitalize(speaker.as_str()),
                    task,
                    capitalize(&deadline),
                    PATTERN_CONFIDENCE,
                );
                if self.validator.validate(&item) && known.admit_item(&item) {
                    items.push(item);
                }
            }
        }
    }

    fn extract_decisions(&self, transcript: &str, known: &mut KnownIndex, items: &mut Vec<Item>) {
        for caps in self.named_decision.captures_iter(transcript) {
            let (Some(name), Some(text)) = (caps.get(1), caps.get(2)) else { continue };
            let speaker = match name.as_str().to_lowercase().as_str() {
                "we" | "team" => "Team".to_string(),
                _ => capitalize(name.as_str()),
            };
            self.push_decision(speaker, text.as_str(), known, items);
        }

        for regex in &self.team_decisions {
            for caps in regex.captures_iter(transcript) {
                let Some(text) = caps.get(1) else { continue };
                self.push_decision("Team".to_string(), text.as_str(), known, items);
            }
        }
    }

    fn push_decision(
        &self,
        speaker: String,
        raw_text: &str,
        known: &mut KnownIndex,
        items: &mut Vec<Item>,
    ) {
        let text = trim_trailing_conjunctions(raw_text);
        if text.is_empty() {
            return;
        }
        let item = Item::decision(speaker, format!("use {text}"), PATTERN_CONFIDENCE);
        if self.validator.validate(&item) && known.admit_item(&item) {
            items.push(item);
        }
    }
}

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>, PatternError> {
    patterns.iter().map(|pattern| Regex::new(pattern).map_err(PatternError::from)).collect()
}

/// Heuristic against run-on false positives: a task that swallowed an "and"
/// clause or a filler "something" is noise, not an action.
fn task_looks_like_run_on(task: &str) -> bool {
    let lowered = task.to_lowercase();
    lowered.contains("something") || lowered.contains(" and ")
}

fn clean_topic(raw: &str) -> String {
    let mut topic = raw.trim().trim_matches(|c: char| c.is_ascii_punctuation()).trim();
    if let Some(stripped) = strip_prefix_ignore_case(topic, "the ") {
        topic = stripped;
    }
    for qualifier in ["for later", "for now", "until later"] {
        if let Some(stripped) = strip_suffix_ignore_case(topic, qualifier) {
            topic = stripped;
        }
    }
    trim_trailing_conjunctions(topic)
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| text[prefix.len()..].trim_start())
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let start = text.len().checked_sub(suffix.len())?;
    let tail = text.get(start..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| text[..start].trim_end())
}

fn trim_trailing_conjunctions(raw: &str) -> String {
    let mut words: Vec<&str> = raw.split_whitespace().collect();
    while let Some(last) = words.last() {
        if TRAILING_CONJUNCTIONS.iter().any(|conjunction| last.eq_ignore_ascii_case(conjunction)) {
            words.pop();
        } else {
            break;
        }
    }
    words.join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use minutey_core::config::ExtractionConfig;
    use minutey_core::{ItemDetails, ItemKind, KnownIndex};

    use super::{capitalize, clean_topic, trim_trailing_conjunctions, PatternExtractor};

    fn extractor() -> PatternExtractor {
        PatternExtractor::new(&ExtractionConfig::default()).expect("patterns compile")
    }

    #[test]
    fn extracts_two_actions_from_conjoined_sentence() {
        let mut known = KnownIndex::new();
        let items = extractor().extract(
            "Sarah will send the budget by Friday and John will review it by Monday",
            &mut known,
        );

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].content, "Sarah will send the budget by Friday");
        assert_eq!(items[1].content, "John will review it by Monday");
    }

    #[test]
    fn trims_trailing_conjunction_from_deadline() {
        let mut known = KnownIndex::new();
        let items =
            extractor().extract("Sarah will send the budget by Friday and then stop", &mut known);

        assert_eq!(items.len(), 1);
        let ItemDetails::Action { ref deadline, .. } = items[0].details else {
            panic!("expected an action");
        };
        assert_eq!(deadline, "Friday");
    }

    #[test]
    fn rejects_run_on_task() {
        let mut known = KnownIndex::new();
        let items = extractor()
            .extract("Sarah will do something by Friday", &mut known);
        assert!(items.is_empty());
    }

    #[test]
    fn table_phrase_parks_named_topic() {
        let mut known = KnownIndex::new();
        let items = extractor().extract("Let's table the pricing model for later", &mut known);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, ItemKind::ParkingLot);
        assert!(matches!(items[0].details, ItemDetails::Parking { ref item } if item == "pricing model"));
    }

    #[test]
    fn known_topic_is_not_parked_again() {
        let mut known = KnownIndex::new();
        known.admit("pricing model");
        let items = extractor().extract("Let's table the pricing model for later", &mut known);
        assert!(items.is_empty());
    }

    #[test]
    fn generic_deferrals_collapse_to_one_entry() {
        let mut known = KnownIndex::new();
        let items = extractor().extract(
            "Let's discuss it later, or come back to this, maybe put a pin in it",
            &mut known,
        );

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0].details, ItemDetails::Parking { ref item } if item == "discussion topic"));
    }

    #[test]
    fn generic_deferral_defers_to_specific_topic() {
        let mut known = KnownIndex::new();
        let items = extractor().extract(
            "Let's park the hiring discussion and come back to it",
            &mut known,
        );

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0].details, ItemDetails::Parking { ref item } if item == "hiring"));
    }

    #[test]
    fn parking_precedes_actions_in_output() {
        let mut known = KnownIndex::new();
        let items = extractor().extract(
            "Let's table the pricing model for later. Sarah will send the budget by Friday.",
            &mut known,
        );

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind, ItemKind::ParkingLot);
        assert_eq!(items[1].kind, ItemKind::ActionItem);
    }

    #[test]
    fn named_decision_is_attributed_and_prefixed() {
        let mut known = KnownIndex::new();
        let items = extractor().extract("Maria decided to postpone the launch", &mut known);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].speaker, "Maria");
        assert!(matches!(items[0].details, ItemDetails::Decision { ref what } if what == "use postpone the launch"));
    }

    #[test]
    fn team_phrasings_attribute_to_team() {
        for fragment in
            ["We agreed to ship weekly", "Let's go with the premium plan", "We'll use the new vendor"]
        {
            let mut known = KnownIndex::new();
            let items = extractor().extract(fragment, &mut known);
            assert_eq!(items.len(), 1, "fragment `{fragment}`");
            assert_eq!(items[0].speaker, "Team");
        }
    }

    #[test]
    fn we_decided_maps_to_team_speaker() {
        let mut known = KnownIndex::new();
        let items = extractor().extract("We decided to drop the legacy API", &mut known);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].speaker, "Team");
    }

    #[test]
    fn should_phrasing_also_yields_an_action() {
        let mut known = KnownIndex::new();
        let items = extractor().extract("Maria should draft the brief by Tuesday", &mut known);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "Maria will draft the brief by Tuesday");
    }

    #[test]
    fn lowercase_prepositional_phrase_is_not_an_action() {
        let mut known = KnownIndex::new();
        let items = extractor().extract("send the numbers to finance by email", &mut known);
        assert!(items.is_empty());
    }

    #[test]
    fn resubmitting_a_fragment_adds_nothing() {
        let extractor = extractor();
        let mut known = KnownIndex::new();
        let first = extractor.extract("Sarah will send the budget by Friday", &mut known);
        assert_eq!(first.len(), 1);

        let second = extractor.extract("Sarah will send the budget by Friday", &mut known);
        assert!(second.is_empty());
    }

    #[test]
    fn generic_speaker_action_is_rejected() {
        let mut known = KnownIndex::new();
        let items = extractor().extract("We will review the numbers by Friday", &mut known);
        assert!(items.is_empty());
    }

    #[test]
    fn helper_trim_drops_stacked_conjunctions() {
        assert_eq!(trim_trailing_conjunctions("send the budget and then"), "send the budget");
        assert_eq!(trim_trailing_conjunctions("Friday"), "Friday");
    }

    #[test]
    fn helper_clean_topic_strips_article_and_qualifier() {
        assert_eq!(clean_topic("the pricing model for later"), "pricing model");
        assert_eq!(clean_topic("roadmap"), "roadmap");
    }

    #[test]
    fn helper_capitalize_lowercases_tail() {
        assert_eq!(capitalize("friday"), "Friday");
        assert_eq!(capitalize("FRIDAY"), "Friday");
        assert_eq!(capitalize(""), "");
    }
}
