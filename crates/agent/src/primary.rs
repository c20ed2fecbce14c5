use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use minutey_core::{ExtractionError, Item, ItemValidator, MeetingState};

use crate::llm::LlmClient;

const PRIMARY_CONFIDENCE: f64 = 0.9;

/// Deadline used when the simplified upstream shape omits one.
const DEFAULT_DEADLINE: &str = "soon";

/// Adapts the generative model's free-form JSON output into validated
/// canonical items. Every returned item has passed the noise validator;
/// rejected items are only observable through diagnostics.
pub struct PrimaryExtractor {
    client: Arc<dyn LlmClient>,
    validator: ItemValidator,
}

impl PrimaryExtractor {
    pub fn new(client: Arc<dyn LlmClient>, validator: ItemValidator) -> Self {
        Self { client, validator }
    }

    pub async fn extract(
        &self,
        transcript: &str,
        state: &MeetingState,
    ) -> Result<Vec<Item>, ExtractionError> {
        let prompt = build_prompt(transcript, state);
        let raw = self.client.complete(&prompt).await?;
        let parsed = parse_items(&raw)?;

        let total = parsed.len();
        let kept: Vec<Item> =
            parsed.into_iter().filter(|item| self.validator.validate(item)).collect();
        if kept.len() < total {
            debug!(
                event_name = "engine.primary.items_rejected",
                rejected = total - kept.len(),
                kept = kept.len(),
                "validator dropped placeholder items from primary output"
            );
        }

        Ok(kept)
    }
}

fn build_prompt(transcript: &str, state: &MeetingState) -> String {
    let context = serde_json::to_string(state).unwrap_or_else(|_| "{}".to_string());
    format!(
        r#"You are an expert meeting facilitator AI.

Analyze this meeting transcript fragment and extract action items, decisions, and parking-lot topics.

Known meeting state so far (do not repeat facts already present): {context}

Transcript: "{transcript}"

Return ONLY valid JSON with this EXACT structure:
{{
  "items": [
    {{"type": "action_item", "speaker": "PersonName", "task": "what they will do", "deadline": "when"}},
    {{"type": "decision", "speaker": "Team", "decision": "what was agreed"}},
    {{"type": "parking_lot", "item": "topic to revisit"}}
  ]
}}

Omit categories with no findings. Do not invent facts that are not in the transcript.
"#
    )
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    items: Option<Vec<RawItem>>,
    // Some models flatten the schema into a bare action list; tolerate it.
    action_items: Option<Vec<RawSimplifiedAction>>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    speaker: String,
    #[serde(default)]
    task: String,
    #[serde(default)]
    deadline: String,
    #[serde(default)]
    item: String,
    #[serde(default)]
    decision: String,
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSimplifiedAction {
    #[serde(default)]
    speaker: String,
    #[serde(default)]
    task: String,
    #[serde(default)]
    deadline: String,
}

fn parse_items(raw: &str) -> Result<Vec<Item>, ExtractionError> {
    let envelope: RawEnvelope = serde_json::from_str(raw)
        .map_err(|source| ExtractionError::MalformedResponse(source.to_string()))?;

    if let Some(raw_items) = envelope.items {
        return Ok(raw_items.into_iter().filter_map(convert_item).collect());
    }

    if let Some(raw_actions) = envelope.action_items {
        return Ok(raw_actions.into_iter().map(convert_simplified_action).collect());
    }

    Err(ExtractionError::MalformedResponse(
        "response object carries neither `items` nor `action_items`".to_string(),
    ))
}

fn convert_item(raw: RawItem) -> Option<Item> {
    let confidence = raw.confidence.unwrap_or(PRIMARY_CONFIDENCE).clamp(0.0, 1.0);
    match raw.kind.as_str() {
        "action_item" => {
            let speaker = non_empty_or(raw.speaker, "Unknown");
            Some(Item::action(speaker, raw.task, raw.deadline, confidence))
        }
        "decision" => {
            let speaker = non_empty_or(raw.speaker, "Team");
            Some(Item::decision(speaker, raw.decision, confidence))
        }
        "parking_lot" => Some(Item::parking(raw.item, confidence)),
        // Unknown categories are skipped, not treated as malformed output.
        _ => None,
    }
}

fn convert_simplified_action(raw: RawSimplifiedAction) -> Item {
    let speaker = non_empty_or(raw.speaker, "Unknown");
    let deadline = non_empty_or(raw.deadline, DEFAULT_DEADLINE);
    Item::action(speaker, raw.task, deadline, PRIMARY_CONFIDENCE)
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
