use std::sync::Arc;

use tracing::{debug, warn};

use minutey_core::config::ExtractionConfig;
use minutey_core::{
    ActionEntry, Item, ItemDetails, ItemValidator, KnownIndex, MeetingState, Speaking,
};

use crate::llm::LlmClient;
use crate::patterns::{PatternError, PatternExtractor};
use crate::primary::PrimaryExtractor;
use crate::speaker::{estimate_speaking_secs, identify_speaker};
use crate::tone::estimate_tone;

/// Result of reconciling one transcript fragment: the user-facing
/// interventions in discovery order, and a state delta holding only what
/// this fragment added.
#[derive(Clone, Debug)]
pub struct ReconcileOutcome {
    pub interventions: Vec<Item>,
    pub delta: MeetingState,
}

/// Merges the primary and deterministic extractors over an immutable
/// snapshot of meeting state. The primary pass runs first; the
/// deterministic pass then uses the post-primary working index as its
/// "already known" baseline, so it only ever contributes facts the primary
/// pass missed.
pub struct Reconciler {
    primary: PrimaryExtractor,
    patterns: PatternExtractor,
    known_speakers: Vec<String>,
}

impl Reconciler {
    pub fn new(client: Arc<dyn LlmClient>, config: &ExtractionConfig) -> Result<Self, PatternError> {
        let validator = ItemValidator::new(config.validator_config());
        Ok(Self {
            primary: PrimaryExtractor::new(client, validator),
            patterns: PatternExtractor::new(config)?,
            known_speakers: config.known_speakers.clone(),
        })
    }

    pub async fn reconcile(&self, transcript: &str, state: &MeetingState) -> ReconcileOutcome {
        let mut known = KnownIndex::from_state(state);
        let mut delta = MeetingState::default();
        let mut interventions = Vec::new();

        match self.primary.extract(transcript, state).await {
            Ok(items) => {
                for item in items {
                    if known.admit_item(&item) {
                        append_to_delta(&mut delta, &item);
                        interventions.push(item);
                    }
                }
                debug!(
                    event_name = "engine.reconcile.primary_done",
                    accepted = interventions.len(),
                    "primary extraction accepted items"
                );
            }
            Err(error) => {
                // Degradation, not failure: the deterministic pass below
                // still handles this fragment on its own.
                warn!(
                    event_name = "engine.reconcile.primary_degraded",
                    error = %error,
                    "primary extraction unavailable, relying on pattern pass"
                );
            }
        }

        for item in self.patterns.extract(transcript, &mut known) {
            append_to_delta(&mut delta, &item);
            interventions.push(item);
        }

        self.seed_participation(transcript, state, &mut delta);

        let (sentiment, energy) = estimate_tone(transcript, (state.sentiment, state.energy));
        delta.sentiment = sentiment;
        delta.energy = energy;

        ReconcileOutcome { interventions, delta }
    }

    fn seed_participation(&self, transcript: &str, state: &MeetingState, delta: &mut MeetingState) {
        let speaker = identify_speaker(transcript, &self.known_speakers);
        // Participation keys keep the casing they were first inserted with.
        let key =
            state.participation_key(&speaker).map(str::to_string).unwrap_or(speaker);
        let prior = state.participation.get(&key).copied().unwrap_or_default();
        delta.participation.insert(
            key,
            Speaking { turns: prior.turns + 1, time: prior.time + estimate_speaking_secs(transcript) },
        );
    }
}

fn append_to_delta(delta: &mut MeetingState, item: &Item) {
    match &item.details {
        ItemDetails::Action { task, deadline, .. } => delta.actions.push(ActionEntry {
            speaker: item.speaker.clone(),
            task: task.clone(),
            deadline: deadline.clone(),
            confidence: item.confidence,
        }),
        ItemDetails::Decision { what } => delta.decisions.push(what.clone()),
        ItemDetails::Parking { item: topic } => delta.parking_lot.push(topic.clone()),
    }
}
