use minutey_core::{Energy, Sentiment};

const POSITIVE_CUES: [&str; 6] = ["great", "love", "agreed", "perfect", "excited", "awesome"];
const NEGATIVE_CUES: [&str; 6] =
    ["concern", "worried", "blocked", "problem", "frustrated", "behind schedule"];

const HIGH_ENERGY_CUES: [&str; 4] = ["let's go", "asap", "right now", "immediately"];
const LOW_ENERGY_CUES: [&str; 4] = ["tired", "slow down", "postpone", "drag"];

/// Keyword-level read of a fragment's tone. Fragments with no signal keep
/// the prior values, so the accumulator's wholesale replacement of
/// sentiment/energy is still stable across quiet turns.
pub fn estimate_tone(transcript: &str, prior: (Sentiment, Energy)) -> (Sentiment, Energy) {
    let normalized = transcript.to_lowercase();

    let positive = count_hits(&normalized, &POSITIVE_CUES);
    let negative = count_hits(&normalized, &NEGATIVE_CUES);
    let sentiment = if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        prior.0
    };

    let exclamations = transcript.matches('!').count();
    let energy = if count_hits(&normalized, &HIGH_ENERGY_CUES) > 0 || exclamations >= 2 {
        Energy::High
    } else if count_hits(&normalized, &LOW_ENERGY_CUES) > 0 {
        Energy::Low
    } else {
        prior.1
    };

    (sentiment, energy)
}

fn count_hits(normalized: &str, cues: &[&str]) -> usize {
    cues.iter().filter(|cue| normalized.contains(*cue)).count()
}
