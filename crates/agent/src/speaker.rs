/// Rough speaking-rate used to turn a text fragment into estimated seconds;
/// wall-clock duration belongs to the audio capture layer we don't own.
const WORDS_PER_SECOND: f64 = 2.5;

/// Best-effort speaker attribution for a fragment: first configured known
/// name found anywhere in the text (returned in its configured casing),
/// else the fragment's first word when it looks like a name, else "Unknown".
pub fn identify_speaker(transcript: &str, known_names: &[String]) -> String {
    let lowered = transcript.to_lowercase();
    for name in known_names {
        if lowered.contains(&name.to_lowercase()) {
            return name.clone();
        }
    }

    if let Some(first) = transcript.split_whitespace().next() {
        let word = first.trim_matches(|c: char| !c.is_alphanumeric());
        if word.len() > 2 && word.chars().next().is_some_and(char::is_uppercase) {
            return word.to_string();
        }
    }

    "Unknown".to_string()
}

pub fn estimate_speaking_secs(transcript: &str) -> f64 {
    transcript.split_whitespace().count() as f64 / WORDS_PER_SECOND
}
