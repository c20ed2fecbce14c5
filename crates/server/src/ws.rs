//! WebSocket ingestion: one session per connection, one meeting state per
//! session, fragments processed strictly in arrival order.

use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use minutey_agent::Reconciler;
use minutey_core::{Item, MeetingState};

use crate::transcribe::{SpeechSynthesizer, Transcriber};

/// Process-wide collaborator handles shared by every session.
pub struct EngineState {
    pub reconciler: Arc<Reconciler>,
    pub transcriber: Arc<dyn Transcriber>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

#[derive(Debug, Deserialize)]
struct TranscriptFrame {
    #[serde(default)]
    transcript: String,
}

pub fn router(engine: Arc<EngineState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/ws", get(ws_text))
        .route("/ws/audio", get(ws_audio))
        .with_state(engine)
}

async fn root() -> impl IntoResponse {
    Json(json!({"message": "minutey meeting intelligence backend ready"}))
}

async fn ws_text(
    State(engine): State<Arc<EngineState>>,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    upgrade.on_upgrade(move |socket| run_text_session(socket, engine))
}

async fn ws_audio(
    State(engine): State<Arc<EngineState>>,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    upgrade.on_upgrade(move |socket| run_audio_session(socket, engine))
}

async fn run_text_session(mut socket: WebSocket, engine: Arc<EngineState>) {
    let session_id = Uuid::new_v4();
    let mut meeting = MeetingState::default();
    info!(
        event_name = "server.ws.session_started",
        session_id = %session_id,
        endpoint = "text",
        "session started"
    );

    while let Some(frame) = socket.recv().await {
        let message = match frame {
            Ok(message) => message,
            Err(error) => {
                warn!(
                    event_name = "server.ws.receive_failed",
                    session_id = %session_id,
                    error = %error,
                    "closing session after receive failure"
                );
                break;
            }
        };

        match message {
            Message::Text(payload) => {
                let frame: TranscriptFrame = match serde_json::from_str(payload.as_str()) {
                    Ok(frame) => frame,
                    Err(error) => {
                        warn!(
                            event_name = "server.ws.bad_frame",
                            session_id = %session_id,
                            error = %error,
                            "discarding malformed client frame"
                        );
                        continue;
                    }
                };

                let transcript = frame.transcript.trim().to_string();
                if transcript.is_empty() {
                    continue;
                }

                // The next frame is not read until this one is fully folded
                // into state, which keeps dedup order-sensitive invariants.
                let (response, _) = analyze_fragment(&engine, &mut meeting, &transcript, None).await;
                if socket.send(Message::Text(response.to_string().into())).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!(
        event_name = "server.ws.session_ended",
        session_id = %session_id,
        actions = meeting.actions.len(),
        decisions = meeting.decisions.len(),
        parked = meeting.parking_lot.len(),
        "session ended"
    );
}

async fn run_audio_session(mut socket: WebSocket, engine: Arc<EngineState>) {
    let session_id = Uuid::new_v4();
    let mut meeting = MeetingState::default();
    info!(
        event_name = "server.ws.session_started",
        session_id = %session_id,
        endpoint = "audio",
        "session started"
    );

    while let Some(frame) = socket.recv().await {
        let message = match frame {
            Ok(message) => message,
            Err(error) => {
                warn!(
                    event_name = "server.ws.receive_failed",
                    session_id = %session_id,
                    error = %error,
                    "closing session after receive failure"
                );
                break;
            }
        };

        match message {
            Message::Binary(audio) => {
                let transcription = match engine.transcriber.transcribe(&audio).await {
                    Ok(transcription) => transcription,
                    Err(error) => {
                        warn!(
                            event_name = "server.ws.transcription_failed",
                            session_id = %session_id,
                            error = %error,
                            "dropping audio frame"
                        );
                        continue;
                    }
                };

                let transcript = transcription.text.trim().to_string();
                if transcript.is_empty() {
                    continue;
                }

                let speech = SpeechMeta {
                    confidence: transcription.confidence,
                    language: transcription.language,
                };
                let (response, voice_line) =
                    analyze_fragment(&engine, &mut meeting, &transcript, Some(speech)).await;
                if socket.send(Message::Text(response.to_string().into())).await.is_err() {
                    break;
                }
                // The default synthesizer defers voicing to the client and
                // returns nothing; a server-side backend would speak here.
                if let Some(line) = voice_line {
                    if let Some(audio) = engine.synthesizer.synthesize(&line).await {
                        if socket.send(Message::Binary(audio.into())).await.is_err() {
                            break;
                        }
                    }
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!(
        event_name = "server.ws.session_ended",
        session_id = %session_id,
        actions = meeting.actions.len(),
        "session ended"
    );
}

struct SpeechMeta {
    confidence: f64,
    language: String,
}

/// Reconciles one fragment, folds the delta into the session state, and
/// assembles the outer response envelope. Also returns the first
/// intervention's content so the audio path can voice it.
async fn analyze_fragment(
    engine: &EngineState,
    meeting: &mut MeetingState,
    transcript: &str,
    speech: Option<SpeechMeta>,
) -> (Value, Option<String>) {
    let outcome = engine.reconciler.reconcile(transcript, meeting).await;
    let interventions = outcome.interventions;
    meeting.merge(outcome.delta);

    let voice_line = interventions.first().map(|item| item.content.clone());
    let mut envelope = json!({
        "interventions": rendered_interventions(&interventions, transcript),
        "state": meeting,
    });

    if let Some(speech) = speech {
        envelope["type"] = json!("transcription");
        envelope["transcript"] = json!(transcript);
        envelope["confidence"] = json!(speech.confidence);
        envelope["language"] = json!(speech.language);
    }

    (envelope, voice_line)
}

/// Interventions as wire JSON. A fragment that produced nothing still gets a
/// single low-confidence acknowledgment so the dashboard shows the fragment
/// was heard; the acknowledgment never enters meeting state.
fn rendered_interventions(interventions: &[Item], transcript: &str) -> Vec<Value> {
    if interventions.is_empty() {
        return vec![json!({
            "type": "note",
            "confidence": 0.5,
            "speaker": "System",
            "content": format!("Noted: {}", truncate(transcript, 50)),
            "details": {},
        })];
    }

    interventions.iter().filter_map(|item| serde_json::to_value(item).ok()).collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    let mut truncated: String = text.chars().take(max_chars).collect();
    if truncated.len() < text.len() {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use minutey_core::Item;

    use super::{rendered_interventions, truncate};

    #[test]
    fn empty_interventions_become_one_note_ack() {
        let rendered = rendered_interventions(&[], "just chatting about the weather");
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0]["type"], "note");
        assert_eq!(rendered[0]["speaker"], "System");
    }

    #[test]
    fn real_interventions_are_passed_through() {
        let items = vec![Item::action("Sarah", "send the budget", "Friday", 0.85)];
        let rendered = rendered_interventions(&items, "ignored");
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0]["type"], "action_item");
        assert_eq!(rendered[0]["content"], "Sarah will send the budget by Friday");
    }

    #[test]
    fn truncation_is_char_safe_and_marked() {
        let long = "a".repeat(80);
        let truncated = truncate(&long, 50);
        assert_eq!(truncated.chars().count(), 53);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate("short", 50), "short");
    }
}
