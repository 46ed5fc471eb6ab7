//! Scene generation handler.
//!
//! `POST /api/v1/scenes/{id}/generate` responds with a long-lived SSE
//! stream of progress frames, terminated by exactly one `result` or
//! `error` frame. The run is cancelled when the client disconnects (the
//! stream owns a token drop-guard) and bounded by the server-side
//! execution budget.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::StreamExt;
use panora_core::config::{GenerationConfig, GenerationConfigPatch};
use panora_core::conversation::{ChatMessage, Role};
use panora_core::types::SceneId;
use panora_events::{progress_channel, ErrorCode, WireFrame};
use serde::Deserialize;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Characters of the first user message used for a fallback title.
const TITLE_PREVIEW_CHARS: usize = 80;

/// Request body for `POST /scenes/{id}/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateSceneRequest {
    /// Conversation history; must contain at least one user message.
    pub messages: Vec<ChatMessage>,
    /// Scene title; derived from the first user message when absent.
    #[serde(default)]
    pub title: Option<String>,
    /// Generation overrides, clamped server-side.
    #[serde(default)]
    pub config: Option<GenerationConfigPatch>,
    /// Requested sharing visibility. Recorded by the scene store, which
    /// is an external collaborator; the pipeline itself ignores it.
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

/// Sharing visibility of the generated scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// POST /api/v1/scenes/{id}/generate
pub async fn generate_scene(
    State(state): State<AppState>,
    Path(scene_id): Path<SceneId>,
    Json(request): Json<GenerateSceneRequest>,
) -> AppResult<Sse<impl futures::Stream<Item = Result<Event, axum::Error>>>> {
    if request.messages.is_empty() {
        return Err(AppError::BadRequest(
            "messages must contain at least one entry".to_string(),
        ));
    }

    let config = GenerationConfig::validated(request.config.unwrap_or_default());
    let title = request
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| derive_title(&request.messages));

    tracing::info!(
        %scene_id,
        title = %title,
        furniture = config.include_furniture_matching,
        upscaling = config.enable_upscaling,
        "Starting scene generation",
    );

    let (sender, receiver) = progress_channel();
    let cancel = CancellationToken::new();

    let orchestrator = Arc::clone(&state.orchestrator);
    let budget = Duration::from_secs(state.config.generation_budget_secs);
    let run_cancel = cancel.clone();
    let watchdog_sender = sender.clone();
    let messages = request.messages;

    tokio::spawn(async move {
        tokio::select! {
            _ = orchestrator.run(&messages, scene_id, &title, &config, sender, run_cancel.clone()) => {}
            _ = tokio::time::sleep(budget) => {
                tracing::warn!(%scene_id, budget_secs = budget.as_secs(), "Generation exceeded execution budget");
                watchdog_sender.error(
                    "Scene generation exceeded the execution budget",
                    ErrorCode::GenerationFailed,
                );
                run_cancel.cancel();
            }
        }
    });

    // The guard lives inside the stream: when the client disconnects and
    // axum drops the response body, the token cancels and the pipeline
    // stops between stages instead of burning remote-call budget.
    let guard = cancel.drop_guard();
    let stream = UnboundedReceiverStream::new(receiver).map(move |event| {
        let _keep_alive = &guard;
        Event::default().json_data(WireFrame::from(event))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Fall back to the first user message as the scene title.
fn derive_title(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.chars().take(TITLE_PREVIEW_CHARS).collect::<String>())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Untitled scene".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_falls_back_to_first_user_message() {
        let messages = vec![
            ChatMessage::assistant("how can I help?"),
            ChatMessage::user("a sunlit scandinavian living room"),
        ];
        assert_eq!(derive_title(&messages), "a sunlit scandinavian living room");
    }

    #[test]
    fn title_truncates_long_messages() {
        let messages = vec![ChatMessage::user("x".repeat(200))];
        assert_eq!(derive_title(&messages).len(), TITLE_PREVIEW_CHARS);
    }

    #[test]
    fn title_defaults_when_no_user_message() {
        let messages = vec![ChatMessage::assistant("hello")];
        assert_eq!(derive_title(&messages), "Untitled scene");
    }

    #[test]
    fn visibility_deserializes_lowercase() {
        let v: Visibility = serde_json::from_str("\"public\"").unwrap();
        assert_eq!(v, Visibility::Public);
    }
}
