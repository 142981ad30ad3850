//! Question answering and history endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::ChatMessage;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct MessageHistory {
    pub messages: Vec<ChatMessage>,
}

/// POST /api/chat - Ask a question
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<ChatMessage>> {
    let answer = state.session().ask(&request.question).await?;
    Ok(Json(answer))
}

/// GET /api/messages
pub async fn list_messages(State(state): State<AppState>) -> Json<MessageHistory> {
    Json(MessageHistory {
        messages: state.session().messages(),
    })
}

/// DELETE /api/messages
pub async fn clear_messages(State(state): State<AppState>) -> StatusCode {
    state.session().clear_messages();
    StatusCode::NO_CONTENT
}
