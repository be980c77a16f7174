//! Chat endpoints, single response and streamed

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::{self, Stream, StreamExt};

use crate::error::Error;
use crate::generation::AnswerStream;
use crate::server::state::AppState;
use crate::types::{ChatRequest, ErrorResponseBody, StreamEvent, ValidChatRequest};

const ANSWER_FAILED: &str = "Failed to get answer.";

/// POST /api/chat - Answer a question about an uploaded document
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match validate(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    tracing::info!(
        "[{}] Received question: \"{}\"",
        request.document_id,
        request.question
    );

    match state.chat().answer(&request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            tracing::error!("[{}] Error in chat: {}", request.document_id, e);
            let body = ErrorResponseBody::new(ANSWER_FAILED).with_details(e.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// POST /api/chat/stream - Answer a question as server-sent events
///
/// Emits `chunk` events as text arrives, then a single `done` event with
/// the citations, or an `error` event if generation fails.
pub async fn chat_stream(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match validate(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    tracing::info!(
        "[{}] Received streaming question: \"{}\"",
        request.document_id,
        request.question
    );

    let events = answer_events(state, request).map(|event| Event::default().json_data(event));
    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn validate(payload: Result<Json<ChatRequest>, JsonRejection>) -> Result<ValidChatRequest, Response> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let body = ErrorResponseBody::new("Invalid request body.").with_details(rejection.body_text());
            return Err((StatusCode::BAD_REQUEST, Json(body)).into_response());
        }
    };

    request
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ErrorResponseBody::new(e.to_string()))).into_response())
}

enum Phase {
    Start(AppState, ValidChatRequest),
    Streaming(AnswerStream, String, String),
    Finished,
}

/// Drive the chat pipeline and translate its output into stream events
fn answer_events(
    state: AppState,
    request: ValidChatRequest,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    stream::unfold(Phase::Start(state, request), |phase| async move {
        match phase {
            Phase::Start(state, request) => match state.chat().answer_stream(&request).await {
                Ok(answer) => next_event(answer, String::new(), request.document_id).await,
                Err(e) => {
                    tracing::error!("[{}] Error in chat stream: {}", request.document_id, e);
                    Some((error_event(&e), Phase::Finished))
                }
            },
            Phase::Streaming(answer, text, document_id) => {
                next_event(answer, text, document_id).await
            }
            Phase::Finished => None,
        }
    })
}

async fn next_event(
    mut answer: AnswerStream,
    mut text: String,
    document_id: String,
) -> Option<(StreamEvent, Phase)> {
    match answer.text.next().await {
        Some(Ok(piece)) => {
            text.push_str(&piece);
            Some((
                StreamEvent::Chunk { text: piece },
                Phase::Streaming(answer, text, document_id),
            ))
        }
        Some(Err(e)) => {
            tracing::error!("[{}] Stream interrupted: {}", document_id, e);
            Some((error_event(&e), Phase::Finished))
        }
        None => {
            let citations = answer.citations(&text);
            tracing::info!(
                "[{}] Stream complete from {} with {} citations.",
                document_id,
                answer.model,
                citations.len()
            );
            Some((StreamEvent::Done { citations }, Phase::Finished))
        }
    }
}

fn error_event(e: &Error) -> StreamEvent {
    StreamEvent::Error {
        error: ANSWER_FAILED.to_string(),
        details: Some(e.to_string()),
    }
}
