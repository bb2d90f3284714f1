//! Message endpoint.
//!
//! `GET` returns the welcome message, `POST` upserts it, every other verb is
//! answered with 405 before any store access.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::store::{MessageStore, StoreError};

pub const MESSAGE_ROUTE: &str = "/api/message";

const INTERNAL_ERROR: &str = "Internal Server Error";
const METHOD_NOT_ALLOWED: &str = "Methode nicht erlaubt";

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct SuccessBody {
    pub success: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// Shared handler state.
#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn MessageStore>,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    MethodNotAllowed,
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED.to_string())
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string()),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        // Full detail goes to the log, the client only sees a generic failure.
        tracing::error!("message store error: {}", err);
        AppError::Internal
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

// ============================================================================
// Routes
// ============================================================================

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            MESSAGE_ROUTE,
            get(get_message)
                .head(method_not_allowed)
                .post(set_message)
                .fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_message(State(state): State<ServerState>) -> Result<Json<MessageBody>, AppError> {
    let message = state.store.get().await?;
    Ok(Json(MessageBody { message }))
}

async fn set_message(
    State(state): State<ServerState>,
    body: Result<Json<MessageBody>, JsonRejection>,
) -> Result<Json<SuccessBody>, AppError> {
    let Json(body) = body?;
    state.store.set(&body.message).await?;
    tracing::info!(len = body.message.chars().count(), "welcome message updated");
    Ok(Json(SuccessBody { success: true }))
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Serves the endpoint until ctrl+c.
pub async fn serve(port: u16, state: ServerState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("message endpoint listening on http://{}{}", addr, MESSAGE_ROUTE);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down message endpoint");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{HttpMessageStore, memory::MemoryMessageStore};
    use axum::body::to_bytes;

    fn state_with(store: Arc<MemoryMessageStore>) -> ServerState {
        ServerState { store }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn post(message: &str) -> Result<Json<MessageBody>, JsonRejection> {
        Ok(Json(MessageBody { message: message.into() }))
    }

    #[tokio::test]
    async fn get_returns_empty_string_without_record() {
        let state = state_with(Arc::new(MemoryMessageStore::default()));
        let Json(body) = get_message(State(state)).await.expect("get");
        assert_eq!(body, MessageBody { message: String::new() });
    }

    #[tokio::test]
    async fn post_then_get_round_trips() {
        let state = state_with(Arc::new(MemoryMessageStore::default()));

        let Json(ack) = set_message(State(state.clone()), post("Exam week")).await.expect("post");
        assert_eq!(ack, SuccessBody { success: true });

        let Json(body) = get_message(State(state)).await.expect("get");
        assert_eq!(body.message, "Exam week");
    }

    #[tokio::test]
    async fn failed_post_keeps_previous_message() {
        let store = Arc::new(MemoryMessageStore::with_message("Alt"));
        let state = state_with(store.clone());
        store.fail_writes(true);

        let response = set_message(State(state.clone()), post("Neu")).await.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, serde_json::json!({ "error": "Internal Server Error" }));

        let Json(body) = get_message(State(state)).await.expect("get");
        assert_eq!(body.message, "Alt");
    }

    #[tokio::test]
    async fn failed_get_is_a_generic_server_error() {
        let store = Arc::new(MemoryMessageStore::with_message("Alt"));
        store.fail_reads(true);

        let response = get_message(State(state_with(store))).await.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Internal Server Error");
    }

    #[tokio::test]
    async fn other_verbs_are_rejected() {
        let response = method_not_allowed().await.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await, serde_json::json!({ "error": "Methode nicht erlaubt" }));
    }

    #[tokio::test]
    async fn http_store_against_live_router() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let store = Arc::new(MemoryMessageStore::default());
        tokio::spawn(axum::serve(listener, router(state_with(store.clone()))).into_future());

        let endpoint = url::Url::parse(&format!("http://{addr}{MESSAGE_ROUTE}")).expect("url");
        let client = HttpMessageStore::new(endpoint.clone());

        assert_eq!(client.get().await.expect("initial get"), "");
        client.set("Exam week").await.expect("set");
        assert_eq!(client.get().await.expect("get"), "Exam week");

        store.fail_writes(true);
        let err = client.set("Ferien").await.expect_err("write must fail");
        assert!(matches!(err, StoreError::Status { status: 500, .. }));
        assert_eq!(client.get().await.expect("get after failure"), "Exam week");

        store.fail_writes(false);
        let response = reqwest::Client::new()
            .post(endpoint.clone())
            .json(&serde_json::json!({ "text": 1 }))
            .send()
            .await
            .expect("malformed post");
        assert_eq!(response.status().as_u16(), 400);
        assert_eq!(client.get().await.expect("get after bad request"), "Exam week");

        let response = reqwest::Client::new()
            .delete(endpoint.clone())
            .send()
            .await
            .expect("delete request");
        assert_eq!(response.status().as_u16(), 405);

        let response = reqwest::Client::new()
            .head(endpoint)
            .send()
            .await
            .expect("head request");
        assert_eq!(response.status().as_u16(), 405);
    }

    #[tokio::test]
    async fn unacknowledged_write_is_an_error() {
        async fn refuse() -> Json<SuccessBody> {
            Json(SuccessBody { success: false })
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let app = Router::new().route(MESSAGE_ROUTE, axum::routing::post(refuse));
        tokio::spawn(axum::serve(listener, app).into_future());

        let endpoint = url::Url::parse(&format!("http://{addr}{MESSAGE_ROUTE}")).expect("url");
        let err = HttpMessageStore::new(endpoint).set("Exam week").await.expect_err("not acknowledged");
        assert!(matches!(err, StoreError::Status { status: 200, .. }));
    }
}
