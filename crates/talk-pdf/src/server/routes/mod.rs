//! API routes

pub mod chat;
pub mod documents;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/documents",
            post(documents::process_documents)
                .layer(DefaultBodyLimit::max(max_upload_size))
                .get(documents::list_documents),
        )
        .route("/chat", post(chat::ask))
        .route(
            "/messages",
            get(chat::list_messages).delete(chat::clear_messages),
        )
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "talk-pdf",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Ask questions about your PDF documents",
        "endpoints": {
            "POST /api/documents": "Upload and process PDFs (multipart), replacing the current set",
            "GET /api/documents": "List processed documents",
            "POST /api/chat": "Ask a question about the processed documents",
            "GET /api/messages": "Chat history",
            "DELETE /api/messages": "Clear chat history"
        }
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::RagConfig;
    use crate::ingestion::test_support::sample_pdf;
    use crate::providers::test_support;
    use crate::server::{build_router, state::AppState};
    use crate::session::ChatSession;

    const BOUNDARY: &str = "talkpdfboundary";

    fn app_with_limit(max_upload_size: usize) -> Router {
        let (providers, _) = test_support::providers();
        let session = ChatSession::with_providers(RagConfig::default(), providers).unwrap();
        build_router(AppState::with_session(session), max_upload_size)
    }

    fn app() -> Router {
        app_with_limit(RagConfig::default().server.max_upload_size)
    }

    fn multipart(files: &[(&str, Vec<u8>)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, bytes) in files {
            let disposition =
                format!("Content-Disposition: form-data; name=\"files\"; filename=\"{name}\"");
            body.extend_from_slice(format!("--{BOUNDARY}\r\n{disposition}\r\n").as_bytes());
            body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/api/documents")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    fn ask(question: &str) -> Request<Body> {
        Request::post("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "question": question }).to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let app = app();
        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_chat_before_upload_is_conflict() {
        let app = app();
        let response = app.clone().oneshot(ask("What is this?")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = json_body(response).await;
        assert_eq!(body["error"]["type"], "not_ready");

        let response = app
            .oneshot(Request::get("/api/messages").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_then_chat() {
        let app = app();
        let pdf = sample_pdf(&["Rust ownership keeps memory safe"]);

        let response = app.clone().oneshot(multipart(&[("rust.pdf", pdf)])).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let summary = json_body(response).await;
        assert_eq!(summary["documents"][0]["filename"], "rust.pdf");

        let response = app
            .clone()
            .oneshot(Request::get("/api/documents").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let listing = json_body(response).await;
        assert_eq!(listing["documents"], json!(["rust.pdf"]));

        let response = app.clone().oneshot(ask("rust memory?")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let message = json_body(response).await;
        assert_eq!(message["role"], "assistant");
        assert_eq!(message["content"], "Grounded answer");

        let response = app
            .clone()
            .oneshot(Request::delete("/api/messages").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_without_files() {
        let response = app().oneshot(multipart(&[])).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["type"], "no_documents");
    }

    #[tokio::test]
    async fn test_upload_invalid_pdf() {
        let response = app()
            .oneshot(multipart(&[("notes.pdf", b"plain text".to_vec())]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["type"], "parse_error");
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_payload_too_large() {
        let pdf = sample_pdf(&["Rust ownership keeps memory safe"]);
        assert!(pdf.len() > 256);

        let response = app_with_limit(256)
            .oneshot(multipart(&[("rust.pdf", pdf)]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await["error"]["type"], "payload_too_large");
    }

    #[tokio::test]
    async fn test_malformed_multipart_is_bad_request() {
        let request = Request::post("/api/documents")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(format!("--{BOUNDARY}\r\nno headers or terminator")))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["type"], "bad_request");
    }
}
