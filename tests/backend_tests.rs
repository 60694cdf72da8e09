use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    routing::post,
};
use chat_widget::error::BackendError;
use chat_widget::message::{AskRequest, ERROR_REPLY, FALLBACK_REPLY, Identity, Sender};
use chat_widget::{AskBackend, ChatWidget, HttpBackend, WidgetConfig};
use serde_json::{Value, json};

async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/ask")
}

// A port nothing listens on.
async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/ask")
}

fn echo_app() -> Router {
    Router::new().route(
        "/ask",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let content_type = headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Json(json!({
                "response": format!(
                    "{} asked '{}' ({})",
                    body["user"]["name"].as_str().unwrap_or("?"),
                    body["query"].as_str().unwrap_or("?"),
                    content_type,
                ),
                "echo": body,
            }))
        }),
    )
}

fn request(query: &str) -> AskRequest {
    AskRequest {
        query: query.to_string(),
        user: Identity { name: "Ada".into(), email: "ada@x.com".into() },
    }
}

#[tokio::test]
async fn posts_query_and_user_as_json() {
    let backend = HttpBackend::new(spawn_backend(echo_app()).await);
    let response = backend.ask(&request("hello")).await.unwrap();

    assert_eq!(response.text(), Some("Ada asked 'hello' (application/json)"));
    assert_eq!(
        response.0["echo"],
        json!({"query": "hello", "user": {"name": "Ada", "email": "ada@x.com"}})
    );
}

#[tokio::test]
async fn success_without_response_field_is_not_an_error() {
    let app = Router::new().route("/ask", post(|| async { Json(json!({"answer": "42"})) }));
    let backend = HttpBackend::new(spawn_backend(app).await);

    let response = backend.ask(&request("hello")).await.unwrap();
    assert_eq!(response.text(), None);
    assert_eq!(response.reply_text(), FALLBACK_REPLY);
}

#[tokio::test]
async fn non_ok_status_is_an_error() {
    let app = Router::new().route(
        "/ask",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"response": "boom"}))) }),
    );
    let backend = HttpBackend::new(spawn_backend(app).await);

    let err = backend.ask(&request("hello")).await.unwrap_err();
    assert!(matches!(err, BackendError::Status(500)), "got {err:?}");
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let app = Router::new().route("/ask", post(|| async { "<html>not json</html>" }));
    let backend = HttpBackend::new(spawn_backend(app).await);

    let err = backend.ask(&request("hello")).await.unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let backend = HttpBackend::new(unreachable_url().await);
    let err = backend.ask(&request("hello")).await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn widget_over_http_appends_reply() {
    let url = spawn_backend(echo_app()).await;
    let widget = ChatWidget::new(HttpBackend::new(url), &WidgetConfig::default());
    assert!(widget.verify("Ada", "ada@x.com").await);

    widget.send_message("hello").await;

    let view = widget.view().await;
    assert_eq!(view.messages.len(), 3);
    assert_eq!(view.messages[1].text, "hello");
    assert_eq!(view.messages[2].from, Sender::Bot);
    assert_eq!(view.messages[2].text, "Ada asked 'hello' (application/json)");
}

#[tokio::test]
async fn widget_with_unreachable_endpoint_shows_error_and_stops_loading() {
    let widget = ChatWidget::new(HttpBackend::new(unreachable_url().await), &WidgetConfig::default());
    assert!(widget.verify("Ada", "ada@x.com").await);

    widget.send_message("hello").await;

    let view = widget.view().await;
    let last = view.messages.last().unwrap();
    assert_eq!(last.from, Sender::Bot);
    assert_eq!(last.text, ERROR_REPLY);
    assert!(!view.is_loading);
}
