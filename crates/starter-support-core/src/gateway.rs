use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::controller::{Route, RouteKind};
use crate::error::GatewayError;
use crate::state::ChatMessage;

#[derive(Serialize)]
struct FaqRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Serialize)]
struct OrderInfoRequest<'a> {
    order_id: &'a str,
}

#[derive(Deserialize)]
struct ReplyBody {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the support backend's `/faq` and `/order-info` endpoints
#[derive(Clone)]
pub struct SupportClient {
    client: Client,
    base_url: String,
}

impl SupportClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Like [`SupportClient::new`] but every request gives up after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask a general question, sending the whole conversation.
    ///
    /// `Ok(None)` means the backend answered without a `message`.
    pub async fn faq(&self, messages: &[ChatMessage]) -> Result<Option<String>, GatewayError> {
        self.post(RouteKind::Faq, &FaqRequest { messages }).await
    }

    pub async fn order_info(&self, order_id: &str) -> Result<Option<String>, GatewayError> {
        self.post(RouteKind::Order, &OrderInfoRequest { order_id }).await
    }

    /// Issue whichever request the route describes
    pub async fn dispatch(&self, route: &Route) -> Result<Option<String>, GatewayError> {
        match route {
            Route::Faq { messages } => self.faq(messages).await,
            Route::Order { order_id } => self.order_info(order_id).await,
        }
    }

    async fn post<T: Serialize>(
        &self,
        kind: RouteKind,
        body: &T,
    ) -> Result<Option<String>, GatewayError> {
        let url = format!("{}{}", self.base_url, kind.endpoint());
        debug!(%url, "posting to support backend");

        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status { status });
        }

        // Read the body first so a bad payload is reported as Decode, not Transport
        let text = response.text().await?;
        let reply: ReplyBody = serde_json::from_str(&text)?;
        debug!(%url, has_message = reply.message.is_some(), "support backend replied");
        Ok(reply.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    /// Start a backend on an ephemeral port and return its base URL
    async fn spawn_backend(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_faq_sends_history_and_returns_message() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let app = Router::new().route(
            "/faq",
            post(move |Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = Some(body);
                    Json(json!({ "message": "We ship worldwide." }))
                }
            }),
        );
        let client = SupportClient::new(&spawn_backend(app).await);

        let history = vec![
            ChatMessage::assistant("Hello"),
            ChatMessage::user("do you ship to Canada?"),
        ];
        let reply = client.faq(&history).await.unwrap();

        assert_eq!(reply.as_deref(), Some("We ship worldwide."));
        assert_eq!(
            seen.lock().unwrap().clone().unwrap(),
            json!({
                "messages": [
                    { "role": "assistant", "content": "Hello" },
                    { "role": "user", "content": "do you ship to Canada?" }
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_order_info_sends_only_order_id() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let app = Router::new().route(
            "/order-info",
            post(move |Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = Some(body);
                    Json(json!({ "message": "Order 12345 has shipped." }))
                }
            }),
        );
        let client = SupportClient::new(&spawn_backend(app).await);

        let reply = client
            .dispatch(&Route::Order {
                order_id: "12345".into(),
            })
            .await
            .unwrap();

        assert_eq!(reply.as_deref(), Some("Order 12345 has shipped."));
        assert_eq!(
            seen.lock().unwrap().clone().unwrap(),
            json!({ "order_id": "12345" })
        );
    }

    #[tokio::test]
    async fn test_missing_message_field_is_none() {
        let app = Router::new().route("/faq", post(|| async { Json(json!({ "answer": "nope" })) }));
        let client = SupportClient::new(&spawn_backend(app).await);

        let reply = client.faq(&[ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(reply, None);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let app = Router::new().route(
            "/order-info",
            post(|| async { (StatusCode::NOT_FOUND, Json(json!({ "message": "no such order" }))) }),
        );
        let client = SupportClient::new(&spawn_backend(app).await);

        let err = client.order_info("999").await.unwrap_err();
        assert_eq!(err.kind(), "status");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let app = Router::new().route("/faq", post(|| async { "definitely not json" }));
        let client = SupportClient::new(&spawn_backend(app).await);

        let err = client.faq(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = SupportClient::new(&format!("http://{}", addr));
        let err = client.order_info("12345").await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let app = Router::new().route(
            "/faq",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "message": "too late" }))
            }),
        );
        let base_url = spawn_backend(app).await;
        let client = SupportClient::with_timeout(&base_url, Some(Duration::from_millis(100))).unwrap();

        let err = client.faq(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert_eq!(err.kind(), "timeout");
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = SupportClient::new("http://support.example.com/");
        assert_eq!(client.base_url(), "http://support.example.com");
    }
}
