//! HTTP client for the travel assistant backend.
//!
//! Handles the liveness probe, the assist call, and the tool listing.
//! The controller only sees the [`Dispatcher`] trait so it can be driven
//! without a network in tests.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::{ChatError, Result};
use crate::types::{AssistRequest, AssistResponse, ToolInfo, ToolList};

/// Talks to the assistant backend.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Base URL used in user-facing messages about connectivity.
    fn base_url(&self) -> &str;

    /// `POST /api/assist`. Any non-2xx status or unparseable body is an error.
    async fn assist(&self, request: &AssistRequest) -> Result<AssistResponse>;

    /// `GET /`. Any 2xx counts as healthy; the body is ignored.
    async fn probe(&self) -> Result<()>;

    /// `GET /api/tools`.
    async fn list_tools(&self) -> Result<Vec<ToolInfo>>;
}

/// [`Dispatcher`] backed by `reqwest`.
pub struct HttpDispatcher {
    client: reqwest::Client,
    backend: BackendConfig,
}

impl HttpDispatcher {
    pub fn new(backend: BackendConfig) -> Result<Self> {
        backend.validate()?;
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("travel-chat/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = backend.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, backend })
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ChatError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| ChatError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    fn base_url(&self) -> &str {
        self.backend.base()
    }

    async fn assist(&self, request: &AssistRequest) -> Result<AssistResponse> {
        let url = self.backend.endpoint("/api/assist");
        debug!(%url, question = %request.question, city = ?request.city, "Sending assist request");

        let result = async {
            let resp = self.client.post(&url).json(request).send().await?;
            Self::decode::<AssistResponse>(resp).await
        }
        .await;

        match &result {
            Ok(resp) => debug!(
                success = resp.success,
                tool_used = ?resp.tool_used,
                "Assist response received"
            ),
            Err(e) => warn!("Assist request to {} failed: {}", url, e),
        }
        result
    }

    async fn probe(&self) -> Result<()> {
        let url = self.backend.endpoint("/");
        let resp = self.client.get(&url).send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChatError::Status(resp.status().as_u16()))
        }
    }

    async fn list_tools(&self) -> Result<Vec<ToolInfo>> {
        let url = self.backend.endpoint("/api/tools");
        let resp = self.client.get(&url).send().await?;
        let list = Self::decode::<ToolList>(resp).await?;
        Ok(list.tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn dispatcher(base: &str) -> HttpDispatcher {
        HttpDispatcher::new(BackendConfig {
            api_base: base.to_string(),
            request_timeout_secs: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_assist_posts_question_and_null_city() {
        // The handler echoes the request body back as the answer.
        let router = Router::new().route(
            "/api/assist",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "success": true,
                    "answer": body.to_string(),
                    "tool_used": "define_word",
                    "city": null,
                }))
            }),
        );
        let base = spawn_backend(router).await;
        let d = dispatcher(&base);

        let req = AssistRequest::from_fields("Define passport", "  ").unwrap();
        let resp = d.assist(&req).await.unwrap();
        assert!(resp.success);
        assert_eq!(resp.tool_used.as_deref(), Some("define_word"));

        let echoed: Value = serde_json::from_str(resp.answer.as_deref().unwrap()).unwrap();
        assert_eq!(echoed, json!({"question": "Define passport", "city": null}));
    }

    #[tokio::test]
    async fn test_assist_non_success_status() {
        let router = Router::new().route(
            "/api/assist",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Error processing request") }),
        );
        let base = spawn_backend(router).await;

        let req = AssistRequest::from_fields("Weather in Paris?", "Paris").unwrap();
        let err = dispatcher(&base).assist(&req).await.unwrap_err();
        assert!(matches!(err, ChatError::Status(500)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_assist_non_json_body() {
        let router = Router::new().route("/api/assist", post(|| async { "<html>oops</html>" }));
        let base = spawn_backend(router).await;

        let req = AssistRequest::from_fields("Weather in Paris?", "").unwrap();
        let err = dispatcher(&base).assist(&req).await.unwrap_err();
        assert!(matches!(err, ChatError::Decode(_)));
    }

    #[tokio::test]
    async fn test_assist_unreachable_backend() {
        // Grab a free port, then close it so nothing is listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let req = AssistRequest::from_fields("Hello", "").unwrap();
        let err = dispatcher(&format!("http://{}", addr))
            .assist(&req)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Http(_)));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let router = Router::new().route(
            "/api/assist",
            post(|| async {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                Json(json!({"success": true, "answer": "late"}))
            }),
        );
        let base = spawn_backend(router).await;
        let d = HttpDispatcher::new(BackendConfig {
            api_base: base,
            request_timeout_secs: Some(1),
        })
        .unwrap();

        let req = AssistRequest::from_fields("Hello", "").unwrap();
        let err = d.assist(&req).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_probe() {
        let router = Router::new().route(
            "/",
            get(|| async {
                Json(json!({
                    "status": "healthy",
                    "version": "1.0.0",
                    "tools_available": ["get_weather", "define_word", "web_search"],
                }))
            }),
        );
        let base = spawn_backend(router).await;
        assert!(dispatcher(&base).probe().await.is_ok());

        let router = Router::new().route("/", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let base = spawn_backend(router).await;
        let err = dispatcher(&base).probe().await.unwrap_err();
        assert!(matches!(err, ChatError::Status(503)));
    }

    #[tokio::test]
    async fn test_list_tools() {
        let router = Router::new().route(
            "/api/tools",
            get(|| async {
                Json(json!({
                    "tools": [
                        {"name": "get_weather", "description": "Get current weather conditions for a city", "parameters": ["city"]},
                        {"name": "define_word", "description": "Look up the meaning of a word", "parameters": ["word"]},
                    ]
                }))
            }),
        );
        let base = spawn_backend(router).await;
        let tools = dispatcher(&base).list_tools().await.unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "get_weather");
        assert_eq!(tools[1].parameters, vec!["word".to_string()]);
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let d = dispatcher("http://localhost:8000/");
        assert_eq!(d.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_rejects_invalid_base() {
        let result = HttpDispatcher::new(BackendConfig {
            api_base: "nonsense".into(),
            request_timeout_secs: None,
        });
        assert!(result.is_err());
    }
}
