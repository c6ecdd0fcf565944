//! OpenAI-compatible inference gateway.
//!
//! Implements the [`LlmGateway`] port over HTTP `POST {base_url}/chat/completions`.
//! Every request carries its own timeout; transient failures (throttling,
//! 5xx, timeouts, dropped connections) are retried with exponential backoff,
//! while authentication failures fail at once.

mod protocol;
mod retry;

pub use retry::RetryPolicy;

use crate::config::FileProviderConfig;
use async_trait::async_trait;
use nutri_application::ports::llm_gateway::{GatewayError, LlmGateway};
use nutri_domain::{Model, Prompt};
use protocol::{ChatResponse, build_request, extract_content, status_error};
use std::time::Duration;
use tracing::{debug, warn};

/// Connection settings for [`OpenAiCompatibleGateway`]
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from(&FileProviderConfig::default())
    }
}

impl From<&FileProviderConfig> for GatewayConfig {
    fn from(file: &FileProviderConfig) -> Self {
        Self {
            base_url: file.base_url.trim_end_matches('/').to_string(),
            api_key: file.resolve_api_key(),
            timeout: Duration::from_secs(file.timeout_seconds),
            retry: RetryPolicy {
                max_retries: file.max_retries,
                initial_backoff: Duration::from_millis(file.initial_backoff_ms),
                max_backoff: Duration::from_millis(file.max_backoff_ms),
            },
            max_tokens: file.max_tokens,
            temperature: file.temperature,
        }
    }
}

/// HTTP gateway for any `/chat/completions` endpoint
pub struct OpenAiCompatibleGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl OpenAiCompatibleGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Other(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    async fn send_once(&self, model: &Model, prompt: &Prompt) -> Result<String, GatewayError> {
        let body = build_request(model, prompt, self.config.max_tokens, self.config.temperature);

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        extract_content(parsed)
    }
}

fn transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() {
        GatewayError::ConnectionError(error.to_string())
    } else {
        GatewayError::Other(error.to_string())
    }
}

#[async_trait]
impl LlmGateway for OpenAiCompatibleGateway {
    async fn generate(&self, model: &Model, prompt: &Prompt) -> Result<String, GatewayError> {
        let mut attempt = 0;
        loop {
            match self.send_once(model, prompt).await {
                Ok(text) => {
                    debug!("{} answered ({} bytes)", model, text.len());
                    return Ok(text);
                }
                Err(e) if e.is_transient() && self.config.retry.should_retry(attempt) => {
                    let wait = self.config.retry.backoff(attempt);
                    warn!(
                        "{} failed ({}), retry {}/{} in {:?}",
                        model,
                        e,
                        attempt + 1,
                        self.config.retry.max_retries,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const OK_BODY: &str = r#"{"choices":[{"message":{"role":"assistant","content":"{\"calories\": 500}"}}]}"#;

    /// Serve scripted `(status, body)` replies, one per connection.
    async fn serve(replies: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            for (status, body) in replies {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                read_request(&mut socket).await;
                counter.fetch_add(1, Ordering::SeqCst);
                let reply = format!(
                    "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", address), hits)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let Ok(n) = socket.read(&mut chunk).await else {
                return;
            };
            if n == 0 {
                return;
            }
            buffer.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buffer);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buffer.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }

    fn gateway(base_url: String, max_retries: u32) -> OpenAiCompatibleGateway {
        OpenAiCompatibleGateway::new(GatewayConfig {
            base_url,
            api_key: Some("test-key".to_string()),
            timeout: Duration::from_secs(5),
            retry: RetryPolicy {
                max_retries,
                initial_backoff: Duration::from_millis(1),
                max_backoff: Duration::from_millis(5),
            },
            max_tokens: 256,
            temperature: 0.0,
        })
        .unwrap()
    }

    #[test]
    fn test_config_from_file_trims_base_url() {
        let file = FileProviderConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            api_key: Some("k".to_string()),
            max_retries: 4,
            ..Default::default()
        };
        let config = GatewayConfig::from(&file);
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.retry.max_retries, 4);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_generate_returns_content() {
        let (url, hits) = serve(vec![(200, OK_BODY)]).await;
        let text = gateway(url, 0)
            .generate(&Model::Gpt4o, &Prompt::text("sys", "hi"))
            .await
            .unwrap();

        assert_eq!(text, "{\"calories\": 500}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_server_errors() {
        let (url, hits) = serve(vec![(503, "{}"), (500, "{}"), (200, OK_BODY)]).await;
        let text = gateway(url, 2)
            .generate(&Model::Gpt4o, &Prompt::text("sys", "hi"))
            .await
            .unwrap();

        assert_eq!(text, "{\"calories\": 500}");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let (url, hits) = serve(vec![(429, "{}"), (429, "{}"), (200, OK_BODY)]).await;
        let err = gateway(url, 1)
            .generate(&Model::Gpt4o, &Prompt::text("sys", "hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::RateLimited(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_auth_error_is_not_retried() {
        let (url, hits) = serve(vec![(401, r#"{"error":"bad key"}"#), (200, OK_BODY)]).await;
        let err = gateway(url, 3)
            .generate(&Model::Gpt4o, &Prompt::text("sys", "hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::AuthenticationFailed(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
