//! Dialogue server API

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};

use voice_avatar_core::{ChatRequest, ChatResponse, ErrorBody, FallbackDirective, VoiceRequest, AUDIO_MPEG};

use crate::config::ClientConfig;
use crate::ClientError;

/// Answer of the voice endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceReply {
    Audio { bytes: Vec<u8>, mime: String },
    /// The server could not synthesize; speak the text locally
    Fallback(FallbackDirective),
}

/// Server operations used by the controller
#[async_trait]
pub trait DialogueApi: Send + Sync {
    /// Reply text for `message`, or `None` when the server answered without text
    async fn ask(&self, message: &str) -> Result<Option<String>, ClientError>;

    /// Remote speech for `text`
    async fn synthesize(&self, text: &str) -> Result<VoiceReply, ClientError>;

    /// Clear the server-side context
    async fn reset(&self) -> Result<(), ClientError>;
}

/// `reqwest` implementation of [`DialogueApi`]
pub struct HttpDialogueClient {
    client: Client,
    base_url: String,
}

impl HttpDialogueClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Client for the server named in `config.server_url`
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(config.server_url.clone())
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn error_for(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or(body);

        if status == StatusCode::BAD_REQUEST {
            ClientError::InvalidInput(message)
        } else {
            ClientError::Server {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[async_trait]
impl DialogueApi for HttpDialogueClient {
    async fn ask(&self, message: &str) -> Result<Option<String>, ClientError> {
        let response = self
            .client
            .post(self.url("/api/gemini"))
            .json(&ChatRequest::new(message))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let body: serde_json::Value = response.json().await?;
        let reply = serde_json::from_value::<ChatResponse>(body)
            .ok()
            .map(|r| r.text)
            .filter(|t| !t.trim().is_empty());
        Ok(reply)
    }

    async fn synthesize(&self, text: &str) -> Result<VoiceReply, ClientError> {
        let response = self
            .client
            .post(self.url("/api/voice"))
            .json(&VoiceRequest::new(text))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::PAYMENT_REQUIRED {
            // The status alone means "speak locally"; an unreadable body keeps our text
            let directive = match response.json::<FallbackDirective>().await {
                Ok(directive) => directive,
                Err(e) => {
                    tracing::warn!("Unreadable fallback directive, speaking locally: {}", e);
                    FallbackDirective::local(text)
                },
            };
            tracing::debug!(target_voice = %directive.fallback, "Server requested local synthesis");
            return Ok(VoiceReply::Fallback(directive));
        }

        if !status.is_success() {
            return Err(Self::error_for(response).await);
        }

        let mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(AUDIO_MPEG)
            .to_string();
        let bytes = response.bytes().await?;

        Ok(VoiceReply::Audio {
            bytes: bytes.to_vec(),
            mime,
        })
    }

    async fn reset(&self) -> Result<(), ClientError> {
        let response = self.client.post(self.url("/api/reset")).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_ask_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/gemini"))
            .and(body_json(serde_json::json!({ "message": "Estou triste" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "Filho, estou contigo." })),
            )
            .mount(&server)
            .await;

        let client = HttpDialogueClient::new(server.uri()).unwrap();
        let reply = client.ask("Estou triste").await.unwrap();
        assert_eq!(reply.as_deref(), Some("Filho, estou contigo."));
    }

    #[tokio::test]
    async fn test_ask_maps_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/gemini"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({ "error": "Falha ao gerar resposta (Gemini)" })),
            )
            .mount(&server)
            .await;

        let client = HttpDialogueClient::new(server.uri()).unwrap();
        let err = client.ask("Oi").await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Server {
                status: 500,
                message: "Falha ao gerar resposta (Gemini)".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_synthesize_audio_and_directive() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/voice"))
            .and(body_json(serde_json::json!({ "text": "Paz" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/mpeg")
                    .set_body_bytes(vec![1u8, 2, 3]),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/voice"))
            .and(body_json(serde_json::json!({ "text": "Sem crédito" })))
            .respond_with(
                ResponseTemplate::new(402)
                    .set_body_json(serde_json::json!({ "fallback": "google", "text": "Sem crédito" })),
            )
            .mount(&server)
            .await;

        let client = HttpDialogueClient::new(server.uri()).unwrap();

        assert_eq!(
            client.synthesize("Paz").await.unwrap(),
            VoiceReply::Audio {
                bytes: vec![1, 2, 3],
                mime: "audio/mpeg".to_string()
            }
        );
        assert_eq!(
            client.synthesize("Sem crédito").await.unwrap(),
            VoiceReply::Fallback(FallbackDirective::local("Sem crédito"))
        );
    }

    #[tokio::test]
    async fn test_synthesize_bad_request_is_invalid_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/voice"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({ "error": "Texto inválido" })),
            )
            .mount(&server)
            .await;

        let client = HttpDialogueClient::new(server.uri()).unwrap();
        assert_eq!(
            client.synthesize(" ").await.unwrap_err(),
            ClientError::InvalidInput("Texto inválido".to_string())
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let client = HttpDialogueClient::new("http://127.0.0.1:1").unwrap();
        assert!(client.synthesize("Paz").await.unwrap_err().is_network());
    }

    #[tokio::test]
    async fn test_reset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/reset"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "ok": true, "message": "Contexto apagado." })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpDialogueClient::new(format!("{}/", server.uri())).unwrap();
        client.reset().await.unwrap();
    }

    #[tokio::test]
    async fn test_unreadable_directive_still_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/voice"))
            .respond_with(ResponseTemplate::new(402).set_body_string("Payment Required"))
            .mount(&server)
            .await;

        let client = HttpDialogueClient::new(server.uri()).unwrap();
        assert_eq!(
            client.synthesize("Fica em paz").await.unwrap(),
            VoiceReply::Fallback(FallbackDirective::local("Fica em paz"))
        );
    }

    #[tokio::test]
    async fn test_from_config_uses_server_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/reset"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let config = ClientConfig {
            server_url: server.uri(),
            ..ClientConfig::default()
        };
        let client = HttpDialogueClient::from_config(&config).unwrap();
        client.reset().await.unwrap();
    }
}
