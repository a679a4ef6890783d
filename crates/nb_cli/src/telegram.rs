//! Minimal Telegram Bot API transport: long-polls `getUpdates`, hands text
//! messages to the dispatcher and sends replies with `sendMessage`.

use async_trait::async_trait;
use nb_core::{ChannelId, Error, Notifier, Result, UNSUPPORTED_INPUT_MESSAGE};
use nb_pipeline::{Dispatcher, Inbound};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Seconds the server may hold a `getUpdates` call open.
const POLL_TIMEOUT_SECS: u64 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

pub struct TelegramClient {
    client: Client,
    endpoint: String,
    retry_delay: Duration,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, TELEGRAM_API_URL)
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        // Must outlive the long-poll window.
        let client = Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/bot{}", base_url.trim_end_matches('/'), token),
            retry_delay: RETRY_DELAY,
        })
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// The endpoint embeds the bot token, so errors are stripped of their URL.
    async fn call<T: serde::de::DeserializeOwned>(&self, method: &str, body: serde_json::Value) -> Result<T> {
        let response = self
            .client
            .post(format!("{}/{}", self.endpoint, method))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        let status = response.status();
        let reply = response.json::<ApiResponse<T>>().await.map_err(|e| {
            Error::External(anyhow::anyhow!(
                "Telegram {} returned {}: {}",
                method,
                status,
                e.without_url()
            ))
        })?;

        match reply {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(Error::External(anyhow::anyhow!(
                "Telegram {} failed with {}: {}",
                method,
                status,
                description.unwrap_or_else(|| "no description".to_string())
            ))),
        }
    }

    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let mut body = json!({
            "timeout": POLL_TIMEOUT_SECS,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", body).await
    }

    pub async fn send_message(&self, chat: ChannelId, text: &str) -> Result<()> {
        self.call::<serde_json::Value>("sendMessage", json!({ "chat_id": chat.0, "text": text }))
            .await?;
        Ok(())
    }

    /// Route one update. Only text messages are looked at.
    pub async fn handle_update(&self, update: Update, dispatcher: &Dispatcher) {
        let Some(Message { chat, text: Some(text) }) = update.message else {
            debug!("Skipping update {} without text", update.update_id);
            return;
        };
        let channel = ChannelId(chat.id);

        if dispatcher.handle_text(&text, channel) == Inbound::Unsupported {
            if let Err(e) = self.send_message(channel, UNSUPPORTED_INPUT_MESSAGE).await {
                warn!("[chat {}] Could not send reply: {}", channel, e);
            }
        }
    }

    /// Poll forever. Failed polls are logged and retried after a pause.
    pub async fn run(&self, dispatcher: &Dispatcher) {
        info!("🤖 Telegram bot listening for messages");
        let mut offset = None;
        loop {
            match self.get_updates(offset).await {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.handle_update(update, dispatcher).await;
                    }
                }
                Err(e) => {
                    error!("Polling Telegram failed: {}", e);
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn notify(&self, channel: ChannelId, text: &str) -> Result<()> {
        self.send_message(channel, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nb_inference::{condenser::LlmCondenser, models::DummyModel, relevance::LlmRelevanceClassifier};
    use nb_pipeline::{forward_notifications, Pipeline};
    use nb_scrapers::WebExtractor;
    use nb_storage::{ArchiveWriter, InMemoryStorage};
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123:abc";

    fn sent_ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": { "message_id": 1 } }))
    }

    fn text_update(update_id: i64, chat: i64, text: &str) -> Update {
        Update {
            update_id,
            message: Some(Message {
                chat: Chat { id: chat },
                text: Some(text.to_string()),
            }),
        }
    }

    fn pipeline_for(storage: Arc<InMemoryStorage>, staging: &std::path::Path) -> Pipeline {
        let model: Arc<dyn nb_core::InferenceModel> = Arc::new(DummyModel::new());
        Pipeline::new(
            Arc::new(WebExtractor::new().unwrap()),
            Arc::new(LlmRelevanceClassifier::new(model.clone(), "dummy")),
            Arc::new(LlmCondenser::new(model, "dummy")),
            Arc::new(ArchiveWriter::new(storage, "folder", staging)),
            "educación",
        )
    }

    #[tokio::test]
    async fn test_get_updates_parses_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/getUpdates", TOKEN)))
            .and(body_partial_json(json!({ "offset": 10, "timeout": 30 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [
                    { "update_id": 10, "message": { "message_id": 5, "chat": { "id": 42, "type": "private" }, "text": "https://example.com" } },
                    { "update_id": 11, "message": { "message_id": 6, "chat": { "id": 42, "type": "private" }, "photo": [] } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelegramClient::with_base_url(TOKEN, &server.uri()).unwrap();
        let updates = client.get_updates(Some(10)).await.unwrap();

        assert_eq!(updates.len(), 2);
        let first = updates[0].message.as_ref().unwrap();
        assert_eq!(first.chat.id, 42);
        assert_eq!(first.text.as_deref(), Some("https://example.com"));
        assert!(updates[1].message.as_ref().unwrap().text.is_none());
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendMessage", TOKEN)))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let client = TelegramClient::with_base_url(TOKEN, &server.uri()).unwrap();
        let err = client.send_message(ChannelId(1), "hola").await.unwrap_err();
        assert!(err.to_string().contains("chat not found"));
    }

    #[tokio::test]
    async fn test_unsupported_text_gets_reply_and_commands_are_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendMessage", TOKEN)))
            .and(body_partial_json(json!({ "chat_id": 9, "text": UNSUPPORTED_INPUT_MESSAGE })))
            .respond_with(sent_ok())
            .expect(1)
            .mount(&server)
            .await;

        let storage = Arc::new(InMemoryStorage::new());
        let staging = tempfile::tempdir().unwrap();
        let (dispatcher, _rx) = Dispatcher::new(Arc::new(pipeline_for(storage.clone(), staging.path())));
        let client = TelegramClient::with_base_url(TOKEN, &server.uri()).unwrap();

        client.handle_update(text_update(1, 9, "hola, ¿cómo estás?"), &dispatcher).await;
        client.handle_update(text_update(2, 9, "/start"), &dispatcher).await;
        client
            .handle_update(Update { update_id: 3, message: None }, &dispatcher)
            .await;

        assert!(storage.files().await.is_empty());
    }

    #[tokio::test]
    async fn test_link_is_processed_and_answered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nota"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><head><title>Sitio</title></head><body>\
                 <h1>Vuelven las clases presenciales</h1>\
                 <article><p>Las escuelas reabren sus puertas el lunes.</p>\
                 <p>El ministerio confirmó el calendario escolar.</p></article>\
                 </body></html>",
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendMessage", TOKEN)))
            .and(body_partial_json(json!({ "chat_id": 77, "text": "✅ Resumen creado y subido a Drive." })))
            .respond_with(sent_ok())
            .expect(1)
            .mount(&server)
            .await;

        let storage = Arc::new(InMemoryStorage::new());
        let staging = tempfile::tempdir().unwrap();
        let (dispatcher, rx) = Dispatcher::new(Arc::new(pipeline_for(storage.clone(), staging.path())));
        let client = Arc::new(TelegramClient::with_base_url(TOKEN, &server.uri()).unwrap());
        let forwarder = tokio::spawn(forward_notifications(rx, client.clone()));

        let link = format!("{}/nota", server.uri());
        client.handle_update(text_update(1, 77, &link), &dispatcher).await;
        drop(dispatcher);
        forwarder.await.unwrap();

        let files = storage.files().await;
        assert_eq!(files.len(), 1);
        assert!(files[0].content.starts_with("--- Vuelven las clases presenciales --- ("));
        assert!(files[0].content.contains(&format!("Link original: {}", link)));
    }

    #[tokio::test]
    async fn test_transport_errors_do_not_expose_the_token() {
        let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", closed.local_addr().unwrap());
        drop(closed);

        let client = TelegramClient::with_base_url("123456:SECRET-TOKEN", &base_url).unwrap();

        let err = client.get_updates(None).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
        assert!(!err.to_string().contains("SECRET-TOKEN"), "{}", err);

        let err = client.send_message(ChannelId(1), "hola").await.unwrap_err();
        assert!(!err.to_string().contains("SECRET-TOKEN"), "{}", err);
    }

    #[tokio::test]
    async fn test_malformed_reply_does_not_expose_the_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123456:SECRET-TOKEN/getUpdates"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let client = TelegramClient::with_base_url("123456:SECRET-TOKEN", &server.uri()).unwrap();
        let err = client.get_updates(None).await.unwrap_err();
        assert!(err.to_string().contains("getUpdates"));
        assert!(!err.to_string().contains("SECRET-TOKEN"), "{}", err);
    }

    #[tokio::test]
    async fn test_run_retries_after_poll_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/getUpdates", TOKEN)))
            .respond_with(ResponseTemplate::new(502))
            .expect(2u64..)
            .mount(&server)
            .await;

        let storage = Arc::new(InMemoryStorage::new());
        let staging = tempfile::tempdir().unwrap();
        let (dispatcher, _rx) = Dispatcher::new(Arc::new(pipeline_for(storage, staging.path())));
        let client = TelegramClient::with_base_url(TOKEN, &server.uri())
            .unwrap()
            .with_retry_delay(Duration::from_millis(10));

        let _ = tokio::time::timeout(Duration::from_millis(300), client.run(&dispatcher)).await;
    }
}
