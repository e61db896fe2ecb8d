//! Email delivery through the Resend HTTP API.

use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.resend.com";
const DEFAULT_FROM: &str = "Vowline <noreply@vowline.app>";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ResendError {
    #[error("Resend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Resend returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
    pub from: String,
    pub base_url: String,
}

impl ResendConfig {
    /// Load configuration from the environment.
    ///
    /// Returns `None` if `RESEND_API_KEY` is not set.
    ///
    /// | Variable          | Required | Default                          |
    /// |-------------------|----------|----------------------------------|
    /// | `RESEND_API_KEY`  | yes      |                                  |
    /// | `RESEND_FROM`     | no       | `Vowline <noreply@vowline.app>`  |
    /// | `RESEND_BASE_URL` | no       | `https://api.resend.com`         |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("RESEND_API_KEY").ok()?;
        Some(Self {
            api_key,
            from: std::env::var("RESEND_FROM").unwrap_or_else(|_| DEFAULT_FROM.to_string()),
            base_url: std::env::var("RESEND_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        })
    }
}

pub struct ResendDelivery {
    client: reqwest::Client,
    config: ResendConfig,
}

impl ResendDelivery {
    pub fn new(config: ResendConfig) -> Result<Self, ResendError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// Send one plain-text email.
    pub async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), ResendError> {
        let payload = serde_json::json!({
            "from": self.config.from,
            "to": [to],
            "subject": subject,
            "text": text,
        });
        let response = self
            .client
            .post(format!("{}/emails", self.config.base_url.trim_end_matches('/')))
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResendError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        tracing::debug!(to, "Email accepted by Resend");
        Ok(())
    }
}
