//! SMS and WhatsApp delivery through the Twilio Messages API.
//!
//! WhatsApp messages outside the 24-hour session window must use an approved
//! content template. When a [`WhatsappContent`] is supplied the request sends
//! `ContentSid` + `ContentVariables` instead of a free-form `Body`.

use std::time::Duration;

use super::WhatsappContent;

const DEFAULT_BASE_URL: &str = "https://api.twilio.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const WHATSAPP_PREFIX: &str = "whatsapp:";

#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    #[error("Twilio request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Twilio returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("No Twilio sender configured for {0}")]
    MissingSender(&'static str),

    #[error("Invalid content variables: {0}")]
    ContentVariables(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub sms_from: Option<String>,
    pub whatsapp_from: Option<String>,
    pub base_url: String,
}

impl TwilioConfig {
    /// Load configuration from the environment.
    ///
    /// Returns `None` unless both `TWILIO_ACCOUNT_SID` and `TWILIO_AUTH_TOKEN`
    /// are set.
    ///
    /// | Variable               | Required | Default                  |
    /// |------------------------|----------|--------------------------|
    /// | `TWILIO_ACCOUNT_SID`   | yes      |                          |
    /// | `TWILIO_AUTH_TOKEN`    | yes      |                          |
    /// | `TWILIO_SMS_FROM`      | no       |                          |
    /// | `TWILIO_WHATSAPP_FROM` | no       |                          |
    /// | `TWILIO_BASE_URL`      | no       | `https://api.twilio.com` |
    pub fn from_env() -> Option<Self> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID").ok()?;
        let auth_token = std::env::var("TWILIO_AUTH_TOKEN").ok()?;
        Some(Self {
            account_sid,
            auth_token,
            sms_from: std::env::var("TWILIO_SMS_FROM").ok(),
            whatsapp_from: std::env::var("TWILIO_WHATSAPP_FROM").ok(),
            base_url: std::env::var("TWILIO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        })
    }
}

pub struct TwilioDelivery {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioDelivery {
    pub fn new(config: TwilioConfig) -> Result<Self, TwilioError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    pub fn can_send_sms(&self) -> bool {
        self.config.sms_from.is_some()
    }

    pub fn can_send_whatsapp(&self) -> bool {
        self.config.whatsapp_from.is_some()
    }

    pub async fn send_sms(&self, to: &str, body: &str) -> Result<(), TwilioError> {
        let from = self
            .config
            .sms_from
            .as_deref()
            .ok_or(TwilioError::MissingSender("SMS"))?;
        let form = vec![
            ("From", from.to_string()),
            ("To", to.to_string()),
            ("Body", body.to_string()),
        ];
        self.post(&form).await
    }

    pub async fn send_whatsapp(
        &self,
        to: &str,
        body: &str,
        content: Option<&WhatsappContent>,
    ) -> Result<(), TwilioError> {
        let from = self
            .config
            .whatsapp_from
            .as_deref()
            .ok_or(TwilioError::MissingSender("WhatsApp"))?;
        let form = whatsapp_form(from, to, body, content)?;
        self.post(&form).await
    }

    async fn post(&self, form: &[(&str, String)]) -> Result<(), TwilioError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_sid
        );
        let response = self
            .client
            .post(url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TwilioError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Prefix a number with `whatsapp:` unless it already has it.
fn whatsapp_address(number: &str) -> String {
    if number.starts_with(WHATSAPP_PREFIX) {
        number.to_string()
    } else {
        format!("{WHATSAPP_PREFIX}{number}")
    }
}

fn whatsapp_form(
    from: &str,
    to: &str,
    body: &str,
    content: Option<&WhatsappContent>,
) -> Result<Vec<(&'static str, String)>, TwilioError> {
    let mut form = vec![("From", whatsapp_address(from)), ("To", whatsapp_address(to))];
    match content {
        Some(content) => {
            form.push(("ContentSid", content.content_sid.clone()));
            form.push((
                "ContentVariables",
                serde_json::to_string(&content.variables)?,
            ));
        }
        None => form.push(("Body", body.to_string())),
    }
    Ok(form)
}
