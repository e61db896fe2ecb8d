//! Outbound guest messaging.
//!
//! Email goes through Resend when configured, otherwise SMTP. SMS and
//! WhatsApp go through Twilio. Each provider is optional; an unconfigured
//! channel fails with [`DeliveryError::NotConfigured`] and callers log it.

pub mod resend;
pub mod smtp;
pub mod twilio;

use std::collections::BTreeMap;

use vowline_core::channels::Channel;

use self::resend::{ResendConfig, ResendDelivery, ResendError};
use self::smtp::{SmtpConfig, SmtpDelivery, SmtpError};
use self::twilio::{TwilioConfig, TwilioDelivery, TwilioError};

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Approved WhatsApp content template and its positional variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsappContent {
    pub content_sid: String,
    pub variables: BTreeMap<String, String>,
}

/// A rendered message ready for a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub channel: Channel,
    /// Email address or E.164 phone number.
    pub to: String,
    /// Email only.
    pub subject: Option<String>,
    pub body: String,
    /// WhatsApp only. When set, Twilio renders the approved template instead
    /// of `body`.
    pub whatsapp_content: Option<WhatsappContent>,
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("No provider configured for {0} messages")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Resend(#[from] ResendError),

    #[error(transparent)]
    Smtp(#[from] SmtpError),

    #[error(transparent)]
    Twilio(#[from] TwilioError),
}

// ---------------------------------------------------------------------------
// MessageDispatcher
// ---------------------------------------------------------------------------

/// Routes messages to the configured provider for their channel.
#[derive(Default)]
pub struct MessageDispatcher {
    resend: Option<ResendDelivery>,
    smtp: Option<SmtpDelivery>,
    twilio: Option<TwilioDelivery>,
}

impl MessageDispatcher {
    pub fn new(
        resend: Option<ResendDelivery>,
        smtp: Option<SmtpDelivery>,
        twilio: Option<TwilioDelivery>,
    ) -> Self {
        Self { resend, smtp, twilio }
    }

    /// Build every provider whose environment variables are present.
    pub fn from_env() -> Result<Self, DeliveryError> {
        let resend = ResendConfig::from_env().map(ResendDelivery::new).transpose()?;
        let smtp = SmtpConfig::from_env().map(SmtpDelivery::new);
        let twilio = TwilioConfig::from_env().map(TwilioDelivery::new).transpose()?;
        tracing::info!(
            resend = resend.is_some(),
            smtp = smtp.is_some(),
            twilio = twilio.is_some(),
            "Messaging providers configured"
        );
        Ok(Self::new(resend, smtp, twilio))
    }

    /// Whether a message on `channel` has somewhere to go.
    pub fn supports(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.resend.is_some() || self.smtp.is_some(),
            Channel::Sms => self.twilio.as_ref().is_some_and(|t| t.can_send_sms()),
            Channel::Whatsapp => self.twilio.as_ref().is_some_and(|t| t.can_send_whatsapp()),
        }
    }

    pub async fn send(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        let subject = message.subject.as_deref().unwrap_or_default();
        match message.channel {
            Channel::Email => {
                if let Some(resend) = &self.resend {
                    resend.send(&message.to, subject, &message.body).await?;
                } else if let Some(smtp) = &self.smtp {
                    smtp.send(&message.to, subject, &message.body).await?;
                } else {
                    return Err(DeliveryError::NotConfigured(Channel::Email.as_str()));
                }
            }
            Channel::Sms => {
                let twilio = self
                    .twilio
                    .as_ref()
                    .ok_or(DeliveryError::NotConfigured(Channel::Sms.as_str()))?;
                twilio.send_sms(&message.to, &message.body).await?;
            }
            Channel::Whatsapp => {
                let twilio = self
                    .twilio
                    .as_ref()
                    .ok_or(DeliveryError::NotConfigured(Channel::Whatsapp.as_str()))?;
                twilio
                    .send_whatsapp(&message.to, &message.body, message.whatsapp_content.as_ref())
                    .await?;
            }
        }
        tracing::info!(channel = message.channel.as_str(), "Message delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(channel: Channel) -> OutboundMessage {
        OutboundMessage {
            channel,
            to: "guest@example.com".into(),
            subject: Some("Hello".into()),
            body: "Body".into(),
            whatsapp_content: None,
        }
    }

    #[test]
    fn empty_dispatcher_supports_nothing() {
        let dispatcher = MessageDispatcher::default();
        assert!(!dispatcher.supports(Channel::Email));
        assert!(!dispatcher.supports(Channel::Sms));
        assert!(!dispatcher.supports(Channel::Whatsapp));
    }

    #[tokio::test]
    async fn unconfigured_channel_is_reported() {
        let dispatcher = MessageDispatcher::default();
        let err = dispatcher.send(&message(Channel::Sms)).await.unwrap_err();
        assert!(matches!(err, DeliveryError::NotConfigured("SMS")));
        assert_eq!(err.to_string(), "No provider configured for SMS messages");
    }

    #[test]
    fn smtp_alone_covers_email() {
        let smtp = SmtpDelivery::new(SmtpConfig {
            smtp_host: "localhost".into(),
            smtp_port: 2525,
            from_address: "noreply@vowline.local".into(),
            smtp_user: None,
            smtp_password: None,
        });
        let dispatcher = MessageDispatcher::new(None, Some(smtp), None);
        assert!(dispatcher.supports(Channel::Email));
        assert!(!dispatcher.supports(Channel::Sms));
    }
}
