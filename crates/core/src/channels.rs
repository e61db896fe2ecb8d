//! Outbound messaging channels and per-family channel selection.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Email,
    Sms,
    Whatsapp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Sms => "SMS",
            Self::Whatsapp => "WHATSAPP",
        }
    }

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EMAIL" => Ok(Self::Email),
            "SMS" => Ok(Self::Sms),
            "WHATSAPP" => Ok(Self::Whatsapp),
            other => Err(CoreError::Validation(format!(
                "Invalid channel '{other}'. Must be one of: EMAIL, SMS, WHATSAPP"
            ))),
        }
    }
}

/// Contact details a family has on file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactInfo<'a> {
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub whatsapp: Option<&'a str>,
}

impl ContactInfo<'_> {
    /// The address to use for `channel`, if the family has one.
    pub fn address_for(&self, channel: Channel) -> Option<&str> {
        let raw = match channel {
            Channel::Email => self.email,
            Channel::Sms => self.phone,
            // WhatsApp falls back to the plain phone number.
            Channel::Whatsapp => self.whatsapp.or(self.phone),
        };
        raw.map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Choose the channel for a message to one family.
///
/// The stated preference wins when the family has an address for it. Otherwise
/// email, WhatsApp, then SMS. `None` means the family is unreachable.
pub fn pick_channel(preference: Option<Channel>, contact: &ContactInfo<'_>) -> Option<Channel> {
    preference
        .into_iter()
        .chain([Channel::Email, Channel::Whatsapp, Channel::Sms])
        .find(|c| contact.address_for(*c).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_wins_when_reachable() {
        let contact = ContactInfo {
            email: Some("a@b.c"),
            phone: Some("+34600000000"),
            whatsapp: None,
        };
        assert_eq!(pick_channel(Some(Channel::Sms), &contact), Some(Channel::Sms));
        assert_eq!(
            pick_channel(Some(Channel::Whatsapp), &contact),
            Some(Channel::Whatsapp),
            "whatsapp falls back to the phone number"
        );
    }

    #[test]
    fn unreachable_preference_falls_back_to_email() {
        let contact = ContactInfo {
            email: Some("a@b.c"),
            ..Default::default()
        };
        assert_eq!(pick_channel(Some(Channel::Sms), &contact), Some(Channel::Email));
    }

    #[test]
    fn blank_addresses_do_not_count() {
        let contact = ContactInfo {
            email: Some("  "),
            phone: None,
            whatsapp: None,
        };
        assert_eq!(pick_channel(None, &contact), None);
    }

    #[test]
    fn channel_parsing() {
        assert_eq!(Channel::from_str_db("whatsapp").unwrap(), Channel::Whatsapp);
        assert!(Channel::from_str_db("fax").is_err());
    }
}
