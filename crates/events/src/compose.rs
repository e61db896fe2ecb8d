//! Turning a stored template into a message for one family.

use vowline_core::channels::{pick_channel, Channel, ContactInfo};
use vowline_core::error::CoreError;
use vowline_core::i18n::{fallback_chain, format_date, Language};
use vowline_core::templates::{
    render, select_template, whatsapp_variables, MessageTemplate, TemplateContext, TemplateType,
};
use vowline_db::models::family::Family;
use vowline_db::models::template::MessageTemplateRow;
use vowline_db::models::wedding::Wedding;

use crate::delivery::{OutboundMessage, WhatsappContent};

/// Convert stored rows into template candidates, dropping rows whose type,
/// language or channel no longer parse.
pub fn parse_templates(rows: &[MessageTemplateRow]) -> Vec<MessageTemplate> {
    rows.iter()
        .filter_map(|row| match parse_template(row) {
            Ok(template) => Some(template),
            Err(e) => {
                tracing::warn!(template_id = row.id, error = %e, "Skipping unusable message template");
                None
            }
        })
        .collect()
}

fn parse_template(row: &MessageTemplateRow) -> Result<MessageTemplate, CoreError> {
    Ok(MessageTemplate {
        template_type: TemplateType::from_str_db(&row.template_type)?,
        language: Language::parse(&row.language)?,
        channel: Channel::from_str_db(&row.channel)?,
        subject: row.subject.clone(),
        body: row.body.clone(),
        content_sid: row.content_sid.clone(),
    })
}

/// Language fallback chain for a family of a wedding.
pub fn family_languages(wedding: &Wedding, family: &Family) -> Vec<Language> {
    fallback_chain(
        Language::parse(&family.preferred_language).ok(),
        Language::parse_or_default(Some(&wedding.default_language)),
    )
}

/// Variables available to every guest message.
pub fn template_context(
    wedding: &Wedding,
    family: &Family,
    language: Language,
    rsvp_url: &str,
) -> TemplateContext {
    let cutoff = wedding
        .rsvp_cutoff_date
        .map(|c| format_date(c.date_naive(), language))
        .unwrap_or_default();
    TemplateContext::new()
        .with("family_name", family.name.as_str())
        .with("couple_names", wedding.couple_names.as_str())
        .with("wedding_date", format_date(wedding.wedding_date, language))
        .with("wedding_time", wedding.wedding_time.as_str())
        .with("location", wedding.location.as_str())
        .with("rsvp_link", rsvp_url)
        .with("rsvp_cutoff_date", cutoff)
}

/// Build the message of `template_type` for a family.
///
/// `usable` filters channels that have a configured provider. Returns `None`
/// when the family has no reachable address on a usable channel.
pub fn compose(
    template_type: TemplateType,
    wedding: &Wedding,
    family: &Family,
    templates: &[MessageTemplate],
    rsvp_url: &str,
    usable: impl Fn(Channel) -> bool,
) -> Option<OutboundMessage> {
    let contact = ContactInfo {
        email: family.email.as_deref(),
        phone: family.phone.as_deref(),
        whatsapp: family.whatsapp_number.as_deref(),
    };
    let preference = family
        .channel_preference
        .as_deref()
        .and_then(|c| Channel::from_str_db(c).ok())
        .filter(|c| usable(*c));
    let channel = pick_channel(preference, &contact).filter(|c| usable(*c)).or_else(|| {
        [Channel::Email, Channel::Whatsapp, Channel::Sms]
            .into_iter()
            .find(|c| usable(*c) && contact.address_for(*c).is_some())
    })?;
    let to = contact.address_for(channel)?.to_string();

    let chain = family_languages(wedding, family);
    let template = select_template(templates, template_type, channel, &chain);
    let ctx = template_context(wedding, family, template.language, rsvp_url);

    let whatsapp_content = match (channel, &template.content_sid) {
        (Channel::Whatsapp, Some(sid)) => Some(WhatsappContent {
            content_sid: sid.clone(),
            variables: whatsapp_variables(&template.body, &ctx).variables,
        }),
        _ => None,
    };

    Some(OutboundMessage {
        channel,
        to,
        subject: template.subject.as_deref().map(|s| render(s, &ctx)),
        body: render(&template.body, &ctx),
        whatsapp_content,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    fn wedding() -> Wedding {
        let now = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
        Wedding {
            id: 1,
            planner_id: 1,
            couple_names: "Ana & Ben".into(),
            wedding_date: NaiveDate::from_ymd_opt(2027, 6, 12).unwrap(),
            wedding_time: "17:00".into(),
            location: "Lisbon".into(),
            venue_address: None,
            default_language: "es".into(),
            rsvp_cutoff_date: Some(Utc.with_ymd_and_hms(2027, 5, 1, 0, 0, 0).unwrap()),
            is_active: true,
            theme_id: None,
            dress_code: None,
            additional_info: None,
            wizard_step: 1,
            wizard_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn family(email: Option<&str>, whatsapp: Option<&str>, preference: Option<&str>) -> Family {
        let now = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
        Family {
            id: 7,
            wedding_id: 1,
            name: "Silva".into(),
            email: email.map(String::from),
            phone: None,
            whatsapp_number: whatsapp.map(String::from),
            magic_token: "tok".into(),
            preferred_language: "fr".into(),
            channel_preference: preference.map(String::from),
            invited_by_admin_id: None,
            rsvp_submitted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn email_reminder_falls_back_to_wedding_language() {
        let msg = compose(
            TemplateType::Reminder,
            &wedding(),
            &family(Some("silva@example.com"), None, None),
            &[],
            "https://app/s/abc",
            |_| true,
        )
        .unwrap();
        assert_eq!(msg.channel, Channel::Email);
        assert_eq!(msg.to, "silva@example.com");
        // No French default exists, so the Spanish wedding default is used.
        assert!(msg.subject.unwrap().starts_with("Recordatorio"));
        assert!(msg.body.contains("Silva"));
        assert!(msg.body.contains("https://app/s/abc"));
        assert!(msg.body.contains("1 de mayo de 2027"));
    }

    #[test]
    fn whatsapp_content_template_maps_variables() {
        let templates = vec![MessageTemplate {
            template_type: TemplateType::Reminder,
            language: Language::Fr,
            channel: Channel::Whatsapp,
            subject: None,
            body: "Bonjour {{family_name}}: {{rsvp_link}}".into(),
            content_sid: Some("HX1".into()),
        }];
        let msg = compose(
            TemplateType::Reminder,
            &wedding(),
            &family(None, Some("+351900000000"), Some("WHATSAPP")),
            &templates,
            "https://app/s/abc",
            |_| true,
        )
        .unwrap();
        assert_eq!(msg.channel, Channel::Whatsapp);
        assert_eq!(msg.body, "Bonjour Silva: https://app/s/abc");
        let content = msg.whatsapp_content.unwrap();
        assert_eq!(content.content_sid, "HX1");
        assert_eq!(content.variables["1"], "Silva");
        assert_eq!(content.variables["2"], "https://app/s/abc");
    }

    #[test]
    fn unusable_preference_falls_back_to_reachable_channel() {
        let msg = compose(
            TemplateType::Invitation,
            &wedding(),
            &family(Some("silva@example.com"), Some("+351900000000"), Some("WHATSAPP")),
            &[],
            "https://app/rsvp/tok",
            |c| c == Channel::Email,
        )
        .unwrap();
        assert_eq!(msg.channel, Channel::Email);
    }

    #[test]
    fn unreachable_family_yields_nothing() {
        let msg = compose(
            TemplateType::Reminder,
            &wedding(),
            &family(None, None, None),
            &[],
            "https://app/rsvp/tok",
            |_| true,
        );
        assert!(msg.is_none());
    }
}
