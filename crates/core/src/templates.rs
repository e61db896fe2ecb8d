//! Message templates: placeholder rendering, language selection, WhatsApp
//! variable mapping, and SMS segment counting.
//!
//! Templates use `{{name}}` placeholders. Email and SMS bodies are rendered
//! locally. WhatsApp bodies go to pre-approved content templates that only
//! accept positional `{{1}}..{{n}}` variables, so named placeholders are
//! mapped to positions in first-appearance order.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::channels::Channel;
use crate::error::CoreError;
use crate::i18n::Language;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([a-z_][a-z0-9_]*)\s*\}\}").expect("valid regex"));

/// Known template variable names.
pub const VARIABLES: &[&str] = &[
    "family_name",
    "couple_names",
    "wedding_date",
    "wedding_time",
    "location",
    "rsvp_link",
    "rsvp_cutoff_date",
];

// ---------------------------------------------------------------------------
// Template type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateType {
    Invitation,
    Reminder,
    Confirmation,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invitation => "INVITATION",
            Self::Reminder => "REMINDER",
            Self::Confirmation => "CONFIRMATION",
        }
    }

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INVITATION" => Ok(Self::Invitation),
            "REMINDER" => Ok(Self::Reminder),
            "CONFIRMATION" => Ok(Self::Confirmation),
            other => Err(CoreError::Validation(format!(
                "Invalid template type '{other}'. Must be one of: INVITATION, REMINDER, CONFIRMATION"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Context and rendering
// ---------------------------------------------------------------------------

/// Values substituted into templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateContext {
    values: HashMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Substitute `{{name}}` placeholders. Unknown names are left verbatim.
pub fn render(text: &str, ctx: &TemplateContext) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures<'_>| match ctx.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Reject templates that reference variables we never provide.
pub fn validate_placeholders(text: &str) -> Result<(), CoreError> {
    let unknown: Vec<&str> = PLACEHOLDER
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|name| !VARIABLES.contains(name))
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown template variables: {}. Allowed: {}",
            unknown.join(", "),
            VARIABLES.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// A stored or built-in template candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub template_type: TemplateType,
    pub language: Language,
    pub channel: Channel,
    pub subject: Option<String>,
    pub body: String,
    /// Twilio content SID for WhatsApp templates.
    pub content_sid: Option<String>,
}

/// Pick the template for a message, walking the language fallback chain.
///
/// Wedding-specific templates win over built-in defaults in the same
/// language; a wedding template in a later language loses to a built-in
/// default in an earlier one.
pub fn select_template(
    candidates: &[MessageTemplate],
    template_type: TemplateType,
    channel: Channel,
    chain: &[Language],
) -> MessageTemplate {
    for lang in chain {
        if let Some(found) = candidates.iter().find(|t| {
            t.template_type == template_type && t.channel == channel && t.language == *lang
        }) {
            return found.clone();
        }
        if let Some(builtin) = default_template(template_type, channel, *lang) {
            return builtin;
        }
    }
    default_template(template_type, channel, Language::En)
        .expect("English defaults exist for every type and channel")
}

/// Built-in templates. English and Spanish are bundled; other languages fall
/// through to the next entry in the chain.
pub fn default_template(
    template_type: TemplateType,
    channel: Channel,
    language: Language,
) -> Option<MessageTemplate> {
    let (subject, body) = match (language, template_type) {
        (Language::En, TemplateType::Invitation) => (
            "You're invited: {{couple_names}}",
            "Dear {{family_name}}, {{couple_names}} would love to celebrate with you on {{wedding_date}} at {{location}}. Please let us know if you can join: {{rsvp_link}}",
        ),
        (Language::En, TemplateType::Reminder) => (
            "Reminder: please RSVP by {{rsvp_cutoff_date}}",
            "Dear {{family_name}}, we haven't received your RSVP for the wedding of {{couple_names}} yet. Please reply by {{rsvp_cutoff_date}}: {{rsvp_link}}",
        ),
        (Language::En, TemplateType::Confirmation) => (
            "Thanks for your RSVP",
            "Dear {{family_name}}, thank you for your response. You can review it any time: {{rsvp_link}}",
        ),
        (Language::Es, TemplateType::Invitation) => (
            "Estáis invitados: {{couple_names}}",
            "Querida familia {{family_name}}, {{couple_names}} quieren celebrar con vosotros el {{wedding_date}} en {{location}}. Confirmad vuestra asistencia: {{rsvp_link}}",
        ),
        (Language::Es, TemplateType::Reminder) => (
            "Recordatorio: confirmad antes del {{rsvp_cutoff_date}}",
            "Querida familia {{family_name}}, aún no hemos recibido vuestra confirmación para la boda de {{couple_names}}. Responded antes del {{rsvp_cutoff_date}}: {{rsvp_link}}",
        ),
        (Language::Es, TemplateType::Confirmation) => (
            "Gracias por confirmar",
            "Querida familia {{family_name}}, gracias por vuestra respuesta. Podéis revisarla cuando queráis: {{rsvp_link}}",
        ),
        _ => return None,
    };

    Some(MessageTemplate {
        template_type,
        language,
        channel,
        subject: (channel == Channel::Email).then(|| subject.to_string()),
        body: body.to_string(),
        content_sid: None,
    })
}

// ---------------------------------------------------------------------------
// WhatsApp variable mapping
// ---------------------------------------------------------------------------

/// A body rewritten to positional placeholders plus its variable values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhatsappPayload {
    pub body: String,
    /// Twilio `ContentVariables`: position (as string) to value.
    pub variables: BTreeMap<String, String>,
}

/// Map named placeholders to `{{1}}..{{n}}` in first-appearance order.
///
/// Repeated names reuse their first position. Names missing from `ctx` map to
/// an empty string so the provider never sees an unfilled slot.
pub fn whatsapp_variables(body: &str, ctx: &TemplateContext) -> WhatsappPayload {
    let mut positions: Vec<String> = Vec::new();
    let rewritten = PLACEHOLDER.replace_all(body, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        let index = match positions.iter().position(|p| p == name) {
            Some(i) => i + 1,
            None => {
                positions.push(name.to_string());
                positions.len()
            }
        };
        format!("{{{{{index}}}}}")
    });

    let variables = positions
        .iter()
        .enumerate()
        .map(|(i, name)| {
            (
                (i + 1).to_string(),
                ctx.get(name).unwrap_or_default().to_string(),
            )
        })
        .collect();

    WhatsappPayload {
        body: rewritten.into_owned(),
        variables,
    }
}

// ---------------------------------------------------------------------------
// SMS segments
// ---------------------------------------------------------------------------

const GSM7_BASIC: &str = "@£$¥èéùìòÇ\nØø\rÅåΔ_ΦΓΛΩΠΨΣΘΞÆæßÉ !\"#¤%&'()*+,-./0123456789:;<=>?¡ABCDEFGHIJKLMNOPQRSTUVWXYZÄÖÑÜ§¿abcdefghijklmnopqrstuvwxyzäöñüà";
const GSM7_EXTENDED: &str = "^{}\\[~]|€\u{c}";

/// Number of SMS segments needed for `text`.
///
/// GSM-7 messages fit 160 septets (153 per part when concatenated); anything
/// outside the GSM-7 alphabet switches to UCS-2 at 70 (67) characters.
pub fn sms_segments(text: &str) -> usize {
    let is_gsm = text
        .chars()
        .all(|c| GSM7_BASIC.contains(c) || GSM7_EXTENDED.contains(c));

    let (units, single, multi) = if is_gsm {
        let septets: usize = text
            .chars()
            .map(|c| if GSM7_EXTENDED.contains(c) { 2 } else { 1 })
            .sum();
        (septets, 160, 153)
    } else {
        (text.encode_utf16().count(), 70, 67)
    };

    if units == 0 {
        0
    } else if units <= single {
        1
    } else {
        units.div_ceil(multi)
    }
}
