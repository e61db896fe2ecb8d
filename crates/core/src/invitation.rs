//! Invitation-template blocks and their HTML renderer.
//!
//! An invitation template is an ordered list of typed blocks stored as JSON.
//! Text-bearing blocks hold one string per language and are resolved through
//! the guest's language fallback chain. All user-supplied text is escaped
//! before placeholders are substituted, and substituted values are escaped
//! too.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::i18n::Language;
use crate::templates::{self, TemplateContext};

/// Maximum spacer height in pixels.
pub const MAX_SPACER_HEIGHT: u32 = 200;

/// Maximum number of blocks in one template.
pub const MAX_BLOCKS: usize = 100;

/// Language code to text.
pub type Localized = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { text: Localized, level: u8 },
    Text { text: Localized },
    Image { url: String, alt: Option<String> },
    Divider,
    Spacer { height: u32 },
    WeddingDetails,
    Location { map_url: Option<String> },
    Countdown,
    RsvpButton { label: Localized },
}

/// Everything the renderer needs besides the blocks.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub variables: &'a TemplateContext,
    pub chain: &'a [Language],
    /// Whole days until the wedding; negative once it has passed.
    pub days_until_wedding: Option<i64>,
}

/// Pick the text for the first language in `chain` that has a non-empty entry.
///
/// Falls back to any entry so a template authored in one language still shows
/// something.
pub fn localize<'a>(text: &'a Localized, chain: &[Language]) -> &'a str {
    chain
        .iter()
        .filter_map(|lang| text.get(lang.as_str()))
        .chain(text.values())
        .map(String::as_str)
        .find(|s| !s.trim().is_empty())
        .unwrap_or("")
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn escaped_context(ctx: &TemplateContext) -> TemplateContext {
    templates::VARIABLES
        .iter()
        .filter_map(|k| ctx.get(k).map(|v| (*k, escape_html(v))))
        .fold(TemplateContext::new(), |acc, (k, v)| acc.with(k, v))
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// Validate blocks before they are stored.
pub fn validate_blocks(blocks: &[Block]) -> Result<(), CoreError> {
    if blocks.is_empty() {
        return Err(CoreError::Validation(
            "An invitation template needs at least one block".into(),
        ));
    }
    if blocks.len() > MAX_BLOCKS {
        return Err(CoreError::Validation(format!(
            "An invitation template can have at most {MAX_BLOCKS} blocks"
        )));
    }

    for (i, block) in blocks.iter().enumerate() {
        match block {
            Block::Heading { level, .. } if !(1..=3).contains(level) => {
                return Err(CoreError::Validation(format!(
                    "Block {i}: heading level must be 1, 2 or 3"
                )));
            }
            Block::Image { url, .. } if !is_http_url(url) => {
                return Err(CoreError::Validation(format!(
                    "Block {i}: image URL must be http(s)"
                )));
            }
            Block::Location {
                map_url: Some(url),
            } if !is_http_url(url) => {
                return Err(CoreError::Validation(format!(
                    "Block {i}: map URL must be http(s)"
                )));
            }
            Block::Spacer { height } if *height > MAX_SPACER_HEIGHT => {
                return Err(CoreError::Validation(format!(
                    "Block {i}: spacer height must be at most {MAX_SPACER_HEIGHT}"
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Render blocks to an HTML fragment.
pub fn render_invitation(blocks: &[Block], ctx: &RenderContext<'_>) -> String {
    let vars = escaped_context(ctx.variables);
    let text = |t: &Localized| templates::render(&escape_html(localize(t, ctx.chain)), &vars);
    let var = |k: &str| vars.get(k).unwrap_or_default().to_string();

    let mut html = String::from("<div class=\"invitation\">");
    for block in blocks {
        match block {
            Block::Heading { text: t, level } => {
                let level = (*level).clamp(1, 3);
                html.push_str(&format!("<h{level}>{}</h{level}>", text(t)));
            }
            Block::Text { text: t } => {
                html.push_str(&format!("<p>{}</p>", text(t).replace('\n', "<br>")));
            }
            Block::Image { url, alt } => {
                html.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\">",
                    escape_html(url),
                    escape_html(alt.as_deref().unwrap_or_default())
                ));
            }
            Block::Divider => html.push_str("<hr>"),
            Block::Spacer { height } => {
                let height = (*height).min(MAX_SPACER_HEIGHT);
                html.push_str(&format!("<div style=\"height:{height}px\"></div>"));
            }
            Block::WeddingDetails => {
                html.push_str(&format!(
                    "<section class=\"details\"><h2>{}</h2><p>{} {}</p><p>{}</p></section>",
                    var("couple_names"),
                    var("wedding_date"),
                    var("wedding_time"),
                    var("location"),
                ));
            }
            Block::Location { map_url } => {
                html.push_str(&format!("<section class=\"location\"><p>{}</p>", var("location")));
                if let Some(url) = map_url {
                    html.push_str(&format!(
                        "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">Map</a>",
                        escape_html(url)
                    ));
                }
                html.push_str("</section>");
            }
            Block::Countdown => {
                if let Some(days) = ctx.days_until_wedding.filter(|d| *d >= 0) {
                    html.push_str(&format!(
                        "<div class=\"countdown\" data-days=\"{days}\">{days}</div>"
                    ));
                }
            }
            Block::RsvpButton { label } => {
                html.push_str(&format!(
                    "<a class=\"rsvp-button\" href=\"{}\">{}</a>",
                    var("rsvp_link"),
                    text(label)
                ));
            }
        }
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn localized(pairs: &[(&str, &str)]) -> Localized {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ctx() -> TemplateContext {
        TemplateContext::new()
            .with("couple_names", "Ana & Luis")
            .with("family_name", "<Smith>")
            .with("location", "Finca El Olivo")
            .with("rsvp_link", "https://vows.example/rsvp/abc")
    }

    #[test]
    fn blocks_deserialize_from_tagged_json() {
        let json = serde_json::json!([
            {"type": "heading", "text": {"en": "Hello"}, "level": 1},
            {"type": "divider"},
            {"type": "spacer", "height": 20},
            {"type": "rsvp_button", "label": {"en": "Reply"}}
        ]);
        let blocks: Vec<Block> = serde_json::from_value(json).unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1], Block::Divider);
    }

    #[test]
    fn localize_walks_chain_then_any() {
        let t = localized(&[("es", "Hola"), ("en", "Hello")]);
        assert_eq!(localize(&t, &[Language::Fr, Language::Es]), "Hola");
        assert_eq!(localize(&t, &[Language::De]), "Hello");
        assert_eq!(localize(&Localized::new(), &[Language::En]), "");
    }

    #[test]
    fn render_escapes_text_and_variables() {
        let blocks = vec![
            Block::Heading {
                text: localized(&[("en", "Dear {{family_name}} <3")]),
                level: 2,
            },
            Block::RsvpButton {
                label: localized(&[("en", "RSVP")]),
            },
        ];
        let vars = ctx();
        let html = render_invitation(
            &blocks,
            &RenderContext {
                variables: &vars,
                chain: &[Language::En],
                days_until_wedding: None,
            },
        );
        assert!(html.contains("<h2>Dear &lt;Smith&gt; &lt;3</h2>"));
        assert!(html.contains("href=\"https://vows.example/rsvp/abc\""));
        assert!(!html.contains("<Smith>"));
    }

    #[test]
    fn countdown_hidden_after_wedding() {
        let vars = ctx();
        let render = |days| {
            render_invitation(
                &[Block::Countdown],
                &RenderContext {
                    variables: &vars,
                    chain: &[Language::En],
                    days_until_wedding: days,
                },
            )
        };
        assert!(render(Some(12)).contains("data-days=\"12\""));
        assert!(!render(Some(-1)).contains("countdown"));
    }

    #[test]
    fn validation_rejects_bad_blocks() {
        assert!(validate_blocks(&[]).is_err());
        assert!(validate_blocks(&[Block::Heading {
            text: Localized::new(),
            level: 4
        }])
        .is_err());
        assert!(validate_blocks(&[Block::Image {
            url: "javascript:alert(1)".into(),
            alt: None
        }])
        .is_err());
        assert!(validate_blocks(&[Block::Spacer { height: 500 }]).is_err());
        assert!(validate_blocks(&[Block::Location {
            map_url: Some("https://maps.example/x".into())
        }])
        .is_ok());
    }
}
