//! Built-in invitation themes.
//!
//! These are the system themes seeded into the `themes` table. Seeding upserts
//! on `key`, so running it repeatedly converges on this list.

use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Serialize)]
pub struct ThemeDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub config: serde_json::Value,
}

fn palette(primary: &str, secondary: &str, background: &str, text: &str, heading_font: &str, body_font: &str) -> serde_json::Value {
    json!({
        "colors": {
            "primary": primary,
            "secondary": secondary,
            "background": background,
            "text": text,
        },
        "fonts": {
            "heading": heading_font,
            "body": body_font,
        },
    })
}

/// The system themes, in display order.
pub fn system_themes() -> Vec<ThemeDefinition> {
    vec![
        ThemeDefinition {
            key: "classic",
            name: "Classic",
            config: palette("#8b6f47", "#d4c4a8", "#fffdf8", "#2d2a26", "Playfair Display", "Lato"),
        },
        ThemeDefinition {
            key: "garden",
            name: "Garden",
            config: palette("#5b7b4a", "#c8d8b9", "#f8fbf4", "#263021", "Cormorant Garamond", "Nunito"),
        },
        ThemeDefinition {
            key: "modern",
            name: "Modern",
            config: palette("#111111", "#bdbdbd", "#ffffff", "#111111", "Montserrat", "Inter"),
        },
        ThemeDefinition {
            key: "rustic",
            name: "Rustic",
            config: palette("#9c5a2e", "#e0c9a6", "#fbf6ee", "#3b2a1e", "Amatic SC", "Merriweather"),
        },
        ThemeDefinition {
            key: "beach",
            name: "Beach",
            config: palette("#1f7a8c", "#bfdbf7", "#f7fbff", "#022b3a", "Dancing Script", "Open Sans"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn system_theme_keys_are_unique() {
        let themes = system_themes();
        let keys: HashSet<&str> = themes.iter().map(|t| t.key).collect();
        assert_eq!(keys.len(), themes.len());
    }

    #[test]
    fn every_theme_has_colors_and_fonts() {
        for theme in system_themes() {
            assert!(theme.config["colors"]["primary"].is_string(), "{}", theme.key);
            assert!(theme.config["fonts"]["body"].is_string(), "{}", theme.key);
        }
    }
}
