//! Supported languages, fallback chains, and localized date formatting.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
    Fr,
    It,
    De,
}

pub const DEFAULT_LANGUAGE: Language = Language::En;

impl Language {
    pub const ALL: [Self; 5] = [Self::En, Self::Es, Self::Fr, Self::It, Self::De];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::It => "it",
            Self::De => "de",
        }
    }

    /// Parse a language code. Region suffixes (`es-MX`, `en_GB`) are ignored.
    pub fn parse(code: &str) -> Result<Self, CoreError> {
        let base = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == base)
            .ok_or_else(|| CoreError::Validation(format!("Unsupported language '{code}'")))
    }

    /// Lenient variant of [`parse`](Self::parse) for stored values.
    pub fn parse_or_default(code: Option<&str>) -> Self {
        code.and_then(|c| Self::parse(c).ok())
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    fn month_names(&self) -> [&'static str; 12] {
        match self {
            Self::En => [
                "January", "February", "March", "April", "May", "June", "July", "August",
                "September", "October", "November", "December",
            ],
            Self::Es => [
                "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto",
                "septiembre", "octubre", "noviembre", "diciembre",
            ],
            Self::Fr => [
                "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août",
                "septembre", "octobre", "novembre", "décembre",
            ],
            Self::It => [
                "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio",
                "agosto", "settembre", "ottobre", "novembre", "dicembre",
            ],
            Self::De => [
                "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August",
                "September", "Oktober", "November", "Dezember",
            ],
        }
    }
}

/// Languages to try, in order, when looking up localized content.
///
/// Preferred language first, then the wedding default, then English. Duplicates
/// are removed.
pub fn fallback_chain(preferred: Option<Language>, wedding_default: Language) -> Vec<Language> {
    let mut chain = Vec::with_capacity(3);
    for lang in [preferred, Some(wedding_default), Some(DEFAULT_LANGUAGE)]
        .into_iter()
        .flatten()
    {
        if !chain.contains(&lang) {
            chain.push(lang);
        }
    }
    chain
}

/// Long-form date in the conventions of `lang`.
pub fn format_date(date: NaiveDate, lang: Language) -> String {
    let month = lang.month_names()[date.month0() as usize];
    let (day, year) = (date.day(), date.year());
    match lang {
        Language::En => format!("{month} {day}, {year}"),
        Language::Es => format!("{day} de {month} de {year}"),
        Language::Fr | Language::It => format!("{day} {month} {year}"),
        Language::De => format!("{day}. {month} {year}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_handles_regions_and_case() {
        assert_eq!(Language::parse("es-MX").unwrap(), Language::Es);
        assert_eq!(Language::parse("EN_gb").unwrap(), Language::En);
        assert!(Language::parse("pt").is_err());
        assert_eq!(Language::parse_or_default(Some("xx")), Language::En);
        assert_eq!(Language::parse_or_default(None), Language::En);
    }

    #[test]
    fn chain_is_deduplicated() {
        assert_eq!(
            fallback_chain(Some(Language::Fr), Language::Es),
            vec![Language::Fr, Language::Es, Language::En]
        );
        assert_eq!(
            fallback_chain(Some(Language::En), Language::En),
            vec![Language::En]
        );
        assert_eq!(
            fallback_chain(None, Language::It),
            vec![Language::It, Language::En]
        );
    }

    #[test]
    fn dates_are_localized() {
        let date = NaiveDate::from_ymd_opt(2026, 9, 12).unwrap();
        assert_eq!(format_date(date, Language::En), "September 12, 2026");
        assert_eq!(format_date(date, Language::Es), "12 de septiembre de 2026");
        assert_eq!(format_date(date, Language::De), "12. September 2026");
        assert_eq!(format_date(date, Language::Fr), "12 septembre 2026");
    }
}
