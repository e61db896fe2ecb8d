//! Guest-list CSV export and import.
//!
//! One row per family member; family columns repeat on every row. A family
//! with no members is exported as a single row with empty member columns.
//! Every row carries a `family_key` naming its family within the file, so two
//! households with the same name stay apart. Hand-written files may leave the
//! key out; rows then group by family name. Either way families keep their
//! first-appearance order and an export re-imports to the same records.

use serde::{Deserialize, Serialize};

use crate::channels::Channel;
use crate::error::CoreError;
use crate::i18n::Language;
use crate::rsvp::MemberType;

pub const HEADER: [&str; 11] = [
    "family_key",
    "family_name",
    "email",
    "phone",
    "whatsapp",
    "language",
    "channel",
    "member_name",
    "member_type",
    "age",
    "dietary_restrictions",
];

/// Largest import accepted, in data rows.
pub const MAX_IMPORT_ROWS: usize = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub name: String,
    pub member_type: MemberType,
    pub age: Option<i32>,
    pub dietary_restrictions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyRecord {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub language: Language,
    pub channel: Option<Channel>,
    pub members: Vec<MemberRecord>,
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Escape a value for CSV: wrap in quotes if it contains comma, quote, or newline.
fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

/// Build the CSV text for a guest list, header included.
pub fn export_guests(families: &[FamilyRecord]) -> String {
    let mut lines = Vec::with_capacity(families.len() * 2 + 1);
    lines.push(HEADER.join(","));

    for (index, family) in families.iter().enumerate() {
        let key = (index + 1).to_string();
        let family_cols = [
            key.as_str(),
            family.name.as_str(),
            opt(&family.email),
            opt(&family.phone),
            opt(&family.whatsapp),
            family.language.as_str(),
            family.channel.map(|c| c.as_str()).unwrap_or_default(),
        ];
        let prefix: Vec<String> = family_cols.iter().map(|v| csv_escape(v)).collect();

        if family.members.is_empty() {
            lines.push(format!("{},,,,", prefix.join(",")));
            continue;
        }
        for member in &family.members {
            let age = member.age.map(|a| a.to_string()).unwrap_or_default();
            let member_cols = [
                csv_escape(&member.name),
                member.member_type.as_str().to_string(),
                age,
                csv_escape(opt(&member.dietary_restrictions)),
            ];
            lines.push(format!("{},{}", prefix.join(","), member_cols.join(",")));
        }
    }

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Split CSV text into records, honouring quoted fields.
fn split_records(text: &str) -> Result<Vec<Vec<String>>, CoreError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CoreError::Validation("Unterminated quoted field".into()));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    // Drop blank lines.
    records.retain(|r| !(r.len() == 1 && r[0].trim().is_empty()));
    Ok(records)
}

// Column positions in `HEADER`.
const COL_KEY: usize = 0;
const COL_EMAIL: usize = 2;
const COL_PHONE: usize = 3;
const COL_WHATSAPP: usize = 4;
const COL_LANGUAGE: usize = 5;
const COL_CHANNEL: usize = 6;
const COL_MEMBER_NAME: usize = 7;
const COL_MEMBER_TYPE: usize = 8;
const COL_AGE: usize = 9;
const COL_DIETARY: usize = 10;

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse a guest-list CSV into families.
///
/// The header row is required and columns are matched by name, so extra or
/// reordered columns are fine. Errors name the 1-based line.
pub fn parse_guests(text: &str) -> Result<Vec<FamilyRecord>, CoreError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = split_records(text)?.into_iter();

    let header = records
        .next()
        .ok_or_else(|| CoreError::Validation("CSV is empty".into()))?;
    let column = |name: &str| header.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    let family_col = column("family_name")
        .ok_or_else(|| CoreError::Validation("Missing required column 'family_name'".into()))?;
    let cols: Vec<Option<usize>> = HEADER.iter().map(|&h| column(h)).collect();

    let mut families: Vec<FamilyRecord> = Vec::new();
    // Grouping key of each entry in `families`.
    let mut keys: Vec<String> = Vec::new();
    for (i, row) in records.enumerate() {
        let line = i + 2;
        if i >= MAX_IMPORT_ROWS {
            return Err(CoreError::Validation(format!(
                "CSV has more than {MAX_IMPORT_ROWS} rows"
            )));
        }
        let cell = |idx: usize| {
            cols[idx]
                .and_then(|c| row.get(c))
                .map(String::as_str)
                .unwrap_or_default()
        };

        let family_name = row.get(family_col).map(|s| s.trim()).unwrap_or_default();
        if family_name.is_empty() {
            return Err(CoreError::Validation(format!(
                "Line {line}: family_name is required"
            )));
        }

        let key = match non_empty(cell(COL_KEY)) {
            Some(key) => format!("key:{key}"),
            None => format!("name:{family_name}"),
        };
        let family_idx = match keys.iter().position(|k| *k == key) {
            Some(idx) => {
                if families[idx].name != family_name {
                    return Err(CoreError::Validation(format!(
                        "Line {line}: family_key is already used by '{}'",
                        families[idx].name
                    )));
                }
                idx
            }
            None => {
                let language = match non_empty(cell(COL_LANGUAGE)) {
                    Some(code) => Language::parse(&code)
                        .map_err(|e| CoreError::Validation(format!("Line {line}: {e}")))?,
                    None => Language::En,
                };
                let channel = non_empty(cell(COL_CHANNEL))
                    .map(|c| Channel::from_str_db(&c))
                    .transpose()
                    .map_err(|e| CoreError::Validation(format!("Line {line}: {e}")))?;
                families.push(FamilyRecord {
                    name: family_name.to_string(),
                    email: non_empty(cell(COL_EMAIL)),
                    phone: non_empty(cell(COL_PHONE)),
                    whatsapp: non_empty(cell(COL_WHATSAPP)),
                    language,
                    channel,
                    members: Vec::new(),
                });
                keys.push(key);
                families.len() - 1
            }
        };

        let Some(member_name) = non_empty(cell(COL_MEMBER_NAME)) else {
            continue;
        };
        let member_type = match non_empty(cell(COL_MEMBER_TYPE)) {
            Some(t) => MemberType::from_str_db(&t)
                .map_err(|e| CoreError::Validation(format!("Line {line}: {e}")))?,
            None => MemberType::Adult,
        };
        let age = non_empty(cell(COL_AGE))
            .map(|a| a.parse::<i32>())
            .transpose()
            .map_err(|_| CoreError::Validation(format!("Line {line}: age must be a number")))?;

        families[family_idx].members.push(MemberRecord {
            name: member_name,
            member_type,
            age,
            dietary_restrictions: non_empty(cell(COL_DIETARY)),
        });
    }

    Ok(families)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<FamilyRecord> {
        vec![
            FamilyRecord {
                name: "García, López".into(),
                email: Some("garcia@example.com".into()),
                phone: Some("+34600111222".into()),
                whatsapp: None,
                language: Language::Es,
                channel: Some(Channel::Whatsapp),
                members: vec![
                    MemberRecord {
                        name: "María \"Mari\" García".into(),
                        member_type: MemberType::Adult,
                        age: None,
                        dietary_restrictions: Some("vegetarian, no nuts".into()),
                    },
                    MemberRecord {
                        name: "Pablo".into(),
                        member_type: MemberType::Child,
                        age: Some(6),
                        dietary_restrictions: None,
                    },
                ],
            },
            FamilyRecord {
                name: "Smith".into(),
                email: None,
                phone: None,
                whatsapp: None,
                language: Language::En,
                channel: None,
                members: vec![],
            },
        ]
    }

    #[test]
    fn export_then_import_reproduces_families() {
        let families = sample();
        let csv = export_guests(&families);
        let parsed = parse_guests(&csv).unwrap();
        assert_eq!(parsed, families);
    }

    #[test]
    fn export_quotes_special_values() {
        let csv = export_guests(&sample());
        assert!(csv.starts_with("family_key,family_name,email,"));
        assert!(csv.contains("\"García, López\""));
        assert!(csv.contains("\"María \"\"Mari\"\" García\""));
    }

    fn household(name: &str, email: &str, member: &str) -> FamilyRecord {
        FamilyRecord {
            name: name.into(),
            email: Some(email.into()),
            phone: None,
            whatsapp: None,
            language: Language::En,
            channel: None,
            members: vec![MemberRecord {
                name: member.into(),
                member_type: MemberType::Adult,
                age: None,
                dietary_restrictions: None,
            }],
        }
    }

    #[test]
    fn families_sharing_a_name_stay_apart() {
        let families = vec![
            household("Smith", "a@example.com", "Ann"),
            household("Smith", "b@example.com", "Bob"),
        ];
        let parsed = parse_guests(&export_guests(&families)).unwrap();
        assert_eq!(parsed, families);
    }

    #[test]
    fn key_reused_for_another_name_is_rejected() {
        let csv = "family_key,family_name,member_name\n1,Smith,Ann\n1,Jones,Bob\n";
        let err = parse_guests(csv).unwrap_err();
        assert!(err.to_string().contains("Line 3"));
    }

    #[test]
    fn import_accepts_reordered_columns_and_defaults() {
        let csv = "member_name,family_name\r\nAna,Pérez\r\nLuis,Pérez\r\n\r\n";
        let parsed = parse_guests(csv).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].members.len(), 2);
        assert_eq!(parsed[0].language, Language::En);
        assert_eq!(parsed[0].members[1].member_type, MemberType::Adult);
    }

    #[test]
    fn import_reports_line_numbers() {
        let csv = "family_name,member_name,age\nPérez,Ana,abc\n";
        let err = parse_guests(csv).unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn import_requires_family_column() {
        assert!(parse_guests("name,email\nx,y\n").is_err());
        assert!(parse_guests("").is_err());
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert!(parse_guests("family_name\n\"Open").is_err());
    }

    #[test]
    fn quoted_newlines_survive() {
        let csv = "family_name,member_name,dietary_restrictions\nA,B,\"line one\nline two\"\n";
        let parsed = parse_guests(csv).unwrap();
        assert_eq!(
            parsed[0].members[0].dietary_restrictions.as_deref(),
            Some("line one\nline two")
        );
    }
}
