use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::SyncError;

static NON_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").expect("non-identifier regex must compile"));
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex must compile"));
static WORD_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9_]").expect("word regex must compile"));

/// Non-fatal decode anomalies surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Warning {
    /// Headings that are blank, start with a digit, or have no word characters.
    BadHeadings { headings: Vec<String> },
    /// Bad headings were found while the data block was auto-detected.
    RangeNotProvided,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::BadHeadings { headings } => {
                write!(f, "malformed headings: ")?;
                for (i, h) in headings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{h:?}")?;
                }
                Ok(())
            }
            Warning::RangeNotProvided => f.write_str(
                "data block was auto-detected; pass a range if the sheet holds more than one table",
            ),
        }
    }
}

/// Raw headings with their (optional) identifier-safe forms.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Headings {
    pub raw: Vec<String>,
    pub normalized: Option<Vec<String>>,
    pub warnings: Vec<Warning>,
}

impl Headings {
    /// Keys used for records: normalized names when present, raw otherwise.
    pub fn keys(&self) -> &[String] {
        self.normalized.as_deref().unwrap_or(&self.raw)
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

pub fn is_bad_heading(heading: &str) -> bool {
    let trimmed = heading.trim();
    trimmed.is_empty()
        || trimmed.starts_with(|c: char| c.is_ascii_digit())
        || !WORD_CHAR.is_match(trimmed)
}

/// Turn a heading into an identifier-safe key: `"Día de pago"` → `"dia_de_pago"`.
pub fn idify(heading: &str) -> String {
    let stripped: String = heading.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let kept = NON_IDENT.replace_all(&stripped, "");
    WHITESPACE
        .replace_all(kept.trim(), "-")
        .to_lowercase()
        .replace('-', "_")
}

/// Validate headings and, if asked, derive identifier-safe keys.
///
/// Two non-blank headings that end up with the same key are rejected.
pub fn normalize_headings(
    raw: Vec<String>,
    transform: bool,
    range_provided: bool,
) -> Result<Headings, SyncError> {
    let bad: Vec<String> = raw.iter().filter(|h| is_bad_heading(h)).cloned().collect();

    let mut warnings = Vec::new();
    if !bad.is_empty() {
        #[cfg(feature = "tracing")]
        tracing::warn!(headings = ?bad, range_provided, "malformed headings");

        warnings.push(Warning::BadHeadings { headings: bad });
        if !range_provided {
            warnings.push(Warning::RangeNotProvided);
        }
    }

    let normalized = transform.then(|| raw.iter().map(|h| idify(h)).collect::<Vec<_>>());
    let headings = Headings {
        raw,
        normalized,
        warnings,
    };

    let mut seen = HashSet::new();
    for (key, raw) in headings.keys().iter().zip(&headings.raw) {
        if key.trim().is_empty() {
            continue;
        }
        if !seen.insert(key.as_str()) {
            return Err(SyncError::schema(format!(
                "heading {raw:?} collides with another heading on key {key:?}"
            )));
        }
    }

    Ok(headings)
}
