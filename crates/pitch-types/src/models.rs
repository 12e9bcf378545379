use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on the number of mockups attached to one proposal.
pub const MAX_MOCKUPS: usize = 5;

/// Upper bound on a mockup title, in UTF-16 code units (what browsers report
/// as a string's length).
pub const MAX_MOCKUP_TITLE_LEN: usize = 50;

/// Title given to a mockup synthesized from the legacy single-mockup column.
pub const LEGACY_MOCKUP_TITLE: &str = "Mockup";

/// A named raw-HTML fragment. The HTML is untrusted and is only ever served
/// through the isolated mockup document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mockup {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub html: String,
}

impl Mockup {
    pub fn new(title: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            html: html.into(),
        }
    }

    /// Wrap a legacy `mockup` column value as a one-element mockup list entry.
    pub fn from_legacy(html: impl Into<String>) -> Self {
        Self::new(LEGACY_MOCKUP_TITLE, html)
    }
}

/// A proposal as seen by authorized callers. The password hash is
/// deliberately not part of this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    pub title: String,
    pub markdown: String,
    pub mockups: Vec<Mockup>,
    /// RFC 3339 with millisecond precision, or the stored text verbatim
    /// when it is not a recognizable timestamp.
    pub created_at: String,
}

/// List projection: no content, no hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalSummary {
    pub id: String,
    pub title: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockupError {
    #[error("Maximum 5 mockups allowed (got {0})")]
    TooMany(usize),

    #[error("Each mockup must have a title and html content (mockup {index} is incomplete)")]
    MissingField { index: usize },

    #[error(
        "Mockup titles must be 50 characters or less, counted as UTF-16 code units (mockup {index} has {len})"
    )]
    TitleTooLong { index: usize, len: usize },
}

/// Check a full mockup list against the count and per-entry limits.
///
/// The first violation wins; callers validate before any write so a rejected
/// list is never partially persisted.
pub fn validate_mockups(mockups: &[Mockup]) -> Result<(), MockupError> {
    if mockups.len() > MAX_MOCKUPS {
        return Err(MockupError::TooMany(mockups.len()));
    }

    for (index, mockup) in mockups.iter().enumerate() {
        if mockup.title.is_empty() || mockup.html.is_empty() {
            return Err(MockupError::MissingField { index });
        }
        let len = mockup.title.encode_utf16().count();
        if len > MAX_MOCKUP_TITLE_LEN {
            return Err(MockupError::TitleTooLong { index, len });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mockups(n: usize) -> Vec<Mockup> {
        (0..n)
            .map(|i| Mockup::new(format!("V{}", i + 1), "<p>x</p>"))
            .collect()
    }

    #[test]
    fn accepts_zero_to_five() {
        for n in 0..=MAX_MOCKUPS {
            assert_eq!(validate_mockups(&mockups(n)), Ok(()));
        }
    }

    #[test]
    fn rejects_six() {
        assert_eq!(validate_mockups(&mockups(6)), Err(MockupError::TooMany(6)));
    }

    #[test]
    fn rejects_empty_title_or_html() {
        let no_title = vec![Mockup::new("", "<p>x</p>")];
        assert_eq!(
            validate_mockups(&no_title),
            Err(MockupError::MissingField { index: 0 })
        );

        let no_html = vec![Mockup::new("ok", "<p>x</p>"), Mockup::new("V2", "")];
        assert_eq!(
            validate_mockups(&no_html),
            Err(MockupError::MissingField { index: 1 })
        );
    }

    #[test]
    fn title_limit_counts_utf16_units() {
        let exact = vec![Mockup::new("a".repeat(50), "<p/>")];
        assert!(validate_mockups(&exact).is_ok());

        // Multi-byte but single-unit characters count once
        let wide = vec![Mockup::new("é".repeat(50), "<p/>")];
        assert!(validate_mockups(&wide).is_ok());

        // Astral characters are surrogate pairs: 25 fit, 26 do not
        let emoji = vec![Mockup::new("🚀".repeat(25), "<p/>")];
        assert!(validate_mockups(&emoji).is_ok());
        let emoji = vec![Mockup::new("🚀".repeat(26), "<p/>")];
        assert_eq!(
            validate_mockups(&emoji),
            Err(MockupError::TitleTooLong { index: 0, len: 52 })
        );

        let long = vec![Mockup::new("a".repeat(51), "<p/>")];
        assert_eq!(
            validate_mockups(&long),
            Err(MockupError::TitleTooLong { index: 0, len: 51 })
        );
    }

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let parsed: Vec<Mockup> = serde_json::from_str(r#"[{"title":"only"}]"#).unwrap();
        assert_eq!(parsed[0].html, "");
        assert!(validate_mockups(&parsed).is_err());
    }

    #[test]
    fn legacy_mockup_uses_default_title() {
        let m = Mockup::from_legacy("<h1>old</h1>");
        assert_eq!(m.title, "Mockup");
        assert_eq!(m.html, "<h1>old</h1>");
    }
}
