//! Database row types: these map directly to SQLite rows.
//! Distinct from pitch-types models to keep the DB layer's legacy quirks
//! (nullable columns, two mockup columns) out of the domain types.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use tracing::warn;

use pitch_types::models::{Mockup, Proposal, ProposalSummary};

/// Every column of a `proposals` row. Columns are nullable because rows
/// written by older releases may leave any of them empty.
#[derive(Debug, Clone, Default)]
pub struct ProposalRow {
    pub id: String,
    pub title: Option<String>,
    pub markdown: Option<String>,
    pub mockup: Option<String>,
    pub mockups: Option<String>,
    pub password_hash: Option<String>,
    pub created_at: Option<String>,
}

pub const PROPOSAL_COLUMNS: &str =
    "id, title, markdown, mockup, mockups, passwordHash, createdAt";

impl ProposalRow {
    /// Decode a row selected with `PROPOSAL_COLUMNS`.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            markdown: row.get(2)?,
            mockup: row.get(3)?,
            mockups: row.get(4)?,
            password_hash: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    /// Resolve the mockup list from the canonical array column, falling back
    /// to the legacy single-mockup column. Never fails: undecodable content
    /// degrades to the legacy value or to no mockups.
    pub fn decode_mockups(&self) -> Vec<Mockup> {
        let legacy = self
            .mockup
            .as_deref()
            .filter(|html| !html.is_empty())
            .map(|html| vec![Mockup::from_legacy(html)]);

        match self.mockups.as_deref().map(str::trim) {
            Some(encoded) if !encoded.is_empty() => {
                match serde_json::from_str::<Vec<Mockup>>(encoded) {
                    Ok(mockups) => mockups,
                    Err(e) => {
                        warn!("Undecodable mockups on proposal '{}': {}", self.id, e);
                        legacy.unwrap_or_default()
                    }
                }
            }
            _ => legacy.unwrap_or_default(),
        }
    }

    /// Split into the domain view and the stored password hash.
    pub fn into_parts(self) -> (Proposal, String) {
        let mockups = self.decode_mockups();
        let created_at = parse_timestamp(self.created_at.as_deref(), &self.id);
        let proposal = Proposal {
            id: self.id,
            title: self.title.unwrap_or_default(),
            markdown: self.markdown.unwrap_or_default(),
            mockups,
            created_at,
        };
        (proposal, self.password_hash.unwrap_or_default())
    }

    pub fn into_proposal(self) -> Proposal {
        self.into_parts().0
    }
}

pub struct ProposalSummaryRow {
    pub id: String,
    pub title: Option<String>,
    pub created_at: Option<String>,
}

impl ProposalSummaryRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            created_at: row.get(2)?,
        })
    }

    pub fn into_summary(self) -> ProposalSummary {
        let created_at = parse_timestamp(self.created_at.as_deref(), &self.id);
        ProposalSummary {
            id: self.id,
            title: self.title.unwrap_or_default(),
            created_at,
        }
    }
}

/// Timestamps are stored as RFC 3339 strings. SQLite's own
/// "YYYY-MM-DD HH:MM:SS" form is accepted too; both come back as RFC 3339
/// with millisecond precision. Anything else is returned verbatim, so the
/// value shown matches the text the list query sorts on.
fn parse_timestamp(raw: Option<&str>, id: &str) -> String {
    let Some(raw) = raw else {
        warn!("Missing createdAt on proposal '{}'", id);
        return String::new();
    };
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|e| {
            warn!("Unrecognized createdAt '{}' on proposal '{}': {}", raw, id, e);
            raw.to_string()
        })
}
