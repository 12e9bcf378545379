use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use pitch_types::models::{Mockup, MockupError, Proposal, ProposalSummary, validate_mockups};

use crate::Database;
use crate::OptionalExt;
use crate::models::{PROPOSAL_COLUMNS, ProposalRow, ProposalSummaryRow};

/// Length of a proposal id, in hex characters.
pub const ID_LEN: usize = 8;

const MAX_ID_ATTEMPTS: usize = 8;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] MockupError),

    #[error("proposal not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Store(#[from] anyhow::Error),
}

pub type RepoResult<T> = std::result::Result<T, RepoError>;

/// Input to `create_proposal`. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub title: String,
    pub markdown: String,
    pub mockups: Vec<Mockup>,
    pub password_hash: String,
}

/// Proposal CRUD. Callers are expected to have checked credentials already.
impl Database {
    /// Validate and insert a proposal, returning its new id.
    pub fn create_proposal(&self, new: &NewProposal) -> RepoResult<String> {
        validate_mockups(&new.mockups)?;
        let encoded = encode_mockups(&new.mockups)?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let id = self.with_conn_mut(|conn| {
            // Existence check and insert in one transaction so a colliding id
            // is never handed out twice.
            let tx = conn.transaction()?;
            for _ in 0..MAX_ID_ATTEMPTS {
                let id = generate_id();
                let taken = tx
                    .query_row("SELECT 1 FROM proposals WHERE id = ?1", [&id], |_| Ok(()))
                    .optional()?
                    .is_some();
                if taken {
                    continue;
                }

                tx.execute(
                    "INSERT INTO proposals (id, title, markdown, mockup, mockups, passwordHash, createdAt)
                     VALUES (?1, ?2, ?3, '', ?4, ?5, ?6)",
                    rusqlite::params![
                        &id,
                        &new.title,
                        &new.markdown,
                        &encoded,
                        &new.password_hash,
                        &created_at
                    ],
                )?;
                tx.commit()?;
                return Ok(id);
            }
            Err(anyhow::anyhow!(
                "no free proposal id after {} attempts",
                MAX_ID_ATTEMPTS
            ))
        })?;

        info!("Proposal {} created with {} mockups", id, new.mockups.len());
        Ok(id)
    }

    pub fn get_proposal(&self, id: &str) -> RepoResult<Proposal> {
        Ok(self.fetch_row(id)?.into_proposal())
    }

    /// The proposal together with its stored password hash, for the reader
    /// flows that must verify a password before revealing content.
    pub fn get_proposal_with_hash(&self, id: &str) -> RepoResult<(Proposal, String)> {
        Ok(self.fetch_row(id)?.into_parts())
    }

    /// Replace title, markdown and the whole mockup list. The password hash
    /// and creation time are never touched.
    pub fn update_proposal(
        &self,
        id: &str,
        title: &str,
        markdown: &str,
        mockups: &[Mockup],
    ) -> RepoResult<()> {
        validate_mockups(mockups)?;
        let encoded = encode_mockups(mockups)?;

        let changed = self.run(
            "UPDATE proposals SET title = ?1, markdown = ?2, mockups = ?3 WHERE id = ?4",
            (title, markdown, &encoded, id),
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound);
        }

        info!("Proposal {} updated ({} mockups)", id, mockups.len());
        Ok(())
    }

    pub fn delete_proposal(&self, id: &str) -> RepoResult<()> {
        let changed = self.with_conn(|conn| {
            let exists = conn
                .query_row("SELECT 1 FROM proposals WHERE id = ?1", [id], |_| Ok(()))
                .optional()?
                .is_some();
            if !exists {
                return Ok(0);
            }
            Ok(conn.execute("DELETE FROM proposals WHERE id = ?1", [id])?)
        })?;

        // Absent id and a delete that matched nothing look the same to callers.
        if changed == 0 {
            return Err(RepoError::NotFound);
        }

        info!("Proposal {} deleted", id);
        Ok(())
    }

    /// Newest first. Only id, title and timestamp are read.
    pub fn list_proposals(&self) -> RepoResult<Vec<ProposalSummary>> {
        let rows = self.list(
            "SELECT id, title, createdAt FROM proposals ORDER BY createdAt DESC",
            [],
            ProposalSummaryRow::from_row,
        )?;
        Ok(rows.into_iter().map(ProposalSummaryRow::into_summary).collect())
    }

    fn fetch_row(&self, id: &str) -> RepoResult<ProposalRow> {
        self.get(
            &format!("SELECT {} FROM proposals WHERE id = ?1", PROPOSAL_COLUMNS),
            [id],
            ProposalRow::from_row,
        )?
        .ok_or(RepoError::NotFound)
    }
}

fn encode_mockups(mockups: &[Mockup]) -> anyhow::Result<String> {
    Ok(serde_json::to_string(mockups)?)
}

/// Eight lowercase hex characters from a random UUID.
fn generate_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}
