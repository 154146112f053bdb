//! # Partner Directory
//!
//! The pipeline asks one question of the directory: is this key/password
//! pair an active partner? That question is the [`PartnerDirectory`] trait.
//! Where the answer comes from is an implementation detail of whoever
//! constructs the pipeline.
//!
//! [`InMemoryPartnerDirectory`] is the implementation the node ships with.
//! It holds a fixed set of credentials loaded once at startup, either the
//! built-in seed or a JSON file, and is never mutated afterwards. That makes
//! it safe to share across any number of concurrent evaluations.
//!
//! Implementations may block (a database, a remote service). Callers must
//! not hold a lock across [`PartnerDirectory::is_valid`].

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SEED_PARTNERS;
use crate::crypto::constant_time_eq;
use crate::message::REDACTED;

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Read-only lookup of partner credentials.
pub trait PartnerDirectory: Send + Sync {
    /// `true` when `partner_key` names an active partner whose password is
    /// exactly `partner_password`.
    fn is_valid(&self, partner_key: &str, partner_password: &str) -> bool;
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// One partner's credentials. Immutable after construction.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerCredential {
    /// Opaque identifier, only used in logs.
    pub id: u32,
    /// Public key the partner sends as `partnerkey`.
    #[serde(rename = "partnerkey")]
    pub partner_key: String,
    /// Shared secret the partner sends as `partnerpassword`.
    #[serde(rename = "partnerpassword")]
    pub partner_password: String,
}

impl PartnerCredential {
    pub fn new(id: u32, partner_key: impl Into<String>, partner_password: impl Into<String>) -> Self {
        Self {
            id,
            partner_key: partner_key.into(),
            partner_password: partner_password.into(),
        }
    }
}

// Keeps secrets out of `{:?}` output.
impl fmt::Debug for PartnerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartnerCredential")
            .field("id", &self.id)
            .field("partner_key", &self.partner_key)
            .field("partner_password", &REDACTED)
            .finish()
    }
}

/// Errors raised while building a directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The credentials file could not be read.
    #[error("failed to read partner file: {0}")]
    Io(#[from] std::io::Error),

    /// The credentials file is not a JSON array of partners.
    #[error("invalid partner file: {0}")]
    Json(#[from] serde_json::Error),

    /// Two entries share a partner key.
    #[error("duplicate partner key: {0}")]
    DuplicateKey(String),

    /// An entry has an empty key or password.
    #[error("partner {id} has an empty key or password")]
    EmptyCredential { id: u32 },
}

// ---------------------------------------------------------------------------
// In-memory directory
// ---------------------------------------------------------------------------

/// Fixed credential set held in memory for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct InMemoryPartnerDirectory {
    partners: Vec<PartnerCredential>,
}

impl InMemoryPartnerDirectory {
    /// Build a directory from explicit credentials.
    ///
    /// # Errors
    ///
    /// Rejects duplicate partner keys and empty keys or passwords; either
    /// would make lookups ambiguous or trivially satisfiable.
    pub fn new(partners: Vec<PartnerCredential>) -> Result<Self, DirectoryError> {
        let mut seen = HashSet::with_capacity(partners.len());
        for p in &partners {
            if p.partner_key.is_empty() || p.partner_password.is_empty() {
                return Err(DirectoryError::EmptyCredential { id: p.id });
            }
            if !seen.insert(p.partner_key.as_str()) {
                return Err(DirectoryError::DuplicateKey(p.partner_key.clone()));
            }
        }
        Ok(Self { partners })
    }

    /// The built-in seed set from [`SEED_PARTNERS`].
    pub fn seeded() -> Self {
        let partners = SEED_PARTNERS
            .iter()
            .map(|(id, key, password)| PartnerCredential::new(*id, *key, *password))
            .collect();
        Self { partners }
    }

    /// Parse a JSON array of `{ id, partnerkey, partnerpassword }`.
    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        let partners: Vec<PartnerCredential> = serde_json::from_str(json)?;
        Self::new(partners)
    }

    /// Load a JSON credentials file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let dir = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            partners = dir.len(),
            "partner directory loaded"
        );
        Ok(dir)
    }

    /// Number of partners known to this directory.
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}

impl Default for InMemoryPartnerDirectory {
    fn default() -> Self {
        Self::seeded()
    }
}

impl PartnerDirectory for InMemoryPartnerDirectory {
    fn is_valid(&self, partner_key: &str, partner_password: &str) -> bool {
        self.partners.iter().any(|p| {
            p.partner_key == partner_key
                && constant_time_eq(p.partner_password.as_bytes(), partner_password.as_bytes())
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn seeded_directory_accepts_known_pairs() {
        let dir = InMemoryPartnerDirectory::seeded();
        assert_eq!(dir.len(), 2);
        assert!(dir.is_valid("FAKEGOOGLE", "FAKEPASSWORD1234"));
        assert!(dir.is_valid("FAKEPEOPLE", "FAKEPASSWORD4578"));
    }

    #[test]
    fn rejects_crossed_credentials() {
        // Each password only opens its own key.
        let dir = InMemoryPartnerDirectory::seeded();
        assert!(!dir.is_valid("FAKEGOOGLE", "FAKEPASSWORD4578"));
        assert!(!dir.is_valid("FAKEPEOPLE", "FAKEPASSWORD1234"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let dir = InMemoryPartnerDirectory::seeded();
        assert!(!dir.is_valid("fakegoogle", "FAKEPASSWORD1234"));
        assert!(!dir.is_valid("FAKEGOOGLE", "fakepassword1234"));
    }

    #[test]
    fn rejects_unknown_and_empty() {
        let dir = InMemoryPartnerDirectory::seeded();
        assert!(!dir.is_valid("NOBODY", "FAKEPASSWORD1234"));
        assert!(!dir.is_valid("", ""));
    }

    #[test]
    fn new_rejects_duplicate_keys() {
        let err = InMemoryPartnerDirectory::new(vec![
            PartnerCredential::new(1, "A", "p1"),
            PartnerCredential::new(2, "A", "p2"),
        ])
        .unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateKey(k) if k == "A"));
    }

    #[test]
    fn new_rejects_empty_password() {
        let err =
            InMemoryPartnerDirectory::new(vec![PartnerCredential::new(7, "A", "")]).unwrap_err();
        assert!(matches!(err, DirectoryError::EmptyCredential { id: 7 }));
    }

    #[test]
    fn parses_json_wire_names() {
        let dir = InMemoryPartnerDirectory::from_json_str(
            r#"[{ "id": 9, "partnerkey": "ACME", "partnerpassword": "s3cret" }]"#,
        )
        .unwrap();
        assert_eq!(dir.len(), 1);
        assert!(dir.is_valid("ACME", "s3cret"));
        assert!(!dir.is_valid("FAKEGOOGLE", "FAKEPASSWORD1234"));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = InMemoryPartnerDirectory::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, DirectoryError::Json(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{ "id": 1, "partnerkey": "FILEKEY", "partnerpassword": "FILEPASS" }}]"#
        )
        .unwrap();

        let dir = InMemoryPartnerDirectory::load(file.path()).unwrap();
        assert!(dir.is_valid("FILEKEY", "FILEPASS"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = InMemoryPartnerDirectory::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, DirectoryError::Io(_)));
    }

    #[test]
    fn debug_output_hides_password() {
        let cred = PartnerCredential::new(1, "KEY", "hunter2");
        let out = format!("{:?}", cred);
        assert!(out.contains("KEY"));
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn usable_as_trait_object() {
        let dir: std::sync::Arc<dyn PartnerDirectory> =
            std::sync::Arc::new(InMemoryPartnerDirectory::default());
        assert!(dir.is_valid("FAKEGOOGLE", "FAKEPASSWORD1234"));
    }
}
