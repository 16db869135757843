//! Flat-file roster store contract and JSON implementation.
//!
//! # Responsibility
//! - Persist a full roster snapshot to a single file.
//! - Keep file layout details out of the service facade.
//!
//! # Invariants
//! - `write_all` replaces the whole file (overwrite semantics).
//! - A missing file reads as an empty roster, not an error.
//! - Records are validated on both read and write paths.

use crate::model::employee::EmployeeRecord;
use crate::repo::employee_store::RepoResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Flat-file persistence contract the payroll facade delegates to.
pub trait RosterFile {
    /// Returns the full parsed roster snapshot.
    fn read_all(&self) -> RepoResult<Vec<EmployeeRecord>>;
    /// Overwrites the file with the given roster.
    fn write_all(&self, roster: &[EmployeeRecord]) -> RepoResult<()>;
    /// Returns the number of stored records.
    fn count(&self) -> RepoResult<usize>;
}

/// Roster store backed by a JSON array on disk.
pub struct JsonRosterFile {
    path: PathBuf,
}

impl JsonRosterFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RosterFile for JsonRosterFile {
    fn read_all(&self) -> RepoResult<Vec<EmployeeRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let roster: Vec<EmployeeRecord> = serde_json::from_str(&content)?;
        for record in &roster {
            record.validate()?;
        }

        Ok(roster)
    }

    fn write_all(&self, roster: &[EmployeeRecord]) -> RepoResult<()> {
        for record in roster {
            record.validate()?;
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(roster)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn count(&self) -> RepoResult<usize> {
        Ok(self.read_all()?.len())
    }
}
