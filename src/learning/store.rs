//! Append-only feedback log
//!
//! One JSON document per log: `{ "version": 1, "entries": [...] }`. Every
//! append rewrites the document to a sibling temp file and renames it over
//! the original, so readers never observe a half-written log.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use super::FeedbackRecord;
use crate::constants::learning::LOG_VERSION;
use crate::types::{ArchError, Result, ResultExt};

#[derive(Debug, Serialize, Deserialize)]
struct LogDocument {
    version: u32,
    #[serde(default)]
    entries: Vec<FeedbackRecord>,
}

impl Default for LogDocument {
    fn default() -> Self {
        Self {
            version: LOG_VERSION,
            entries: Vec::new(),
        }
    }
}

/// File-backed feedback log with a single guarded writer
#[derive(Debug)]
pub struct FeedbackLog {
    path: PathBuf,
    document: Mutex<LogDocument>,
}

impl FeedbackLog {
    /// Open the log at `path`, loading existing entries. A missing or empty
    /// file starts an empty log; the file is created on first append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => LogDocument::default(),
            Ok(text) => {
                let document: LogDocument = serde_json::from_str(&text)
                    .with_context(format!("Corrupt feedback log {}", path.display()))?;
                if document.version > LOG_VERSION {
                    return Err(ArchError::Storage(format!(
                        "Feedback log {} has unsupported version {}",
                        path.display(),
                        document.version
                    )));
                }
                document
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LogDocument::default(),
            Err(e) => return Err(e.into()),
        };

        info!(
            path = %path.display(),
            entries = document.entries.len(),
            "Feedback log opened"
        );
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, LogDocument>> {
        self.document
            .lock()
            .map_err(|_| ArchError::Storage("Feedback log lock poisoned".to_string()))
    }

    /// Append one record and persist. Returns the new entry count.
    ///
    /// The in-memory log only grows after the file write succeeds.
    pub fn append(&self, record: FeedbackRecord) -> Result<usize> {
        let mut document = self.lock()?;
        document.entries.push(record);

        if let Err(e) = self.persist(&document) {
            document.entries.pop();
            return Err(e);
        }

        debug!(path = %self.path.display(), entries = document.entries.len(), "Feedback appended");
        Ok(document.entries.len())
    }

    fn persist(&self, document: &LogDocument) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(document)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path).with_context("Failed to replace feedback log")?;
        Ok(())
    }

    /// All records in insertion order
    pub fn entries(&self) -> Result<Vec<FeedbackRecord>> {
        Ok(self.lock()?.entries.clone())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
