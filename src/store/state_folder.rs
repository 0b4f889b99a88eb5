// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bridge::{Artifact, ArtifactSink};
use crate::model::history::VersionLog;
use crate::model::ids::CellId;
use crate::model::library::{NodeLibrary, SavedCell};

pub const HISTORY_FILENAME: &str = "diagram-history.json";
pub const LIBRARY_FILENAME: &str = "saved-nodes.json";
pub const EXPORTS_DIRNAME: &str = "exports";

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidFileName {
        name: String,
    },
    SymlinkRefused {
        path: PathBuf,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::Corrupt { path, source } => {
                write!(f, "stored blob at {path:?} is unreadable: {source}")
            }
            Self::InvalidFileName { name } => write!(f, "invalid export file name: {name:?}"),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Corrupt { source, .. } => Some(source),
            Self::InvalidFileName { .. } => None,
            Self::SymlinkRefused { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Also flushes file contents and the rename to stable storage where the platform allows.
    Durable,
}

/// Folder holding the persisted history and node library, plus downloaded exports.
///
/// Layout:
/// - `diagram-history.json`: `[{ "svg": ..., "xml": ... }]`, oldest first
/// - `saved-nodes.json`: `[{ "id", "name", "xml", "savedAt" }]`
/// - `exports/`: artifacts written through [`ArtifactSink`]
#[derive(Debug, Clone)]
pub struct StateFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl StateFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn history_path(&self) -> PathBuf {
        self.root.join(HISTORY_FILENAME)
    }

    pub fn library_path(&self) -> PathBuf {
        self.root.join(LIBRARY_FILENAME)
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.root.join(EXPORTS_DIRNAME)
    }

    /// Loads the version log. A missing file is an empty log.
    pub fn load_history(&self, capacity: usize) -> Result<VersionLog, StoreError> {
        let path = self.history_path();
        let Some(entries) = read_json::<Vec<HistoryEntryJson>>(&path)? else {
            return Ok(VersionLog::new(capacity));
        };
        Ok(history_from_json(capacity, entries))
    }

    /// Like [`Self::load_history`], but an unreadable blob is logged and read as empty.
    pub fn load_history_lenient(&self, capacity: usize) -> VersionLog {
        self.load_history(capacity).unwrap_or_else(|err| {
            tracing::warn!(%err, "discarding unreadable diagram history");
            VersionLog::new(capacity)
        })
    }

    pub fn save_history(&self, history: &VersionLog) -> Result<(), StoreError> {
        write_json(
            &self.root,
            &self.history_path(),
            &history_to_json(history),
            self.durability,
        )
    }

    /// Loads the node library. A missing file is an empty library.
    pub fn load_library(&self) -> Result<NodeLibrary, StoreError> {
        let path = self.library_path();
        let Some(entries) = read_json::<Vec<SavedNodeJson>>(&path)? else {
            return Ok(NodeLibrary::new());
        };
        Ok(library_from_json(entries))
    }

    pub fn load_library_lenient(&self) -> NodeLibrary {
        self.load_library().unwrap_or_else(|err| {
            tracing::warn!(%err, "discarding unreadable node library");
            NodeLibrary::new()
        })
    }

    pub fn save_library(&self, library: &NodeLibrary) -> Result<(), StoreError> {
        write_json(
            &self.root,
            &self.library_path(),
            &library_to_json(library),
            self.durability,
        )
    }

    /// Writes a downloaded artifact into `exports/`; returns the written path.
    pub fn write_export(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        validate_file_name(file_name)?;
        let path = self.exports_dir().join(file_name);
        write_atomic(&self.root, &path, bytes, self.durability)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote export");
        Ok(path)
    }
}

impl ArtifactSink for StateFolder {
    fn deliver(
        &mut self,
        artifact: Artifact,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write_export(&artifact.file_name, &artifact.bytes)?;
        Ok(())
    }
}

// JSON conversion and safe filesystem writes for `StateFolder`.
include!("state_folder/helpers.rs");

#[cfg(test)]
mod tests;
