// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, Utc};

use super::document::Document;
use super::history::{Version, VersionLog, DEFAULT_HISTORY_CAPACITY};
use super::library::{NodeLibrary, SavedCell};
use crate::config::EngineConfig;
use crate::format::drawio::MalformedDocument;
use crate::store::{StateFolder, StoreError};

/// The single owner of the live diagram, its history, and the node library.
///
/// Every mutation goes through this API. When a [`StateFolder`] is attached, history and library
/// changes are written through before the call returns; the in-memory change is kept even if
/// the write fails.
#[derive(Debug, Clone)]
pub struct Session {
    document_text: String,
    document: Option<Document>,
    latest_preview: Option<String>,
    history: VersionLog,
    library: NodeLibrary,
    folder: Option<StateFolder>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl Session {
    /// In-memory session starting from the empty diagram.
    pub fn new(history_capacity: usize) -> Self {
        let document = Document::empty();
        Self {
            document_text: document.to_xml(),
            document: Some(document),
            latest_preview: None,
            history: VersionLog::new(history_capacity),
            library: NodeLibrary::new(),
            folder: None,
        }
    }

    /// Session backed by `folder`. Unreadable blobs are logged and start empty.
    pub fn open(folder: StateFolder, history_capacity: usize) -> Self {
        let mut session = Self::new(history_capacity);
        session.history = folder.load_history_lenient(history_capacity);
        session.library = folder.load_library_lenient();
        tracing::debug!(
            root = %folder.root().display(),
            versions = session.history.len(),
            saved_nodes = session.library.len(),
            "opened state folder"
        );
        session.folder = Some(folder);
        session
    }

    pub fn from_config(config: &EngineConfig, folder: Option<StateFolder>) -> Self {
        match folder {
            Some(folder) => Self::open(
                folder.with_durability(config.durability),
                config.history_capacity,
            ),
            None => Self::new(config.history_capacity),
        }
    }

    /// The live document, or `None` while the live text is an opaque (unparseable) payload.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn document_text(&self) -> &str {
        &self.document_text
    }

    pub fn latest_preview(&self) -> Option<&str> {
        self.latest_preview.as_deref()
    }

    pub fn history(&self) -> &VersionLog {
        &self.history
    }

    pub fn library(&self) -> &NodeLibrary {
        &self.library
    }

    pub fn folder(&self) -> Option<&StateFolder> {
        self.folder.as_ref()
    }

    pub fn set_document(&mut self, document: Document) {
        self.document_text = document.to_xml();
        self.document = Some(document);
    }

    /// Back to the empty diagram. History and library are untouched.
    pub fn reset_document(&mut self) {
        self.set_document(Document::empty());
        self.latest_preview = None;
    }

    /// Replaces the live text. On a parse failure the text is still kept, as an opaque blob.
    pub fn set_document_text(&mut self, text: impl Into<String>) -> Result<(), MalformedDocument> {
        self.document_text = text.into();
        match Document::parse(&self.document_text) {
            Ok(document) => {
                self.document = Some(document);
                Ok(())
            }
            Err(err) => {
                self.document = None;
                Err(err)
            }
        }
    }

    /// Appends a confirmed render to the history; returns its sequence number.
    pub fn record_version(
        &mut self,
        preview: impl Into<String>,
        document_text: impl Into<String>,
    ) -> Result<u64, StoreError> {
        let preview = preview.into();
        self.latest_preview = Some(preview.clone());
        let sequence = self.history.append(preview, document_text);
        self.persist_history()?;
        Ok(sequence)
    }

    pub fn clear_history(&mut self) -> Result<(), StoreError> {
        self.history.clear();
        self.persist_history()
    }

    pub fn delete_version(&mut self, index: usize) -> Result<Option<Version>, StoreError> {
        let removed = self.history.delete(index);
        if removed.is_some() {
            self.persist_history()?;
        }
        Ok(removed)
    }

    /// Saves every non-structural cell of the live document; returns how many were new.
    pub fn save_current_nodes(&mut self, saved_at: DateTime<Utc>) -> Result<usize, StoreError> {
        let cells = match &self.document {
            Some(document) => document
                .non_structural_cells()
                .map(|cell| SavedCell::from_cell(cell, saved_at))
                .collect::<Vec<_>>(),
            None => Vec::new(),
        };
        self.save_nodes(cells)
    }

    pub fn save_nodes<I>(&mut self, cells: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = SavedCell>,
    {
        let inserted = self.library.insert_all(cells);
        if inserted > 0 {
            self.persist_library()?;
        }
        Ok(inserted)
    }

    pub fn remove_saved_node(&mut self, id: &str) -> Result<Option<SavedCell>, StoreError> {
        let removed = self.library.remove(id);
        if removed.is_some() {
            self.persist_library()?;
        }
        Ok(removed)
    }

    pub fn clear_library(&mut self) -> Result<(), StoreError> {
        self.library.clear();
        self.persist_library()
    }

    fn persist_history(&self) -> Result<(), StoreError> {
        match &self.folder {
            Some(folder) => folder.save_history(&self.history),
            None => Ok(()),
        }
    }

    fn persist_library(&self) -> Result<(), StoreError> {
        match &self.folder {
            Some(folder) => folder.save_library(&self.library),
            None => Ok(()),
        }
    }
}
