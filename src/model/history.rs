// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// One confirmed render: the document text the surface exported plus its preview payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    sequence: u64,
    preview: String,
    document_text: String,
}

impl Version {
    /// Monotonic within a process; reassigned when a log is reloaded.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn document_text(&self) -> &str {
        &self.document_text
    }
}

/// Capacity-bounded version log. The oldest version is evicted first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLog {
    capacity: usize,
    next_sequence: u64,
    versions: VecDeque<Version>,
}

impl Default for VersionLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl VersionLog {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            next_sequence: 0,
            versions: VecDeque::with_capacity(capacity),
        }
    }

    /// Rebuilds a log from persisted `(preview, document_text)` pairs, oldest first.
    pub fn from_entries<I>(capacity: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut log = Self::new(capacity);
        for (preview, document_text) in entries {
            log.append(preview, document_text);
        }
        log
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn append(&mut self, preview: impl Into<String>, document_text: impl Into<String>) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        if self.versions.len() == self.capacity {
            self.versions.pop_front();
        }
        self.versions.push_back(Version {
            sequence,
            preview: preview.into(),
            document_text: document_text.into(),
        });
        sequence
    }

    /// Version at `index`, where `0` is the oldest retained version.
    pub fn get(&self, index: usize) -> Option<&Version> {
        self.versions.get(index)
    }

    pub fn latest(&self) -> Option<&Version> {
        self.versions.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Version> {
        self.versions.iter()
    }

    pub fn delete(&mut self, index: usize) -> Option<Version> {
        self.versions.remove(index)
    }

    pub fn clear(&mut self) {
        self.versions.clear();
    }
}
