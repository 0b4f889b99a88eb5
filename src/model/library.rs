// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::cell::Cell;
use super::ids::CellId;

/// Display names longer than this many characters are truncated and suffixed with `...`.
pub const NAME_LIMIT: usize = 30;

/// A cell saved for later re-use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCell {
    id: CellId,
    name: String,
    xml: String,
    saved_at: DateTime<Utc>,
}

impl SavedCell {
    pub fn new(
        id: CellId,
        name: impl Into<String>,
        xml: impl Into<String>,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            xml: xml.into(),
            saved_at,
        }
    }

    pub fn from_cell(cell: &Cell, saved_at: DateTime<Utc>) -> Self {
        Self {
            id: cell.id().clone(),
            name: display_name(cell),
            xml: cell.to_xml(),
            saved_at,
        }
    }

    pub fn id(&self) -> &CellId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }

    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }

    /// `<name>.xml` with every non-alphanumeric character replaced by `_`.
    pub fn export_file_name(&self) -> String {
        let stem = self
            .name
            .chars()
            .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
            .collect::<String>();
        format!("{stem}.xml")
    }
}

/// The cell's label, or its id when unlabeled, truncated to [`NAME_LIMIT`] characters.
pub fn display_name(cell: &Cell) -> String {
    let raw = cell
        .value()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| cell.id().as_str());

    if raw.chars().count() <= NAME_LIMIT {
        return raw.to_owned();
    }
    let mut name = raw.chars().take(NAME_LIMIT).collect::<String>();
    name.push_str("...");
    name
}

/// Saved cells keyed by id, in insertion order. The first save of an id wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeLibrary {
    cells: Vec<SavedCell>,
}

impl NodeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: Vec<SavedCell>) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SavedCell> {
        self.cells.iter()
    }

    pub fn get(&self, id: &str) -> Option<&SavedCell> {
        self.cells.iter().find(|cell| cell.id.as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Inserts every incoming cell whose id is not already in the library; returns how many
    /// were inserted.
    ///
    /// Only ids present before the call are checked. Two cells sharing an id within one batch
    /// are both inserted.
    pub fn insert_all<I>(&mut self, incoming: I) -> usize
    where
        I: IntoIterator<Item = SavedCell>,
    {
        let existing = self
            .cells
            .iter()
            .map(|cell| cell.id.clone())
            .collect::<BTreeSet<_>>();

        let before = self.cells.len();
        self.cells.extend(
            incoming
                .into_iter()
                .filter(|cell| !existing.contains(&cell.id)),
        );
        self.cells.len() - before
    }

    /// Removes every entry with `id`; returns the first one removed.
    pub fn remove(&mut self, id: &str) -> Option<SavedCell> {
        let index = self.cells.iter().position(|cell| cell.id.as_str() == id)?;
        let removed = self.cells.remove(index);
        self.cells.retain(|cell| cell.id.as_str() != id);
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}
