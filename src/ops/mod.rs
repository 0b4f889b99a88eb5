// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for documents.
//!
//! Merging is identity-keyed: fragment cells overwrite base cells with the same id in place,
//! new ids are appended, and nothing is ever removed by a merge. Removal only happens through
//! [`delete_cell`]. Both produce a coarse delta the caller can log or show.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::format::drawio::MalformedDocument;
use crate::model::ids::is_structural_id;
use crate::model::{Cell, CellId, Document, DEFAULT_LAYER_ID, LAYER_ZERO_ID};

/// Which cells a merge touched, in fragment order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeDelta {
    pub added: Vec<CellId>,
    pub updated: Vec<CellId>,
    /// Fragment cells whose `parent` was missing or dangling and got re-parented.
    pub reparented: Vec<CellId>,
}

impl MergeDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub document: Document,
    pub delta: MergeDelta,
}

/// The fragment could not be parsed; the caller keeps its prior document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeFailure {
    source: MalformedDocument,
}

impl MergeFailure {
    pub fn reason(&self) -> &MalformedDocument {
        &self.source
    }
}

impl fmt::Display for MergeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot merge fragment: {}", self.source)
    }
}

impl std::error::Error for MergeFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteError {
    Structural { id: String },
    NotFound { id: String },
}

impl fmt::Display for DeleteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structural { id } => write!(f, "cell {id} is structural and cannot be deleted"),
            Self::NotFound { id } => write!(f, "cell not found (id={id})"),
        }
    }
}

impl std::error::Error for DeleteError {}

/// Merges sanitized `fragment` markup into `base` markup and serializes the result in `base`'s
/// envelope.
///
/// An unparseable `base` degrades to using `fragment` as the whole document, completed with the
/// structural cells it lacks. An unparseable `fragment` fails.
pub fn replace_nodes(base: &str, fragment: &str) -> Result<String, MergeFailure> {
    let fragment = Document::parse(fragment).map_err(|source| MergeFailure { source })?;

    let base = match Document::parse(base) {
        Ok(base) => base,
        Err(err) => {
            tracing::warn!(%err, "base document is unparseable; using the fragment as the document");
            let (envelope, cells) = fragment.into_parts();
            return Ok(Document::new(envelope, with_structural_roots(&cells)).to_xml());
        }
    };

    let result = merge_documents_with_delta(&base, &fragment);
    tracing::debug!(
        added = result.delta.added.len(),
        updated = result.delta.updated.len(),
        reparented = result.delta.reparented.len(),
        "merged fragment"
    );
    Ok(result.document.to_xml())
}

pub fn merge_documents(base: &Document, fragment: &Document) -> Document {
    merge_documents_with_delta(base, fragment).document
}

// Extracted merge/delete implementation.
include!("ops_impl.rs");
