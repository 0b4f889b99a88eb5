// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::cell::Cell;
use super::ids::{CellId, DEFAULT_LAYER_ID, LAYER_ZERO_ID};
use super::xml::Element;
use crate::format::drawio::{export_document, parse_document, MalformedDocument};

/// The wrapper elements around `<root>`, kept so serialization reproduces them.
///
/// Wrapper elements are stored attribute-only; their children are rebuilt on export. Pages of
/// an `mxfile` other than the edited (first) one are kept whole in `other_pages` and written
/// back after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    File {
        file: Element,
        diagram: Element,
        model: Element,
        other_pages: Vec<Element>,
    },
    Model {
        model: Element,
    },
    Root,
}

impl Envelope {
    pub fn default_file() -> Self {
        Self::File {
            file: Element::new("mxfile"),
            diagram: Element::new("diagram")
                .with_attr("name", "Page-1")
                .with_attr("id", "page-1"),
            model: Element::new("mxGraphModel"),
            other_pages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureIssue {
    MissingLayerZero,
    MissingDefaultLayer,
    DuplicateId { id: CellId },
    MissingParent { id: CellId },
    DanglingParent { id: CellId, parent: String },
    ParentCycle { id: CellId },
}

impl fmt::Display for StructureIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLayerZero => f.write_str("missing layer-zero cell (id 0)"),
            Self::MissingDefaultLayer => f.write_str("missing default layer cell (id 1)"),
            Self::DuplicateId { id } => write!(f, "duplicate cell id {id}"),
            Self::MissingParent { id } => write!(f, "cell {id} has no parent"),
            Self::DanglingParent { id, parent } => {
                write!(f, "cell {id} references missing parent {parent}")
            }
            Self::ParentCycle { id } => write!(f, "parent chain of cell {id} does not reach 0"),
        }
    }
}

/// A parsed diagram: envelope plus cells in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    envelope: Envelope,
    cells: Vec<Cell>,
}

impl Document {
    pub fn new(envelope: Envelope, cells: Vec<Cell>) -> Self {
        Self { envelope, cells }
    }

    /// The blank diagram the editor starts from: one page with cells `0` and `1`.
    pub fn empty() -> Self {
        Self {
            envelope: Envelope::default_file(),
            cells: vec![Cell::layer_zero(), Cell::default_layer()],
        }
    }

    pub fn parse(text: &str) -> Result<Self, MalformedDocument> {
        parse_document(text)
    }

    pub fn to_xml(&self) -> String {
        export_document(self)
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut Vec<Cell> {
        &mut self.cells
    }

    pub fn into_parts(self) -> (Envelope, Vec<Cell>) {
        (self.envelope, self.cells)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The layer-zero cell every other cell ultimately hangs off.
    pub fn structural_root(&self) -> Option<&Cell> {
        self.find_cell(LAYER_ZERO_ID)
    }

    pub fn default_layer(&self) -> Option<&Cell> {
        self.find_cell(DEFAULT_LAYER_ID)
    }

    pub fn has_structural_roots(&self) -> bool {
        self.structural_root().is_some() && self.default_layer().is_some()
    }

    /// First cell with `id`, or `None`. A miss is an expected outcome, not an error.
    pub fn find_cell(&self, id: &str) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.id().as_str() == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.cells.iter().position(|cell| cell.id().as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn non_structural_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|cell| !cell.is_structural())
    }

    /// Highest-ordered non-structural cell id; used when the surface does not report a selection.
    pub fn last_non_structural_id(&self) -> Option<&CellId> {
        self.non_structural_cells().last().map(Cell::id)
    }

    /// Violations of the structural invariant, in document order. Empty means well-formed.
    pub fn structure_issues(&self) -> Vec<StructureIssue> {
        let mut issues = Vec::new();

        let mut seen = BTreeSet::<&str>::new();
        for cell in &self.cells {
            if !seen.insert(cell.id().as_str()) {
                issues.push(StructureIssue::DuplicateId {
                    id: cell.id().clone(),
                });
            }
        }

        if self.structural_root().is_none() {
            issues.push(StructureIssue::MissingLayerZero);
        }
        if self.default_layer().is_none() {
            issues.push(StructureIssue::MissingDefaultLayer);
        }

        let parents = self
            .cells
            .iter()
            .map(|cell| (cell.id().as_str(), cell.parent()))
            .collect::<HashMap<_, _>>();

        for cell in &self.cells {
            if cell.id().as_str() == LAYER_ZERO_ID {
                continue;
            }

            let Some(parent) = cell.parent() else {
                issues.push(StructureIssue::MissingParent {
                    id: cell.id().clone(),
                });
                continue;
            };

            if !parents.contains_key(parent) {
                issues.push(StructureIssue::DanglingParent {
                    id: cell.id().clone(),
                    parent: parent.to_owned(),
                });
                continue;
            }

            let mut current = parent;
            let mut steps = 0usize;
            while current != LAYER_ZERO_ID {
                steps += 1;
                match parents.get(current).copied().flatten() {
                    Some(next) if steps <= parents.len() => current = next,
                    Some(_) => {
                        issues.push(StructureIssue::ParentCycle {
                            id: cell.id().clone(),
                        });
                        break;
                    }
                    // Reported on the cell that owns the broken link.
                    None => break,
                }
            }
        }

        issues
    }
}
