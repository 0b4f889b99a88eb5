// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Merge/delete implementation used by `replace_nodes` and the bridge.
/// Keeps `ops::mod` focused on public result/error types and the text boundary.
pub fn merge_documents_with_delta(base: &Document, fragment: &Document) -> MergeResult {
    let mut cells = with_structural_roots(base.cells());

    let mut index_by_id = HashMap::<String, usize>::with_capacity(cells.len());
    for (index, cell) in cells.iter().enumerate() {
        index_by_id
            .entry(cell.id().as_str().to_owned())
            .or_insert(index);
    }

    // Position of every cell taken from the fragment -> parent to fall back to.
    let mut fallback_parents = BTreeMap::<usize, String>::new();
    let mut delta = MergeDelta::default();

    for cell in fragment.cells() {
        if cell.is_structural() {
            tracing::debug!(id = %cell.id(), "ignoring structural cell in fragment");
            continue;
        }

        let id = cell.id().as_str();
        match index_by_id.get(id).copied() {
            Some(index) => {
                fallback_parents.entry(index).or_insert_with(|| {
                    cells[index]
                        .parent()
                        .unwrap_or(DEFAULT_LAYER_ID)
                        .to_owned()
                });
                cells[index] = cell.clone();
                if !delta.added.contains(cell.id()) && !delta.updated.contains(cell.id()) {
                    delta.updated.push(cell.id().clone());
                }
            }
            None => {
                index_by_id.insert(id.to_owned(), cells.len());
                fallback_parents.insert(cells.len(), DEFAULT_LAYER_ID.to_owned());
                cells.push(cell.clone());
                delta.added.push(cell.id().clone());
            }
        }
    }

    for (&index, fallback) in &fallback_parents {
        let cell = &mut cells[index];
        let has_valid_parent = cell
            .parent()
            .is_some_and(|parent| parent != cell.id().as_str() && index_by_id.contains_key(parent));
        if !has_valid_parent {
            cell.set_parent(fallback);
            delta.reparented.push(cell.id().clone());
        }
    }

    // A fragment may close a parent loop (`A -> B -> A`) through ids that all exist. Such cells
    // get their fallback parent, and the default layer if the fallback loops as well.
    for attempt in [None, Some(DEFAULT_LAYER_ID)] {
        for (&index, fallback) in &fallback_parents {
            if reaches_layer_zero(&cells, &index_by_id, index) {
                continue;
            }
            let parent = attempt.unwrap_or(fallback.as_str());
            tracing::debug!(id = %cells[index].id(), parent, "breaking parent cycle");
            cells[index].set_parent(parent);
            if !delta.reparented.contains(cells[index].id()) {
                delta.reparented.push(cells[index].id().clone());
            }
        }
    }

    MergeResult {
        document: Document::new(base.envelope().clone(), cells),
        delta,
    }
}

fn reaches_layer_zero(
    cells: &[Cell],
    index_by_id: &HashMap<String, usize>,
    start: usize,
) -> bool {
    let mut current = &cells[start];
    for _ in 0..=cells.len() {
        if current.id().as_str() == LAYER_ZERO_ID {
            return true;
        }
        match current
            .parent()
            .and_then(|parent| index_by_id.get(parent).copied())
        {
            Some(next) => current = &cells[next],
            None => return false,
        }
    }
    false
}

/// Base cells, preceded by whichever structural cells the base lacks.
fn with_structural_roots(cells: &[Cell]) -> Vec<Cell> {
    let has = |id: &str| cells.iter().any(|cell| cell.id().as_str() == id);

    let mut out = Vec::with_capacity(cells.len() + 2);
    if !has(LAYER_ZERO_ID) {
        out.push(Cell::layer_zero());
    }
    if !has(DEFAULT_LAYER_ID) {
        out.push(Cell::default_layer());
    }
    out.extend_from_slice(cells);
    out
}

/// Removes `id`, every cell nested under it, and every cell whose `source`/`target` was removed.
///
/// Returns the removed ids in document order. The document is left untouched on error.
pub fn delete_cell(document: &mut Document, id: &str) -> Result<Vec<CellId>, DeleteError> {
    if is_structural_id(id) {
        return Err(DeleteError::Structural { id: id.to_owned() });
    }
    if !document.contains(id) {
        return Err(DeleteError::NotFound { id: id.to_owned() });
    }

    let mut removed = HashSet::from([id.to_owned()]);
    loop {
        let before = removed.len();
        for cell in document.cells() {
            if cell.is_structural() || removed.contains(cell.id().as_str()) {
                continue;
            }
            let nested = cell.parent().is_some_and(|parent| removed.contains(parent));
            let attached = [cell.source(), cell.target()]
                .into_iter()
                .flatten()
                .any(|end| removed.contains(end));
            if nested || attached {
                removed.insert(cell.id().as_str().to_owned());
            }
        }
        if removed.len() == before {
            break;
        }
    }

    let removed_ids = document
        .cells()
        .iter()
        .filter(|cell| removed.contains(cell.id().as_str()))
        .map(|cell| cell.id().clone())
        .collect::<Vec<_>>();
    document
        .cells_mut()
        .retain(|cell| !removed.contains(cell.id().as_str()));

    tracing::debug!(id, removed = removed_ids.len(), "deleted cell");
    Ok(removed_ids)
}
