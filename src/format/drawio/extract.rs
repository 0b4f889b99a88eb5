// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::document::MalformedDocument;
use crate::model::cell::Cell;
use crate::model::document::Document;
use crate::model::ids::CellId;
use crate::model::xml::Element;

/// One non-structural cell pulled out of a document, serialized on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedNode {
    pub id: CellId,
    pub value: Option<String>,
    pub xml: String,
}

impl ExtractedNode {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            id: cell.id().clone(),
            value: cell.value().map(str::to_owned),
            xml: cell.to_xml(),
        }
    }
}

/// Serialized subtree of the cell with `id`.
///
/// A missing id and unparseable document text both read as "not found".
pub fn extract_node_by_id(document_text: &str, id: &str) -> Option<String> {
    let document = match Document::parse(document_text) {
        Ok(document) => document,
        Err(err) => {
            tracing::debug!(%err, id, "cannot extract node from malformed document");
            return None;
        }
    };
    document.find_cell(id).map(Cell::to_xml)
}

/// Every non-structural cell of `document_text`, in document order.
pub fn extract_nodes(document_text: &str) -> Result<Vec<ExtractedNode>, MalformedDocument> {
    let document = Document::parse(document_text)?;
    Ok(document_nodes(&document))
}

pub fn document_nodes(document: &Document) -> Vec<ExtractedNode> {
    document
        .non_structural_cells()
        .map(ExtractedNode::from_cell)
        .collect()
}

/// Chat message quoting a single cell: its label, then the markup in a fenced block.
pub fn format_node_for_chat(cell_xml: &str) -> String {
    let label = node_label(cell_xml).unwrap_or_else(|| "node".to_owned());
    format!("Node: {label}\n\nNode XML:\n```xml\n{cell_xml}\n```")
}

fn node_label(cell_xml: &str) -> Option<String> {
    let xml = roxmltree::Document::parse(cell_xml.trim()).ok()?;
    let cell = Cell::from_element(Element::from_roxml(xml.root_element()))?;
    cell.value()
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::{extract_node_by_id, extract_nodes, format_node_for_chat};
    use crate::format::drawio::MalformedDocument;
    use crate::model::fixtures;

    #[test]
    fn extracts_single_cell_subtree() {
        assert_eq!(
            extract_node_by_id(fixtures::FLOW_DOCUMENT, "end").as_deref(),
            Some(concat!(
                r#"<mxCell id="end" value="End" style="ellipse;" vertex="1" parent="1">"#,
                r#"<mxGeometry x="40" y="160" width="120" height="60" as="geometry"/></mxCell>"#,
            ))
        );
    }

    #[test]
    fn missing_id_is_not_found() {
        assert_eq!(extract_node_by_id(fixtures::FLOW_DOCUMENT, "Z"), None);
        assert_eq!(extract_node_by_id("<not-closed", "start"), None);
    }

    #[test]
    fn structural_cells_can_still_be_addressed_by_id() {
        assert_eq!(
            extract_node_by_id(fixtures::FLOW_DOCUMENT, "1").as_deref(),
            Some(r#"<mxCell id="1" parent="0"/>"#)
        );
    }

    #[test]
    fn extract_nodes_skips_structural_cells_and_keeps_edges() {
        let nodes = extract_nodes(fixtures::FLOW_DOCUMENT).expect("extract");
        let ids = nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["start", "end", "edge-1"]);
        assert_eq!(nodes[0].value.as_deref(), Some("Start"));
        assert_eq!(nodes[2].value, None);
        assert!(nodes[2].xml.starts_with(r#"<mxCell id="edge-1" edge="1""#));
    }

    #[test]
    fn extract_nodes_rejects_malformed_text() {
        assert!(matches!(
            extract_nodes("<mxfile><diagram>"),
            Err(MalformedDocument::Xml { .. })
        ));
    }

    #[test]
    fn chat_message_quotes_label_and_markup() {
        let xml = r#"<mxCell id="a" value="Start" vertex="1" parent="1"/>"#;
        assert_eq!(
            format_node_for_chat(xml),
            format!("Node: Start\n\nNode XML:\n```xml\n{xml}\n```")
        );

        let unlabeled = r#"<mxCell id="e" edge="1" parent="1"/>"#;
        assert!(format_node_for_chat(unlabeled).starts_with("Node: node\n"));

        let wrapped = r#"<UserObject id="u" label="Wrapped"><mxCell parent="1"/></UserObject>"#;
        assert!(format_node_for_chat(wrapped).starts_with("Node: Wrapped\n"));
    }
}
