// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::CellId;
use super::xml::Element;

pub const MX_CELL: &str = "mxCell";
pub const USER_OBJECT: &str = "UserObject";
pub const OBJECT: &str = "object";

/// Element names that can appear as a cell directly under `<root>`.
pub fn is_cell_element_name(name: &str) -> bool {
    matches!(name, MX_CELL | USER_OBJECT | OBJECT)
}

/// Geometry attributes of a cell, read-only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Geometry {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub relative: bool,
}

/// A single addressable cell: the `mxCell` (or `UserObject`/`object` wrapper) subtree.
///
/// The element is kept verbatim; accessors only read from it. `UserObject`/`object` cells keep
/// their graph attributes (`parent`, `style`, `vertex`, ...) on the inner `mxCell` and their
/// label on the wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    id: CellId,
    element: Element,
}

impl Cell {
    /// Returns `None` when the element is not a cell element or carries no usable id.
    pub fn from_element(element: Element) -> Option<Self> {
        if !is_cell_element_name(element.name()) {
            return None;
        }
        let id = CellId::new(element.attr("id")?).ok()?;
        Some(Self { id, element })
    }

    pub fn layer_zero() -> Self {
        Self {
            id: CellId::layer_zero(),
            element: Element::new(MX_CELL).with_attr("id", "0"),
        }
    }

    pub fn default_layer() -> Self {
        Self {
            id: CellId::default_layer(),
            element: Element::new(MX_CELL)
                .with_attr("id", "1")
                .with_attr("parent", "0"),
        }
    }

    pub fn id(&self) -> &CellId {
        &self.id
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn into_element(self) -> Element {
        self.element
    }

    pub fn is_structural(&self) -> bool {
        self.id.is_structural()
    }

    pub fn is_wrapped(&self) -> bool {
        self.element.name() != MX_CELL
    }

    fn graph_element(&self) -> &Element {
        if self.is_wrapped() {
            self.element.first_child(MX_CELL).unwrap_or(&self.element)
        } else {
            &self.element
        }
    }

    pub fn parent(&self) -> Option<&str> {
        self.graph_element().attr("parent")
    }

    /// Moves the cell under `parent`. For wrapped cells the inner `mxCell` is updated.
    pub fn set_parent(&mut self, parent: &str) {
        if self.is_wrapped() {
            if let Some(inner) = self.element.first_child_mut(MX_CELL) {
                inner.set_attr("parent", parent);
                return;
            }
        }
        self.element.set_attr("parent", parent);
    }

    pub fn value(&self) -> Option<&str> {
        if self.is_wrapped() {
            self.element.attr("label")
        } else {
            self.element.attr("value")
        }
    }

    pub fn style(&self) -> Option<&str> {
        self.graph_element().attr("style")
    }

    pub fn is_vertex(&self) -> bool {
        self.graph_element().attr("vertex") == Some("1")
    }

    pub fn is_edge(&self) -> bool {
        self.graph_element().attr("edge") == Some("1")
    }

    pub fn source(&self) -> Option<&str> {
        self.graph_element().attr("source")
    }

    pub fn target(&self) -> Option<&str> {
        self.graph_element().attr("target")
    }

    pub fn geometry(&self) -> Option<Geometry> {
        let geometry = self.graph_element().first_child("mxGeometry")?;
        let number = |name: &str| {
            geometry
                .attr(name)
                .and_then(|raw| raw.trim().parse::<f64>().ok())
        };
        Some(Geometry {
            x: number("x"),
            y: number("y"),
            width: number("width"),
            height: number("height"),
            relative: geometry.attr("relative") == Some("1"),
        })
    }

    pub fn to_xml(&self) -> String {
        self.element.to_xml()
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, Geometry};
    use crate::model::xml::Element;

    fn parse_cell(src: &str) -> Cell {
        let doc = roxmltree::Document::parse(src).expect("parse");
        Cell::from_element(Element::from_roxml(doc.root_element())).expect("cell")
    }

    #[test]
    fn reads_vertex_attributes_and_geometry() {
        let cell = parse_cell(
            r#"<mxCell id="a" value="Start" style="rounded=1;" vertex="1" parent="1"><mxGeometry x="10" y="20.5" width="120" height="60" as="geometry"/></mxCell>"#,
        );

        assert_eq!(cell.id().as_str(), "a");
        assert_eq!(cell.value(), Some("Start"));
        assert_eq!(cell.style(), Some("rounded=1;"));
        assert_eq!(cell.parent(), Some("1"));
        assert!(cell.is_vertex());
        assert!(!cell.is_edge());
        assert_eq!(
            cell.geometry(),
            Some(Geometry {
                x: Some(10.0),
                y: Some(20.5),
                width: Some(120.0),
                height: Some(60.0),
                relative: false,
            })
        );
    }

    #[test]
    fn reads_edge_endpoints() {
        let cell = parse_cell(
            r#"<mxCell id="e" edge="1" parent="1" source="a" target="b"><mxGeometry relative="1" as="geometry"/></mxCell>"#,
        );

        assert!(cell.is_edge());
        assert_eq!(cell.source(), Some("a"));
        assert_eq!(cell.target(), Some("b"));
        assert!(cell.geometry().expect("geometry").relative);
    }

    #[test]
    fn user_object_reads_label_and_inner_cell() {
        let mut cell = parse_cell(
            r#"<UserObject id="u" label="Wrapped" link="https://example.com"><mxCell style="shape=note;" vertex="1" parent="1"/></UserObject>"#,
        );

        assert_eq!(cell.value(), Some("Wrapped"));
        assert_eq!(cell.parent(), Some("1"));
        assert_eq!(cell.style(), Some("shape=note;"));

        cell.set_parent("group");
        assert_eq!(cell.parent(), Some("group"));
        assert_eq!(cell.element().attr("parent"), None);
    }

    #[test]
    fn rejects_elements_without_id() {
        let doc = roxmltree::Document::parse(r#"<mxCell value="x"/>"#).expect("parse");
        assert!(Cell::from_element(Element::from_roxml(doc.root_element())).is_none());

        let doc = roxmltree::Document::parse(r#"<mxGeometry id="g"/>"#).expect("parse");
        assert!(Cell::from_element(Element::from_roxml(doc.root_element())).is_none());
    }
}
