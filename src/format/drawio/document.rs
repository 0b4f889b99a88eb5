// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::payload::{inflate_diagram_page, PayloadError};
use crate::model::cell::{is_cell_element_name, Cell};
use crate::model::document::{Document, Envelope};
use crate::model::xml::{Element, XmlNode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedDocument {
    Xml { message: String },
    UnrecognizedRoot { name: String },
    MissingElement { name: &'static str },
    MissingCellId { index: usize },
    CompressedPage { source: PayloadError },
}

impl fmt::Display for MalformedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml { message } => write!(f, "not well-formed XML: {message}"),
            Self::UnrecognizedRoot { name } => write!(
                f,
                "unrecognized root element <{name}> (expected mxfile, mxGraphModel, or root)"
            ),
            Self::MissingElement { name } => write!(f, "missing <{name}> element"),
            Self::MissingCellId { index } => {
                write!(f, "cell element #{index} under <root> has no id")
            }
            Self::CompressedPage { source } => {
                write!(f, "cannot decode compressed diagram page: {source}")
            }
        }
    }
}

impl std::error::Error for MalformedDocument {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CompressedPage { source } => Some(source),
            _ => None,
        }
    }
}

/// Parses `mxfile`, `mxGraphModel`, or bare `root` markup.
///
/// Cells are read from the first `<diagram>` page of an `mxfile`; later pages ride along in the
/// envelope untouched. Compressed pages are inflated.
pub fn parse_document(text: &str) -> Result<Document, MalformedDocument> {
    let xml = roxmltree::Document::parse(text.trim()).map_err(|err| MalformedDocument::Xml {
        message: err.to_string(),
    })?;
    let top = Element::from_roxml(xml.root_element());

    match top.name() {
        "mxfile" => {
            let mut pages = top.child_elements().filter(|child| child.name() == "diagram");
            let diagram = pages
                .next()
                .ok_or(MalformedDocument::MissingElement { name: "diagram" })?;
            let other_pages = pages.cloned().collect::<Vec<_>>();

            let model = match diagram.first_child("mxGraphModel") {
                Some(model) => model.clone(),
                None => inflate_page_model(&diagram.text())?,
            };

            let cells = match model.first_child("root") {
                Some(root) => collect_cells(root)?,
                None if model.children().is_empty() => Document::empty().into_parts().1,
                None => return Err(MalformedDocument::MissingElement { name: "root" }),
            };

            Ok(Document::new(
                Envelope::File {
                    file: top.shallow_clone(),
                    diagram: diagram.shallow_clone(),
                    model: model.shallow_clone(),
                    other_pages,
                },
                cells,
            ))
        }
        "mxGraphModel" => {
            let root = top
                .first_child("root")
                .ok_or(MalformedDocument::MissingElement { name: "root" })?;
            let cells = collect_cells(root)?;
            Ok(Document::new(
                Envelope::Model {
                    model: top.shallow_clone(),
                },
                cells,
            ))
        }
        "root" => Ok(Document::new(Envelope::Root, collect_cells(&top)?)),
        other => Err(MalformedDocument::UnrecognizedRoot {
            name: other.to_owned(),
        }),
    }
}

/// A fresh (never edited) page has no text at all; it is treated as the empty model.
fn inflate_page_model(encoded: &str) -> Result<Element, MalformedDocument> {
    if encoded.trim().is_empty() {
        return Ok(Element::new("mxGraphModel"));
    }

    let inflated = inflate_diagram_page(encoded)
        .map_err(|source| MalformedDocument::CompressedPage { source })?;
    let xml = roxmltree::Document::parse(&inflated).map_err(|err| MalformedDocument::Xml {
        message: err.to_string(),
    })?;
    let model = Element::from_roxml(xml.root_element());
    if model.name() != "mxGraphModel" {
        return Err(MalformedDocument::MissingElement {
            name: "mxGraphModel",
        });
    }
    Ok(model)
}

fn collect_cells(root: &Element) -> Result<Vec<Cell>, MalformedDocument> {
    let mut cells = Vec::new();
    for (index, element) in root.child_elements().enumerate() {
        if !is_cell_element_name(element.name()) {
            tracing::debug!(element = element.name(), "skipping non-cell element under <root>");
            continue;
        }
        let cell = Cell::from_element(element.clone())
            .ok_or(MalformedDocument::MissingCellId { index })?;
        cells.push(cell);
    }
    Ok(cells)
}

/// Serializes the document in its original envelope, uncompressed.
pub fn export_document(document: &Document) -> String {
    let mut root = Element::new("root");
    for cell in document.cells() {
        root.push_child(XmlNode::Element(cell.element().clone()));
    }

    let top = match document.envelope() {
        Envelope::File {
            file,
            diagram,
            model,
            other_pages,
        } => {
            let mut file = file
                .clone()
                .with_child(diagram.clone().with_child(model.clone().with_child(root)));
            for page in other_pages {
                file.push_child(XmlNode::Element(page.clone()));
            }
            file
        }
        Envelope::Model { model } => model.clone().with_child(root),
        Envelope::Root => root,
    };

    top.to_xml()
}
