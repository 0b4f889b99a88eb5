// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Deterministic draw.io documents for benchmarks (no RNG).

use std::fmt::Write as _;

use nereid_drawio::model::Document;

/// Vertex ids are `v000000..`, edge ids `e000000..`.
pub fn vertex_id(index: usize) -> String {
    format!("v{index:06}")
}

pub fn edge_id(index: usize) -> String {
    format!("e{index:06}")
}

/// A full `mxfile` with `vertices` vertices in groups of ten and one edge between neighbours.
pub fn document_text(vertices: usize, label_len: usize) -> String {
    let mut out = String::with_capacity(vertices * (200 + label_len));
    out.push_str(r#"<mxfile host="bench"><diagram name="Page-1" id="bench"><mxGraphModel><root>"#);
    out.push_str(r#"<mxCell id="0"/><mxCell id="1" parent="0"/>"#);

    for index in 0..vertices {
        let parent = if index % 10 == 0 {
            "1".to_owned()
        } else {
            vertex_id(index - index % 10)
        };
        let label = label(index, label_len);
        let (x, y) = ((index % 10) * 140, (index / 10) * 90);
        let _ = write!(
            out,
            r#"<mxCell id="{}" value="{label}" style="rounded=1;whiteSpace=wrap;" vertex="1" parent="{parent}"><mxGeometry x="{x}" y="{y}" width="120" height="60" as="geometry"/></mxCell>"#,
            vertex_id(index),
        );
    }
    for index in 1..vertices {
        let _ = write!(
            out,
            r#"<mxCell id="{}" edge="1" parent="1" source="{}" target="{}"><mxGeometry relative="1" as="geometry"/></mxCell>"#,
            edge_id(index),
            vertex_id(index - 1),
            vertex_id(index),
        );
    }

    out.push_str("</root></mxGraphModel></diagram></mxfile>");
    out
}

pub fn document(vertices: usize, label_len: usize) -> Document {
    Document::parse(&document_text(vertices, label_len)).expect("bench document parses")
}

/// A root-wrapped fragment touching every `stride`-th vertex, plus `fresh` new vertices.
pub fn fragment_text(vertices: usize, stride: usize, fresh: usize) -> String {
    let mut out = String::from("<root>");
    for index in (0..vertices).step_by(stride.max(1)) {
        let _ = write!(
            out,
            r#"<mxCell id="{}" value="edited {index}" vertex="1" parent="1"/>"#,
            vertex_id(index)
        );
    }
    for index in 0..fresh {
        let _ = write!(
            out,
            r#"<mxCell id="new{index:06}" value="fresh" vertex="1" parent="missing"/>"#
        );
    }
    out.push_str("</root>");
    out
}

fn label(index: usize, len: usize) -> String {
    let mut label = format!("node {index}");
    while label.len() < len {
        label.push('x');
    }
    label
}

pub fn checksum_document(document: &Document) -> u64 {
    document.cells().iter().fold(0u64, |acc, cell| {
        let acc = acc.wrapping_mul(131).wrapping_add(cell.id().as_str().len() as u64);
        acc.wrapping_mul(131)
            .wrapping_add(cell.parent().map_or(0, str::len) as u64)
    })
}
