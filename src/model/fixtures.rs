// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Shared deterministic diagram fixtures for unit tests.

#![cfg(test)]

/// A small flowchart: two vertices and one edge, inside a full `mxfile` envelope.
pub(crate) const FLOW_DOCUMENT: &str = concat!(
    r#"<mxfile host="app.diagrams.net"><diagram name="Page-1" id="p1">"#,
    r#"<mxGraphModel dx="800" dy="600" grid="1"><root>"#,
    r#"<mxCell id="0"/><mxCell id="1" parent="0"/>"#,
    r#"<mxCell id="start" value="Start" style="rounded=1;" vertex="1" parent="1">"#,
    r#"<mxGeometry x="40" y="40" width="120" height="60" as="geometry"/></mxCell>"#,
    r#"<mxCell id="end" value="End" style="ellipse;" vertex="1" parent="1">"#,
    r#"<mxGeometry x="40" y="160" width="120" height="60" as="geometry"/></mxCell>"#,
    r#"<mxCell id="edge-1" edge="1" parent="1" source="start" target="end">"#,
    r#"<mxGeometry relative="1" as="geometry"/></mxCell>"#,
    r#"</root></mxGraphModel></diagram></mxfile>"#
);

/// Cells `0`, `1` and `A` (value "Start") in a bare `mxGraphModel`.
pub(crate) const START_DOCUMENT: &str = concat!(
    r#"<mxGraphModel><root>"#,
    r#"<mxCell id="0"/><mxCell id="1" parent="0"/>"#,
    r#"<mxCell id="A" value="Start" vertex="1" parent="1">"#,
    r#"<mxGeometry x="0" y="0" width="80" height="40" as="geometry"/></mxCell>"#,
    r#"</root></mxGraphModel>"#
);

/// A grouped diagram: `group` contains `child`, and `link` connects `child` to `outside`.
pub(crate) const GROUP_DOCUMENT: &str = concat!(
    r#"<mxGraphModel><root>"#,
    r#"<mxCell id="0"/><mxCell id="1" parent="0"/>"#,
    r#"<mxCell id="group" value="" style="group" vertex="1" parent="1"/>"#,
    r#"<mxCell id="child" value="Inner" vertex="1" parent="group"/>"#,
    r#"<mxCell id="outside" value="Outer" vertex="1" parent="1"/>"#,
    r#"<mxCell id="link" edge="1" parent="1" source="child" target="outside"/>"#,
    r#"<mxCell id="other" value="Other" vertex="1" parent="1"/>"#,
    r#"</root></mxGraphModel>"#
);
