// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! draw.io (mxGraph) markup: parsing/export, fragment extraction, sanitizing, and decoding of the
//! payloads the rendering surface emits.

pub mod document;
pub mod extract;
pub mod payload;
pub mod sanitize;

pub use document::{export_document, parse_document, MalformedDocument};
pub use extract::{
    document_nodes, extract_node_by_id, extract_nodes, format_node_for_chat, ExtractedNode,
};
pub use payload::{
    decode_image_payload, deflate_diagram_page, extract_document_text, inflate_diagram_page,
    parse_data_url, DataUrl, PayloadError,
};
pub use sanitize::{convert_to_legal_xml, SanitizationFailure};
