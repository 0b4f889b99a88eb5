// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Decoding of export payloads emitted by the rendering surface.
//!
//! An export event carries a single string. Depending on the requested format it is:
//! - a `data:image/svg+xml;base64,...` URL of an SVG preview whose `content` attribute holds the
//!   `mxfile` markup (markup + preview export),
//! - a data URL or raw base64 of a PNG/SVG image (image export),
//! - raw markup (some hosts skip the preview wrapper).
//!
//! `mxfile` pages may additionally be compressed: URI-encoded, raw-deflated, then base64-encoded.

use std::fmt;
use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    Empty,
    Base64 { source: base64::DecodeError },
    NotUtf8,
    Inflate { message: String },
    UriDecode,
    Svg { message: String },
    MissingContent,
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("payload is empty"),
            Self::Base64 { source } => write!(f, "invalid base64: {source}"),
            Self::NotUtf8 => f.write_str("decoded payload is not UTF-8"),
            Self::Inflate { message } => write!(f, "cannot inflate diagram page: {message}"),
            Self::UriDecode => f.write_str("inflated diagram page is not valid URI-encoded UTF-8"),
            Self::Svg { message } => write!(f, "preview is not well-formed SVG: {message}"),
            Self::MissingContent => f.write_str("preview SVG carries no diagram content"),
        }
    }
}

impl std::error::Error for PayloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Base64 { source } => Some(source),
            _ => None,
        }
    }
}

/// A parsed `data:` URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrl<'a> {
    pub media_type: &'a str,
    pub base64: bool,
    pub data: &'a str,
}

pub fn parse_data_url(raw: &str) -> Option<DataUrl<'_>> {
    let rest = raw.trim().strip_prefix("data:")?;
    let (header, data) = rest.split_once(',')?;

    let mut parts = header.split(';');
    let media_type = parts.next().unwrap_or_default();
    let base64 = parts.any(|part| part.eq_ignore_ascii_case("base64"));

    Some(DataUrl {
        media_type: if media_type.is_empty() {
            "text/plain"
        } else {
            media_type
        },
        base64,
        data,
    })
}

impl DataUrl<'_> {
    pub fn decode(&self) -> Result<Vec<u8>, PayloadError> {
        if self.base64 {
            decode_base64(self.data)
        } else {
            Ok(urlencoding::decode_binary(self.data.as_bytes()).into_owned())
        }
    }
}

fn decode_base64(data: &str) -> Result<Vec<u8>, PayloadError> {
    let compact = data
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect::<String>();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|source| PayloadError::Base64 { source })
}

/// Inflates a compressed `<diagram>` page into `mxGraphModel` markup.
pub fn inflate_diagram_page(encoded: &str) -> Result<String, PayloadError> {
    let compressed = decode_base64(encoded.trim())?;

    let mut inflated = Vec::new();
    DeflateDecoder::new(compressed.as_slice())
        .read_to_end(&mut inflated)
        .map_err(|err| PayloadError::Inflate {
            message: err.to_string(),
        })?;

    let encoded_xml = String::from_utf8(inflated).map_err(|_| PayloadError::NotUtf8)?;
    urlencoding::decode(&encoded_xml)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| PayloadError::UriDecode)
}

/// Inverse of [`inflate_diagram_page`], as draw.io writes compressed pages.
pub fn deflate_diagram_page(xml: &str) -> String {
    let encoded = urlencoding::encode(xml);
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    // Writing into a Vec cannot fail.
    let _ = encoder.write_all(encoded.as_bytes());
    let compressed = encoder.finish().unwrap_or_default();
    STANDARD.encode(compressed)
}

/// Extracts the diagram markup from an export payload.
///
/// Returns the `mxfile` (or `mxGraphModel`) text as found; compressed pages are left for the
/// document parser to inflate.
pub fn extract_document_text(data: &str) -> Result<String, PayloadError> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return Err(PayloadError::Empty);
    }

    let text = if let Some(url) = parse_data_url(trimmed) {
        String::from_utf8(url.decode()?).map_err(|_| PayloadError::NotUtf8)?
    } else if trimmed.starts_with('<') {
        trimmed.to_owned()
    } else {
        String::from_utf8(decode_base64(trimmed)?).map_err(|_| PayloadError::NotUtf8)?
    };

    let xml = roxmltree::Document::parse(text.trim()).map_err(|err| PayloadError::Svg {
        message: err.to_string(),
    })?;
    let root = xml.root_element();
    if root.tag_name().name() != "svg" {
        return Ok(text.trim().to_owned());
    }

    match root.attribute("content") {
        Some(content) if !content.trim().is_empty() => Ok(content.to_owned()),
        _ => Err(PayloadError::MissingContent),
    }
}

/// Decodes an image export into file bytes.
///
/// Accepts a data URL, raw base64, or (for SVG) raw markup.
pub fn decode_image_payload(data: &str) -> Result<Vec<u8>, PayloadError> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return Err(PayloadError::Empty);
    }
    if let Some(url) = parse_data_url(trimmed) {
        return url.decode();
    }
    if trimmed.starts_with('<') {
        return Ok(trimmed.as_bytes().to_vec());
    }
    decode_base64(trimmed)
}
