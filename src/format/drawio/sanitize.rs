// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Repair of loosely-formed cell fragments into well-formed, root-wrapped markup.
//!
//! Assistant output is rarely a complete document: it is a single `mxCell`, a run of sibling
//! cells, or a whole `mxfile`, sometimes inside a Markdown code fence and with unescaped `&`/`<`
//! in labels. [`convert_to_legal_xml`] normalizes all of those into one wrapper element and
//! validates the result; anything it cannot repair is rejected rather than merged.

use std::fmt;
use std::sync::OnceLock;

use regex::{Captures, Regex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizationFailure {
    Empty,
    Unparseable { message: String },
}

impl fmt::Display for SanitizationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("fragment is empty"),
            Self::Unparseable { message } => {
                write!(f, "fragment cannot be repaired into well-formed XML: {message}")
            }
        }
    }
}

impl std::error::Error for SanitizationFailure {}

const WRAPPER_NAMES: [&str; 3] = ["root", "mxGraphModel", "mxfile"];

/// Sections copied through untouched by the repair pass: (open, close).
const VERBATIM_SECTIONS: [(&str, &str); 3] =
    [("<!--", "-->"), ("<![CDATA[", "]]>"), ("<?", "?>")];

fn code_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A```[^\n]*\n(.*?)\n?```\z").expect("code fence pattern is valid")
    })
}

fn declaration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\A<\?xml[^>]*\?>\s*").expect("declaration pattern is valid"))
}

fn wrapper_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\A<(?:root|mxGraphModel|mxfile)[\s/>]").expect("wrapper pattern is valid")
    })
}

fn ampersand_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(#[0-9]+;|#[xX][0-9a-fA-F]+;|[A-Za-z][A-Za-z0-9]*;)?")
            .expect("ampersand pattern is valid")
    })
}

/// Wraps `input` into exactly one `root`/`mxGraphModel`/`mxfile` element and checks that the
/// result is well-formed.
///
/// Well-formed input that already starts with a wrapper is returned unchanged, so the function is
/// idempotent on its own output.
pub fn convert_to_legal_xml(input: &str) -> Result<String, SanitizationFailure> {
    let text = strip_code_fence(input.trim());
    if text.is_empty() {
        return Err(SanitizationFailure::Empty);
    }

    if starts_with_wrapper(strip_declaration(text)) && is_wrapped_document(text) {
        return Ok(text.to_owned());
    }

    let body = strip_declaration(text);
    if body.is_empty() {
        return Err(SanitizationFailure::Empty);
    }

    let repaired = repair_markup(body);
    let candidate = if starts_with_wrapper(&repaired) {
        repaired
    } else {
        format!("<root>{repaired}</root>")
    };

    validate(&candidate)?;
    Ok(candidate)
}

fn strip_code_fence(text: &str) -> &str {
    match code_fence_re().captures(text).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text,
    }
}

fn strip_declaration(text: &str) -> &str {
    match declaration_re().find(text) {
        Some(declaration) => &text[declaration.end()..],
        None => text,
    }
}

fn starts_with_wrapper(text: &str) -> bool {
    wrapper_start_re().is_match(text)
}

fn is_wrapped_document(text: &str) -> bool {
    roxmltree::Document::parse(text)
        .map(|doc| WRAPPER_NAMES.contains(&doc.root_element().tag_name().name()))
        .unwrap_or(false)
}

fn validate(candidate: &str) -> Result<(), SanitizationFailure> {
    roxmltree::Document::parse(candidate)
        .map(|_| ())
        .map_err(|err| SanitizationFailure::Unparseable {
            message: err.to_string(),
        })
}

/// Lexical repairs: bare `&` outside entities, `<` inside quoted attribute values, and a `<` in
/// text that cannot start markup.
fn repair_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        escape_ampersands_into(&rest[..start], &mut out);
        rest = &rest[start..];

        if let Some((open, close)) = VERBATIM_SECTIONS
            .iter()
            .find(|(open, _)| rest.starts_with(open))
        {
            let end = rest[open.len()..]
                .find(close)
                .map_or(rest.len(), |offset| open.len() + offset + close.len());
            out.push_str(&rest[..end]);
            rest = &rest[end..];
            continue;
        }

        if !starts_markup(rest) {
            out.push_str("&lt;");
            rest = &rest[1..];
            continue;
        }

        let consumed = repair_tag_into(rest, &mut out);
        rest = &rest[consumed..];
    }

    escape_ampersands_into(rest, &mut out);
    out
}

fn starts_markup(text: &str) -> bool {
    text[1..]
        .chars()
        .next()
        .is_some_and(|ch| ch.is_alphabetic() || matches!(ch, '_' | ':' | '/' | '!'))
}

/// Copies one tag starting at `tag[0] == '<'`; returns the number of bytes consumed.
fn repair_tag_into(tag: &str, out: &mut String) -> usize {
    let mut quote = None;
    let mut value = String::new();

    for (index, ch) in tag.char_indices() {
        match quote {
            Some(open) if ch == open => {
                escape_attr_value_into(&value, out);
                value.clear();
                out.push(ch);
                quote = None;
            }
            Some(_) => value.push(ch),
            None => {
                out.push(ch);
                if ch == '"' || ch == '\'' {
                    quote = Some(ch);
                } else if ch == '>' {
                    return index + 1;
                }
            }
        }
    }

    // Unterminated tag; validation rejects it.
    escape_attr_value_into(&value, out);
    tag.len()
}

fn escape_attr_value_into(value: &str, out: &mut String) {
    let mut escaped = String::with_capacity(value.len());
    escape_ampersands_into(value, &mut escaped);
    out.push_str(&escaped.replace('<', "&lt;"));
}

fn escape_ampersands_into(text: &str, out: &mut String) {
    let repaired = ampersand_re().replace_all(text, |caps: &Captures<'_>| match caps.get(1) {
        Some(entity) if is_known_entity(entity.as_str()) => caps[0].to_owned(),
        Some(entity) => format!("&amp;{}", entity.as_str()),
        None => "&amp;".to_owned(),
    });
    out.push_str(&repaired);
}

fn is_known_entity(entity: &str) -> bool {
    entity.starts_with('#') || matches!(entity, "amp;" | "lt;" | "gt;" | "quot;" | "apos;")
}
