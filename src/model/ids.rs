// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Id of the layer-zero structural cell.
pub const LAYER_ZERO_ID: &str = "0";

/// Id of the default-layer structural cell.
pub const DEFAULT_LAYER_ID: &str = "1";

/// Stable identity of a diagram cell.
///
/// draw.io ids are free-form strings; the only requirement enforced here is that they are
/// non-empty, because an empty id cannot be used as a merge key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellId {
    value: String,
}

impl CellId {
    pub fn new(value: impl Into<String>) -> Result<Self, CellIdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(CellIdError::Empty);
        }
        Ok(Self { value })
    }

    pub fn layer_zero() -> Self {
        Self {
            value: LAYER_ZERO_ID.to_owned(),
        }
    }

    pub fn default_layer() -> Self {
        Self {
            value: DEFAULT_LAYER_ID.to_owned(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }

    /// True for the two cells every document must contain.
    pub fn is_structural(&self) -> bool {
        is_structural_id(&self.value)
    }
}

pub fn is_structural_id(id: &str) -> bool {
    id == LAYER_ZERO_ID || id == DEFAULT_LAYER_ID
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for CellId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for CellId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for CellId {
    type Err = CellIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for CellId {
    type Error = CellIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CellId> for String {
    fn from(id: CellId) -> Self {
        id.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellIdError {
    Empty,
}

impl fmt::Display for CellIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("cell id must not be empty"),
        }
    }
}

impl std::error::Error for CellIdError {}

#[cfg(test)]
mod tests {
    use super::{CellId, CellIdError};

    #[test]
    fn cell_id_rejects_empty() {
        assert_eq!(CellId::new(""), Err(CellIdError::Empty));
    }

    #[test]
    fn structural_ids_are_recognized() {
        assert!(CellId::layer_zero().is_structural());
        assert!(CellId::default_layer().is_structural());
        assert!(!CellId::new("2").expect("cell id").is_structural());
    }

    #[test]
    fn cell_id_deserialize_rejects_empty_string() {
        let result: Result<CellId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
