// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A session holds the live draw.io document (an envelope plus identified cells), the bounded
//! version history, and the library of saved cells.

pub mod cell;
pub mod document;
pub(crate) mod fixtures;
pub mod history;
pub mod ids;
pub mod library;
pub mod session;
pub mod xml;

pub use cell::{Cell, Geometry};
pub use document::{Document, Envelope, StructureIssue};
pub use history::{Version, VersionLog, DEFAULT_HISTORY_CAPACITY};
pub use ids::{CellId, CellIdError, DEFAULT_LAYER_ID, LAYER_ZERO_ID};
pub use library::{NodeLibrary, SavedCell};
pub use session::Session;
pub use xml::{Element, XmlNode};
