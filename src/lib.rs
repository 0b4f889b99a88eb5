// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Nereid draw.io engine: keeps an assistant's view of a draw.io diagram in sync with the
//! rendering surface.
//!
//! - [`model`]: the cell tree, bounded version history, saved-node library, and the owning
//!   [`model::Session`].
//! - [`format::drawio`]: parsing, fragment extraction, sanitizing, and export payload decoding.
//! - [`ops`]: merging assistant fragments into the live document, and cell deletion.
//! - [`bridge`]: the request/response protocol with the rendering surface.
//! - [`store`]: the on-disk state folder.

pub mod bridge;
pub mod config;
pub mod format;
pub mod model;
pub mod ops;
pub mod store;
