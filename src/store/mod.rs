// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence across sessions.
//!
//! The store reads/writes the state folder: the version history and node library as named JSON
//! blobs, plus an `exports/` directory for downloaded artifacts.

pub mod state_folder;

pub use state_folder::{
    StateFolder, StoreError, WriteDurability, EXPORTS_DIRNAME, HISTORY_FILENAME, LIBRARY_FILENAME,
};
