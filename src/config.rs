// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use crate::model::history::DEFAULT_HISTORY_CAPACITY;
use crate::store::WriteDurability;

pub const DEFAULT_SELECTION_TIMEOUT: Duration = Duration::from_millis(100);

/// Engine tunables. `Default` matches the editor's behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub history_capacity: usize,
    pub selection_timeout: Duration,
    pub durability: WriteDurability,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            selection_timeout: DEFAULT_SELECTION_TIMEOUT,
            durability: WriteDurability::BestEffort,
        }
    }
}

impl EngineConfig {
    pub fn with_history_capacity(mut self, history_capacity: usize) -> Self {
        self.history_capacity = history_capacity;
        self
    }

    pub fn with_selection_timeout(mut self, selection_timeout: Duration) -> Self {
        self.selection_timeout = selection_timeout;
        self
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }
}
