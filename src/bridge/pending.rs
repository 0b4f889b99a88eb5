// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Caller-side handles for requests that wait on the rendering surface.

use std::fmt;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::model::ids::CellId;

/// Identifies one awaited export request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "export#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportReply {
    /// The surface answered; carries the exported document text.
    Resolved(String),
    /// A newer request took the slot before the surface answered.
    Abandoned,
    TimedOut,
}

/// An export request waiting for the surface's reply.
#[derive(Debug)]
pub struct PendingExport {
    token: RequestToken,
    rx: oneshot::Receiver<ExportReply>,
}

impl PendingExport {
    pub(crate) fn new(token: RequestToken, rx: oneshot::Receiver<ExportReply>) -> Self {
        Self { token, rx }
    }

    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// Waits without a deadline. The bridge going away reads as [`ExportReply::Abandoned`].
    pub async fn reply(self) -> ExportReply {
        self.rx.await.unwrap_or(ExportReply::Abandoned)
    }

    pub async fn reply_within(self, timeout: Duration) -> ExportReply {
        match tokio::time::timeout(timeout, self.rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => ExportReply::Abandoned,
            Err(_) => {
                tracing::debug!(token = %self.token, ?timeout, "export request timed out");
                ExportReply::TimedOut
            }
        }
    }
}

/// No selection reply arrived within the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeTimeout {
    pub waited: Duration,
}

impl fmt::Display for BridgeTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no reply from the rendering surface within {:?}", self.waited)
    }
}

impl std::error::Error for BridgeTimeout {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Surface,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub cell_id: Option<CellId>,
    pub source: SelectionSource,
}

/// A selection query racing the surface's reply against a fixed timeout.
///
/// The fallback is captured when the query is issued, so later edits do not change it.
#[derive(Debug)]
pub struct PendingSelection {
    rx: oneshot::Receiver<CellId>,
    fallback: Option<CellId>,
    timeout: Duration,
}

impl PendingSelection {
    pub(crate) fn new(
        rx: oneshot::Receiver<CellId>,
        fallback: Option<CellId>,
        timeout: Duration,
    ) -> Self {
        Self {
            rx,
            fallback,
            timeout,
        }
    }

    pub fn fallback(&self) -> Option<&CellId> {
        self.fallback.as_ref()
    }

    /// The surface's answer, or [`BridgeTimeout`]. A superseded query times out immediately.
    pub async fn wait(&mut self) -> Result<CellId, BridgeTimeout> {
        match tokio::time::timeout(self.timeout, &mut self.rx).await {
            Ok(Ok(cell_id)) => Ok(cell_id),
            Ok(Err(_)) | Err(_) => Err(BridgeTimeout {
                waited: self.timeout,
            }),
        }
    }

    pub async fn resolve(mut self) -> Selection {
        match self.wait().await {
            Ok(cell_id) => Selection {
                cell_id: Some(cell_id),
                source: SelectionSource::Surface,
            },
            Err(timeout) => {
                tracing::debug!(%timeout, fallback = ?self.fallback, "using fallback selection");
                Selection {
                    cell_id: self.fallback,
                    source: SelectionSource::Fallback,
                }
            }
        }
    }
}
