// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Request/response bridge to the rendering surface.
//!
//! The surface only takes fire-and-forget commands and answers at some later point with events.
//! The bridge correlates those events with the single outstanding export request (a newer
//! request abandons the older one), keeps the [`Session`] in step with every exported render, and
//! turns download exports into [`Artifact`]s.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::config::EngineConfig;
use crate::format::drawio::{
    convert_to_legal_xml, decode_image_payload, extract_document_text, extract_node_by_id,
    format_node_for_chat, PayloadError, SanitizationFailure,
};
use crate::model::ids::CellId;
use crate::model::{Document, Session};
use crate::ops::{self, DeleteError, MergeFailure};

pub mod pending;
pub mod surface;

pub use pending::{
    BridgeTimeout, ExportReply, PendingExport, PendingSelection, RequestToken, Selection,
    SelectionSource,
};
pub use surface::{ChannelSurface, RenderSurface, SurfaceCommand, SurfaceEvent, SurfaceFormat};

/// What an export event is for. Each issued export queues its format; events consume them in
/// order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Markup plus preview, recorded into the session.
    #[default]
    AiContext,
    /// Markup download (`diagram.drawio`); also recorded into the session.
    Drawio,
    Png,
    Svg,
}

impl ExportFormat {
    pub fn surface_format(self) -> SurfaceFormat {
        match self {
            Self::AiContext | Self::Drawio => SurfaceFormat::XmlSvg,
            Self::Png => SurfaceFormat::Png,
            Self::Svg => SurfaceFormat::Svg,
        }
    }

    fn image_artifact(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Png => Some(("diagram.png", "image/png")),
            Self::Svg => Some(("diagram.svg", "image/svg+xml")),
            Self::AiContext | Self::Drawio => None,
        }
    }
}

/// A file produced by a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

pub trait ArtifactSink {
    fn deliver(&mut self, artifact: Artifact)
        -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug)]
pub enum BridgeError {
    Sanitize(SanitizationFailure),
    Merge(MergeFailure),
    Delete(DeleteError),
    Payload(PayloadError),
    UnknownVersion {
        index: usize,
    },
    UnknownSavedNode {
        id: String,
    },
    NoArtifactSink,
    Artifact {
        file_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sanitize(err) => write!(f, "cannot sanitize fragment: {err}"),
            Self::Merge(err) => write!(f, "{err}"),
            Self::Delete(err) => write!(f, "cannot delete cell: {err}"),
            Self::Payload(err) => write!(f, "cannot decode export payload: {err}"),
            Self::UnknownVersion { index } => write!(f, "no history version at index {index}"),
            Self::UnknownSavedNode { id } => write!(f, "no saved node with id {id}"),
            Self::NoArtifactSink => f.write_str("no artifact sink configured for downloads"),
            Self::Artifact { file_name, source } => {
                write!(f, "cannot deliver {file_name}: {source}")
            }
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sanitize(err) => Some(err),
            Self::Merge(err) => Some(err),
            Self::Delete(err) => Some(err),
            Self::Payload(err) => Some(err),
            Self::Artifact { source, .. } => Some(source.as_ref()),
            Self::UnknownVersion { .. } | Self::UnknownSavedNode { .. } | Self::NoArtifactSink => {
                None
            }
        }
    }
}

impl From<SanitizationFailure> for BridgeError {
    fn from(err: SanitizationFailure) -> Self {
        Self::Sanitize(err)
    }
}

impl From<MergeFailure> for BridgeError {
    fn from(err: MergeFailure) -> Self {
        Self::Merge(err)
    }
}

impl From<DeleteError> for BridgeError {
    fn from(err: DeleteError) -> Self {
        Self::Delete(err)
    }
}

impl From<PayloadError> for BridgeError {
    fn from(err: PayloadError) -> Self {
        Self::Payload(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Idle,
    AwaitingReply(RequestToken),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// A markup export became the live document and a new history version.
    Recorded {
        sequence: u64,
        resolved: Option<RequestToken>,
    },
    /// An image export was delivered as a download; history is untouched.
    Downloaded { file_name: String },
    /// A selection reply was handed to the waiting query.
    Selected { cell_id: CellId },
    Ignored,
}

type ArtifactSinkBox = Box<dyn ArtifactSink + Send>;

pub struct EditorBridge<S> {
    surface: S,
    session: Session,
    config: EngineConfig,
    sink: Option<ArtifactSinkBox>,
    pending_export: Option<(RequestToken, oneshot::Sender<ExportReply>)>,
    next_token: u64,
    /// Formats of issued exports, oldest first; the surface answers them in order.
    issued: VecDeque<ExportFormat>,
    pending_selection: Option<oneshot::Sender<CellId>>,
}

impl<S: RenderSurface> fmt::Debug for EditorBridge<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorBridge")
            .field("state", &self.state())
            .field("issued", &self.issued)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: RenderSurface> EditorBridge<S> {
    pub fn new(surface: S, session: Session, config: EngineConfig) -> Self {
        Self {
            surface,
            session,
            config,
            sink: None,
            pending_export: None,
            next_token: 0,
            issued: VecDeque::new(),
            pending_selection: None,
        }
    }

    pub fn with_sink(mut self, sink: impl ArtifactSink + Send + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Format the next export event will be handled as. Unprompted exports are AI context.
    pub fn export_format(&self) -> ExportFormat {
        self.issued.front().copied().unwrap_or_default()
    }

    pub fn state(&self) -> BridgeState {
        match &self.pending_export {
            Some((token, tx)) if !tx.is_closed() => BridgeState::AwaitingReply(*token),
            _ => BridgeState::Idle,
        }
    }

    /// Asks the surface for the current document and returns a handle to await the reply.
    ///
    /// An earlier request still waiting resolves as [`ExportReply::Abandoned`].
    pub fn request_export(&mut self) -> PendingExport {
        if let Some((previous, tx)) = self.pending_export.take() {
            if tx.send(ExportReply::Abandoned).is_ok() {
                tracing::info!(token = %previous, "export request superseded");
            }
        }

        let token = RequestToken::new(self.next_token);
        self.next_token += 1;

        let (tx, rx) = oneshot::channel();
        self.pending_export = Some((token, tx));
        self.issued.push_back(ExportFormat::AiContext);
        self.surface.export(SurfaceFormat::XmlSvg);
        PendingExport::new(token, rx)
    }

    /// Starts an export whose reply is not awaited; for downloads it becomes an [`Artifact`].
    pub fn export_for_download(&mut self, format: ExportFormat) {
        self.issued.push_back(format);
        self.surface.export(format.surface_format());
    }

    pub fn handle_event(&mut self, event: SurfaceEvent) -> Result<EventOutcome, BridgeError> {
        match event {
            SurfaceEvent::Export { data } => {
                let format = self.issued.pop_front().unwrap_or_default();
                match format.image_artifact() {
                    Some((file_name, media_type)) => {
                        let bytes = decode_image_payload(&data)?;
                        self.deliver(Artifact {
                            file_name: file_name.to_owned(),
                            media_type,
                            bytes,
                        })?;
                        Ok(EventOutcome::Downloaded {
                            file_name: file_name.to_owned(),
                        })
                    }
                    None => Ok(self.record_export(data, format)),
                }
            }
            SurfaceEvent::SelectedCells { cells } => {
                let Some(cell_id) = cells.into_iter().next() else {
                    return Ok(EventOutcome::Ignored);
                };
                let Some(tx) = self.pending_selection.take() else {
                    return Ok(EventOutcome::Ignored);
                };
                match tx.send(cell_id.clone()) {
                    Ok(()) => Ok(EventOutcome::Selected { cell_id }),
                    Err(_) => Ok(EventOutcome::Ignored),
                }
            }
        }
    }

    /// Markup exports become the live document and a version. Only AI-context exports answer
    /// the awaited request; a `.drawio` download is delivered instead.
    fn record_export(&mut self, data: String, format: ExportFormat) -> EventOutcome {
        let text = extract_document_text(&data).unwrap_or_else(|err| {
            tracing::debug!(%err, "export payload is not a preview; treating it as markup");
            data.trim().to_owned()
        });

        if let Err(err) = self.session.set_document_text(text.clone()) {
            tracing::warn!(%err, "exported document is unparseable; keeping it as an opaque blob");
        }
        if let Err(err) = self.session.record_version(data, text.clone()) {
            tracing::warn!(%err, "cannot persist diagram history");
        }
        let sequence = self
            .session
            .history()
            .latest()
            .map(|version| version.sequence())
            .unwrap_or_default();

        let resolved = match format {
            ExportFormat::AiContext => match self.pending_export.take() {
                Some((token, tx)) => tx
                    .send(ExportReply::Resolved(text.clone()))
                    .is_ok()
                    .then_some(token),
                None => None,
            },
            _ => None,
        };

        if format == ExportFormat::Drawio {
            let artifact = Artifact {
                file_name: "diagram.drawio".to_owned(),
                media_type: "text/xml",
                bytes: text.into_bytes(),
            };
            if let Err(err) = self.deliver(artifact) {
                tracing::warn!(%err, "markup download failed");
            }
        }

        EventOutcome::Recorded { sequence, resolved }
    }

    fn deliver(&mut self, artifact: Artifact) -> Result<(), BridgeError> {
        let Some(sink) = self.sink.as_mut() else {
            return Err(BridgeError::NoArtifactSink);
        };
        let file_name = artifact.file_name.clone();
        sink.deliver(artifact)
            .map_err(|source| BridgeError::Artifact { file_name, source })
    }

    /// Broadcasts a selection query. The fallback is the last non-structural cell right now.
    pub fn query_selection(&mut self) -> PendingSelection {
        let fallback = self
            .session
            .document()
            .and_then(Document::last_non_structural_id)
            .cloned();

        let (tx, rx) = oneshot::channel();
        self.pending_selection = Some(tx);
        self.surface.query_selection();
        PendingSelection::new(rx, fallback, self.config.selection_timeout)
    }

    pub fn load_document(&mut self, document_text: &str) {
        self.surface.load(document_text);
    }

    /// Sanitizes `raw`, merges it into the live document, and loads the result.
    ///
    /// On failure the live document is unchanged and nothing is loaded.
    pub fn apply_fragment(&mut self, raw: &str) -> Result<String, BridgeError> {
        let fragment = convert_to_legal_xml(raw)?;
        let merged = ops::replace_nodes(self.session.document_text(), &fragment)?;

        if let Err(err) = self.session.set_document_text(merged.clone()) {
            tracing::warn!(%err, "merged document does not reparse");
        }
        self.surface.load(&merged);
        Ok(merged)
    }

    pub fn clear_diagram(&mut self) {
        self.session.reset_document();
        let text = self.session.document_text().to_owned();
        self.surface.load(&text);
    }

    pub fn restore_version(&mut self, index: usize) -> Result<(), BridgeError> {
        let text = self
            .session
            .history()
            .get(index)
            .map(|version| version.document_text().to_owned())
            .ok_or(BridgeError::UnknownVersion { index })?;

        if let Err(err) = self.session.set_document_text(text.clone()) {
            tracing::warn!(%err, index, "restored version is unparseable");
        }
        self.surface.load(&text);
        Ok(())
    }

    /// Deletes `id` (with its descendants and attached edges) and loads the result.
    pub fn delete_cell(&mut self, id: &str) -> Result<Vec<CellId>, BridgeError> {
        let mut document = self
            .session
            .document()
            .cloned()
            .ok_or_else(|| DeleteError::NotFound { id: id.to_owned() })?;
        let removed = ops::delete_cell(&mut document, id)?;

        self.session.set_document(document);
        let text = self.session.document_text().to_owned();
        self.surface.load(&text);
        Ok(removed)
    }

    /// Saves every non-structural cell of the live document into the library.
    pub fn save_current_nodes(&mut self) -> usize {
        let before = self.session.library().len();
        if let Err(err) = self.session.save_current_nodes(Utc::now()) {
            tracing::warn!(%err, "cannot persist node library");
        }
        self.session.library().len() - before
    }

    /// Merges a saved cell back into the live document.
    pub fn insert_saved_node(&mut self, id: &str) -> Result<String, BridgeError> {
        let xml = self
            .session
            .library()
            .get(id)
            .map(|cell| cell.xml().to_owned())
            .ok_or_else(|| BridgeError::UnknownSavedNode { id: id.to_owned() })?;
        self.apply_fragment(&xml)
    }

    /// Downloads a saved cell as `<name>.xml`.
    pub fn export_saved_node(&mut self, id: &str) -> Result<String, BridgeError> {
        let artifact = self
            .session
            .library()
            .get(id)
            .map(|cell| Artifact {
                file_name: cell.export_file_name(),
                media_type: "text/xml",
                bytes: cell.xml().as_bytes().to_vec(),
            })
            .ok_or_else(|| BridgeError::UnknownSavedNode { id: id.to_owned() })?;

        let file_name = artifact.file_name.clone();
        self.deliver(artifact)?;
        Ok(file_name)
    }

    /// Chat message quoting the cell `id` of the live document.
    pub fn chat_snippet(&self, id: &str) -> Option<String> {
        extract_node_by_id(self.session.document_text(), id).map(|xml| format_node_for_chat(&xml))
    }
}

/// Feeds surface events into a shared bridge in arrival order until the channel closes.
///
/// Returns the number of events handled. Failed events are logged and skipped.
pub async fn pump<S>(
    bridge: Arc<Mutex<EditorBridge<S>>>,
    mut events: mpsc::UnboundedReceiver<SurfaceEvent>,
) -> usize
where
    S: RenderSurface,
{
    let mut handled = 0usize;
    while let Some(event) = events.recv().await {
        let mut bridge = bridge.lock().await;
        match bridge.handle_event(event) {
            Ok(outcome) => tracing::debug!(?outcome, "handled surface event"),
            Err(err) => tracing::warn!(%err, "surface event failed"),
        }
        handled += 1;
    }
    handled
}
