// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The rendering surface as seen from the engine: outbound commands, inbound events.

use serde::Deserialize;
use tokio::sync::mpsc;

use crate::model::ids::CellId;

/// Export formats the surface understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceFormat {
    /// SVG preview with the document embedded in its `content` attribute.
    XmlSvg,
    Png,
    Svg,
}

impl SurfaceFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::XmlSvg => "xmlsvg",
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

/// Commands the engine can send. None of them returns anything directly.
pub trait RenderSurface {
    fn load(&mut self, document_text: &str);

    /// The surface answers later with exactly one [`SurfaceEvent::Export`].
    fn export(&mut self, format: SurfaceFormat);

    /// The surface may answer with [`SurfaceEvent::SelectedCells`], or not at all.
    fn query_selection(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCommand {
    Load { xml: String },
    Export { format: SurfaceFormat },
    QuerySelection,
}

impl SurfaceCommand {
    /// JSON message in the embed protocol the surface host speaks.
    pub fn to_message(&self) -> String {
        let value = match self {
            Self::Load { xml } => serde_json::json!({ "action": "load", "xml": xml }),
            Self::Export { format } => {
                serde_json::json!({ "action": "export", "format": format.as_str() })
            }
            Self::QuerySelection => serde_json::json!({ "action": "getSelectedCells" }),
        };
        value.to_string()
    }
}

/// Records commands instead of sending them anywhere.
impl RenderSurface for Vec<SurfaceCommand> {
    fn load(&mut self, document_text: &str) {
        self.push(SurfaceCommand::Load {
            xml: document_text.to_owned(),
        });
    }

    fn export(&mut self, format: SurfaceFormat) {
        self.push(SurfaceCommand::Export { format });
    }

    fn query_selection(&mut self) {
        self.push(SurfaceCommand::QuerySelection);
    }
}

/// Forwards commands to a host over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSurface {
    tx: mpsc::UnboundedSender<SurfaceCommand>,
}

impl ChannelSurface {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SurfaceCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, command: SurfaceCommand) {
        if self.tx.send(command).is_err() {
            tracing::debug!("surface host is gone; dropping command");
        }
    }
}

impl RenderSurface for ChannelSurface {
    fn load(&mut self, document_text: &str) {
        self.send(SurfaceCommand::Load {
            xml: document_text.to_owned(),
        });
    }

    fn export(&mut self, format: SurfaceFormat) {
        self.send(SurfaceCommand::Export { format });
    }

    fn query_selection(&mut self) {
        self.send(SurfaceCommand::QuerySelection);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Export { data: String },
    /// Selected cells, first selected first. May be empty.
    SelectedCells { cells: Vec<CellId> },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HostMessage {
    event: Option<String>,
    action: Option<String>,
    data: Option<String>,
    cells: Vec<HostCell>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HostCell {
    id: Option<String>,
}

impl SurfaceEvent {
    /// Decodes a host message; anything that is not an export or selection reply is `None`.
    pub fn from_message(message: &str) -> Option<Self> {
        let message = serde_json::from_str::<HostMessage>(message).ok()?;

        if message.event.as_deref() == Some("export") {
            return message.data.map(|data| Self::Export { data });
        }
        if message.action.as_deref() == Some("selectedCells") {
            let cells = message
                .cells
                .into_iter()
                .filter_map(|cell| CellId::new(cell.id?).ok())
                .collect();
            return Some(Self::SelectedCells { cells });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{SurfaceCommand, SurfaceEvent, SurfaceFormat};

    #[test]
    fn decodes_export_event() {
        assert_eq!(
            SurfaceEvent::from_message(r#"{"event":"export","format":"xmlsvg","data":"data:x"}"#),
            Some(SurfaceEvent::Export {
                data: "data:x".to_owned()
            })
        );
    }

    #[test]
    fn decodes_selected_cells_skipping_unusable_ids() {
        let event = SurfaceEvent::from_message(
            r#"{"action":"selectedCells","cells":[{"id":"a"},{"id":""},{"value":"x"},{"id":"b"}]}"#,
        );
        assert_eq!(
            event,
            Some(SurfaceEvent::SelectedCells {
                cells: vec!["a".parse().expect("id"), "b".parse().expect("id")],
            })
        );
    }

    #[test]
    fn ignores_other_messages() {
        assert_eq!(SurfaceEvent::from_message(r#"{"event":"init"}"#), None);
        assert_eq!(SurfaceEvent::from_message(r#"{"event":"export"}"#), None);
        assert_eq!(SurfaceEvent::from_message("not json"), None);
        assert_eq!(SurfaceEvent::from_message("[1,2]"), None);
    }

    #[test]
    fn commands_encode_to_embed_protocol() {
        let load = SurfaceCommand::Load {
            xml: "<mxfile/>".to_owned(),
        };
        let message: serde_json::Value =
            serde_json::from_str(&load.to_message()).expect("json");
        assert_eq!(message["action"], "load");
        assert_eq!(message["xml"], "<mxfile/>");

        let export = SurfaceCommand::Export {
            format: SurfaceFormat::XmlSvg,
        };
        assert_eq!(
            export.to_message(),
            r#"{"action":"export","format":"xmlsvg"}"#
        );
        assert_eq!(
            SurfaceCommand::QuerySelection.to_message(),
            r#"{"action":"getSelectedCells"}"#
        );
    }
}
