// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::str::FromStr;

use serde::Serialize;
use strum_macros::{AsRefStr, EnumString};

use crate::{DataTransfer, EditorModel, EditorUpdate, Location};

/// The `inputType` of a `beforeinput` event.
#[derive(Clone, Debug, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum InputType {
    InsertText,
    InsertReplacementText,
    InsertCompositionText,
    InsertParagraph,
    InsertLineBreak,
    InsertFromPaste,
    InsertFromDrop,
    InsertFromYank,
    DeleteContentBackward,
    DeleteContentForward,
    DeleteByCut,
    FormatBold,
    FormatItalic,
    FormatUnderline,
    FormatStrikeThrough,
    HistoryUndo,
    HistoryRedo,
    /// Any name the editor does not handle, kept verbatim.
    #[strum(disabled)]
    Other(String),
}

impl InputType {
    pub fn parse(input_type: &str) -> Self {
        Self::from_str(input_type)
            .unwrap_or_else(|_| Self::Other(input_type.to_owned()))
    }

    /// The DOM name, including for [`Self::Other`].
    pub fn name(&self) -> &str {
        match self {
            Self::Other(name) => name,
            known => known.as_ref(),
        }
    }
}

/// An editing signal forwarded by the browser layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// `beforeinput`, the earliest signal before the browser edits.
    BeforeInput {
        input_type: InputType,
        data: Option<String>,
        data_transfer: Option<DataTransfer>,
    },
    /// A capture-phase `paste`.
    Paste(DataTransfer),
    /// A capture-phase `drop`, with the location under the pointer when the
    /// browser could resolve one.
    Drop {
        data_transfer: DataTransfer,
        location: Option<Location>,
    },
}

/// What the browser layer has to do with an event it forwarded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputOutcome {
    /// Whether to call `preventDefault()`. Always set for paste and drop so
    /// the browser never inserts rich content itself.
    pub default_prevented: bool,
    pub update: EditorUpdate,
}

impl InputOutcome {
    fn handled(update: EditorUpdate) -> Self {
        Self {
            default_prevented: true,
            update,
        }
    }

    fn ignored() -> Self {
        Self {
            default_prevented: false,
            update: EditorUpdate::keep(),
        }
    }
}

impl EditorModel {
    pub fn handle_input_event(&mut self, event: &InputEvent) -> InputOutcome {
        match event {
            InputEvent::Paste(data) => InputOutcome::handled(self.paste(data)),
            InputEvent::Drop {
                data_transfer,
                location,
            } => InputOutcome::handled(self.drop_at(data_transfer, *location)),
            InputEvent::BeforeInput {
                input_type,
                data,
                data_transfer,
            } => self.handle_before_input(
                input_type,
                data.as_deref(),
                data_transfer.as_ref(),
            ),
        }
    }

    fn handle_before_input(
        &mut self,
        input_type: &InputType,
        data: Option<&str>,
        data_transfer: Option<&DataTransfer>,
    ) -> InputOutcome {
        let update = match input_type {
            InputType::InsertText | InputType::InsertReplacementText => {
                match data {
                    Some(text) => self.replace_text(text),
                    None => self.paste(&payload(None, data_transfer)),
                }
            }
            InputType::InsertFromPaste
            | InputType::InsertFromDrop
            | InputType::InsertFromYank => {
                self.paste(&payload(data, data_transfer))
            }
            InputType::InsertParagraph => self.enter(),
            InputType::InsertLineBreak => self.insert_line_break(),
            InputType::DeleteContentBackward => self.backspace(),
            InputType::DeleteContentForward => self.delete(),
            InputType::DeleteByCut => {
                if self.has_selection() {
                    self.backspace()
                } else {
                    EditorUpdate::keep()
                }
            }
            InputType::FormatBold => self.bold(),
            InputType::FormatItalic => self.italic(),
            InputType::FormatUnderline => self.underline(),
            InputType::FormatStrikeThrough => self.strike_through(),
            InputType::HistoryUndo | InputType::HistoryRedo => {
                tracing::debug!(input_type = input_type.name(), "no history");
                EditorUpdate::keep()
            }
            InputType::InsertCompositionText | InputType::Other(_) => {
                return InputOutcome::ignored();
            }
        };
        InputOutcome::handled(update)
    }
}

/// A payload from a `beforeinput` event: its `dataTransfer` when there is
/// one, else its `data` as plain text.
fn payload(data: Option<&str>, data_transfer: Option<&DataTransfer>) -> DataTransfer {
    match (data_transfer, data) {
        (Some(transfer), _) if !transfer.is_empty() => transfer.clone(),
        (_, Some(text)) => DataTransfer::from_text(text),
        _ => DataTransfer::default(),
    }
}
