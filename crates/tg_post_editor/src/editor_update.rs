// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use serde::Serialize;

use crate::{EntityType, Location, SerializedResult};

/// What the browser layer has to do after an operation on the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorUpdate {
    pub text_update: TextUpdate,
    pub active_formats: Vec<EntityType>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TextUpdate {
    /// Nothing changed.
    Keep,
    /// Only the selection moved.
    Select { start: Location, end: Location },
    /// The content changed: re-render `serialized.html`, place the selection
    /// and pass `serialized` on as the change notification.
    ReplaceAll(ReplaceAll),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAll {
    pub serialized: SerializedResult,
    pub start: Location,
    pub end: Location,
}

impl EditorUpdate {
    pub fn keep() -> Self {
        Self {
            text_update: TextUpdate::Keep,
            active_formats: Vec::new(),
        }
    }

    pub fn select(
        start: Location,
        end: Location,
        active_formats: Vec<EntityType>,
    ) -> Self {
        Self {
            text_update: TextUpdate::Select { start, end },
            active_formats,
        }
    }

    pub fn replace_all(
        serialized: SerializedResult,
        start: Location,
        end: Location,
        active_formats: Vec<EntityType>,
    ) -> Self {
        Self {
            text_update: TextUpdate::ReplaceAll(ReplaceAll {
                serialized,
                start,
                end,
            }),
            active_formats,
        }
    }

    /// The change notification payload, if the content changed.
    pub fn serialized(&self) -> Option<&SerializedResult> {
        match &self.text_update {
            TextUpdate::ReplaceAll(r) => Some(&r.serialized),
            _ => None,
        }
    }

    pub fn is_keep(&self) -> bool {
        self.text_update == TextUpdate::Keep
    }
}
