// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

mod base;
mod emoji;
mod format;
mod input_events;
mod paste;
mod selection;
mod typing;

pub use input_events::{InputEvent, InputOutcome, InputType};

use tg_custom_emoji::EmojiCatalog;

use crate::{Dom, Location, SerializerConfig};

/// The state behind one editor surface: the document, the selection and
/// the emoji catalog used to render emoji.
///
/// Every mutating operation returns an [`crate::EditorUpdate`]. When the
/// content changed it carries the new serialization, which is the change
/// notification for the host.
#[derive(Clone, Debug)]
pub struct EditorModel {
    pub(crate) dom: Dom,
    /// `(anchor, focus)`. `None` while the surface has no focus.
    pub(crate) selection: Option<(Location, Location)>,
    pub(crate) config: SerializerConfig,
    pub(crate) catalog: EmojiCatalog,
}

impl Default for EditorModel {
    fn default() -> Self {
        Self::new()
    }
}
