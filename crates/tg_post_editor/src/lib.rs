// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Model code for the Telegram post editor.
//!
//! The browser owns the contentEditable surface and forwards input events
//! to an [`EditorModel`]. The model keeps a block-structured [`Dom`], applies
//! edits, formatting, emoji insertion and sanitized paste to it, and hands
//! back a [`SerializedResult`] (`html`, `text`, Telegram `entities`) after
//! every change. Stored posts are loaded back with the [`rehydrate`]
//! functions.

mod block_projection;
mod config;
mod dom;
mod editor_model;
mod editor_update;
mod entity;
mod location;
mod rehydrate;
mod sanitize;
mod serialized_result;
mod serializer;
mod wrap_tag;

#[cfg(test)]
mod tests;

pub use crate::block_projection::{
    AttributeSet, BlockProjection, InlineRun, InlineRunKind,
};
pub use crate::config::{
    ConfigError, NewlineStyle, SerializerConfig, WhitespacePolicy,
};
pub use crate::dom::nodes::{
    ContainerNode, ContainerNodeKind, DomNode, EmojiKind, EmojiNode,
    LinkAttributes, TextNode,
};
pub use crate::dom::parser::parse;
pub use crate::dom::registry::{role_for_tag, NodeRole};
pub use crate::dom::{Dom, DomHandle, HtmlParseError, ToHtml, ToTree};
pub use crate::editor_model::{
    EditorModel, InputEvent, InputOutcome, InputType,
};
pub use crate::editor_update::{EditorUpdate, ReplaceAll, TextUpdate};
pub use crate::entity::{Entity, EntityError, EntityType};
pub use crate::location::Location;
pub use crate::rehydrate::{rehydrate_entities, rehydrate_html, Rehydrator};
pub use crate::sanitize::{
    extract_plain_text, normalize_pasted_text, DataTransfer,
};
pub use crate::serialized_result::SerializedResult;
pub use crate::serializer::{serialize, Serializer, EMOJI_PLACEHOLDER};
pub use crate::wrap_tag::{Attribute, WrapTag};

pub use tg_custom_emoji::{CustomEmoji, EmojiCatalog, EmojiFormat};
