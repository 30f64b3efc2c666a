// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

pub mod container_node;
pub mod dom_node;
pub mod emoji_node;
pub mod text_node;

pub use container_node::{ContainerNode, ContainerNodeKind, LinkAttributes};
pub use dom_node::DomNode;
pub use emoji_node::{EmojiKind, EmojiNode};
pub use text_node::TextNode;
