// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use tg_custom_emoji::CustomEmoji;

use crate::dom::nodes::{DomNode, EmojiNode};
use crate::{EditorModel, EditorUpdate};

impl EditorModel {
    /// Put `emoji` in place of the selection. Without focus it goes at the
    /// end of the document. The caret ends up just after it.
    pub fn insert_custom_emoji(&mut self, emoji: &CustomEmoji) -> EditorUpdate {
        let (start, end) = self.selection_range();
        self.dom.delete_range(start, end);
        self.dom.insert_nodes(
            start,
            vec![DomNode::new_emoji(EmojiNode::from_custom_emoji(emoji))],
        );
        self.after_edit(start + EmojiNode::LENGTH)
    }

    /// [`Self::insert_custom_emoji`] for an emoji picked by id from the
    /// catalog. Unknown ids change nothing.
    pub fn insert_custom_emoji_by_id(&mut self, custom_emoji_id: &str) -> EditorUpdate {
        let Some(emoji) = self.catalog.get(custom_emoji_id).cloned() else {
            tracing::debug!(custom_emoji_id, "emoji id not in catalog");
            return EditorUpdate::keep();
        };
        self.insert_custom_emoji(&emoji)
    }
}
