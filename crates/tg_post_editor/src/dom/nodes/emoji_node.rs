// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum_macros::{AsRefStr, Display, EnumString};
use tg_custom_emoji::{CustomEmoji, EmojiCatalog};

/// How the emoji is rendered: an `<img>` or a looping muted `<video>`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum EmojiKind {
    #[default]
    Static,
    Video,
}

/// A custom emoji: one indivisible inline node, two code units wide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmojiNode {
    emoji_id: String,
    media_url: String,
    kind: EmojiKind,
    alt: String,
}

impl EmojiNode {
    /// Width in the text buffer and in editing locations.
    pub const LENGTH: usize = 2;

    pub fn new(emoji_id: &str, media_url: &str, kind: EmojiKind) -> Self {
        Self {
            emoji_id: emoji_id.to_owned(),
            media_url: media_url.to_owned(),
            kind,
            alt: String::new(),
        }
    }

    pub fn from_custom_emoji(emoji: &CustomEmoji) -> Self {
        let kind = if emoji.format().renders_as_video() {
            EmojiKind::Video
        } else {
            EmojiKind::Static
        };
        Self {
            emoji_id: emoji.custom_emoji_id.clone(),
            media_url: emoji.media_url.clone(),
            kind,
            alt: emoji.display_name.clone(),
        }
    }

    /// An emoji whose media is unknown. Renders as an empty image but keeps
    /// its id, so it still serializes.
    pub fn placeholder(emoji_id: &str) -> Self {
        Self::new(emoji_id, "", EmojiKind::Static)
    }

    pub fn with_alt(mut self, alt: &str) -> Self {
        self.alt = alt.to_owned();
        self
    }

    pub fn emoji_id(&self) -> &str {
        &self.emoji_id
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    pub fn kind(&self) -> EmojiKind {
        self.kind
    }

    pub fn alt(&self) -> &str {
        &self.alt
    }

    pub fn is_placeholder(&self) -> bool {
        self.media_url.is_empty()
    }

    /// Take media, kind and name from the catalog entry with this id.
    /// Returns false when the catalog does not know the id, leaving the
    /// node as it was.
    pub fn resolve(&mut self, catalog: &EmojiCatalog) -> bool {
        match catalog.get(&self.emoji_id) {
            Some(emoji) => {
                *self = Self::from_custom_emoji(emoji);
                true
            }
            None => false,
        }
    }
}
