// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// How the media behind a custom emoji is encoded.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmojiFormat {
    Static,
    Video,
    Lottie,
}

impl EmojiFormat {
    /// Guess the format from the media file extension.
    ///
    /// Stickers converted to `.webm` are short looping videos, `.tgs` files
    /// are lottie animations and everything else is treated as an image.
    pub fn from_media_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".webm") || lower.ends_with(".mp4") {
            Self::Video
        } else if lower.ends_with(".tgs") {
            Self::Lottie
        } else {
            Self::Static
        }
    }

    /// Lottie animations are shipped to the browser pre-rendered as video,
    /// so both animated formats share the looping video element.
    pub fn renders_as_video(&self) -> bool {
        matches!(self, Self::Video | Self::Lottie)
    }
}

/// One entry of the emoji catalog, as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEmoji {
    /// Database id of the catalog row. Not sent to Telegram.
    #[serde(default)]
    pub id: String,
    #[serde(rename = "name", alias = "display_name", default)]
    pub display_name: String,
    #[serde(rename = "img_url", alias = "media_url")]
    pub media_url: String,
    /// Telegram's document id for the emoji. This is the opaque identifier
    /// carried by `custom_emoji` entities.
    #[serde(deserialize_with = "string_or_number")]
    pub custom_emoji_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<EmojiFormat>,
}

impl CustomEmoji {
    pub fn new(
        custom_emoji_id: impl Into<String>,
        display_name: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            display_name: display_name.into(),
            media_url: media_url.into(),
            custom_emoji_id: custom_emoji_id.into(),
            format: None,
        }
    }

    pub fn with_format(mut self, format: EmojiFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// The declared format, or the one implied by the media URL when the
    /// backend did not send one.
    pub fn format(&self) -> EmojiFormat {
        self.format
            .unwrap_or_else(|| EmojiFormat::from_media_url(&self.media_url))
    }
}

/// Telegram document ids are 64-bit integers; the backend stores them as
/// numbers while the admin page passes them around as strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    })
}
