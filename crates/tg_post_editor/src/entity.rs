// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The message entity kinds the editor produces, named as in the Telegram
/// Bot API.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityType {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    TextLink,
    Blockquote,
    CustomEmoji,
}

impl EntityType {
    /// Types that are expressed by wrapping content in an element.
    pub fn is_wrapper(&self) -> bool {
        !matches!(self, Self::CustomEmoji)
    }
}

/// One offset/length annotation over the serialized text. Offsets and
/// lengths are UTF-16 code units.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub offset: usize,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_string_or_number"
    )]
    pub custom_emoji_id: Option<String>,
}

impl Entity {
    pub fn new(entity_type: EntityType, offset: usize, length: usize) -> Self {
        Self {
            entity_type,
            offset,
            length,
            url: None,
            custom_emoji_id: None,
        }
    }

    pub fn text_link(offset: usize, length: usize, url: &str) -> Self {
        Self {
            url: Some(url.to_owned()),
            ..Self::new(EntityType::TextLink, offset, length)
        }
    }

    pub fn custom_emoji(offset: usize, custom_emoji_id: &str) -> Self {
        Self {
            custom_emoji_id: Some(custom_emoji_id.to_owned()),
            ..Self::new(EntityType::CustomEmoji, offset, 2)
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Only `text_link` carries a url and only `custom_emoji` carries an
    /// emoji id.
    pub fn strip_irrelevant_fields(&mut self) {
        if self.entity_type != EntityType::TextLink {
            self.url = None;
        }
        if self.entity_type != EntityType::CustomEmoji {
            self.custom_emoji_id = None;
        }
    }

    /// Parse the `entities` JSON field of a stored post.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, EntityError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every entity against the text it annotates, the same way the
    /// backend does before relaying a post.
    pub fn validate_all(
        entities: &[Entity],
        text_length: usize,
    ) -> Result<(), EntityError> {
        let mut previous_offset = 0;
        for (index, e) in entities.iter().enumerate() {
            if e.length == 0 {
                return Err(EntityError::EmptySpan {
                    index,
                    entity_type: e.entity_type,
                });
            }
            if e.end() > text_length {
                return Err(EntityError::OutOfBounds {
                    index,
                    entity_type: e.entity_type,
                    offset: e.offset,
                    end: e.end(),
                    text_length,
                });
            }
            if e.offset < previous_offset {
                return Err(EntityError::Unsorted { index });
            }
            previous_offset = e.offset;

            match e.entity_type {
                EntityType::CustomEmoji => {
                    if e.length != 2 {
                        return Err(EntityError::EmojiWidth {
                            index,
                            length: e.length,
                        });
                    }
                    if e.custom_emoji_id.is_none() {
                        return Err(EntityError::MissingField {
                            index,
                            entity_type: e.entity_type,
                            field: "custom_emoji_id",
                        });
                    }
                }
                EntityType::TextLink => {
                    if e.url.is_none() {
                        return Err(EntityError::MissingField {
                            index,
                            entity_type: e.entity_type,
                            field: "url",
                        });
                    }
                }
                _ => {}
            }
            if e.url.is_some() && e.entity_type != EntityType::TextLink {
                return Err(EntityError::UnexpectedField {
                    index,
                    entity_type: e.entity_type,
                    field: "url",
                });
            }
            if e.custom_emoji_id.is_some()
                && e.entity_type != EntityType::CustomEmoji
            {
                return Err(EntityError::UnexpectedField {
                    index,
                    entity_type: e.entity_type,
                    field: "custom_emoji_id",
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    #[error("Entity {index} ({entity_type}) has zero length")]
    EmptySpan { index: usize, entity_type: EntityType },
    #[error(
        "Entity {index} ({entity_type}) spans {offset}..{end}, \
         beyond text length {text_length}"
    )]
    OutOfBounds {
        index: usize,
        entity_type: EntityType,
        offset: usize,
        end: usize,
        text_length: usize,
    },
    #[error("Entity {index} starts before the entity preceding it")]
    Unsorted { index: usize },
    #[error("custom_emoji entity {index} must have length 2, not {length}")]
    EmojiWidth { index: usize, length: usize },
    #[error("Entity {index} ({entity_type}) is missing `{field}`")]
    MissingField {
        index: usize,
        entity_type: EntityType,
        field: &'static str,
    },
    #[error("Entity {index} ({entity_type}) must not carry `{field}`")]
    UnexpectedField {
        index: usize,
        entity_type: EntityType,
        field: &'static str,
    },
    #[error("Entities are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Telegram document ids may arrive as JSON numbers or strings.
fn optional_string_or_number<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
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

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    }))
}
