// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::collections::HashMap;

use crate::CustomEmoji;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Emoji catalog is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Read-only lookup table of custom emoji, keyed by `custom_emoji_id`.
///
/// Iteration keeps the order the backend sent, which is the order the
/// picker shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmojiCatalog {
    entries: Vec<CustomEmoji>,
    by_id: HashMap<String, usize>,
}

impl EmojiCatalog {
    pub fn new(emoji: impl IntoIterator<Item = CustomEmoji>) -> Self {
        let mut catalog = Self::default();
        for e in emoji {
            catalog.insert(e);
        }
        catalog
    }

    /// Parse the JSON list returned by the backend's emoji endpoint.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let emoji: Vec<CustomEmoji> = serde_json::from_str(json)?;
        Ok(Self::new(emoji))
    }

    /// Later entries with the same id replace earlier ones in place.
    fn insert(&mut self, emoji: CustomEmoji) {
        if let Some(&index) = self.by_id.get(&emoji.custom_emoji_id) {
            tracing::debug!(
                id = %emoji.custom_emoji_id,
                "duplicate emoji id in catalog"
            );
            self.entries[index] = emoji;
        } else {
            self.by_id
                .insert(emoji.custom_emoji_id.clone(), self.entries.len());
            self.entries.push(emoji);
        }
    }

    pub fn get(&self, custom_emoji_id: &str) -> Option<&CustomEmoji> {
        self.by_id
            .get(custom_emoji_id)
            .and_then(|&i| self.entries.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomEmoji> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring match on the display name, for the
    /// picker's filter box. An empty query matches everything.
    pub fn search<'a>(
        &'a self,
        query: &str,
    ) -> impl Iterator<Item = &'a CustomEmoji> + 'a {
        let query = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(move |e| e.display_name.to_lowercase().contains(&query))
    }
}
