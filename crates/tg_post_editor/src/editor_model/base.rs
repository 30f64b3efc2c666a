// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use tg_custom_emoji::EmojiCatalog;

use crate::dom::to_html::ToHtml;
use crate::rehydrate::Rehydrator;
use crate::{
    serialize, BlockProjection, Dom, EditorModel, EditorUpdate, Entity,
    Location, SerializedResult, SerializerConfig,
};

impl EditorModel {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self {
            dom: Dom::new_empty(),
            selection: None,
            config,
            catalog: EmojiCatalog::default(),
        }
    }

    /// Open the editor on stored html, e.g. an existing post.
    pub fn from_html(html: &str, catalog: EmojiCatalog) -> Self {
        let mut model = Self::new();
        model.catalog = catalog;
        let _ = model.set_content_from_html(html);
        model
    }

    /// Open the editor on a stored text and its entities, for posts saved
    /// without html.
    pub fn from_entities(
        text: &str,
        entities: &[Entity],
        catalog: EmojiCatalog,
    ) -> Self {
        let mut model = Self::new();
        model.catalog = catalog;
        let _ = model.set_content_from_entities(text, entities);
        model
    }

    /// Replace the whole content with `html`. The caret goes to the end.
    pub fn set_content_from_html(&mut self, html: &str) -> EditorUpdate {
        let dom = Rehydrator::new(&self.catalog).from_html(html);
        self.replace_dom(dom)
    }

    pub fn set_content_from_entities(
        &mut self,
        text: &str,
        entities: &[Entity],
    ) -> EditorUpdate {
        let dom = Rehydrator::new(&self.catalog).from_entities(text, entities);
        self.replace_dom(dom)
    }

    fn replace_dom(&mut self, dom: Dom) -> EditorUpdate {
        self.dom = dom;
        self.dom.normalize();
        let end = Location::from(self.dom.length());
        self.selection = Some((end, end));
        self.create_update_replace_all()
    }

    /// Use `catalog` for emoji inserted or loaded from now on.
    pub fn set_catalog(&mut self, catalog: EmojiCatalog) {
        self.catalog = catalog;
    }

    pub fn catalog(&self) -> &EmojiCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    pub fn clear(&mut self) -> EditorUpdate {
        self.replace_dom(Dom::new_empty())
    }

    /// The `{html, text, entities}` payload for the current content.
    pub fn serialize(&self) -> SerializedResult {
        serialize(&self.dom, &self.config)
    }

    pub fn get_content_as_html(&self) -> String {
        let mut dom = self.dom.clone();
        dom.normalize();
        dom.to_html()
    }

    pub fn document(&self) -> &Dom {
        &self.dom
    }

    pub fn block_projections(&self) -> Vec<BlockProjection> {
        self.dom.get_block_projections()
    }

    pub(crate) fn create_update_replace_all(&self) -> EditorUpdate {
        let (start, end) = self.safe_selection();
        EditorUpdate::replace_all(
            self.serialize(),
            start,
            end,
            self.active_formats(),
        )
    }

    /// Finish an edit: tidy the document and put the caret at `caret`.
    pub(crate) fn after_edit(&mut self, caret: usize) -> EditorUpdate {
        self.dom.normalize();
        let caret = Location::from(self.dom.clamp(caret));
        self.selection = Some((caret, caret));
        self.create_update_replace_all()
    }
}
