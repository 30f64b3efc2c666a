// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The post editor model for the admin page.
//!
//! The page owns the contentEditable element. It forwards `beforeinput`,
//! `paste` and `drop` events and toolbar actions to a [`PostEditor`],
//! renders the html it gets back and stores the `{html, text, entities}`
//! payload passed to the change callback.

use std::str::FromStr;

use serde::Deserialize;
use tg_custom_emoji::{CustomEmoji, EmojiCatalog};
use tg_post_editor::{
    Attribute, DataTransfer, EditorModel, EditorUpdate, Entity, InputEvent,
    InputType, Location, SerializerConfig, WrapTag,
};
use wasm_bindgen::prelude::*;

/// Install the panic hook and send `tracing` events to the console. Safe to
/// call more than once.
#[wasm_bindgen]
pub fn init() {
    console_error_panic_hook::set_once();
    if tracing_wasm::try_set_as_global_default().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EditorOptions {
    catalog: Vec<CustomEmoji>,
    config: SerializerConfig,
}

fn from_js<T: Default + for<'de> Deserialize<'de>>(
    value: JsValue,
) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_wasm_bindgen::from_value(value)?)
}

fn payload(html: Option<String>, text: Option<String>) -> DataTransfer {
    DataTransfer { html, text }
}

#[wasm_bindgen]
pub struct PostEditor {
    inner: EditorModel,
    on_change: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl PostEditor {
    /// `options` is `{ catalog?: CustomEmoji[], config?: SerializerConfig }`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<PostEditor, JsValue> {
        let options: EditorOptions = from_js(options)?;
        let mut inner = EditorModel::with_config(options.config);
        inner.set_catalog(EmojiCatalog::new(options.catalog));
        Ok(Self {
            inner,
            on_change: None,
        })
    }

    /// Called with `{html, text, entities}` after every content change.
    pub fn set_on_change(&mut self, callback: Option<js_sys::Function>) {
        self.on_change = callback;
    }

    pub fn set_catalog(&mut self, catalog: JsValue) -> Result<(), JsValue> {
        let catalog: Vec<CustomEmoji> = from_js(catalog)?;
        self.inner.set_catalog(EmojiCatalog::new(catalog));
        Ok(())
    }

    pub fn set_content_from_html(&mut self, html: &str) -> Result<JsValue, JsValue> {
        let update = self.inner.set_content_from_html(html);
        self.emit(update)
    }

    pub fn set_content_from_entities(
        &mut self,
        text: &str,
        entities: JsValue,
    ) -> Result<JsValue, JsValue> {
        let entities: Vec<Entity> = from_js(entities)?;
        let update = self.inner.set_content_from_entities(text, &entities);
        self.emit(update)
    }

    pub fn clear(&mut self) -> Result<JsValue, JsValue> {
        let update = self.inner.clear();
        self.emit(update)
    }

    pub fn get_content_as_html(&self) -> String {
        self.inner.get_content_as_html()
    }

    pub fn serialize(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.inner.serialize())?)
    }

    pub fn block_projections(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.inner.block_projections())?)
    }

    pub fn active_formats(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.inner.active_formats())?)
    }

    pub fn select(&mut self, start: u32, end: u32) -> Result<JsValue, JsValue> {
        let update = self
            .inner
            .select(Location::from(start as usize), Location::from(end as usize));
        self.emit(update)
    }

    pub fn blur(&mut self) {
        self.inner.blur();
    }

    pub fn replace_text(&mut self, text: &str) -> Result<JsValue, JsValue> {
        let update = self.inner.replace_text(text);
        self.emit(update)
    }

    pub fn replace_text_in(
        &mut self,
        text: &str,
        start: u32,
        end: u32,
    ) -> Result<JsValue, JsValue> {
        let update = self.inner.replace_text_in(
            text,
            Location::from(start as usize),
            Location::from(end as usize),
        );
        self.emit(update)
    }

    pub fn enter(&mut self) -> Result<JsValue, JsValue> {
        let update = self.inner.enter();
        self.emit(update)
    }

    pub fn insert_line_break(&mut self) -> Result<JsValue, JsValue> {
        let update = self.inner.insert_line_break();
        self.emit(update)
    }

    pub fn backspace(&mut self) -> Result<JsValue, JsValue> {
        let update = self.inner.backspace();
        self.emit(update)
    }

    pub fn delete(&mut self) -> Result<JsValue, JsValue> {
        let update = self.inner.delete();
        self.emit(update)
    }

    pub fn bold(&mut self) -> Result<JsValue, JsValue> {
        let update = self.inner.bold();
        self.emit(update)
    }

    pub fn italic(&mut self) -> Result<JsValue, JsValue> {
        let update = self.inner.italic();
        self.emit(update)
    }

    pub fn underline(&mut self) -> Result<JsValue, JsValue> {
        let update = self.inner.underline();
        self.emit(update)
    }

    pub fn strike_through(&mut self) -> Result<JsValue, JsValue> {
        let update = self.inner.strike_through();
        self.emit(update)
    }

    pub fn quote(&mut self) -> Result<JsValue, JsValue> {
        let update = self.inner.quote();
        self.emit(update)
    }

    /// `tag` is one of `b, i, u, s, a, blockquote` or an alias such as
    /// `strong`; `attributes` is a `{key, value}[]` list.
    pub fn wrap_selection(
        &mut self,
        tag: &str,
        attributes: JsValue,
    ) -> Result<JsValue, JsValue> {
        let tag = WrapTag::from_str(tag)
            .map_err(|_| JsValue::from_str(&format!("unknown tag: {tag}")))?;
        let attributes: Vec<Attribute> = from_js(attributes)?;
        let update = self.inner.wrap_selection(tag, &attributes);
        self.emit(update)
    }

    pub fn set_link(&mut self, url: &str) -> Result<JsValue, JsValue> {
        let update = self.inner.set_link(url);
        self.emit(update)
    }

    pub fn remove_links(&mut self) -> Result<JsValue, JsValue> {
        let update = self.inner.remove_links();
        self.emit(update)
    }

    /// The href of the link around the selection, for the link dialog.
    pub fn current_link(&self) -> Option<String> {
        self.inner.current_link().map(|link| link.href)
    }

    /// The picker's insert handle. `emoji` is a catalog entry.
    pub fn insert_custom_emoji(&mut self, emoji: JsValue) -> Result<JsValue, JsValue> {
        let emoji: CustomEmoji = serde_wasm_bindgen::from_value(emoji)?;
        let update = self.inner.insert_custom_emoji(&emoji);
        self.emit(update)
    }

    pub fn insert_custom_emoji_by_id(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let update = self.inner.insert_custom_emoji_by_id(id);
        self.emit(update)
    }

    /// A capture-phase `paste`, with the `text/html` and `text/plain`
    /// flavours of the clipboard.
    pub fn paste(
        &mut self,
        html: Option<String>,
        text: Option<String>,
    ) -> Result<JsValue, JsValue> {
        self.handle(InputEvent::Paste(payload(html, text)))
    }

    pub fn drop_at(
        &mut self,
        html: Option<String>,
        text: Option<String>,
        location: Option<u32>,
    ) -> Result<JsValue, JsValue> {
        self.handle(InputEvent::Drop {
            data_transfer: payload(html, text),
            location: location.map(|l| Location::from(l as usize)),
        })
    }

    /// A `beforeinput` event. The result says whether to prevent the
    /// browser's default action.
    pub fn before_input(
        &mut self,
        input_type: &str,
        data: Option<String>,
        html: Option<String>,
        text: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let data_transfer =
            (html.is_some() || text.is_some()).then(|| payload(html, text));
        self.handle(InputEvent::BeforeInput {
            input_type: InputType::parse(input_type),
            data,
            data_transfer,
        })
    }
}

impl PostEditor {
    fn handle(&mut self, event: InputEvent) -> Result<JsValue, JsValue> {
        let outcome = self.inner.handle_input_event(&event);
        self.notify(&outcome.update)?;
        Ok(serde_wasm_bindgen::to_value(&outcome)?)
    }

    fn emit(&self, update: EditorUpdate) -> Result<JsValue, JsValue> {
        self.notify(&update)?;
        Ok(serde_wasm_bindgen::to_value(&update)?)
    }

    /// Pass the new serialization to the change callback, if the content
    /// changed.
    fn notify(&self, update: &EditorUpdate) -> Result<(), JsValue> {
        let (Some(callback), Some(serialized)) =
            (&self.on_change, update.serialized())
        else {
            return Ok(());
        };
        let payload = serde_wasm_bindgen::to_value(serialized)?;
        if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
            tracing::warn!(?err, "change callback threw");
        }
        Ok(())
    }
}
