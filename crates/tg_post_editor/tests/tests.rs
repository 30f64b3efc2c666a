// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use indoc::indoc;
use speculoos::prelude::*;
use speculoos::{AssertionFailure, Spec};
use tg_post_editor::{
    rehydrate_entities, rehydrate_html, serialize, AttributeSet, CustomEmoji,
    DataTransfer, EditorModel, EditorUpdate, EmojiCatalog, EmojiFormat, Entity,
    EntityType, InlineRunKind, Location, NewlineStyle, SerializedResult,
    SerializerConfig, TextUpdate, EMOJI_PLACEHOLDER,
};

fn catalog() -> EmojiCatalog {
    EmojiCatalog::new([
        CustomEmoji::new("e1", "rhino", "https://cdn/e1.webp"),
        CustomEmoji::new("e2", "party", "https://cdn/e2.webm")
            .with_format(EmojiFormat::Video),
    ])
}

fn model_from_html(html: &str) -> EditorModel {
    EditorModel::from_html(html, catalog())
}

fn select(model: &mut EditorModel, start: usize, end: usize) {
    model.select(Location::from(start), Location::from(end));
}

fn sorted(entities: &[Entity]) -> Vec<Entity> {
    let mut entities = entities.to_vec();
    entities.sort_by(|a, b| {
        (a.offset, a.length, a.entity_type).cmp(&(b.offset, b.length, b.entity_type))
    });
    entities
}

trait SerializedResultAssertions {
    fn has_entities_inside_the_text(&mut self);
    fn survives_rehydration(&mut self, config: &SerializerConfig);
    fn survives_rehydration_from_entities(&mut self, config: &SerializerConfig);
}

impl<'s> SerializedResultAssertions for Spec<'s, SerializedResult> {
    fn has_entities_inside_the_text(&mut self) {
        if let Err(err) = self.subject.validate() {
            AssertionFailure::from_spec(self)
                .with_expected("entities within the text".to_owned())
                .with_actual(err.to_string())
                .fail();
        }
    }

    /// Loading the html back and serializing it again gives the same text
    /// and the same set of entities.
    fn survives_rehydration(&mut self, config: &SerializerConfig) {
        let again = serialize(&rehydrate_html(&self.subject.html, &catalog()), config);
        if again.text != self.subject.text
            || sorted(&again.entities) != sorted(&self.subject.entities)
        {
            AssertionFailure::from_spec(self)
                .with_expected(format!("{:?}", self.subject))
                .with_actual(format!("{again:?}"))
                .fail();
        }
    }

    /// Loading the text and entities back gives the same text, entities and
    /// html.
    fn survives_rehydration_from_entities(&mut self, config: &SerializerConfig) {
        let again = serialize(
            &rehydrate_entities(&self.subject.text, &self.subject.entities, &catalog()),
            config,
        );
        let html_again = serialize(&rehydrate_html(&again.html, &catalog()), config);
        if again.text != self.subject.text
            || sorted(&again.entities) != sorted(&self.subject.entities)
            || html_again.html != again.html
        {
            AssertionFailure::from_spec(self)
                .with_expected(format!("{:?}", self.subject))
                .with_actual(format!("{again:?}"))
                .fail();
        }
    }
}

fn configs() -> [SerializerConfig; 2] {
    [
        SerializerConfig::default(),
        SerializerConfig::default().with_newline(NewlineStyle::CrLf),
    ]
}

/// A document built with every kind of edit: typing, enter, line breaks,
/// formatting, links, emoji and paste.
fn edited_model(config: SerializerConfig) -> EditorModel {
    let mut model = EditorModel::with_config(config);
    model.set_catalog(catalog());
    model.replace_text("Hello world");
    select(&mut model, 0, 5);
    model.bold();
    select(&mut model, 6, 11);
    model.set_link("example.org");
    model.enter();
    model.insert_custom_emoji_by_id("e1");
    model.replace_text(" party ");
    model.insert_custom_emoji_by_id("e2");
    model.insert_line_break();
    model.replace_text("second line");
    select(&mut model, 12, 28);
    model.italic();
    model.enter();
    model.enter();
    model.paste(&DataTransfer::from_html("<p>pasted <b>text</b></p><p>two</p>"));
    model
}

/// "one", shift-enter, "two", then the whole block formatted with `wrap`.
fn line_broken_model(
    config: SerializerConfig,
    wrap: fn(&mut EditorModel) -> EditorUpdate,
) -> EditorModel {
    let mut model = EditorModel::with_config(config);
    model.set_catalog(catalog());
    model.replace_text("onetwo");
    select(&mut model, 3, 3);
    model.insert_line_break();
    select(&mut model, 0, 7);
    wrap(&mut model);
    model
}

/// Documents with line breaks inside formatting and quotes.
fn line_broken_models(config: SerializerConfig) -> Vec<EditorModel> {
    let mut models = vec![
        line_broken_model(config, EditorModel::bold),
        line_broken_model(config, EditorModel::quote),
    ];

    let mut model = EditorModel::with_config(config);
    model.set_catalog(catalog());
    model.set_content_from_html(
        "<div><blockquote>one<br><b>two</b><br><br>three</blockquote></div><div>after</div>",
    );
    models.push(model);

    let mut model = EditorModel::with_config(config);
    model.set_catalog(catalog());
    model.set_content_from_html("<div><blockquote>quoted</blockquote></div>");
    select(&mut model, 3, 3);
    model.insert_line_break();
    models.push(model);

    let mut model = EditorModel::with_config(config);
    model.set_catalog(catalog());
    model.set_content_from_html("<div><b>bold</b></div>");
    select(&mut model, 4, 4);
    model.insert_line_break();
    model.replace_text("x");
    models.push(model);

    models
}

#[test]
fn can_instantiate_a_model_and_call_methods() {
    let mut model = EditorModel::new();
    model.replace_text("foo");
    select(&mut model, 1, 2);

    let update = model.bold();

    if let TextUpdate::ReplaceAll(r) = update.text_update {
        assert_eq!(r.serialized.html, "<div>f<b>o</b>o</div>");
        assert_eq!(r.start, 2);
        assert_eq!(r.end, 2);
    } else {
        panic!("Expected to receive a ReplaceAll response");
    }
}

#[test]
fn emoji_then_bold_scenario() {
    let mut model = EditorModel::new();
    model.set_catalog(catalog());
    model.replace_text("Hi ");
    model.insert_custom_emoji_by_id("e1");
    model.replace_text(" there");
    select(&mut model, 6, 11);
    model.bold();

    let result = model.serialize();
    assert_eq!(result.text, format!("Hi {EMOJI_PLACEHOLDER} there"));
    assert_eq!(
        result.entities,
        vec![
            Entity::custom_emoji(3, "e1"),
            Entity::new(EntityType::Bold, 6, 5),
        ]
    );
    assert_eq!(
        serde_json::to_string(&result.entities).unwrap(),
        r#"[{"type":"custom_emoji","offset":3,"length":2,"custom_emoji_id":"e1"},{"type":"bold","offset":6,"length":5}]"#
    );
}

#[test]
fn edited_documents_round_trip_through_html() {
    for config in configs() {
        let result = edited_model(config).serialize();
        assert_that!(result).survives_rehydration(&config);
    }
}

#[test]
fn edited_documents_round_trip_through_entities() {
    for config in configs() {
        let result = edited_model(config).serialize();
        assert_that!(result).survives_rehydration_from_entities(&config);
    }
}

#[test]
fn line_breaks_inside_wrappers_round_trip() {
    for config in configs() {
        for model in line_broken_models(config) {
            let result = model.serialize();
            assert_that!(result).has_entities_inside_the_text();
            assert_that!(result).survives_rehydration(&config);
            assert_that!(result).survives_rehydration_from_entities(&config);
        }
    }
}

#[test]
fn line_break_inside_bold_is_one_entity() {
    let result =
        line_broken_model(SerializerConfig::default(), EditorModel::bold).serialize();
    assert_eq!(result.text, "one\ntwo");
    assert_eq!(result.entities, vec![Entity::new(EntityType::Bold, 0, 7)]);
    assert_eq!(result.html, "<div><b>one<br>two</b></div>");

    let config = SerializerConfig::default().with_newline(NewlineStyle::CrLf);
    let result = line_broken_model(config, EditorModel::bold).serialize();
    assert_eq!(result.text, "one\r\ntwo");
    assert_eq!(result.entities, vec![Entity::new(EntityType::Bold, 0, 8)]);
}

#[test]
fn multi_line_blockquote_reloads_from_entities_as_one_quote() {
    let result = model_from_html(
        "<div><blockquote>one<br><b>two</b><br><br>three</blockquote></div><div>after</div>",
    )
    .serialize();
    assert_eq!(result.text, "one\ntwo\n\nthree\nafter");

    let reloaded = serialize(
        &rehydrate_entities(&result.text, &result.entities, &catalog()),
        &SerializerConfig::default(),
    );
    assert_eq!(reloaded.html, result.html);
}

#[test]
fn edited_documents_have_entities_inside_the_text() {
    let result = edited_model(SerializerConfig::default()).serialize();
    assert_that!(result).has_entities_inside_the_text();
    assert_that!(result.entities).is_not_empty();
    for entity in &result.entities {
        assert!(entity.length > 0);
        assert!(entity.end() <= result.text.encode_utf16().count());
    }
}

#[test]
fn every_emoji_is_one_placeholder_and_one_entity() {
    let model = edited_model(SerializerConfig::default());
    let result = model.serialize();
    let emoji_entities: Vec<&Entity> = result
        .entities
        .iter()
        .filter(|e| e.entity_type == EntityType::CustomEmoji)
        .collect();
    assert_eq!(emoji_entities.len(), 2);
    assert!(emoji_entities.iter().all(|e| e.length == 2));
    assert_eq!(
        result.text.matches(EMOJI_PLACEHOLDER).count(),
        model.document().emoji_count()
    );
}

#[test]
fn blocks_are_joined_by_one_newline_each() {
    let result = model_from_html("<div>a</div><div><b>b</b></div><div>c</div>")
        .serialize();
    assert_eq!(result.text, "a\nb\nc");
    assert_eq!(result.text.matches('\n').count(), 2);

    let result = model_from_html("<div>only</div>").serialize();
    assert_eq!(result.text, "only");
}

#[test]
fn pasting_media_leaves_only_text() {
    let mut model = model_from_html("");
    model.paste(&DataTransfer::from_html(indoc! {r#"
        <img src="https://cdn/cat.png">
        <video src="https://cdn/clip.mp4"></video>
        <tg-emoji emoji-id="e1">🦏</tg-emoji>
        Hello
    "#}));
    assert_eq!(model.get_content_as_html(), "<div>Hello</div>");
    assert_eq!(model.document().emoji_count(), 0);
    assert_eq!(model.serialize().text, "Hello");
}

#[test]
fn links_never_nest() {
    let mut model =
        model_from_html(r#"<div><a href="https://old.org">link text</a></div>"#);
    select(&mut model, 2, 6);
    model.wrap_selection(
        tg_post_editor::WrapTag::Link,
        &[tg_post_editor::Attribute::new("href", "https://new.org")],
    );
    let result = model.serialize();
    assert_eq!(result.entities, vec![Entity::text_link(0, 9, "https://new.org")]);
    assert_eq!(
        result.html,
        r#"<div><a href="https://new.org">link text</a></div>"#
    );
}

#[test]
fn stored_text_and_entities_load_like_stored_html() {
    let result = model_from_html(indoc! {r#"
        <div><b>Hello</b> <a href="https://example.org">world</a></div>
        <div><img data-custom-emoji-id="e1"> party <i>ok</i></div>
        <div><br></div>
        <div><u>end</u></div>
    "#})
    .serialize();
    assert_eq!(
        result.text,
        format!("Hello world\n{EMOJI_PLACEHOLDER} party ok\n\nend")
    );
    let from_entities = serialize(
        &rehydrate_entities(&result.text, &result.entities, &catalog()),
        &SerializerConfig::default(),
    );
    assert_eq!(from_entities.text, result.text);
    assert_eq!(sorted(&from_entities.entities), sorted(&result.entities));
}

#[test]
fn crlf_newlines_shift_later_offsets() {
    let config = SerializerConfig::default().with_newline(NewlineStyle::CrLf);
    let mut model = EditorModel::with_config(config);
    model.set_content_from_html("<div>a</div><div><i>b</i></div>");
    let result = model.serialize();
    assert_eq!(result.text, "a\r\nb");
    assert_eq!(result.entities, vec![Entity::new(EntityType::Italic, 3, 1)]);
}

#[test]
fn unknown_emoji_still_load_and_serialize() {
    let model = model_from_html(
        r#"<div>x<img src="https://old/9.png" data-custom-emoji-id="9"></div>"#,
    );
    let result = model.serialize();
    assert_eq!(result.entities, vec![Entity::custom_emoji(1, "9")]);
}

#[test]
fn form_fields_carry_the_serialization() {
    let result = model_from_html("<div><u>hi</u></div>").serialize();
    let fields = result.to_form_fields().unwrap();
    assert_eq!(fields[0], ("text", "hi".to_owned()));
    assert_eq!(fields[1], ("html", "<div><u>hi</u></div>".to_owned()));
    assert_eq!(
        fields[2],
        ("entities", r#"[{"type":"underline","offset":0,"length":2}]"#.to_owned())
    );
}

#[test]
fn single_block_projection() {
    let model = model_from_html("<div>hello</div>");
    let blocks = model.block_projections();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].start, 0);
    assert_eq!(blocks[0].end, 5);
    assert_eq!(blocks[0].inline_runs.len(), 1);
    let InlineRunKind::Text { ref text, ref attributes } =
        blocks[0].inline_runs[0].kind
    else {
        panic!("expected Text run");
    };
    assert_eq!(text, "hello");
    assert_eq!(*attributes, AttributeSet::default());
}

#[test]
fn two_blocks_contiguous_offsets() {
    let model = model_from_html("<div>ab</div><div>cd</div>");
    let blocks = model.block_projections();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].start, 0);
    assert_eq!(blocks[0].end, 2);
    assert_eq!(blocks[1].start, 3);
    assert_eq!(blocks[1].end, 5);
}

#[test]
fn nested_bold_italic_both_flags_set() {
    let model = model_from_html("<div><i><b>text</b></i></div>");
    let blocks = model.block_projections();
    assert_eq!(blocks[0].inline_runs.len(), 1);
    let InlineRunKind::Text { ref attributes, .. } =
        blocks[0].inline_runs[0].kind
    else {
        panic!("expected Text run");
    };
    assert!(attributes.bold);
    assert!(attributes.italic);
}

#[test]
fn emoji_runs_are_two_wide() {
    let model = model_from_html(
        r#"<div>a<video data-custom-emoji-id="e2"></video>b</div>"#,
    );
    let runs = &model.block_projections()[0].inline_runs;
    assert_eq!(runs.len(), 3);
    assert_eq!((runs[1].start, runs[1].end), (1, 3));
    let InlineRunKind::Emoji { ref emoji_id, is_video, .. } = runs[1].kind else {
        panic!("expected Emoji run");
    };
    assert_eq!(emoji_id, "e2");
    assert!(is_video);
}

#[test]
fn blank_blocks_are_marked() {
    let model = model_from_html("<div>a</div><div><br></div><div>b</div>");
    let blocks = model.block_projections();
    assert_eq!(
        blocks.iter().map(|b| b.blank).collect::<Vec<_>>(),
        vec![false, true, false]
    );
    assert_eq!(model.serialize().text, "a\n\nb");
}
