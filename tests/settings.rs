use mention_suggest::fuzzy::MatchStrategy;
use mention_suggest::settings::{CollectionSettings, Settings};
use mention_suggest::{MentionController, MentionError};
use serde_json::json;
use tempfile::tempdir;

use mock_host::MockHost;

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let s = Settings::load(path.to_str().unwrap()).unwrap();
    assert_eq!(s, Settings::default());
    assert_eq!(s.replace_text_suffix, " ");
    assert_eq!(s.dismiss_debounce_ms, 10);
    assert_eq!(s.autocomplete_separator.as_deref(), Some(r"\s+"));
}

#[test]
fn partial_collection_gets_defaults() {
    let s: Settings = serde_json::from_value(json!({
        "collections": [{ "trigger": "#", "search": { "strategy": "skim" } }]
    }))
    .unwrap();
    let c = &s.collections[0];
    assert_eq!(c.trigger, "#");
    assert_eq!(c.lookup, "key");
    assert_eq!(c.fill_attr, "value");
    assert!(c.require_leading_space);
    assert_eq!(c.search.pre, "<span>");
    assert_eq!(c.search.strategy, MatchStrategy::Skim);
    assert!(c.values.is_none());
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let path = path.to_str().unwrap();

    let s = Settings {
        space_selects_match: true,
        collections: vec![CollectionSettings {
            menu_item_limit: Some(5),
            no_match_template: Some("Nobody".into()),
            values: Some(vec![json!({"key": "Jordan", "value": "jordan"})]),
            ..CollectionSettings::default()
        }],
        ..Settings::default()
    };
    s.save(path).unwrap();
    assert_eq!(Settings::load(path).unwrap(), s);
}

#[test]
fn controller_from_settings_serves_json_values() {
    let s: Settings = serde_json::from_value(json!({
        "collections": [{
            "trigger": "@",
            "values": [
                {"key": "Phil Heartman", "value": "pheartman"},
                {"key": "Gordon Ramsey", "value": "gramsey"}
            ]
        }]
    }))
    .unwrap();
    let mut ctl = MentionController::from_settings(&s).unwrap();
    let mut host = MockHost::new("cc ");
    host.type_text(&mut ctl, "@gor");
    assert_eq!(host.last_labels(), vec!["<span>G</span><span>o</span><span>r</span>don Ramsey"]);
    ctl.commit_selected(&mut host).unwrap();
    assert_eq!(host.text, "cc @gramsey ");
}

#[test]
fn zero_limits_in_settings_are_unlimited() {
    let s: Settings = serde_json::from_value(json!({
        "collections": [{
            "trigger": "@",
            "menu_item_limit": 0,
            "max_results": 0,
            "max_display_items": 0,
            "values": [
                {"key": "Phil Heartman", "value": "pheartman"},
                {"key": "Gordon Ramsey", "value": "gramsey"}
            ]
        }]
    }))
    .unwrap();
    let mut ctl = MentionController::from_settings(&s).unwrap();
    assert_eq!(ctl.registry().len(), 1);
    let mut host = MockHost::new("");
    host.mention_counts.insert("@".into(), 4);
    host.type_text(&mut ctl, "@");
    assert!(ctl.is_active());
    assert_eq!(host.last_labels(), vec!["Phil Heartman", "Gordon Ramsey"]);
}

#[test]
fn invalid_settings_are_configuration_errors() {
    let no_values = Settings {
        collections: vec![CollectionSettings {
            values: None,
            ..CollectionSettings::default()
        }],
        ..Settings::default()
    };
    assert!(matches!(
        MentionController::from_settings(&no_values),
        Err(MentionError::Configuration(_))
    ));

    let no_collections = Settings::default();
    assert!(matches!(
        MentionController::from_settings(&no_collections),
        Err(MentionError::Configuration(_))
    ));

    let bad_separator = Settings {
        autocomplete_separator: Some("(".into()),
        collections: vec![CollectionSettings::default()],
        ..Settings::default()
    };
    assert!(matches!(
        MentionController::from_settings(&bad_separator),
        Err(MentionError::Configuration(_))
    ));

    let blank_lookup = Settings {
        collections: vec![CollectionSettings {
            lookup: "  ".into(),
            ..CollectionSettings::default()
        }],
        ..Settings::default()
    };
    assert!(matches!(
        MentionController::from_settings(&blank_lookup),
        Err(MentionError::Configuration(_))
    ));
}
