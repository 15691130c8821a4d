//! Preference file round-trip tests

use std::io::Write;

use pagehint::config::Preferences;
use pagehint::keys::Key;

#[test]
fn test_load_from_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "trigger: meta\ntrigger_newtab: control\nshortcut_keys: abc\nsingle_char_only: false"
    )
    .unwrap();

    let prefs = Preferences::load_from_path(file.path());
    assert_eq!(prefs.trigger, Key::Meta);
    assert_eq!(prefs.trigger_newtab, Key::Control);
    assert_eq!(prefs.alphabet, "abc");
    assert_eq!(prefs.max_sequence_length(), 3);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = Preferences::load_from_path(&dir.path().join("does-not-exist.yaml"));
    assert_eq!(prefs, Preferences::default());
}

#[test]
fn test_garbage_file_falls_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{{{{ not yaml").unwrap();

    let prefs = Preferences::load_from_path(file.path());
    assert_eq!(prefs, Preferences::default());
}

#[test]
fn test_override_rules_travel_through_config() {
    let rules = r#"[{"matchKind":"id","matchValue":"x","urlPattern":".*","shortcut":"q"}]"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "override_rules: '{}'", rules).unwrap();

    let prefs = Preferences::load_from_path(file.path());
    assert_eq!(prefs.override_rules, rules);
}
