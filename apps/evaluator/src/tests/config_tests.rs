use std::collections::HashMap;

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_match_autosave_windows() {
    let settings = Settings::default();
    assert_eq!(settings.debounce_ms, 2000);
    assert_eq!(settings.saved_display_ms, 3000);
    assert_eq!(settings.autosave(), AutosaveSettings::default());
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
server_url = "https://marks.example.edu/api"
debounce_ms = 1500
"#,
    );

    assert_eq!(settings.server_url, "https://marks.example.edu/api");
    assert_eq!(settings.debounce_ms, 1500);
    assert_eq!(settings.saved_display_ms, 3000);
}

#[test]
fn malformed_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "debounce_ms = \"soon\"");
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_and_bad_numbers_are_skipped() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env(&[
            ("EVALUATOR_SERVER_URL", "http://a.example/api"),
            ("APP__SERVER_URL", "http://b.example/api"),
            ("APP__DEBOUNCE_MS", "250"),
            ("APP__SAVED_DISPLAY_MS", "later"),
        ]),
    );

    assert_eq!(settings.server_url, "http://b.example/api");
    assert_eq!(settings.debounce_ms, 250);
    assert_eq!(settings.saved_display_ms, 3000);
}

#[test]
fn server_url_must_parse() {
    let mut settings = Settings::default();
    assert!(settings.server_url().is_ok());
    settings.server_url = "not a url".into();
    assert!(settings.server_url().is_err());
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let settings = load_settings(Path::new("./definitely-not-here/evaluator.toml"));
    assert!(settings.debounce_ms > 0);
}
