//! Config file round trips as the CLI uses them.

use std::fs;
use tempfile::tempdir;
use xyprompt_config::{XyConfig, persist_model_at};
use xyprompt_types::{ListMode, ModelName, PlaceholderStyle};

#[test]
fn run_section_round_trips_through_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
# personal defaults
[api_keys]
google = "literal-key"

[run]
mode = "manual"
x_list = ["Manufacturing", "Retail"]
y_list = ["Cost reduction"]
template = "In {X}, find a case study about {Y}."
placeholders = "braced"
"#,
    )
    .unwrap();

    persist_model_at(&path, "gemini-2.5-pro").unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("# personal defaults"));

    let config = XyConfig::load_from(&path).unwrap().unwrap();
    assert_eq!(config.model(), Some("gemini-2.5-pro"));
    assert_eq!(
        ModelName::parse(config.model().unwrap()).unwrap().as_str(),
        "gemini-2.5-pro"
    );
    assert!(config.grounding());
    assert_eq!(config.api_key().unwrap().expose_secret(), "literal-key");

    let run = config.run.as_ref().unwrap();
    assert_eq!(run.mode, Some(ListMode::Manual));
    assert_eq!(run.placeholders, Some(PlaceholderStyle::Braced));
    assert_eq!(run.x_list.as_deref().unwrap().len(), 2);
}

#[test]
fn unknown_mode_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[run]\nmode = \"sometimes\"\n").unwrap();

    let err = XyConfig::load_from(&path).unwrap_err();
    assert_eq!(err.path(), &path);
}
