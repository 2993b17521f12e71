// tests/keywords_config.rs
use news_sentiment_pipeline::relevance::{KeywordFilter, ENV_KEYWORDS_CONFIG_PATH};
use std::{env, fs};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("keywords.toml");
    fs::write(
        &p_toml,
        r#"
good = [" Senate ", "", "Vote", "vote"]
bad = ["Recipe"]
"#,
    )
    .unwrap();
    let f = KeywordFilter::load_from(&p_toml).unwrap();
    assert_eq!(f.good(), ["senate".to_string(), "vote".to_string()]);
    assert_eq!(f.bad(), ["recipe".to_string()]);

    let p_json = dir.path().join("keywords.json");
    fs::write(&p_json, r#"{"good": ["Tariff", " tariff "]}"#).unwrap();
    let fj = KeywordFilter::load_from(&p_json).unwrap();
    assert_eq!(fj.good(), ["tariff".to_string()]);
    assert!(fj.bad().is_empty());
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("keywords.json");
    fs::write(&p, "good = [").unwrap();
    assert!(KeywordFilter::load_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    env::remove_var(ENV_KEYWORDS_CONFIG_PATH);

    // 1) Nothing on disk -> built-in lists
    let f = KeywordFilter::load_default().unwrap();
    assert_eq!(f, KeywordFilter::default());
    assert!(f.good().iter().any(|k| k == "election"));

    // 2) ./config/keywords.toml
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("keywords.toml"), r#"good = ["budget"]"#).unwrap();
    let ft = KeywordFilter::load_default().unwrap();
    assert_eq!(ft.good(), ["budget".to_string()]);
    assert!(ft.bad().is_empty());

    // 3) env var wins over the fallback file
    let p_env = tmp.path().join("override.json");
    fs::write(&p_env, r#"{"good": ["x"], "bad": ["y"]}"#).unwrap();
    env::set_var(ENV_KEYWORDS_CONFIG_PATH, p_env.display().to_string());
    let fe = KeywordFilter::load_default().unwrap();
    assert_eq!(fe.good(), ["x".to_string()]);
    assert_eq!(fe.bad(), ["y".to_string()]);

    // 4) env var pointing nowhere is an error, not a silent fallback
    env::set_var(ENV_KEYWORDS_CONFIG_PATH, tmp.path().join("missing.toml"));
    assert!(KeywordFilter::load_default().is_err());
    env::remove_var(ENV_KEYWORDS_CONFIG_PATH);

    env::set_current_dir(&old).unwrap();
}
