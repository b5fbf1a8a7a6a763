/*!
 * Tests for application configuration
 */

use anyhow::Result;
use excerpt_align::alignment::Strategy;
use excerpt_align::app_config::{Config, LogLevel};

use crate::common;

/// Test that a partial config file keeps defaults for everything else
#[test]
fn test_loadOrCreate_partialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "target_language": "es",
            "log_level": "debug",
            "alignment": { "enabled_strategies": ["proportional", "char_offset"] },
            "verification": { "coverage_threshold": 0.9 },
            "translator": { "model": "mistral" }
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "es");
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(
        config.alignment.enabled_strategies,
        vec![Strategy::Proportional, Strategy::CharOffset]
    );
    assert_eq!(config.alignment.min_result_chars, 15);
    assert_eq!(config.verification.coverage_threshold, 0.9);
    assert_eq!(config.verification.signature_size, 15);
    let translator = config.translator.as_ref().expect("translator section");
    assert_eq!(translator.model, "mistral");
    assert_eq!(translator.endpoint, "http://localhost:11434");
    config.validate()?;
    Ok(())
}

/// Test that an unparseable config file is an error, not a silent default
#[test]
fn test_loadOrCreate_invalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

/// Test that the configured entity drives every built-in greeting
#[test]
fn test_registry_customEntity_shouldUseItInGreetings() -> Result<()> {
    let config = Config {
        entity: "Hatonn".to_string(),
        ..Config::default()
    };

    let registry = config.registry()?;
    assert_eq!(registry.get("fr").unwrap().greetings, vec!["Je suis Hatonn.".to_string()]);
    assert_eq!(registry.get("eng").unwrap().greetings, vec!["I am Hatonn.".to_string()]);
    Ok(())
}

/// Test that the default config survives a save and reload
#[test]
fn test_save_thenLoad_shouldRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.batch.deadline_secs = Some(30);
    config.save(&path)?;

    assert_eq!(Config::load_or_create(&path)?, config);
    Ok(())
}
