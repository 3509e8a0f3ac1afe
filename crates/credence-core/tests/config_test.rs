use credence_core::config::*;
use credence_core::errors::ConfigError;
use credence_core::models::StrengthLevel;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = CredenceConfig::from_toml("").unwrap();

    assert!(config.normalizer.chains.is_empty());

    assert_eq!(config.resolution.resolution_threshold, 0.85);
    assert_eq!(config.resolution.partial_threshold, 0.5);

    assert_eq!(config.aggregation.false_positive_rate, 0.1);
    assert!(config.aggregation.domain_priors.is_empty());

    assert_eq!(config.theory.hypothesis_floor, 0.6);
    assert_eq!(config.theory.strength_bands.len(), 3);
    assert_eq!(config.theory.strength_bands[0].level, StrengthLevel::Foundational);

    assert_eq!(config.crossmodal.step_entity_threshold, 0.95);
    assert_eq!(config.crossmodal.step_relationship_threshold, 0.98);
    assert_eq!(config.crossmodal.round_trip_aggregate_threshold, 0.80);

    assert_eq!(config.pipeline.max_concurrency, 8);
    assert_eq!(config.observability.log_level, "info");
    assert!(!config.observability.json_logs);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[resolution]
resolution_threshold = 0.9

[aggregation.domain_priors]
intellectual_history = 0.15

[normalizer.chains]
ocr = [ { stage = "ocr", retention = 0.95 }, { stage = "chunking", retention = 0.98 } ]
"#;
    let config = CredenceConfig::from_toml(toml).unwrap();
    assert_eq!(config.resolution.resolution_threshold, 0.9);
    // Non-overridden fields keep defaults
    assert_eq!(config.resolution.partial_threshold, 0.5);
    assert_eq!(
        config.aggregation.domain_priors.get("intellectual_history"),
        Some(&0.15)
    );
    let chain = &config.normalizer.chains["ocr"];
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[1].stage, "chunking");
}

#[test]
fn config_rejects_out_of_range_values() {
    let err = CredenceConfig::from_toml("[crossmodal]\nstep_entity_threshold = 1.5\n").unwrap_err();
    assert!(err.to_string().contains("crossmodal.step_entity_threshold"));

    let err = CredenceConfig::from_toml("[pipeline]\nmax_concurrency = 0\n").unwrap_err();
    assert!(err.to_string().contains("pipeline.max_concurrency"));

    let err = CredenceConfig::from_toml(
        "[normalizer.chains]\nbad = [ { stage = \"ocr\", retention = 0.0 } ]\n",
    )
    .unwrap_err();
    assert!(err.to_string().contains("normalizer.chains.bad.ocr"));
}

#[test]
fn config_rejects_partial_threshold_above_resolution_threshold() {
    let toml = "[resolution]\nresolution_threshold = 0.6\npartial_threshold = 0.7\n";
    assert!(CredenceConfig::from_toml(toml).is_err());
}

#[test]
fn config_parse_error_is_reported() {
    let err = CredenceConfig::from_toml("[resolution\n").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}
