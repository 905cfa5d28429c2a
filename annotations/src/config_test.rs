#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_when_nothing_set() {
    let cfg = LayoutConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, LayoutConfig::default());
    assert_eq!(cfg.line_width_budget, 1200.0);
    assert_eq!(cfg.char_advance, 24.0);
    assert_eq!(cfg.max_lines, None);
}

#[test]
fn overrides_are_parsed() {
    let cfg = LayoutConfig::from_lookup(lookup_from(&[
        (ENV_LINE_WIDTH, "640"),
        (ENV_CHAR_ADVANCE, " 9.5 "),
        (ENV_LINE_HEIGHT, "18"),
        (ENV_MAX_LINES, "200"),
    ]))
    .unwrap();
    assert_eq!(cfg.line_width_budget, 640.0);
    assert_eq!(cfg.char_advance, 9.5);
    assert_eq!(cfg.line_height, 18.0);
    assert_eq!(cfg.max_lines, Some(200));
}

#[test]
fn unparseable_value_names_the_variable() {
    let err = LayoutConfig::from_lookup(lookup_from(&[(ENV_CHAR_ADVANCE, "wide")])).unwrap_err();
    assert_eq!(err, ConfigError::Parse { var: ENV_CHAR_ADVANCE, value: "wide".into() });
}

#[test]
fn negative_max_lines_is_a_parse_error() {
    let err = LayoutConfig::from_lookup(lookup_from(&[(ENV_MAX_LINES, "-3")])).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { var: ENV_MAX_LINES, .. }));
}

#[test]
fn zero_advance_is_invalid() {
    let err = LayoutConfig::from_lookup(lookup_from(&[(ENV_CHAR_ADVANCE, "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn validate_rejects_nan_height() {
    let cfg = LayoutConfig { line_height: f64::NAN, ..LayoutConfig::default() };
    assert!(cfg.validate().is_err());
}

#[test]
fn parse_lookup_defers_validation() {
    let lookup = lookup_from(&[(ENV_LINE_WIDTH, "-5")]);
    let cfg = LayoutConfig::parse_lookup(&lookup).unwrap();
    assert_eq!(cfg.line_width_budget, -5.0);
    assert!(cfg.validate().is_err());
    assert!(matches!(LayoutConfig::from_lookup(&lookup), Err(ConfigError::Invalid(_))));
}

#[test]
fn parse_lookup_still_rejects_garbage() {
    let err = LayoutConfig::parse_lookup(lookup_from(&[(ENV_LINE_HEIGHT, "tall")])).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { var: ENV_LINE_HEIGHT, .. }));
}
