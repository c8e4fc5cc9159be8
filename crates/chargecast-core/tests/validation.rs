//! Integration tests for input validation.

use chargecast_core::config::{NumericRange, ValidationRules};
use chargecast_core::record::RawInput;
use chargecast_core::validate::validate;

fn good_input() -> RawInput {
    RawInput {
        age: Some("30".to_string()),
        sex: Some("male".to_string()),
        bmi: Some("25.5".to_string()),
        children: Some("2".to_string()),
        smoker: Some("no".to_string()),
        region: Some("northeast".to_string()),
    }
}

// ---------------------------------------------------------------------------
// Numeric ranges (inclusive bounds)
// ---------------------------------------------------------------------------

#[test]
fn valid_record_produces_no_messages() {
    let result = validate(&good_input(), &ValidationRules::default());
    assert!(result.valid);
    assert!(result.messages.is_empty());
}

#[test]
fn age_bounds_are_inclusive() {
    let rules = ValidationRules::default();
    for age in ["18", "64"] {
        let mut input = good_input();
        input.age = Some(age.to_string());
        let result = validate(&input, &rules);
        assert!(result.valid, "age={} should be valid", age);
    }
    for age in ["17", "65"] {
        let mut input = good_input();
        input.age = Some(age.to_string());
        let result = validate(&input, &rules);
        assert!(!result.valid, "age={} should be invalid", age);
        assert_eq!(result.messages.len(), 1);
        assert!(result.messages[0].contains("age"));
        assert!(result.messages[0].contains("18"));
        assert!(result.messages[0].contains("64"));
    }
}

#[test]
fn bmi_out_of_range_names_field_and_bounds() {
    let mut input = good_input();
    input.bmi = Some("60".to_string());
    let result = validate(&input, &ValidationRules::default());
    assert!(!result.valid);
    assert!(result.messages[0].contains("bmi"));
    assert!(result.messages[0].contains("15"));
    assert!(result.messages[0].contains("55"));
}

#[test]
fn missing_numeric_field_is_reported() {
    let mut input = good_input();
    input.age = None;
    let result = validate(&input, &ValidationRules::default());
    assert!(!result.valid);
    assert_eq!(result.messages, vec!["age is missing".to_string()]);
}

#[test]
fn non_numeric_value_is_reported() {
    let mut input = good_input();
    input.bmi = Some("heavy".to_string());
    let result = validate(&input, &ValidationRules::default());
    assert!(!result.valid);
    assert!(result.messages[0].contains("bmi"));
    assert!(result.messages[0].contains("heavy"));
}

#[test]
fn fractional_age_is_rejected() {
    let mut input = good_input();
    input.age = Some("30.5".to_string());
    let result = validate(&input, &ValidationRules::default());
    assert!(!result.valid);
    assert_eq!(result.messages.len(), 1);
    assert!(result.messages[0].contains("age"));
    assert!(result.messages[0].contains("whole number"));
}

#[test]
fn fractional_children_is_rejected() {
    let mut input = good_input();
    input.children = Some("2.5".to_string());
    let result = validate(&input, &ValidationRules::default());
    assert!(!result.valid);
    assert_eq!(result.messages.len(), 1);
    assert!(result.messages[0].contains("children"));
    assert!(result.messages[0].contains("whole number"));
}

#[test]
fn parse_rejects_fractional_integer_fields() {
    let mut input = good_input();
    input.age = Some("30.5".to_string());
    assert!(input.parse().is_err());

    let mut input = good_input();
    input.children = Some("2.5".to_string());
    assert!(input.parse().is_err());
}

#[test]
fn fractional_bmi_is_allowed() {
    let mut input = good_input();
    input.bmi = Some("27.9".to_string());
    assert!(validate(&input, &ValidationRules::default()).valid);
}

#[test]
fn configured_ranges_override_defaults() {
    let mut rules = ValidationRules::default();
    rules.children = NumericRange::new(0.0, 2.0);
    let mut input = good_input();
    input.children = Some("3".to_string());
    let result = validate(&input, &rules);
    assert!(!result.valid);
    assert!(result.messages[0].contains("children"));
}

// ---------------------------------------------------------------------------
// Categorical sets
// ---------------------------------------------------------------------------

#[test]
fn unknown_sex_lists_allowed_values() {
    let mut input = good_input();
    input.sex = Some("unknown".to_string());
    let result = validate(&input, &ValidationRules::default());
    assert!(!result.valid);
    assert!(result.messages[0].contains("sex"));
    assert!(result.messages[0].contains("male, female"));
}

#[test]
fn empty_categorical_value_is_missing() {
    let mut input = good_input();
    input.region = Some("   ".to_string());
    let result = validate(&input, &ValidationRules::default());
    assert!(!result.valid);
    assert_eq!(result.messages, vec!["region is missing".to_string()]);
}

#[test]
fn categorical_match_ignores_case() {
    let mut input = good_input();
    input.smoker = Some("No".to_string());
    let result = validate(&input, &ValidationRules::default());
    assert!(result.valid);
}

// ---------------------------------------------------------------------------
// Message ordering
// ---------------------------------------------------------------------------

#[test]
fn all_rules_evaluated_in_fixed_order() {
    let input = RawInput {
        age: Some("17".to_string()),
        sex: Some("unknown".to_string()),
        bmi: Some("60".to_string()),
        children: Some("9".to_string()),
        smoker: Some("maybe".to_string()),
        region: Some("midwest".to_string()),
    };
    let result = validate(&input, &ValidationRules::default());
    assert!(!result.valid);
    assert_eq!(result.messages.len(), 6);
    // Validator order: age, bmi, children, sex, smoker, region.
    assert!(result.messages[0].contains("age"));
    assert!(result.messages[1].contains("bmi"));
    assert!(result.messages[2].contains("children"));
    assert!(result.messages[3].contains("sex"));
    assert!(result.messages[4].contains("smoker"));
    assert!(result.messages[5].contains("region"));
}

#[test]
fn violations_produce_one_message_per_field() {
    let mut input = good_input();
    input.age = Some("80".to_string());
    input.smoker = Some("sometimes".to_string());
    let result = validate(&input, &ValidationRules::default());
    assert_eq!(result.messages.len(), 2);
    assert!(result.messages[0].contains("age"));
    assert!(result.messages[1].contains("smoker"));
}
