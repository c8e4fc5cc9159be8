//! Input validation against configured ranges and level sets.
//!
//! Every rule is evaluated; nothing short-circuits. Messages come out in a
//! fixed field order (age, bmi, children, sex, smoker, region) so callers
//! and tests can rely on it.
use crate::config::{NumericRange, ValidationRules};
use crate::record::{Field, RawInput};

/// Outcome of validating one raw record. `valid` is true iff no messages
/// were produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub messages: Vec<String>,
}

impl ValidationResult {
    fn from_messages(messages: Vec<String>) -> Self {
        Self {
            valid: messages.is_empty(),
            messages,
        }
    }
}

/// Validate a raw record. Pure function of the record and the rules; no
/// side effects.
pub fn validate(input: &RawInput, rules: &ValidationRules) -> ValidationResult {
    let mut messages = Vec::new();

    check_numeric(input, Field::Age, &rules.age, true, &mut messages);
    check_numeric(input, Field::Bmi, &rules.bmi, false, &mut messages);
    check_numeric(input, Field::Children, &rules.children, true, &mut messages);
    check_categorical(input, Field::Sex, &rules.sex, &mut messages);
    check_categorical(input, Field::Smoker, &rules.smoker, &mut messages);
    check_categorical(input, Field::Region, &rules.region, &mut messages);

    ValidationResult::from_messages(messages)
}

fn check_numeric(
    input: &RawInput,
    field: Field,
    range: &NumericRange,
    integer: bool,
    out: &mut Vec<String>,
) {
    let name = field.name();
    let raw = match input.get(field).map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw,
        None => {
            out.push(format!("{} is missing", name));
            return;
        }
    };

    let value = match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            out.push(format!("{} must be numeric, got '{}'", name, raw));
            return;
        }
    };

    if integer && value.fract() != 0.0 {
        out.push(format!("{} must be a whole number, got '{}'", name, raw));
        return;
    }

    if !range.contains(value) {
        out.push(format!(
            "{} must be between {} and {}",
            name, range.min, range.max
        ));
    }
}

fn check_categorical(input: &RawInput, field: Field, allowed: &[String], out: &mut Vec<String>) {
    let name = field.name();
    let raw = match input.get(field).map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw,
        None => {
            out.push(format!("{} is missing", name));
            return;
        }
    };

    let known = allowed.iter().any(|level| level.eq_ignore_ascii_case(raw));
    if !known {
        out.push(format!(
            "{} must be one of: {}",
            name,
            allowed.join(", ")
        ));
    }
}
