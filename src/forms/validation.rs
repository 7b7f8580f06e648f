//! Validation resolver
//!
//! Evaluates a field's declared constraints against its current value.
//! Constraints compose with AND semantics in declaration order; the first
//! failure wins and carries the message. Validation is total: it returns a
//! structured outcome and never errors past this module.

use crate::forms::{
    value_shape, FieldDescriptor, FieldFlags, FieldType, FieldValue, FormConfig, FormState,
    ValueShape, VisibilityMap,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_INPUT_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static pattern"))
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://\S+$").expect("static pattern"))
}

fn ticker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z0-9.-]{1,10}$").expect("static pattern"))
}

/// Outcome of validating one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOutcome {
    pub field: String,
    pub ok: bool,
    pub message: Option<String>,
    /// Completion hints, e.g. common mail providers for a broken domain
    pub suggestions: Vec<String>,
}

impl FieldOutcome {
    fn pass(field: &str) -> Self {
        Self {
            field: field.to_string(),
            ok: true,
            message: None,
            suggestions: Vec::new(),
        }
    }

    fn fail(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            ok: false,
            message: Some(message.into()),
            suggestions: Vec::new(),
        }
    }
}

/// Per-attempt validation report, created fresh on every submit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub field_errors: BTreeMap<String, String>,
    pub form_errors: Vec<String>,
}

impl ValidationReport {
    pub fn ok(&self) -> bool {
        self.field_errors.is_empty() && self.form_errors.is_empty()
    }
}

/// Validate every visible, enabled field plus cross-field constraints
///
/// Hidden and disabled fields are exempt from their own rules.
pub fn validate_form(
    config: &FormConfig,
    state: &FormState,
    visibility: &VisibilityMap,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    for field in &config.fields {
        let flags = visibility.flags(&field.name);
        if !flags.visible || flags.disabled {
            continue;
        }
        let outcome = validate_field(field, state.get(&field.name), flags);
        if !outcome.ok {
            let message = outcome.message.unwrap_or_else(|| "Invalid value".to_string());
            report.field_errors.insert(field.name.clone(), message);
        }
    }
    check_password_confirmation(config, state, visibility, &mut report);
    report
}

/// Validate a single field against its declared rules
pub fn validate_field(
    field: &FieldDescriptor,
    value: Option<&FieldValue>,
    flags: FieldFlags,
) -> FieldOutcome {
    let rules = field.validation.as_ref();
    let required = flags.required || rules.map(|r| r.required).unwrap_or(false);
    let empty = value.map_or(true, FieldValue::is_empty);

    if empty {
        if required {
            return FieldOutcome::fail(&field.name, format!("{} is required", field.label));
        }
        return FieldOutcome::pass(&field.name);
    }
    let Some(value) = value else {
        return FieldOutcome::pass(&field.name);
    };

    if let Some(outcome) = check_type(field, value) {
        return outcome;
    }

    if let Some(rules) = rules {
        if let Some(n) = value.as_number() {
            if let Some(min) = rules.min {
                if n < min {
                    return FieldOutcome::fail(
                        &field.name,
                        format!("Value must be at least {min}"),
                    );
                }
            }
            if let Some(max) = rules.max {
                if n > max {
                    return FieldOutcome::fail(
                        &field.name,
                        format!("Value must not exceed {max}"),
                    );
                }
            }
        }

        if let Some(outcome) = check_length(field, value, rules.min_length, rules.max_length) {
            return outcome;
        }

        if let Some(re) = rules.compiled_pattern.as_ref() {
            if !re.is_match(&value.as_text()) {
                let message = rules
                    .custom_message
                    .clone()
                    .unwrap_or_else(|| "Invalid format".to_string());
                return FieldOutcome::fail(&field.name, message);
            }
        }

        if let Some(name) = rules.predicate.as_deref() {
            if let Some(default_message) = eval_predicate(name, value) {
                let message = rules
                    .custom_message
                    .clone()
                    .unwrap_or_else(|| default_message.to_string());
                return FieldOutcome::fail(&field.name, message);
            }
        }
    }

    FieldOutcome::pass(&field.name)
}

/// Type-specific shape checks, run before declared constraints
fn check_type(field: &FieldDescriptor, value: &FieldValue) -> Option<FieldOutcome> {
    match field.ty {
        FieldType::Email => {
            let text = value.as_text();
            if !email_re().is_match(&text) {
                let mut outcome =
                    FieldOutcome::fail(&field.name, "Please enter a valid email address");
                if let Some(domain) = text.split_once('@').map(|(_, d)| d) {
                    if !domain.contains('.') {
                        outcome.suggestions = vec![
                            "gmail.com".to_string(),
                            "yahoo.com".to_string(),
                            "hotmail.com".to_string(),
                        ];
                    }
                }
                return Some(outcome);
            }
        }
        FieldType::Url => {
            if !url_re().is_match(&value.as_text()) {
                return Some(FieldOutcome::fail(&field.name, "Please enter a valid URL"));
            }
        }
        FieldType::Tel => {
            let digits = value.as_text().chars().filter(char::is_ascii_digit).count();
            if !(10..=15).contains(&digits) {
                return Some(FieldOutcome::fail(
                    &field.name,
                    "Please enter a valid phone number",
                ));
            }
        }
        FieldType::Date => {
            let text = value.as_text();
            let parsed = DATE_INPUT_FORMATS
                .iter()
                .any(|fmt| NaiveDate::parse_from_str(text.trim(), fmt).is_ok());
            if !parsed {
                return Some(FieldOutcome::fail(&field.name, "Please enter a valid date"));
            }
        }
        FieldType::Datetime => {
            let text = value.as_text();
            let parsed = DATETIME_INPUT_FORMATS
                .iter()
                .any(|fmt| NaiveDateTime::parse_from_str(text.trim(), fmt).is_ok());
            if !parsed {
                return Some(FieldOutcome::fail(
                    &field.name,
                    "Please enter a valid date and time",
                ));
            }
        }
        FieldType::Number | FieldType::Currency | FieldType::Percentage => {
            if value.as_number().is_none() {
                return Some(FieldOutcome::fail(
                    &field.name,
                    "Please enter a valid number",
                ));
            }
        }
        _ => {}
    }
    None
}

/// Length constraints: characters for text shapes, selection count for lists
fn check_length(
    field: &FieldDescriptor,
    value: &FieldValue,
    min_length: Option<usize>,
    max_length: Option<usize>,
) -> Option<FieldOutcome> {
    match value_shape(field.ty) {
        ValueShape::List => {
            let count = value.as_list().map(<[String]>::len).unwrap_or(0);
            if let Some(min) = min_length {
                if count < min {
                    return Some(FieldOutcome::fail(
                        &field.name,
                        format!("Select at least {min}"),
                    ));
                }
            }
            if let Some(max) = max_length {
                if count > max {
                    return Some(FieldOutcome::fail(
                        &field.name,
                        format!("Select no more than {max}"),
                    ));
                }
            }
        }
        _ => {
            let len = value.as_text().chars().count();
            if let Some(min) = min_length {
                if len < min {
                    return Some(FieldOutcome::fail(
                        &field.name,
                        format!("Must be at least {min} characters"),
                    ));
                }
            }
            if let Some(max) = max_length {
                if len > max {
                    return Some(FieldOutcome::fail(
                        &field.name,
                        format!("Must not exceed {max} characters"),
                    ));
                }
            }
        }
    }
    None
}

/// Password/confirm-password pairs must match when both are visible and set
fn check_password_confirmation(
    config: &FormConfig,
    state: &FormState,
    visibility: &VisibilityMap,
    report: &mut ValidationReport,
) {
    let passwords: Vec<&FieldDescriptor> = config
        .fields
        .iter()
        .filter(|f| f.ty == FieldType::Password && visibility.is_visible(&f.name))
        .collect();
    let primary = passwords
        .iter()
        .find(|f| !f.name.to_lowercase().contains("confirm"));
    let confirm = passwords
        .iter()
        .find(|f| f.name.to_lowercase().contains("confirm"));
    if let (Some(primary), Some(confirm)) = (primary, confirm) {
        let a = state.get(&primary.name);
        let b = state.get(&confirm.name);
        if let (Some(a), Some(b)) = (a, b) {
            if !a.is_empty() && !b.is_empty() && a.as_text() != b.as_text() {
                report.form_errors.push("Passwords do not match".to_string());
            }
        }
    }
}

/// Whether a named built-in predicate exists
pub fn predicate_exists(name: &str) -> bool {
    matches!(
        name,
        "password_complexity" | "not_future_date" | "ticker_symbol" | "iso_currency"
    )
}

/// Evaluate a built-in predicate; Some(message) on failure
fn eval_predicate(name: &str, value: &FieldValue) -> Option<&'static str> {
    let text = value.as_text();
    let failed = match name {
        "password_complexity" => {
            text.chars().count() < 8
                || !text.chars().any(|c| c.is_ascii_alphabetic())
                || !text.chars().any(|c| c.is_ascii_digit())
        }
        "not_future_date" => DATE_INPUT_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text.trim(), fmt).ok())
            .map(|date| date > Utc::now().date_naive())
            .unwrap_or(false),
        "ticker_symbol" => !ticker_re().is_match(text.trim()),
        "iso_currency" => {
            let t = text.trim();
            t.len() != 3 || !t.chars().all(|c| c.is_ascii_alphabetic())
        }
        _ => false,
    };
    if failed {
        Some(match name {
            "password_complexity" => {
                "Password must be at least 8 characters and include a letter and a number"
            }
            "not_future_date" => "Date cannot be in the future",
            "ticker_symbol" => "Enter a valid ticker symbol",
            "iso_currency" => "Currency must be a 3-letter code",
            _ => "Invalid value",
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{
        ConditionOperator, ConditionalAction, ConditionalRule, FieldDescriptor, ValidationRules,
    };

    fn visible() -> FieldFlags {
        FieldFlags::default()
    }

    fn field(name: &str, label: &str, ty: FieldType) -> FieldDescriptor {
        FieldDescriptor::new(name, label, ty)
    }

    mod required {
        use super::*;

        #[test]
        fn test_required_empty_fails_with_label_message() {
            let f = field("amount", "Amount", FieldType::Currency)
                .with_validation(ValidationRules::required());
            let outcome = validate_field(&f, Some(&FieldValue::text("")), visible());
            assert!(!outcome.ok);
            assert_eq!(outcome.message.as_deref(), Some("Amount is required"));
        }

        #[test]
        fn test_required_absent_value_fails() {
            let f = field("amount", "Amount", FieldType::Currency)
                .with_validation(ValidationRules::required());
            assert!(!validate_field(&f, None, visible()).ok);
        }

        #[test]
        fn test_conditionally_required_empty_fails() {
            let f = field("memo", "Memo", FieldType::Text);
            let flags = FieldFlags {
                required: true,
                ..FieldFlags::default()
            };
            let outcome = validate_field(&f, Some(&FieldValue::text("")), flags);
            assert_eq!(outcome.message.as_deref(), Some("Memo is required"));
        }

        #[test]
        fn test_optional_empty_passes_and_skips_other_rules() {
            let mut rules = ValidationRules::default();
            rules.min_length = Some(5);
            let f = field("note", "Note", FieldType::Text).with_validation(rules);
            assert!(validate_field(&f, Some(&FieldValue::text("")), visible()).ok);
        }
    }

    mod type_checks {
        use super::*;

        #[test]
        fn test_email_shape() {
            let f = field("email", "Email", FieldType::Email);
            assert!(validate_field(&f, Some(&FieldValue::text("a@b.com")), visible()).ok);
            let outcome = validate_field(&f, Some(&FieldValue::text("nope")), visible());
            assert_eq!(
                outcome.message.as_deref(),
                Some("Please enter a valid email address")
            );
        }

        #[test]
        fn test_email_with_broken_domain_suggests_providers() {
            let f = field("email", "Email", FieldType::Email);
            let outcome = validate_field(&f, Some(&FieldValue::text("user@gmail")), visible());
            assert!(!outcome.ok);
            assert!(outcome.suggestions.contains(&"gmail.com".to_string()));
        }

        #[test]
        fn test_url_scheme() {
            let f = field("site", "Site", FieldType::Url);
            assert!(validate_field(&f, Some(&FieldValue::text("https://x.dev")), visible()).ok);
            assert!(!validate_field(&f, Some(&FieldValue::text("x.dev")), visible()).ok);
        }

        #[test]
        fn test_tel_digit_count() {
            let f = field("phone", "Phone", FieldType::Tel);
            assert!(validate_field(&f, Some(&FieldValue::text("(555) 123-4567")), visible()).ok);
            assert!(!validate_field(&f, Some(&FieldValue::text("12345")), visible()).ok);
        }

        #[test]
        fn test_date_parse() {
            let f = field("date", "Date", FieldType::Date);
            assert!(validate_field(&f, Some(&FieldValue::text("2026-03-15")), visible()).ok);
            assert!(validate_field(&f, Some(&FieldValue::text("03/15/2026")), visible()).ok);
            let outcome = validate_field(&f, Some(&FieldValue::text("someday")), visible());
            assert_eq!(outcome.message.as_deref(), Some("Please enter a valid date"));
        }

        #[test]
        fn test_numeric_parse() {
            let f = field("n", "N", FieldType::Number);
            let outcome = validate_field(&f, Some(&FieldValue::text("abc")), visible());
            assert_eq!(
                outcome.message.as_deref(),
                Some("Please enter a valid number")
            );
        }
    }

    mod bounds_and_length {
        use super::*;

        #[test]
        fn test_negative_amount_below_min_fails() {
            let mut rules = ValidationRules::required();
            rules.min = Some(0.01);
            let f = field("amount", "Amount", FieldType::Currency).with_validation(rules);
            let outcome = validate_field(&f, Some(&FieldValue::text("-5")), visible());
            assert!(!outcome.ok);
            assert_eq!(
                outcome.message.as_deref(),
                Some("Value must be at least 0.01")
            );
        }

        #[test]
        fn test_bounds_are_inclusive() {
            let mut rules = ValidationRules::default();
            rules.min = Some(1.0);
            rules.max = Some(10.0);
            let f = field("n", "N", FieldType::Number).with_validation(rules);
            assert!(validate_field(&f, Some(&FieldValue::text("1")), visible()).ok);
            assert!(validate_field(&f, Some(&FieldValue::text("10")), visible()).ok);
            let outcome = validate_field(&f, Some(&FieldValue::text("10.01")), visible());
            assert_eq!(
                outcome.message.as_deref(),
                Some("Value must not exceed 10")
            );
        }

        #[test]
        fn test_text_length_bounds() {
            let mut rules = ValidationRules::default();
            rules.min_length = Some(3);
            rules.max_length = Some(5);
            let f = field("code", "Code", FieldType::Text).with_validation(rules);
            assert!(
                validate_field(&f, Some(&FieldValue::text("ab")), visible())
                    .message
                    .as_deref()
                    == Some("Must be at least 3 characters")
            );
            assert!(validate_field(&f, Some(&FieldValue::text("abcd")), visible()).ok);
            assert!(
                validate_field(&f, Some(&FieldValue::text("abcdef")), visible())
                    .message
                    .as_deref()
                    == Some("Must not exceed 5 characters")
            );
        }

        #[test]
        fn test_list_length_is_selection_count() {
            let mut rules = ValidationRules::default();
            rules.max_length = Some(2);
            let f = field("tags", "Tags", FieldType::Multiselect).with_validation(rules);
            let three = FieldValue::List(vec!["a".into(), "b".into(), "c".into()]);
            let outcome = validate_field(&f, Some(&three), visible());
            assert_eq!(outcome.message.as_deref(), Some("Select no more than 2"));
        }
    }

    mod patterns_and_predicates {
        use super::*;

        fn sealed_field(rules: ValidationRules, ty: FieldType) -> FieldDescriptor {
            let f = field("value", "Value", ty).with_validation(rules);
            let config = FormConfig::new("t", vec![f]).seal().unwrap();
            config.field("value").unwrap().clone()
        }

        #[test]
        fn test_pattern_mismatch_uses_custom_message() {
            let mut rules = ValidationRules::default();
            rules.pattern = Some(r"^\d{4}$".to_string());
            rules.custom_message = Some("Enter a 4-digit code".to_string());
            let f = sealed_field(rules, FieldType::Text);
            let outcome = validate_field(&f, Some(&FieldValue::text("12")), visible());
            assert_eq!(outcome.message.as_deref(), Some("Enter a 4-digit code"));
        }

        #[test]
        fn test_pattern_mismatch_falls_back_to_invalid_format() {
            let mut rules = ValidationRules::default();
            rules.pattern = Some(r"^\d{4}$".to_string());
            let f = sealed_field(rules, FieldType::Text);
            let outcome = validate_field(&f, Some(&FieldValue::text("12")), visible());
            assert_eq!(outcome.message.as_deref(), Some("Invalid format"));
        }

        #[test]
        fn test_password_complexity_predicate() {
            let mut rules = ValidationRules::default();
            rules.predicate = Some("password_complexity".to_string());
            let f = sealed_field(rules, FieldType::Password);
            assert!(!validate_field(&f, Some(&FieldValue::text("short1")), visible()).ok);
            assert!(!validate_field(&f, Some(&FieldValue::text("allletters")), visible()).ok);
            assert!(validate_field(&f, Some(&FieldValue::text("secret123")), visible()).ok);
        }

        #[test]
        fn test_not_future_date_predicate() {
            let mut rules = ValidationRules::default();
            rules.predicate = Some("not_future_date".to_string());
            let f = sealed_field(rules, FieldType::Date);
            assert!(validate_field(&f, Some(&FieldValue::text("2020-01-01")), visible()).ok);
            let outcome = validate_field(&f, Some(&FieldValue::text("2099-01-01")), visible());
            assert_eq!(outcome.message.as_deref(), Some("Date cannot be in the future"));
        }

        #[test]
        fn test_ticker_and_currency_predicates() {
            let mut rules = ValidationRules::default();
            rules.predicate = Some("ticker_symbol".to_string());
            let f = sealed_field(rules, FieldType::Text);
            assert!(validate_field(&f, Some(&FieldValue::text("BRK.B")), visible()).ok);
            assert!(!validate_field(&f, Some(&FieldValue::text("br k")), visible()).ok);

            let mut rules = ValidationRules::default();
            rules.predicate = Some("iso_currency".to_string());
            let f = sealed_field(rules, FieldType::Text);
            assert!(validate_field(&f, Some(&FieldValue::text("USD")), visible()).ok);
            assert!(!validate_field(&f, Some(&FieldValue::text("US")), visible()).ok);
        }
    }

    mod form_level {
        use super::*;

        fn registration() -> FormConfig {
            FormConfig::new(
                "reg",
                vec![
                    field("password", "Password", FieldType::Password)
                        .with_validation(ValidationRules::required()),
                    field("confirm_password", "Confirm password", FieldType::Password)
                        .with_validation(ValidationRules::required()),
                ],
            )
            .seal()
            .unwrap()
        }

        #[test]
        fn test_password_mismatch_is_a_form_error() {
            let cfg = registration();
            let mut state = FormState::from_config(&cfg);
            state.set("password", FieldValue::text("secret123"));
            state.set("confirm_password", FieldValue::text("secret124"));
            let map = VisibilityMap::evaluate(&cfg, &state);
            let report = validate_form(&cfg, &state, &map);
            assert!(!report.ok());
            assert_eq!(report.form_errors, vec!["Passwords do not match"]);
        }

        #[test]
        fn test_matching_passwords_pass() {
            let cfg = registration();
            let mut state = FormState::from_config(&cfg);
            state.set("password", FieldValue::text("secret123"));
            state.set("confirm_password", FieldValue::text("secret123"));
            let map = VisibilityMap::evaluate(&cfg, &state);
            assert!(validate_form(&cfg, &state, &map).ok());
        }

        #[test]
        fn test_hidden_required_field_is_exempt() {
            let cfg = FormConfig::new(
                "f",
                vec![
                    field("type", "Type", FieldType::Text),
                    field("category", "Category", FieldType::Text)
                        .with_validation(ValidationRules::required())
                        .with_conditional(ConditionalRule::new(
                            "type",
                            ConditionOperator::Equals,
                            Some(FieldValue::text("expense")),
                            ConditionalAction::Show,
                        )),
                ],
            )
            .seal()
            .unwrap();

            let mut state = FormState::from_config(&cfg);
            state.set("type", FieldValue::text("income"));
            let map = VisibilityMap::evaluate(&cfg, &state);
            assert!(validate_form(&cfg, &state, &map).ok());

            state.set("type", FieldValue::text("expense"));
            let map = VisibilityMap::evaluate(&cfg, &state);
            let report = validate_form(&cfg, &state, &map);
            assert_eq!(
                report.field_errors.get("category").map(String::as_str),
                Some("Category is required")
            );
        }

        #[test]
        fn test_disabled_field_is_exempt() {
            let mut f = field("frozen", "Frozen", FieldType::Text);
            f.disabled = true;
            f.validation = Some(ValidationRules::required());
            let cfg = FormConfig::new("f", vec![f]).seal().unwrap();
            let state = FormState::from_config(&cfg);
            let map = VisibilityMap::evaluate(&cfg, &state);
            assert!(validate_form(&cfg, &state, &map).ok());
        }
    }
}
