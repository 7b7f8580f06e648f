//! Declarative rule objects attached to field descriptors
//!
//! Rules are plain data interpreted at runtime: validation constraints,
//! conditional visibility predicates, and formatting declarations.

use crate::forms::FieldValue;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Per-field validation constraints, composed with AND semantics
///
/// Evaluated in declaration order; the first failing constraint's message
/// wins. `pattern` is compiled once when the configuration is sealed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub required: bool,
    /// Inclusive numeric lower bound
    pub min: Option<f64>,
    /// Inclusive numeric upper bound
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    /// Name of a built-in predicate (see `validation::predicates`)
    pub predicate: Option<String>,
    /// Overrides the pattern/predicate failure message
    pub custom_message: Option<String>,

    #[serde(skip)]
    pub(crate) compiled_pattern: Option<Regex>,
}

impl ValidationRules {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }
}

/// Operator of a conditional rule, applied to the target field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
}

/// What a passing conditional rule does to its field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalAction {
    Show,
    Hide,
    Require,
    Disable,
}

/// One conditional rule: a predicate over another field's current value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionalRule {
    /// Name of the field this rule inspects
    pub field: String,
    pub operator: ConditionOperator,
    /// Comparison operand; unused by is_empty / is_not_empty
    #[serde(default)]
    pub value: Option<FieldValue>,
    pub action: ConditionalAction,
}

impl ConditionalRule {
    pub fn new(
        field: impl Into<String>,
        operator: ConditionOperator,
        value: Option<FieldValue>,
        action: ConditionalAction,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            action,
        }
    }
}

/// Display formatting applied to a field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormattingType {
    Currency,
    Percentage,
    Phone,
    Date,
    Number,
}

/// Formatting declaration with type-specific options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattingRule {
    #[serde(rename = "type")]
    pub ty: FormattingType,
    /// Decimal places for numeric formats
    pub decimals: Option<u8>,
    /// Currency symbol, defaults to "$"
    pub symbol: Option<String>,
    /// Thousands separator for number formats, defaults to ","
    pub thousands_separator: Option<char>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    /// chrono format string for date formats, defaults to "%m/%d/%Y"
    pub date_format: Option<String>,
}

impl FormattingRule {
    pub fn of(ty: FormattingType) -> Self {
        Self {
            ty,
            decimals: None,
            symbol: None,
            thousands_separator: None,
            prefix: None,
            suffix: None,
            date_format: None,
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = Some(decimals);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_rules_deserialize_partial() {
        let json = r#"{"required": true, "min": 0.01}"#;
        let rules: ValidationRules = serde_json::from_str(json).unwrap();
        assert!(rules.required);
        assert_eq!(rules.min, Some(0.01));
        assert!(rules.max.is_none());
        assert!(rules.pattern.is_none());
    }

    #[test]
    fn test_conditional_rule_deserialize() {
        let json = r#"{"field": "type", "operator": "equals", "value": "expense", "action": "show"}"#;
        let rule: ConditionalRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.field, "type");
        assert_eq!(rule.operator, ConditionOperator::Equals);
        assert_eq!(rule.value, Some(FieldValue::text("expense")));
        assert_eq!(rule.action, ConditionalAction::Show);
    }

    #[test]
    fn test_is_empty_rule_needs_no_operand() {
        let json = r#"{"field": "notes", "operator": "is_empty", "action": "hide"}"#;
        let rule: ConditionalRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.operator, ConditionOperator::IsEmpty);
        assert!(rule.value.is_none());
    }

    #[test]
    fn test_formatting_rule_deserialize() {
        let json = r#"{"type": "currency", "decimals": 2, "symbol": "€"}"#;
        let rule: FormattingRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.ty, FormattingType::Currency);
        assert_eq!(rule.decimals, Some(2));
        assert_eq!(rule.symbol.as_deref(), Some("€"));
    }
}
