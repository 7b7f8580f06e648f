//! Field type tags and runtime field values

use serde::{Deserialize, Serialize};

/// Closed set of supported field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Email,
    Password,
    Number,
    Currency,
    Percentage,
    Date,
    Datetime,
    Tel,
    Url,
    Textarea,
    Select,
    Multiselect,
    Switch,
    CheckboxGroup,
    RadioGroup,
    File,
}

impl FieldType {
    /// Whether this type carries a list of choice options
    pub fn needs_options(&self) -> bool {
        matches!(
            self,
            FieldType::Select
                | FieldType::Multiselect
                | FieldType::CheckboxGroup
                | FieldType::RadioGroup
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Number => "number",
            FieldType::Currency => "currency",
            FieldType::Percentage => "percentage",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Tel => "tel",
            FieldType::Url => "url",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Multiselect => "multiselect",
            FieldType::Switch => "switch",
            FieldType::CheckboxGroup => "checkbox-group",
            FieldType::RadioGroup => "radio-group",
            FieldType::File => "file",
        }
    }
}

/// Current value of one field
///
/// Untagged so that serialized form data reads as plain JSON scalars/arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    /// Empty means "the user has entered nothing"
    ///
    /// A switched-off toggle and the number zero are real values, not empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Number(_) | FieldValue::Bool(_) => false,
        }
    }

    /// Text rendering of the value for display and comparison
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format_plain_number(*n),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::List(items) => items.join(", "),
        }
    }

    /// Numeric interpretation, tolerating formatted text ("$1,234.00")
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => crate::forms::parse_numeric(s),
            FieldValue::Bool(_) | FieldValue::List(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Render an f64 without a trailing ".0" for whole numbers
fn format_plain_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod field_type {
        use super::*;

        #[test]
        fn test_choice_types_need_options() {
            assert!(FieldType::Select.needs_options());
            assert!(FieldType::Multiselect.needs_options());
            assert!(FieldType::CheckboxGroup.needs_options());
            assert!(FieldType::RadioGroup.needs_options());
            assert!(!FieldType::Text.needs_options());
            assert!(!FieldType::Switch.needs_options());
        }

        #[test]
        fn test_deserialize_kebab_case_tag() {
            let ty: FieldType = serde_json::from_str("\"checkbox-group\"").unwrap();
            assert_eq!(ty, FieldType::CheckboxGroup);
        }

        #[test]
        fn test_unknown_tag_is_an_error() {
            let result = serde_json::from_str::<FieldType>("\"hologram\"");
            assert!(result.is_err());
        }
    }

    mod field_value {
        use super::*;

        #[test]
        fn test_default_is_empty_text() {
            assert!(FieldValue::default().is_empty());
        }

        #[test]
        fn test_whitespace_text_is_empty() {
            assert!(FieldValue::text("   ").is_empty());
        }

        #[test]
        fn test_zero_and_false_are_not_empty() {
            assert!(!FieldValue::Number(0.0).is_empty());
            assert!(!FieldValue::Bool(false).is_empty());
        }

        #[test]
        fn test_empty_list_is_empty() {
            assert!(FieldValue::List(vec![]).is_empty());
            assert!(!FieldValue::List(vec!["a".into()]).is_empty());
        }

        #[test]
        fn test_as_number_parses_formatted_text() {
            assert_eq!(FieldValue::text("$1,234.50").as_number(), Some(1234.5));
            assert_eq!(FieldValue::Number(7.0).as_number(), Some(7.0));
            assert_eq!(FieldValue::text("abc").as_number(), None);
        }

        #[test]
        fn test_as_text_renders_whole_numbers_without_fraction() {
            assert_eq!(FieldValue::Number(42.0).as_text(), "42");
            assert_eq!(FieldValue::Number(1.5).as_text(), "1.5");
        }

        #[test]
        fn test_untagged_serde_round_trip() {
            let value = FieldValue::List(vec!["a".into(), "b".into()]);
            let json = serde_json::to_string(&value).unwrap();
            assert_eq!(json, r#"["a","b"]"#);
            let back: FieldValue = serde_json::from_str(&json).unwrap();
            assert_eq!(back, value);
        }
    }
}
