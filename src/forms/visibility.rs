//! Conditional visibility engine
//!
//! Derives per-field show/require/disable flags by evaluating every
//! conditional rule against the full form state. The map is recomputed from
//! scratch on every state change, never patched incrementally. O(fields x
//! rules) per recompute, which is fine at the form sizes this app uses.

use crate::forms::{ConditionOperator, ConditionalAction, ConditionalRule, FieldValue, FormConfig, FormState};
use std::collections::BTreeMap;

/// Derived flags for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldFlags {
    pub visible: bool,
    /// Required by a conditional rule, in addition to the field's own rules
    pub required: bool,
    pub disabled: bool,
}

impl Default for FieldFlags {
    fn default() -> Self {
        Self {
            visible: true,
            required: false,
            disabled: false,
        }
    }
}

/// Derived flags for every field of a form
#[derive(Debug, Clone, Default)]
pub struct VisibilityMap {
    flags: BTreeMap<String, FieldFlags>,
}

impl VisibilityMap {
    /// Evaluate all conditional rules against the current state
    pub fn evaluate(config: &FormConfig, state: &FormState) -> Self {
        let flags = config
            .fields
            .iter()
            .map(|field| {
                let mut flags = FieldFlags {
                    disabled: field.disabled,
                    ..FieldFlags::default()
                };
                apply_rules(&mut flags, &field.conditional, state);
                (field.name.clone(), flags)
            })
            .collect();
        Self { flags }
    }

    pub fn flags(&self, name: &str) -> FieldFlags {
        self.flags.get(name).copied().unwrap_or_default()
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.flags(name).visible
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.flags(name).disabled
    }

    /// Required via a conditional require rule
    pub fn is_required(&self, name: &str) -> bool {
        self.flags(name).required
    }
}

/// Rules of the same action AND together; the action applies only when all
/// of its rules pass.
fn apply_rules(flags: &mut FieldFlags, rules: &[ConditionalRule], state: &FormState) {
    for action in [
        ConditionalAction::Show,
        ConditionalAction::Hide,
        ConditionalAction::Require,
        ConditionalAction::Disable,
    ] {
        let of_action: Vec<&ConditionalRule> =
            rules.iter().filter(|r| r.action == action).collect();
        if of_action.is_empty() {
            continue;
        }
        let all_pass = of_action
            .iter()
            .all(|rule| condition_met(rule, state.get(&rule.field)));
        match action {
            ConditionalAction::Show => flags.visible = all_pass,
            ConditionalAction::Hide => {
                if all_pass {
                    flags.visible = false;
                }
            }
            ConditionalAction::Require => flags.required = all_pass,
            ConditionalAction::Disable => {
                if all_pass {
                    flags.disabled = true;
                }
            }
        }
    }
}

/// Evaluate one rule against the target field's current value
///
/// An absent value counts as empty. Comparisons with a missing operand never
/// pass.
pub fn condition_met(rule: &ConditionalRule, actual: Option<&FieldValue>) -> bool {
    let is_empty = actual.map_or(true, FieldValue::is_empty);
    match rule.operator {
        ConditionOperator::IsEmpty => is_empty,
        ConditionOperator::IsNotEmpty => !is_empty,
        ConditionOperator::Equals => compare_eq(rule, actual).unwrap_or(false),
        ConditionOperator::NotEquals => compare_eq(rule, actual).map(|eq| !eq).unwrap_or(false),
        ConditionOperator::Contains => contains(rule, actual).unwrap_or(false),
        ConditionOperator::NotContains => contains(rule, actual).map(|c| !c).unwrap_or(false),
        ConditionOperator::GreaterThan => compare_numeric(rule, actual)
            .map(|(a, b)| a > b)
            .unwrap_or(false),
        ConditionOperator::LessThan => compare_numeric(rule, actual)
            .map(|(a, b)| a < b)
            .unwrap_or(false),
    }
}

/// Numeric equality when both sides parse as numbers, text equality otherwise
fn compare_eq(rule: &ConditionalRule, actual: Option<&FieldValue>) -> Option<bool> {
    let expected = rule.value.as_ref()?;
    let actual = actual?;
    if let (Some(a), Some(b)) = (actual.as_number(), expected.as_number()) {
        return Some(a == b);
    }
    Some(actual.as_text() == expected.as_text())
}

fn contains(rule: &ConditionalRule, actual: Option<&FieldValue>) -> Option<bool> {
    let expected = rule.value.as_ref()?.as_text();
    let actual = actual?;
    match actual {
        FieldValue::List(items) => Some(items.iter().any(|i| *i == expected)),
        other => Some(other.as_text().contains(&expected)),
    }
}

fn compare_numeric(rule: &ConditionalRule, actual: Option<&FieldValue>) -> Option<(f64, f64)> {
    let expected = rule.value.as_ref()?.as_number()?;
    let actual = actual?.as_number()?;
    Some((actual, expected))
}
