//! Live form state: field name to current value
//!
//! Owned exclusively by one orchestrator for the lifetime of a mounted form.
//! Reset restores configured defaults and clears the dirty flag.

use crate::forms::{empty_value, FieldValue, FormConfig};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct FormState {
    values: BTreeMap<String, FieldValue>,
    dirty: bool,
}

impl FormState {
    /// Initialize from a sealed configuration, applying declared defaults
    pub fn from_config(config: &FormConfig) -> Self {
        let values = config
            .fields
            .iter()
            .map(|f| {
                let value = f
                    .default_value
                    .clone()
                    .unwrap_or_else(|| empty_value(f.ty));
                (f.name.clone(), value)
            })
            .collect();
        Self {
            values,
            dirty: false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Replace a field's value and mark the form dirty
    pub fn set(&mut self, name: &str, value: FieldValue) {
        self.values.insert(name.to_string(), value);
        self.dirty = true;
    }

    /// Mutable access for in-place edits (typing); marks the form dirty
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.dirty = true;
        self.values.get_mut(name)
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Restore configured defaults and clear the dirty flag
    pub fn reset(&mut self, config: &FormConfig) {
        *self = Self::from_config(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{FieldDescriptor, FieldType};

    fn config() -> FormConfig {
        FormConfig::new(
            "f",
            vec![
                FieldDescriptor::new("note", "Note", FieldType::Text),
                FieldDescriptor::new("currency", "Currency", FieldType::Text)
                    .with_default(FieldValue::text("USD")),
                FieldDescriptor::new("active", "Active", FieldType::Switch),
            ],
        )
        .seal()
        .unwrap()
    }

    #[test]
    fn test_initializes_defaults_and_empties() {
        let state = FormState::from_config(&config());
        assert_eq!(state.get("note"), Some(&FieldValue::text("")));
        assert_eq!(state.get("currency"), Some(&FieldValue::text("USD")));
        assert_eq!(state.get("active"), Some(&FieldValue::Bool(false)));
        assert!(!state.is_dirty());
    }

    #[test]
    fn test_set_marks_dirty() {
        let mut state = FormState::from_config(&config());
        state.set("note", FieldValue::text("lunch"));
        assert!(state.is_dirty());
        assert_eq!(state.get("note"), Some(&FieldValue::text("lunch")));
    }

    #[test]
    fn test_reset_restores_defaults_and_clears_dirty() {
        let cfg = config();
        let mut state = FormState::from_config(&cfg);
        state.set("currency", FieldValue::text("EUR"));
        state.reset(&cfg);
        assert_eq!(state.get("currency"), Some(&FieldValue::text("USD")));
        assert!(!state.is_dirty());
    }

    #[test]
    fn test_unknown_field_reads_none() {
        let state = FormState::from_config(&config());
        assert!(state.get("ghost").is_none());
    }
}
