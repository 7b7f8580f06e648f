//! Form configuration: field descriptors and form-level metadata
//!
//! A `FormConfig` is deserialized from JSON (or built in code) and then
//! sealed. Sealing performs every load-time check so that later evaluation
//! can trust the configuration: names are unique and well formed, choice
//! fields have options, patterns compile, conditional rules target real
//! fields and form no cycles, and the rate-limit declaration parses.

use crate::forms::{
    predicate_exists, ConditionalRule, ConfigError, FieldType, FieldValue, FormattingRule,
    ValidationRules,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use std::time::Duration;
use uuid::Uuid;

fn field_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").expect("static pattern"))
}

/// One entry of a choice field's option list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            disabled: false,
            description: None,
        }
    }
}

/// Static declaration of one form field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Assigned when the configuration is sealed
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub default_value: Option<FieldValue>,
    #[serde(default)]
    pub validation: Option<ValidationRules>,
    #[serde(default)]
    pub formatting: Option<FormattingRule>,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub conditional: Vec<ConditionalRule>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub readonly: bool,
    /// Columns spanned in grid layout (1-12)
    #[serde(default)]
    pub grid_span: Option<u8>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, ty: FieldType) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            label: label.into(),
            ty,
            placeholder: None,
            help_text: None,
            default_value: None,
            validation: None,
            formatting: None,
            options: Vec::new(),
            conditional: Vec::new(),
            disabled: false,
            readonly: false,
            grid_span: None,
        }
    }

    pub fn with_validation(mut self, rules: ValidationRules) -> Self {
        self.validation = Some(rules);
        self
    }

    pub fn with_formatting(mut self, rule: FormattingRule) -> Self {
        self.formatting = Some(rule);
        self
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_conditional(mut self, rule: ConditionalRule) -> Self {
        self.conditional.push(rule);
        self
    }

    pub fn with_default(mut self, value: FieldValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    pub fn with_help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }
}

/// Form layout mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormLayout {
    #[default]
    Single,
    TwoColumn,
    Grid,
}

/// Parsed rate-limit declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_attempts: u32,
    pub window: Duration,
}

/// Parse "N/second", "N/minute", or "N/hour"
fn parse_rate_limit(spec: &str) -> Result<RateLimit, ConfigError> {
    let invalid = || ConfigError::InvalidRateLimit(spec.to_string());
    let (count, unit) = spec.split_once('/').ok_or_else(invalid)?;
    let max_attempts: u32 = count.trim().parse().map_err(|_| invalid())?;
    if max_attempts == 0 {
        return Err(invalid());
    }
    let window = match unit.trim() {
        "second" | "sec" | "s" => Duration::from_secs(1),
        "minute" | "min" | "m" => Duration::from_secs(60),
        "hour" | "h" => Duration::from_secs(3600),
        _ => return Err(invalid()),
    };
    Ok(RateLimit {
        max_attempts,
        window,
    })
}

fn default_submit_text() -> String {
    "Submit".to_string()
}

fn default_reset_text() -> String {
    "Reset".to_string()
}

fn default_true() -> bool {
    true
}

/// Ordered field list plus form-level metadata
///
/// Immutable once sealed; the orchestrator only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub layout: FormLayout,
    #[serde(default = "default_submit_text")]
    pub submit_text: String,
    #[serde(default = "default_reset_text")]
    pub reset_text: String,
    #[serde(default = "default_true")]
    pub show_reset: bool,
    #[serde(default)]
    pub auto_save: bool,
    #[serde(default = "default_true")]
    pub real_time_validation: bool,
    /// Rate-limit declaration, e.g. "5/minute"
    #[serde(default)]
    pub rate_limit: Option<String>,

    #[serde(skip)]
    rate_limit_spec: Option<RateLimit>,
}

impl FormConfig {
    pub fn new(id: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            fields,
            layout: FormLayout::default(),
            submit_text: default_submit_text(),
            reset_text: default_reset_text(),
            show_reset: true,
            auto_save: false,
            real_time_validation: true,
            rate_limit: None,
            rate_limit_spec: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_submit_text(mut self, text: impl Into<String>) -> Self {
        self.submit_text = text.into();
        self
    }

    pub fn with_rate_limit(mut self, spec: impl Into<String>) -> Self {
        self.rate_limit = Some(spec.into());
        self
    }

    pub fn with_auto_save(mut self) -> Self {
        self.auto_save = true;
        self
    }

    pub fn with_layout(mut self, layout: FormLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Deserialize and seal a configuration from JSON
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: FormConfig = serde_json::from_str(json)?;
        Ok(config.seal()?)
    }

    /// Run every load-time check and freeze the configuration
    pub fn seal(mut self) -> Result<Self, ConfigError> {
        if self.fields.is_empty() {
            return Err(ConfigError::EmptyForm);
        }
        if self.id.is_empty() {
            self.id = Uuid::new_v4().to_string();
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !field_name_re().is_match(&field.name) {
                return Err(ConfigError::InvalidFieldName(field.name.clone()));
            }
            if !seen.insert(field.name.clone()) {
                return Err(ConfigError::DuplicateField(field.name.clone()));
            }
            if field.ty.needs_options() && field.options.is_empty() {
                return Err(ConfigError::MissingOptions {
                    field: field.name.clone(),
                    ty: field.ty.label(),
                });
            }
        }

        // Conditional rules must target declared fields
        let names: HashSet<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();
        for field in &self.fields {
            for rule in &field.conditional {
                if !names.contains(rule.field.as_str()) {
                    return Err(ConfigError::UnknownTargetField {
                        field: field.name.clone(),
                        target: rule.field.clone(),
                    });
                }
            }
        }
        self.check_conditional_cycles()?;

        // Compile patterns and resolve predicate names once
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.id = format!("{}_field_{}", self.id, i);
            if let Some(rules) = field.validation.as_mut() {
                if let Some(pattern) = rules.pattern.as_deref() {
                    let compiled =
                        Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                            field: field.name.clone(),
                            source,
                        })?;
                    rules.compiled_pattern = Some(compiled);
                }
                if let Some(name) = rules.predicate.as_deref() {
                    if !predicate_exists(name) {
                        return Err(ConfigError::UnknownPredicate {
                            field: field.name.clone(),
                            name: name.to_string(),
                        });
                    }
                }
            }
        }

        if let Some(spec) = self.rate_limit.as_deref() {
            self.rate_limit_spec = Some(parse_rate_limit(spec)?);
        }
        Ok(self)
    }

    /// Detect cycles in the field dependency graph formed by conditional rules
    fn check_conditional_cycles(&self) -> Result<(), ConfigError> {
        let deps: HashMap<&str, Vec<&str>> = self
            .fields
            .iter()
            .map(|f| {
                (
                    f.name.as_str(),
                    f.conditional.iter().map(|r| r.field.as_str()).collect(),
                )
            })
            .collect();

        // 0 = unvisited, 1 = on the current path, 2 = done
        let mut mark: HashMap<&str, u8> = HashMap::new();
        for start in deps.keys() {
            if mark.get(start).copied().unwrap_or(0) != 0 {
                continue;
            }
            let mut path: Vec<&str> = Vec::new();
            let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
            while let Some((node, next)) = stack.pop() {
                if next == 0 {
                    mark.insert(node, 1);
                    path.push(node);
                }
                let targets = &deps[node];
                if next < targets.len() {
                    stack.push((node, next + 1));
                    let target = targets[next];
                    match mark.get(target).copied().unwrap_or(0) {
                        1 => {
                            let from = path.iter().position(|n| *n == target).unwrap_or(0);
                            let mut cycle: Vec<String> =
                                path[from..].iter().map(|s| s.to_string()).collect();
                            cycle.push(target.to_string());
                            return Err(ConfigError::ConditionalCycle(cycle));
                        }
                        0 => stack.push((target, 0)),
                        _ => {}
                    }
                } else {
                    mark.insert(node, 2);
                    path.pop();
                }
            }
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn rate_limit_spec(&self) -> Option<RateLimit> {
        self.rate_limit_spec
    }
}
