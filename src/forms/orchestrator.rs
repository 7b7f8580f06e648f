//! Form orchestrator
//!
//! Owns the state of one mounted form and wires the registry, validation
//! resolver, visibility engine, and formatter together. Drives explicit
//! submission and debounced auto-save through the caller-supplied async
//! submit collaborator. All clock inputs are passed in explicitly.

use crate::forms::{
    format_value, render_strategy, sanitize_value, validate_field, validate_form, value_shape,
    EventRecorder, FieldDescriptor, FieldValue, FormConfig, FormEventKind, FormState,
    RateLimit, RenderStrategy, ValidationReport, ValueShape, VisibilityMap,
};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

/// Pause after the last edit before an auto-save fires
pub const AUTO_SAVE_DEBOUNCE: Duration = Duration::from_secs(2);

/// How long a saved/error auto-save status stays visible
pub const AUTO_SAVE_STATUS_CLEAR: Duration = Duration::from_secs(3);

/// What the submit collaborator reports back
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub success: bool,
    /// Per-field errors reported by the backend
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SubmitOutcome {
    pub fn accepted() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }
}

/// Async submit collaborator
///
/// The engine treats this as opaque; it may talk HTTP, a file, or a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    async fn submit(
        &mut self,
        form_id: &str,
        data: BTreeMap<String, FieldValue>,
    ) -> Result<SubmitOutcome>;
}

/// Observable submission phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
}

/// Result of one explicit submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Validation failed; the collaborator was not invoked
    Rejected(ValidationReport),
    /// Pre-submit guard tripped; the collaborator was not invoked
    RateLimited { retry_after: Duration },
    /// The collaborator rejected or errored
    Failed { message: String },
    Accepted,
}

/// Auto-save sub-state, independent of explicit submission
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AutoSaveStatus {
    #[default]
    Idle,
    Saving,
    Saved {
        at: Instant,
    },
    Error {
        message: String,
        at: Instant,
    },
}

/// Sliding-window attempt guard for one form
#[derive(Debug, Clone)]
struct RateLimiter {
    spec: RateLimit,
    attempts: VecDeque<Instant>,
}

impl RateLimiter {
    fn new(spec: RateLimit) -> Self {
        Self {
            spec,
            attempts: VecDeque::new(),
        }
    }

    /// Time until the next attempt is allowed, if currently over the limit
    fn retry_after(&mut self, now: Instant) -> Option<Duration> {
        while let Some(front) = self.attempts.front() {
            if now.duration_since(*front) >= self.spec.window {
                self.attempts.pop_front();
            } else {
                break;
            }
        }
        if self.attempts.len() >= self.spec.max_attempts as usize {
            let oldest = *self.attempts.front()?;
            Some(self.spec.window.saturating_sub(now.duration_since(oldest)))
        } else {
            None
        }
    }

    fn record(&mut self, now: Instant) {
        self.attempts.push_back(now);
    }
}

/// Owns one mounted form instance
pub struct FormOrchestrator {
    config: FormConfig,
    state: FormState,
    visibility: VisibilityMap,
    phase: SubmitPhase,
    /// Index into the visible field list; one past the end is the buttons row
    active_field: usize,
    /// Highlighted option for the active choice field
    choice_cursor: usize,
    field_errors: BTreeMap<String, String>,
    form_error: Option<String>,
    rate_limiter: Option<RateLimiter>,
    auto_save_status: AutoSaveStatus,
    last_edit: Option<Instant>,
    analytics: EventRecorder,
}

impl FormOrchestrator {
    /// Mount a sealed configuration
    pub fn new(config: FormConfig) -> Self {
        let state = FormState::from_config(&config);
        let visibility = VisibilityMap::evaluate(&config, &state);
        let rate_limiter = config.rate_limit_spec().map(RateLimiter::new);
        let mut analytics = EventRecorder::new(config.id.clone());
        analytics.record(FormEventKind::FormView, None);
        Self {
            config,
            state,
            visibility,
            phase: SubmitPhase::Idle,
            active_field: 0,
            choice_cursor: 0,
            field_errors: BTreeMap::new(),
            form_error: None,
            rate_limiter,
            auto_save_status: AutoSaveStatus::Idle,
            last_edit: None,
            analytics,
        }
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn visibility(&self) -> &VisibilityMap {
        &self.visibility
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn field_error(&self, name: &str) -> Option<&str> {
        self.field_errors.get(name).map(String::as_str)
    }

    pub fn auto_save_status(&self) -> &AutoSaveStatus {
        &self.auto_save_status
    }

    pub fn analytics(&self) -> &EventRecorder {
        &self.analytics
    }

    pub fn analytics_mut(&mut self) -> &mut EventRecorder {
        &mut self.analytics
    }

    pub fn choice_cursor(&self) -> usize {
        self.choice_cursor
    }

    /// Fields currently shown, in declaration order
    pub fn visible_fields(&self) -> Vec<&FieldDescriptor> {
        self.config
            .fields
            .iter()
            .filter(|f| self.visibility.is_visible(&f.name))
            .collect()
    }

    pub fn active_field_index(&self) -> usize {
        self.active_field
    }

    pub fn is_buttons_row_active(&self) -> bool {
        self.active_field >= self.visible_fields().len()
    }

    pub fn active_field_descriptor(&self) -> Option<&FieldDescriptor> {
        self.visible_fields().get(self.active_field).copied()
    }

    /// Move focus to the next visible field, wrapping through the buttons row
    pub fn next_field(&mut self) {
        let count = self.visible_fields().len() + 1;
        self.move_focus((self.active_field + 1) % count);
    }

    pub fn prev_field(&mut self) {
        let count = self.visible_fields().len() + 1;
        self.move_focus((self.active_field + count - 1) % count);
    }

    fn move_focus(&mut self, index: usize) {
        if let Some(field) = self.active_field_descriptor() {
            let name = field.name.clone();
            self.analytics.record(FormEventKind::FieldBlur, Some(&name));
        }
        self.active_field = index;
        self.choice_cursor = self.current_choice_position();
        if let Some(field) = self.active_field_descriptor() {
            let name = field.name.clone();
            self.analytics.record(FormEventKind::FieldFocus, Some(&name));
        }
    }

    /// Start the option cursor on the currently selected option
    fn current_choice_position(&self) -> usize {
        let Some(field) = self.active_field_descriptor() else {
            return 0;
        };
        let Some(value) = self.state.get(&field.name) else {
            return 0;
        };
        field
            .options
            .iter()
            .position(|o| o.value == value.as_text())
            .unwrap_or(0)
    }

    /// Replace a field's value directly
    pub fn set_value(&mut self, name: &str, value: FieldValue, now: Instant) {
        self.state.set(name, value);
        self.after_edit(name, now);
    }

    /// Type a character into the active field
    pub fn input_char(&mut self, c: char, now: Instant) {
        let Some(field) = self.active_field_descriptor() else {
            return;
        };
        if field.readonly || self.visibility.is_disabled(&field.name) {
            return;
        }
        let name = field.name.clone();
        let shape = value_shape(field.ty);
        let accepted = match shape {
            ValueShape::Numeric => c.is_ascii_digit() || c == '.' || c == '-',
            ValueShape::Text | ValueShape::FilePath => c != '\r',
            ValueShape::Boolean | ValueShape::List => false,
        };
        if !accepted {
            return;
        }
        if let Some(FieldValue::Text(s)) = self.state.get_mut(&name) {
            s.push(c);
        }
        self.after_edit(&name, now);
    }

    /// Remove the last character from the active field
    pub fn backspace(&mut self, now: Instant) {
        let Some(field) = self.active_field_descriptor() else {
            return;
        };
        if field.readonly || self.visibility.is_disabled(&field.name) {
            return;
        }
        let name = field.name.clone();
        if let Some(FieldValue::Text(s)) = self.state.get_mut(&name) {
            s.pop();
        }
        self.after_edit(&name, now);
    }

    /// Toggle the active switch, or the highlighted option of a choice field
    pub fn toggle_active(&mut self, now: Instant) {
        let Some(field) = self.active_field_descriptor() else {
            return;
        };
        if field.readonly || self.visibility.is_disabled(&field.name) {
            return;
        }
        let name = field.name.clone();
        match render_strategy(field.ty) {
            RenderStrategy::Toggle => {
                if let Some(FieldValue::Bool(b)) = self.state.get_mut(&name) {
                    *b = !*b;
                }
                self.after_edit(&name, now);
            }
            RenderStrategy::ChoiceList => {
                let Some(option) = field.options.get(self.choice_cursor) else {
                    return;
                };
                if option.disabled {
                    return;
                }
                let value = option.value.clone();
                self.state.set(&name, FieldValue::Text(value));
                self.after_edit(&name, now);
            }
            RenderStrategy::MultiChoiceList => {
                let Some(option) = field.options.get(self.choice_cursor) else {
                    return;
                };
                if option.disabled {
                    return;
                }
                let value = option.value.clone();
                if let Some(FieldValue::List(items)) = self.state.get_mut(&name) {
                    match items.iter().position(|i| *i == value) {
                        Some(i) => {
                            items.remove(i);
                        }
                        None => items.push(value),
                    }
                }
                self.after_edit(&name, now);
            }
            _ => {}
        }
    }

    /// Move the option cursor of the active choice field
    pub fn cycle_choice(&mut self, delta: isize) {
        let Some(field) = self.active_field_descriptor() else {
            return;
        };
        let len = field.options.len();
        if len == 0 {
            return;
        }
        let current = self.choice_cursor as isize;
        self.choice_cursor = (current + delta).rem_euclid(len as isize) as usize;
    }

    fn after_edit(&mut self, name: &str, now: Instant) {
        self.visibility = VisibilityMap::evaluate(&self.config, &self.state);
        self.clamp_active_field();
        self.field_errors.remove(name);
        self.form_error = None;
        self.last_edit = Some(now);
        self.analytics.record(FormEventKind::FieldChange, Some(name));

        if self.config.real_time_validation {
            if let Some(field) = self.config.field(name) {
                let flags = self.visibility.flags(name);
                if flags.visible && !flags.disabled {
                    let outcome = validate_field(field, self.state.get(name), flags);
                    if let Some(message) = outcome.message {
                        if !outcome.ok {
                            self.field_errors.insert(name.to_string(), message);
                        }
                    }
                }
            }
        }
    }

    /// Visible fields can shrink under the focus index; keep it in range
    fn clamp_active_field(&mut self) {
        let max = self.visible_fields().len();
        if self.active_field > max {
            self.active_field = max;
        }
    }

    /// Formatted, sanitized data for the visible, enabled fields
    pub fn sanitized_payload(&self) -> BTreeMap<String, FieldValue> {
        let mut payload = BTreeMap::new();
        for field in &self.config.fields {
            let flags = self.visibility.flags(&field.name);
            if !flags.visible || flags.disabled {
                continue;
            }
            let Some(value) = self.state.get(&field.name) else {
                continue;
            };
            let transformed = match &field.formatting {
                Some(rule) => FieldValue::Text(format_value(&value.as_text(), rule)),
                None => match value_shape(field.ty) {
                    // Numeric fields submit as numbers when they parse
                    ValueShape::Numeric => match value.as_number() {
                        Some(n) => FieldValue::Number(n),
                        None => value.clone(),
                    },
                    _ => value.clone(),
                },
            };
            payload.insert(field.name.clone(), sanitize_value(&transformed));
        }
        payload
    }

    /// Run a full validation pass and store the per-field errors
    pub fn validate(&mut self) -> ValidationReport {
        let report = validate_form(&self.config, &self.state, &self.visibility);
        self.field_errors = report.field_errors.clone();
        for field in report.field_errors.keys() {
            self.analytics.record(FormEventKind::FieldError, Some(field));
        }
        report
    }

    /// Explicit submission: guard, validate, format, sanitize, call out
    ///
    /// Validation always completes before the collaborator is invoked; a
    /// failed attempt leaves every entered value in place.
    pub async fn submit(
        &mut self,
        handler: &mut dyn SubmitHandler,
        now: Instant,
    ) -> Submission {
        self.phase = SubmitPhase::Validating;
        self.form_error = None;

        if let Some(limiter) = self.rate_limiter.as_mut() {
            if let Some(retry_after) = limiter.retry_after(now) {
                let secs = retry_after.as_secs().max(1);
                self.form_error = Some(format!(
                    "Too many submissions. Try again in {secs}s."
                ));
                self.phase = SubmitPhase::Idle;
                return Submission::RateLimited { retry_after };
            }
        }

        let report = self.validate();
        if !report.ok() {
            if !report.form_errors.is_empty() {
                self.form_error = Some(report.form_errors.join("; "));
            }
            self.phase = SubmitPhase::Idle;
            return Submission::Rejected(report);
        }

        if let Some(limiter) = self.rate_limiter.as_mut() {
            limiter.record(now);
        }

        let payload = self.sanitized_payload();
        self.phase = SubmitPhase::Submitting;
        let result = handler.submit(&self.config.id, payload).await;
        self.phase = SubmitPhase::Idle;

        match result {
            Err(err) => {
                let message = format!("Submission failed: {err}");
                self.form_error = Some(message.clone());
                Submission::Failed { message }
            }
            Ok(outcome) if !outcome.success => {
                self.field_errors.extend(outcome.errors.clone());
                let message = outcome
                    .message
                    .unwrap_or_else(|| "Submission was rejected".to_string());
                self.form_error = Some(message.clone());
                Submission::Failed { message }
            }
            Ok(_) => {
                self.analytics.record(FormEventKind::FormSubmit, None);
                if self.config.auto_save {
                    // Persistence mode keeps the entered values
                    self.state.mark_clean();
                } else {
                    self.reset();
                }
                Submission::Accepted
            }
        }
    }

    /// Event-loop tick: drives the auto-save debounce and status expiry
    pub async fn tick(&mut self, handler: &mut dyn SubmitHandler, now: Instant) {
        match &self.auto_save_status {
            AutoSaveStatus::Saved { at } | AutoSaveStatus::Error { at, .. } => {
                if now.duration_since(*at) >= AUTO_SAVE_STATUS_CLEAR {
                    self.auto_save_status = AutoSaveStatus::Idle;
                }
            }
            _ => {}
        }

        if !self.config.auto_save || !self.state.is_dirty() {
            return;
        }
        let Some(last_edit) = self.last_edit else {
            return;
        };
        if now.duration_since(last_edit) < AUTO_SAVE_DEBOUNCE {
            return;
        }

        // Invalid state silently skips this cycle; explicit submission will
        // surface the errors
        let report = validate_form(&self.config, &self.state, &self.visibility);
        if !report.ok() {
            self.last_edit = None;
            return;
        }

        self.auto_save_status = AutoSaveStatus::Saving;
        let payload = self.sanitized_payload();
        match handler.submit(&self.config.id, payload).await {
            Ok(outcome) if outcome.success => {
                self.state.mark_clean();
                self.last_edit = None;
                self.auto_save_status = AutoSaveStatus::Saved { at: now };
            }
            Ok(outcome) => {
                let message = outcome
                    .message
                    .unwrap_or_else(|| "Auto-save was rejected".to_string());
                self.last_edit = None;
                self.auto_save_status = AutoSaveStatus::Error { message, at: now };
            }
            Err(err) => {
                self.last_edit = None;
                self.auto_save_status = AutoSaveStatus::Error {
                    message: format!("Auto-save failed: {err}"),
                    at: now,
                };
            }
        }
    }

    /// Restore defaults and clear every per-session artifact
    pub fn reset(&mut self) {
        self.state.reset(&self.config);
        self.visibility = VisibilityMap::evaluate(&self.config, &self.state);
        self.field_errors.clear();
        self.form_error = None;
        self.active_field = 0;
        self.choice_cursor = 0;
        self.last_edit = None;
    }

    /// Record that the user walked away without submitting
    pub fn abandon(&mut self) {
        self.analytics.record(FormEventKind::FormAbandon, None);
    }
}
