//! Form interaction analytics
//!
//! Records field and form events per session. Delivery to the backend is
//! best-effort; the recorder only accumulates and summarizes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Kind of a recorded interaction event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormEventKind {
    FormView,
    FieldFocus,
    FieldBlur,
    FieldChange,
    FieldError,
    FormSubmit,
    FormAbandon,
}

/// One recorded interaction event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormEvent {
    pub form_id: String,
    pub session_id: Uuid,
    pub kind: FormEventKind,
    pub field: Option<String>,
    pub at: DateTime<Utc>,
}

/// Aggregated view of one session's events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsSummary {
    pub views: usize,
    pub submissions: usize,
    /// Submissions per view, as a percentage
    pub completion_rate: f64,
    /// Focused-but-never-blurred rate per field, as a percentage
    pub field_abandonment: BTreeMap<String, f64>,
    pub error_counts: BTreeMap<String, usize>,
}

/// Accumulates events for one mounted form
#[derive(Debug, Clone)]
pub struct EventRecorder {
    form_id: String,
    session_id: Uuid,
    events: Vec<FormEvent>,
}

impl EventRecorder {
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            session_id: Uuid::new_v4(),
            events: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn record(&mut self, kind: FormEventKind, field: Option<&str>) {
        self.events.push(FormEvent {
            form_id: self.form_id.clone(),
            session_id: self.session_id,
            kind,
            field: field.map(str::to_string),
            at: Utc::now(),
        });
    }

    pub fn events(&self) -> &[FormEvent] {
        &self.events
    }

    /// Take all accumulated events, leaving the recorder empty
    pub fn drain(&mut self) -> Vec<FormEvent> {
        std::mem::take(&mut self.events)
    }

    /// Summarize the accumulated events
    pub fn summary(&self) -> AnalyticsSummary {
        let mut summary = AnalyticsSummary::default();
        let mut focuses: BTreeMap<String, usize> = BTreeMap::new();
        let mut blurs: BTreeMap<String, usize> = BTreeMap::new();

        for event in &self.events {
            match event.kind {
                FormEventKind::FormView => summary.views += 1,
                FormEventKind::FormSubmit => summary.submissions += 1,
                FormEventKind::FieldFocus => {
                    if let Some(field) = &event.field {
                        *focuses.entry(field.clone()).or_default() += 1;
                    }
                }
                FormEventKind::FieldBlur => {
                    if let Some(field) = &event.field {
                        *blurs.entry(field.clone()).or_default() += 1;
                    }
                }
                FormEventKind::FieldError => {
                    if let Some(field) = &event.field {
                        *summary.error_counts.entry(field.clone()).or_default() += 1;
                    }
                }
                FormEventKind::FieldChange | FormEventKind::FormAbandon => {}
            }
        }

        if summary.views > 0 {
            summary.completion_rate = summary.submissions as f64 / summary.views as f64 * 100.0;
        }
        for (field, focus_count) in focuses {
            let blur_count = blurs.get(&field).copied().unwrap_or(0);
            let abandoned = focus_count.saturating_sub(blur_count);
            summary
                .field_abandonment
                .insert(field, abandoned as f64 / focus_count as f64 * 100.0);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rate_is_submits_per_view() {
        let mut recorder = EventRecorder::new("txn");
        recorder.record(FormEventKind::FormView, None);
        recorder.record(FormEventKind::FormView, None);
        recorder.record(FormEventKind::FormSubmit, None);
        let summary = recorder.summary();
        assert_eq!(summary.views, 2);
        assert_eq!(summary.submissions, 1);
        assert_eq!(summary.completion_rate, 50.0);
    }

    #[test]
    fn test_abandonment_counts_unblurred_focuses() {
        let mut recorder = EventRecorder::new("txn");
        recorder.record(FormEventKind::FieldFocus, Some("amount"));
        recorder.record(FormEventKind::FieldBlur, Some("amount"));
        recorder.record(FormEventKind::FieldFocus, Some("category"));
        let summary = recorder.summary();
        assert_eq!(summary.field_abandonment.get("amount"), Some(&0.0));
        assert_eq!(summary.field_abandonment.get("category"), Some(&100.0));
    }

    #[test]
    fn test_error_counts_per_field() {
        let mut recorder = EventRecorder::new("txn");
        recorder.record(FormEventKind::FieldError, Some("amount"));
        recorder.record(FormEventKind::FieldError, Some("amount"));
        let summary = recorder.summary();
        assert_eq!(summary.error_counts.get("amount"), Some(&2));
    }

    #[test]
    fn test_drain_empties_the_recorder() {
        let mut recorder = EventRecorder::new("txn");
        recorder.record(FormEventKind::FormView, None);
        let drained = recorder.drain();
        assert_eq!(drained.len(), 1);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_events_carry_form_and_session_ids() {
        let mut recorder = EventRecorder::new("txn");
        recorder.record(FormEventKind::FieldChange, Some("amount"));
        let event = &recorder.events()[0];
        assert_eq!(event.form_id, "txn");
        assert_eq!(event.session_id, recorder.session_id());
        assert_eq!(event.field.as_deref(), Some("amount"));
    }

    #[test]
    fn test_empty_recorder_summary_is_zeroed() {
        let recorder = EventRecorder::new("txn");
        let summary = recorder.summary();
        assert_eq!(summary.views, 0);
        assert_eq!(summary.completion_rate, 0.0);
        assert!(summary.field_abandonment.is_empty());
    }
}
