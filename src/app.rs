//! Application state and core logic

use crate::api::{ApiClient, ApiClientTrait};
use crate::config::TuiConfig;
use crate::forms::{
    investment_form, registration_form, render_strategy, transaction_form, FormOrchestrator,
    RenderStrategy, Submission,
};
use crate::state::{AppState, Investment, SortDirection, Transaction, TransactionSortField, View};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// HTTP client for the Finch API
    pub client: ApiClient,
    /// User configuration
    pub config: TuiConfig,
    /// Orchestrator of the currently mounted form, if any
    pub form: Option<FormOrchestrator>,
    /// Whether the app should quit
    quit: bool,
    /// Transient feedback message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new App instance
    pub async fn new() -> Result<Self> {
        let config = TuiConfig::load().unwrap_or_default();
        let mut client = ApiClient::new(config.api_base_url.clone())?;
        let mut state = AppState::default();

        apply_sort_preferences(&mut state, &config);

        // Check API connection and preload dashboard data
        state.api_connected = client.check_connection().await;
        if state.api_connected {
            match load_dashboard_data(&mut client).await {
                Ok((transactions, investments)) => {
                    state.transactions = transactions;
                    state.investments = investments;
                }
                Err(err) => {
                    tracing::warn!("Initial data load failed: {err}");
                }
            }
        }

        Ok(Self {
            state,
            client,
            config,
            form: None,
            quit: false,
            status_message: None,
        })
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Push an error message to the error queue for display
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.state.push_error(message.into());
    }

    pub fn navigate(&mut self, view: View) {
        self.state.view_history.push(self.state.current_view);
        self.state.current_view = view;
        self.state.selected_index = 0;
    }

    pub fn go_back(&mut self) {
        while let Some(view) = self.state.view_history.pop() {
            if view.is_form_view() {
                continue;
            }
            self.state.current_view = view;
            return;
        }
        self.state.current_view = View::Dashboard;
    }

    /// Drive timers: auto-save debounce and status expiry
    pub async fn tick(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.tick(&mut self.client, Instant::now()).await;
        }
    }

    /// Reload dashboard data from the API
    pub async fn refresh(&mut self) {
        self.state.api_connected = self.client.check_connection().await;
        if !self.state.api_connected {
            self.push_error("The Finch API is unreachable");
            return;
        }
        match load_dashboard_data(&mut self.client).await {
            Ok((transactions, investments)) => {
                self.state.transactions = transactions;
                self.state.investments = investments;
                self.status_message = Some("Refreshed".to_string());
            }
            Err(err) => self.push_error(format!("Refresh failed: {err}")),
        }
    }

    /// Mount a built-in form and switch to its view
    fn open_form(&mut self, view: View) {
        let config = match view {
            View::TransactionCreate => transaction_form(),
            View::InvestmentCreate => investment_form(),
            View::Register => registration_form(),
            _ => return,
        };
        match config {
            Ok(config) => {
                self.form = Some(FormOrchestrator::new(config));
                self.state.form_button = 0;
                self.navigate(view);
            }
            Err(err) => {
                // A broken built-in declaration is a programming error; keep
                // the app alive but say why the form will not open
                tracing::error!("Form configuration rejected: {err}");
                self.push_error(format!("Form configuration error: {err}"));
            }
        }
    }

    /// Unmount the current form, recording abandonment if it was not submitted
    async fn close_form(&mut self, abandoned: bool) {
        if let Some(form) = self.form.as_mut() {
            if abandoned {
                form.abandon();
            }
            let events = form.analytics_mut().drain();
            if let Err(err) = self.client.track_events(events).await {
                tracing::debug!("Analytics delivery skipped: {err}");
            }
        }
        self.form = None;
        self.state.form_button = 0;
        self.go_back();
    }

    /// Run the active form's submission path
    async fn submit_active_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let result = form.submit(&mut self.client, Instant::now()).await;
        match result {
            Submission::Accepted => {
                let saved = form
                    .config()
                    .title
                    .clone()
                    .unwrap_or_else(|| "Form".to_string());
                self.status_message = Some(format!("{saved} saved"));
                self.close_form(false).await;
                self.refresh().await;
            }
            // Field and banner errors are already on the orchestrator
            Submission::Rejected(_)
            | Submission::RateLimited { .. }
            | Submission::Failed { .. } => {}
        }
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // An error banner swallows the next confirm key
        if self.state.current_error().is_some()
            && matches!(key.code, KeyCode::Enter | KeyCode::Esc)
        {
            self.state.dismiss_error();
            return Ok(());
        }

        match self.state.current_view {
            View::Dashboard => self.handle_dashboard_key(key).await?,
            View::Investments => self.handle_investments_key(key).await?,
            View::TransactionCreate | View::InvestmentCreate | View::Register => {
                self.handle_form_key(key).await?;
            }
        }
        Ok(())
    }

    /// Handle keys on the dashboard
    async fn handle_dashboard_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('t') => self.open_form(View::TransactionCreate),
            KeyCode::Char('g') => self.open_form(View::Register),
            KeyCode::Char('r') => self.refresh().await,
            KeyCode::Char('s') => {
                self.state.transaction_sort_field = self.state.transaction_sort_field.next();
                self.persist_sort_preferences();
            }
            KeyCode::Char('d') => {
                self.state.transaction_sort_direction =
                    self.state.transaction_sort_direction.toggle();
                self.persist_sort_preferences();
            }
            KeyCode::Tab => self.navigate(View::Investments),
            KeyCode::Up => {
                self.state.selected_index = self.state.selected_index.saturating_sub(1);
            }
            KeyCode::Down => {
                let max = self.state.transactions.len().saturating_sub(1);
                self.state.selected_index = (self.state.selected_index + 1).min(max);
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle keys on the investments view
    async fn handle_investments_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('i') => self.open_form(View::InvestmentCreate),
            KeyCode::Char('r') => self.refresh().await,
            KeyCode::Tab => self.navigate(View::Dashboard),
            KeyCode::Up => {
                self.state.selected_index = self.state.selected_index.saturating_sub(1);
            }
            KeyCode::Down => {
                let max = self.state.investments.len().saturating_sub(1);
                self.state.selected_index = (self.state.selected_index + 1).min(max);
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle keys in a form view
    async fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        // Save shortcut submits from anywhere in the form
        if key.code == KeyCode::Char('s')
            && (key.modifiers.contains(KeyModifiers::CONTROL)
                || key.modifiers.contains(crate::platform::SAVE_MODIFIER))
        {
            self.submit_active_form().await;
            return Ok(());
        }

        let Some(form) = self.form.as_mut() else {
            return Ok(());
        };
        let now = Instant::now();

        if form.is_buttons_row_active() {
            match key.code {
                KeyCode::Tab => form.next_field(),
                KeyCode::BackTab => form.prev_field(),
                KeyCode::Left => {
                    self.state.form_button = self.state.form_button.saturating_sub(1);
                }
                KeyCode::Right => {
                    let last = if form.config().show_reset { 2 } else { 1 };
                    self.state.form_button = (self.state.form_button + 1).min(last);
                }
                KeyCode::Enter => {
                    let has_reset = form.config().show_reset;
                    match (self.state.form_button, has_reset) {
                        (0, _) => self.submit_active_form().await,
                        (1, true) => {
                            if let Some(form) = self.form.as_mut() {
                                form.reset();
                            }
                        }
                        _ => self.close_form(true).await,
                    }
                }
                KeyCode::Esc => self.close_form(true).await,
                _ => {}
            }
            return Ok(());
        }

        let strategy = form.active_field_descriptor().map(|f| render_strategy(f.ty));
        match key.code {
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.prev_field(),
            KeyCode::Esc => self.close_form(true).await,
            KeyCode::Up => form.cycle_choice(-1),
            KeyCode::Down => form.cycle_choice(1),
            KeyCode::Enter => match strategy {
                Some(RenderStrategy::MultilineInput) => form.input_char('\n', now),
                Some(
                    RenderStrategy::Toggle
                    | RenderStrategy::ChoiceList
                    | RenderStrategy::MultiChoiceList,
                ) => form.toggle_active(now),
                _ => form.next_field(),
            },
            KeyCode::Char(' ') => match strategy {
                Some(
                    RenderStrategy::Toggle
                    | RenderStrategy::ChoiceList
                    | RenderStrategy::MultiChoiceList,
                ) => form.toggle_active(now),
                _ => form.input_char(' ', now),
            },
            KeyCode::Char(c) => form.input_char(c, now),
            KeyCode::Backspace => form.backspace(now),
            _ => {}
        }
        Ok(())
    }

    fn persist_sort_preferences(&mut self) {
        self.config.transaction_sort_field =
            Some(self.state.transaction_sort_field.label().to_lowercase());
        self.config.transaction_sort_direction =
            Some(match self.state.transaction_sort_direction {
                SortDirection::Asc => "asc".to_string(),
                SortDirection::Desc => "desc".to_string(),
            });
        if let Err(err) = self.config.save() {
            tracing::warn!("Could not save config: {err}");
        }
    }
}

/// Apply persisted sort preferences to fresh state
fn apply_sort_preferences(state: &mut AppState, config: &TuiConfig) {
    if let Some(field) = config.transaction_sort_field.as_deref() {
        state.transaction_sort_field = match field {
            "amount" => TransactionSortField::Amount,
            "category" => TransactionSortField::Category,
            _ => TransactionSortField::Date,
        };
    }
    if let Some(direction) = config.transaction_sort_direction.as_deref() {
        state.transaction_sort_direction = match direction {
            "asc" => SortDirection::Asc,
            _ => SortDirection::Desc,
        };
    }
}

/// Fetch both dashboard collections
async fn load_dashboard_data(
    client: &mut (impl ApiClientTrait + ?Sized),
) -> Result<(Vec<Transaction>, Vec<Investment>)> {
    let transactions = client.list_transactions().await?;
    let investments = client.list_investments().await?;
    Ok((transactions, investments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApiClientTrait;
    use crossterm::event::KeyEvent;

    fn test_app() -> App {
        App {
            state: AppState::default(),
            client: ApiClient::new(None).expect("client builds offline"),
            config: TuiConfig::default(),
            form: None,
            quit: false,
            status_message: None,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    mod navigation {
        use super::*;

        #[test]
        fn test_navigate_pushes_history() {
            let mut app = test_app();
            app.navigate(View::Investments);
            assert_eq!(app.state.current_view, View::Investments);
            assert_eq!(app.state.view_history, vec![View::Dashboard]);
        }

        #[test]
        fn test_go_back_skips_form_views() {
            let mut app = test_app();
            app.navigate(View::Investments);
            app.navigate(View::InvestmentCreate);
            app.go_back();
            assert_eq!(app.state.current_view, View::Investments);
        }

        #[test]
        fn test_go_back_on_empty_history_lands_on_dashboard() {
            let mut app = test_app();
            app.go_back();
            assert_eq!(app.state.current_view, View::Dashboard);
        }
    }

    mod keys {
        use super::*;

        #[tokio::test]
        async fn test_q_quits_from_dashboard() {
            let mut app = test_app();
            app.handle_key(key(KeyCode::Char('q'))).await.unwrap();
            assert!(app.should_quit());
        }

        #[tokio::test]
        async fn test_t_opens_transaction_form() {
            let mut app = test_app();
            app.handle_key(key(KeyCode::Char('t'))).await.unwrap();
            assert_eq!(app.state.current_view, View::TransactionCreate);
            assert!(app.form.is_some());
        }

        #[tokio::test]
        async fn test_typing_reaches_the_mounted_form() {
            let mut app = test_app();
            app.handle_key(key(KeyCode::Char('i'))).await.unwrap(); // no-op on dashboard
            app.handle_key(key(KeyCode::Char('t'))).await.unwrap();
            // First visible transaction field is the type radio group; move to amount
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            app.handle_key(key(KeyCode::Char('4'))).await.unwrap();
            app.handle_key(key(KeyCode::Char('2'))).await.unwrap();
            let form = app.form.as_ref().unwrap();
            assert_eq!(
                form.state().get("amount").unwrap().as_text(),
                "42"
            );
        }

        #[tokio::test]
        async fn test_sort_keys_cycle_field_and_direction() {
            let mut app = test_app();
            app.handle_key(key(KeyCode::Char('s'))).await.unwrap();
            assert_eq!(
                app.state.transaction_sort_field,
                TransactionSortField::Amount
            );
            app.handle_key(key(KeyCode::Char('d'))).await.unwrap();
            assert_eq!(app.state.transaction_sort_direction, SortDirection::Asc);
        }

        #[tokio::test]
        async fn test_esc_closes_the_form_and_goes_back() {
            let mut app = test_app();
            app.handle_key(key(KeyCode::Char('t'))).await.unwrap();
            app.handle_key(key(KeyCode::Esc)).await.unwrap();
            assert!(app.form.is_none());
            assert_eq!(app.state.current_view, View::Dashboard);
        }

        #[tokio::test]
        async fn test_error_banner_swallows_confirm_key() {
            let mut app = test_app();
            app.push_error("boom");
            app.handle_key(key(KeyCode::Enter)).await.unwrap();
            assert!(app.state.current_error().is_none());
        }
    }

    mod data_loading {
        use super::*;

        #[tokio::test]
        async fn test_load_dashboard_data_uses_the_client() {
            let mut mock = MockApiClientTrait::new();
            mock.expect_list_transactions()
                .times(1)
                .returning(|| Ok(vec![]));
            mock.expect_list_investments()
                .times(1)
                .returning(|| Ok(vec![]));
            let (transactions, investments) = load_dashboard_data(&mut mock).await.unwrap();
            assert!(transactions.is_empty());
            assert!(investments.is_empty());
        }

        #[tokio::test]
        async fn test_load_dashboard_data_propagates_errors() {
            let mut mock = MockApiClientTrait::new();
            mock.expect_list_transactions()
                .times(1)
                .returning(|| Err(anyhow::anyhow!("boom")));
            assert!(load_dashboard_data(&mut mock).await.is_err());
        }
    }

    mod preferences {
        use super::*;

        #[test]
        fn test_sort_preferences_are_applied() {
            let mut state = AppState::default();
            let config = TuiConfig {
                transaction_sort_field: Some("amount".to_string()),
                transaction_sort_direction: Some("asc".to_string()),
                ..Default::default()
            };
            apply_sort_preferences(&mut state, &config);
            assert_eq!(state.transaction_sort_field, TransactionSortField::Amount);
            assert_eq!(state.transaction_sort_direction, SortDirection::Asc);
        }

        #[test]
        fn test_unknown_preference_values_fall_back() {
            let mut state = AppState::default();
            let config = TuiConfig {
                transaction_sort_field: Some("mystery".to_string()),
                transaction_sort_direction: Some("sideways".to_string()),
                ..Default::default()
            };
            apply_sort_preferences(&mut state, &config);
            assert_eq!(state.transaction_sort_field, TransactionSortField::Date);
            assert_eq!(state.transaction_sort_direction, SortDirection::Desc);
        }
    }
}
