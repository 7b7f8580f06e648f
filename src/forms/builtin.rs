//! Built-in form configurations
//!
//! Declarative descriptions of the forms this app ships: transaction entry,
//! investment entry, and account registration. Each is sealed here so a bad
//! declaration fails at startup, not mid-edit.

use crate::forms::{
    ConditionOperator, ConditionalAction, ConditionalRule, ConfigError, FieldDescriptor,
    FieldType, FieldValue, FormConfig, FormLayout, FormattingRule, FormattingType, SelectOption,
    ValidationRules,
};

fn required_with(f: impl FnOnce(&mut ValidationRules)) -> ValidationRules {
    let mut rules = ValidationRules::required();
    f(&mut rules);
    rules
}

fn optional_with(f: impl FnOnce(&mut ValidationRules)) -> ValidationRules {
    let mut rules = ValidationRules::default();
    f(&mut rules);
    rules
}

/// Transaction entry form
pub fn transaction_form() -> Result<FormConfig, ConfigError> {
    let fields = vec![
        FieldDescriptor::new("type", "Type", FieldType::RadioGroup)
            .with_options(vec![
                SelectOption::new("Expense", "expense"),
                SelectOption::new("Income", "income"),
            ])
            .with_default(FieldValue::text("expense")),
        FieldDescriptor::new("amount", "Amount", FieldType::Currency)
            .with_validation(required_with(|r| r.min = Some(0.01)))
            .with_formatting(FormattingRule::of(FormattingType::Currency).with_decimals(2))
            .with_placeholder("0.00"),
        FieldDescriptor::new("category", "Category", FieldType::Select)
            .with_options(vec![
                SelectOption::new("Food", "food"),
                SelectOption::new("Housing", "housing"),
                SelectOption::new("Transport", "transport"),
                SelectOption::new("Entertainment", "entertainment"),
                SelectOption::new("Utilities", "utilities"),
                SelectOption::new("Other", "other"),
            ])
            .with_validation(ValidationRules::required())
            .with_conditional(ConditionalRule::new(
                "type",
                ConditionOperator::Equals,
                Some(FieldValue::text("expense")),
                ConditionalAction::Show,
            )),
        FieldDescriptor::new("date", "Date", FieldType::Date)
            .with_validation(required_with(|r| {
                r.predicate = Some("not_future_date".to_string());
            }))
            .with_placeholder("YYYY-MM-DD"),
        FieldDescriptor::new("description", "Description", FieldType::Textarea)
            .with_validation(optional_with(|r| r.max_length = Some(500))),
        FieldDescriptor::new("tags", "Tags", FieldType::Multiselect)
            .with_options(vec![
                SelectOption::new("Work", "work"),
                SelectOption::new("Personal", "personal"),
                SelectOption::new("Recurring", "recurring"),
                SelectOption::new("Shared", "shared"),
            ])
            .with_validation(optional_with(|r| r.max_length = Some(10))),
        FieldDescriptor::new("currency", "Currency", FieldType::Select)
            .with_options(vec![
                SelectOption::new("US Dollar", "USD"),
                SelectOption::new("Euro", "EUR"),
                SelectOption::new("British Pound", "GBP"),
                SelectOption::new("Japanese Yen", "JPY"),
                SelectOption::new("Canadian Dollar", "CAD"),
            ])
            .with_default(FieldValue::text("USD")),
        FieldDescriptor::new("exchange_rate", "Exchange rate", FieldType::Number)
            .with_validation(optional_with(|r| {
                r.min = Some(0.0001);
                r.custom_message = Some("Exchange rate must be positive".to_string());
            }))
            .with_conditional(ConditionalRule::new(
                "currency",
                ConditionOperator::NotEquals,
                Some(FieldValue::text("USD")),
                ConditionalAction::Show,
            ))
            .with_help_text("Rate to USD for foreign-currency transactions"),
        FieldDescriptor::new("reference_number", "Reference #", FieldType::Text)
            .with_validation(optional_with(|r| r.max_length = Some(100))),
    ];

    FormConfig::new("transaction_create", fields)
        .with_title("New Transaction")
        .with_submit_text("Save transaction")
        .with_layout(FormLayout::TwoColumn)
        .with_rate_limit("5/minute")
        .seal()
}

/// Investment entry form
pub fn investment_form() -> Result<FormConfig, ConfigError> {
    let fields = vec![
        FieldDescriptor::new("symbol", "Symbol", FieldType::Text)
            .with_validation(required_with(|r| {
                r.predicate = Some("ticker_symbol".to_string());
            }))
            .with_placeholder("AAPL"),
        FieldDescriptor::new("asset_type", "Asset type", FieldType::Select)
            .with_options(vec![
                SelectOption::new("Stock", "stock"),
                SelectOption::new("ETF", "etf"),
                SelectOption::new("Mutual fund", "mutual_fund"),
                SelectOption::new("Bond", "bond"),
                SelectOption::new("Crypto", "crypto"),
                SelectOption::new("Real estate", "real_estate"),
                SelectOption::new("Commodity", "commodity"),
            ])
            .with_default(FieldValue::text("stock")),
        FieldDescriptor::new("shares", "Shares", FieldType::Number)
            .with_validation(required_with(|r| {
                r.min = Some(0.000001);
                r.custom_message = Some("Shares must be positive".to_string());
            })),
        FieldDescriptor::new("price_per_share", "Price per share", FieldType::Currency)
            .with_validation(required_with(|r| {
                r.min = Some(0.0001);
            }))
            .with_formatting(FormattingRule::of(FormattingType::Currency).with_decimals(2)),
        FieldDescriptor::new("purchase_date", "Purchase date", FieldType::Date)
            .with_validation(required_with(|r| {
                r.predicate = Some("not_future_date".to_string());
            }))
            .with_placeholder("YYYY-MM-DD"),
        FieldDescriptor::new("broker", "Broker", FieldType::Text)
            .with_validation(optional_with(|r| r.max_length = Some(100))),
        FieldDescriptor::new("fees", "Fees", FieldType::Currency)
            .with_validation(optional_with(|r| r.min = Some(0.0)))
            .with_formatting(FormattingRule::of(FormattingType::Currency).with_decimals(2))
            .with_default(FieldValue::text("0.00")),
        FieldDescriptor::new("notes", "Notes", FieldType::Textarea)
            .with_validation(optional_with(|r| r.max_length = Some(1000))),
    ];

    FormConfig::new("investment_create", fields)
        .with_title("New Investment")
        .with_submit_text("Save investment")
        .with_layout(FormLayout::TwoColumn)
        .with_rate_limit("5/minute")
        .seal()
}

/// Account registration form
pub fn registration_form() -> Result<FormConfig, ConfigError> {
    let fields = vec![
        FieldDescriptor::new("email", "Email", FieldType::Email)
            .with_validation(ValidationRules::required()),
        FieldDescriptor::new("display_name", "Display name", FieldType::Text)
            .with_validation(optional_with(|r| {
                r.min_length = Some(1);
                r.max_length = Some(50);
            })),
        FieldDescriptor::new("password", "Password", FieldType::Password).with_validation(
            required_with(|r| {
                r.predicate = Some("password_complexity".to_string());
            }),
        ),
        FieldDescriptor::new("confirm_password", "Confirm password", FieldType::Password)
            .with_validation(ValidationRules::required()),
    ];

    FormConfig::new("account_register", fields)
        .with_title("Create Account")
        .with_submit_text("Register")
        .with_rate_limit("3/minute")
        .seal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{FormOrchestrator, FormState, VisibilityMap};

    #[test]
    fn test_builtin_forms_seal_cleanly() {
        assert!(transaction_form().is_ok());
        assert!(investment_form().is_ok());
        assert!(registration_form().is_ok());
    }

    #[test]
    fn test_transaction_category_hidden_for_income() {
        let config = transaction_form().unwrap();
        let mut state = FormState::from_config(&config);
        // Default type is expense, so category starts visible
        let map = VisibilityMap::evaluate(&config, &state);
        assert!(map.is_visible("category"));

        state.set("type", FieldValue::text("income"));
        let map = VisibilityMap::evaluate(&config, &state);
        assert!(!map.is_visible("category"));
    }

    #[test]
    fn test_transaction_exchange_rate_shown_for_foreign_currency() {
        let config = transaction_form().unwrap();
        let mut state = FormState::from_config(&config);
        let map = VisibilityMap::evaluate(&config, &state);
        assert!(!map.is_visible("exchange_rate"));

        state.set("currency", FieldValue::text("EUR"));
        let map = VisibilityMap::evaluate(&config, &state);
        assert!(map.is_visible("exchange_rate"));
    }

    #[test]
    fn test_transaction_defaults_populate_state() {
        let config = transaction_form().unwrap();
        let orchestrator = FormOrchestrator::new(config);
        assert_eq!(
            orchestrator.state().get("type"),
            Some(&FieldValue::text("expense"))
        );
        assert_eq!(
            orchestrator.state().get("currency"),
            Some(&FieldValue::text("USD"))
        );
    }

    #[test]
    fn test_investment_fees_default_is_zero() {
        let config = investment_form().unwrap();
        let state = FormState::from_config(&config);
        assert_eq!(state.get("fees"), Some(&FieldValue::text("0.00")));
    }

    #[test]
    fn test_all_builtin_forms_are_rate_limited() {
        for config in [
            transaction_form().unwrap(),
            investment_form().unwrap(),
            registration_form().unwrap(),
        ] {
            assert!(config.rate_limit_spec().is_some(), "{}", config.id);
        }
    }
}
