//! Application state definitions

use crate::state::{Investment, Transaction};
use std::collections::VecDeque;

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Investments,
    TransactionCreate,
    InvestmentCreate,
    Register,
}

impl View {
    pub fn is_form_view(&self) -> bool {
        matches!(
            self,
            View::TransactionCreate | View::InvestmentCreate | View::Register
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Investments => "Investments",
            View::TransactionCreate => "New Transaction",
            View::InvestmentCreate => "New Investment",
            View::Register => "Create Account",
        }
    }
}

/// Sort field for the transaction table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionSortField {
    #[default]
    Date,
    Amount,
    Category,
}

impl TransactionSortField {
    pub fn next(&self) -> Self {
        match self {
            Self::Date => Self::Amount,
            Self::Amount => Self::Category,
            Self::Category => Self::Date,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Amount => "Amount",
            Self::Category => "Category",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Desc,
    Asc,
}

impl SortDirection {
    pub fn toggle(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

/// Shared application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    // Navigation
    pub current_view: View,
    pub view_history: Vec<View>,

    // Data
    pub transactions: Vec<Transaction>,
    pub investments: Vec<Investment>,

    // Selection
    pub selected_index: usize,

    // Sorting
    pub transaction_sort_field: TransactionSortField,
    pub transaction_sort_direction: SortDirection,

    // UI state
    pub api_connected: bool,
    /// Selected button on a form's buttons row (0=submit, 1=reset, 2=cancel)
    pub form_button: usize,

    errors: VecDeque<String>,
}

impl AppState {
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push_back(message.into());
    }

    pub fn current_error(&self) -> Option<&str> {
        self.errors.front().map(String::as_str)
    }

    pub fn dismiss_error(&mut self) {
        self.errors.pop_front();
    }

    /// Transactions in the current sort order
    pub fn sorted_transactions(&self) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.transactions.iter().collect();
        match self.transaction_sort_field {
            TransactionSortField::Date => sorted.sort_by_key(|t| t.date),
            TransactionSortField::Amount => {
                sorted.sort_by(|a, b| a.amount.total_cmp(&b.amount));
            }
            TransactionSortField::Category => {
                sorted.sort_by(|a, b| a.category.cmp(&b.category));
            }
        }
        if self.transaction_sort_direction == SortDirection::Desc {
            sorted.reverse();
        }
        sorted
    }

    /// Net total over all transactions (income minus expenses)
    pub fn net_balance(&self) -> f64 {
        self.transactions.iter().map(Transaction::signed_amount).sum()
    }

    pub fn total_income(&self) -> f64 {
        self.transactions
            .iter()
            .filter(|t| !t.is_expense())
            .map(|t| t.amount)
            .sum()
    }

    pub fn total_expenses(&self) -> f64 {
        self.transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount)
            .sum()
    }
}
