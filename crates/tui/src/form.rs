//! Create/edit form state and pre-submission validation.
//!
//! The form holds plain text buffers for the typed fields and cycling
//! selections for category and payment method. Nothing leaves this module
//! until [`ExpenseForm::validate`] accepts every field, so the service only
//! ever sees well-formed payloads and local mistakes never cost a round
//! trip.

use api_types::expense::{Expense, ExpenseCreate, ExpenseUpdate};
use api_types::{Category, MoneyCents, PaymentMethod};
use chrono::{Local, NaiveDate};
use thiserror::Error;

pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;

/// A field rejected before submission. Never sent to the service.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct InvalidField {
    pub field: &'static str,
    pub reason: String,
}

impl InvalidField {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Whether a submission creates a record or patches an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Title,
    Amount,
    Date,
    Category,
    Payment,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Title,
        FormField::Amount,
        FormField::Date,
        FormField::Category,
        FormField::Payment,
        FormField::Description,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Amount => "Amount ($)",
            Self::Date => "Date",
            Self::Category => "Category",
            Self::Payment => "Payment",
            Self::Description => "Description",
        }
    }

    /// Whether the field is a cycled selection rather than a text buffer.
    pub fn is_choice(self) -> bool {
        matches!(self, Self::Category | Self::Payment)
    }

    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Buffered user input for one create/edit interaction.
///
/// Buffers survive a failed submission untouched; only a successful submit
/// or an explicit cancel discards them.
#[derive(Clone, Debug)]
pub struct ExpenseForm {
    pub mode: FormMode,
    pub title: String,
    pub amount: String,
    pub date: String,
    pub category: Category,
    pub payment: PaymentMethod,
    pub description: String,
    pub focus: FormField,
    /// Message from the last rejected submission, local or remote.
    pub error: Option<String>,
}

impl ExpenseForm {
    /// An empty create form: dated today, category Other, paid by card.
    pub fn new() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            amount: String::new(),
            date: Local::now().date_naive().to_string(),
            category: Category::default(),
            payment: PaymentMethod::default(),
            description: String::new(),
            focus: FormField::Title,
            error: None,
        }
    }

    /// An edit form pre-filled from a cached record.
    pub fn edit(expense: &Expense) -> Self {
        Self {
            mode: FormMode::Edit(expense.id),
            title: expense.title.clone(),
            amount: decimal_buffer(expense.amount),
            date: expense.date.to_string(),
            category: expense.category,
            payment: expense.payment_method,
            description: expense.description.clone().unwrap_or_default(),
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Appends a character to the focused text buffer. Choice fields ignore
    /// typed input; they only cycle.
    pub fn push(&mut self, ch: char) {
        if let Some(buffer) = self.buffer_mut() {
            buffer.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(buffer) = self.buffer_mut() {
            buffer.pop();
        }
    }

    /// Cycles the focused choice field forward or backwards.
    pub fn cycle(&mut self, forward: bool) {
        match self.focus {
            FormField::Category => {
                self.category = cycled(&Category::ALL, self.category, forward);
            }
            FormField::Payment => {
                self.payment = cycled(&PaymentMethod::ALL, self.payment, forward);
            }
            _ => {}
        }
    }

    fn buffer_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Amount => Some(&mut self.amount),
            FormField::Date => Some(&mut self.date),
            FormField::Description => Some(&mut self.description),
            FormField::Category | FormField::Payment => None,
        }
    }

    /// Checks every buffer and assembles the creation payload.
    ///
    /// Rules: title non-empty and at most 100 characters, amount a positive
    /// decimal with at most two fraction digits, date a `YYYY-MM-DD`
    /// calendar day, description at most 500 characters (empty means
    /// absent).
    pub fn validate(&self) -> Result<ExpenseCreate, InvalidField> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(InvalidField::new("title", "must not be empty"));
        }
        if title.chars().count() > TITLE_MAX {
            return Err(InvalidField::new(
                "title",
                format!("must be at most {TITLE_MAX} characters"),
            ));
        }

        let amount: MoneyCents = self
            .amount
            .parse()
            .map_err(|err: api_types::ParseAmountError| InvalidField::new("amount", err.to_string()))?;
        if !amount.is_positive() {
            return Err(InvalidField::new("amount", "must be positive"));
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| InvalidField::new("date", "must be a YYYY-MM-DD date"))?;

        let description = self.description.trim();
        if description.chars().count() > DESCRIPTION_MAX {
            return Err(InvalidField::new(
                "description",
                format!("must be at most {DESCRIPTION_MAX} characters"),
            ));
        }

        Ok(ExpenseCreate {
            title: title.to_string(),
            amount,
            category: self.category,
            date,
            description: (!description.is_empty()).then(|| description.to_string()),
            payment_method: self.payment,
        })
    }

    /// Validates and assembles the update body. Every field is sent: the
    /// form is the user's full view of the record, so the patch carries
    /// everything currently on screen.
    pub fn patch(&self) -> Result<ExpenseUpdate, InvalidField> {
        let data = self.validate()?;
        Ok(ExpenseUpdate {
            title: Some(data.title),
            amount: Some(data.amount),
            category: Some(data.category),
            date: Some(data.date),
            description: data.description,
            payment_method: Some(data.payment_method),
        })
    }
}

impl Default for ExpenseForm {
    fn default() -> Self {
        Self::new()
    }
}

fn cycled<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % all.len()
    } else {
        (idx + all.len() - 1) % all.len()
    };
    all[next]
}

/// Renders cents as the plain decimal the amount buffer holds (`42.50`).
fn decimal_buffer(amount: MoneyCents) -> String {
    let cents = amount.cents();
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}
