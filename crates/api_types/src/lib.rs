mod money;

pub use money::{MoneyCents, ParseAmountError};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Expense category.
///
/// The service validates categories against this closed set; the variant
/// names are the exact wire strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Bills,
    Entertainment,
    Health,
    #[default]
    Other,
}

impl Category {
    /// All categories, in canonical order.
    ///
    /// This order is load-bearing: derived views that need a deterministic
    /// pick among equal categories scan this array front to back.
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Bills,
        Category::Entertainment,
        Category::Health,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Shopping => "Shopping",
            Self::Bills => "Bills",
            Self::Entertainment => "Entertainment",
            Self::Health => "Health",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an expense was paid. Variant names are the exact wire strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    #[default]
    Card,
    Online,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Online];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
            Self::Online => "Online",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod expense {
    use super::*;

    /// A stored expense record, as returned by the service.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Expense {
        /// Server-assigned integer id.
        pub id: i64,
        pub title: String,
        pub amount: MoneyCents,
        pub category: Category,
        /// Calendar day of the expense (`YYYY-MM-DD` on the wire).
        pub date: NaiveDate,
        pub description: Option<String>,
        pub payment_method: PaymentMethod,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Request body for creating an expense (no id, no timestamps).
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseCreate {
        pub title: String,
        pub amount: MoneyCents,
        pub category: Category,
        pub date: NaiveDate,
        pub description: Option<String>,
        pub payment_method: PaymentMethod,
    }

    /// Partial update body: absent fields leave stored values unchanged.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub amount: Option<MoneyCents>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub category: Option<Category>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub date: Option<NaiveDate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub payment_method: Option<PaymentMethod>,
    }
}

pub mod summary {
    use super::*;

    /// Per-category aggregate computed by the service.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CategorySummary {
        pub category: Category,
        pub total: MoneyCents,
        pub count: u64,
    }

    /// Per-month aggregate computed by the service.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MonthlySummary {
        /// Month key in `YYYY-MM` form.
        pub month: String,
        pub total: MoneyCents,
        pub count: u64,
    }
}
