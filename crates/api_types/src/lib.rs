use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable code, e.g. `insufficient_funds`.
    pub code: String,
    pub error: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Income,
    Expense,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    DebitCard,
    BankTransfer,
    /// Deferred: never touches the wallet balance.
    CreditCard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

pub mod wallet {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletNew {
        pub name: String,
        /// Recorded as a cash income dated today. Must be >= 0.
        #[serde(default)]
        pub opening_balance_minor: i64,
        pub closing_day: Option<u8>,
        pub due_day: Option<u8>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletUpdate {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletView {
        pub id: Uuid,
        pub name: String,
        pub balance_minor: i64,
        pub closing_day: Option<u8>,
        pub due_day: Option<u8>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletListResponse {
        pub wallets: Vec<WalletView>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        /// `true` for the lazily created "Uncategorized" category.
        pub is_system: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub wallet_id: Uuid,
        /// Total amount; split across installments when `installments > 1`.
        pub amount_minor: i64,
        pub direction: Direction,
        pub occurred_on: NaiveDate,
        pub category_id: Option<Uuid>,
        pub payment_method: Option<PaymentMethod>,
        /// Number of monthly installments (1..=120).
        pub installments: Option<u32>,
        /// Expand into a recurring series with this frequency.
        pub recurring: Option<Frequency>,
        pub note: Option<String>,
    }

    /// Series membership, `None` fields for a standalone record.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SeriesView {
        pub series_id: Option<Uuid>,
        pub position: Option<u32>,
        /// Only set for installment plans.
        pub total: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub wallet_id: Uuid,
        pub amount_minor: i64,
        pub direction: Direction,
        pub occurred_on: NaiveDate,
        pub category_id: Uuid,
        pub payment_method: PaymentMethod,
        pub series: SeriesView,
        /// Set when the record was generated by subscription billing.
        pub subscription_id: Option<Uuid>,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub series_id: Option<Uuid>,
        pub transactions: Vec<TransactionView>,
        /// Signed change applied to the wallet balance.
        pub balance_delta_minor: i64,
    }

    /// Patch body; absent fields keep their stored value.
    ///
    /// On a series member every field but `occurred_on` applies to the
    /// whole series.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub amount_minor: Option<i64>,
        pub direction: Option<Direction>,
        pub wallet_id: Option<Uuid>,
        pub payment_method: Option<PaymentMethod>,
        pub category_id: Option<Uuid>,
        /// An empty string clears the note.
        pub note: Option<String>,
        pub occurred_on: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }

    /// Query of `GET /wallets/{id}/transactions`. `to` is exclusive.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        pub series_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionDeleted {
        pub deleted: Vec<Uuid>,
        pub balance_delta_minor: i64,
    }
}

pub mod subscription {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SubscriptionStatus {
        Active,
        Paused,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubscriptionNew {
        pub name: String,
        pub amount_minor: i64,
        /// Defaults to `expense`.
        pub direction: Option<Direction>,
        pub frequency: Frequency,
        pub wallet_id: Uuid,
        pub category_id: Option<Uuid>,
        pub payment_method: Option<PaymentMethod>,
        pub next_billing_date: NaiveDate,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SubscriptionUpdate {
        pub name: Option<String>,
        pub amount_minor: Option<i64>,
        pub direction: Option<Direction>,
        pub frequency: Option<Frequency>,
        pub wallet_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub payment_method: Option<PaymentMethod>,
        pub next_billing_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubscriptionView {
        pub id: Uuid,
        pub name: String,
        pub amount_minor: i64,
        pub direction: Direction,
        pub frequency: Frequency,
        pub wallet_id: Uuid,
        pub category_id: Uuid,
        pub payment_method: PaymentMethod,
        pub status: SubscriptionStatus,
        pub next_billing_date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubscriptionListResponse {
        pub subscriptions: Vec<SubscriptionView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SubscriptionDeleteQuery {
        /// Also delete the generated transactions, reversing their effects.
        #[serde(default)]
        pub cascade: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubscriptionDeleted {
        pub id: Uuid,
        pub deleted_transactions: Vec<Uuid>,
    }
}

pub mod billing {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BillingRun {
        /// Billing date, today (UTC) when absent.
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BilledPeriodView {
        pub subscription_id: Uuid,
        pub name: String,
        pub transaction_id: Uuid,
        pub direction: Direction,
        pub amount_minor: i64,
        pub billed_on: NaiveDate,
        pub next_billing_date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillingFailureView {
        pub subscription_id: Uuid,
        pub name: String,
        pub code: String,
        pub error: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillingSummaryResponse {
        pub processed: usize,
        pub details: Vec<BilledPeriodView>,
        pub failures: Vec<BillingFailureView>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetSet {
        pub category_id: Uuid,
        pub year: i32,
        pub month: u32,
        pub limit_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetStatusQuery {
        pub year: i32,
        pub month: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetStatusView {
        pub budget_id: Uuid,
        pub category_id: Uuid,
        pub category_name: String,
        pub limit_minor: i64,
        pub spent_minor: i64,
        pub remaining_minor: i64,
        pub exceeded: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetStatusResponse {
        pub budgets: Vec<BudgetStatusView>,
    }
}
