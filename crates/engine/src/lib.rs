pub use budgets::BudgetStatus;
pub use categories::Category;
pub use commands::{
    CreateTransactionCmd, NewSubscriptionCmd, UpdateSubscriptionCmd, UpdateTransactionCmd,
};
pub use error::EngineError;
pub use ledger::{Ledger, LedgerEffect};
pub use money::Money;
pub use ops::{
    BilledPeriod, BillingFailure, BillingSummary, CatchUp, CreatedTransactions,
    DeletedSubscription, DeletedTransactions, Engine, EngineBuilder, RetryPolicy,
    TransactionListFilter,
};
pub use series::{MAX_INSTALLMENTS, PlannedRecord, Repetition, SUBSCRIPTION_HORIZON, SeriesPlan};
pub use subscriptions::{Frequency, Subscription, SubscriptionStatus};
pub use transactions::{Direction, PaymentMethod, Series, Transaction, TransactionSource};
pub use wallets::Wallet;

pub mod calendar;
mod budgets;
mod categories;
mod commands;
mod error;
mod ledger;
mod money;
mod ops;
mod series;
mod subscriptions;
mod transactions;
mod util;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
