//! Command structs for engine operations.
//!
//! These types group parameters for write operations (create/update of
//! transactions and subscriptions), keeping call sites readable and avoiding
//! long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{Direction, Frequency, Money, PaymentMethod, Repetition, TransactionSource};

/// Create one transaction, an installment plan or a recurring expansion.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub owner_id: String,
    pub wallet_id: Uuid,
    pub amount: Money,
    pub direction: Direction,
    pub occurred_on: NaiveDate,
    pub category_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
    pub repetition: Repetition,
    pub source: TransactionSource,
    pub note: Option<String>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        wallet_id: Uuid,
        amount: Money,
        direction: Direction,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            wallet_id,
            amount,
            direction,
            occurred_on,
            category_id: None,
            payment_method: PaymentMethod::default(),
            repetition: Repetition::Once,
            source: TransactionSource::User,
            note: None,
        }
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = payment_method;
        self
    }

    #[must_use]
    pub fn installments(mut self, count: u32) -> Self {
        self.repetition = Repetition::Installments(count);
        self
    }

    #[must_use]
    pub fn recurring(mut self, frequency: Frequency) -> Self {
        self.repetition = Repetition::Recurring(frequency);
        self
    }

    #[must_use]
    pub fn source(mut self, source: TransactionSource) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Patch an existing transaction. `None` keeps the stored value.
///
/// On a series member every field but `occurred_on` is written to all
/// members; `occurred_on` only moves the targeted record.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub owner_id: String,
    pub transaction_id: Uuid,
    pub amount: Option<Money>,
    pub direction: Option<Direction>,
    pub wallet_id: Option<Uuid>,
    pub payment_method: Option<PaymentMethod>,
    pub category_id: Option<Uuid>,
    pub note: Option<String>,
    pub occurred_on: Option<NaiveDate>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(owner_id: impl Into<String>, transaction_id: Uuid) -> Self {
        Self {
            owner_id: owner_id.into(),
            transaction_id,
            amount: None,
            direction: None,
            wallet_id: None,
            payment_method: None,
            category_id: None,
            note: None,
            occurred_on: None,
        }
    }

    #[must_use]
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    #[must_use]
    pub fn wallet_id(mut self, wallet_id: Uuid) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = Some(payment_method);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// An empty note clears the stored one.
    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn occurred_on(mut self, occurred_on: NaiveDate) -> Self {
        self.occurred_on = Some(occurred_on);
        self
    }
}

/// Create a subscription.
#[derive(Clone, Debug)]
pub struct NewSubscriptionCmd {
    pub owner_id: String,
    pub name: String,
    pub amount: Money,
    pub direction: Direction,
    pub frequency: Frequency,
    pub wallet_id: Uuid,
    pub category_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
    pub next_billing_date: NaiveDate,
}

impl NewSubscriptionCmd {
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        amount: Money,
        frequency: Frequency,
        wallet_id: Uuid,
        next_billing_date: NaiveDate,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: name.into(),
            amount,
            direction: Direction::Expense,
            frequency,
            wallet_id,
            category_id: None,
            payment_method: PaymentMethod::default(),
            next_billing_date,
        }
    }

    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = payment_method;
        self
    }
}

/// Patch a subscription. `None` keeps the stored value.
#[derive(Clone, Debug)]
pub struct UpdateSubscriptionCmd {
    pub owner_id: String,
    pub subscription_id: Uuid,
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub direction: Option<Direction>,
    pub frequency: Option<Frequency>,
    pub wallet_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub payment_method: Option<PaymentMethod>,
    pub next_billing_date: Option<NaiveDate>,
}

impl UpdateSubscriptionCmd {
    #[must_use]
    pub fn new(owner_id: impl Into<String>, subscription_id: Uuid) -> Self {
        Self {
            owner_id: owner_id.into(),
            subscription_id,
            name: None,
            amount: None,
            direction: None,
            frequency: None,
            wallet_id: None,
            category_id: None,
            payment_method: None,
            next_billing_date: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    #[must_use]
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    #[must_use]
    pub fn wallet_id(mut self, wallet_id: Uuid) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = Some(payment_method);
        self
    }

    #[must_use]
    pub fn next_billing_date(mut self, next_billing_date: NaiveDate) -> Self {
        self.next_billing_date = Some(next_billing_date);
        self
    }
}
