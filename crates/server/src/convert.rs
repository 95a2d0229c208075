//! Conversions between engine types and wire types.

use api_types::{
    Direction as ApiDirection, Frequency as ApiFrequency, PaymentMethod as ApiMethod,
    subscription::{SubscriptionStatus as ApiStatus, SubscriptionView},
    transaction::{SeriesView, TransactionView},
};
use engine::{
    Direction, Frequency, Money, PaymentMethod, Series, Subscription, SubscriptionStatus,
    Transaction, TransactionSource,
};

pub fn direction_from_api(direction: ApiDirection) -> Direction {
    match direction {
        ApiDirection::Income => Direction::Income,
        ApiDirection::Expense => Direction::Expense,
    }
}

pub fn map_direction(direction: Direction) -> ApiDirection {
    match direction {
        Direction::Income => ApiDirection::Income,
        Direction::Expense => ApiDirection::Expense,
    }
}

pub fn method_from_api(method: ApiMethod) -> PaymentMethod {
    match method {
        ApiMethod::Cash => PaymentMethod::Cash,
        ApiMethod::DebitCard => PaymentMethod::DebitCard,
        ApiMethod::BankTransfer => PaymentMethod::BankTransfer,
        ApiMethod::CreditCard => PaymentMethod::CreditCard,
    }
}

pub fn map_method(method: PaymentMethod) -> ApiMethod {
    match method {
        PaymentMethod::Cash => ApiMethod::Cash,
        PaymentMethod::DebitCard => ApiMethod::DebitCard,
        PaymentMethod::BankTransfer => ApiMethod::BankTransfer,
        PaymentMethod::CreditCard => ApiMethod::CreditCard,
    }
}

pub fn frequency_from_api(frequency: ApiFrequency) -> Frequency {
    match frequency {
        ApiFrequency::Weekly => Frequency::Weekly,
        ApiFrequency::Monthly => Frequency::Monthly,
        ApiFrequency::Quarterly => Frequency::Quarterly,
        ApiFrequency::Yearly => Frequency::Yearly,
    }
}

fn map_frequency(frequency: Frequency) -> ApiFrequency {
    match frequency {
        Frequency::Weekly => ApiFrequency::Weekly,
        Frequency::Monthly => ApiFrequency::Monthly,
        Frequency::Quarterly => ApiFrequency::Quarterly,
        Frequency::Yearly => ApiFrequency::Yearly,
    }
}

fn map_series(series: Series) -> SeriesView {
    match series {
        Series::Standalone => SeriesView::default(),
        Series::Installment {
            series_id,
            position,
            total,
        } => SeriesView {
            series_id: Some(series_id),
            position: Some(position),
            total: Some(total),
        },
        Series::SubscriptionExpansion {
            series_id,
            position,
        } => SeriesView {
            series_id: Some(series_id),
            position: Some(position),
            total: None,
        },
    }
}

pub fn map_transaction(tx: Transaction) -> TransactionView {
    let subscription_id = match tx.source {
        TransactionSource::User => None,
        TransactionSource::Subscription { subscription_id } => Some(subscription_id),
    };
    TransactionView {
        id: tx.id,
        wallet_id: tx.wallet_id,
        amount_minor: tx.amount.cents(),
        direction: map_direction(tx.direction),
        occurred_on: tx.occurred_on,
        category_id: tx.category_id,
        payment_method: map_method(tx.payment_method),
        series: map_series(tx.series),
        subscription_id,
        note: tx.note,
    }
}

pub fn map_subscription(subscription: Subscription) -> SubscriptionView {
    SubscriptionView {
        id: subscription.id,
        name: subscription.name,
        amount_minor: subscription.amount.cents(),
        direction: map_direction(subscription.direction),
        frequency: map_frequency(subscription.frequency),
        wallet_id: subscription.wallet_id,
        category_id: subscription.category_id,
        payment_method: map_method(subscription.payment_method),
        status: match subscription.status {
            SubscriptionStatus::Active => ApiStatus::Active,
            SubscriptionStatus::Paused => ApiStatus::Paused,
        },
        next_billing_date: subscription.next_billing_date,
    }
}

pub fn money(minor: i64) -> Money {
    Money::from_cents(minor)
}
