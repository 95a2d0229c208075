//! Transaction primitives.
//!
//! A `Transaction` is a single income or expense recorded against a wallet.
//! Transactions created together from one request (an installment plan or a
//! subscription expansion) share a [`Series`].

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Income,
    Expense,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid direction: {other}"
            ))),
        }
    }
}

/// How a transaction was paid.
///
/// `CreditCard` is the deferred method: an expense paid with it is billed
/// later through the card statement, so it never touches the wallet balance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    DebitCard,
    BankTransfer,
    CreditCard,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::DebitCard => "debit_card",
            Self::BankTransfer => "bank_transfer",
            Self::CreditCard => "credit_card",
        }
    }

    pub fn is_deferred(self) -> bool {
        matches!(self, Self::CreditCard)
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash" => Ok(Self::Cash),
            "debit_card" => Ok(Self::DebitCard),
            "bank_transfer" => Ok(Self::BankTransfer),
            "credit_card" => Ok(Self::CreditCard),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

/// Series membership of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Series {
    Standalone,
    /// Fixed total split over `total` months.
    Installment {
        series_id: Uuid,
        position: u32,
        total: u32,
    },
    /// Open-ended repetition of a fixed amount, generated for display.
    SubscriptionExpansion { series_id: Uuid, position: u32 },
}

impl Series {
    pub fn series_id(&self) -> Option<Uuid> {
        match self {
            Self::Standalone => None,
            Self::Installment { series_id, .. } | Self::SubscriptionExpansion { series_id, .. } => {
                Some(*series_id)
            }
        }
    }

    pub fn position(&self) -> Option<u32> {
        match self {
            Self::Standalone => None,
            Self::Installment { position, .. } | Self::SubscriptionExpansion { position, .. } => {
                Some(*position)
            }
        }
    }

    fn kind_str(&self) -> Option<&'static str> {
        match self {
            Self::Standalone => None,
            Self::Installment { .. } => Some("installment"),
            Self::SubscriptionExpansion { .. } => Some("subscription"),
        }
    }

    fn from_columns(
        kind: Option<&str>,
        series_id: Option<Uuid>,
        position: Option<i32>,
        total: Option<i32>,
    ) -> ResultEngine<Self> {
        let as_u32 = |value: i32| {
            u32::try_from(value)
                .map_err(|_| EngineError::InvalidArgument("invalid series position".to_string()))
        };
        match (kind, series_id, position, total) {
            (None, None, None, None) => Ok(Self::Standalone),
            (Some("installment"), Some(series_id), Some(position), Some(total)) => {
                Ok(Self::Installment {
                    series_id,
                    position: as_u32(position)?,
                    total: as_u32(total)?,
                })
            }
            (Some("subscription"), Some(series_id), Some(position), None) => {
                Ok(Self::SubscriptionExpansion {
                    series_id,
                    position: as_u32(position)?,
                })
            }
            _ => Err(EngineError::InvalidArgument(
                "inconsistent series columns".to_string(),
            )),
        }
    }
}

/// Who asked for a transaction to be created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionSource {
    #[default]
    User,
    /// Generated by the billing scheduler for a due subscription.
    Subscription { subscription_id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub amount: Money,
    pub direction: Direction,
    pub occurred_on: NaiveDate,
    pub category_id: Uuid,
    pub payment_method: PaymentMethod,
    pub series: Series,
    pub source: TransactionSource,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub amount_minor: i64,
    pub direction: String,
    pub occurred_on: Date,
    pub category_id: Uuid,
    pub payment_method: String,
    pub series_kind: Option<String>,
    pub series_id: Option<Uuid>,
    pub series_position: Option<i32>,
    pub series_total: Option<i32>,
    pub subscription_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Wallets,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Categories,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Transaction> for ActiveModel {
    type Error = EngineError;

    fn try_from(tx: &Transaction) -> Result<Self, Self::Error> {
        let as_i32 = |value: u32| {
            i32::try_from(value)
                .map_err(|_| EngineError::InvalidArgument("invalid series position".to_string()))
        };
        let (series_total, position) = match tx.series {
            Series::Installment {
                position, total, ..
            } => (Some(as_i32(total)?), Some(as_i32(position)?)),
            Series::SubscriptionExpansion { position, .. } => (None, Some(as_i32(position)?)),
            Series::Standalone => (None, None),
        };
        let subscription_id = match tx.source {
            TransactionSource::User => None,
            TransactionSource::Subscription { subscription_id } => Some(subscription_id),
        };
        Ok(Self {
            id: ActiveValue::Set(tx.id),
            wallet_id: ActiveValue::Set(tx.wallet_id),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            direction: ActiveValue::Set(tx.direction.as_str().to_string()),
            occurred_on: ActiveValue::Set(tx.occurred_on),
            category_id: ActiveValue::Set(tx.category_id),
            payment_method: ActiveValue::Set(tx.payment_method.as_str().to_string()),
            series_kind: ActiveValue::Set(tx.series.kind_str().map(ToString::to_string)),
            series_id: ActiveValue::Set(tx.series.series_id()),
            series_position: ActiveValue::Set(position),
            series_total: ActiveValue::Set(series_total),
            subscription_id: ActiveValue::Set(subscription_id),
            note: ActiveValue::Set(tx.note.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        })
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let series = Series::from_columns(
            model.series_kind.as_deref(),
            model.series_id,
            model.series_position,
            model.series_total,
        )?;
        let source = match model.subscription_id {
            Some(subscription_id) => TransactionSource::Subscription { subscription_id },
            None => TransactionSource::User,
        };
        Ok(Self {
            id: model.id,
            wallet_id: model.wallet_id,
            amount: Money::from_cents(model.amount_minor),
            direction: Direction::try_from(model.direction.as_str())?,
            occurred_on: model.occurred_on,
            category_id: model.category_id,
            payment_method: PaymentMethod::try_from(model.payment_method.as_str())?,
            series,
            source,
            note: model.note,
            created_at: model.created_at,
        })
    }
}
