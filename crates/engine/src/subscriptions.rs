//! Recurring charges and their billing state.
//!
//! A subscription is a single-writer state machine:
//!
//! ```text
//! ACTIVE --fires when due--> ACTIVE (next_billing_date advanced)
//! ACTIVE --pause--> PAUSED --resume--> ACTIVE
//! ```

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Direction, EngineError, Money, PaymentMethod, ResultEngine,
    calendar::{add_days, add_months},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Date one period after `date`.
    ///
    /// Month-based frequencies clamp to the end of the target month; weekly
    /// is plain day addition.
    pub fn advance(self, date: NaiveDate) -> ResultEngine<NaiveDate> {
        match self {
            Self::Weekly => add_days(date, 7),
            Self::Monthly => add_months(date, 1),
            Self::Quarterly => add_months(date, 3),
            Self::Yearly => add_months(date, 12),
        }
    }

    /// Date `periods` periods after `start`, always computed from `start` so
    /// an end-of-month clamp never shifts later periods.
    pub fn nth_after(self, start: NaiveDate, periods: u32) -> ResultEngine<NaiveDate> {
        match self {
            Self::Weekly => add_days(start, 7 * u64::from(periods)),
            Self::Monthly => add_months(start, periods),
            Self::Quarterly => add_months(start, periods.saturating_mul(3)),
            Self::Yearly => add_months(start, periods.saturating_mul(12)),
        }
    }
}

impl TryFrom<&str> for Frequency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid frequency: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Paused,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
        }
    }
}

impl TryFrom<&str> for SubscriptionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid subscription status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub amount: Money,
    pub direction: Direction,
    pub frequency: Frequency,
    pub wallet_id: Uuid,
    pub category_id: Uuid,
    pub payment_method: PaymentMethod,
    pub status: SubscriptionStatus,
    pub next_billing_date: NaiveDate,
}

impl Subscription {
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.status == SubscriptionStatus::Active && self.next_billing_date <= today
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub amount_minor: i64,
    pub direction: String,
    pub frequency: String,
    pub wallet_id: Uuid,
    pub category_id: Uuid,
    pub payment_method: String,
    pub status: String,
    pub next_billing_date: Date,
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
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Subscription> for ActiveModel {
    fn from(value: &Subscription) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            owner_id: ActiveValue::Set(value.owner_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            amount_minor: ActiveValue::Set(value.amount.cents()),
            direction: ActiveValue::Set(value.direction.as_str().to_string()),
            frequency: ActiveValue::Set(value.frequency.as_str().to_string()),
            wallet_id: ActiveValue::Set(value.wallet_id),
            category_id: ActiveValue::Set(value.category_id),
            payment_method: ActiveValue::Set(value.payment_method.as_str().to_string()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            next_billing_date: ActiveValue::Set(value.next_billing_date),
        }
    }
}

impl TryFrom<Model> for Subscription {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            amount: Money::from_cents(model.amount_minor),
            direction: Direction::try_from(model.direction.as_str())?,
            frequency: Frequency::try_from(model.frequency.as_str())?,
            wallet_id: model.wallet_id,
            category_id: model.category_id,
            payment_method: PaymentMethod::try_from(model.payment_method.as_str())?,
            status: SubscriptionStatus::try_from(model.status.as_str())?,
            next_billing_date: model.next_billing_date,
        })
    }
}
