use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, NewSubscriptionCmd, ResultEngine, Subscription, SubscriptionStatus, Transaction,
    UpdateSubscriptionCmd, subscriptions, transactions, util::normalize_required_name,
};

use super::{Engine, with_tx};

/// Result of `delete_subscription`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedSubscription {
    pub subscription_id: Uuid,
    /// Generated transactions removed with it (only with `cascade`).
    pub deleted_transactions: Vec<Uuid>,
}

impl Engine {
    /// Creates an active subscription.
    pub async fn new_subscription(&self, cmd: NewSubscriptionCmd) -> ResultEngine<Subscription> {
        let name = normalize_required_name(&cmd.name, "subscription")?;
        cmd.amount.ensure_positive("amount")?;
        let owner_id = cmd.owner_id.as_str();

        let subscription = with_tx!(self, |db_tx| {
            self.require_wallet_owned(&db_tx, owner_id, cmd.wallet_id)
                .await?;
            let category_id = self
                .resolve_category(&db_tx, owner_id, cmd.category_id)
                .await?;

            let subscription = Subscription {
                id: Uuid::new_v4(),
                owner_id: owner_id.to_string(),
                name: name.clone(),
                amount: cmd.amount,
                direction: cmd.direction,
                frequency: cmd.frequency,
                wallet_id: cmd.wallet_id,
                category_id,
                payment_method: cmd.payment_method,
                status: SubscriptionStatus::Active,
                next_billing_date: cmd.next_billing_date,
            };
            subscriptions::ActiveModel::from(&subscription)
                .insert(&db_tx)
                .await?;
            Ok(subscription)
        })?;

        tracing::info!(
            subscription_id = %subscription.id,
            frequency = subscription.frequency.as_str(),
            next_billing_date = %subscription.next_billing_date,
            "subscription created"
        );
        Ok(subscription)
    }

    /// Returns one subscription.
    pub async fn subscription(
        &self,
        owner_id: &str,
        subscription_id: Uuid,
    ) -> ResultEngine<Subscription> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_subscription_owned(&db_tx, owner_id, subscription_id)
                .await?;
            Subscription::try_from(model)
        })
    }

    /// Lists the owner's subscriptions, next due first.
    pub async fn subscriptions(&self, owner_id: &str) -> ResultEngine<Vec<Subscription>> {
        with_tx!(self, |db_tx| {
            let models = subscriptions::Entity::find()
                .filter(subscriptions::Column::OwnerId.eq(owner_id.to_string()))
                .order_by_asc(subscriptions::Column::NextBillingDate)
                .order_by_asc(subscriptions::Column::Name)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(Subscription::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Patches a subscription's parameters.
    ///
    /// Already generated transactions are left as they are. A new
    /// `next_billing_date` must be later than the last billed period.
    pub async fn update_subscription(
        &self,
        cmd: UpdateSubscriptionCmd,
    ) -> ResultEngine<Subscription> {
        let name = cmd
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "subscription"))
            .transpose()?;
        if let Some(amount) = cmd.amount {
            amount.ensure_positive("amount")?;
        }
        let owner_id = cmd.owner_id.as_str();

        with_tx!(self, |db_tx| {
            let model = self
                .require_subscription_owned(&db_tx, owner_id, cmd.subscription_id)
                .await?;
            let mut subscription = Subscription::try_from(model)?;

            if let Some(wallet_id) = cmd.wallet_id {
                self.require_wallet_owned(&db_tx, owner_id, wallet_id)
                    .await?;
                subscription.wallet_id = wallet_id;
            }
            if let Some(category_id) = cmd.category_id {
                self.require_category_owned(&db_tx, owner_id, category_id)
                    .await?;
                subscription.category_id = category_id;
            }
            if let Some(name) = &name {
                subscription.name = name.clone();
            }
            subscription.amount = cmd.amount.unwrap_or(subscription.amount);
            subscription.direction = cmd.direction.unwrap_or(subscription.direction);
            subscription.frequency = cmd.frequency.unwrap_or(subscription.frequency);
            subscription.payment_method =
                cmd.payment_method.unwrap_or(subscription.payment_method);
            if let Some(next_billing_date) = cmd.next_billing_date {
                let last_billed = transactions::Entity::find()
                    .filter(transactions::Column::SubscriptionId.eq(cmd.subscription_id))
                    .order_by_desc(transactions::Column::OccurredOn)
                    .one(&db_tx)
                    .await?;
                if let Some(last_billed) = last_billed
                    && next_billing_date <= last_billed.occurred_on
                {
                    return Err(EngineError::InvalidArgument(format!(
                        "next billing date must be after {}, the last billed period",
                        last_billed.occurred_on
                    )));
                }
                subscription.next_billing_date = next_billing_date;
            }

            subscriptions::ActiveModel::from(&subscription)
                .update(&db_tx)
                .await?;
            Ok(subscription)
        })
    }

    /// ACTIVE -> PAUSED. A paused subscription is never billed.
    pub async fn pause_subscription(
        &self,
        owner_id: &str,
        subscription_id: Uuid,
    ) -> ResultEngine<Subscription> {
        self.transition_subscription(
            owner_id,
            subscription_id,
            SubscriptionStatus::Active,
            SubscriptionStatus::Paused,
        )
        .await
    }

    /// PAUSED -> ACTIVE. Billing picks up from the stored
    /// `next_billing_date`.
    pub async fn resume_subscription(
        &self,
        owner_id: &str,
        subscription_id: Uuid,
    ) -> ResultEngine<Subscription> {
        self.transition_subscription(
            owner_id,
            subscription_id,
            SubscriptionStatus::Paused,
            SubscriptionStatus::Active,
        )
        .await
    }

    async fn transition_subscription(
        &self,
        owner_id: &str,
        subscription_id: Uuid,
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    ) -> ResultEngine<Subscription> {
        let subscription = with_tx!(self, |db_tx| {
            let model = self
                .require_subscription_owned(&db_tx, owner_id, subscription_id)
                .await?;
            let mut subscription = Subscription::try_from(model)?;
            if subscription.status != from {
                return Err(EngineError::InvalidArgument(format!(
                    "subscription is {}, expected {}",
                    subscription.status.as_str(),
                    from.as_str()
                )));
            }

            let active = subscriptions::ActiveModel {
                id: ActiveValue::Set(subscription_id),
                status: ActiveValue::Set(to.as_str().to_string()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            subscription.status = to;
            Ok(subscription)
        })?;

        tracing::info!(%subscription_id, status = to.as_str(), "subscription status changed");
        Ok(subscription)
    }

    /// Deletes a subscription.
    ///
    /// With `cascade`, the transactions billing generated for it are deleted
    /// too, each one reversing its own ledger effect. Without it they stay and
    /// keep their `subscription_id` tag.
    pub async fn delete_subscription(
        &self,
        owner_id: &str,
        subscription_id: Uuid,
        cascade: bool,
    ) -> ResultEngine<DeletedSubscription> {
        let deleted = with_tx!(self, |db_tx| {
            self.require_subscription_owned(&db_tx, owner_id, subscription_id)
                .await?;

            let mut deleted_transactions = Vec::new();
            if cascade {
                let generated = transactions::Entity::find()
                    .filter(transactions::Column::SubscriptionId.eq(subscription_id))
                    .order_by_asc(transactions::Column::OccurredOn)
                    .all(&db_tx)
                    .await?;
                for model in generated {
                    let tx = Transaction::try_from(model)?;
                    let removed = self.remove_transaction(&db_tx, &tx).await?;
                    deleted_transactions.extend(removed.deleted);
                }
            }

            subscriptions::Entity::delete_by_id(subscription_id)
                .exec(&db_tx)
                .await?;
            Ok(DeletedSubscription {
                subscription_id,
                deleted_transactions,
            })
        })?;

        tracing::info!(
            %subscription_id,
            cascade,
            deleted_transactions = deleted.deleted_transactions.len(),
            "subscription deleted"
        );
        Ok(deleted)
    }
}
