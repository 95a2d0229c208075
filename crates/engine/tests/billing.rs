mod common;

use engine::{
    CatchUp, Direction, EngineError, Frequency, NewSubscriptionCmd, SubscriptionStatus,
    TransactionListFilter, TransactionSource, UpdateSubscriptionCmd,
};
use uuid::Uuid;

use common::{
    ALICE, BOB, balance, cents, date, engine_with_catch_up, engine_with_db, wallet_with,
};

fn monthly(wallet_id: Uuid, amount: i64, next: chrono::NaiveDate) -> NewSubscriptionCmd {
    NewSubscriptionCmd::new(
        ALICE,
        "Streaming",
        cents(amount),
        Frequency::Monthly,
        wallet_id,
        next,
    )
}

#[tokio::test]
async fn due_subscription_is_billed_and_advanced() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 500_00).await;
    let subscription = engine
        .new_subscription(monthly(wallet_id, 29_90, date(2025, 3, 14)))
        .await
        .unwrap();

    let summary = engine
        .trigger_subscription_billing(date(2025, 3, 15))
        .await
        .unwrap();
    assert_eq!(summary.processed, 1);
    assert!(summary.failures.is_empty());
    let period = &summary.details[0];
    assert_eq!(period.billed_on, date(2025, 3, 14));
    assert_eq!(period.next_billing_date, date(2025, 4, 14));
    assert!(period.to_string().contains("29.90"));

    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(470_10));
    let billed = engine
        .transaction(ALICE, period.transaction_id)
        .await
        .unwrap();
    assert_eq!(billed.direction, Direction::Expense);
    assert_eq!(billed.amount, cents(29_90));
    assert_eq!(billed.occurred_on, date(2025, 3, 14));
    assert_eq!(
        billed.source,
        TransactionSource::Subscription {
            subscription_id: subscription.id
        }
    );
    assert_eq!(billed.series.series_id(), None);

    let stored = engine.subscription(ALICE, subscription.id).await.unwrap();
    assert_eq!(stored.next_billing_date, date(2025, 4, 14));
}

#[tokio::test]
async fn second_trigger_bills_nothing() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 500_00).await;
    engine
        .new_subscription(monthly(wallet_id, 10_00, date(2025, 3, 15)))
        .await
        .unwrap();

    let today = date(2025, 3, 15);
    let first = engine.trigger_subscription_billing(today).await.unwrap();
    let second = engine.trigger_subscription_billing(today).await.unwrap();
    assert_eq!(first.processed, 1);
    assert_eq!(second.processed, 0);
    assert!(second.details.is_empty());
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(490_00));
}

#[tokio::test]
async fn month_end_billing_clamps_to_february() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 500_00).await;
    let subscription = engine
        .new_subscription(monthly(wallet_id, 10_00, date(2025, 1, 31)))
        .await
        .unwrap();

    engine
        .trigger_subscription_billing(date(2025, 1, 31))
        .await
        .unwrap();
    let stored = engine.subscription(ALICE, subscription.id).await.unwrap();
    assert_eq!(stored.next_billing_date, date(2025, 2, 28));
}

#[tokio::test]
async fn one_period_per_trigger_by_default() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 500_00).await;
    let subscription = engine
        .new_subscription(monthly(wallet_id, 10_00, date(2025, 1, 10)))
        .await
        .unwrap();

    let today = date(2025, 4, 1);
    let summary = engine.trigger_subscription_billing(today).await.unwrap();
    assert_eq!(summary.details.len(), 1);
    let stored = engine.subscription(ALICE, subscription.id).await.unwrap();
    assert_eq!(stored.next_billing_date, date(2025, 2, 10));

    engine.trigger_subscription_billing(today).await.unwrap();
    engine.trigger_subscription_billing(today).await.unwrap();
    let caught_up = engine.trigger_subscription_billing(today).await.unwrap();
    assert_eq!(caught_up.processed, 0);
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(470_00));
}

#[tokio::test]
async fn all_due_catch_up_bills_every_overdue_period() {
    let (engine, _db) = engine_with_catch_up(CatchUp::AllDue).await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 500_00).await;
    let subscription = engine
        .new_subscription(monthly(wallet_id, 10_00, date(2025, 1, 10)))
        .await
        .unwrap();

    let summary = engine
        .trigger_subscription_billing(date(2025, 4, 1))
        .await
        .unwrap();
    assert_eq!(summary.processed, 1);
    let billed: Vec<_> = summary.details.iter().map(|p| p.billed_on).collect();
    assert_eq!(
        billed,
        vec![date(2025, 1, 10), date(2025, 2, 10), date(2025, 3, 10)]
    );
    let stored = engine.subscription(ALICE, subscription.id).await.unwrap();
    assert_eq!(stored.next_billing_date, date(2025, 4, 10));
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(470_00));
}

#[tokio::test]
async fn failing_subscription_does_not_block_others() {
    let (engine, _db) = engine_with_db().await;
    let poor = wallet_with(&engine, ALICE, "Poor", 5_00).await;
    let rich = wallet_with(&engine, ALICE, "Rich", 100_00).await;
    let failing = engine
        .new_subscription(monthly(poor, 10_00, date(2025, 3, 1)))
        .await
        .unwrap();
    engine
        .new_subscription(monthly(rich, 10_00, date(2025, 3, 1)))
        .await
        .unwrap();

    let summary = engine
        .trigger_subscription_billing(date(2025, 3, 1))
        .await
        .unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].subscription_id, failing.id);
    assert_eq!(summary.failures[0].code, "insufficient_funds");

    let stored = engine.subscription(ALICE, failing.id).await.unwrap();
    assert_eq!(stored.next_billing_date, date(2025, 3, 1));
    assert_eq!(balance(&engine, ALICE, poor).await, cents(5_00));
    assert_eq!(balance(&engine, ALICE, rich).await, cents(90_00));
}

#[tokio::test]
async fn paused_subscriptions_are_skipped_until_resumed() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 100_00).await;
    let subscription = engine
        .new_subscription(monthly(wallet_id, 10_00, date(2025, 3, 1)))
        .await
        .unwrap();

    let paused = engine
        .pause_subscription(ALICE, subscription.id)
        .await
        .unwrap();
    assert_eq!(paused.status, SubscriptionStatus::Paused);
    let err = engine
        .pause_subscription(ALICE, subscription.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    let summary = engine
        .trigger_subscription_billing(date(2025, 3, 2))
        .await
        .unwrap();
    assert_eq!(summary.processed, 0);

    let resumed = engine
        .resume_subscription(ALICE, subscription.id)
        .await
        .unwrap();
    assert_eq!(resumed.status, SubscriptionStatus::Active);
    let summary = engine
        .trigger_subscription_billing(date(2025, 3, 2))
        .await
        .unwrap();
    assert_eq!(summary.processed, 1);
}

#[tokio::test]
async fn cascade_delete_reverses_generated_transactions() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 100_00).await;
    let subscription = engine
        .new_subscription(monthly(wallet_id, 10_00, date(2025, 3, 1)))
        .await
        .unwrap();
    engine
        .trigger_subscription_billing(date(2025, 3, 1))
        .await
        .unwrap();
    engine
        .trigger_subscription_billing(date(2025, 4, 1))
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(80_00));

    let deleted = engine
        .delete_subscription(ALICE, subscription.id, true)
        .await
        .unwrap();
    assert_eq!(deleted.deleted_transactions.len(), 2);
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(100_00));
    let err = engine
        .subscription(ALICE, subscription.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn plain_delete_keeps_generated_transactions() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 100_00).await;
    let subscription = engine
        .new_subscription(monthly(wallet_id, 10_00, date(2025, 3, 1)))
        .await
        .unwrap();
    engine
        .trigger_subscription_billing(date(2025, 3, 1))
        .await
        .unwrap();

    let deleted = engine
        .delete_subscription(ALICE, subscription.id, false)
        .await
        .unwrap();
    assert!(deleted.deleted_transactions.is_empty());
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(90_00));

    let filter = TransactionListFilter {
        from: Some(date(2025, 3, 1)),
        to: Some(date(2025, 3, 2)),
        ..Default::default()
    };
    let listed = engine
        .list_transactions(ALICE, wallet_id, &filter)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn subscription_updates_and_ownership() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 100_00).await;
    let subscription = engine
        .new_subscription(monthly(wallet_id, 10_00, date(2025, 3, 1)))
        .await
        .unwrap();

    let updated = engine
        .update_subscription(
            UpdateSubscriptionCmd::new(ALICE, subscription.id)
                .name("Music")
                .amount(cents(12_00))
                .frequency(Frequency::Yearly),
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Music");
    assert_eq!(updated.amount, cents(12_00));
    assert_eq!(updated.frequency, Frequency::Yearly);
    assert_eq!(
        engine.subscriptions(ALICE).await.unwrap(),
        vec![updated.clone()]
    );

    let err = engine
        .update_subscription(UpdateSubscriptionCmd::new(BOB, subscription.id).name("Mine"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert!(engine.subscriptions(BOB).await.unwrap().is_empty());

    let err = engine
        .new_subscription(monthly(wallet_id, 0, date(2025, 3, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
}

#[tokio::test]
async fn billed_period_cannot_be_rescheduled_and_charged_again() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 500_00).await;
    let subscription = engine
        .new_subscription(monthly(wallet_id, 29_90, date(2025, 3, 14)))
        .await
        .unwrap();
    engine
        .trigger_subscription_billing(date(2025, 3, 15))
        .await
        .unwrap();

    for backdated in [date(2025, 3, 14), date(2025, 3, 1)] {
        let err = engine
            .update_subscription(
                UpdateSubscriptionCmd::new(ALICE, subscription.id).next_billing_date(backdated),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }
    let stored = engine.subscription(ALICE, subscription.id).await.unwrap();
    assert_eq!(stored.next_billing_date, date(2025, 4, 14));

    let again = engine
        .trigger_subscription_billing(date(2025, 3, 15))
        .await
        .unwrap();
    assert_eq!(again.processed, 0);
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(470_10));

    let moved = engine
        .update_subscription(
            UpdateSubscriptionCmd::new(ALICE, subscription.id).next_billing_date(date(2025, 3, 20)),
        )
        .await
        .unwrap();
    assert_eq!(moved.next_billing_date, date(2025, 3, 20));
}
