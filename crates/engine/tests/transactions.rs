mod common;

use engine::{
    CreateTransactionCmd, Direction, EngineError, Frequency, LedgerEffect, Money, PaymentMethod,
    Series, TransactionListFilter, UpdateTransactionCmd,
};

use common::{ALICE, BOB, balance, cents, date, engine_with_db, wallet_with};

fn expense(wallet_id: uuid::Uuid, amount: i64, on: chrono::NaiveDate) -> CreateTransactionCmd {
    CreateTransactionCmd::new(ALICE, wallet_id, cents(amount), Direction::Expense, on)
}

#[tokio::test]
async fn expense_then_delete_restores_balance() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 100_00).await;

    let created = engine
        .create_transaction(expense(wallet_id, 40_00, date(2025, 1, 10)))
        .await
        .unwrap();
    assert_eq!(created.records.len(), 1);
    assert_eq!(created.series_id, None);
    assert_eq!(created.effect, LedgerEffect::Debit(cents(40_00)));
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(60_00));

    let deleted = engine
        .delete_transaction(ALICE, created.records[0].id)
        .await
        .unwrap();
    assert_eq!(deleted.deleted, vec![created.records[0].id]);
    assert_eq!(deleted.reversed, LedgerEffect::Credit(cents(40_00)));
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(100_00));
}

#[tokio::test]
async fn installment_on_empty_wallet_is_rejected_without_records() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 0).await;

    let err = engine
        .create_transaction(expense(wallet_id, 100_00, date(2025, 1, 15)).installments(10))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert_eq!(err.code(), "insufficient_funds");

    let listed = engine
        .list_transactions(ALICE, wallet_id, &TransactionListFilter::default())
        .await
        .unwrap();
    assert!(listed.is_empty());
    assert_eq!(balance(&engine, ALICE, wallet_id).await, Money::ZERO);
}

#[tokio::test]
async fn installment_plan_debits_first_share_only() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 1_000_00).await;

    let created = engine
        .create_transaction(
            expense(wallet_id, 100_00, date(2025, 1, 15))
                .installments(4)
                .payment_method(PaymentMethod::Cash),
        )
        .await
        .unwrap();

    let series_id = created.series_id.unwrap();
    let dates: Vec<_> = created.records.iter().map(|r| r.occurred_on).collect();
    assert_eq!(
        dates,
        vec![
            date(2025, 1, 15),
            date(2025, 2, 15),
            date(2025, 3, 15),
            date(2025, 4, 15)
        ]
    );
    assert!(created.records.iter().all(|r| r.amount == cents(25_00)));
    assert!(
        created
            .records
            .iter()
            .all(|r| r.series.series_id() == Some(series_id))
    );
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(975_00));

    let filter = TransactionListFilter {
        series_id: Some(series_id),
        ..Default::default()
    };
    let listed = engine
        .list_transactions(ALICE, wallet_id, &filter)
        .await
        .unwrap();
    assert_eq!(listed.len(), 4);
    assert_eq!(listed[0].occurred_on, date(2025, 4, 15));
}

#[tokio::test]
async fn installments_from_month_end_clamp() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 500_00).await;

    let created = engine
        .create_transaction(expense(wallet_id, 90_00, date(2025, 1, 31)).installments(3))
        .await
        .unwrap();
    let dates: Vec<_> = created.records.iter().map(|r| r.occurred_on).collect();
    assert_eq!(
        dates,
        vec![date(2025, 1, 31), date(2025, 2, 28), date(2025, 3, 31)]
    );
}

#[tokio::test]
async fn update_amount_reverses_before_applying() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 100_00).await;
    let created = engine
        .create_transaction(expense(wallet_id, 40_00, date(2025, 2, 1)))
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(60_00));

    // 70.00 > 60.00, only payable against the post-reversal balance.
    let updated = engine
        .update_transaction(
            UpdateTransactionCmd::new(ALICE, created.records[0].id).amount(cents(70_00)),
        )
        .await
        .unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].amount, cents(70_00));
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(30_00));
}

#[tokio::test]
async fn failed_update_leaves_everything_untouched() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 100_00).await;
    let created = engine
        .create_transaction(expense(wallet_id, 40_00, date(2025, 2, 1)))
        .await
        .unwrap();
    let id = created.records[0].id;

    let err = engine
        .update_transaction(UpdateTransactionCmd::new(ALICE, id).amount(cents(150_00)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(60_00));
    assert_eq!(
        engine.transaction(ALICE, id).await.unwrap().amount,
        cents(40_00)
    );
}

#[tokio::test]
async fn series_edit_applies_to_all_but_date() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 1_000_00).await;
    let groceries = engine.new_category(ALICE, "Groceries").await.unwrap();
    let created = engine
        .create_transaction(expense(wallet_id, 100_00, date(2025, 1, 15)).installments(4))
        .await
        .unwrap();
    let target = created.records[1].id;

    let updated = engine
        .update_transaction(
            UpdateTransactionCmd::new(ALICE, target)
                .amount(cents(30_00))
                .category_id(groceries.id)
                .note("sofa")
                .occurred_on(date(2025, 2, 20)),
        )
        .await
        .unwrap();

    assert_eq!(updated.len(), 4);
    for record in &updated {
        assert_eq!(record.amount, cents(30_00));
        assert_eq!(record.category_id, groceries.id);
        assert_eq!(record.note.as_deref(), Some("sofa"));
    }
    let dates: Vec<_> = updated.iter().map(|r| r.occurred_on).collect();
    assert_eq!(
        dates,
        vec![
            date(2025, 1, 15),
            date(2025, 2, 20),
            date(2025, 3, 15),
            date(2025, 4, 15)
        ]
    );
    // One series effect: 25.00 reversed, 30.00 applied.
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(970_00));
}

#[tokio::test]
async fn series_delete_removes_all_and_reverses_once() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 1_000_00).await;
    let created = engine
        .create_transaction(expense(wallet_id, 100_00, date(2025, 1, 15)).installments(4))
        .await
        .unwrap();

    let deleted = engine
        .delete_transaction(ALICE, created.records[2].id)
        .await
        .unwrap();
    assert_eq!(deleted.deleted.len(), 4);
    assert_eq!(deleted.reversed, LedgerEffect::Credit(cents(25_00)));
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(1_000_00));

    for record in &created.records {
        let err = engine.transaction(ALICE, record.id).await.unwrap_err();
        assert!(matches!(err, EngineError::KeyNotFound(_)));
    }
}

#[tokio::test]
async fn recurring_request_expands_twelve_periods() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 100_00).await;

    let created = engine
        .create_transaction(
            expense(wallet_id, 9_99, date(2025, 1, 31)).recurring(Frequency::Monthly),
        )
        .await
        .unwrap();
    assert_eq!(created.records.len(), 12);
    assert!(created.records.iter().all(|r| r.amount == cents(9_99)));
    assert_eq!(created.records[1].occurred_on, date(2025, 2, 28));
    assert!(matches!(
        created.records[0].series,
        Series::SubscriptionExpansion { position: 1, .. }
    ));
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(90_01));
}

#[tokio::test]
async fn deferred_expense_never_touches_the_ledger() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Card", 10_00).await;

    let created = engine
        .create_transaction(
            expense(wallet_id, 250_00, date(2025, 5, 2)).payment_method(PaymentMethod::CreditCard),
        )
        .await
        .unwrap();
    assert_eq!(created.effect, LedgerEffect::None);
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(10_00));

    let deleted = engine
        .delete_transaction(ALICE, created.records[0].id)
        .await
        .unwrap();
    assert_eq!(deleted.reversed, LedgerEffect::None);
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(10_00));
}

#[tokio::test]
async fn switching_to_immediate_method_debits() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 100_00).await;
    let created = engine
        .create_transaction(
            expense(wallet_id, 30_00, date(2025, 5, 2)).payment_method(PaymentMethod::CreditCard),
        )
        .await
        .unwrap();

    engine
        .update_transaction(
            UpdateTransactionCmd::new(ALICE, created.records[0].id)
                .payment_method(PaymentMethod::DebitCard),
        )
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(70_00));
}

#[tokio::test]
async fn moving_to_another_wallet_moves_the_effect() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet_with(&engine, ALICE, "Cash", 100_00).await;
    let bank = wallet_with(&engine, ALICE, "Bank", 100_00).await;
    let created = engine
        .create_transaction(expense(cash, 40_00, date(2025, 5, 2)))
        .await
        .unwrap();

    engine
        .update_transaction(UpdateTransactionCmd::new(ALICE, created.records[0].id).wallet_id(bank))
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, cash).await, cents(100_00));
    assert_eq!(balance(&engine, ALICE, bank).await, cents(60_00));
}

#[tokio::test]
async fn balance_matches_sum_of_effects() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 500_00).await;

    let salary = engine
        .create_transaction(
            CreateTransactionCmd::new(
                ALICE,
                wallet_id,
                cents(1_200_00),
                Direction::Income,
                date(2025, 3, 1),
            )
            .payment_method(PaymentMethod::BankTransfer),
        )
        .await
        .unwrap();
    let rent = engine
        .create_transaction(expense(wallet_id, 700_00, date(2025, 3, 2)))
        .await
        .unwrap();
    engine
        .create_transaction(
            expense(wallet_id, 80_00, date(2025, 3, 3)).payment_method(PaymentMethod::CreditCard),
        )
        .await
        .unwrap();
    engine
        .create_transaction(expense(wallet_id, 60_00, date(2025, 3, 4)).installments(3))
        .await
        .unwrap();
    engine
        .update_transaction(
            UpdateTransactionCmd::new(ALICE, rent.records[0].id).amount(cents(650_00)),
        )
        .await
        .unwrap();
    engine
        .update_transaction(
            UpdateTransactionCmd::new(ALICE, salary.records[0].id).direction(Direction::Income),
        )
        .await
        .unwrap();

    let listed = engine
        .list_transactions(ALICE, wallet_id, &TransactionListFilter::default())
        .await
        .unwrap();
    // A series carries a single effect, whatever its size.
    let mut seen_series = std::collections::HashSet::new();
    let total: Money = listed
        .iter()
        .filter(|tx| tx.series.series_id().is_none_or(|id| seen_series.insert(id)))
        .map(|tx| LedgerEffect::of(tx.direction, tx.payment_method, tx.amount).delta())
        .sum();

    assert_eq!(balance(&engine, ALICE, wallet_id).await, total);
    assert_eq!(total, cents(500_00 + 1_200_00 - 650_00 - 20_00));
}

#[tokio::test]
async fn concurrent_debits_never_overspend() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 100_00).await;

    let (first, second) = tokio::join!(
        engine.create_transaction(expense(wallet_id, 60_00, date(2025, 6, 1))),
        engine.create_transaction(expense(wallet_id, 60_00, date(2025, 6, 1))),
    );
    let outcomes = [first.is_ok(), second.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(40_00));
}

#[tokio::test]
async fn other_owners_see_nothing() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 100_00).await;
    let created = engine
        .create_transaction(expense(wallet_id, 10_00, date(2025, 6, 1)))
        .await
        .unwrap();
    let id = created.records[0].id;

    let err = engine.wallet(BOB, wallet_id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine.delete_transaction(BOB, id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine
        .update_transaction(UpdateTransactionCmd::new(BOB, id).amount(cents(1_00)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine
        .create_transaction(CreateTransactionCmd::new(
            BOB,
            wallet_id,
            cents(1_00),
            Direction::Expense,
            date(2025, 6, 1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(90_00));
}

#[tokio::test]
async fn validation_errors_come_before_any_mutation() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 100_00).await;

    let err = engine
        .create_transaction(expense(wallet_id, 0, date(2025, 6, 1)))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_argument");
    let err = engine
        .create_transaction(expense(wallet_id, 10_00, date(2025, 6, 1)).installments(0))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_argument");
    let err = engine
        .create_transaction(
            expense(wallet_id, 10_00, date(2025, 6, 1)).category_id(uuid::Uuid::new_v4()),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
    assert_eq!(balance(&engine, ALICE, wallet_id).await, cents(100_00));
}

#[tokio::test]
async fn default_category_is_created_once() {
    let (engine, _db) = engine_with_db().await;
    let wallet_id = wallet_with(&engine, ALICE, "Cash", 100_00).await;

    let first = engine
        .create_transaction(expense(wallet_id, 1_00, date(2025, 6, 1)))
        .await
        .unwrap();
    let second = engine
        .create_transaction(expense(wallet_id, 1_00, date(2025, 6, 2)))
        .await
        .unwrap();
    assert_eq!(
        first.records[0].category_id,
        second.records[0].category_id
    );

    let categories = engine.categories(ALICE).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert!(categories[0].is_system);
    assert_eq!(categories[0].name, "Uncategorized");
}
