#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{CatchUp, Engine, Money};
use migration::MigratorTrait;
use uuid::Uuid;

pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    engine_with_catch_up(CatchUp::OnePeriod).await
}

pub async fn engine_with_catch_up(catch_up: CatchUp) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .catch_up(catch_up)
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn cents(value: i64) -> Money {
    Money::from_cents(value)
}

/// Creates a wallet for `owner` holding `balance` cents.
pub async fn wallet_with(engine: &Engine, owner: &str, name: &str, balance: i64) -> Uuid {
    engine
        .new_wallet(owner, name, cents(balance), None, None)
        .await
        .unwrap()
}

pub async fn balance(engine: &Engine, owner: &str, wallet_id: Uuid) -> Money {
    engine.wallet(owner, wallet_id).await.unwrap().balance
}
