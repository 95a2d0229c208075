//! Transactions API endpoints

use api_types::transaction::{
    TransactionCreated, TransactionDeleted, TransactionListQuery, TransactionListResponse,
    TransactionNew, TransactionUpdate, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    Owner, ServerError,
    convert::{direction_from_api, frequency_from_api, map_transaction, method_from_api, money},
    server::ServerState,
};

pub async fn create(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    if payload.installments.is_some() && payload.recurring.is_some() {
        return Err(ServerError::Generic(
            "provide only one of installments or recurring".to_string(),
        ));
    }

    let mut cmd = engine::CreateTransactionCmd::new(
        owner,
        payload.wallet_id,
        money(payload.amount_minor),
        direction_from_api(payload.direction),
        payload.occurred_on,
    );
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(method) = payload.payment_method {
        cmd = cmd.payment_method(method_from_api(method));
    }
    if let Some(count) = payload.installments {
        cmd = cmd.installments(count);
    }
    if let Some(frequency) = payload.recurring {
        cmd = cmd.recurring(frequency_from_api(frequency));
    }
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }

    let created = state.engine.create_transaction(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(TransactionCreated {
            series_id: created.series_id,
            balance_delta_minor: created.effect.delta().cents(),
            transactions: created.records.into_iter().map(map_transaction).collect(),
        }),
    ))
}

pub async fn get(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(&owner, id).await?;
    Ok(Json(map_transaction(tx)))
}

pub async fn list(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let filter = engine::TransactionListFilter {
        from: query.from,
        to: query.to,
        series_id: query.series_id,
    };
    let transactions = state
        .engine
        .list_transactions(&owner, wallet_id, &filter)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();

    Ok(Json(TransactionListResponse { transactions }))
}

pub async fn update(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let cmd = engine::UpdateTransactionCmd {
        owner_id: owner,
        transaction_id: id,
        amount: payload.amount_minor.map(money),
        direction: payload.direction.map(direction_from_api),
        wallet_id: payload.wallet_id,
        payment_method: payload.payment_method.map(method_from_api),
        category_id: payload.category_id,
        note: payload.note,
        occurred_on: payload.occurred_on,
    };
    let transactions = state
        .engine
        .update_transaction(cmd)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();

    Ok(Json(TransactionListResponse { transactions }))
}

pub async fn delete(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionDeleted>, ServerError> {
    let deleted = state.engine.delete_transaction(&owner, id).await?;
    Ok(Json(TransactionDeleted {
        deleted: deleted.deleted,
        balance_delta_minor: deleted.reversed.delta().cents(),
    }))
}
