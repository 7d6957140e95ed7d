//! Transactions API endpoints

use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use engine::{Money, NewTransaction, PostedTransaction, Transaction, TransactionKind, TransactionQuery};
use serde::Deserialize;

use crate::{Cleared, ListResponse, Owner, ServerError, server::ServerState};

/// Fields shared by the three create endpoints. A missing `date` (or the zero
/// date) means "now".
#[derive(Debug, Deserialize)]
pub struct TransactionMeta {
    pub amount: Money,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl TransactionMeta {
    fn apply(self, mut cmd: NewTransaction) -> NewTransaction {
        cmd.description = self.description;
        cmd.occurred_at = self.date;
        cmd
    }
}

#[derive(Debug, Deserialize)]
pub struct ExpenseNew {
    pub src_wallet: String,
    #[serde(flatten)]
    pub meta: TransactionMeta,
}

#[derive(Debug, Deserialize)]
pub struct IncomeNew {
    pub dst_wallet: String,
    #[serde(flatten)]
    pub meta: TransactionMeta,
}

#[derive(Debug, Deserialize)]
pub struct TransferNew {
    pub src_wallet: String,
    pub dst_wallet: String,
    #[serde(flatten)]
    pub meta: TransactionMeta,
}

#[derive(Debug, Deserialize)]
pub struct TransactionId {
    pub id: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionList {
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    pub wallet: Option<String>,
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
}

async fn post_transaction(
    state: &ServerState,
    cmd: NewTransaction,
) -> Result<(StatusCode, Json<PostedTransaction>), ServerError> {
    let posted = state.engine.create_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(posted)))
}

pub async fn create_expense(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<PostedTransaction>), ServerError> {
    let cmd = NewTransaction::expense(
        owner,
        payload.meta.amount,
        payload.src_wallet,
        payload.meta.category.clone(),
    );
    post_transaction(&state, payload.meta.apply(cmd)).await
}

pub async fn create_income(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<IncomeNew>,
) -> Result<(StatusCode, Json<PostedTransaction>), ServerError> {
    let cmd = NewTransaction::income(
        owner,
        payload.meta.amount,
        payload.dst_wallet,
        payload.meta.category.clone(),
    );
    post_transaction(&state, payload.meta.apply(cmd)).await
}

pub async fn create_transfer(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<PostedTransaction>), ServerError> {
    let cmd = NewTransaction::transfer(
        owner,
        payload.meta.amount,
        payload.src_wallet,
        payload.dst_wallet,
        payload.meta.category.clone(),
    );
    post_transaction(&state, payload.meta.apply(cmd)).await
}

pub async fn get(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionId>,
) -> Result<Json<Transaction>, ServerError> {
    Ok(Json(state.engine.transaction(&owner, payload.id).await?))
}

pub async fn delete(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionId>,
) -> Result<Json<Transaction>, ServerError> {
    Ok(Json(
        state.engine.delete_transaction(&owner, payload.id).await?,
    ))
}

pub async fn list(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    payload: Option<Json<TransactionList>>,
) -> Result<Json<ListResponse<Transaction>>, ServerError> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    let query = TransactionQuery {
        owner,
        kind: payload.kind,
        wallet: payload.wallet,
        from: payload.from,
        until: payload.until,
    };
    Ok(Json(state.engine.transactions(query).await?.into()))
}

pub async fn list_types(State(state): State<ServerState>) -> Json<ListResponse<TransactionKind>> {
    Json(state.engine.transaction_types().to_vec().into())
}

pub async fn clear(State(state): State<ServerState>) -> Result<Json<Cleared>, ServerError> {
    let deleted = state.engine.clear_transactions().await?;
    Ok(Json(Cleared { deleted }))
}
