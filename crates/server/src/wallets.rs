//! Wallets API endpoints.

use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{Money, Wallet, WalletType};
use serde::Deserialize;

use crate::{Cleared, ListResponse, Owner, ServerError, server::ServerState};

#[derive(Debug, Deserialize)]
pub struct WalletNew {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WalletType,
    #[serde(default)]
    pub balance: Money,
}

#[derive(Debug, Deserialize)]
pub struct WalletName {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct WalletUpdate {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WalletType,
}

pub async fn create(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<WalletNew>,
) -> Result<(StatusCode, Json<Wallet>), ServerError> {
    let wallet = state
        .engine
        .create_wallet(&owner, &payload.name, payload.kind, payload.balance)
        .await?;
    Ok((StatusCode::CREATED, Json(wallet)))
}

pub async fn get(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<WalletName>,
) -> Result<Json<Wallet>, ServerError> {
    Ok(Json(state.engine.wallet(&owner, &payload.name).await?))
}

pub async fn update(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<WalletUpdate>,
) -> Result<Json<Wallet>, ServerError> {
    let wallet = state
        .engine
        .update_wallet(&owner, &payload.name, payload.kind)
        .await?;
    Ok(Json(wallet))
}

pub async fn delete(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<WalletName>,
) -> Result<Json<Wallet>, ServerError> {
    Ok(Json(state.engine.delete_wallet(&owner, &payload.name).await?))
}

pub async fn list(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<Json<ListResponse<Wallet>>, ServerError> {
    Ok(Json(state.engine.wallets(&owner).await?.into()))
}

pub async fn list_types(State(state): State<ServerState>) -> Json<ListResponse<WalletType>> {
    Json(state.engine.wallet_types().to_vec().into())
}

pub async fn init(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<(StatusCode, Json<ListResponse<Wallet>>), ServerError> {
    let wallets = state.engine.init_wallets(&owner).await?;
    Ok((StatusCode::CREATED, Json(wallets.into())))
}

pub async fn clear(State(state): State<ServerState>) -> Result<Json<Cleared>, ServerError> {
    let deleted = state.engine.clear_wallets().await?;
    Ok(Json(Cleared { deleted }))
}
