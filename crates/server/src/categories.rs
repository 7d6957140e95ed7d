//! Categories API endpoints.

use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::Category;
use serde::Deserialize;

use crate::{Cleared, ListResponse, Owner, ServerError, server::ServerState};

#[derive(Debug, Deserialize)]
pub struct CategoryName {
    pub name: String,
}

pub async fn create(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryName>,
) -> Result<(StatusCode, Json<Category>), ServerError> {
    let category = state.engine.create_category(&owner, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryName>,
) -> Result<Json<Category>, ServerError> {
    Ok(Json(state.engine.category(&owner, &payload.name).await?))
}

pub async fn delete(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryName>,
) -> Result<Json<Category>, ServerError> {
    Ok(Json(
        state.engine.delete_category(&owner, &payload.name).await?,
    ))
}

pub async fn list(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<Json<ListResponse<Category>>, ServerError> {
    Ok(Json(state.engine.categories(&owner).await?.into()))
}

pub async fn init(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<(StatusCode, Json<ListResponse<Category>>), ServerError> {
    let categories = state.engine.init_categories(&owner).await?;
    Ok((StatusCode::CREATED, Json(categories.into())))
}

pub async fn clear(State(state): State<ServerState>) -> Result<Json<Cleared>, ServerError> {
    let deleted = state.engine.clear_categories().await?;
    Ok(Json(Cleared { deleted }))
}
