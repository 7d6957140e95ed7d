use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use auth::{Owner, StaticTokens, TokenVerifier};
pub use server::{Mode, ServerState, router, run, run_with_listener, spawn_with_listener};

mod auth;
mod categories;
mod server;
mod transactions;
mod wallets;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

/// Body of every list endpoint.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub length: usize,
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            length: items.len(),
            items,
        }
    }
}

/// Body of the `clear` endpoints.
#[derive(Debug, Serialize)]
pub struct Cleared {
    pub deleted: u64,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ConstraintViolation { .. } => StatusCode::CONFLICT,
        EngineError::Connectivity { .. } | EngineError::CommitFailure(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Connectivity { .. } | EngineError::CommitFailure(_) => {
            tracing::error!("store error: {err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use engine::EngineError;
    use sea_orm::DbErr;

    use super::*;

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::NotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_constraint_violation_maps_to_409() {
        let res = ServerError::from(EngineError::ConstraintViolation {
            step: "inserting wallet".to_string(),
            source: DbErr::Custom("UNIQUE constraint failed".to_string()),
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn store_failures_map_to_500_without_details() {
        let connectivity = EngineError::Connectivity {
            step: "inserting transaction".to_string(),
            source: DbErr::Custom("connection refused".to_string()),
        };
        assert_eq!(
            message_for_engine_error(connectivity),
            "internal server error"
        );

        let res = ServerError::from(EngineError::CommitFailure(DbErr::Custom(
            "disk full".to_string(),
        )))
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn list_response_counts_items() {
        let list = ListResponse::from(vec!["a", "b"]);
        assert_eq!(list.length, 2);
    }
}
