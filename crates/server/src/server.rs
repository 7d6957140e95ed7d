use axum::{
    Router, middleware,
    routing::{get, post},
};
use serde::Deserialize;

use std::sync::Arc;

use crate::{
    auth::{self, TokenVerifier},
    categories, transactions, wallets,
};
use engine::Engine;

/// Deployment mode. Destructive `clear` routes are only mounted outside
/// production.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Production,
    #[default]
    Development,
    Test,
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub mode: Mode,
}

impl ServerState {
    pub fn new(engine: Engine, verifier: impl TokenVerifier, mode: Mode) -> Self {
        Self {
            engine: Arc::new(engine),
            verifier: Arc::new(verifier),
            mode,
        }
    }
}

async fn health() -> &'static str {
    "expense ledger is running"
}

pub fn router(state: ServerState) -> Router {
    let mut api = Router::new()
        .route("/wallet/create", post(wallets::create))
        .route("/wallet/get", post(wallets::get))
        .route("/wallet/update", post(wallets::update))
        .route("/wallet/delete", post(wallets::delete))
        .route("/wallet/list", post(wallets::list))
        .route("/wallet/listTypes", post(wallets::list_types))
        .route("/wallet/init", post(wallets::init))
        .route("/category/create", post(categories::create))
        .route("/category/get", post(categories::get))
        .route("/category/delete", post(categories::delete))
        .route("/category/list", post(categories::list))
        .route("/category/init", post(categories::init))
        .route("/transaction/createExpense", post(transactions::create_expense))
        .route("/transaction/createIncome", post(transactions::create_income))
        .route("/transaction/createTransfer", post(transactions::create_transfer))
        .route("/transaction/get", post(transactions::get))
        .route("/transaction/delete", post(transactions::delete))
        .route("/transaction/list", post(transactions::list))
        .route("/transaction/listTypes", post(transactions::list_types));

    if state.mode != Mode::Production {
        api = api
            .route("/wallet/clear", post(wallets::clear))
            .route("/category/clear", post(categories::clear))
            .route("/transaction/clear", post(transactions::clear));
    }

    api.route_layer(middleware::from_fn_with_state(state.clone(), auth::auth))
        .route("/", get(health))
        .with_state(state)
}

pub async fn run(state: ServerState, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {} ({:?} mode)", addr, state.mode);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
