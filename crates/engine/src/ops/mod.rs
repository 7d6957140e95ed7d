use sea_orm::DatabaseConnection;

use crate::{ResultEngine, Store};

mod categories;
mod transactions;
mod wallets;

/// Entry point of every ledger operation.
///
/// The engine holds no per-request state; it is shared behind an `Arc` by the
/// HTTP layer and every call runs against the injected [`Store`].
#[derive(Debug)]
pub struct Engine {
    store: Store,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    store: Store,
}

impl EngineBuilder {
    /// Pass the required store
    pub fn store(mut self, store: Store) -> EngineBuilder {
        self.store = store;
        self
    }

    /// Pass an already opened database connection
    pub fn database(self, db: DatabaseConnection) -> EngineBuilder {
        self.store(Store::from_connection(db))
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine { store: self.store })
    }
}
