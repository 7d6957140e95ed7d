//! Store handle and atomic units of work.
//!
//! A [`Store`] is opened once at process start, handed to the
//! [`Engine`](crate::Engine) and closed at shutdown. Every multi-statement
//! write goes through [`Store::atomic`].

use std::{future::Future, pin::Pin};

use sea_orm::{Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::{EngineError, ResultEngine};

/// Future returned by the body of an atomic unit. It may borrow the open
/// database transaction for its whole lifetime.
pub type UnitFuture<'c, T> = Pin<Box<dyn Future<Output = ResultEngine<T>> + Send + 'c>>;

#[derive(Clone, Debug, Default)]
pub struct Store {
    database: DatabaseConnection,
}

impl Store {
    /// Open a connection pool for `url` (e.g. `sqlite::memory:` or a
    /// `postgres://` URL).
    pub async fn connect(url: &str) -> ResultEngine<Self> {
        let database = Database::connect(url)
            .await
            .map_err(|err| EngineError::store("connecting to the store", err))?;
        Ok(Self { database })
    }

    /// Wrap an already opened connection.
    pub fn from_connection(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// The connection used for statements that run outside an atomic unit.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.database
    }

    pub async fn close(self) -> ResultEngine<()> {
        self.database
            .close()
            .await
            .map_err(|err| EngineError::store("closing the store", err))
    }

    /// Run `unit` inside one database transaction.
    ///
    /// Commits when the body returns `Ok`. When the body fails the
    /// transaction is rolled back and the body's error is returned unchanged.
    /// A failed commit consumes the transaction, which rolls it back on drop.
    ///
    /// ```rust,ignore
    /// store
    ///     .atomic(move |db_tx| {
    ///         Box::pin(async move {
    ///             Mapper::<Transaction, _>::new(db_tx).insert(&draft).await
    ///         })
    ///     })
    ///     .await?;
    /// ```
    pub async fn atomic<T, F>(&self, unit: F) -> ResultEngine<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> UnitFuture<'c, T> + Send,
    {
        let db_tx = self
            .database
            .begin()
            .await
            .map_err(|err| EngineError::store("beginning an atomic unit", err))?;

        let result = unit(&db_tx).await;
        match result {
            Ok(value) => {
                db_tx.commit().await.map_err(|err| {
                    tracing::error!("error committing an atomic unit: {err}");
                    EngineError::CommitFailure(err)
                })?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = db_tx.rollback().await {
                    tracing::error!("error rolling back an atomic unit: {rollback_err}");
                }
                Err(err)
            }
        }
    }
}
