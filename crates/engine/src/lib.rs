//! Expense ledger engine.
//!
//! Posts expenses, incomes and transfers against per-owner wallets. Every
//! transaction is written together with its [`AffectedWallet`] rows and the
//! balance change of each wallet in one atomic unit of the [`Store`].

pub use affected_wallets::{AffectedWallet, Leg, WalletRole};
pub use categories::Category;
pub use commands::{NewTransaction, PostedTransaction, TransactionQuery};
pub use error::EngineError;
pub use mapper::{Mapper, Record};
pub use money::Money;
pub use ops::{Engine, EngineBuilder};
pub use store::{Store, UnitFuture};
pub use transactions::{Transaction, TransactionKind};
pub use wallets::{Wallet, WalletType};

pub mod affected_wallets;
pub mod categories;
pub mod transactions;
pub mod wallets;

mod commands;
mod error;
mod mapper;
mod money;
mod ops;
mod store;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
