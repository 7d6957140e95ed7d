//! Command structs for engine operations.
//!
//! These types group parameters for posting and listing transactions, keeping
//! call sites readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Money, Transaction, TransactionKind, Wallet};

/// Request to post one transaction.
///
/// Only the wallet names relevant for `kind` are used: `from` for expenses,
/// `to` for incomes, both for transfers.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub owner: String,
    pub amount: Money,
    pub kind: TransactionKind,
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: String,
    pub description: String,
    /// `None` (or the zero instant) means "now".
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NewTransaction {
    fn new(
        owner: impl Into<String>,
        kind: TransactionKind,
        amount: Money,
        category: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            amount,
            kind,
            from: None,
            to: None,
            category: category.into(),
            description: String::new(),
            occurred_at: None,
        }
    }

    #[must_use]
    pub fn expense(
        owner: impl Into<String>,
        amount: Money,
        from: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            from: Some(from.into()),
            ..Self::new(owner, TransactionKind::Expense, amount, category)
        }
    }

    #[must_use]
    pub fn income(
        owner: impl Into<String>,
        amount: Money,
        to: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            to: Some(to.into()),
            ..Self::new(owner, TransactionKind::Income, amount, category)
        }
    }

    #[must_use]
    pub fn transfer(
        owner: impl Into<String>,
        amount: Money,
        from: impl Into<String>,
        to: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
            ..Self::new(owner, TransactionKind::Transfer, amount, category)
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}

/// Result of a successful post: the stored transaction and the wallets as
/// they are after the balance change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PostedTransaction {
    pub transaction: Transaction,
    pub wallets: Vec<Wallet>,
}

/// Listing query for transactions of one owner.
#[derive(Clone, Debug, Default)]
pub struct TransactionQuery {
    pub owner: String,
    pub kind: Option<TransactionKind>,
    /// Only transactions that touched this wallet, in any role.
    pub wallet: Option<String>,
    /// Inclusive lower bound on `occurred_at`.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `occurred_at`.
    pub until: Option<DateTime<Utc>>,
}

impl TransactionQuery {
    #[must_use]
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn wallet(mut self, wallet: impl Into<String>) -> Self {
        self.wallet = Some(wallet.into());
        self
    }

    #[must_use]
    pub fn from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    #[must_use]
    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }
}
