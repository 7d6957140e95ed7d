use std::collections::HashMap;

use chrono::Utc;

use crate::{
    AffectedWallet, EngineError, Leg, Mapper, NewTransaction, PostedTransaction, ResultEngine,
    Transaction, TransactionKind, TransactionQuery, WalletRole, affected_wallets, transactions,
    util::resolve_occurred_at, wallets,
};

use super::Engine;

/// Compute the wallets touched by a transaction of `kind`.
///
/// Names not needed by `kind` are ignored. Runs before any store access.
pub(crate) fn plan_legs(
    kind: TransactionKind,
    from: Option<&str>,
    to: Option<&str>,
) -> ResultEngine<Vec<Leg>> {
    fn required(name: Option<&str>, label: &str) -> ResultEngine<String> {
        name.map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| EngineError::Validation(format!("{label} wallet is required")))
    }

    match kind {
        TransactionKind::Expense => Ok(vec![Leg::new(
            required(from, "source")?,
            WalletRole::SrcWallet,
        )]),
        TransactionKind::Income => Ok(vec![Leg::new(
            required(to, "destination")?,
            WalletRole::DstWallet,
        )]),
        TransactionKind::Transfer => {
            let from = required(from, "source")?;
            let to = required(to, "destination")?;
            if from == to {
                return Err(EngineError::Validation(
                    "source and destination wallets must differ".to_string(),
                ));
            }
            Ok(vec![
                Leg::new(from, WalletRole::SrcWallet),
                Leg::new(to, WalletRole::DstWallet),
            ])
        }
    }
}

impl Engine {
    /// Post one expense, income or transfer.
    ///
    /// The transaction row, its affected-wallet rows and the balance change
    /// of every touched wallet are written in one atomic unit: either all of
    /// them are stored or none is. Each balance moves with a single relative
    /// update.
    ///
    /// Posting the same request twice records two transactions.
    pub async fn create_transaction(&self, cmd: NewTransaction) -> ResultEngine<PostedTransaction> {
        if cmd.amount.is_negative() {
            return Err(EngineError::Validation(
                "amount must be >= 0".to_string(),
            ));
        }
        cmd.amount.within_limit()?;
        let legs = plan_legs(cmd.kind, cmd.from.as_deref(), cmd.to.as_deref())?;
        let category = cmd.category.trim().to_string();
        if category.is_empty() {
            return Err(EngineError::Validation(
                "category must not be empty".to_string(),
            ));
        }

        let occurred_at = resolve_occurred_at(cmd.occurred_at, Utc::now());
        let owner = cmd.owner;
        let draft = Transaction::new(
            owner.clone(),
            cmd.kind,
            cmd.amount,
            category,
            cmd.description,
            occurred_at,
        );

        let posted = self
            .store
            .atomic(move |db_tx| {
                Box::pin(async move {
                    let created = Mapper::<Transaction, _>::new(db_tx)
                        .insert(&draft)
                        .await?;
                    let transaction_id = created.id.ok_or_else(|| {
                        EngineError::NotFound("generated transaction id".to_string())
                    })?;

                    let links = Mapper::<AffectedWallet, _>::new(db_tx);
                    let mut affected = Vec::with_capacity(legs.len());
                    for leg in &legs {
                        let link = AffectedWallet::new(
                            transaction_id,
                            leg.wallet.clone(),
                            leg.role,
                            owner.clone(),
                        );
                        affected.push(links.insert(&link).await?);
                    }

                    let mut touched = Vec::with_capacity(legs.len());
                    for leg in &legs {
                        let wallet = wallets::adjust_balance(
                            db_tx,
                            &owner,
                            &leg.wallet,
                            leg.delta(draft.amount),
                        )
                        .await?;
                        touched.push(wallet);
                    }

                    Ok(PostedTransaction {
                        transaction: created.with_wallets(&affected),
                        wallets: touched,
                    })
                })
            })
            .await?;

        tracing::info!(
            "{} {} posted for {} ({})",
            posted.transaction.kind.as_str(),
            posted.transaction.id.unwrap_or_default(),
            posted.transaction.owner,
            posted.transaction.amount
        );
        Ok(posted)
    }

    /// Return one transaction with its source/destination wallets.
    pub async fn transaction(&self, owner: &str, id: i32) -> ResultEngine<Transaction> {
        let conn = self.store.connection();
        let transaction = Mapper::<Transaction, _>::new(conn)
            .one(&transactions::Filter::id(owner, id))
            .await?;
        let affected = Mapper::<AffectedWallet, _>::new(conn)
            .many(&affected_wallets::Filter::transaction(owner, id))
            .await?;
        Ok(transaction.with_wallets(&affected))
    }

    /// List the transactions of an owner, newest first.
    ///
    /// The occurrence range is `[from, until)`.
    pub async fn transactions(&self, query: TransactionQuery) -> ResultEngine<Vec<Transaction>> {
        if let (Some(from), Some(until)) = (query.from, query.until) {
            if from >= until {
                return Err(EngineError::Validation(
                    "invalid range: from must be < until".to_string(),
                ));
            }
        }

        let conn = self.store.connection();
        let links = Mapper::<AffectedWallet, _>::new(conn);

        let ids = match query.wallet.as_deref() {
            Some(wallet) => Some(
                links
                    .many(&affected_wallets::Filter::wallet(&query.owner, wallet.trim()))
                    .await?
                    .into_iter()
                    .map(|link| link.transaction_id)
                    .collect(),
            ),
            None => None,
        };

        let filter = transactions::Filter {
            owner: query.owner.clone(),
            id: None,
            ids,
            kind: query.kind,
            from: query.from,
            until: query.until,
        };
        let found = Mapper::<Transaction, _>::new(conn).many(&filter).await?;

        let found_ids: Vec<i32> = found.iter().filter_map(|transaction| transaction.id).collect();
        let mut by_transaction: HashMap<i32, Vec<AffectedWallet>> = HashMap::new();
        let found_links = if found_ids.is_empty() {
            Vec::new()
        } else {
            links
                .many(&affected_wallets::Filter::transactions(&query.owner, found_ids))
                .await?
        };
        for link in found_links {
            by_transaction
                .entry(link.transaction_id)
                .or_default()
                .push(link);
        }

        Ok(found
            .into_iter()
            .map(|transaction| {
                let affected = transaction
                    .id
                    .and_then(|id| by_transaction.get(&id))
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                transaction.with_wallets(affected)
            })
            .collect())
    }

    /// Hard-delete a transaction and reverse its balance effects.
    ///
    /// Every affected-wallet row is removed and its wallet moved back by the
    /// opposite delta, then the transaction row is removed, all in one atomic
    /// unit.
    pub async fn delete_transaction(&self, owner: &str, id: i32) -> ResultEngine<Transaction> {
        let owner = owner.to_string();
        let deleted = self
            .store
            .atomic(move |db_tx| {
                Box::pin(async move {
                    let records = Mapper::<Transaction, _>::new(db_tx);
                    let filter = transactions::Filter::id(&owner, id);
                    let transaction = records.one(&filter).await?;

                    let links = Mapper::<AffectedWallet, _>::new(db_tx);
                    let affected = links
                        .many(&affected_wallets::Filter::transaction(&owner, id))
                        .await?;
                    for link in &affected {
                        let reverse = -link.leg().delta(transaction.amount);
                        wallets::adjust_balance(db_tx, &owner, &link.wallet, reverse).await?;
                        links.delete(&affected_wallets::Filter::exact(link)).await?;
                    }

                    records.delete(&filter).await?;
                    Ok(transaction.with_wallets(&affected))
                })
            })
            .await?;

        tracing::info!("transaction {id} deleted for {}", deleted.owner);
        Ok(deleted)
    }

    /// Remove every transaction and affected-wallet row. Balances are left as
    /// they are. Non-production only.
    pub async fn clear_transactions(&self) -> ResultEngine<u64> {
        self.store
            .atomic(|db_tx| {
                Box::pin(async move {
                    Mapper::<AffectedWallet, _>::new(db_tx).clear().await?;
                    Mapper::<Transaction, _>::new(db_tx).clear().await
                })
            })
            .await
    }

    pub fn transaction_types(&self) -> &'static [TransactionKind] {
        &TransactionKind::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expense_uses_only_the_source_wallet() {
        let legs = plan_legs(TransactionKind::Expense, Some("Cash"), Some("Ignored")).unwrap();
        assert_eq!(legs, vec![Leg::new("Cash".to_string(), WalletRole::SrcWallet)]);
    }

    #[test]
    fn income_uses_only_the_destination_wallet() {
        let legs = plan_legs(TransactionKind::Income, None, Some(" Bank ")).unwrap();
        assert_eq!(legs, vec![Leg::new("Bank".to_string(), WalletRole::DstWallet)]);
    }

    #[test]
    fn transfer_debits_source_then_credits_destination() {
        let legs = plan_legs(TransactionKind::Transfer, Some("Checking"), Some("Savings")).unwrap();
        assert_eq!(
            legs,
            vec![
                Leg::new("Checking".to_string(), WalletRole::SrcWallet),
                Leg::new("Savings".to_string(), WalletRole::DstWallet),
            ]
        );
    }

    #[test]
    fn missing_or_identical_wallets_are_rejected() {
        assert!(matches!(
            plan_legs(TransactionKind::Expense, None, Some("Bank")),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            plan_legs(TransactionKind::Income, Some("Bank"), Some("  ")),
            Err(EngineError::Validation(_))
        ));
        assert_eq!(
            plan_legs(TransactionKind::Transfer, Some("Cash"), Some("Cash")),
            Err(EngineError::Validation(
                "source and destination wallets must differ".to_string()
            ))
        );
    }
}
