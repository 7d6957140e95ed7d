use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue};

use crate::{
    EngineError, Mapper, Money, ResultEngine, Wallet, WalletType, util::normalize_required_name,
    wallets,
};

use super::Engine;

/// Wallets created by `init_wallets`, all with a zero balance.
const DEFAULT_WALLETS: [(&str, WalletType); 3] = [
    ("Cash", WalletType::Cash),
    ("Bank", WalletType::BankAccount),
    ("Credit Card", WalletType::Credit),
];

impl Engine {
    /// Add a new wallet with an opening `balance`.
    ///
    /// A second wallet with the same name for the same owner is rejected by
    /// the store as a constraint violation.
    pub async fn create_wallet(
        &self,
        owner: &str,
        name: &str,
        kind: WalletType,
        balance: Money,
    ) -> ResultEngine<Wallet> {
        let name = normalize_required_name(name, "wallet")?;
        balance.within_limit()?;
        let wallet = Wallet::new(owner.to_string(), name, kind, balance);
        let created = Mapper::<Wallet, _>::new(self.store.connection())
            .insert(&wallet)
            .await?;
        tracing::info!("wallet {} created for {owner}", created.name);
        Ok(created)
    }

    /// Return a wallet snapshot from DB.
    pub async fn wallet(&self, owner: &str, name: &str) -> ResultEngine<Wallet> {
        Mapper::<Wallet, _>::new(self.store.connection())
            .one(&wallets::Filter::named(owner, name.trim()))
            .await
    }

    /// All wallets of `owner`, ordered by name.
    pub async fn wallets(&self, owner: &str) -> ResultEngine<Vec<Wallet>> {
        Mapper::<Wallet, _>::new(self.store.connection())
            .many(&wallets::Filter::owner(owner))
            .await
    }

    /// Change the type of a wallet. The balance is left untouched.
    pub async fn update_wallet(
        &self,
        owner: &str,
        name: &str,
        kind: WalletType,
    ) -> ResultEngine<Wallet> {
        let owner = owner.to_string();
        let name = name.trim().to_string();
        self.store
            .atomic(move |db_tx| {
                Box::pin(async move {
                    let mapper = Mapper::<Wallet, _>::new(db_tx);
                    let filter = wallets::Filter::named(&owner, &name);
                    mapper.one(&filter).await?;

                    // balance_minor stays NotSet
                    let active = wallets::ActiveModel {
                        name: ActiveValue::Set(name.clone()),
                        user_id: ActiveValue::Set(owner.clone()),
                        kind: ActiveValue::Set(kind.as_str().to_string()),
                        updated_at: ActiveValue::Set(Utc::now()),
                        ..Default::default()
                    };
                    active
                        .update(db_tx)
                        .await
                        .map_err(|err| EngineError::store(format!("updating wallet {name}"), err))?;

                    mapper.one(&filter).await
                })
            })
            .await
    }

    /// Remove a wallet. Fails with a constraint violation while transactions
    /// still reference it.
    pub async fn delete_wallet(&self, owner: &str, name: &str) -> ResultEngine<Wallet> {
        let deleted = Mapper::<Wallet, _>::new(self.store.connection())
            .delete(&wallets::Filter::named(owner, name.trim()))
            .await?;
        tracing::info!("wallet {} deleted for {owner}", deleted.name);
        Ok(deleted)
    }

    /// Create the default wallet set for `owner` in one atomic unit.
    pub async fn init_wallets(&self, owner: &str) -> ResultEngine<Vec<Wallet>> {
        let owner = owner.to_string();
        self.store
            .atomic(move |db_tx| {
                Box::pin(async move {
                    let mapper = Mapper::<Wallet, _>::new(db_tx);
                    let mut created = Vec::with_capacity(DEFAULT_WALLETS.len());
                    for (name, kind) in DEFAULT_WALLETS {
                        let wallet = Wallet::new(owner.clone(), name.to_string(), kind, Money::ZERO);
                        created.push(mapper.insert(&wallet).await?);
                    }
                    Ok(created)
                })
            })
            .await
    }

    /// Delete every wallet of every owner. Non-production only.
    pub async fn clear_wallets(&self) -> ResultEngine<u64> {
        Mapper::<Wallet, _>::new(self.store.connection())
            .clear()
            .await
    }

    pub fn wallet_types(&self) -> &'static [WalletType] {
        &WalletType::ALL
    }
}
