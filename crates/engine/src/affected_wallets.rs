//! Links between a transaction and the wallets it moved.
//!
//! An [`AffectedWallet`] row states that a transaction touched a wallet and in
//! which [`WalletRole`]. A [`Leg`] is the in-memory pairing used while posting:
//! it produces both the row and the balance delta for that wallet.

use chrono::{DateTime, Utc};
use sea_orm::{
    Condition,
    entity::{ActiveValue, prelude::*},
};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, Record, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletRole {
    /// Money leaves the wallet.
    SrcWallet,
    /// Money enters the wallet.
    DstWallet,
}

impl WalletRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SrcWallet => "src_wallet",
            Self::DstWallet => "dst_wallet",
        }
    }
}

impl TryFrom<&str> for WalletRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "src_wallet" => Ok(Self::SrcWallet),
            "dst_wallet" => Ok(Self::DstWallet),
            other => Err(EngineError::Validation(format!(
                "invalid wallet role: {other}"
            ))),
        }
    }
}

/// One wallet touched by a transaction being posted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leg {
    pub wallet: String,
    pub role: WalletRole,
}

impl Leg {
    pub fn new(wallet: String, role: WalletRole) -> Self {
        Self { wallet, role }
    }

    /// Signed balance change this leg applies for a non-negative `amount`.
    pub fn delta(&self, amount: Money) -> Money {
        match self.role {
            WalletRole::SrcWallet => -amount,
            WalletRole::DstWallet => amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedWallet {
    pub transaction_id: i32,
    pub wallet: String,
    pub role: WalletRole,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AffectedWallet {
    pub fn new(transaction_id: i32, wallet: String, role: WalletRole, owner: String) -> Self {
        let now = Utc::now();
        Self {
            transaction_id,
            wallet,
            role,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn leg(&self) -> Leg {
        Leg::new(self.wallet.clone(), self.role)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "affected_wallet")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub transaction_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub wallet: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub role: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Transaction,
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "(Column::Wallet, Column::UserId)",
        to = "(super::wallets::Column::Name, super::wallets::Column::UserId)",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Wallet,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&AffectedWallet> for ActiveModel {
    fn from(value: &AffectedWallet) -> Self {
        Self {
            transaction_id: ActiveValue::Set(value.transaction_id),
            wallet: ActiveValue::Set(value.wallet.clone()),
            role: ActiveValue::Set(value.role.as_str().to_string()),
            user_id: ActiveValue::Set(value.owner.clone()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for AffectedWallet {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            role: WalletRole::try_from(model.role.as_str())?,
            transaction_id: model.transaction_id,
            wallet: model.wallet,
            owner: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct Filter {
    pub owner: String,
    pub transaction_id: Option<i32>,
    pub transaction_ids: Option<Vec<i32>>,
    pub wallet: Option<String>,
    pub role: Option<WalletRole>,
}

impl Filter {
    pub fn owner(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            ..Self::default()
        }
    }

    pub fn transaction(owner: &str, transaction_id: i32) -> Self {
        Self {
            transaction_id: Some(transaction_id),
            ..Self::owner(owner)
        }
    }

    /// Rows of any of `transaction_ids`.
    pub fn transactions(owner: &str, transaction_ids: Vec<i32>) -> Self {
        Self {
            transaction_ids: Some(transaction_ids),
            ..Self::owner(owner)
        }
    }

    pub fn wallet(owner: &str, wallet: &str) -> Self {
        Self {
            wallet: Some(wallet.to_string()),
            ..Self::owner(owner)
        }
    }

    /// Matches exactly the row of `link`.
    pub fn exact(link: &AffectedWallet) -> Self {
        Self {
            owner: link.owner.clone(),
            transaction_id: Some(link.transaction_id),
            transaction_ids: None,
            wallet: Some(link.wallet.clone()),
            role: Some(link.role),
        }
    }
}

impl Record for AffectedWallet {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    type Filter = Filter;

    const NAME: &'static str = "affected_wallet";

    fn to_active_model(&self) -> ActiveModel {
        self.into()
    }

    fn from_model(model: Model) -> ResultEngine<Self> {
        Self::try_from(model)
    }

    fn condition(filter: &Filter) -> Condition {
        Condition::all()
            .add(Column::UserId.eq(filter.owner.clone()))
            .add_option(filter.transaction_id.map(|id| Column::TransactionId.eq(id)))
            .add_option(
                filter
                    .transaction_ids
                    .clone()
                    .map(|ids| Column::TransactionId.is_in(ids)),
            )
            .add_option(filter.wallet.clone().map(|wallet| Column::Wallet.eq(wallet)))
            .add_option(filter.role.map(|role| Column::Role.eq(role.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_legs_debit_and_destination_legs_credit() {
        let amount = Money::new(30_00);
        let src = Leg::new("Checking".to_string(), WalletRole::SrcWallet);
        let dst = Leg::new("Savings".to_string(), WalletRole::DstWallet);

        assert_eq!(src.delta(amount), Money::new(-30_00));
        assert_eq!(dst.delta(amount), Money::new(30_00));
    }

    #[test]
    fn wallet_role_round_trips_through_storage_strings() {
        for role in [WalletRole::SrcWallet, WalletRole::DstWallet] {
            assert_eq!(WalletRole::try_from(role.as_str()).unwrap(), role);
        }
        assert!(WalletRole::try_from("SrcWallet").is_err());
    }
}
