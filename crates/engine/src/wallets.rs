//! The module contains `Wallet` struct and its implementation.

use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, ConnectionTrait, QueryOrder, Select,
    entity::{ActiveValue, prelude::*},
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Mapper, Money, Record, ResultEngine};

/// Kind of place where money are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletType {
    Cash,
    BankAccount,
    Credit,
}

impl WalletType {
    pub const ALL: [WalletType; 3] = [
        WalletType::Cash,
        WalletType::BankAccount,
        WalletType::Credit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WalletType::Cash => "cash",
            WalletType::BankAccount => "bank_account",
            WalletType::Credit => "credit",
        }
    }
}

impl TryFrom<&str> for WalletType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash" => Ok(WalletType::Cash),
            "bank_account" => Ok(WalletType::BankAccount),
            "credit" => Ok(WalletType::Credit),
            other => Err(EngineError::Validation(format!(
                "invalid wallet type: {other}"
            ))),
        }
    }
}

/// A wallet.
///
/// A wallet is a representation of a real wallet, a bank account or a credit
/// line. Its balance is only ever moved by posting or deleting transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WalletType,
    pub balance: Money,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(owner: String, name: String, kind: WalletType, balance: Money) -> Self {
        let now = Utc::now();
        Self {
            name,
            kind,
            balance,
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallet")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub balance_minor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::affected_wallets::Entity")]
    AffectedWallets,
}

impl Related<super::affected_wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AffectedWallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            name: ActiveValue::Set(value.name.clone()),
            user_id: ActiveValue::Set(value.owner.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            balance_minor: ActiveValue::Set(value.balance.cents()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: WalletType::try_from(model.kind.as_str())?,
            name: model.name,
            balance: Money::new(model.balance_minor),
            owner: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Selects the wallets of one owner, optionally a single one by name.
#[derive(Clone, Debug)]
pub struct Filter {
    pub owner: String,
    pub name: Option<String>,
}

impl Filter {
    pub fn owner(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: None,
        }
    }

    pub fn named(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: Some(name.to_string()),
        }
    }
}

impl Record for Wallet {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    type Filter = Filter;

    const NAME: &'static str = "wallet";

    fn to_active_model(&self) -> ActiveModel {
        self.into()
    }

    fn from_model(model: Model) -> ResultEngine<Self> {
        Self::try_from(model)
    }

    fn condition(filter: &Filter) -> Condition {
        Condition::all()
            .add(Column::UserId.eq(filter.owner.clone()))
            .add_option(filter.name.clone().map(|name| Column::Name.eq(name)))
    }

    fn order(select: Select<Entity>) -> Select<Entity> {
        select.order_by_asc(Column::Name)
    }
}

/// Move the balance of one wallet by `delta` with a single relative update
/// and return the wallet as stored afterwards.
///
/// The wallet is never read before the update, so concurrent writers
/// serialize on the row instead of overwriting each other.
pub(crate) async fn adjust_balance<C: ConnectionTrait>(
    conn: &C,
    owner: &str,
    name: &str,
    delta: Money,
) -> ResultEngine<Wallet> {
    let result = Entity::update_many()
        .col_expr(
            Column::BalanceMinor,
            Expr::col(Column::BalanceMinor).add(delta.cents()),
        )
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::UserId.eq(owner.to_string()))
        .filter(Column::Name.eq(name.to_string()))
        .exec(conn)
        .await
        .map_err(|err| EngineError::store(format!("updating balance of wallet {name}"), err))?;

    if result.rows_affected == 0 {
        return Err(EngineError::NotFound(format!("wallet {name}")));
    }

    Mapper::<Wallet, C>::new(conn)
        .one(&Filter::named(owner, name))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_type_round_trips_through_storage_strings() {
        for kind in WalletType::ALL {
            assert_eq!(WalletType::try_from(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_wallet_type_is_rejected() {
        assert_eq!(
            WalletType::try_from("piggy_bank"),
            Err(EngineError::Validation(
                "invalid wallet type: piggy_bank".to_string()
            ))
        );
    }

    #[test]
    fn active_model_keeps_minor_units() {
        let wallet = Wallet::new(
            "alice".to_string(),
            "Checking".to_string(),
            WalletType::BankAccount,
            Money::new(100_00),
        );
        let active: ActiveModel = (&wallet).into();

        assert_eq!(active.balance_minor, ActiveValue::Set(10_000));
        assert_eq!(
            active.kind,
            ActiveValue::Set("bank_account".to_string())
        );
        assert_eq!(active.user_id, ActiveValue::Set("alice".to_string()));
    }

    #[test]
    fn wallet_serializes_type_and_balance() {
        let wallet = Wallet::new(
            "alice".to_string(),
            "Cash".to_string(),
            WalletType::Cash,
            Money::new(70_00),
        );
        let json = serde_json::to_value(&wallet).unwrap();

        assert_eq!(json["type"], "cash");
        assert_eq!(json["balance"], "70.00");
    }
}
