//! Transaction primitives.
//!
//! A `Transaction` records one movement of money. It never stores a signed
//! amount: the direction comes from its kind and from the role of each
//! [`AffectedWallet`](crate::AffectedWallet) row linked to it.

use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, QueryOrder, Select,
    entity::{ActiveValue, prelude::*},
};
use serde::{Deserialize, Serialize};

use crate::{AffectedWallet, EngineError, Money, Record, ResultEngine, WalletRole};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 3] = [Self::Income, Self::Expense, Self::Transfer];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::Validation(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Generated by the store on insert; `None` only for drafts.
    pub id: Option<i32>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "date")]
    pub occurred_at: DateTime<Utc>,
    #[serde(rename = "src_wallet", default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(rename = "dst_wallet", default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Build a draft that has not been stored yet.
    pub fn new(
        owner: String,
        kind: TransactionKind,
        amount: Money,
        category: String,
        description: String,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            kind,
            amount,
            category,
            description,
            occurred_at,
            from: None,
            to: None,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fill `from` / `to` from the affected-wallet rows of this transaction.
    /// Rows that belong to other transactions are skipped.
    #[must_use]
    pub fn with_wallets(mut self, links: &[AffectedWallet]) -> Self {
        for link in links
            .iter()
            .filter(|link| Some(link.transaction_id) == self.id)
        {
            match link.role {
                WalletRole::SrcWallet => self.from = Some(link.wallet.clone()),
                WalletRole::DstWallet => self.to = Some(link.wallet.clone()),
            }
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transaction")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub amount_minor: i64,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub category: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "(Column::Category, Column::UserId)",
        to = "(super::categories::Column::Name, super::categories::Column::UserId)",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
    #[sea_orm(has_many = "super::affected_wallets::Entity")]
    AffectedWallets,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::affected_wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AffectedWallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: match tx.id {
                Some(id) => ActiveValue::Set(id),
                None => ActiveValue::NotSet,
            },
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            category: ActiveValue::Set(tx.category.clone()),
            description: ActiveValue::Set(tx.description.clone()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
            user_id: ActiveValue::Set(tx.owner.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Some(model.id),
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: Money::new(model.amount_minor),
            category: model.category,
            description: model.description,
            occurred_at: model.occurred_at,
            from: None,
            to: None,
            owner: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Selects transactions of one owner.
///
/// `ids` restricts the result to a precomputed set (e.g. the transactions that
/// touched a wallet). `from` is inclusive and `until` exclusive.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    pub owner: String,
    pub id: Option<i32>,
    pub ids: Option<Vec<i32>>,
    pub kind: Option<TransactionKind>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl Filter {
    pub fn owner(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            ..Self::default()
        }
    }

    pub fn id(owner: &str, id: i32) -> Self {
        Self {
            id: Some(id),
            ..Self::owner(owner)
        }
    }
}

impl Record for Transaction {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    type Filter = Filter;

    const NAME: &'static str = "transaction";

    fn to_active_model(&self) -> ActiveModel {
        self.into()
    }

    fn from_model(model: Model) -> ResultEngine<Self> {
        Self::try_from(model)
    }

    fn condition(filter: &Filter) -> Condition {
        Condition::all()
            .add(Column::UserId.eq(filter.owner.clone()))
            .add_option(filter.id.map(|id| Column::Id.eq(id)))
            .add_option(filter.ids.clone().map(|ids| Column::Id.is_in(ids)))
            .add_option(filter.kind.map(|kind| Column::Kind.eq(kind.as_str())))
            .add_option(filter.from.map(|from| Column::OccurredAt.gte(from)))
            .add_option(filter.until.map(|until| Column::OccurredAt.lt(until)))
    }

    fn order(select: Select<Entity>) -> Select<Entity> {
        select
            .order_by_desc(Column::OccurredAt)
            .order_by_desc(Column::Id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn stored(id: i32) -> Transaction {
        Transaction {
            id: Some(id),
            ..Transaction::new(
                "alice".to_string(),
                TransactionKind::Transfer,
                Money::new(50_00),
                "Other".to_string(),
                String::new(),
                Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            )
        }
    }

    #[test]
    fn transaction_kind_round_trips_through_storage_strings() {
        for kind in TransactionKind::ALL {
            assert_eq!(TransactionKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(TransactionKind::try_from("refund").is_err());
    }

    #[test]
    fn draft_leaves_id_to_the_store() {
        let mut tx = stored(1);
        tx.id = None;
        let active: ActiveModel = (&tx).into();
        assert_eq!(active.id, ActiveValue::NotSet);
        assert_eq!(active.amount_minor, ActiveValue::Set(5_000));
    }

    #[test]
    fn with_wallets_fills_both_ends_of_a_transfer() {
        let links = vec![
            AffectedWallet::new(7, "Checking".to_string(), WalletRole::SrcWallet, "alice".to_string()),
            AffectedWallet::new(7, "Savings".to_string(), WalletRole::DstWallet, "alice".to_string()),
            AffectedWallet::new(8, "Cash".to_string(), WalletRole::SrcWallet, "alice".to_string()),
        ];

        let tx = stored(7).with_wallets(&links);

        assert_eq!(tx.from.as_deref(), Some("Checking"));
        assert_eq!(tx.to.as_deref(), Some("Savings"));
    }

    #[test]
    fn wire_names_match_the_http_payloads() {
        let tx = stored(3).with_wallets(&[AffectedWallet::new(
            3,
            "Cash".to_string(),
            WalletRole::SrcWallet,
            "alice".to_string(),
        )]);
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["type"], "transfer");
        assert_eq!(json["amount"], "50.00");
        assert_eq!(json["src_wallet"], "Cash");
        assert!(json.get("dst_wallet").is_none());
        assert_eq!(json["date"], "2024-05-01T12:00:00Z");
    }
}
