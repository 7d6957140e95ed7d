//! Category registry per owner.

use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, QueryOrder, Select,
    entity::{ActiveValue, prelude::*},
};
use serde::{Deserialize, Serialize};

use crate::{Record, ResultEngine};

/// A named tag grouping transactions. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(owner: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            name,
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(value: &Category) -> Self {
        Self {
            name: ActiveValue::Set(value.name.clone()),
            user_id: ActiveValue::Set(value.owner.clone()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            name: model.name,
            owner: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

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

impl Record for Category {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    type Filter = Filter;

    const NAME: &'static str = "category";

    fn to_active_model(&self) -> ActiveModel {
        self.into()
    }

    fn from_model(model: Model) -> ResultEngine<Self> {
        Ok(model.into())
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

/// Names created by `init_categories`.
pub(crate) const DEFAULT_CATEGORIES: [&str; 8] = [
    "Food",
    "Transport",
    "Shopping",
    "Bills",
    "Entertainment",
    "Health",
    "Salary",
    "Other",
];
