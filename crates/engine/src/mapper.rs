//! Generic persistence mapper.
//!
//! Every stored entity implements [`Record`]: it names its `sea-orm` entity,
//! converts itself to and from the row representation and turns its filter
//! into a query condition. [`Mapper`] supplies the execute/collect mechanics
//! once for all of them.
//!
//! A mapper borrows any [`ConnectionTrait`], so the same calls run either
//! directly on the pool or inside an atomic unit opened by
//! [`Store::atomic`](crate::Store::atomic).

use std::marker::PhantomData;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, Condition, ConnectionTrait, EntityTrait,
    IntoActiveModel, QueryFilter, Select,
};

use crate::{EngineError, ResultEngine};

/// A domain entity with a canonical row representation.
pub trait Record: Sized + Send + Sync {
    type Entity: EntityTrait;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity>
        + ActiveModelBehavior
        + Send
        + 'static;
    type Filter: Send + Sync;

    /// Label used in log lines and error steps.
    const NAME: &'static str;

    fn to_active_model(&self) -> Self::ActiveModel;

    fn from_model(model: <Self::Entity as EntityTrait>::Model) -> ResultEngine<Self>;

    fn condition(filter: &Self::Filter) -> Condition;

    /// Ordering applied to `many`.
    fn order(select: Select<Self::Entity>) -> Select<Self::Entity> {
        select
    }
}

pub struct Mapper<'c, R, C> {
    conn: &'c C,
    record: PhantomData<fn() -> R>,
}

impl<'c, R, C> Mapper<'c, R, C>
where
    R: Record,
    C: ConnectionTrait,
    <R::Entity as EntityTrait>::Model: IntoActiveModel<R::ActiveModel>,
{
    pub fn new(conn: &'c C) -> Self {
        Self {
            conn,
            record: PhantomData,
        }
    }

    /// Insert `record` and return it as stored (generated id included).
    pub async fn insert(&self, record: &R) -> ResultEngine<R> {
        let model = record
            .to_active_model()
            .insert(self.conn)
            .await
            .map_err(|err| EngineError::store(format!("inserting {}", R::NAME), err))?;
        R::from_model(model)
    }

    /// Fetch the single row matching `filter`.
    pub async fn one(&self, filter: &R::Filter) -> ResultEngine<R> {
        let model = R::Entity::find()
            .filter(R::condition(filter))
            .one(self.conn)
            .await
            .map_err(|err| EngineError::store(format!("fetching {}", R::NAME), err))?
            .ok_or_else(|| EngineError::NotFound(R::NAME.to_string()))?;
        R::from_model(model)
    }

    pub async fn many(&self, filter: &R::Filter) -> ResultEngine<Vec<R>> {
        let models = R::order(R::Entity::find().filter(R::condition(filter)))
            .all(self.conn)
            .await
            .map_err(|err| EngineError::store(format!("selecting {}", R::NAME), err))?;
        models.into_iter().map(R::from_model).collect()
    }

    /// Overwrite the stored row that has the primary key of `record`.
    pub async fn update(&self, record: &R) -> ResultEngine<R> {
        let model = record
            .to_active_model()
            .update(self.conn)
            .await
            .map_err(|err| EngineError::store(format!("updating {}", R::NAME), err))?;
        R::from_model(model)
    }

    /// Delete the rows matching `filter` and return the first of them.
    pub async fn delete(&self, filter: &R::Filter) -> ResultEngine<R> {
        let found = self.one(filter).await?;
        R::Entity::delete_many()
            .filter(R::condition(filter))
            .exec(self.conn)
            .await
            .map_err(|err| EngineError::store(format!("deleting {}", R::NAME), err))?;
        Ok(found)
    }

    /// Delete every row of the entity and return how many were removed.
    ///
    /// Meant for non-production resets.
    pub async fn clear(&self) -> ResultEngine<u64> {
        let result = R::Entity::delete_many()
            .exec(self.conn)
            .await
            .map_err(|err| EngineError::store(format!("clearing {}", R::NAME), err))?;
        tracing::debug!("cleared {} {} rows", result.rows_affected, R::NAME);
        Ok(result.rows_affected)
    }
}
