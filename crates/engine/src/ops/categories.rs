use crate::{
    Category, Mapper, ResultEngine,
    categories::{self, DEFAULT_CATEGORIES},
    util::normalize_required_name,
};

use super::Engine;

impl Engine {
    pub async fn create_category(&self, owner: &str, name: &str) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        let created = Mapper::<Category, _>::new(self.store.connection())
            .insert(&Category::new(owner.to_string(), name))
            .await?;
        tracing::info!("category {} created for {owner}", created.name);
        Ok(created)
    }

    pub async fn category(&self, owner: &str, name: &str) -> ResultEngine<Category> {
        Mapper::<Category, _>::new(self.store.connection())
            .one(&categories::Filter::named(owner, name.trim()))
            .await
    }

    pub async fn categories(&self, owner: &str) -> ResultEngine<Vec<Category>> {
        Mapper::<Category, _>::new(self.store.connection())
            .many(&categories::Filter::owner(owner))
            .await
    }

    /// Remove a category. Fails with a constraint violation while
    /// transactions still reference it.
    pub async fn delete_category(&self, owner: &str, name: &str) -> ResultEngine<Category> {
        Mapper::<Category, _>::new(self.store.connection())
            .delete(&categories::Filter::named(owner, name.trim()))
            .await
    }

    /// Create the default categories for `owner` in one atomic unit.
    pub async fn init_categories(&self, owner: &str) -> ResultEngine<Vec<Category>> {
        let owner = owner.to_string();
        self.store
            .atomic(move |db_tx| {
                Box::pin(async move {
                    let mapper = Mapper::<Category, _>::new(db_tx);
                    let mut created = Vec::with_capacity(DEFAULT_CATEGORIES.len());
                    for name in DEFAULT_CATEGORIES {
                        let category = Category::new(owner.clone(), name.to_string());
                        created.push(mapper.insert(&category).await?);
                    }
                    Ok(created)
                })
            })
            .await
    }

    pub async fn clear_categories(&self) -> ResultEngine<u64> {
        Mapper::<Category, _>::new(self.store.connection())
            .clear()
            .await
    }
}
