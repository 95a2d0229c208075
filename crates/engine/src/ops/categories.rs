use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, categories,
    util::{name_key, normalize_required_name},
};

use super::{Engine, with_tx};

const UNCATEGORIZED_NAME: &str = "Uncategorized";

impl Engine {
    /// Category id to store on a transaction or subscription.
    ///
    /// A supplied id must belong to `owner_id`. Without one, the owner's
    /// system "Uncategorized" category is returned, created on first use.
    pub(super) async fn resolve_category(
        &self,
        db_tx: &DatabaseTransaction,
        owner_id: &str,
        category_id: Option<Uuid>,
    ) -> ResultEngine<Uuid> {
        if let Some(category_id) = category_id {
            self.require_category_owned(db_tx, owner_id, category_id)
                .await?;
            return Ok(category_id);
        }
        self.uncategorized_category(db_tx, owner_id).await
    }

    async fn uncategorized_category(
        &self,
        db_tx: &DatabaseTransaction,
        owner_id: &str,
    ) -> ResultEngine<Uuid> {
        let norm = name_key(UNCATEGORIZED_NAME);
        if let Some(model) = categories::Entity::find()
            .filter(categories::Column::OwnerId.eq(owner_id.to_string()))
            .filter(categories::Column::NameNorm.eq(norm.clone()))
            .one(db_tx)
            .await?
        {
            return Ok(model.id);
        }

        let id = Uuid::new_v4();
        let active = categories::ActiveModel {
            id: ActiveValue::Set(id),
            owner_id: ActiveValue::Set(owner_id.to_string()),
            name: ActiveValue::Set(UNCATEGORIZED_NAME.to_string()),
            name_norm: ActiveValue::Set(norm),
            is_system: ActiveValue::Set(true),
        };
        active.insert(db_tx).await?;
        tracing::debug!(owner_id, %id, "created default category");

        Ok(id)
    }

    /// Creates a category. Names are unique per owner, ignoring case.
    pub async fn new_category(&self, owner_id: &str, name: &str) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        let norm = name_key(&name);
        with_tx!(self, |db_tx| {
            let exists = categories::Entity::find()
                .filter(categories::Column::OwnerId.eq(owner_id.to_string()))
                .filter(categories::Column::NameNorm.eq(norm.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::AlreadyExists(name.clone()));
            }

            let active = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                owner_id: ActiveValue::Set(owner_id.to_string()),
                name: ActiveValue::Set(name.clone()),
                name_norm: ActiveValue::Set(norm.clone()),
                is_system: ActiveValue::Set(false),
            };
            let model = active.insert(&db_tx).await?;
            Ok(Category::from(model))
        })
    }

    /// Lists the owner's categories by name.
    pub async fn categories(&self, owner_id: &str) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let models = categories::Entity::find()
                .filter(categories::Column::OwnerId.eq(owner_id.to_string()))
                .order_by_asc(categories::Column::NameNorm)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Category::from).collect())
        })
    }
}
