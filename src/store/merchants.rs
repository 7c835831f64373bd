use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::merchants::{ActiveModel, Column, Entity as Merchants, Model as MerchantModel};

#[derive(Debug, Clone)]
pub struct NewMerchant {
    pub email: String,
    pub slug: String,
    pub api_key: String,
    pub store_name: String,
    pub store_url: String,
}

pub struct MerchantStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> MerchantStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Exact match on the key, restricted to active merchants.
    pub async fn find_active_by_api_key(&self, api_key: &str) -> Result<Option<MerchantModel>, DbErr> {
        Merchants::find()
            .filter(Column::ApiKey.eq(api_key))
            .filter(Column::IsActive.eq(true))
            .one(self.conn)
            .await
    }

    pub async fn find_active_by_slug(&self, slug: &str) -> Result<Option<MerchantModel>, DbErr> {
        Merchants::find()
            .filter(Column::Slug.eq(slug))
            .filter(Column::IsActive.eq(true))
            .one(self.conn)
            .await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = Merchants::find()
            .filter(Column::Email.eq(email))
            .count(self.conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr> {
        let count = Merchants::find()
            .filter(Column::Slug.eq(slug))
            .count(self.conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn insert(&self, merchant: NewMerchant) -> Result<MerchantModel, DbErr> {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(merchant.email),
            slug: Set(merchant.slug),
            api_key: Set(merchant.api_key),
            store_name: Set(merchant.store_name),
            store_url: Set(merchant.store_url),
            product_count: Set(0),
            is_active: Set(true),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(self.conn)
        .await
    }

    /// Active merchants that have something to sell, by store name.
    pub async fn list_listed(&self) -> Result<Vec<MerchantModel>, DbErr> {
        Merchants::find()
            .filter(Column::IsActive.eq(true))
            .filter(Column::ProductCount.gt(0))
            .order_by_asc(Column::StoreName)
            .order_by_asc(Column::Slug)
            .all(self.conn)
            .await
    }

    /// Remove the merchant; products go with it through the FK cascade.
    pub async fn delete(&self, id: Uuid) -> Result<u64, DbErr> {
        let result = Merchants::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected)
    }
}
