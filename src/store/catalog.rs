use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::escape_like;
use crate::entity::{
    merchants::{Column as MerchantCol, Entity as Merchants},
    products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
};
use crate::ingest::NewProduct;

/// Feed filters applied on top of the tenant scope.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub q: Option<String>,
}

/// Product access bound to a single merchant.
pub struct TenantCatalog<'a, C: ConnectionTrait> {
    conn: &'a C,
    merchant_id: Uuid,
}

impl<'a, C: ConnectionTrait> TenantCatalog<'a, C> {
    pub fn new(conn: &'a C, merchant_id: Uuid) -> Self {
        Self { conn, merchant_id }
    }

    fn scope(&self) -> Condition {
        Condition::all().add(Column::MerchantId.eq(self.merchant_id))
    }

    /// Hard-delete every product of this merchant.
    pub async fn delete_all(&self) -> Result<u64, DbErr> {
        let result = Products::delete_many()
            .filter(self.scope())
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Insert one batch in a single statement.
    pub async fn insert_batch(&self, products: &[NewProduct]) -> Result<u64, DbErr> {
        if products.is_empty() {
            return Ok(0);
        }
        let models = products.iter().map(|p| ActiveModel {
            id: Set(Uuid::new_v4()),
            merchant_id: Set(self.merchant_id),
            name: Set(p.name.clone()),
            description: Set(p.description.clone()),
            price: Set(p.price),
            currency: Set(p.currency.clone()),
            url: Set(p.url.clone()),
            image_url: Set(p.image_url.clone()),
            sku: Set(p.sku.clone()),
            category: Set(p.category.clone()),
            brand: Set(p.brand.clone()),
            active: Set(true),
            created_at: NotSet,
        });
        Products::insert_many(models)
            .exec_without_returning(self.conn)
            .await
    }

    pub async fn count_active(&self) -> Result<u64, DbErr> {
        Products::find()
            .filter(self.scope().add(Column::Active.eq(true)))
            .count(self.conn)
            .await
    }

    /// Recount active products and store the result on the merchant row.
    pub async fn refresh_product_count(&self) -> Result<i32, DbErr> {
        let count = i32::try_from(self.count_active().await?).unwrap_or(i32::MAX);
        Merchants::update_many()
            .col_expr(MerchantCol::ProductCount, Expr::value(count))
            .col_expr(MerchantCol::UpdatedAt, Expr::value(Utc::now()))
            .filter(MerchantCol::Id.eq(self.merchant_id))
            .exec(self.conn)
            .await?;
        Ok(count)
    }

    /// Every product of the merchant, active or not, newest first.
    pub async fn list_all(&self, limit: u64, offset: u64) -> Result<(Vec<ProductModel>, u64), DbErr> {
        let finder = Products::find()
            .filter(self.scope())
            .order_by_desc(Column::CreatedAt)
            .order_by_asc(Column::Id);
        let total = finder.clone().count(self.conn).await?;
        if offset >= total {
            return Ok((Vec::new(), total));
        }
        let items = finder.limit(limit).offset(offset).all(self.conn).await?;
        Ok((items, total))
    }

    /// Active products matching `filter`, in catalog order.
    pub async fn search(
        &self,
        filter: &ProductFilter,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<ProductModel>, u64), DbErr> {
        let mut condition = self.scope().add(Column::Active.eq(true));

        if let Some(category) = filter.category.as_ref().filter(|c| !c.is_empty()) {
            condition = condition.add(Column::Category.eq(category.clone()));
        }

        if let Some(search) = filter.q.as_ref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(search));
            condition = condition.add(
                Condition::any()
                    .add(Expr::col(Column::Name).ilike(pattern.clone()))
                    .add(Expr::col(Column::Description).ilike(pattern)),
            );
        }

        let finder = Products::find()
            .filter(condition)
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id);

        let total = finder.clone().count(self.conn).await?;
        if offset >= total {
            return Ok((Vec::new(), total));
        }
        let items = finder.limit(limit).offset(offset).all(self.conn).await?;
        Ok((items, total))
    }
}
