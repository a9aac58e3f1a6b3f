// src/db/inventory_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProductStore, PRODUCTS_SKU_KEY},
    models::inventory::Product,
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sku_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some(PRODUCTS_SKU_KEY) {
            return AppError::SkuAlreadyExists;
        }
    }
    e.into()
}

#[async_trait]
impl ProductStore for InventoryRepository {
    async fn list(&self, organization_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE organization_id = $1 ORDER BY created_at DESC, seq DESC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn find(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn find_by_sku(
        &self,
        organization_id: Uuid,
        sku: &str,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE organization_id = $1 AND sku = $2",
        )
        .bind(organization_id)
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn insert(&self, product: &Product) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                id, organization_id, name, sku, description,
                quantity_on_hand, cost_price, selling_price, low_stock_threshold,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(product.organization_id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.description)
        .bind(product.quantity_on_hand)
        .bind(product.cost_price)
        .bind(product.selling_price)
        .bind(product.low_stock_threshold)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sku_violation)
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>, AppError> {
        // O filtro por organization_id impede alterar produto de outra organização
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = $3,
                sku = $4,
                description = $5,
                quantity_on_hand = $6,
                cost_price = $7,
                selling_price = $8,
                low_stock_threshold = $9,
                updated_at = $10
            WHERE id = $1 AND organization_id = $2
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(product.organization_id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.description)
        .bind(product.quantity_on_hand)
        .bind(product.cost_price)
        .bind(product.selling_price)
        .bind(product.low_stock_threshold)
        .bind(product.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sku_violation)
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND organization_id = $2")
            .bind(id)
            .bind(organization_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
