// src/services/inventory_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProductStore,
    models::inventory::{CreateProductPayload, Product, UpdateProductPayload},
};

#[derive(Clone)]
pub struct InventoryService {
    products: Arc<dyn ProductStore>,
}

impl InventoryService {
    pub fn new(products: Arc<dyn ProductStore>) -> Self {
        Self { products }
    }

    pub async fn list_products(&self, organization_id: Uuid) -> Result<Vec<Product>, AppError> {
        self.products.list(organization_id).await
    }

    pub async fn get_product(
        &self,
        organization_id: Uuid,
        product_id: Uuid,
    ) -> Result<Product, AppError> {
        self.products
            .find(organization_id, product_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create_product(
        &self,
        organization_id: Uuid,
        payload: CreateProductPayload,
    ) -> Result<Product, AppError> {
        payload.validate_payload()?;

        if self
            .products
            .find_by_sku(organization_id, &payload.sku)
            .await?
            .is_some()
        {
            return Err(AppError::SkuAlreadyExists);
        }

        // Corrida entre dois creates com o mesmo SKU: a constraint única decide
        let product = self
            .products
            .insert(&payload.into_product(organization_id))
            .await?;

        tracing::info!(
            organization_id = %organization_id,
            product_id = %product.id,
            sku = %product.sku,
            "Produto criado"
        );
        Ok(product)
    }

    pub async fn update_product(
        &self,
        organization_id: Uuid,
        product_id: Uuid,
        payload: UpdateProductPayload,
    ) -> Result<Product, AppError> {
        payload.validate_payload()?;

        let mut product = self.get_product(organization_id, product_id).await?;

        // Só re-checa o SKU se ele veio no payload; o próprio produto não conta como conflito
        if let Some(sku) = payload.sku.as_deref() {
            let existing = self.products.find_by_sku(organization_id, sku).await?;
            if existing.is_some_and(|other| other.id != product_id) {
                return Err(AppError::SkuAlreadyExists);
            }
        }

        payload.apply_to(&mut product);

        let updated = self
            .products
            .update(&product)
            .await?
            .ok_or(AppError::NotFound)?; // removido entre a leitura e a escrita

        tracing::debug!(organization_id = %organization_id, product_id = %product_id, "Produto atualizado");
        Ok(updated)
    }

    pub async fn delete_product(
        &self,
        organization_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), AppError> {
        if !self.products.delete(organization_id, product_id).await? {
            return Err(AppError::NotFound);
        }

        tracing::info!(organization_id = %organization_id, product_id = %product_id, "Produto removido");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn service() -> InventoryService {
        InventoryService::new(Arc::new(MemoryStore::new()))
    }

    fn payload(sku: &str, quantity: i32) -> CreateProductPayload {
        CreateProductPayload {
            name: "Widget".into(),
            sku: sku.into(),
            description: None,
            quantity_on_hand: quantity,
            cost_price: None,
            selling_price: None,
            low_stock_threshold: None,
        }
    }

    #[tokio::test]
    async fn foreign_product_id_is_not_found_and_never_mutated() {
        let inventory = service();
        let org_a = Uuid::new_v4();
        let org_b = Uuid::new_v4();
        let product = inventory
            .create_product(org_a, payload("W-1", 3))
            .await
            .unwrap();

        assert!(matches!(
            inventory.get_product(org_b, product.id).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            inventory
                .update_product(
                    org_b,
                    product.id,
                    UpdateProductPayload {
                        quantity_on_hand: Some(99),
                        ..Default::default()
                    }
                )
                .await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            inventory.delete_product(org_b, product.id).await,
            Err(AppError::NotFound)
        ));
        assert!(inventory.list_products(org_b).await.unwrap().is_empty());

        let untouched = inventory.get_product(org_a, product.id).await.unwrap();
        assert_eq!(untouched, product);
    }

    #[tokio::test]
    async fn sku_is_unique_per_organization_only() {
        let inventory = service();
        let org_a = Uuid::new_v4();
        let org_b = Uuid::new_v4();

        inventory.create_product(org_a, payload("W-1", 1)).await.unwrap();
        let duplicate = inventory.create_product(org_a, payload("W-1", 2)).await;
        assert!(matches!(duplicate, Err(AppError::SkuAlreadyExists)));

        assert!(inventory.create_product(org_b, payload("W-1", 2)).await.is_ok());
        assert_eq!(inventory.list_products(org_a).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_rechecks_sku_excluding_itself() {
        let inventory = service();
        let org = Uuid::new_v4();
        let first = inventory.create_product(org, payload("W-1", 1)).await.unwrap();
        let second = inventory.create_product(org, payload("W-2", 1)).await.unwrap();

        let conflict = inventory
            .update_product(
                org,
                second.id,
                UpdateProductPayload {
                    sku: Some("W-1".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(conflict, Err(AppError::SkuAlreadyExists)));

        let same_sku = inventory
            .update_product(
                org,
                first.id,
                UpdateProductPayload {
                    sku: Some("W-1".into()),
                    name: Some("Widget Pro".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(same_sku.name, "Widget Pro");
        assert_eq!(same_sku.sku, "W-1");
    }

    #[tokio::test]
    async fn empty_update_only_touches_updated_at() {
        let inventory = service();
        let org = Uuid::new_v4();
        let product = inventory.create_product(org, payload("W-1", 3)).await.unwrap();

        let updated = inventory
            .update_product(org, product.id, UpdateProductPayload::default())
            .await
            .unwrap();

        assert!(updated.updated_at >= product.updated_at);
        assert_eq!(
            Product {
                updated_at: product.updated_at,
                ..updated
            },
            product
        );
    }

    #[tokio::test]
    async fn update_rejects_invalid_fields() {
        let inventory = service();
        let org = Uuid::new_v4();
        let product = inventory.create_product(org, payload("W-1", 3)).await.unwrap();

        let result = inventory
            .update_product(
                org,
                product.id,
                UpdateProductPayload {
                    quantity_on_hand: Some(-5),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(
            inventory.get_product(org, product.id).await.unwrap().quantity_on_hand,
            3
        );
    }

    #[tokio::test]
    async fn deleted_product_is_not_found() {
        let inventory = service();
        let org = Uuid::new_v4();
        let product = inventory.create_product(org, payload("W-1", 3)).await.unwrap();

        inventory.delete_product(org, product.id).await.unwrap();

        assert!(matches!(
            inventory.get_product(org, product.id).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            inventory.delete_product(org, product.id).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn missing_id_is_not_found() {
        let inventory = service();
        let org = Uuid::new_v4();

        assert!(matches!(
            inventory.get_product(org, Uuid::new_v4()).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            inventory.delete_product(org, Uuid::new_v4()).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let inventory = service();
        let org = Uuid::new_v4();
        for sku in ["A", "B", "C"] {
            inventory.create_product(org, payload(sku, 1)).await.unwrap();
        }

        let skus: Vec<String> = inventory
            .list_products(org)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.sku)
            .collect();
        assert_eq!(skus, ["C", "B", "A"]);
    }
}
