// src/services/dashboard_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{dashboard::DashboardSummary, inventory::Product},
    services::{inventory_service::InventoryService, settings_service::SettingsService},
};

#[derive(Clone)]
pub struct DashboardService {
    inventory: InventoryService,
    settings: SettingsService,
}

impl DashboardService {
    pub fn new(inventory: InventoryService, settings: SettingsService) -> Self {
        Self { inventory, settings }
    }

    pub async fn get_summary(&self, organization_id: Uuid) -> Result<DashboardSummary, AppError> {
        let settings = self.settings.get_settings(organization_id).await?;
        let products = self.inventory.list_products(organization_id).await?;

        Ok(summarize(products, settings.default_low_stock_threshold))
    }
}

/// Totais e lista de estoque baixo (menor quantidade primeiro; empates mantêm a ordem da listagem).
pub fn summarize(products: Vec<Product>, default_threshold: i32) -> DashboardSummary {
    let total_products = products.len() as i64;
    let total_quantity = products.iter().map(|p| i64::from(p.quantity_on_hand)).sum();

    let mut low_stock_items: Vec<Product> = products
        .into_iter()
        .filter(|p| p.is_low_stock(default_threshold))
        .collect();
    low_stock_items.sort_by_key(|p| p.quantity_on_hand);

    DashboardSummary {
        total_products,
        total_quantity,
        low_stock_items,
        default_threshold,
    }
}
