// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::inventory::Product;

// Resumo do estoque da organização (os cards do topo + a lista de alerta)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_products: i64,
    pub total_quantity: i64,
    pub low_stock_items: Vec<Product>,
    pub default_threshold: i32,
}
