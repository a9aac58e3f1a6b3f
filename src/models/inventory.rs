// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

// --- Produto do catálogo, sempre dono de uma organização ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub quantity_on_hand: i32,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub low_stock_threshold: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Limite efetivo: o do produto, se definido, senão o padrão da organização.
    pub fn effective_threshold(&self, default_threshold: i32) -> i32 {
        self.low_stock_threshold.unwrap_or(default_threshold)
    }

    pub fn is_low_stock(&self, default_threshold: i32) -> bool {
        self.quantity_on_hand <= self.effective_threshold(default_threshold)
    }
}

// ---
// Validação de preços (Decimal não tem `range` no validator)
// ---
fn check_not_negative(errors: &mut ValidationErrors, field: &'static str, value: Option<Decimal>) {
    if value.is_some_and(|v| v.is_sign_negative() && !v.is_zero()) {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        errors.add(field, err);
    }
}

fn merge_price_errors(
    result: Result<(), ValidationErrors>,
    cost_price: Option<Decimal>,
    selling_price: Option<Decimal>,
) -> Result<(), ValidationErrors> {
    let mut errors = result.err().unwrap_or_else(ValidationErrors::new);
    check_not_negative(&mut errors, "cost_price", cost_price);
    check_not_negative(&mut errors, "selling_price", selling_price);

    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[schema(example = "Widget")]
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[schema(example = "W-1")]
    #[validate(length(min = 1, message = "O SKU é obrigatório."))]
    pub sku: String,

    pub description: Option<String>,

    #[serde(default)] // Se o JSON não tiver esse campo, assume 0
    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub quantity_on_hand: i32,

    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,

    #[validate(range(min = 0, message = "O limite de estoque baixo não pode ser negativo."))]
    pub low_stock_threshold: Option<i32>,
}

impl CreateProductPayload {
    /// Regras do derive + preços não negativos, tudo num único `ValidationErrors`.
    pub fn validate_payload(&self) -> Result<(), ValidationErrors> {
        merge_price_errors(self.validate(), self.cost_price, self.selling_price)
    }

    pub fn into_product(self, organization_id: Uuid) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            organization_id,
            name: self.name,
            sku: self.sku,
            description: self.description,
            quantity_on_hand: self.quantity_on_hand,
            cost_price: self.cost_price,
            selling_price: self.selling_price,
            low_stock_threshold: self.low_stock_threshold,
            created_at: now,
            updated_at: now,
        }
    }
}

// Atualização parcial: cada campo ausente mantém o valor atual.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "O SKU é obrigatório."))]
    pub sku: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub quantity_on_hand: Option<i32>,

    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,

    #[validate(range(min = 0, message = "O limite de estoque baixo não pode ser negativo."))]
    pub low_stock_threshold: Option<i32>,
}

impl UpdateProductPayload {
    pub fn validate_payload(&self) -> Result<(), ValidationErrors> {
        merge_price_errors(self.validate(), self.cost_price, self.selling_price)
    }

    /// Aplica os campos presentes sobre o produto e renova `updated_at`.
    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(sku) = self.sku {
            product.sku = sku;
        }
        if let Some(description) = self.description {
            product.description = Some(description);
        }
        if let Some(quantity) = self.quantity_on_hand {
            product.quantity_on_hand = quantity;
        }
        if let Some(cost) = self.cost_price {
            product.cost_price = Some(cost);
        }
        if let Some(price) = self.selling_price {
            product.selling_price = Some(price);
        }
        if let Some(threshold) = self.low_stock_threshold {
            product.low_stock_threshold = Some(threshold);
        }
        product.updated_at = Utc::now();
    }
}
