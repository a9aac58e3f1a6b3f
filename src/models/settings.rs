// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

// Uma linha por organização
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub id: Uuid,
    pub organization_id: Uuid,

    #[schema(example = 5)]
    pub default_low_stock_threshold: i32,

    pub updated_at: DateTime<Utc>,
}

impl Settings {
    /// Linha candidata com o limite padrão, usada no cadastro e no get-or-create.
    pub fn with_defaults(organization_id: Uuid) -> Self {
        Self::with_threshold(organization_id, DEFAULT_LOW_STOCK_THRESHOLD)
    }

    pub fn with_threshold(organization_id: Uuid, default_low_stock_threshold: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            default_low_stock_threshold,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsPayload {
    #[schema(example = 10)]
    #[validate(range(min = 0, message = "O limite padrão não pode ser negativo."))]
    pub default_low_stock_threshold: i32,
}
