// src/services/settings_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::SettingsStore,
    models::settings::{Settings, UpdateSettingsPayload},
};

#[derive(Clone)]
pub struct SettingsService {
    settings: Arc<dyn SettingsStore>,
}

impl SettingsService {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Get-or-create: o cadastro já cria a linha, isto cobre organizações antigas.
    pub async fn get_settings(&self, organization_id: Uuid) -> Result<Settings, AppError> {
        self.settings
            .get_or_create(&Settings::with_defaults(organization_id))
            .await
    }

    pub async fn update_settings(
        &self,
        organization_id: Uuid,
        payload: UpdateSettingsPayload,
    ) -> Result<Settings, AppError> {
        payload.validate()?;

        let settings = self
            .settings
            .upsert(&Settings::with_threshold(
                organization_id,
                payload.default_low_stock_threshold,
            ))
            .await?;

        tracing::info!(
            organization_id = %organization_id,
            threshold = settings.default_low_stock_threshold,
            "Limite padrão de estoque baixo atualizado"
        );
        Ok(settings)
    }
}
