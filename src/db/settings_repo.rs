// src/db/settings_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{common::error::AppError, db::SettingsStore, models::settings::Settings};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for SettingsRepository {
    async fn get_or_create(&self, defaults: &Settings) -> Result<Settings, AppError> {
        let mut tx = self.pool.begin().await?;

        // ON CONFLICT DO NOTHING: duas leituras simultâneas não criam duas linhas
        let inserted = sqlx::query(
            r#"
            INSERT INTO settings (id, organization_id, default_low_stock_threshold, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (organization_id) DO NOTHING
            "#,
        )
        .bind(defaults.id)
        .bind(defaults.organization_id)
        .bind(defaults.default_low_stock_threshold)
        .bind(defaults.updated_at)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() > 0 {
            tracing::info!(
                organization_id = %defaults.organization_id,
                "Configurações padrão criadas na primeira leitura"
            );
        }

        let settings =
            sqlx::query_as::<_, Settings>("SELECT * FROM settings WHERE organization_id = $1")
                .bind(defaults.organization_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(settings)
    }

    async fn upsert(&self, settings: &Settings) -> Result<Settings, AppError> {
        let settings = sqlx::query_as::<_, Settings>(
            r#"
            INSERT INTO settings (id, organization_id, default_low_stock_threshold, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (organization_id)
            DO UPDATE SET
                default_low_stock_threshold = EXCLUDED.default_low_stock_threshold,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(settings.id)
        .bind(settings.organization_id)
        .bind(settings.default_low_stock_threshold)
        .bind(settings.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }
}
