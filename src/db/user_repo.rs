// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{IdentityStore, USERS_EMAIL_KEY},
    models::{
        auth::{Organization, User},
        settings::Settings,
    },
};

// O repositório de identidade: tabelas 'organizations' e 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for UserRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let organization =
            sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(organization)
    }

    async fn create_organization_with_owner(
        &self,
        organization: &Organization,
        owner: &User,
        settings: &Settings,
    ) -> Result<(), AppError> {
        // Se qualquer insert falhar, o tx sofre rollback automático ao sair do escopo (drop)
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(organization.id)
        .bind(&organization.name)
        .bind(organization.created_at)
        .bind(organization.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, organization_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(owner.id)
        .bind(&owner.email)
        .bind(&owner.password_hash)
        .bind(owner.organization_id)
        .bind(owner.created_at)
        .bind(owner.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            // Dois cadastros simultâneos com o mesmo e-mail: o perdedor cai aqui
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() && db_err.constraint() == Some(USERS_EMAIL_KEY) {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })?;

        sqlx::query(
            r#"
            INSERT INTO settings (id, organization_id, default_low_stock_threshold, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(settings.id)
        .bind(settings.organization_id)
        .bind(settings.default_low_stock_threshold)
        .bind(settings.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
