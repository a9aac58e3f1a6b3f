// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::IdentityStore,
    models::{
        auth::{Claims, Organization, SignupPayload, User},
        settings::Settings,
    },
};

/// Identidade verificada de quem faz a requisição.
///
/// Só existe de duas formas: credenciais conferidas por [`AuthService::verify_credentials`]
/// ou token validado por [`AuthService::validate_token`]. Não tem construtor público
/// nem `Deserialize`, então um handler nunca a recebe do corpo da requisição.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    user_id: Uuid,
    organization_id: Uuid,
    organization_name: String,
}

impl Identity {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    pub fn organization_name(&self) -> &str {
        &self.organization_name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignupOutcome {
    pub organization_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Clone)]
pub struct AuthService {
    identity_store: Arc<dyn IdentityStore>,
    jwt_secret: String,
    token_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        identity_store: Arc<dyn IdentityStore>,
        jwt_secret: String,
        token_ttl: Duration,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            identity_store,
            jwt_secret,
            token_ttl,
            bcrypt_cost,
        }
    }

    /// Cria organização, primeiro usuário e configurações padrão de uma vez.
    pub async fn signup(&self, payload: SignupPayload) -> Result<SignupOutcome, AppError> {
        payload.validate()?;

        // 1. E-mail é único entre todas as organizações; checado antes de qualquer escrita
        if self
            .identity_store
            .find_user_by_email(&payload.email)
            .await?
            .is_some()
        {
            return Err(AppError::EmailAlreadyExists);
        }

        // 2. Hashing fora do runtime assíncrono
        let password = payload.password;
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // 3. As três linhas: ou todas, ou nenhuma
        let now = Utc::now();
        let organization = Organization {
            id: Uuid::new_v4(),
            name: payload.organization_name,
            created_at: now,
            updated_at: now,
        };
        let owner = User {
            id: Uuid::new_v4(),
            email: payload.email,
            password_hash,
            organization_id: organization.id,
            created_at: now,
            updated_at: now,
        };
        let settings = Settings::with_defaults(organization.id);

        self.identity_store
            .create_organization_with_owner(&organization, &owner, &settings)
            .await?;

        tracing::info!(
            organization_id = %organization.id,
            user_id = %owner.id,
            "Nova organização cadastrada"
        );

        Ok(SignupOutcome {
            organization_id: organization.id,
            user_id: owner.id,
        })
    }

    /// `None` tanto para e-mail desconhecido quanto para senha errada.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Identity>, AppError> {
        let Some(user) = self.identity_store.find_user_by_email(email).await? else {
            return Ok(None);
        };

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Ok(None);
        }

        let organization = self
            .identity_store
            .find_organization(user.organization_id)
            .await?
            .ok_or_else(|| {
                anyhow::anyhow!("Usuário {} sem organização {}", user.id, user.organization_id)
            })?;

        Ok(Some(Identity {
            user_id: user.id,
            organization_id: organization.id,
            organization_name: organization.name,
        }))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let identity = self
            .verify_credentials(email, password)
            .await?
            .ok_or_else(|| {
                tracing::debug!("Tentativa de login recusada");
                AppError::InvalidCredentials
            })?;

        self.issue_token(&identity)
    }

    pub fn issue_token(&self, identity: &Identity) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| anyhow::anyhow!("Validade do token fora do intervalo de datas"))?;

        let claims = Claims {
            sub: identity.user_id,
            organization_id: identity.organization_id,
            organization_name: identity.organization_name.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    /// Confia nas claims de um token com assinatura e validade conferidas; não consulta o banco.
    pub fn validate_token(&self, token: &str) -> Result<Identity, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized)?;

        Ok(Identity {
            user_id: token_data.claims.sub,
            organization_id: token_data.claims.organization_id,
            organization_name: token_data.claims.organization_name,
        })
    }
}
