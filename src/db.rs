// src/db.rs

//! Contratos de acesso a dados.
//!
//! Toda operação sobre produtos e configurações recebe o `organization_id`
//! explicitamente: nenhuma linha de outra organização é lida, alterada ou
//! removida, mesmo que o chamador conheça o seu ID.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{Organization, User},
        inventory::Product,
        settings::Settings,
    },
};

pub mod memory;
pub use memory::MemoryStore;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;

// Constraints únicas criadas na migration; a violação delas decide corridas.
pub(crate) const USERS_EMAIL_KEY: &str = "users_email_key";
pub(crate) const PRODUCTS_SKU_KEY: &str = "products_organization_id_sku_key";

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Busca exata (case-sensitive) em todas as organizações.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, AppError>;

    /// Insere organização, usuário e configurações: as três linhas ou nenhuma.
    /// Falha com `EmailAlreadyExists` se o e-mail já estiver em uso.
    async fn create_organization_with_owner(
        &self,
        organization: &Organization,
        owner: &User,
        settings: &Settings,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Mais recentes primeiro.
    async fn list(&self, organization_id: Uuid) -> Result<Vec<Product>, AppError>;

    async fn find(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Product>, AppError>;

    async fn find_by_sku(
        &self,
        organization_id: Uuid,
        sku: &str,
    ) -> Result<Option<Product>, AppError>;

    /// `SkuAlreadyExists` se (organization_id, sku) já existir.
    async fn insert(&self, product: &Product) -> Result<Product, AppError>;

    /// Grava a linha inteira. `None` se o produto não existir nesta organização.
    async fn update(&self, product: &Product) -> Result<Option<Product>, AppError>;

    /// `false` se o produto não existir nesta organização.
    async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Devolve a linha da organização, inserindo `defaults` se ainda não existir.
    async fn get_or_create(&self, defaults: &Settings) -> Result<Settings, AppError>;

    /// Atualiza o limite padrão; cria a linha se ela ainda não existir.
    async fn upsert(&self, settings: &Settings) -> Result<Settings, AppError>;
}
