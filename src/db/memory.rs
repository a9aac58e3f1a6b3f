// src/db/memory.rs

//! Backend em memória, para testes e desenvolvimento local (`STORE_BACKEND=memory`).
//!
//! Um único `RwLock` protege todas as tabelas, então o cadastro
//! (organização + usuário + configurações) é visível por inteiro ou não é.
//! As mesmas constraints únicas do Postgres são verificadas sob o lock de escrita.
//! Chaves estrangeiras não são verificadas.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{IdentityStore, ProductStore, SettingsStore},
    models::{
        auth::{Organization, User},
        inventory::Product,
        settings::Settings,
    },
};

#[derive(Default)]
struct Tables {
    organizations: Vec<Organization>,
    users: Vec<User>,
    products: Vec<Product>,
    settings: Vec<Settings>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn settings_rows(&self, organization_id: Uuid) -> usize {
        self.tables
            .read()
            .await
            .settings
            .iter()
            .filter(|s| s.organization_id == organization_id)
            .count()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.organizations.iter().find(|o| o.id == id).cloned())
    }

    async fn create_organization_with_owner(
        &self,
        organization: &Organization,
        owner: &User,
        settings: &Settings,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.email == owner.email) {
            return Err(AppError::EmailAlreadyExists);
        }
        if tables.settings.iter().any(|s| s.organization_id == settings.organization_id) {
            return Err(anyhow::anyhow!(
                "configurações já existem para a organização {}",
                settings.organization_id
            )
            .into());
        }

        tables.organizations.push(organization.clone());
        tables.users.push(owner.clone());
        tables.settings.push(settings.clone());
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list(&self, organization_id: Uuid) -> Result<Vec<Product>, AppError> {
        let tables = self.tables.read().await;
        // Inverte a ordem de inserção antes do sort estável: empates ficam com o mais novo primeiro
        let mut products: Vec<Product> = tables
            .products
            .iter()
            .rev()
            .filter(|p| p.organization_id == organization_id)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn find(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Product>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .find(|p| p.id == id && p.organization_id == organization_id)
            .cloned())
    }

    async fn find_by_sku(
        &self,
        organization_id: Uuid,
        sku: &str,
    ) -> Result<Option<Product>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .find(|p| p.organization_id == organization_id && p.sku == sku)
            .cloned())
    }

    async fn insert(&self, product: &Product) -> Result<Product, AppError> {
        let mut tables = self.tables.write().await;

        if tables
            .products
            .iter()
            .any(|p| p.organization_id == product.organization_id && p.sku == product.sku)
        {
            return Err(AppError::SkuAlreadyExists);
        }

        tables.products.push(product.clone());
        Ok(product.clone())
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>, AppError> {
        let mut tables = self.tables.write().await;

        let Some(index) = tables
            .products
            .iter()
            .position(|p| p.id == product.id && p.organization_id == product.organization_id)
        else {
            return Ok(None);
        };

        if tables.products.iter().any(|p| {
            p.organization_id == product.organization_id
                && p.sku == product.sku
                && p.id != product.id
        }) {
            return Err(AppError::SkuAlreadyExists);
        }

        // created_at nunca muda numa atualização
        let stored = &mut tables.products[index];
        *stored = Product {
            created_at: stored.created_at,
            ..product.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables
            .products
            .retain(|p| !(p.id == id && p.organization_id == organization_id));
        Ok(tables.products.len() < before)
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get_or_create(&self, defaults: &Settings) -> Result<Settings, AppError> {
        let mut tables = self.tables.write().await;

        if let Some(existing) = tables
            .settings
            .iter()
            .find(|s| s.organization_id == defaults.organization_id)
        {
            return Ok(existing.clone());
        }

        tracing::info!(
            organization_id = %defaults.organization_id,
            "Configurações padrão criadas na primeira leitura"
        );
        tables.settings.push(defaults.clone());
        Ok(defaults.clone())
    }

    async fn upsert(&self, settings: &Settings) -> Result<Settings, AppError> {
        let mut tables = self.tables.write().await;

        match tables
            .settings
            .iter_mut()
            .find(|s| s.organization_id == settings.organization_id)
        {
            Some(existing) => {
                existing.default_low_stock_threshold = settings.default_low_stock_threshold;
                existing.updated_at = settings.updated_at;
                Ok(existing.clone())
            }
            None => {
                tables.settings.push(settings.clone());
                Ok(settings.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn product(organization_id: Uuid, sku: &str) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            organization_id,
            name: format!("Produto {sku}"),
            sku: sku.into(),
            description: None,
            quantity_on_hand: 0,
            cost_price: None,
            selling_price: None,
            low_stock_threshold: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn list_is_newest_first_even_on_equal_timestamps() {
        let store = MemoryStore::new();
        let org = Uuid::new_v4();

        let first = product(org, "A");
        let second = Product {
            created_at: first.created_at,
            ..product(org, "B")
        };
        let older = Product {
            created_at: first.created_at - Duration::seconds(10),
            ..product(org, "C")
        };

        store.insert(&first).await.unwrap();
        store.insert(&second).await.unwrap();
        store.insert(&older).await.unwrap();

        let skus: Vec<String> = store
            .list(org)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.sku)
            .collect();
        assert_eq!(skus, ["B", "A", "C"]);
    }

    #[tokio::test]
    async fn update_keeps_created_at() {
        let store = MemoryStore::new();
        let org = Uuid::new_v4();
        let original = store.insert(&product(org, "A")).await.unwrap();

        let changed = Product {
            created_at: original.created_at + Duration::days(1),
            quantity_on_hand: 7,
            ..original.clone()
        };
        let stored = store.update(&changed).await.unwrap().unwrap();

        assert_eq!(stored.created_at, original.created_at);
        assert_eq!(stored.quantity_on_hand, 7);
    }

    #[tokio::test]
    async fn signup_triple_is_rejected_as_a_whole() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let org = Organization {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            created_at: now,
            updated_at: now,
        };
        let owner = User {
            id: Uuid::new_v4(),
            email: "a@acme.com".into(),
            password_hash: "hash".into(),
            organization_id: org.id,
            created_at: now,
            updated_at: now,
        };
        store
            .create_organization_with_owner(&org, &owner, &Settings::with_defaults(org.id))
            .await
            .unwrap();

        let other_org = Organization {
            id: Uuid::new_v4(),
            name: "Other".into(),
            ..org.clone()
        };
        let duplicate = User {
            id: Uuid::new_v4(),
            organization_id: other_org.id,
            ..owner.clone()
        };
        let result = store
            .create_organization_with_owner(
                &other_org,
                &duplicate,
                &Settings::with_defaults(other_org.id),
            )
            .await;

        assert!(matches!(result, Err(AppError::EmailAlreadyExists)));
        assert!(store.find_organization(other_org.id).await.unwrap().is_none());
        assert_eq!(store.settings_rows(other_org.id).await, 0);
    }
}
