// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use chrono::TimeDelta;
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{
        IdentityStore, InventoryRepository, MemoryStore, ProductStore, SettingsRepository,
        SettingsStore, UserRepository,
    },
    services::{
        auth::AuthService, dashboard_service::DashboardService,
        inventory_service::InventoryService, settings_service::SettingsService,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("STORE_BACKEND desconhecido: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let store_backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => StoreBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL deve ser definida"));
        }

        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let token_ttl_hours: i64 = parse_or(&lookup, "TOKEN_TTL_HOURS", 24 * 7)?;
        if token_ttl_hours <= 0 {
            return Err(anyhow!("TOKEN_TTL_HOURS deve ser positivo: {}", token_ttl_hours));
        }
        let token_ttl = TimeDelta::try_hours(token_ttl_hours)
            .with_context(|| format!("TOKEN_TTL_HOURS inválido: {}", token_ttl_hours))?;
        let bcrypt_cost: u32 = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        let db_max_connections: u32 = parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?;

        Ok(Self {
            store_backend,
            database_url,
            db_max_connections,
            jwt_secret,
            token_ttl,
            bcrypt_cost,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} inválido: '{}'", key, raw)),
        None => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub inventory_service: InventoryService,
    pub settings_service: SettingsService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        match config.store_backend {
            StoreBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;

                let db_pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&db_pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;

                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Ok(Self::from_stores(
                    Arc::new(UserRepository::new(db_pool.clone())),
                    Arc::new(InventoryRepository::new(db_pool.clone())),
                    Arc::new(SettingsRepository::new(db_pool)),
                    config,
                ))
            }
            StoreBackend::Memory => {
                tracing::warn!("Usando armazenamento em memória: os dados somem ao reiniciar");
                let store = Arc::new(MemoryStore::new());
                Ok(Self::from_stores(store.clone(), store.clone(), store, config))
            }
        }
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_stores(
        identity_store: Arc<dyn IdentityStore>,
        product_store: Arc<dyn ProductStore>,
        settings_store: Arc<dyn SettingsStore>,
        config: &Config,
    ) -> Self {
        let auth_service = AuthService::new(
            identity_store,
            config.jwt_secret.clone(),
            config.token_ttl,
            config.bcrypt_cost,
        );
        let inventory_service = InventoryService::new(product_store);
        let settings_service = SettingsService::new(settings_store);
        let dashboard_service =
            DashboardService::new(inventory_service.clone(), settings_service.clone());

        Self {
            auth_service,
            inventory_service,
            settings_service,
            dashboard_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/stockflow"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.token_ttl, chrono::Duration::hours(168));
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let result = Config::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")]));
        assert!(result.is_err());
    }

    #[test]
    fn memory_backend_runs_without_database_url() {
        let config = Config::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "Memory"),
            ("JWT_SECRET", "s3cret"),
            ("TOKEN_TTL_HOURS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.database_url.is_none());
        assert_eq!(config.token_ttl, chrono::Duration::hours(2));
    }

    #[test]
    fn rejects_missing_secret_and_garbage_numbers() {
        assert!(Config::from_lookup(lookup_from(&[("STORE_BACKEND", "memory")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
            ("BCRYPT_COST", "doze"),
        ]))
        .is_err());
        assert!(Config::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "sqlite"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .is_err());
    }

    #[test]
    fn rejects_token_ttl_out_of_range() {
        for ttl in ["0", "-3", "9223372036854775807"] {
            let result = Config::from_lookup(lookup_from(&[
                ("STORE_BACKEND", "memory"),
                ("JWT_SECRET", "s3cret"),
                ("TOKEN_TTL_HOURS", ttl),
            ]));
            assert!(result.is_err(), "TOKEN_TTL_HOURS={ttl} deveria falhar");
        }
    }
}
