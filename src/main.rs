//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG sobrescreve o nível padrão
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    let router = app(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    Ok(())
}

fn app(app_state: AppState) -> Router {
    // Rotas públicas
    let auth_routes = Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login));

    // Tudo abaixo exige um token válido; a organização vem dele
    let session_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::inventory::list_products).post(handlers::inventory::create_product),
        )
        .route(
            "/{id}",
            get(handlers::inventory::get_product)
                .patch(handlers::inventory::update_product)
                .delete(handlers::inventory::delete_product),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let settings_routes = Router::new()
        .route(
            "/",
            get(handlers::settings::get_settings).patch(handlers::settings::update_settings),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let dashboard_routes = Router::new()
        .route("/", get(handlers::dashboard::get_summary))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes.merge(session_routes))
        .nest("/api/products", product_routes)
        .nest("/api/settings", settings_routes)
        .nest("/api/dashboard", dashboard_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::{
        common::error::AppError,
        config::StoreBackend,
        db::{MemoryStore, ProductStore},
        models::inventory::Product,
    };

    fn config(jwt_secret: &str) -> Config {
        Config {
            store_backend: StoreBackend::Memory,
            database_url: None,
            db_max_connections: 1,
            jwt_secret: jwt_secret.into(),
            token_ttl: chrono::Duration::hours(1),
            bcrypt_cost: 4,
            bind_addr: "127.0.0.1:0".into(),
        }
    }

    fn router_with(store: MemoryStore, products: Arc<dyn ProductStore>, secret: &str) -> Router {
        let store = Arc::new(store);
        app(AppState::from_stores(store.clone(), products, store, &config(secret)))
    }

    // Qualquer leitura ou escrita de produto vira 500
    struct UnreachableProducts;

    #[async_trait]
    impl ProductStore for UnreachableProducts {
        async fn list(&self, _: Uuid) -> Result<Vec<Product>, AppError> {
            Err(anyhow::anyhow!("repositório acessado sem autenticação").into())
        }
        async fn find(&self, _: Uuid, _: Uuid) -> Result<Option<Product>, AppError> {
            Err(anyhow::anyhow!("repositório acessado sem autenticação").into())
        }
        async fn find_by_sku(&self, _: Uuid, _: &str) -> Result<Option<Product>, AppError> {
            Err(anyhow::anyhow!("repositório acessado sem autenticação").into())
        }
        async fn insert(&self, _: &Product) -> Result<Product, AppError> {
            Err(anyhow::anyhow!("repositório acessado sem autenticação").into())
        }
        async fn update(&self, _: &Product) -> Result<Option<Product>, AppError> {
            Err(anyhow::anyhow!("repositório acessado sem autenticação").into())
        }
        async fn delete(&self, _: Uuid, _: Uuid) -> Result<bool, AppError> {
            Err(anyhow::anyhow!("repositório acessado sem autenticação").into())
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with_auth(uri: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn signup_and_login(router: &Router, email: &str) -> String {
        let signup = router
            .clone()
            .oneshot(post_json(
                "/api/auth/signup",
                json!({ "organizationName": "Acme", "email": email, "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(signup.status(), StatusCode::CREATED);

        let login = router
            .clone()
            .oneshot(post_json(
                "/api/auth/login",
                json!({ "email": email, "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(login.status(), StatusCode::OK);
        body_json(login).await["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn guarded_routes_reject_bad_tokens_before_touching_products() {
        let router = router_with(MemoryStore::new(), Arc::new(UnreachableProducts), "s3cret");

        // Token válido, mas assinado com outro segredo
        let foreign_router = router_with(MemoryStore::new(), Arc::new(MemoryStore::new()), "outro");
        let foreign_token = signup_and_login(&foreign_router, "a@acme.com").await;
        let foreign_bearer = format!("Bearer {foreign_token}");

        for authorization in [
            None,
            Some("Bearer"),
            Some("Basic YTpi"),
            Some("Bearer nao-e-um-jwt"),
            Some(foreign_bearer.as_str()),
        ] {
            for uri in ["/api/products", "/api/settings", "/api/dashboard", "/api/auth/me"] {
                let response = router
                    .clone()
                    .oneshot(get_with_auth(uri, authorization))
                    .await
                    .unwrap();
                assert_eq!(
                    response.status(),
                    StatusCode::UNAUTHORIZED,
                    "{uri} com {authorization:?}"
                );
            }
        }
    }

    #[tokio::test]
    async fn login_token_opens_guarded_routes() {
        let store = MemoryStore::new();
        let router = router_with(store.clone(), Arc::new(store), "s3cret");
        let token = signup_and_login(&router, "a@acme.com").await;
        let bearer = format!("Bearer {token}");

        let products = router
            .clone()
            .oneshot(get_with_auth("/api/products", Some(bearer.as_str())))
            .await
            .unwrap();
        assert_eq!(products.status(), StatusCode::OK);
        assert_eq!(body_json(products).await, json!([]));

        let me = router
            .clone()
            .oneshot(get_with_auth("/api/auth/me", Some(bearer.as_str())))
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::OK);
        assert_eq!(body_json(me).await["organizationName"], "Acme");
    }

    #[tokio::test]
    async fn public_routes_need_no_token() {
        let router = router_with(MemoryStore::new(), Arc::new(UnreachableProducts), "s3cret");

        let health = router
            .clone()
            .oneshot(get_with_auth("/api/health", None))
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);

        let login = router
            .oneshot(post_json(
                "/api/auth/login",
                json!({ "email": "nobody@acme.com", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(login.status(), StatusCode::UNAUTHORIZED);
    }
}
