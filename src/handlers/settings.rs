// src/handlers/settings.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::{error::AppError, extract::JsonPayload},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::settings::{Settings, UpdateSettingsPayload},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Configurações da organização (criadas com o padrão se ausentes)", body = Settings),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state
        .settings_service
        .get_settings(identity.organization_id())
        .await?;

    Ok((StatusCode::OK, Json(settings)))
}

// PATCH /api/settings
#[utoipa::path(
    patch,
    path = "/api/settings",
    tag = "Settings",
    request_body = UpdateSettingsPayload,
    responses(
        (status = 200, description = "Configurações atualizadas", body = Settings),
        (status = 400, description = "Limite inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    JsonPayload(payload): JsonPayload<UpdateSettingsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_state
        .settings_service
        .update_settings(identity.organization_id(), payload)
        .await?;

    Ok((StatusCode::OK, Json(updated)))
}
