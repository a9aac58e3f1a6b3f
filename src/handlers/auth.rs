// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{error::AppError, extract::JsonPayload},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{AuthResponse, LoginPayload, SignupPayload, SignupResponse},
    services::auth::Identity,
};

// POST /api/auth/signup
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignupPayload,
    responses(
        (status = 201, description = "Organização e usuário criados", body = SignupResponse),
        (status = 400, description = "Campos inválidos"),
        (status = 409, description = "E-mail já está em uso")
    )
)]
pub async fn signup(
    State(app_state): State<AppState>,
    JsonPayload(payload): JsonPayload<SignupPayload>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.clone();
    let outcome = app_state.auth_service.signup(payload).await?;

    let body = SignupResponse {
        organization_id: outcome.organization_id,
        user_id: outcome.user_id,
        email,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token de sessão", body = AuthResponse),
        (status = 401, description = "E-mail ou senha inválidos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    JsonPayload(payload): JsonPayload<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let token = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Identidade da sessão atual", body = Identity),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(identity): AuthenticatedUser) -> Json<Identity> {
    Json(identity)
}
