//! Public authentication endpoints: login and self-registration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::app::dto::{LoginRequest, RegistrationRequest, RegistrationResponse, TokenResponse};
use crate::app::errors::ApiError;
use crate::app::extract::ValidatedJson;
use crate::app::services::AppServices;

/// Bad credentials answer 401 with a token-shaped body rather than the error body.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let username = body.username.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    match services.accounts.login(&username, &password).await? {
        Some(issued) => {
            tracing::info!(username = %issued.username, "login succeeded");
            Ok(Json(TokenResponse::bearer(issued.token, issued.username, &issued.roles)).into_response())
        }
        None => Ok((StatusCode::UNAUTHORIZED, Json(TokenResponse::rejected(username))).into_response()),
    }
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedJson(body): ValidatedJson<RegistrationRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), ApiError> {
    let (username, password, role) = body.into_parts()?;
    let account = services.accounts.register(&username, &password, role).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            username: account.username,
            role: account.role.as_str().to_string(),
            mensagem: "Usuário registrado com sucesso".to_string(),
        }),
    ))
}
