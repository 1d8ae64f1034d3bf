use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use verdicomply_core::NormId;

use crate::app::dto::{self, NormRequest, NormResponse};
use crate::app::errors::{parse_id, ApiError};
use crate::app::extract::ValidatedJson;
use crate::app::services::AppServices;
use crate::authz::{require_roles, ADMIN_ONLY, ANY_ROLE, MANAGERS};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_norms).post(create_norm))
        .route("/orgao/:agency", get(norms_by_agency))
        .route("/codigo/:code", get(norm_by_code))
        .route("/:id", get(get_norm).put(update_norm).delete(delete_norm))
}

pub async fn list_norms(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<Vec<NormResponse>>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    Ok(Json(dto::list(services.norms.list().await?)))
}

pub async fn get_norm(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<NormResponse>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let id: NormId = parse_id(&id)?;
    Ok(Json(services.norms.get(id).await?.into()))
}

pub async fn norms_by_agency(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(agency): Path<String>,
) -> Result<Json<Vec<NormResponse>>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    Ok(Json(dto::list(services.norms.by_agency(&agency).await?)))
}

pub async fn norm_by_code(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(code): Path<String>,
) -> Result<Json<NormResponse>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    Ok(Json(services.norms.by_code(&code).await?.into()))
}

/// Creation answers 200 rather than 201.
pub async fn create_norm(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidatedJson(body): ValidatedJson<NormRequest>,
) -> Result<Json<NormResponse>, ApiError> {
    require_roles(&principal, MANAGERS)?;
    let norm = body.into_norm()?;
    tracing::info!(code = %norm.code, "creating environmental norm");
    Ok(Json(services.norms.create(norm).await?.into()))
}

pub async fn update_norm(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<NormRequest>,
) -> Result<Json<NormResponse>, ApiError> {
    require_roles(&principal, MANAGERS)?;
    let id: NormId = parse_id(&id)?;
    Ok(Json(services.norms.update(id, body.into_norm()?).await?.into()))
}

pub async fn delete_norm(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_roles(&principal, ADMIN_ONLY)?;
    let id: NormId = parse_id(&id)?;
    services.norms.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
