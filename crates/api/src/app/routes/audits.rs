use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use verdicomply_core::{AuditId, DepartmentId};

use crate::app::dto::{self, AuditRequest, AuditResponse};
use crate::app::errors::{parse_id, ApiError};
use crate::app::extract::ValidatedJson;
use crate::app::services::AppServices;
use crate::authz::{require_roles, ADMIN_ONLY, ANY_ROLE, MANAGERS};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_audits).post(create_audit))
        .route("/status/:status", get(audits_by_status))
        .route("/departamento/:department_id", get(audits_by_department))
        .route("/:id", get(get_audit).put(update_audit).delete(delete_audit))
}

/// Full listing is reserved to administrators.
pub async fn list_audits(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<Vec<AuditResponse>>, ApiError> {
    require_roles(&principal, ADMIN_ONLY)?;
    Ok(Json(dto::list(services.audits.list().await?)))
}

pub async fn get_audit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<AuditResponse>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let id: AuditId = parse_id(&id)?;
    Ok(Json(services.audits.get(id).await?.into()))
}

pub async fn audits_by_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(status): Path<String>,
) -> Result<Json<Vec<AuditResponse>>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    Ok(Json(dto::list(services.audits.by_status(&status).await?)))
}

pub async fn audits_by_department(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(department_id): Path<String>,
) -> Result<Json<Vec<AuditResponse>>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let department_id: DepartmentId = parse_id(&department_id)?;
    Ok(Json(dto::list(services.audits.by_department(department_id).await?)))
}

pub async fn create_audit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidatedJson(body): ValidatedJson<AuditRequest>,
) -> Result<(StatusCode, Json<AuditResponse>), ApiError> {
    require_roles(&principal, MANAGERS)?;
    let created = services.audits.create(body.into_audit()?).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn update_audit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<AuditRequest>,
) -> Result<Json<AuditResponse>, ApiError> {
    require_roles(&principal, MANAGERS)?;
    let id: AuditId = parse_id(&id)?;
    let updated = services.audits.update(id, body.into_audit()?).await?;
    Ok(Json(updated.into()))
}

pub async fn delete_audit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_roles(&principal, ADMIN_ONLY)?;
    let id: AuditId = parse_id(&id)?;
    services.audits.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
