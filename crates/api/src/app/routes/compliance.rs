use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use verdicomply_core::{AuditId, ComplianceId, Flag, NormId};

use crate::app::dto::{self, ComplianceRequest, ComplianceResponse};
use crate::app::errors::{parse_id, ApiError};
use crate::app::extract::ValidatedJson;
use crate::app::services::AppServices;
use crate::authz::{require_roles, ADMIN_ONLY, ANY_ROLE};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_compliance).post(create_compliance))
        .route("/auditoria/:audit_id", get(compliance_by_audit))
        .route("/status/:flag", get(compliance_by_flag))
        .route("/norma/:norm_id", get(compliance_by_norm))
        .route(
            "/:id",
            get(get_compliance).put(update_compliance).delete(delete_compliance),
        )
}

pub async fn list_compliance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<Vec<ComplianceResponse>>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    Ok(Json(dto::list(services.compliance.list().await?)))
}

pub async fn get_compliance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<ComplianceResponse>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let id: ComplianceId = parse_id(&id)?;
    Ok(Json(services.compliance.get(id).await?.into()))
}

pub async fn compliance_by_audit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(audit_id): Path<String>,
) -> Result<Json<Vec<ComplianceResponse>>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let audit_id: AuditId = parse_id(&audit_id)?;
    Ok(Json(dto::list(services.compliance.by_audit(audit_id).await?)))
}

/// Anything other than `S` or `N` matches nothing.
pub async fn compliance_by_flag(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(flag): Path<String>,
) -> Result<Json<Vec<ComplianceResponse>>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let Ok(flag) = flag.parse::<Flag>() else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(dto::list(services.compliance.by_flag(flag).await?)))
}

pub async fn compliance_by_norm(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(norm_id): Path<String>,
) -> Result<Json<Vec<ComplianceResponse>>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let norm_id: NormId = parse_id(&norm_id)?;
    Ok(Json(dto::list(services.compliance.by_norm(norm_id).await?)))
}

pub async fn create_compliance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidatedJson(body): ValidatedJson<ComplianceRequest>,
) -> Result<(StatusCode, Json<ComplianceResponse>), ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let created = services.compliance.create(body.into_record()?).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn update_compliance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<ComplianceRequest>,
) -> Result<Json<ComplianceResponse>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let id: ComplianceId = parse_id(&id)?;
    let updated = services.compliance.update(id, body.into_record()?).await?;
    Ok(Json(updated.into()))
}

pub async fn delete_compliance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_roles(&principal, ADMIN_ONLY)?;
    let id: ComplianceId = parse_id(&id)?;
    services.compliance.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
