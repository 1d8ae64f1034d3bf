use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use verdicomply_core::{ComplianceId, ComplianceLogId};

use crate::app::dto::{self, ComplianceLogRequest, ComplianceLogResponse};
use crate::app::errors::{parse_id, ApiError};
use crate::app::extract::ValidatedJson;
use crate::app::services::AppServices;
use crate::authz::{require_roles, ADMIN_ONLY, ANY_ROLE, MANAGERS};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_logs).post(create_log))
        .route("/conformidade/:compliance_id", get(logs_by_compliance))
        .route("/acao/:action", get(logs_by_action))
        .route("/:id", get(get_log).delete(delete_log))
}

pub async fn list_logs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<Vec<ComplianceLogResponse>>, ApiError> {
    require_roles(&principal, MANAGERS)?;
    Ok(Json(dto::list(services.logs.list().await?)))
}

pub async fn get_log(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<ComplianceLogResponse>, ApiError> {
    require_roles(&principal, MANAGERS)?;
    let id: ComplianceLogId = parse_id(&id)?;
    Ok(Json(services.logs.get(id).await?.into()))
}

/// Newest entries first.
pub async fn logs_by_compliance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(compliance_id): Path<String>,
) -> Result<Json<Vec<ComplianceLogResponse>>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let compliance_id: ComplianceId = parse_id(&compliance_id)?;
    Ok(Json(dto::list(services.logs.by_compliance(compliance_id).await?)))
}

pub async fn logs_by_action(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(action): Path<String>,
) -> Result<Json<Vec<ComplianceLogResponse>>, ApiError> {
    require_roles(&principal, MANAGERS)?;
    Ok(Json(dto::list(services.logs.by_action(&action).await?)))
}

pub async fn create_log(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidatedJson(body): ValidatedJson<ComplianceLogRequest>,
) -> Result<(StatusCode, Json<ComplianceLogResponse>), ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let created = services.logs.create(body.into_log()?).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn delete_log(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_roles(&principal, ADMIN_ONLY)?;
    let id: ComplianceLogId = parse_id(&id)?;
    services.logs.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
