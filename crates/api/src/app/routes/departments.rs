use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use verdicomply_core::DepartmentId;

use crate::app::dto::{self, DepartmentRequest, DepartmentResponse};
use crate::app::errors::{parse_id, ApiError};
use crate::app::extract::ValidatedJson;
use crate::app::services::AppServices;
use crate::authz::{require_roles, ADMIN_ONLY, ANY_ROLE, MANAGERS};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_departments).post(create_department))
        .route(
            "/:id",
            get(get_department).put(update_department).delete(delete_department),
        )
}

pub async fn list_departments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<Vec<DepartmentResponse>>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    Ok(Json(dto::list(services.departments.list().await?)))
}

pub async fn get_department(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<DepartmentResponse>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let id: DepartmentId = parse_id(&id)?;
    Ok(Json(services.departments.get(id).await?.into()))
}

pub async fn create_department(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidatedJson(body): ValidatedJson<DepartmentRequest>,
) -> Result<(StatusCode, Json<DepartmentResponse>), ApiError> {
    require_roles(&principal, MANAGERS)?;
    let created = services.departments.create(body.into_name()?).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn update_department(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<DepartmentRequest>,
) -> Result<Json<DepartmentResponse>, ApiError> {
    require_roles(&principal, MANAGERS)?;
    let id: DepartmentId = parse_id(&id)?;
    let updated = services.departments.update(id, body.into_name()?).await?;
    Ok(Json(updated.into()))
}

pub async fn delete_department(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_roles(&principal, ADMIN_ONLY)?;
    let id: DepartmentId = parse_id(&id)?;
    services.departments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
