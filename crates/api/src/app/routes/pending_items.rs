use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};

use verdicomply_core::{ComplianceId, Flag, PendingItemId};

use crate::app::dto::{self, OverdueQuery, PendingItemRequest, PendingItemResponse};
use crate::app::errors::{parse_id, ApiError, DATE_FORMAT_MESSAGE};
use crate::app::extract::ValidatedJson;
use crate::app::services::AppServices;
use crate::authz::{require_roles, ADMIN_ONLY, ANY_ROLE, MANAGERS};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_pending_items).post(create_pending_item))
        .route("/conformidade/:compliance_id", get(pending_items_by_compliance))
        .route("/status/:resolved", get(pending_items_by_resolved))
        .route("/vencidas", get(overdue_pending_items))
        .route(
            "/:id",
            get(get_pending_item).put(update_pending_item).delete(delete_pending_item),
        )
}

pub async fn list_pending_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<Vec<PendingItemResponse>>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    Ok(Json(dto::list(services.pending_items.list().await?)))
}

pub async fn get_pending_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<PendingItemResponse>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let id: PendingItemId = parse_id(&id)?;
    Ok(Json(services.pending_items.get(id).await?.into()))
}

pub async fn pending_items_by_compliance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(compliance_id): Path<String>,
) -> Result<Json<Vec<PendingItemResponse>>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let compliance_id: ComplianceId = parse_id(&compliance_id)?;
    Ok(Json(dto::list(
        services.pending_items.by_compliance(compliance_id).await?,
    )))
}

pub async fn pending_items_by_resolved(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(resolved): Path<String>,
) -> Result<Json<Vec<PendingItemResponse>>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let Ok(resolved) = resolved.parse::<Flag>() else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(dto::list(services.pending_items.by_resolved(resolved).await?)))
}

/// Unresolved items due before `?data=` (today when omitted).
pub async fn overdue_pending_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<OverdueQuery>,
) -> Result<Json<Vec<PendingItemResponse>>, ApiError> {
    require_roles(&principal, MANAGERS)?;
    let reference = match query.data.as_deref().map(str::trim) {
        None | Some("") => Local::now().date_naive(),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::MalformedBody(DATE_FORMAT_MESSAGE.to_string()))?,
    };
    Ok(Json(dto::list(services.pending_items.overdue(reference).await?)))
}

pub async fn create_pending_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidatedJson(body): ValidatedJson<PendingItemRequest>,
) -> Result<(StatusCode, Json<PendingItemResponse>), ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let created = services.pending_items.create(body.into_item()?).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn update_pending_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<PendingItemRequest>,
) -> Result<Json<PendingItemResponse>, ApiError> {
    require_roles(&principal, ANY_ROLE)?;
    let id: PendingItemId = parse_id(&id)?;
    let updated = services.pending_items.update(id, body.into_item()?).await?;
    Ok(Json(updated.into()))
}

pub async fn delete_pending_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_roles(&principal, ADMIN_ONLY)?;
    let id: PendingItemId = parse_id(&id)?;
    services.pending_items.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
