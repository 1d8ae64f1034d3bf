//! Consistent JSON error responses.
//!
//! Every failure leaves the API as an [`ErrorBody`]. Handlers return
//! `Result<_, ApiError>`; the request path is filled in afterwards by
//! [`stamp_error_path`], since the error itself does not know where it was raised.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::Serialize;
use thiserror::Error;

use verdicomply_core::DomainError;
use verdicomply_infra::{IntegrityKind, StoreError};

use crate::app::services::ServiceError;

pub const DATE_FORMAT_MESSAGE: &str = "Formato de data inválido. Use o formato: YYYY-MM-DD";

/// One rejected field of a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub campo: String,
    pub mensagem: String,
}

/// Wire format of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// `dd/MM/yyyy HH:mm:ss`, server local time.
    pub timestamp: String,
    pub status: u16,
    pub erro: String,
    pub mensagem: String,
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub campos: Vec<FieldError>,
}

impl ErrorBody {
    fn into_response_with_path(mut self, path: String) -> Response {
        self.path = path;
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("unreadable body: {0}")]
    MalformedBody(String),

    #[error("integrity violation ({0:?})")]
    Integrity(IntegrityKind),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("missing or invalid token")]
    Unauthenticated,

    #[error("forbidden")]
    Forbidden,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_)
            | ApiError::MalformedBody(_)
            | ApiError::Integrity(_)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let (erro, mensagem, campos) = match self {
            ApiError::NotFound(msg) => ("Recurso não encontrado", msg.clone(), Vec::new()),
            ApiError::Validation(fields) => (
                "Erro de validação",
                "Um ou mais campos estão inválidos".to_string(),
                fields.clone(),
            ),
            ApiError::MalformedBody(msg) => ("Erro de formato de dados", msg.clone(), Vec::new()),
            ApiError::Integrity(kind) => ("Violação de integridade", integrity_message(*kind).to_string(), Vec::new()),
            ApiError::BadRequest(msg) => ("Requisição inválida", msg.clone(), Vec::new()),
            ApiError::Unauthenticated => (
                "Não autorizado",
                "Token de autenticação ausente ou inválido".to_string(),
                Vec::new(),
            ),
            ApiError::Forbidden => (
                "Acesso negado",
                "Você não tem permissão para acessar este recurso".to_string(),
                Vec::new(),
            ),
            ApiError::Internal(_) => (
                "Erro interno do servidor",
                "Ocorreu um erro inesperado. Por favor, tente novamente mais tarde.".to_string(),
                Vec::new(),
            ),
        };

        ErrorBody {
            timestamp: Local::now().format("%d/%m/%Y %H:%M:%S").to_string(),
            status: self.status().as_u16(),
            erro: erro.to_string(),
            mensagem,
            path: String::new(),
            campos,
        }
    }
}

fn integrity_message(kind: IntegrityKind) -> &'static str {
    match kind {
        IntegrityKind::ForeignKey => {
            "Não é possível excluir este registro pois existem outros registros vinculados a ele"
        }
        IntegrityKind::Unique => "Já existe um registro com estes dados",
        IntegrityKind::Other => "Operação violou uma restrição do banco de dados",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(error = %detail, "unexpected failure while handling request");
        }

        let body = self.body();
        let mut response = (self.status(), Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Re-render error responses with the path of the request that produced them.
pub async fn stamp_error_path(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;
    match response.extensions_mut().remove::<ErrorBody>() {
        Some(body) => body.into_response_with_path(path),
        None => response,
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Conflict(msg) => ApiError::BadRequest(msg),
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ApiError::BadRequest(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Integrity(kind) => ApiError::Integrity(kind),
            StoreError::NotFound => ApiError::NotFound("Registro não encontrado".to_string()),
            StoreError::Backend(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => e.into(),
            ServiceError::Store(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Parse a path segment into a typed id, rejecting non-numeric input.
pub fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: std::str::FromStr<Err = DomainError>,
{
    raw.parse::<T>()
        .map_err(|_| ApiError::BadRequest(format!("Identificador inválido: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdicomply_core::AuditId;

    #[test]
    fn integrity_kinds_have_distinct_messages() {
        let fk = ApiError::Integrity(IntegrityKind::ForeignKey).body();
        assert_eq!(fk.status, 400);
        assert_eq!(fk.erro, "Violação de integridade");
        assert!(fk.mensagem.starts_with("Não é possível excluir"));

        let unique = ApiError::Integrity(IntegrityKind::Unique).body();
        assert_eq!(unique.mensagem, "Já existe um registro com estes dados");
    }

    #[test]
    fn internal_errors_hide_details() {
        let body = ApiError::Internal("connection refused".to_string()).body();
        assert_eq!(body.status, 500);
        assert!(!body.mensagem.contains("connection refused"));
    }

    #[test]
    fn timestamp_uses_brazilian_layout() {
        let body = ApiError::Forbidden.body();
        let parsed = chrono::NaiveDateTime::parse_from_str(&body.timestamp, "%d/%m/%Y %H:%M:%S");
        assert!(parsed.is_ok(), "unexpected timestamp {}", body.timestamp);
    }

    #[test]
    fn validation_body_lists_fields() {
        let body = ApiError::Validation(vec![FieldError {
            campo: "auditorResponsavel".to_string(),
            mensagem: "O auditor responsável é obrigatório".to_string(),
        }])
        .body();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["campos"][0]["campo"], "auditorResponsavel");
        assert_eq!(json["erro"], "Erro de validação");
    }

    #[test]
    fn domain_errors_map_to_http_semantics() {
        assert_eq!(
            ApiError::from(DomainError::not_found("Auditoria não encontrada")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DomainError::conflict("Nome de usuário já existe")).status(),
            StatusCode::BAD_REQUEST
        );
        assert!(parse_id::<AuditId>("12").is_ok());
        assert!(matches!(parse_id::<AuditId>("x"), Err(ApiError::BadRequest(_))));
    }
}
