//! JSON body extractor that runs `validator` rules before the handler sees the value.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::app::errors::{ApiError, FieldError, DATE_FORMAT_MESSAGE};

const GENERIC_BODY_MESSAGE: &str = "Dados inválidos no corpo da requisição";

/// Fragments of chrono's parse errors, as surfaced through serde.
const DATE_PARSE_HINTS: [&str; 6] = [
    "input contains invalid characters",
    "premature end of input",
    "trailing input",
    "input is out of range",
    "input is not enough for unique date and time",
    "no possible date and time matching input",
];

/// `Json<T>` plus field validation; every failure becomes an [`ApiError`].
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        value
            .validate()
            .map_err(|errors| ApiError::Validation(field_errors(&errors)))?;
        Ok(Self(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    let detail = rejection.body_text();
    tracing::debug!(%detail, "rejected request body");
    ApiError::MalformedBody(body_message(&detail).to_string())
}

fn body_message(detail: &str) -> &'static str {
    if DATE_PARSE_HINTS.iter().any(|hint| detail.contains(hint)) {
        DATE_FORMAT_MESSAGE
    } else {
        GENERIC_BODY_MESSAGE
    }
}

/// One entry per rejected field (its first message), ordered by field name.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| FieldError {
            campo: camel_case(field),
            mensagem: errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Valor inválido".to_string()),
        })
        .collect();
    fields.sort_by(|a, b| a.campo.cmp(&b.campo));
    fields
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
