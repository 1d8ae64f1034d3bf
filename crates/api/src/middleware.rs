use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use verdicomply_auth::JwtValidator;

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub header: HeaderName,
    pub prefix: String,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers(), &state.header, &state.prefix)
        .ok_or(ApiError::Unauthenticated)?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        tracing::warn!(error = %e, path = %req.uri().path(), "rejected token");
        ApiError::Unauthenticated
    })?;

    req.extensions_mut()
        .insert(PrincipalContext::new(claims.sub, claims.roles));

    Ok(next.run(req).await)
}

fn extract_bearer<'a>(headers: &'a HeaderMap, header: &HeaderName, prefix: &str) -> Option<&'a str> {
    let value = headers.get(header)?.to_str().ok()?;
    let token = value.strip_prefix(prefix)?.trim();
    if token.is_empty() {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, HeaderValue};

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn extracts_token_after_prefix() {
        let map = headers("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&map, &AUTHORIZATION, "Bearer "), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_prefix_or_empty_token() {
        assert_eq!(extract_bearer(&headers("Basic xyz"), &AUTHORIZATION, "Bearer "), None);
        assert_eq!(extract_bearer(&headers("Bearer   "), &AUTHORIZATION, "Bearer "), None);
        assert_eq!(extract_bearer(&HeaderMap::new(), &AUTHORIZATION, "Bearer "), None);
    }

    #[test]
    fn honours_custom_prefix() {
        let map = headers("Token abc");
        assert_eq!(extract_bearer(&map, &AUTHORIZATION, "Token "), Some("abc"));
    }
}
