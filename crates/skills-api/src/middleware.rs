use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;

use skills_core::CoreError;

use crate::error::ApiError;
use crate::state::AppState;

const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Resolve the bearer token (or `access_token` cookie) through the identity
/// provider and attach the resulting `Principal` to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = access_token(req.headers())
        .ok_or_else(|| CoreError::Unauthenticated("Missing auth token".into()))?;

    let principal = state.identity.get_user(&token).await?;
    debug!(user_id = %principal.user_id, "request authenticated");

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

fn access_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .or_else(|| {
            CookieJar::from_headers(headers)
                .get(ACCESS_TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_string())
        })
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), value.parse().unwrap());
        }
        map
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "access_token=from-cookie"),
        ]);
        assert_eq!(access_token(&map).as_deref(), Some("from-header"));
    }

    #[test]
    fn cookie_is_used_without_a_bearer_header() {
        let map = headers(&[
            (header::AUTHORIZATION, "Basic dXNlcjpwYXNz"),
            (header::COOKIE, "theme=dark; access_token=from-cookie"),
        ]);
        assert_eq!(access_token(&map).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn nothing_usable_means_no_token() {
        assert_eq!(access_token(&HeaderMap::new()), None);
        let map = headers(&[(header::COOKIE, "access_token=")]);
        assert_eq!(access_token(&map), None);
    }
}
