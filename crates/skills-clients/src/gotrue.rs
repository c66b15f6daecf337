//! Client for a hosted GoTrue-compatible auth service.

use reqwest::{RequestBuilder, Response};
use serde_json::{Value, json};
use tracing::{error, warn};
use uuid::Uuid;

use skills_core::ports::{BoxFuture, IdentityProvider, SignIn};
use skills_core::{CoreError, CoreResult};
use skills_types::api::{AuthUser, Session};
use skills_types::models::Principal;

use crate::{endpoint_url, http_client};

const API_KEY_HEADER: &str = "apikey";

#[derive(Debug, Clone)]
pub struct GoTrueIdentity {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_key: Option<String>,
}

impl GoTrueIdentity {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http: http_client(),
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            service_key: None,
        }
    }

    /// Token checks go out with the service key when one is configured.
    pub fn with_service_key(mut self, service_key: Option<String>) -> Self {
        self.service_key = service_key.filter(|k| !k.trim().is_empty());
        self
    }

    fn post(&self, path: &str, body: Value) -> RequestBuilder {
        self.http
            .post(endpoint_url(&self.base_url, path))
            .header(API_KEY_HEADER, &self.anon_key)
            .json(&body)
    }

    async fn send(request: RequestBuilder, op: &str) -> CoreResult<(bool, Value)> {
        let response: Response = request.send().await.map_err(|e| {
            error!("auth provider {} transport error: {}", op, e);
            CoreError::Upstream("Auth service unavailable".into())
        })?;

        let status = response.status();
        if status.is_server_error() {
            let text = response.text().await.unwrap_or_default();
            error!("auth provider {} failed with {}: {}", op, status, text);
            return Err(CoreError::Upstream("Auth service error".into()));
        }

        // A rejection stays a rejection even when its body is not JSON.
        if !status.is_success() {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            return Ok((false, body));
        }

        let body = response.json::<Value>().await.map_err(|e| {
            error!("auth provider {} returned unreadable body: {}", op, e);
            CoreError::Upstream("Auth service returned an invalid response".into())
        })?;
        Ok((true, body))
    }

    async fn register(&self, email: &str, password: &str) -> CoreResult<AuthUser> {
        let request = self.post(
            "/auth/v1/signup",
            json!({ "email": email, "password": password }),
        );
        let (ok, body) = Self::send(request, "signup").await?;
        if !ok {
            let message = error_message(&body);
            warn!("signup rejected: {}", message);
            return Err(CoreError::InvalidArgument(message));
        }

        // With autoconfirm on, the user is nested next to a session.
        let user = body.get("user").unwrap_or(&body);
        parse_user(user).ok_or_else(|| {
            error!("signup response carried no user id");
            CoreError::Internal("Signup succeeded but no user id returned".into())
        })
    }

    async fn authenticate(&self, email: &str, password: &str) -> CoreResult<SignIn> {
        let request = self.post(
            "/auth/v1/token?grant_type=password",
            json!({ "email": email, "password": password }),
        );
        let (ok, body) = Self::send(request, "login").await?;
        if !ok {
            let message = error_message(&body);
            warn!("login rejected: {}", message);
            return Err(CoreError::InvalidArgument(message));
        }
        parse_sign_in(&body).ok_or_else(|| {
            error!("login response missing session fields");
            CoreError::Upstream("Auth service returned an invalid response".into())
        })
    }

    async fn lookup(&self, token: &str) -> CoreResult<Principal> {
        let key = self.service_key.as_deref().unwrap_or(&self.anon_key);
        let request = self
            .http
            .get(endpoint_url(&self.base_url, "/auth/v1/user"))
            .header(API_KEY_HEADER, key)
            .bearer_auth(token);

        let (ok, body) = Self::send(request, "get_user").await?;
        if !ok {
            return Err(CoreError::Unauthenticated("Invalid or expired token".into()));
        }
        parse_principal(&body)
            .ok_or_else(|| CoreError::Unauthenticated("Invalid or expired token".into()))
    }
}

impl IdentityProvider for GoTrueIdentity {
    fn sign_up<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, CoreResult<AuthUser>> {
        Box::pin(self.register(email, password))
    }

    fn sign_in_with_password<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, CoreResult<SignIn>> {
        Box::pin(self.authenticate(email, password))
    }

    fn get_user<'a>(&'a self, token: &'a str) -> BoxFuture<'a, CoreResult<Principal>> {
        Box::pin(self.lookup(token))
    }
}

fn parse_id(user: &Value) -> Option<Uuid> {
    user.get("id")?.as_str()?.parse().ok()
}

fn parse_user(user: &Value) -> Option<AuthUser> {
    Some(AuthUser {
        id: parse_id(user)?,
        email: user
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

fn parse_sign_in(body: &Value) -> Option<SignIn> {
    Some(SignIn {
        user: parse_user(body.get("user")?)?,
        session: Session {
            access_token: body.get("access_token")?.as_str()?.to_string(),
            token_type: body
                .get("token_type")
                .and_then(Value::as_str)
                .unwrap_or("bearer")
                .to_string(),
            expires_in: body.get("expires_in").and_then(Value::as_i64).unwrap_or(0),
        },
    })
}

/// `app_metadata.role` wins over the top-level JWT role.
fn parse_principal(user: &Value) -> Option<Principal> {
    let role = user
        .pointer("/app_metadata/role")
        .and_then(Value::as_str)
        .or_else(|| user.get("role").and_then(Value::as_str))
        .filter(|r| !r.is_empty())
        .unwrap_or(crate::local_auth::DEFAULT_ROLE);

    Some(Principal {
        user_id: parse_id(user)?,
        email: user.get("email").and_then(Value::as_str).map(str::to_string),
        role: role.to_string(),
    })
}

fn error_message(body: &Value) -> String {
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .unwrap_or("Auth request rejected")
        .to_string()
}
