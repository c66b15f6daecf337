use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{error, warn};
use uuid::Uuid;

use skills_core::ports::{AccountStore, BoxFuture, IdentityProvider, SignIn};
use skills_core::{CoreError, CoreResult};
use skills_types::api::{AuthUser, Claims, Session};
use skills_types::models::{Account, Principal};

pub const TOKEN_TTL_DAYS: i64 = 30;
pub const DEFAULT_ROLE: &str = "authenticated";

const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// Built-in identity provider: argon2id password hashes in the account store
/// and HS256 access tokens.
pub struct LocalIdentity {
    accounts: Arc<dyn AccountStore>,
    jwt_secret: String,
}

impl LocalIdentity {
    pub fn new(accounts: Arc<dyn AccountStore>, jwt_secret: impl Into<String>) -> Self {
        Self {
            accounts,
            jwt_secret: jwt_secret.into(),
        }
    }

    pub fn issue_token(&self, user_id: Uuid, email: &str, role: &str) -> CoreResult<String> {
        sign_token(&self.jwt_secret, user_id, email, role)
    }

    async fn register(&self, email: &str, password: &str) -> CoreResult<AuthUser> {
        // Hash password with Argon2id
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                error!("password hashing failed: {}", e);
                CoreError::Internal("failed to hash password".into())
            })?
            .to_string();

        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now(),
        };
        let user = AuthUser {
            id: account.id,
            email: account.email.clone(),
        };

        if !self.accounts.insert_account(account).await? {
            return Err(CoreError::invalid("User already registered"));
        }
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> CoreResult<SignIn> {
        let account = self
            .accounts
            .find_account_by_email(email)
            .await?
            .ok_or_else(|| CoreError::invalid(INVALID_CREDENTIALS))?;

        let parsed_hash = PasswordHash::new(&account.password_hash).map_err(|e| {
            error!(account_id = %account.id, "stored password hash is unreadable: {}", e);
            CoreError::Internal("corrupt credentials".into())
        })?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| CoreError::invalid(INVALID_CREDENTIALS))?;

        let access_token = self.issue_token(account.id, &account.email, DEFAULT_ROLE)?;
        Ok(SignIn {
            user: AuthUser {
                id: account.id,
                email: account.email,
            },
            session: Session {
                access_token,
                token_type: "bearer".into(),
                expires_in: TOKEN_TTL_DAYS * 24 * 60 * 60,
            },
        })
    }

    fn verify(&self, token: &str) -> CoreResult<Principal> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            warn!("rejected access token: {}", e);
            CoreError::Unauthenticated("Invalid or expired token".into())
        })?;

        let claims = token_data.claims;
        Ok(Principal {
            user_id: claims.sub,
            email: Some(claims.email),
            role: claims.role,
        })
    }
}

/// Signs an HS256 access token for `role`. The `skills mint-token` command
/// uses this to issue `admin` and `service_role` tokens without a login.
pub fn sign_token(jwt_secret: &str, user_id: Uuid, email: &str, role: &str) -> CoreResult<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role: role.to_string(),
        exp: (Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        error!("failed to sign access token: {}", e);
        CoreError::Internal("failed to issue token".into())
    })
}

impl IdentityProvider for LocalIdentity {
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
        Box::pin(async move { self.verify(token) })
    }
}
