use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use skills_types::models::Profile;

use crate::ports::{IdentityProvider, ProfileStore, SignIn};
use crate::{CoreError, CoreResult};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Signup and login on top of the identity provider. Signup also seeds the
/// user's profile row.
#[derive(Clone)]
pub struct Accounts {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
}

impl Accounts {
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { identity, profiles }
    }

    pub async fn sign_up(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        full_name: Option<&str>,
    ) -> CoreResult<Uuid> {
        let (email, password) = required_credentials(email, password)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CoreError::invalid(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        if !email.contains('@') || !email.contains('.') {
            return Err(CoreError::invalid("Invalid email format"));
        }

        let user = self.identity.sign_up(email, password).await?;

        let name = full_name.map(str::trim).unwrap_or_default();
        // The account exists at this point; a missing profile row is not
        // worth failing the signup over.
        if let Err(e) = self
            .profiles
            .upsert_profile(Profile::new(user.id, email, name))
            .await
        {
            error!(user_id = %user.id, "failed to create profile at signup: {}", e);
        }

        info!(user_id = %user.id, "user signed up");
        Ok(user.id)
    }

    pub async fn log_in(&self, email: Option<&str>, password: Option<&str>) -> CoreResult<SignIn> {
        let (email, password) = required_credentials(email, password)?;
        let sign_in = self.identity.sign_in_with_password(email, password).await?;
        info!(user_id = %sign_in.user.id, "user logged in");
        Ok(sign_in)
    }
}

fn required_credentials<'a>(
    email: Option<&'a str>,
    password: Option<&'a str>,
) -> CoreResult<(&'a str, &'a str)> {
    match (
        email.filter(|e| !e.is_empty()),
        password.filter(|p| !p.is_empty()),
    ) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(CoreError::invalid("Email and password are required")),
    }
}
