use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use skills_types::api::ProfileUpdate;
use skills_types::models::{Principal, Profile};

use crate::ports::ProfileStore;
use crate::{CoreError, CoreResult};

#[derive(Clone)]
pub struct Profiles {
    store: Arc<dyn ProfileStore>,
}

impl Profiles {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    pub async fn list_ids(&self) -> CoreResult<Vec<Uuid>> {
        self.store.list_profile_ids().await
    }

    pub async fn get(&self, caller: &Principal, id: Uuid) -> CoreResult<Profile> {
        ensure_owner_or_admin(caller, id)?;
        self.store
            .get_profile(id)
            .await?
            .ok_or_else(|| CoreError::not_found("User not found"))
    }

    pub async fn update(&self, caller: &Principal, id: Uuid, update: ProfileUpdate) -> CoreResult<Profile> {
        ensure_owner_or_admin(caller, id)?;
        if update.is_empty() {
            return Err(CoreError::invalid("No updatable fields provided"));
        }
        let profile = self
            .store
            .update_profile(id, update)
            .await?
            .ok_or_else(|| CoreError::not_found("Profile not found"))?;
        info!(profile_id = %id, "profile updated");
        Ok(profile)
    }

    /// Idempotent: deleting a missing profile still succeeds.
    pub async fn delete(&self, caller: &Principal, id: Uuid) -> CoreResult<()> {
        ensure_owner_or_admin(caller, id)?;
        if self.store.delete_profile(id).await? {
            info!(profile_id = %id, "profile deleted");
        }
        Ok(())
    }

    /// Skills for matching; no ownership check.
    pub async fn skills_of(&self, id: Uuid) -> CoreResult<Vec<String>> {
        self.store
            .get_profile(id)
            .await?
            .map(|p| p.skills)
            .ok_or_else(|| CoreError::not_found("User not found"))
    }
}

fn ensure_owner_or_admin(caller: &Principal, id: Uuid) -> CoreResult<()> {
    if caller.user_id == id || caller.is_admin() {
        Ok(())
    } else {
        Err(CoreError::forbidden("Forbidden"))
    }
}
