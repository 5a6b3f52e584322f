use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::user::Profile;

/// Locally cached profile snapshots, keyed by user id. A follow toggle
/// patches the target's follower count and follow status, and the viewer's
/// own follow count when their profile happens to be cached too.
#[derive(Debug, Clone, Default)]
pub struct ProfileCache {
    profiles: HashMap<Uuid, Arc<Profile>>,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: Uuid) -> Option<&Arc<Profile>> {
        self.profiles.get(&user_id)
    }

    pub fn with_profile(&self, profile: Profile) -> ProfileCache {
        let mut profiles = self.profiles.clone();
        profiles.insert(profile.id, Arc::new(profile));
        ProfileCache { profiles }
    }

    pub fn apply_follow_toggle(
        &self,
        viewer_id: Uuid,
        target_id: Uuid,
        added_follow: bool,
    ) -> ProfileCache {
        let delta = if added_follow { 1 } else { -1 };
        let mut profiles = self.profiles.clone();

        if let Some(target) = profiles.get(&target_id) {
            let mut patched = Profile::clone(target);
            patched.followers_count += delta;
            patched.is_following = added_follow;
            profiles.insert(target_id, Arc::new(patched));
        }

        if let Some(viewer) = profiles.get(&viewer_id) {
            let mut patched = Profile::clone(viewer);
            patched.follows_count += delta;
            profiles.insert(viewer_id, Arc::new(patched));
        }

        ProfileCache { profiles }
    }
}
