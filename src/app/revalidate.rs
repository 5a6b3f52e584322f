use anyhow::Result;
use uuid::Uuid;

use crate::infra::cache::RedisCache;

/// Queue key the static-page host consumes; each entry is a path whose
/// rendered page must be regenerated.
pub const REVALIDATE_QUEUE_KEY: &str = "revalidate:paths";

/// Hands page-regeneration work to the hosting layer. A follow toggle
/// changes the rendered profile pages of both parties, so both paths are
/// enqueued and any cached rendering is dropped.
#[derive(Clone)]
pub struct Revalidator {
    cache: RedisCache,
}

impl Revalidator {
    pub fn new(cache: RedisCache) -> Self {
        Self { cache }
    }

    pub async fn profile_changed(&self, user_ids: &[Uuid]) -> Result<()> {
        for user_id in user_ids {
            let path = profile_path(*user_id);
            self.cache.push_list(REVALIDATE_QUEUE_KEY, &path).await?;
            self.cache.delete(&page_cache_key(*user_id)).await?;
            tracing::info!(user_id = %user_id, path = %path, "queued profile revalidation");
        }
        Ok(())
    }
}

pub fn profile_path(user_id: Uuid) -> String {
    format!("/profiles/{}", user_id)
}

fn page_cache_key(user_id: Uuid) -> String {
    format!("page:profile:{}", user_id)
}
