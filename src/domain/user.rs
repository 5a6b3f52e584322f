use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A profile page view: user fields plus aggregate counts and the
/// viewer-dependent follow status. User provisioning is owned by the
/// external identity layer; this crate only reads user rows through here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub followers_count: i64,
    pub follows_count: i64,
    pub tweets_count: i64,
    pub is_following: bool,
}
