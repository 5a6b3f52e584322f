use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A tweet as persisted: immutable after creation, no delete path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetAuthor {
    pub id: Uuid,
    pub handle: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// A tweet as it appears in a feed page: joined with its author and the
/// viewer-dependent like fields. `liked_by_me` is always false for anonymous
/// viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedTweet {
    pub id: Uuid,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub like_count: i64,
    pub liked_by_me: bool,
    pub author: TweetAuthor,
}
