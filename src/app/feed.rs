use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::tweet::{FeedTweet, TweetAuthor};
use crate::infra::db::Db;

/// Keyset-paginated feed queries. All feeds share the same strict total
/// order, `(created_at DESC, id DESC)`, so walking a cursor never skips or
/// repeats a tweet even while new rows are being inserted.
#[derive(Clone)]
pub struct FeedService {
    db: Db,
}

const FEED_COLUMNS: &str = "t.id, t.content, t.created_at, \
     u.id AS author_id, u.handle AS author_handle, \
     u.display_name AS author_display_name, u.avatar_url AS author_avatar_url, \
     (SELECT COUNT(*) FROM likes l WHERE l.tweet_id = t.id) AS like_count, \
     EXISTS (SELECT 1 FROM likes l WHERE l.tweet_id = t.id AND l.user_id = $1) AS liked_by_me";

impl FeedService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// The global feed: every tweet, newest first. Callers pass `limit + 1`
    /// worth of appetite via `page`; the extra row, if present, becomes the
    /// next cursor.
    pub async fn recent(
        &self,
        viewer_id: Option<Uuid>,
        cursor: Option<(OffsetDateTime, Uuid)>,
        limit: i64,
    ) -> Result<(Vec<FeedTweet>, Option<(OffsetDateTime, Uuid)>)> {
        let limit_plus = limit + 1;
        let rows = match cursor {
            Some((created_at, tweet_id)) => {
                sqlx::query(&format!(
                    "SELECT {FEED_COLUMNS} \
                     FROM tweets t \
                     JOIN users u ON u.id = t.author_id \
                     WHERE (t.created_at < $2 OR (t.created_at = $2 AND t.id < $3)) \
                     ORDER BY t.created_at DESC, t.id DESC \
                     LIMIT $4",
                ))
                .bind(viewer_id)
                .bind(created_at)
                .bind(tweet_id)
                .bind(limit_plus)
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {FEED_COLUMNS} \
                     FROM tweets t \
                     JOIN users u ON u.id = t.author_id \
                     ORDER BY t.created_at DESC, t.id DESC \
                     LIMIT $2",
                ))
                .bind(viewer_id)
                .bind(limit_plus)
                .fetch_all(self.db.pool())
                .await?
            }
        };

        Ok(page(rows, limit))
    }

    /// The following-only feed: tweets authored by accounts the viewer
    /// follows. The viewer's own tweets are not included.
    pub async fn following(
        &self,
        viewer_id: Uuid,
        cursor: Option<(OffsetDateTime, Uuid)>,
        limit: i64,
    ) -> Result<(Vec<FeedTweet>, Option<(OffsetDateTime, Uuid)>)> {
        let limit_plus = limit + 1;
        let rows = match cursor {
            Some((created_at, tweet_id)) => {
                sqlx::query(&format!(
                    "SELECT {FEED_COLUMNS} \
                     FROM tweets t \
                     JOIN users u ON u.id = t.author_id \
                     WHERE t.author_id IN ( \
                         SELECT followee_id FROM follows WHERE follower_id = $1 \
                     ) \
                       AND (t.created_at < $2 OR (t.created_at = $2 AND t.id < $3)) \
                     ORDER BY t.created_at DESC, t.id DESC \
                     LIMIT $4",
                ))
                .bind(viewer_id)
                .bind(created_at)
                .bind(tweet_id)
                .bind(limit_plus)
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {FEED_COLUMNS} \
                     FROM tweets t \
                     JOIN users u ON u.id = t.author_id \
                     WHERE t.author_id IN ( \
                         SELECT followee_id FROM follows WHERE follower_id = $1 \
                     ) \
                     ORDER BY t.created_at DESC, t.id DESC \
                     LIMIT $2",
                ))
                .bind(viewer_id)
                .bind(limit_plus)
                .fetch_all(self.db.pool())
                .await?
            }
        };

        Ok(page(rows, limit))
    }

    /// A single user's tweets, for the profile page feed. An unknown author
    /// yields an empty page, not an error.
    pub async fn by_author(
        &self,
        author_id: Uuid,
        viewer_id: Option<Uuid>,
        cursor: Option<(OffsetDateTime, Uuid)>,
        limit: i64,
    ) -> Result<(Vec<FeedTweet>, Option<(OffsetDateTime, Uuid)>)> {
        let limit_plus = limit + 1;
        let rows = match cursor {
            Some((created_at, tweet_id)) => {
                sqlx::query(&format!(
                    "SELECT {FEED_COLUMNS} \
                     FROM tweets t \
                     JOIN users u ON u.id = t.author_id \
                     WHERE t.author_id = $2 \
                       AND (t.created_at < $3 OR (t.created_at = $3 AND t.id < $4)) \
                     ORDER BY t.created_at DESC, t.id DESC \
                     LIMIT $5",
                ))
                .bind(viewer_id)
                .bind(author_id)
                .bind(created_at)
                .bind(tweet_id)
                .bind(limit_plus)
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {FEED_COLUMNS} \
                     FROM tweets t \
                     JOIN users u ON u.id = t.author_id \
                     WHERE t.author_id = $2 \
                     ORDER BY t.created_at DESC, t.id DESC \
                     LIMIT $3",
                ))
                .bind(viewer_id)
                .bind(author_id)
                .bind(limit_plus)
                .fetch_all(self.db.pool())
                .await?
            }
        };

        Ok(page(rows, limit))
    }
}

fn page(rows: Vec<PgRow>, limit: i64) -> (Vec<FeedTweet>, Option<(OffsetDateTime, Uuid)>) {
    let mut tweets: Vec<FeedTweet> = rows.iter().map(feed_tweet_from_row).collect();

    let next_cursor = if tweets.len() > limit as usize {
        tweets.pop().map(|extra| (extra.created_at, extra.id))
    } else {
        None
    };

    (tweets, next_cursor)
}

fn feed_tweet_from_row(row: &PgRow) -> FeedTweet {
    FeedTweet {
        id: row.get("id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        like_count: row.get("like_count"),
        liked_by_me: row.get("liked_by_me"),
        author: TweetAuthor {
            id: row.get("author_id"),
            handle: row.get("author_handle"),
            display_name: row.get("author_display_name"),
            avatar_url: row.get("author_avatar_url"),
        },
    }
}
