use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::tweet::Tweet;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct TweetService {
    db: Db,
}

impl TweetService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(&self, author_id: Uuid, content: String) -> Result<Tweet> {
        let row = sqlx::query(
            "INSERT INTO tweets (author_id, content) VALUES ($1, $2) \
             RETURNING id, author_id, content, created_at",
        )
        .bind(author_id)
        .bind(content)
        .fetch_one(self.db.pool())
        .await?;

        Ok(Tweet {
            id: row.get("id"),
            author_id: row.get("author_id"),
            content: row.get("content"),
            created_at: row.get("created_at"),
        })
    }

    /// Flip the like state for `(user_id, tweet_id)` in one statement: the
    /// delete and the conditional insert see the same snapshot, and the
    /// primary key on likes arbitrates concurrent double-invocations. There
    /// is no read-then-write window here.
    pub async fn toggle_like(&self, user_id: Uuid, tweet_id: Uuid) -> Result<bool> {
        let row = sqlx::query(
            "WITH removed AS ( \
                DELETE FROM likes WHERE user_id = $1 AND tweet_id = $2 \
                RETURNING tweet_id \
             ), added AS ( \
                INSERT INTO likes (user_id, tweet_id) \
                SELECT $1, $2 \
                WHERE NOT EXISTS (SELECT 1 FROM removed) \
                ON CONFLICT (user_id, tweet_id) DO NOTHING \
                RETURNING tweet_id \
             ) \
             SELECT EXISTS (SELECT 1 FROM added) AS added_like",
        )
        .bind(user_id)
        .bind(tweet_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(row.get("added_like"))
    }
}
