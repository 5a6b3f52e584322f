use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::user::Profile;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct ProfileService {
    db: Db,
}

impl ProfileService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn get_profile(&self, user_id: Uuid, viewer_id: Option<Uuid>) -> Result<Option<Profile>> {
        let row = sqlx::query(
            "SELECT u.id, u.handle, u.display_name, u.avatar_url, u.created_at, \
                (SELECT COUNT(*) FROM follows WHERE followee_id = u.id) AS followers_count, \
                (SELECT COUNT(*) FROM follows WHERE follower_id = u.id) AS follows_count, \
                (SELECT COUNT(*) FROM tweets WHERE author_id = u.id) AS tweets_count, \
                EXISTS ( \
                    SELECT 1 FROM follows WHERE follower_id = $2 AND followee_id = u.id \
                ) AS is_following \
             FROM users u WHERE u.id = $1",
        )
        .bind(user_id)
        .bind(viewer_id)
        .fetch_optional(self.db.pool())
        .await?;

        let profile = row.map(|row| Profile {
            id: row.get("id"),
            handle: row.get("handle"),
            display_name: row.get("display_name"),
            avatar_url: row.get("avatar_url"),
            created_at: row.get("created_at"),
            followers_count: row.get("followers_count"),
            follows_count: row.get("follows_count"),
            tweets_count: row.get("tweets_count"),
            is_following: row.get("is_following"),
        });

        Ok(profile)
    }

    /// Flip the follow state for `(follower_id, followee_id)` in one
    /// statement, same shape as the like toggle: the follows primary key is
    /// the source of the at-most-one-row invariant.
    pub async fn toggle_follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool> {
        let row = sqlx::query(
            "WITH removed AS ( \
                DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2 \
                RETURNING followee_id \
             ), added AS ( \
                INSERT INTO follows (follower_id, followee_id) \
                SELECT $1, $2 \
                WHERE NOT EXISTS (SELECT 1 FROM removed) \
                ON CONFLICT (follower_id, followee_id) DO NOTHING \
                RETURNING followee_id \
             ) \
             SELECT EXISTS (SELECT 1 FROM added) AS added_follow",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(row.get("added_follow"))
    }
}
