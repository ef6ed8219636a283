use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tripmedia_core::AppError;

use super::traits::FriendshipStore;

/// Read-only view over the `friendships` table owned by the social service
#[derive(Clone)]
pub struct FriendshipRepository {
    pool: PgPool,
}

impl FriendshipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendshipStore for FriendshipRepository {
    #[tracing::instrument(skip(self), fields(db.table = "friendships", db.operation = "select"))]
    async fn are_friends(&self, user_id: i64, other_id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM friendships
                WHERE (user_id = $1 AND friend_id = $2)
                   OR (user_id = $2 AND friend_id = $1)
            )
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
