use std::sync::Arc;
use std::time::Duration;
use tripmedia_core::models::{MediaAsset, Visibility};
use tripmedia_core::AppError;
use tripmedia_db::FriendshipStore;

/// Decides whether a requester may read an asset.
///
/// - `PUBLIC`: always
/// - `PRIVATE`: owner only
/// - `FRIENDS`: owner, or a friend of the owner
///
/// The owner check runs before the friendship lookup. A lookup that fails or
/// exceeds the timeout denies access.
#[derive(Clone)]
pub struct VisibilityPolicy {
    friendships: Arc<dyn FriendshipStore>,
    timeout: Duration,
}

impl VisibilityPolicy {
    pub fn new(friendships: Arc<dyn FriendshipStore>, timeout: Duration) -> Self {
        Self {
            friendships,
            timeout,
        }
    }

    pub async fn is_authorized(
        &self,
        visibility: Visibility,
        owner_id: i64,
        requester_id: i64,
    ) -> bool {
        match visibility {
            Visibility::Public => true,
            Visibility::Private => requester_id == owner_id,
            Visibility::Friends => {
                if requester_id == owner_id {
                    return true;
                }
                self.check_friendship(owner_id, requester_id).await
            }
        }
    }

    /// [`Self::is_authorized`] for a loaded asset, as a `NotAuthorized` error on denial
    pub async fn authorize(&self, asset: &MediaAsset, requester_id: i64) -> Result<(), AppError> {
        if self
            .is_authorized(asset.visibility, asset.user_id, requester_id)
            .await
        {
            Ok(())
        } else {
            Err(AppError::NotAuthorized(format!(
                "media {} is not visible to user {}",
                asset.id, requester_id
            )))
        }
    }

    async fn check_friendship(&self, owner_id: i64, requester_id: i64) -> bool {
        match tokio::time::timeout(
            self.timeout,
            self.friendships.are_friends(owner_id, requester_id),
        )
        .await
        {
            Ok(Ok(are_friends)) => are_friends,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, owner_id, requester_id, "Friendship check failed, denying");
                false
            }
            Err(_) => {
                tracing::warn!(
                    owner_id,
                    requester_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Friendship check timed out, denying"
                );
                false
            }
        }
    }
}
