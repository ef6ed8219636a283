//! Database repositories for the data access layer
//!
//! Each repository owns one table and implements the matching store trait from
//! [`traits`], so services can be exercised against in-memory stores.
//
// Store traits
pub mod traits;
//
// Postgres repositories
pub mod friendship;
pub mod media;
pub mod place;
//
// In-memory stores for tests
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use friendship::FriendshipRepository;
pub use media::MediaRepository;
pub use place::PlaceRepository;
pub use traits::{FriendshipStore, MediaStore, PlaceStore};
