pub mod health;
pub mod media_delete;
pub mod media_get;
pub mod media_metadata;
pub mod media_upload;
pub mod media_visibility;
