//! TripMedia processing
//!
//! Pure functions over uploaded bytes: kind classification, photo tag decoding
//! and upload validation. Nothing here performs I/O.

pub mod classify;
#[cfg(all(feature = "image", any(test, feature = "test-helpers")))]
pub mod fixtures;
#[cfg(feature = "image")]
pub mod photo_tags;
pub mod validator;

pub use classify::{classify, detect_content_type, PHOTO_EXTENSIONS, VIDEO_EXTENSIONS};
#[cfg(feature = "image")]
pub use photo_tags::{decode_photo_tags, PhotoTags};
pub use validator::{UploadValidator, ValidationError};
