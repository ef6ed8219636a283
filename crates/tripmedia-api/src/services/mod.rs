//! Application services orchestrating the lower crates

pub mod media_lifecycle;
