//! TripMedia database layer
//!
//! sqlx repositories over Postgres, and the store traits the services depend on.

pub mod db;

pub use db::*;
