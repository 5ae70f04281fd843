//! HTTP route handlers.

pub mod courses;
pub mod health;
