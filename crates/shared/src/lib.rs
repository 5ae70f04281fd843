//! Shared utilities for the Course Insights backend.
//!
//! This crate provides functionality used across the other crates:
//! - Course key validation (current and deprecated formats)
//! - JWT verification for dashboard users

pub mod jwt;
pub mod validation;
