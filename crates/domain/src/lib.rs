//! Domain layer for the Course Insights backend.
//!
//! This crate contains:
//! - Analytics models (engagement activity, enrollment, geography)
//! - The `AnalyticsClient` port used to reach the analytics data API
//! - Presenters that shape raw API data into view-ready summaries and trends

pub mod models;
pub mod services;
