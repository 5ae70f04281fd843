pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod navigation;
pub mod routes;
pub mod services;
