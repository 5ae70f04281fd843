//! Course permission lookups.
//!
//! The dashboard asks a `PermissionService` which courses a user may view.
//! The in-memory store serves development and tests, and is seeded from
//! configuration at startup.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::GrantConfig;

/// Failure of the permissions backend itself.
#[derive(Debug, Clone, Error)]
pub enum PermissionsError {
    #[error("Failed to retrieve course permissions: {0}")]
    RetrievalFailed(String),
}

/// Answers which courses a user may access.
#[async_trait::async_trait]
pub trait PermissionService: Send + Sync {
    /// Course keys the user may access, sorted.
    async fn accessible_courses(&self, username: &str) -> Result<Vec<String>, PermissionsError>;

    /// Whether the user may access `course_id`.
    async fn has_permission(
        &self,
        username: &str,
        course_id: &str,
    ) -> Result<bool, PermissionsError> {
        let courses = self.accessible_courses(username).await?;
        Ok(courses.iter().any(|c| c == course_id))
    }
}

/// Permission store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    grants: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated from configured grants.
    ///
    /// Repeated entries for one username are merged.
    pub fn from_grants(grants: &[GrantConfig]) -> Self {
        let mut by_user: HashMap<String, BTreeSet<String>> = HashMap::new();
        for grant in grants {
            by_user
                .entry(grant.username.clone())
                .or_default()
                .extend(grant.courses.iter().cloned());
        }

        Self {
            grants: RwLock::new(by_user),
        }
    }

    pub async fn grant(&self, username: &str, course_id: &str) {
        let mut grants = self.grants.write().await;
        grants
            .entry(username.to_string())
            .or_default()
            .insert(course_id.to_string());
        info!(username = %username, course_id = %course_id, "Granted course permission");
    }

    /// Returns true if the grant existed.
    pub async fn revoke(&self, username: &str, course_id: &str) -> bool {
        let mut grants = self.grants.write().await;
        let removed = grants
            .get_mut(username)
            .map(|courses| courses.remove(course_id))
            .unwrap_or(false);
        if removed {
            info!(username = %username, course_id = %course_id, "Revoked course permission");
        }
        removed
    }

    pub async fn revoke_all(&self, username: &str) {
        self.grants.write().await.remove(username);
        info!(username = %username, "Revoked all course permissions");
    }
}

#[async_trait::async_trait]
impl PermissionService for InMemoryPermissionStore {
    async fn accessible_courses(&self, username: &str) -> Result<Vec<String>, PermissionsError> {
        let grants = self.grants.read().await;
        let courses: Vec<String> = grants
            .get(username)
            .map(|courses| courses.iter().cloned().collect())
            .unwrap_or_default();
        debug!(username = %username, count = courses.len(), "Loaded course permissions");
        Ok(courses)
    }

    async fn has_permission(
        &self,
        username: &str,
        course_id: &str,
    ) -> Result<bool, PermissionsError> {
        let grants = self.grants.read().await;
        Ok(grants
            .get(username)
            .map(|courses| courses.contains(course_id))
            .unwrap_or(false))
    }
}
