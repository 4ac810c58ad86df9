//! Application persistence.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::application::{StoredApplication, TeamApplication};
use crate::error::ApplyError;

/// Append-only store of submitted applications.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Persist an application and return its id.
    async fn save(
        &self,
        application: &TeamApplication,
        submitted_at: i64,
    ) -> Result<String, ApplyError>;

    /// All applications, oldest first.
    async fn list(&self) -> Result<Vec<StoredApplication>, ApplyError>;
}

#[async_trait]
impl<S: ApplicationStore + ?Sized> ApplicationStore for Arc<S> {
    #[inline]
    async fn save(
        &self,
        application: &TeamApplication,
        submitted_at: i64,
    ) -> Result<String, ApplyError> {
        (**self).save(application, submitted_at).await
    }

    #[inline]
    async fn list(&self) -> Result<Vec<StoredApplication>, ApplyError> {
        (**self).list().await
    }
}

/// Process-local application store.
#[derive(Debug, Default)]
pub struct MemoryApplications {
    items: RwLock<Vec<StoredApplication>>,
}

impl MemoryApplications {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplications {
    async fn save(
        &self,
        application: &TeamApplication,
        submitted_at: i64,
    ) -> Result<String, ApplyError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.items.write().push(StoredApplication {
            id: id.clone(),
            submitted_at,
            application: application.clone(),
        });
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<StoredApplication>, ApplyError> {
        let mut items = self.items.read().clone();
        items.sort_by_key(|a| a.submitted_at);
        Ok(items)
    }
}
