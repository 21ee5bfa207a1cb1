use crate::error::HealthCheckError;
use crate::models::{Target, UpdateTargetRequest};
use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

/// Keyed storage of target configuration. The probe engine only reads from it.
#[async_trait]
pub trait TargetStore: Send + Sync {
    async fn put(&self, target: Target);

    async fn get(&self, id: Uuid) -> Option<Target>;

    async fn list(&self) -> Vec<Target>;

    async fn ids(&self) -> Vec<Uuid>;

    /// Applies a partial update atomically. The merged target must pass
    /// validation, otherwise the stored one is left untouched.
    async fn update(
        &self,
        id: Uuid,
        update: UpdateTargetRequest,
    ) -> Result<Target, HealthCheckError>;

    async fn delete(&self, id: Uuid) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemoryTargetStore {
    targets: DashMap<Uuid, Target>,
}

impl InMemoryTargetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TargetStore for InMemoryTargetStore {
    async fn put(&self, target: Target) {
        self.targets.insert(target.id, target);
    }

    async fn get(&self, id: Uuid) -> Option<Target> {
        self.targets.get(&id).map(|target| target.clone())
    }

    async fn list(&self) -> Vec<Target> {
        self.targets.iter().map(|entry| entry.value().clone()).collect()
    }

    async fn ids(&self) -> Vec<Uuid> {
        self.targets.iter().map(|entry| *entry.key()).collect()
    }

    async fn update(
        &self,
        id: Uuid,
        update: UpdateTargetRequest,
    ) -> Result<Target, HealthCheckError> {
        let mut entry = self
            .targets
            .get_mut(&id)
            .ok_or(HealthCheckError::NotFound(id))?;

        let mut merged = entry.clone();
        merged.apply_update(update);
        merged.validate()?;

        *entry = merged.clone();
        Ok(merged)
    }

    async fn delete(&self, id: Uuid) -> bool {
        self.targets.remove(&id).is_some()
    }
}
