//! In-memory persistence backend. Mutations land in a single entity table
//! and every change is re-broadcast as a full snapshot, matching the hosted
//! backend's sync contract.

use std::sync::Arc;

use async_trait::async_trait;
use dashboard_core::DataBackend;
use shared::{domain::EntityId, envelope::EntityEnvelope, error::PersistenceError};
use tokio::sync::{broadcast, Mutex};
use tracing::debug;
use uuid::Uuid;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

#[derive(Default)]
struct BackendState {
    entities: Vec<EntityEnvelope>,
}

pub struct InMemoryDataBackend {
    inner: Mutex<BackendState>,
    snapshots: broadcast::Sender<Vec<EntityEnvelope>>,
}

impl InMemoryDataBackend {
    pub fn new() -> Arc<Self> {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Arc::new(Self {
            inner: Mutex::new(BackendState::default()),
            snapshots,
        })
    }
}

#[async_trait]
impl DataBackend for InMemoryDataBackend {
    async fn init(&self) -> Result<broadcast::Receiver<Vec<EntityEnvelope>>, PersistenceError> {
        let inner = self.inner.lock().await;
        let rx = self.snapshots.subscribe();
        // The fresh subscriber needs the current state up front; earlier
        // subscribers just see a duplicate full snapshot.
        let _ = self.snapshots.send(inner.entities.clone());
        Ok(rx)
    }

    async fn create(&self, mut envelope: EntityEnvelope) -> Result<EntityEnvelope, PersistenceError> {
        let id = EntityId::new(Uuid::new_v4().to_string());
        envelope.entity_id = Some(id.clone());

        let mut inner = self.inner.lock().await;
        inner.entities.push(envelope.clone());
        debug!(id = %id, kind = %envelope.kind, "entity created");
        let _ = self.snapshots.send(inner.entities.clone());
        Ok(envelope)
    }

    async fn update(&self, envelope: EntityEnvelope) -> Result<EntityEnvelope, PersistenceError> {
        let id = envelope
            .entity_id
            .clone()
            .ok_or_else(|| PersistenceError::backend("update without an entity id"))?;

        let mut inner = self.inner.lock().await;
        let slot = inner
            .entities
            .iter_mut()
            .find(|entity| entity.entity_id.as_ref() == Some(&id))
            .ok_or_else(|| PersistenceError::backend(format!("unknown entity {id}")))?;
        *slot = envelope.clone();
        debug!(id = %id, "entity updated");
        let _ = self.snapshots.send(inner.entities.clone());
        Ok(envelope)
    }

    async fn delete(&self, envelope: EntityEnvelope) -> Result<(), PersistenceError> {
        let id = envelope
            .entity_id
            .ok_or_else(|| PersistenceError::backend("delete without an entity id"))?;

        let mut inner = self.inner.lock().await;
        let position = inner
            .entities
            .iter()
            .position(|entity| entity.entity_id.as_ref() == Some(&id))
            .ok_or_else(|| PersistenceError::backend(format!("unknown entity {id}")))?;
        inner.entities.remove(position);
        debug!(id = %id, "entity deleted");
        let _ = self.snapshots.send(inner.entities.clone());
        Ok(())
    }
}
