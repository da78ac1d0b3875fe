use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use chrono::Utc;
use shared::{
    domain::{EntityId, Session, ShipmentDraft, ShipmentPayload, ShipmentRecord, ShipmentStatus, StakeholderKind},
    envelope::EntityEnvelope,
    error::{IntentError, PersistenceError, SessionError},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

mod store;
pub mod views;

use store::ShipmentStore;
use views::{DetailView, FeedEntry, MapMarker, ProgressSource, RandomProgress, ShipmentListItem, StatsView};

/// Hard cap on stored shipments; creation beyond it is rejected before any
/// persistence call.
pub const MAX_SHIPMENTS: usize = 999;
const DELETE_CONFIRM_WINDOW: Duration = Duration::from_secs(3);
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Persistence collaborator contract. `init` hands back the authoritative
/// snapshot stream; every mutation call resolves to the confirmed entity or
/// a failure, never a partial write.
#[async_trait]
pub trait DataBackend: Send + Sync {
    async fn init(&self) -> Result<broadcast::Receiver<Vec<EntityEnvelope>>, PersistenceError>;
    async fn create(&self, envelope: EntityEnvelope) -> Result<EntityEnvelope, PersistenceError>;
    async fn update(&self, envelope: EntityEnvelope) -> Result<EntityEnvelope, PersistenceError>;
    async fn delete(&self, envelope: EntityEnvelope) -> Result<(), PersistenceError>;
}

pub struct MissingDataBackend;

#[async_trait]
impl DataBackend for MissingDataBackend {
    async fn init(&self) -> Result<broadcast::Receiver<Vec<EntityEnvelope>>, PersistenceError> {
        Err(PersistenceError::NotConfigured)
    }

    async fn create(&self, _envelope: EntityEnvelope) -> Result<EntityEnvelope, PersistenceError> {
        Err(PersistenceError::NotConfigured)
    }

    async fn update(&self, _envelope: EntityEnvelope) -> Result<EntityEnvelope, PersistenceError> {
        Err(PersistenceError::NotConfigured)
    }

    async fn delete(&self, _envelope: EntityEnvelope) -> Result<(), PersistenceError> {
        Err(PersistenceError::NotConfigured)
    }
}

/// Post-success side effects (simulated emails and the like). Invoked after
/// the primary success signal; failures never touch the store.
#[async_trait]
pub trait NotificationHook: Send + Sync {
    async fn shipment_created(&self, record: ShipmentRecord);
    async fn status_changed(&self, record: ShipmentRecord);
}

pub struct NoNotifications;

#[async_trait]
impl NotificationHook for NoNotifications {
    async fn shipment_created(&self, _record: ShipmentRecord) {}

    async fn status_changed(&self, _record: ShipmentRecord) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Projection inputs changed; consumers re-pull the views.
    StoreUpdated,
    ShipmentCreated {
        cargo_id: String,
    },
    StatusAdvanced {
        id: EntityId,
        status: ShipmentStatus,
    },
    DeletePending {
        id: EntityId,
    },
    ShipmentDeleted {
        cargo_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Stale id; nothing to delete.
    Ignored,
    /// First press; armed until the confirmation window expires.
    ConfirmationPending,
    Deleted {
        cargo_id: String,
    },
}

struct PendingDelete {
    id: EntityId,
    expires_at: Instant,
}

#[derive(Default)]
struct DashboardState {
    store: ShipmentStore,
    session: Option<Session>,
    search_query: String,
    pending_delete: Option<PendingDelete>,
    snapshot_loop_started: bool,
}

/// Owner of all dashboard state. Local intents and the snapshot stream both
/// funnel into the one store behind `inner`; the guard is never held across
/// a collaborator await.
pub struct ShipmentDashboard {
    inner: Mutex<DashboardState>,
    events: broadcast::Sender<DashboardEvent>,
    backend: Arc<dyn DataBackend>,
    notifier: Arc<dyn NotificationHook>,
    progress: Arc<dyn ProgressSource>,
}

impl ShipmentDashboard {
    /// Engine with no collaborators wired; every persistence intent fails
    /// until constructed with a real backend.
    pub fn detached() -> Arc<Self> {
        Self::new(
            Arc::new(MissingDataBackend),
            Arc::new(NoNotifications),
            Arc::new(RandomProgress),
        )
    }

    pub fn with_backend(backend: Arc<dyn DataBackend>) -> Arc<Self> {
        Self::new(backend, Arc::new(NoNotifications), Arc::new(RandomProgress))
    }

    pub fn new(
        backend: Arc<dyn DataBackend>,
        notifier: Arc<dyn NotificationHook>,
        progress: Arc<dyn ProgressSource>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            inner: Mutex::new(DashboardState::default()),
            events,
            backend,
            notifier,
            progress,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: DashboardEvent) {
        let _ = self.events.send(event);
    }

    /// Subscribes to the backend's snapshot stream and keeps the store
    /// reconciled with it until the stream closes.
    pub async fn attach(self: &Arc<Self>) -> Result<(), PersistenceError> {
        let rx = self.backend.init().await?;
        {
            let mut inner = self.inner.lock().await;
            if inner.snapshot_loop_started {
                warn!("snapshot stream already attached");
                return Ok(());
            }
            inner.snapshot_loop_started = true;
        }
        self.spawn_snapshot_events(rx);
        Ok(())
    }

    fn spawn_snapshot_events(self: &Arc<Self>, mut rx: broadcast::Receiver<Vec<EntityEnvelope>>) {
        let dashboard = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(snapshot) => dashboard.apply_snapshot(snapshot).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Snapshots are full replacements; the next one wins.
                        debug!(skipped, "snapshot stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            let mut inner = dashboard.inner.lock().await;
            inner.snapshot_loop_started = false;
            debug!("snapshot stream closed");
        });
    }

    /// Replaces the store from an authoritative snapshot, keeping only
    /// decodable shipment entities.
    async fn apply_snapshot(&self, snapshot: Vec<EntityEnvelope>) {
        let mut records: Vec<ShipmentRecord> = Vec::new();
        for envelope in snapshot.into_iter().filter(EntityEnvelope::is_shipment) {
            match envelope.decode_shipment() {
                Ok(record) => records.push(record),
                Err(err) => warn!(error = %err, "skipping undecodable shipment envelope"),
            }
        }

        {
            let mut inner = self.inner.lock().await;
            debug!(records = records.len(), "applying authoritative snapshot");
            inner.store.replace_all(records);
        }
        self.emit(DashboardEvent::StoreUpdated);
    }

    pub async fn login(
        &self,
        email: &str,
        stakeholder: StakeholderKind,
    ) -> Result<Session, SessionError> {
        let session = Session::new(email, stakeholder)?;
        {
            let mut inner = self.inner.lock().await;
            inner.session = Some(session.clone());
        }
        info!(email = %session.email, stakeholder = %session.stakeholder, "user logged in");
        Ok(session)
    }

    pub async fn logout(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.session = None;
        }
        info!("user logged out");
    }

    pub async fn session(&self) -> Option<Session> {
        self.inner.lock().await.session.clone()
    }

    /// Selects a record for the detail view if the id resolves; a stale id
    /// leaves the selection unchanged.
    pub async fn select(&self, id: &EntityId) {
        let changed = {
            let mut inner = self.inner.lock().await;
            inner.store.select(id)
        };
        if changed {
            self.emit(DashboardEvent::StoreUpdated);
        }
    }

    /// Local-only filter over the list view; the store itself is untouched.
    pub async fn search(&self, query: impl Into<String>) {
        {
            let mut inner = self.inner.lock().await;
            inner.search_query = query.into();
        }
        self.emit(DashboardEvent::StoreUpdated);
    }

    pub async fn search_query(&self) -> String {
        self.inner.lock().await.search_query.clone()
    }

    /// Creates a shipment from the draft. Rejects with `CapacityExceeded`
    /// before any backend call once the store holds `MAX_SHIPMENTS` records;
    /// on backend failure the store is left untouched.
    pub async fn create_shipment(&self, draft: ShipmentDraft) -> Result<ShipmentRecord, IntentError> {
        let stakeholder = {
            let inner = self.inner.lock().await;
            if inner.store.len() >= MAX_SHIPMENTS {
                return Err(IntentError::CapacityExceeded);
            }
            inner
                .session
                .as_ref()
                .map(|session| session.stakeholder)
                .unwrap_or_default()
        };

        let payload = ShipmentPayload::from_draft(draft, stakeholder, Utc::now());
        let envelope = EntityEnvelope::new_shipment(&payload).map_err(PersistenceError::from)?;
        let confirmed = self.backend.create(envelope).await?;
        let record = confirmed.decode_shipment().map_err(PersistenceError::from)?;

        {
            let mut inner = self.inner.lock().await;
            inner.store.upsert(record.clone());
        }
        info!(cargo_id = %record.cargo_id, id = %record.id, "shipment created");
        self.emit(DashboardEvent::StoreUpdated);
        self.emit(DashboardEvent::ShipmentCreated {
            cargo_id: record.cargo_id.clone(),
        });

        let notifier = Arc::clone(&self.notifier);
        let created = record.clone();
        tokio::spawn(async move {
            notifier.shipment_created(created).await;
        });

        Ok(record)
    }

    /// Advances the record one step along the status cycle. A stale id is
    /// silently ignored (`Ok(None)`); no optimistic update is kept on
    /// failure.
    pub async fn advance_status(
        &self,
        id: &EntityId,
    ) -> Result<Option<ShipmentStatus>, IntentError> {
        let mut updated = {
            let inner = self.inner.lock().await;
            match inner.store.get(id) {
                Some(record) => record.clone(),
                None => return Ok(None),
            }
        };
        updated.status = updated.status.next();
        updated.last_updated = Utc::now();

        let envelope = EntityEnvelope::from_record(&updated).map_err(PersistenceError::from)?;
        let confirmed = self.backend.update(envelope).await?;
        let record = confirmed.decode_shipment().map_err(PersistenceError::from)?;
        let status = record.status;

        {
            let mut inner = self.inner.lock().await;
            inner.store.upsert(record.clone());
        }
        info!(id = %record.id, status = %status, "shipment status advanced");
        self.emit(DashboardEvent::StoreUpdated);
        self.emit(DashboardEvent::StatusAdvanced {
            id: record.id.clone(),
            status,
        });

        if record.notification_email.is_some() {
            let notifier = Arc::clone(&self.notifier);
            tokio::spawn(async move {
                notifier.status_changed(record).await;
            });
        }

        Ok(Some(status))
    }

    /// Two-step delete. The first press arms a confirmation that expires
    /// after the fixed window; only a second press on the same id inside the
    /// window reaches the backend. Expiry re-arms instead of deleting.
    pub async fn delete_shipment(&self, id: &EntityId) -> Result<DeleteOutcome, IntentError> {
        let record = {
            let mut inner = self.inner.lock().await;
            let Some(record) = inner.store.get(id).cloned() else {
                return Ok(DeleteOutcome::Ignored);
            };

            let armed = inner
                .pending_delete
                .as_ref()
                .is_some_and(|pending| pending.id == *id && Instant::now() < pending.expires_at);
            if !armed {
                inner.pending_delete = Some(PendingDelete {
                    id: id.clone(),
                    expires_at: Instant::now() + DELETE_CONFIRM_WINDOW,
                });
                drop(inner);
                debug!(id = %id, "delete confirmation armed");
                self.emit(DashboardEvent::DeletePending { id: id.clone() });
                return Ok(DeleteOutcome::ConfirmationPending);
            }

            // The window is consumed by the confirmation attempt.
            inner.pending_delete = None;
            record
        };

        let envelope = EntityEnvelope::from_record(&record).map_err(PersistenceError::from)?;
        self.backend.delete(envelope).await?;

        {
            let mut inner = self.inner.lock().await;
            inner.store.remove(&record.id);
        }
        info!(cargo_id = %record.cargo_id, "shipment deleted");
        self.emit(DashboardEvent::StoreUpdated);
        self.emit(DashboardEvent::ShipmentDeleted {
            cargo_id: record.cargo_id.clone(),
        });

        Ok(DeleteOutcome::Deleted {
            cargo_id: record.cargo_id,
        })
    }

    pub async fn shipments(&self) -> Vec<ShipmentRecord> {
        self.inner.lock().await.store.records().to_vec()
    }

    pub async fn selected(&self) -> Option<EntityId> {
        self.inner.lock().await.store.selected().cloned()
    }

    pub async fn stats(&self) -> StatsView {
        let inner = self.inner.lock().await;
        views::stats(inner.store.records())
    }

    /// List view filtered by the current search query.
    pub async fn list_view(&self) -> Vec<ShipmentListItem> {
        let inner = self.inner.lock().await;
        views::list_view(
            inner.store.records(),
            inner.store.selected(),
            &inner.search_query,
        )
    }

    pub async fn detail_view(&self) -> Option<DetailView> {
        let inner = self.inner.lock().await;
        views::detail_view(inner.store.records(), inner.store.selected())
    }

    pub async fn activity_feed(&self) -> Vec<FeedEntry> {
        let inner = self.inner.lock().await;
        views::activity_feed(inner.store.records(), views::ACTIVITY_FEED_LIMIT)
    }

    pub async fn map_markers(&self) -> Vec<MapMarker> {
        let inner = self.inner.lock().await;
        views::map_markers(inner.store.records(), self.progress.as_ref())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
