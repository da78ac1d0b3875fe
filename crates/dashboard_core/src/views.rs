//! Pure projections over `(records, selection)`. Nothing here mutates state;
//! the presentation layer re-pulls these after every `StoreUpdated` event.

use chrono::{DateTime, Utc};
use rand::Rng;
use shared::domain::{EntityId, ShipmentRecord, ShipmentStatus};

pub const ACTIVITY_FEED_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsView {
    pub active: usize,
    pub transit: usize,
    pub port: usize,
    pub delivered: usize,
}

pub fn stats(records: &[ShipmentRecord]) -> StatsView {
    let count = |status: ShipmentStatus| records.iter().filter(|r| r.status == status).count();
    StatsView {
        // "active" counts every record, delivered included.
        active: records.len(),
        transit: count(ShipmentStatus::InTransit),
        port: count(ShipmentStatus::AtPort),
        delivered: count(ShipmentStatus::Delivered),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentListItem {
    pub record: ShipmentRecord,
    pub is_selected: bool,
}

/// Records whose cargo id or vessel name contains `query`
/// (case-insensitive), in store order. An empty query matches everything.
pub fn list_view(
    records: &[ShipmentRecord],
    selected: Option<&EntityId>,
    query: &str,
) -> Vec<ShipmentListItem> {
    let query = query.to_lowercase();
    records
        .iter()
        .filter(|record| {
            query.is_empty()
                || record.cargo_id.to_lowercase().contains(&query)
                || record.vessel_name.to_lowercase().contains(&query)
        })
        .map(|record| ShipmentListItem {
            record: record.clone(),
            is_selected: selected == Some(&record.id),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Created,
    Departed,
    Arrived,
    Delivered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineStage {
    pub kind: StageKind,
    pub label: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub record: ShipmentRecord,
    /// Completed stages only; `next_stage` marks the pending one.
    pub timeline: Vec<TimelineStage>,
    pub next_stage: Option<StageKind>,
}

pub fn detail_view(records: &[ShipmentRecord], selected: Option<&EntityId>) -> Option<DetailView> {
    let id = selected?;
    let record = records.iter().find(|record| record.id == *id)?;
    let (timeline, next_stage) = tracking_timeline(record);
    Some(DetailView {
        record: record.clone(),
        timeline,
        next_stage,
    })
}

/// Stage inclusion is gated by status: Created always; Departed once the
/// shipment left Pending; Arrived at AtPort or Delivered; Delivered only
/// when delivered.
fn tracking_timeline(record: &ShipmentRecord) -> (Vec<TimelineStage>, Option<StageKind>) {
    let mut stages = vec![TimelineStage {
        kind: StageKind::Created,
        label: "Shipment Created".to_string(),
        detail: record.last_updated.format("%Y-%m-%d %H:%M").to_string(),
    }];

    if record.status != ShipmentStatus::Pending {
        stages.push(TimelineStage {
            kind: StageKind::Departed,
            label: format!("Departed {}", record.origin),
            detail: "In transit".to_string(),
        });
    }
    if matches!(
        record.status,
        ShipmentStatus::AtPort | ShipmentStatus::Delivered
    ) {
        stages.push(TimelineStage {
            kind: StageKind::Arrived,
            label: format!("Arrived at {}", record.destination),
            detail: "At port".to_string(),
        });
    }
    if record.status == ShipmentStatus::Delivered {
        stages.push(TimelineStage {
            kind: StageKind::Delivered,
            label: "Delivered".to_string(),
            detail: "Completed successfully".to_string(),
        });
    }

    let next_stage = match record.status {
        ShipmentStatus::Pending => Some(StageKind::Departed),
        ShipmentStatus::InTransit => Some(StageKind::Arrived),
        ShipmentStatus::AtPort => Some(StageKind::Delivered),
        ShipmentStatus::Delivered => None,
    };

    (stages, next_stage)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub cargo_id: String,
    pub vessel_name: String,
    pub status: ShipmentStatus,
    pub last_updated: DateTime<Utc>,
}

/// Most recently updated records first, truncated to `limit`. The sort must
/// stay stable so equal timestamps keep store order across re-renders.
pub fn activity_feed(records: &[ShipmentRecord], limit: usize) -> Vec<FeedEntry> {
    let mut recent: Vec<&ShipmentRecord> = records.iter().collect();
    recent.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
    recent
        .into_iter()
        .take(limit)
        .map(|record| FeedEntry {
            cargo_id: record.cargo_id.clone(),
            vessel_name: record.vessel_name.clone(),
            status: record.status,
            last_updated: record.last_updated,
        })
        .collect()
}

/// Percent position on the static map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPoint {
    pub left: f64,
    pub top: f64,
}

const DEFAULT_PORT_POSITION: MapPoint = MapPoint {
    left: 50.0,
    top: 50.0,
};

const PORT_POSITIONS: [(&str, MapPoint); 5] = [
    (
        "Durban",
        MapPoint {
            left: 45.0,
            top: 30.0,
        },
    ),
    (
        "Richards Bay",
        MapPoint {
            left: 85.0,
            top: 35.0,
        },
    ),
    (
        "Cape Town",
        MapPoint {
            left: 15.0,
            top: 45.0,
        },
    ),
    (
        "East London",
        MapPoint {
            left: 75.0,
            top: 65.0,
        },
    ),
    (
        "Ngqura",
        MapPoint {
            left: 30.0,
            top: 70.0,
        },
    ),
];

/// Fixed coordinate for a known port; anything else lands mid-map.
pub fn port_position(name: &str) -> MapPoint {
    PORT_POSITIONS
        .iter()
        .find(|(port, _)| *port == name)
        .map(|(_, point)| *point)
        .unwrap_or(DEFAULT_PORT_POSITION)
}

/// Scalar progress along the origin-destination leg. Injected so marker
/// placement is reproducible under test.
pub trait ProgressSource: Send + Sync {
    /// Expected range `[0.2, 0.8)`.
    fn leg_progress(&self) -> f64;
}

/// Production source: a fresh uniform draw per marker per render.
#[derive(Debug, Default)]
pub struct RandomProgress;

impl ProgressSource for RandomProgress {
    fn leg_progress(&self) -> f64 {
        let mut rng = rand::rng();
        rng.random_range(0.2..0.8)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedProgress(pub f64);

impl ProgressSource for FixedProgress {
    fn leg_progress(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub id: EntityId,
    pub vessel_name: String,
    pub position: MapPoint,
}

/// One marker per in-transit shipment, interpolated between its origin and
/// destination ports.
pub fn map_markers(records: &[ShipmentRecord], progress: &dyn ProgressSource) -> Vec<MapMarker> {
    records
        .iter()
        .filter(|record| record.status == ShipmentStatus::InTransit)
        .map(|record| {
            let origin = port_position(&record.origin);
            let destination = port_position(&record.destination);
            let t = progress.leg_progress();
            MapMarker {
                id: record.id.clone(),
                vessel_name: record.vessel_name.clone(),
                position: MapPoint {
                    left: origin.left + (destination.left - origin.left) * t,
                    top: origin.top + (destination.top - origin.top) * t,
                },
            }
        })
        .collect()
}

pub fn time_ago(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    if seconds < 60 {
        "Just now".to_string()
    } else if seconds < 3_600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3_600)
    } else {
        format!("{}d ago", seconds / 86_400)
    }
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
