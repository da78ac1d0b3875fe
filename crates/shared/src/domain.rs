use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Opaque identifier assigned by the persistence collaborator. Never minted
/// locally; a record without one must not enter the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    AtPort,
    Delivered,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 4] = [
        ShipmentStatus::Pending,
        ShipmentStatus::InTransit,
        ShipmentStatus::AtPort,
        ShipmentStatus::Delivered,
    ];

    /// The next status along the fixed cycle, wrapping after `Delivered`.
    pub fn next(self) -> Self {
        match self {
            ShipmentStatus::Pending => ShipmentStatus::InTransit,
            ShipmentStatus::InTransit => ShipmentStatus::AtPort,
            ShipmentStatus::AtPort => ShipmentStatus::Delivered,
            ShipmentStatus::Delivered => ShipmentStatus::Pending,
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShipmentStatus::Pending => "Pending",
            ShipmentStatus::InTransit => "In Transit",
            ShipmentStatus::AtPort => "At Port",
            ShipmentStatus::Delivered => "Delivered",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Normal,
    High,
    Urgent,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StakeholderKind {
    #[default]
    Shipping,
    FreightForwarder,
    PortAuthority,
    Consignee,
}

impl fmt::Display for StakeholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StakeholderKind::Shipping => "shipping",
            StakeholderKind::FreightForwarder => "freight forwarder",
            StakeholderKind::PortAuthority => "port authority",
            StakeholderKind::Consignee => "consignee",
        };
        f.write_str(label)
    }
}

/// One shipment as tracked by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub id: EntityId,
    pub cargo_id: String,
    pub vessel_name: String,
    pub origin: String,
    pub destination: String,
    pub status: ShipmentStatus,
    pub eta: NaiveDate,
    pub last_updated: DateTime<Utc>,
    pub container_count: u32,
    pub weight_tons: u32,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_email: Option<String>,
    pub stakeholder_type: StakeholderKind,
}

impl ShipmentRecord {
    pub fn from_payload(id: EntityId, payload: ShipmentPayload) -> Self {
        Self {
            id,
            cargo_id: payload.cargo_id,
            vessel_name: payload.vessel_name,
            origin: payload.origin,
            destination: payload.destination,
            status: payload.status,
            eta: payload.eta,
            last_updated: payload.last_updated,
            container_count: payload.container_count,
            weight_tons: payload.weight_tons,
            priority: payload.priority,
            notification_email: payload.notification_email,
            stakeholder_type: payload.stakeholder_type,
        }
    }

    pub fn to_payload(&self) -> ShipmentPayload {
        ShipmentPayload {
            cargo_id: self.cargo_id.clone(),
            vessel_name: self.vessel_name.clone(),
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            status: self.status,
            eta: self.eta,
            last_updated: self.last_updated,
            container_count: self.container_count,
            weight_tons: self.weight_tons,
            priority: self.priority,
            notification_email: self.notification_email.clone(),
            stakeholder_type: self.stakeholder_type,
        }
    }
}

/// Shipment fields as they cross the persistence boundary. The id travels on
/// the envelope, never inside the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentPayload {
    pub cargo_id: String,
    pub vessel_name: String,
    pub origin: String,
    pub destination: String,
    pub status: ShipmentStatus,
    pub eta: NaiveDate,
    pub last_updated: DateTime<Utc>,
    pub container_count: u32,
    pub weight_tons: u32,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_email: Option<String>,
    pub stakeholder_type: StakeholderKind,
}

impl ShipmentPayload {
    /// Builds the payload for a brand-new shipment. New shipments start in
    /// transit, not pending.
    pub fn from_draft(draft: ShipmentDraft, stakeholder: StakeholderKind, now: DateTime<Utc>) -> Self {
        Self {
            cargo_id: draft.cargo_id,
            vessel_name: draft.vessel_name,
            origin: draft.origin,
            destination: draft.destination,
            status: ShipmentStatus::InTransit,
            eta: draft.eta,
            last_updated: now,
            container_count: draft.container_count,
            weight_tons: draft.weight_tons,
            priority: draft.priority,
            notification_email: draft.notification_email.filter(|email| !email.is_empty()),
            stakeholder_type: stakeholder,
        }
    }
}

/// User-supplied fields of a create intent. Status, timestamps, and the
/// stakeholder tag are filled in by the mutation gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentDraft {
    pub cargo_id: String,
    pub vessel_name: String,
    pub origin: String,
    pub destination: String,
    pub eta: NaiveDate,
    pub container_count: u32,
    pub weight_tons: u32,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub stakeholder: StakeholderKind,
    pub initial: char,
}

impl Session {
    pub fn new(email: &str, stakeholder: StakeholderKind) -> Result<Self, SessionError> {
        let email = email.trim();
        let initial = email
            .chars()
            .next()
            .ok_or(SessionError::EmailRequired)?
            .to_ascii_uppercase();
        Ok(Self {
            email: email.to_string(),
            stakeholder,
            initial,
        })
    }
}
