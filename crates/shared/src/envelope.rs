use serde::{Deserialize, Serialize};

use crate::{
    domain::{EntityId, ShipmentPayload, ShipmentRecord},
    error::EnvelopeError,
};

/// Kind tag for shipment entities; snapshots are filtered to this kind.
pub const SHIPMENT_KIND: &str = "shipment";

/// Kind-tagged entity as the persistence collaborator sees it. The payload
/// stays opaque to the backend; only the engine decodes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityId>,
    pub kind: String,
    pub payload: serde_json::Value,
}

impl EntityEnvelope {
    /// Envelope for a create call; the backend assigns the entity id.
    pub fn new_shipment(payload: &ShipmentPayload) -> Result<Self, EnvelopeError> {
        Ok(Self {
            entity_id: None,
            kind: SHIPMENT_KIND.to_string(),
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Envelope for an update or delete call on a persisted record.
    pub fn from_record(record: &ShipmentRecord) -> Result<Self, EnvelopeError> {
        Ok(Self {
            entity_id: Some(record.id.clone()),
            kind: SHIPMENT_KIND.to_string(),
            payload: serde_json::to_value(record.to_payload())?,
        })
    }

    pub fn is_shipment(&self) -> bool {
        self.kind == SHIPMENT_KIND
    }

    pub fn decode_shipment(&self) -> Result<ShipmentRecord, EnvelopeError> {
        if !self.is_shipment() {
            return Err(EnvelopeError::WrongKind {
                kind: self.kind.clone(),
            });
        }
        let id = self.entity_id.clone().ok_or(EnvelopeError::MissingId)?;
        let payload: ShipmentPayload = serde_json::from_value(self.payload.clone())?;
        Ok(ShipmentRecord::from_payload(id, payload))
    }
}
