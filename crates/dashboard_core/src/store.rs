use shared::domain::{EntityId, ShipmentRecord};

/// Authoritative local copy of all shipment records plus the current
/// selection. Mutation happens only through `replace_all`, `upsert`, and
/// `remove`; each re-validates the selection before returning.
#[derive(Debug, Default)]
pub struct ShipmentStore {
    records: Vec<ShipmentRecord>,
    selected: Option<EntityId>,
}

impl ShipmentStore {
    pub fn records(&self) -> &[ShipmentRecord] {
        &self.records
    }

    pub fn selected(&self) -> Option<&EntityId> {
        self.selected.as_ref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &EntityId) -> Option<&ShipmentRecord> {
        self.records.iter().find(|record| record.id == *id)
    }

    /// Sets the selection if `id` resolves; otherwise leaves it unchanged.
    /// Returns whether the selection now points at `id`.
    pub fn select(&mut self, id: &EntityId) -> bool {
        if self.get(id).is_some() {
            self.selected = Some(id.clone());
            true
        } else {
            false
        }
    }

    /// Replaces the whole collection with an authoritative snapshot. No
    /// partial merge.
    pub fn replace_all(&mut self, records: Vec<ShipmentRecord>) {
        self.records = records;
        self.reconcile_selection();
    }

    /// Inserts the record, or replaces the one with the same id in place,
    /// keeping its position in the sequence.
    pub fn upsert(&mut self, record: ShipmentRecord) {
        match self.records.iter_mut().find(|slot| slot.id == record.id) {
            Some(slot) => *slot = record,
            None => self.records.push(record),
        }
        self.reconcile_selection();
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<ShipmentRecord> {
        let position = self.records.iter().position(|record| record.id == *id)?;
        let removed = self.records.remove(position);
        self.reconcile_selection();
        Some(removed)
    }

    /// Clears the selection when the record it points at is gone. Runs after
    /// every mutation, including snapshots arriving outside local intents.
    fn reconcile_selection(&mut self) {
        let resolves = self
            .selected
            .as_ref()
            .is_some_and(|id| self.records.iter().any(|record| record.id == *id));
        if !resolves {
            self.selected = None;
        }
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
