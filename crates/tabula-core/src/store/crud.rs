//! Single-record create, read, update and delete.

use serde_json::Value;

use super::{assign_id, normalize_selected, smallest_free_id, RowStore};
use crate::value::{as_id, Record, ID_COLUMN, MAX_ID, SELECTED_COLUMN};

impl RowStore {
    /// Appends a record and returns its id.
    ///
    /// A usable `id` that is not taken is kept; otherwise the next id from
    /// the high-water mark is assigned. Ids freed by deletes are not reused
    /// until the high-water mark passes [`MAX_ID`].
    pub fn create_record(&mut self, mut record: Record) -> i64 {
        let requested = record.get(ID_COLUMN).and_then(as_id);
        let id = match requested {
            Some(id) if !self.positions.contains_key(&id) => id,
            Some(taken) => {
                tracing::debug!(id = taken, "requested id already taken, assigning a new one");
                self.fresh_id()
            }
            None => self.fresh_id(),
        };
        self.next_id = self.next_id.max(id + 1);

        assign_id(&mut record, id);
        normalize_selected(&mut record);
        self.extend_columns(record.keys());

        self.positions.insert(id, self.records.len());
        self.records.push(record);
        tracing::trace!(id, "record created");
        id
    }

    fn fresh_id(&self) -> i64 {
        if self.next_id <= MAX_ID {
            self.next_id
        } else {
            smallest_free_id(|id| self.positions.contains_key(&id))
        }
    }

    /// Returns a copy of the record with the given id.
    #[must_use]
    pub fn read_record(&self, id: i64) -> Option<Record> {
        self.get(id).cloned()
    }

    /// Borrows the record with the given id.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&Record> {
        self.positions.get(&id).map(|&pos| &self.records[pos])
    }

    /// Merges `updates` into the record with the given id.
    ///
    /// Returns false when the id is unknown or `updates` is empty. The `id`
    /// key in `updates` is ignored; a record cannot change identity.
    pub fn update_record(&mut self, id: i64, updates: Record) -> bool {
        if updates.is_empty() {
            return false;
        }
        let Some(&pos) = self.positions.get(&id) else {
            return false;
        };

        let record = &mut self.records[pos];
        let mut touched_selection = false;
        for (key, value) in updates {
            if key == ID_COLUMN {
                continue;
            }
            touched_selection |= key == SELECTED_COLUMN;
            record.insert(key, value);
        }
        if touched_selection {
            normalize_selected(record);
        }

        let keys: Vec<String> = self.records[pos].keys().cloned().collect();
        self.extend_columns(keys.iter());
        tracing::trace!(id, "record updated");
        true
    }

    /// Convenience wrapper for [`RowStore::update_record`] with a JSON object.
    ///
    /// Non-object values are rejected (returns false).
    pub fn update_from_value(&mut self, id: i64, updates: Value) -> bool {
        match updates {
            Value::Object(map) => self.update_record(id, map.into_iter().collect()),
            _ => false,
        }
    }

    /// Removes the record with the given id. Returns false if it is unknown.
    pub fn delete_record(&mut self, id: i64) -> bool {
        let Some(pos) = self.positions.remove(&id) else {
            return false;
        };
        self.records.remove(pos);
        // Positions after the removed row shift down by one.
        for slot in self.positions.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        tracing::trace!(id, "record deleted");
        true
    }

    /// Whether a record with this id exists.
    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.positions.contains_key(&id)
    }
}
