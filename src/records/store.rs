//! Arena owning entity records, with same-type chaining by index.

use std::fmt;

use indexmap::IndexMap;
use rayon::prelude::*;

use super::EntityRecord;
use crate::config::DxfConfig;
use crate::error::{DxfError, Result};
use crate::io::dxf::writer::{DxfTextWriter, EntityWriter};
use crate::notification::NotificationCollection;

/// Index of a record in an [`EntityStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(usize);

impl RecordId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owns records and the `next` links between records of the same type.
///
/// Chains are singly linked and acyclic. A record can only be freed once
/// nothing follows it, so a chain is taken apart from its tail.
#[derive(Debug, Default)]
pub struct EntityStore {
    slots: Vec<Option<EntityRecord>>,
    heads: IndexMap<&'static str, RecordId>,
    tails: IndexMap<&'static str, RecordId>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record without chaining it.
    pub fn insert(&mut self, mut record: EntityRecord) -> RecordId {
        record.next = None;
        let id = RecordId(self.slots.len());
        self.slots.push(Some(record));
        id
    }

    /// Store a record at the end of the chain of its type.
    pub fn push(&mut self, record: EntityRecord) -> RecordId {
        let type_name = record.type_name();
        let id = self.insert(record);
        match self.tails.get(type_name).copied() {
            Some(tail) => {
                if let Some(Some(prev)) = self.slots.get_mut(tail.0) {
                    prev.next = Some(id);
                }
            }
            None => {
                self.heads.insert(type_name, id);
            }
        }
        self.tails.insert(type_name, id);
        id
    }

    /// Append `record` to the tail of the chain starting at `head`.
    ///
    /// The record must be unlinked and of the same type as `head`.
    pub fn push_chained(&mut self, head: RecordId, record: EntityRecord) -> Result<RecordId> {
        let head_type = self.get(head)?.type_name();
        if record.next.is_some() {
            return Err(DxfError::Custom(format!(
                "{} record is already linked",
                record.type_name()
            )));
        }
        if record.type_name() != head_type {
            return Err(DxfError::Custom(format!(
                "cannot chain {} after {}",
                record.type_name(),
                head_type
            )));
        }
        let tail = self
            .chain(head)
            .last()
            .map(|(id, _)| id)
            .unwrap_or(head);
        let id = self.insert(record);
        self.get_mut(tail)?.next = Some(id);
        if self.tails.get(head_type) == Some(&tail) {
            self.tails.insert(head_type, id);
        }
        Ok(id)
    }

    /// Link `next` after `id`. Fails if `id` already has a successor or
    /// if the link would close a cycle.
    pub fn link(&mut self, id: RecordId, next: RecordId) -> Result<()> {
        self.get(next)?;
        if self.get(id)?.next.is_some() {
            return Err(DxfError::ChainedRecord(id.0));
        }
        if self.chain(next).any(|(member, _)| member == id) {
            return Err(DxfError::Custom(format!(
                "linking {} after {} would create a cycle",
                next, id
            )));
        }
        self.get_mut(id)?.next = Some(next);
        Ok(())
    }

    /// Detach and return the successor of `id`.
    pub fn unlink(&mut self, id: RecordId) -> Result<Option<RecordId>> {
        let record = self.get_mut(id)?;
        let next = record.next.take();
        let type_name = record.type_name();
        if next.is_some() {
            self.tails.insert(type_name, id);
        }
        Ok(next)
    }

    /// Remove a record and hand it back.
    ///
    /// Refused with [`DxfError::ChainedRecord`] while the record still has
    /// a successor; the record stays in the store.
    pub fn free(&mut self, id: RecordId) -> Result<EntityRecord> {
        let record = self.get(id)?;
        if record.next.is_some() {
            return Err(DxfError::ChainedRecord(id.0));
        }
        let type_name = record.type_name();

        // Detach from a predecessor, if any
        let predecessor = self
            .slots
            .iter()
            .position(|slot| matches!(slot, Some(r) if r.next == Some(id)));
        if let Some(prev) = predecessor {
            if let Some(Some(r)) = self.slots.get_mut(prev) {
                r.next = None;
            }
        }

        if self.heads.get(type_name) == Some(&id) {
            self.heads.shift_remove(type_name);
            self.tails.shift_remove(type_name);
        } else if self.tails.get(type_name) == Some(&id) {
            if let Some(prev) = predecessor {
                self.tails.insert(type_name, RecordId(prev));
            }
        }

        self.slots[id.0].take().ok_or(DxfError::RecordNotFound(id.0))
    }

    pub fn get(&self, id: RecordId) -> Result<&EntityRecord> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(DxfError::RecordNotFound(id.0))
    }

    pub fn get_mut(&mut self, id: RecordId) -> Result<&mut EntityRecord> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(DxfError::RecordNotFound(id.0))
    }

    /// First record of the chain of `type_name`.
    pub fn head(&self, type_name: &str) -> Option<RecordId> {
        self.heads.get(type_name).copied()
    }

    /// First record of every type chain, keyed by type name.
    pub fn heads_by_type(&self) -> &IndexMap<&'static str, RecordId> {
        &self.heads
    }

    /// Type names with at least one chained record, in first-seen order.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.heads.keys().copied()
    }

    /// Walk a chain starting at `start`.
    pub fn chain(&self, start: RecordId) -> Chain<'_> {
        Chain {
            store: self,
            next: Some(start),
        }
    }

    /// Records of one type in chain order.
    pub fn of_type<'a>(&'a self, type_name: &str) -> impl Iterator<Item = &'a EntityRecord> + 'a {
        let head = self.head(type_name);
        head.into_iter().flat_map(move |h| self.chain(h).map(|(_, r)| r))
    }

    /// Live records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &EntityRecord)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|r| (RecordId(i), r)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize every live record in insertion order, in parallel.
    ///
    /// Each record is written into its own buffer with its own
    /// notifications; buffers and notifications are concatenated in store
    /// order. Skipped records contribute no bytes.
    pub fn serialize_parallel(&self, config: &DxfConfig) -> Result<(Vec<u8>, NotificationCollection)> {
        let records: Vec<&EntityRecord> = self.iter().map(|(_, r)| r).collect();
        let parts: Vec<Result<(Vec<u8>, NotificationCollection)>> = records
            .par_iter()
            .map(|record| {
                let mut notifications = NotificationCollection::new();
                let mut writer = DxfTextWriter::new(Vec::new());
                EntityWriter::new(config).write_entity(&mut writer, record, &mut notifications)?;
                Ok((writer.into_inner(), notifications))
            })
            .collect();

        let mut output = Vec::new();
        let mut notifications = NotificationCollection::new();
        for part in parts {
            let (bytes, notes) = part?;
            output.extend_from_slice(&bytes);
            notifications.append(notes);
        }
        Ok((output, notifications))
    }
}

/// Iterator over a record chain.
pub struct Chain<'a> {
    store: &'a EntityStore,
    next: Option<RecordId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = (RecordId, &'a EntityRecord);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let record = self.store.get(id).ok()?;
        self.next = record.next;
        Some((id, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(config: &DxfConfig) -> EntityRecord {
        EntityRecord::new("LINE", config).unwrap()
    }

    #[test]
    fn test_push_chains_by_type() {
        let config = DxfConfig::default();
        let mut store = EntityStore::new();
        let a = store.push(line(&config));
        let arc = store.push(EntityRecord::new("ARC", &config).unwrap());
        let b = store.push(line(&config));

        assert_eq!(store.head("LINE"), Some(a));
        assert_eq!(store.get(a).unwrap().next(), Some(b));
        assert_eq!(store.get(arc).unwrap().next(), None);
        let ids: Vec<RecordId> = store.chain(a).map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(store.of_type("LINE").count(), 2);
    }

    #[test]
    fn test_free_refuses_chained_record() {
        let config = DxfConfig::default();
        let mut store = EntityStore::new();
        let a = store.push(line(&config));
        let b = store.push(line(&config));

        let err = store.free(a).unwrap_err();
        assert!(matches!(err, DxfError::ChainedRecord(_)));
        assert!(store.get(a).is_ok(), "refused free must not deallocate");
        assert_eq!(store.len(), 2);

        // Tail first
        store.free(b).unwrap();
        assert_eq!(store.get(a).unwrap().next(), None);
        store.free(a).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.head("LINE"), None);
    }

    #[test]
    fn test_unlink_then_free() {
        let config = DxfConfig::default();
        let mut store = EntityStore::new();
        let a = store.push(line(&config));
        let b = store.push(line(&config));

        assert_eq!(store.unlink(a).unwrap(), Some(b));
        store.free(a).unwrap();
        assert!(store.get(b).is_ok());
    }

    #[test]
    fn test_link_rejects_cycles() {
        let config = DxfConfig::default();
        let mut store = EntityStore::new();
        let a = store.insert(line(&config));
        let b = store.insert(line(&config));
        store.link(a, b).unwrap();
        assert!(store.link(b, a).is_err());
        assert!(matches!(store.link(a, b), Err(DxfError::ChainedRecord(_))));
    }

    #[test]
    fn test_push_chained() {
        let config = DxfConfig::default();
        let mut store = EntityStore::new();
        let head = store.insert(line(&config));
        let b = store.push_chained(head, line(&config)).unwrap();
        let c = store.push_chained(head, line(&config)).unwrap();

        let ids: Vec<RecordId> = store.chain(head).map(|(id, _)| id).collect();
        assert_eq!(ids, vec![head, b, c]);
        assert!(store
            .push_chained(head, EntityRecord::new("ARC", &config).unwrap())
            .is_err());
    }

    #[test]
    fn test_heads_by_type() {
        let config = DxfConfig::default();
        let mut store = EntityStore::new();
        let a = store.push(line(&config));
        let arc = store.push(EntityRecord::new("ARC", &config).unwrap());
        store.push(line(&config));

        let heads = store.heads_by_type();
        assert_eq!(heads.len(), 2);
        assert_eq!(heads.get("LINE"), Some(&a));
        assert_eq!(heads.get("ARC"), Some(&arc));
    }

    #[test]
    fn test_missing_record() {
        let mut store = EntityStore::new();
        assert!(matches!(store.free(RecordId(3)), Err(DxfError::RecordNotFound(3))));
    }
}
