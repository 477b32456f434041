// ── Keyed entity collection ──
//
// Concurrent map plus a `watch` snapshot rebuilt on every change, so
// readers take a cheap `Arc` clone instead of iterating the map.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::EntityId;

/// Storage for one entity type.
///
/// Keys are strings so collections scoped to a parent (coupons per course)
/// can share one map: `"{course}:{coupon}"`. A secondary index resolves
/// plain [`EntityId`]s.
pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    by_key: DashMap<String, Arc<T>>,
    id_to_key: DashMap<EntityId, String>,
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_key: DashMap::new(),
            id_to_key: DashMap::new(),
            snapshot,
        }
    }

    /// Insert or replace one entity. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, key: String, id: EntityId, entity: T) -> bool {
        let is_new = self.put(key, id, entity);
        self.publish();
        is_new
    }

    /// Remove by key, returning the entity if it was present.
    pub(crate) fn remove(&self, key: &str) -> Option<Arc<T>> {
        let removed = self.take(key);
        if removed.is_some() {
            self.publish();
        }
        removed
    }

    /// Upsert `items`, then drop every key matching `in_scope` that was not
    /// among them. Publishes once, so subscribers never observe a half
    /// applied or empty intermediate state.
    pub(crate) fn replace_where(
        &self,
        items: Vec<(String, EntityId, T)>,
        in_scope: impl Fn(&str) -> bool,
    ) {
        let incoming: std::collections::HashSet<String> =
            items.iter().map(|(k, _, _)| k.clone()).collect();
        for (key, id, entity) in items {
            self.put(key, id, entity);
        }
        let stale: Vec<String> = self
            .by_key
            .iter()
            .map(|r| r.key().clone())
            .filter(|k| in_scope(k) && !incoming.contains(k))
            .collect();
        for key in stale {
            self.take(&key);
        }
        self.publish();
    }

    pub(crate) fn get_by_key(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn get_by_id(&self, id: &EntityId) -> Option<Arc<T>> {
        let key = self.id_to_key.get(id)?;
        self.get_by_key(key.value())
    }

    pub(crate) fn key_for(&self, id: &EntityId) -> Option<String> {
        self.id_to_key.get(id).map(|k| k.value().clone())
    }

    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn put(&self, key: String, id: EntityId, entity: T) -> bool {
        // Drop a stale id mapping left by an earlier entity under this key.
        let stale_id = self
            .id_to_key
            .iter()
            .find(|r| r.value() == &key && r.key() != &id)
            .map(|r| r.key().clone());
        if let Some(old) = stale_id {
            self.id_to_key.remove(&old);
        }

        let is_new = self.by_key.insert(key.clone(), Arc::new(entity)).is_none();
        self.id_to_key.insert(id, key);
        is_new
    }

    fn take(&self, key: &str) -> Option<Arc<T>> {
        let (_, removed) = self.by_key.remove(key)?;
        self.id_to_key.retain(|_, k| k.as_str() != key);
        Some(removed)
    }

    /// Rebuild the snapshot in key order and broadcast it.
    fn publish(&self) {
        let mut entries: Vec<(String, Arc<T>)> = self
            .by_key
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let values: Vec<Arc<T>> = entries.into_iter().map(|(_, v)| v).collect();
        // `send_modify` updates even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}
