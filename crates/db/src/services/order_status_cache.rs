//! Memo maps backing [`OrderStatusService`](super::OrderStatusService).
//!
//! Statuses are memoized by id and by handle. Once the full list has been
//! loaded, misses are authoritative and no longer reach the database. Every
//! write clears the cache and bumps a generation counter; a read that started
//! before the bump must not memoize what it fetched.

use std::collections::HashMap;
use std::sync::Arc;

use commerce_core::types::DbId;

use crate::models::order_status::OrderStatusWithEmails;

/// Result of consulting the cache.
#[derive(Debug)]
pub enum Lookup {
    /// Memoized value.
    Hit(Arc<OrderStatusWithEmails>),
    /// The full list is loaded and contains no such status.
    Absent,
    /// Unknown; the caller should query and memoize under `generation`.
    Miss { generation: u64 },
}

#[derive(Debug, Default)]
pub struct OrderStatusCache {
    by_id: HashMap<DbId, Arc<OrderStatusWithEmails>>,
    by_handle: HashMap<String, Arc<OrderStatusWithEmails>>,
    all: Option<Vec<Arc<OrderStatusWithEmails>>>,
    generation: u64,
}

impl OrderStatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the full list has been loaded since the last invalidation.
    pub fn is_fully_loaded(&self) -> bool {
        self.all.is_some()
    }

    pub fn by_id(&self, id: DbId) -> Lookup {
        match self.by_id.get(&id) {
            Some(status) => Lookup::Hit(Arc::clone(status)),
            None => self.miss(),
        }
    }

    pub fn by_handle(&self, handle: &str) -> Lookup {
        match self.by_handle.get(handle) {
            Some(status) => Lookup::Hit(Arc::clone(status)),
            None => self.miss(),
        }
    }

    /// The full ordered list, if loaded.
    pub fn all(&self) -> Option<Vec<Arc<OrderStatusWithEmails>>> {
        self.all.clone()
    }

    /// Memoize a single status fetched under `generation`.
    ///
    /// Returns the memoized value, which is an earlier entry for the same id
    /// when one exists. A stale generation is ignored and `status` is
    /// returned as-is.
    pub fn memoize(
        &mut self,
        generation: u64,
        status: OrderStatusWithEmails,
    ) -> Arc<OrderStatusWithEmails> {
        if generation != self.generation {
            return Arc::new(status);
        }
        if let Some(existing) = self.by_id.get(&status.id()) {
            return Arc::clone(existing);
        }
        let status = Arc::new(status);
        self.insert(Arc::clone(&status));
        status
    }

    /// Replace the cache contents with the full ordered list fetched under
    /// `generation`, marking it fully loaded.
    pub fn fill(
        &mut self,
        generation: u64,
        statuses: Vec<OrderStatusWithEmails>,
    ) -> Vec<Arc<OrderStatusWithEmails>> {
        let statuses: Vec<_> = statuses.into_iter().map(Arc::new).collect();
        if generation != self.generation {
            return statuses;
        }
        self.by_id.clear();
        self.by_handle.clear();
        for status in &statuses {
            self.insert(Arc::clone(status));
        }
        self.all = Some(statuses.clone());
        statuses
    }

    /// Drop every memoized status.
    pub fn invalidate(&mut self) {
        self.by_id.clear();
        self.by_handle.clear();
        self.all = None;
        self.generation = self.generation.wrapping_add(1);
    }

    fn insert(&mut self, status: Arc<OrderStatusWithEmails>) {
        self.by_handle
            .insert(status.handle().to_string(), Arc::clone(&status));
        self.by_id.insert(status.id(), status);
    }

    fn miss(&self) -> Lookup {
        if self.is_fully_loaded() {
            Lookup::Absent
        } else {
            Lookup::Miss {
                generation: self.generation,
            }
        }
    }
}
