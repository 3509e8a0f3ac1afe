//! Shared canonical entity registry.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEntity {
    pub entity_id: String,
    pub name: String,
    /// Allocation order.
    pub seq: u64,
}

/// Read-mostly registry of canonical entities, safe to share across scopes.
///
/// New ids come from a single atomic counter, and creation happens under
/// the map's entry lock, so a name is never assigned two ids.
pub struct CandidateRegistry {
    by_name: DashMap<String, CanonicalEntity>,
    next_seq: AtomicU64,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self {
            by_name: DashMap::new(),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Return the entity for `name`, creating it on first sight.
    pub fn get_or_register(&self, name: &str) -> CanonicalEntity {
        let key = normalize_name(name);
        if let Some(existing) = self.by_name.get(&key) {
            return existing.value().clone();
        }
        self.by_name
            .entry(key)
            .or_insert_with(|| {
                let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
                let entity = CanonicalEntity {
                    entity_id: format!("entity-{seq:06}"),
                    name: name.trim().to_string(),
                    seq,
                };
                debug!(entity_id = %entity.entity_id, name = %entity.name, "registered canonical entity");
                entity
            })
            .value()
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<CanonicalEntity> {
        self.by_name.get(&normalize_name(name)).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Current entity ids, for seeding a scope's candidate set.
    pub fn entity_ids(&self) -> BTreeSet<String> {
        self.by_name.iter().map(|e| e.entity_id.clone()).collect()
    }

    /// All entities in allocation order.
    pub fn snapshot(&self) -> Vec<CanonicalEntity> {
        let mut all: Vec<CanonicalEntity> = self.by_name.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|e| e.seq);
        all
    }
}

impl Default for CandidateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Case- and whitespace-insensitive registry key.
fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
