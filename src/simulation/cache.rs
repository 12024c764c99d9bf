//! In-memory cache of simulated percentile tables.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::simulation::percentiles::WeekPercentiles;

/// Cache key: a percentile table is valid for one template at one length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileKey {
    /// Template identity.
    pub template_id: Uuid,
    /// Program length the table was simulated for.
    pub week_count: u32,
}

impl PercentileKey {
    /// Create a key.
    pub fn new(template_id: Uuid, week_count: u32) -> Self {
        Self {
            template_id,
            week_count,
        }
    }
}

/// Cache of immutable percentile tables keyed by `(template, week count)`.
///
/// Tables are shared via `Arc` so live classification can hold one while a
/// fresh simulation replaces the entry.
#[derive(Debug, Default)]
pub struct PercentileCache {
    entries: HashMap<PercentileKey, Arc<Vec<WeekPercentiles>>>,
}

impl PercentileCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached table.
    pub fn get(&self, key: &PercentileKey) -> Option<Arc<Vec<WeekPercentiles>>> {
        self.entries.get(key).cloned()
    }

    /// Store a table, replacing any previous entry for the key.
    pub fn insert(&mut self, key: PercentileKey, weeks: Vec<WeekPercentiles>) {
        self.entries.insert(key, Arc::new(weeks));
    }

    /// Whether a table exists for the key.
    pub fn contains(&self, key: &PercentileKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop all entries for a template, across week counts.
    pub fn invalidate_template(&mut self, template_id: Uuid) {
        self.entries.retain(|key, _| key.template_id != template_id);
    }

    /// Number of cached tables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
