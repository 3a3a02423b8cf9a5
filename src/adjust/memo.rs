use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::LayerId;
use crate::foundation::error::LaminaResult;
use crate::foundation::math::Fnv1a64;

/// Memo key for a derived raster: the source revision plus the parameter fingerprint.
pub fn derived_key(source_revision: u64, params_fingerprint: u64) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_u64(source_revision);
    h.write_u64(params_fingerprint);
    h.finish()
}

/// One memoized value per layer, replaced whenever the requested key differs.
///
/// Invalidation is structural: a changed parameter or source revision yields a different key, and
/// the stale entry is simply overwritten.
#[derive(Debug)]
pub struct LayerMemo<V> {
    entries: HashMap<LayerId, (u64, Arc<V>)>,
    hits: u64,
    misses: u64,
}

impl<V> Default for LayerMemo<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<V> LayerMemo<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_try_insert(
        &mut self,
        layer: LayerId,
        key: u64,
        compute: impl FnOnce() -> LaminaResult<V>,
    ) -> LaminaResult<Arc<V>> {
        if let Some((k, v)) = self.entries.get(&layer)
            && *k == key
        {
            self.hits += 1;
            return Ok(Arc::clone(v));
        }
        self.misses += 1;
        tracing::debug!(%layer, key, "memo miss");
        let v = Arc::new(compute()?);
        self.entries.insert(layer, (key, Arc::clone(&v)));
        Ok(v)
    }

    pub fn peek(&self, layer: LayerId, key: u64) -> Option<Arc<V>> {
        self.entries
            .get(&layer)
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| Arc::clone(v))
    }

    /// Drop entries for layers that no longer exist.
    pub fn retain_layers(&mut self, alive: impl Fn(LayerId) -> bool) {
        self.entries.retain(|id, _| alive(*id));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/adjust/memo.rs"]
mod tests;
