use std::collections::HashMap;

struct Entry<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Fixed-capacity LRU cache, O(1) get/put/delete.
///
/// Nodes live in a slab (`Vec<Option<Entry<V>>>`) addressed by index, with a
/// free-list of reclaimed slots — the same "parallel array + explicit
/// indices instead of pointers" idiom used for the flat vector store, which
/// sidesteps `Rc<RefCell<_>>` cycles for what would otherwise be an
/// intrusive doubly linked list.
pub struct LRUCache<V> {
    capacity: usize,
    map: HashMap<String, usize>,
    arena: Vec<Option<Entry<V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<V> LRUCache<V> {
    pub fn new(capacity: usize) -> Self {
        LRUCache {
            capacity,
            map: HashMap::new(),
            arena: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(|s| s.as_str())
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let entry = self.arena[idx].as_ref().expect("unlink: dangling slot");
            (entry.prev, entry.next)
        };
        match prev {
            Some(p) => self.arena[p].as_mut().unwrap().next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.arena[n].as_mut().unwrap().prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let entry = self.arena[idx].as_mut().unwrap();
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(h) => self.arena[h].as_mut().unwrap().prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn alloc(&mut self, entry: Entry<V>) -> usize {
        if let Some(idx) = self.free.pop() {
            self.arena[idx] = Some(entry);
            idx
        } else {
            self.arena.push(Some(entry));
            self.arena.len() - 1
        }
    }

    /// Fetch a value, marking it most-recently-used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.arena[idx].as_ref().map(|e| &e.value)
    }

    /// Insert or update a value, evicting the least-recently-used entry if
    /// the cache is over capacity.
    pub fn put(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if let Some(&idx) = self.map.get(&key) {
            self.arena[idx].as_mut().unwrap().value = value;
            self.move_to_front(idx);
            return;
        }

        let idx = self.alloc(Entry {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.map.insert(key, idx);
        self.push_front(idx);

        if self.map.len() > self.capacity {
            if let Some(lru_idx) = self.tail {
                self.unlink(lru_idx);
                let evicted = self.arena[lru_idx].take().expect("evict: dangling slot");
                self.map.remove(&evicted.key);
                self.free.push(lru_idx);
            }
        }
    }

    /// Remove a key from the cache. Returns whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let Some(idx) = self.map.remove(key) else {
            return false;
        };
        self.unlink(idx);
        self.arena[idx] = None;
        self.free.push(idx);
        true
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.arena.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_promotes_to_most_recently_used() {
        let mut cache = LRUCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.get("a"), Some(&1)); // "a" now MRU, "b" is LRU
        cache.put("c", 3); // evicts "b"
        assert!(!cache.contains_key("b"));
        assert!(cache.contains_key("a"));
        assert!(cache.contains_key("c"));
    }

    #[test]
    fn put_updates_existing_value_without_growing() {
        let mut cache = LRUCache::new(2);
        cache.put("a", 1);
        cache.put("a", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), Some(&2));
    }

    #[test]
    fn delete_removes_and_frees_slot_for_reuse() {
        let mut cache = LRUCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert_eq!(cache.len(), 1);
        cache.put("c", 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("c"), Some(&3));
    }

    #[test]
    fn eviction_order_is_strictly_lru() {
        let mut cache = LRUCache::new(3);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        cache.get("a"); // order: a, c, b (b is LRU)
        cache.put("d", 4); // evicts b
        assert!(!cache.contains_key("b"));
        for k in ["a", "c", "d"] {
            assert!(cache.contains_key(k));
        }
    }

    #[test]
    fn zero_capacity_never_retains_entries() {
        let mut cache: LRUCache<i32> = LRUCache::new(0);
        cache.put("a", 1);
        assert!(!cache.contains_key("a"));
    }
}
