//! LRU List Module
//!
//! Recency ordering for cache eviction, stored as an arena of nodes linked by
//! index so entries can hold a stable handle to their own position.

// == Node ==
#[derive(Debug)]
struct Node {
    key: String,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU List ==
/// Doubly linked list of keys with O(1) promotion and removal.
///
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// Handles returned by [`LruList::push_front`] stay valid until the node is
/// removed; the slot is then recycled for a later insert.
#[derive(Debug, Default)]
pub struct LruList {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl LruList {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    // == Push Front ==
    /// Inserts `key` as the most recently used and returns its handle.
    pub fn push_front(&mut self, key: String) -> usize {
        let node = Node {
            key,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.link_front(idx);
        self.len += 1;
        idx
    }

    // == Move To Front ==
    /// Marks the node at `idx` as most recently used.
    pub fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) || self.node(idx).is_none() {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    // == Remove ==
    /// Unlinks the node at `idx` and returns its key.
    pub fn remove(&mut self, idx: usize) -> Option<String> {
        self.node(idx)?;
        self.unlink(idx);
        let node = self.nodes[idx].take()?;
        self.free.push(idx);
        self.len -= 1;
        Some(node.key)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used key.
    pub fn pop_back(&mut self) -> Option<String> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Peek Back ==
    /// Returns the least recently used key without removing it.
    pub fn peek_back(&self) -> Option<&str> {
        self.tail
            .and_then(|idx| self.node(idx))
            .map(|node| node.key.as_str())
    }

    /// Returns the key stored at `idx`.
    pub fn key(&self, idx: usize) -> Option<&str> {
        self.node(idx).map(|node| node.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates keys from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.node(cursor?)?;
            cursor = node.next;
            Some(node.key.as_str())
        })
    }

    fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.nodes.get_mut(idx).and_then(Option::as_mut)
    }

    fn unlink(&mut self, idx: usize) {
        let Some((prev, next)) = self.node(idx).map(|n| (n.prev, n.next)) else {
            return;
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.node_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => {
                if let Some(node) = self.node_mut(h) {
                    node.prev = Some(idx);
                }
            }
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(lru: &LruList) -> Vec<&str> {
        lru.iter().collect()
    }

    #[test]
    fn test_lru_new() {
        let lru = LruList::new();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.peek_back(), None);
    }

    #[test]
    fn test_lru_push_front_orders_by_insertion() {
        let mut lru = LruList::new();

        lru.push_front("key1".to_string());
        lru.push_front("key2".to_string());
        lru.push_front("key3".to_string());

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.peek_back(), Some("key1"));
        assert_eq!(keys(&lru), vec!["key3", "key2", "key1"]);
    }

    #[test]
    fn test_lru_move_to_front() {
        let mut lru = LruList::new();

        let a = lru.push_front("a".to_string());
        lru.push_front("b".to_string());
        lru.push_front("c".to_string());

        lru.move_to_front(a);

        assert_eq!(lru.peek_back(), Some("b"));
        assert_eq!(keys(&lru), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_lru_move_head_is_noop() {
        let mut lru = LruList::new();

        lru.push_front("a".to_string());
        let b = lru.push_front("b".to_string());

        lru.move_to_front(b);

        assert_eq!(keys(&lru), vec!["b", "a"]);
    }

    #[test]
    fn test_lru_pop_back() {
        let mut lru = LruList::new();

        lru.push_front("key1".to_string());
        lru.push_front("key2".to_string());
        lru.push_front("key3".to_string());

        assert_eq!(lru.pop_back(), Some("key1".to_string()));
        assert_eq!(lru.pop_back(), Some("key2".to_string()));
        assert_eq!(lru.len(), 1);
        assert_eq!(lru.pop_back(), Some("key3".to_string()));
        assert_eq!(lru.pop_back(), None);
        assert!(lru.is_empty());
    }

    #[test]
    fn test_lru_remove_middle() {
        let mut lru = LruList::new();

        lru.push_front("key1".to_string());
        let middle = lru.push_front("key2".to_string());
        lru.push_front("key3".to_string());

        assert_eq!(lru.remove(middle), Some("key2".to_string()));
        assert_eq!(lru.len(), 2);
        assert_eq!(keys(&lru), vec!["key3", "key1"]);
    }

    #[test]
    fn test_lru_remove_twice_is_harmless() {
        let mut lru = LruList::new();

        let idx = lru.push_front("only".to_string());
        assert_eq!(lru.remove(idx), Some("only".to_string()));
        assert_eq!(lru.remove(idx), None);
        assert!(lru.is_empty());
    }

    #[test]
    fn test_lru_recycles_slots() {
        let mut lru = LruList::new();

        let first = lru.push_front("a".to_string());
        lru.remove(first);
        let second = lru.push_front("b".to_string());

        assert_eq!(first, second);
        assert_eq!(lru.key(second), Some("b"));
        assert_eq!(keys(&lru), vec!["b"]);
    }

    #[test]
    fn test_lru_order_after_multiple_touches() {
        let mut lru = LruList::new();

        let a = lru.push_front("a".to_string());
        let b = lru.push_front("b".to_string());
        let c = lru.push_front("c".to_string());

        lru.move_to_front(a);
        lru.move_to_front(c);
        lru.move_to_front(b);

        assert_eq!(lru.pop_back(), Some("a".to_string()));
        assert_eq!(lru.pop_back(), Some("c".to_string()));
        assert_eq!(lru.pop_back(), Some("b".to_string()));
    }
}
