//! Stable handles for host-owned nodes
//!
//! The engine addresses elements by [`ElementId`]; the browser hands out
//! fresh JS wrappers for the same node on every lookup. The registry owns one
//! wrapper per id. Ids are never reused, so a stale id held by a pending task
//! resolves to nothing once its node has been released.

use std::collections::HashMap;

use pagefx_core::ElementId;

#[derive(Debug, Clone)]
pub struct Registry<T> {
    nodes: HashMap<usize, T>,
    next_id: usize,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id for `node`
    pub fn insert(&mut self, node: T) -> ElementId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, node);
        ElementId(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&T> {
        self.nodes.get(&id.0)
    }

    /// Forget `id`, handing back its node
    pub fn release(&mut self, id: ElementId) -> Option<T> {
        self.nodes.remove(&id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Parse the id stored on a node's key attribute
pub fn parse_key(value: &str) -> Option<ElementId> {
    value.parse().ok().map(ElementId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut registry = Registry::new();
        let a = registry.insert("header".to_string());
        let b = registry.insert("nav-menu".to_string());
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(b).map(String::as_str), Some("nav-menu"));
        assert_eq!(registry.get(ElementId(9)), None);
    }

    #[test]
    fn test_release_frees_node_and_never_reuses_id() {
        let mut registry = Registry::new();
        let ripple = registry.insert("span".to_string());
        assert_eq!(registry.release(ripple).as_deref(), Some("span"));
        assert!(registry.is_empty());
        assert_eq!(registry.get(ripple), None);
        assert_eq!(registry.release(ripple), None);

        let next = registry.insert("span".to_string());
        assert_ne!(next, ripple);
        assert_eq!(registry.get(ripple), None);
    }

    #[test]
    fn test_many_ripples_do_not_accumulate() {
        let mut registry = Registry::new();
        let header = registry.insert("header".to_string());
        for _ in 0..1000 {
            let ripple = registry.insert("span".to_string());
            registry.release(ripple);
        }
        assert_eq!(registry.len(), 1);
        assert!(registry.get(header).is_some());
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("42"), Some(ElementId(42)));
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("header"), None);
    }
}
