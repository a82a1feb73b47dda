//! Tree operations: insert, remove, and query chain assembly.

use slotmap::{SecondaryMap, SlotMap};

use super::node::{ElementData, ElementId};
use crate::css::chain::SelectorChain;
use crate::error::{Error, Result};

/// Empty slice constant for returning when an element has no children.
const EMPTY_CHILDREN: &[ElementId] = &[];

/// An element tree, backed by a slotmap arena.
///
/// All elements live in a single `SlotMap`. Parent/child relationships are
/// stored in secondary maps so that lookup is O(1).
#[derive(Debug)]
pub struct ElementTree {
    elements: SlotMap<ElementId, ElementData>,
    children: SecondaryMap<ElementId, Vec<ElementId>>,
    parent: SecondaryMap<ElementId, ElementId>,
}

impl ElementTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            elements: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
        }
    }

    /// Insert a root-level element (no parent).
    pub fn insert(&mut self, data: ElementData) -> ElementId {
        let id = self.elements.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Insert an element as the last child of `parent`.
    pub fn insert_child(&mut self, parent: ElementId, data: ElementData) -> Result<ElementId> {
        if !self.elements.contains_key(parent) {
            return Err(Error::UnknownElement(format!("{parent:?}")));
        }
        let id = self.elements.insert(data);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        Ok(id)
    }

    /// Remove an element and all its descendants.
    ///
    /// Returns the data of the removed element, or `None` if it didn't exist.
    pub fn remove(&mut self, id: ElementId) -> Option<ElementData> {
        if !self.elements.contains_key(id) {
            return None;
        }

        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
        }

        let mut stack = vec![id];
        let mut removed = None;
        while let Some(current) = stack.pop() {
            if let Some(kids) = self.children.remove(current) {
                stack.extend(kids);
            }
            self.parent.remove(current);
            let data = self.elements.remove(current);
            if current == id {
                removed = data;
            }
        }
        removed
    }

    /// Get the parent of an element, if it has one.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.parent.get(id).copied()
    }

    /// Get the children of an element. Returns an empty slice if the element
    /// has no children or does not exist.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to its root, collecting ancestor ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the root.
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementData> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementData> {
        self.elements.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// The query chain describing `id`: one fragment per element from its
    /// root down to `id`, joined by child combinators.
    pub fn query_chain(&self, id: ElementId) -> Result<SelectorChain> {
        let Some(element) = self.elements.get(id) else {
            return Err(Error::UnknownElement(format!("{id:?}")));
        };
        let mut path: Vec<_> = self
            .ancestors(id)
            .into_iter()
            .filter_map(|ancestor| self.elements.get(ancestor))
            .map(ElementData::to_selector)
            .collect();
        path.reverse();
        path.push(element.to_selector());
        SelectorChain::from_path(path)
    }
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Build a small test tree:
    /// ```text
    ///       table
    ///      /     \
    ///    tr       tr.odd
    ///   /  \
    ///  td   td#last
    /// ```
    fn build_tree() -> (ElementTree, ElementId, ElementId, ElementId, ElementId, ElementId) {
        let mut tree = ElementTree::new();
        let root = tree.insert(ElementData::new("table"));
        let a = tree.insert_child(root, ElementData::new("tr")).unwrap();
        let b = tree
            .insert_child(root, ElementData::new("tr").with_class("odd"))
            .unwrap();
        let c = tree.insert_child(a, ElementData::new("td")).unwrap();
        let d = tree
            .insert_child(a, ElementData::new("td").with_id("last"))
            .unwrap();
        (tree, root, a, b, c, d)
    }

    #[test]
    fn insert_child_parent_relationship() {
        let (tree, root, a, _b, c, _d) = build_tree();
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.parent(c), Some(a));
        assert_eq!(tree.parent(root), None);
    }

    #[test]
    fn insert_child_unknown_parent() {
        let mut tree = ElementTree::new();
        let stale = tree.insert(ElementData::new("x"));
        tree.remove(stale);
        let err = tree.insert_child(stale, ElementData::new("y"));
        assert!(matches!(err, Err(Error::UnknownElement(_))));
        assert!(tree.is_empty());
    }

    #[test]
    fn children_list() {
        let (tree, root, a, b, c, d) = build_tree();
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.children(a), &[c, d]);
        assert!(tree.children(c).is_empty());
    }

    #[test]
    fn ancestors() {
        let (tree, root, a, _b, c, _d) = build_tree();
        assert_eq!(tree.ancestors(c), vec![a, root]);
        assert!(tree.ancestors(root).is_empty());
    }

    #[test]
    fn get_mut_changes_state() {
        let (mut tree, _root, a, ..) = build_tree();
        tree.get_mut(a).unwrap().set_state("hover", true);
        assert!(tree.get(a).unwrap().has_state(":hover"));
    }

    #[test]
    fn remove_subtree() {
        let (mut tree, root, a, b, c, d) = build_tree();
        assert_eq!(tree.remove(a).map(|data| data.tag), Some("tr".to_string()));
        assert!(!tree.contains(c));
        assert!(!tree.contains(d));
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.len(), 2);
        assert!(tree.remove(a).is_none());
    }

    #[test]
    fn query_chain_root_first() {
        let (tree, _root, _a, _b, _c, d) = build_tree();
        let chain = tree.query_chain(d).unwrap();
        assert_eq!(chain, SelectorChain::parse("table > tr > td#last").unwrap());
    }

    #[test]
    fn query_chain_reflects_state() {
        let (mut tree, _root, _a, b, ..) = build_tree();
        tree.get_mut(b).unwrap().set_state("hover", true);
        let chain = tree.query_chain(b).unwrap();
        assert_eq!(chain.to_string(), "table > tr.odd:hover");
    }

    #[test]
    fn query_chain_unknown_element() {
        let (mut tree, _root, _a, _b, c, _d) = build_tree();
        tree.remove(c);
        assert!(matches!(
            tree.query_chain(c),
            Err(Error::UnknownElement(_))
        ));
    }
}
