//! Style nodes: one single-alternative chain bound to one bag.

use std::cmp::Ordering;

use crate::css::bag::BagId;
use crate::css::chain::SelectorChain;
use crate::css::specificity::Specificity;

/// A registered rule alternative.
///
/// Ordered by specificity, then by registration sequence, so two distinct
/// nodes never compare equal and a sorted set keeps both.
#[derive(Debug, Clone)]
pub struct StyleNode {
    chain: SelectorChain,
    bag: BagId,
    sequence: usize,
}

impl StyleNode {
    /// `chain` must be a single alternative; callers split first.
    pub(crate) fn new(chain: SelectorChain, bag: BagId, sequence: usize) -> Self {
        debug_assert!(chain.is_single_chain(), "style nodes hold one alternative");
        Self {
            chain,
            bag,
            sequence,
        }
    }

    pub fn chain(&self) -> &SelectorChain {
        &self.chain
    }

    /// Handle of the (possibly shared) bag.
    pub fn bag(&self) -> BagId {
        self.bag
    }

    /// Registration order within the owning collection.
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn specificity(&self) -> Specificity {
        self.chain.specificity()
    }

    /// Sort key used by resolution sets.
    pub(crate) fn order_key(&self) -> (Specificity, usize) {
        (self.specificity(), self.sequence)
    }

    /// Whether this is a bare element rule for `tag`: one fragment naming
    /// `tag` or `*`, with no class constraint.
    pub fn is_element_parent(&self, tag: &str) -> bool {
        let subject = self.chain.subject();
        self.chain.len() == 1
            && (subject.element() == tag || subject.is_universal())
            && subject.classes().is_empty()
    }
}

impl PartialEq for StyleNode {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}

impl Eq for StyleNode {}

impl PartialOrd for StyleNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StyleNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use slotmap::SlotMap;

    use super::*;

    fn node(selector: &str, sequence: usize) -> StyleNode {
        let mut bags: SlotMap<BagId, ()> = SlotMap::with_key();
        let chain = SelectorChain::parse(selector).unwrap();
        StyleNode::new(chain, bags.insert(()), sequence)
    }

    #[test]
    fn orders_by_specificity_first() {
        let id = node("#a", 0);
        let class = node(".b", 1);
        let element = node("c", 2);
        assert!(element < class);
        assert!(class < id);
    }

    #[test]
    fn equal_specificity_never_ties() {
        let first = node("td", 0);
        let second = node("th", 1);
        assert_eq!(first.specificity(), second.specificity());
        assert_ne!(first, second);
        assert!(first < second);
    }

    #[test]
    fn sorted_set_keeps_equal_specificity_nodes() {
        let set: BTreeSet<StyleNode> = (0..50).map(|i| node("td", i)).collect();
        assert_eq!(set.len(), 50);
        let sequences: Vec<usize> = set.iter().map(StyleNode::sequence).collect();
        assert_eq!(sequences, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn element_parent() {
        assert!(node("td", 0).is_element_parent("td"));
        assert!(node("td:hover", 0).is_element_parent("td"));
        assert!(node("*", 0).is_element_parent("td"));
        assert!(!node("td.x", 0).is_element_parent("td"));
        assert!(!node("tr td", 0).is_element_parent("td"));
        assert!(!node("th", 0).is_element_parent("td"));
    }
}
