//! Style collection: indexed rule store and cascade resolution.
//!
//! Rules are split into single alternatives and indexed by the subject
//! (rightmost) fragment only, under its id, its last class and its element.
//! Resolution walks a query chain (root first, target last) one prefix at a
//! time, probes the indices with each prefix's subject, and confirms every
//! candidate with [`SelectorChain::applies_to`]. Because every prefix is
//! probed, rules matching an ancestor join the element's cascade.
//!
//! Bags live in an arena. A rule with several alternatives stores its bag once
//! and every resulting node holds the same [`BagId`], so merging into that
//! bag later is visible through all of them.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use slotmap::SlotMap;

use crate::css::bag::{BagId, PropertyBag, StyleData};
use crate::css::chain::SelectorChain;
use crate::css::node::StyleNode;
use crate::css::options::StyleOptions;
use crate::css::parser::{parse_stylesheet, AtRule, Diagnostic};
use crate::css::selector::Selector;
use crate::dom::{ElementId, ElementTree};
use crate::error::{Error, Result};

/// Element index key for `*` rules; probed for every element.
const UNIVERSAL_KEY: &str = "*";

type Index = HashMap<String, Vec<usize>>;

/// Matched bags for one element, in ascending specificity.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleMatch<'a, D> {
    /// Exactly one rule matched.
    Single(&'a D),
    /// Two or more rules matched; later entries override earlier ones.
    Many(Vec<&'a D>),
}

impl<'a, D> StyleMatch<'a, D> {
    pub fn len(&self) -> usize {
        match self {
            StyleMatch::Single(_) => 1,
            StyleMatch::Many(bags) => bags.len(),
        }
    }

    /// Companion to [`len`](StyleMatch::len). Always `false`: resolution
    /// returns `None` instead of an empty match.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn is_single(&self) -> bool {
        matches!(self, StyleMatch::Single(_))
    }

    /// Bags in cascade order.
    pub fn iter(&self) -> impl Iterator<Item = &'a D> + '_ {
        match self {
            StyleMatch::Single(bag) => std::slice::from_ref(bag).iter().copied(),
            StyleMatch::Many(bags) => bags.iter().copied(),
        }
    }

    pub fn into_vec(self) -> Vec<&'a D> {
        match self {
            StyleMatch::Single(bag) => vec![bag],
            StyleMatch::Many(bags) => bags,
        }
    }
}

impl StyleMatch<'_, PropertyBag> {
    /// Fold the cascade into one bag: the last (most specific) value wins.
    pub fn cascade(&self) -> PropertyBag {
        let mut result = PropertyBag::new();
        for bag in self.iter() {
            result.load_data(bag);
        }
        result
    }
}

/// Indexed store of style rules.
#[derive(Debug)]
pub struct StyleCollection<D = PropertyBag> {
    options: StyleOptions,
    bags: SlotMap<BagId, D>,
    /// Node `i` has sequence `i`.
    nodes: Vec<StyleNode>,
    by_id: Index,
    by_class: Index,
    by_element: Index,
    /// Nodes whose subject has no id, class or element (e.g. `:hover`).
    /// They are kept for dumps and duplicate merging but never resolve.
    unindexed: Vec<usize>,
    at_rules: Vec<AtRule>,
}

impl<D> Default for StyleCollection<D> {
    fn default() -> Self {
        Self {
            options: StyleOptions::default(),
            bags: SlotMap::with_key(),
            nodes: Vec::new(),
            by_id: HashMap::new(),
            by_class: HashMap::new(),
            by_element: HashMap::new(),
            unindexed: Vec::new(),
            at_rules: Vec::new(),
        }
    }
}

impl<D: StyleData> StyleCollection<D> {
    /// Create an empty collection with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection with the given options.
    pub fn with_options(options: StyleOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &StyleOptions {
        &self.options
    }

    /// Number of registered nodes (one per distinct alternative).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = &StyleNode> + '_ {
        self.nodes.iter()
    }

    pub fn bag(&self, id: BagId) -> Option<&D> {
        self.bags.get(id)
    }

    /// Mutable access to a bag. Changes are visible through every node that
    /// shares it.
    pub fn bag_mut(&mut self, id: BagId) -> Option<&mut D> {
        self.bags.get_mut(id)
    }

    /// At-rules collected by [`load_str`](StyleCollection::load_str).
    pub fn at_rules(&self) -> &[AtRule] {
        &self.at_rules
    }

    /// Drop every rule, bag and at-rule. Options are kept.
    pub fn clear(&mut self) {
        let options = self.options;
        *self = Self::with_options(options);
    }

    /// Parse `selector` and register it with `data`.
    pub fn add_style(&mut self, selector: &str, data: D) -> Result<()> {
        let chain = SelectorChain::parse(selector)?;
        self.add_chain(&chain, data);
        Ok(())
    }

    /// Register an already parsed chain with `data`.
    ///
    /// Each alternative that exactly repeats a registered chain is merged into
    /// that chain's bag. The remaining alternatives become new nodes sharing
    /// one bag.
    pub fn add_chain(&mut self, chain: &SelectorChain, data: D) {
        let mut fresh: Vec<SelectorChain> = Vec::new();

        for alternative in chain.split() {
            if self.options.merge_duplicates {
                if let Some(existing) = self.find_exact(&alternative) {
                    self.merge_into(existing, &alternative, &data);
                    continue;
                }
                if fresh.contains(&alternative) {
                    continue;
                }
            }
            fresh.push(alternative);
        }

        if fresh.is_empty() {
            return;
        }
        let bag = self.bags.insert(data);
        for alternative in fresh {
            self.insert_node(alternative, bag);
        }
    }

    /// Resolve a query selector string, root first, target last.
    ///
    /// `Ok(None)` means no rule matched, which is distinct from a match whose
    /// bag is empty.
    pub fn get_style_data(&self, query: &str) -> Result<Option<StyleMatch<'_, D>>> {
        let chain = SelectorChain::parse(query)?;
        if !chain.is_single_chain() {
            return Err(Error::invalid_selector(
                query,
                "a query describes one element and must not contain ','",
            ));
        }
        Ok(self.get_style_data_for(&chain))
    }

    /// Resolve a query chain; see [`get_style_data`](StyleCollection::get_style_data).
    pub fn get_style_data_for(&self, query: &SelectorChain) -> Option<StyleMatch<'_, D>> {
        let path = query.links();
        let mut matched: BTreeSet<&StyleNode> = BTreeSet::new();

        for end in 1..=path.len() {
            let prefix = &path[..end];
            for index in self.probe(&prefix[end - 1].0) {
                let node = &self.nodes[index];
                if matched.contains(node) {
                    continue;
                }
                if node.chain().applies_to_path(prefix) {
                    tracing::trace!(rule = %node.chain(), depth = end, "rule matched");
                    matched.insert(node);
                }
            }
        }

        let mut bags = matched.into_iter().map(|node| &self.bags[node.bag()]);
        match (bags.next(), bags.next()) {
            (None, _) => None,
            (Some(only), None) => Some(StyleMatch::Single(only)),
            (Some(first), Some(second)) => {
                let mut all = vec![first, second];
                all.extend(bags);
                Some(StyleMatch::Many(all))
            }
        }
    }

    /// Resolve an element of `tree` using its ancestor path.
    pub fn resolve(
        &self,
        tree: &ElementTree,
        element: ElementId,
    ) -> Result<Option<StyleMatch<'_, D>>> {
        let query = tree.query_chain(element)?;
        Ok(self.get_style_data_for(&query))
    }

    /// Bags of bare element rules for `tag` (`tag`, `tag:state`, `*`), in
    /// ascending specificity. Consumers use these as fallbacks.
    pub fn element_parents(&self, tag: &str) -> Vec<&D> {
        let nodes: BTreeSet<&StyleNode> = [tag, UNIVERSAL_KEY]
            .into_iter()
            .filter_map(|key| self.by_element.get(key))
            .flatten()
            .map(|&index| &self.nodes[index])
            .filter(|node| node.is_element_parent(tag))
            .collect();
        nodes.into_iter().map(|node| &self.bags[node.bag()]).collect()
    }

    /// Nodes that could match an element described by `subject`.
    fn probe<'s>(&'s self, subject: &'s Selector) -> impl Iterator<Item = usize> + 's {
        let universal = (subject.element() != UNIVERSAL_KEY)
            .then(|| self.by_element.get(UNIVERSAL_KEY))
            .flatten();
        [
            self.by_element.get(subject.element()),
            universal,
            self.by_id.get(subject.id()),
        ]
        .into_iter()
        .flatten()
        .chain(
            subject
                .classes()
                .iter()
                .filter_map(move |class| self.by_class.get(class)),
        )
        .flat_map(|bucket| bucket.iter().copied())
    }

    /// The bucket an exact duplicate of `chain` would live in: id, else last
    /// class, else element.
    fn primary_bucket(&self, subject: &Selector) -> &[usize] {
        let bucket = if !subject.id().is_empty() {
            self.by_id.get(subject.id())
        } else if let Some(class) = subject.last_class() {
            self.by_class.get(class)
        } else if !subject.element().is_empty() {
            self.by_element.get(subject.element())
        } else {
            return &self.unindexed;
        };
        bucket.map(Vec::as_slice).unwrap_or_default()
    }

    fn find_exact(&self, chain: &SelectorChain) -> Option<usize> {
        self.primary_bucket(chain.subject())
            .iter()
            .copied()
            .find(|&index| self.nodes[index].chain() == chain)
    }

    fn merge_into(&mut self, index: usize, chain: &SelectorChain, data: &D) {
        let bag_id = self.nodes[index].bag();
        let Some(bag) = self.bags.get_mut(bag_id) else {
            return;
        };
        let replaced = bag.load_data(data);
        tracing::debug!(rule = %chain, "merged duplicate selector into existing rule");
        if self.options.warn_on_override && !replaced.is_empty() {
            tracing::warn!(
                rule = %chain,
                keys = ?replaced,
                "duplicate selector overrides existing properties"
            );
        }
    }

    fn insert_node(&mut self, chain: SelectorChain, bag: BagId) {
        let index = self.nodes.len();
        let subject = chain.subject();
        let mut indexed = false;

        if !subject.id().is_empty() {
            self.by_id.entry(subject.id().to_string()).or_default().push(index);
            indexed = true;
        }
        if let Some(class) = subject.last_class() {
            self.by_class.entry(class.to_string()).or_default().push(index);
            indexed = true;
        }
        if !subject.element().is_empty() {
            self.by_element
                .entry(subject.element().to_string())
                .or_default()
                .push(index);
            indexed = true;
        }
        if !indexed {
            tracing::warn!(rule = %chain, "rule has no id, class or element to index; it will never match");
            self.unindexed.push(index);
        }
        if chain.is_complex() {
            tracing::debug!(rule = %chain, "sibling combinators match as descendants");
        }

        tracing::debug!(
            rule = %chain,
            specificity = chain.specificity().value(),
            "registered style rule"
        );
        self.nodes.push(StyleNode::new(chain, bag, index));
    }
}

impl<D: StyleData + fmt::Display> StyleCollection<D> {
    /// Write every node once, lowest specificity first, as
    /// `"{selector} { \n{properties}\n }\n"`.
    pub fn dump<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        let indexed = self
            .by_id
            .values()
            .chain(self.by_class.values())
            .chain(self.by_element.values())
            .flatten();
        let all: BTreeSet<&StyleNode> = indexed
            .chain(self.unindexed.iter())
            .map(|&index| &self.nodes[index])
            .collect();

        for node in all {
            write!(out, "{} {{ \n{}\n }}\n", node.chain(), self.bags[node.bag()])?;
        }
        Ok(())
    }
}

impl StyleCollection<PropertyBag> {
    /// Build a collection from stylesheet text.
    pub fn from_css(text: &str) -> Result<Self> {
        let mut collection = Self::new();
        collection.load_str(text)?;
        Ok(collection)
    }

    /// Read stylesheet text and register every rule, amending what is
    /// already registered.
    ///
    /// Soft problems come back as diagnostics (they are also logged). An
    /// invalid selector stops loading with an error; rules before it stay
    /// registered.
    pub fn load_str(&mut self, text: &str) -> Result<Vec<Diagnostic>> {
        let sheet = parse_stylesheet(text);
        self.at_rules.extend(sheet.at_rules);
        for rule in sheet.rules {
            self.add_style(&rule.selector, rule.properties)?;
        }
        Ok(sheet.diagnostics)
    }

    /// Read a stylesheet file; see [`load_str`](StyleCollection::load_str).
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<Diagnostic>> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        tracing::debug!(path = %path.display(), "loading stylesheet");
        self.load_str(&text)
    }
}
