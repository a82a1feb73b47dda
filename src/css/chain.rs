//! Selector chains: fragments joined by combinators.
//!
//! A chain stores `(Selector, Combinator)` links left to right. Each link's
//! combinator joins it to the next link; [`Combinator::End`] closes one
//! comma-separated alternative, so a well-formed chain always ends on `End`.
//!
//! `"div.k1 > span, p"` is stored as:
//!
//! ```text
//! [(div.k1, Child), (span, End), (p, End)]
//! ```
//!
//! Chains are immutable and cheap to clone. [`SelectorChain::split`] hands out
//! range views over the same backing links.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::css::selector::{FragmentBuilder, Selector};
use crate::css::specificity::{Specificity, SpecificityCounts};
use crate::css::tokenizer::{tokenize, Token};
use crate::error::{Error, Result};

/// Combinator following a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// End of one alternative (`,` or end of input).
    End,
    /// Whitespace: `A B`.
    Descendant,
    /// `A > B`.
    Child,
    /// `A + B`.
    AdjacentSibling,
    /// `A ~ B`.
    Sibling,
}

impl Combinator {
    /// Sibling-family combinators make a chain complex.
    pub fn is_sibling(self) -> bool {
        matches!(self, Combinator::AdjacentSibling | Combinator::Sibling)
    }

    fn from_token(token: Token) -> Option<Self> {
        match token {
            Token::Comma => Some(Combinator::End),
            Token::Greater => Some(Combinator::Child),
            Token::Plus => Some(Combinator::AdjacentSibling),
            Token::Tilde => Some(Combinator::Sibling),
            _ => None,
        }
    }
}

/// An immutable, analyzed selector chain.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    links: Arc<[(Selector, Combinator)]>,
    range: Range<usize>,
    specificity: Specificity,
    chain_count: usize,
    is_complex: bool,
}

impl SelectorChain {
    /// Parse a full selector string such as `"table td, th:first-child"`.
    pub fn parse(input: &str) -> Result<Self> {
        let links = parse_links(input)?;
        Self::from_links(links).map_err(|e| match e {
            Error::InvalidSelector { message, .. } => Error::invalid_selector(input, message),
            other => other,
        })
    }

    /// Build a chain from explicit links, validating the terminator.
    pub fn from_links(links: Vec<(Selector, Combinator)>) -> Result<Self> {
        match links.last() {
            None => return Err(Error::invalid_selector("", "empty selector chain")),
            Some((last, combinator)) if *combinator != Combinator::End => {
                return Err(Error::invalid_selector(
                    last.to_string(),
                    format!("chain ends on a dangling {combinator:?} combinator"),
                ));
            }
            Some(_) => {}
        }
        let len = links.len();
        Ok(Self::view(links.into(), 0..len))
    }

    /// Build a single-alternative chain from fragments ordered root first,
    /// target last, joined by child combinators. This is the shape of a query
    /// chain describing one element and its ancestors.
    pub fn from_path(path: impl IntoIterator<Item = Selector>) -> Result<Self> {
        let mut links: Vec<(Selector, Combinator)> = path
            .into_iter()
            .map(|selector| (selector, Combinator::Child))
            .collect();
        if let Some(last) = links.last_mut() {
            last.1 = Combinator::End;
        }
        Self::from_links(links)
    }

    fn view(links: Arc<[(Selector, Combinator)]>, range: Range<usize>) -> Self {
        let (specificity, chain_count, is_complex) = analyze(&links[range.clone()]);
        Self {
            links,
            range,
            specificity,
            chain_count,
            is_complex,
        }
    }

    /// The links of this chain (or view).
    pub fn links(&self) -> &[(Selector, Combinator)] {
        &self.links[self.range.clone()]
    }

    pub fn selectors(&self) -> impl DoubleEndedIterator<Item = &Selector> + '_ {
        self.links().iter().map(|(selector, _)| selector)
    }

    pub fn combinators(&self) -> impl DoubleEndedIterator<Item = Combinator> + '_ {
        self.links().iter().map(|(_, combinator)| *combinator)
    }

    /// The rightmost fragment: the element a single chain styles.
    pub fn subject(&self) -> &Selector {
        // A chain is never empty, see `from_links`.
        &self.links()[self.links().len() - 1].0
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// Number of comma-separated alternatives.
    pub fn chain_count(&self) -> usize {
        self.chain_count
    }

    pub fn is_single_chain(&self) -> bool {
        self.chain_count == 1
    }

    /// Whether any combinator is a sibling combinator.
    pub fn is_complex(&self) -> bool {
        self.is_complex
    }

    /// Split into one chain per alternative. The parts share this chain's
    /// storage.
    pub fn split(&self) -> Vec<SelectorChain> {
        if self.is_single_chain() {
            return vec![self.clone()];
        }

        let mut parts = Vec::with_capacity(self.chain_count);
        let mut start = self.range.start;
        for (offset, (_, combinator)) in self.links().iter().enumerate() {
            if *combinator == Combinator::End {
                let end = self.range.start + offset + 1;
                parts.push(Self::view(Arc::clone(&self.links), start..end));
                start = end;
            }
        }
        parts
    }

    /// Whether this (rule) chain is satisfied somewhere along `other`, an
    /// ancestor path ordered root first.
    ///
    /// Fragments are matched right to left, each one somewhere to the left of
    /// the previous match. Combinators are ignored: `a > b`, `a + b` and
    /// `a ~ b` all match like `a b`. Multi-alternative chains never apply.
    pub fn applies_to(&self, other: &SelectorChain) -> bool {
        self.applies_to_path(other.links())
    }

    pub(crate) fn applies_to_path(&self, path: &[(Selector, Combinator)]) -> bool {
        if !self.is_single_chain() {
            return false;
        }

        let mut cursor = path.len();
        for selector in self.selectors().rev() {
            match path[..cursor]
                .iter()
                .rposition(|(candidate, _)| selector.is_subset(candidate))
            {
                Some(found) => cursor = found,
                None => return false,
            }
        }
        true
    }
}

impl PartialEq for SelectorChain {
    fn eq(&self, other: &Self) -> bool {
        self.links() == other.links()
    }
}

impl Eq for SelectorChain {}

impl fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.len().saturating_sub(1);
        for (i, (selector, combinator)) in self.links().iter().enumerate() {
            write!(f, "{selector}")?;
            if i == last {
                break;
            }
            match combinator {
                Combinator::End => write!(f, ", ")?,
                Combinator::Descendant => write!(f, " ")?,
                Combinator::Child => write!(f, " > ")?,
                Combinator::AdjacentSibling => write!(f, " + ")?,
                Combinator::Sibling => write!(f, " ~ ")?,
            }
        }
        Ok(())
    }
}

/// Compute `(specificity, chain_count, is_complex)` for a run of links.
fn analyze(links: &[(Selector, Combinator)]) -> (Specificity, usize, bool) {
    let mut counts = SpecificityCounts::default();
    let mut chain_count = 0;
    let mut is_complex = false;

    for (selector, combinator) in links {
        counts.add(selector);
        if *combinator == Combinator::End {
            chain_count += 1;
        } else if combinator.is_sibling() {
            is_complex = true;
        }
    }

    (counts.finish(is_complex), chain_count, is_complex)
}

/// Turn a selector string into links.
///
/// Whitespace after a fragment provisionally records a descendant
/// combinator; an explicit symbol that follows replaces it.
fn parse_links(input: &str) -> Result<Vec<(Selector, Combinator)>> {
    let mut links: Vec<(Selector, Combinator)> = Vec::new();
    let mut fragment = FragmentBuilder::default();
    // Whether the last link's combinator came from whitespace alone.
    let mut provisional = false;

    for (token, text) in tokenize(input)? {
        if token.is_fragment_part() {
            fragment
                .push(token, text)
                .map_err(|message| Error::invalid_selector(input, message))?;
            continue;
        }

        if token == Token::Whitespace {
            if let Some(selector) = fragment.finish() {
                links.push((selector, Combinator::Descendant));
                provisional = true;
            }
            continue;
        }

        let Some(combinator) = Combinator::from_token(token) else {
            return Err(Error::invalid_selector(input, format!("unexpected '{text}'")));
        };
        if let Some(selector) = fragment.finish() {
            links.push((selector, combinator));
        } else if provisional {
            if let Some(last) = links.last_mut() {
                last.1 = combinator;
            }
        } else {
            return Err(Error::invalid_selector(
                input,
                format!("'{text}' without a preceding selector"),
            ));
        }
        provisional = false;
    }

    if let Some(selector) = fragment.finish() {
        links.push((selector, Combinator::End));
    } else {
        match links.last_mut() {
            None => return Err(Error::invalid_selector(input, "empty selector")),
            Some(last) if provisional => last.1 = Combinator::End,
            Some((_, Combinator::End)) => {
                return Err(Error::invalid_selector(input, "empty selector after ','"));
            }
            Some((_, combinator)) => {
                return Err(Error::invalid_selector(
                    input,
                    format!("dangling {combinator:?} combinator at end of selector"),
                ));
            }
        }
    }

    Ok(links)
}
