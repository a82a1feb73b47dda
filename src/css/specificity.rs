//! Integer specificity.
//!
//! A rule's weight is folded into one number:
//!
//! ```text
//! id_count * 100000 + (class_count + pseudo_count) * 100 + element_count
//! ```
//!
//! Chains that use the universal element or a sibling combinator rank at zero.
//! Sibling relations are not modelled by the matcher, so those chains never
//! outrank a plain rule.

use crate::css::selector::Selector;

const ID_WEIGHT: u32 = 100_000;
const CLASS_WEIGHT: u32 = 100;

/// Rule specificity. Higher wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity(u32);

impl Specificity {
    /// Zero specificity (universal and sibling chains).
    pub const ZERO: Specificity = Specificity(0);

    /// Build a specificity from raw counts.
    pub fn from_counts(ids: u32, classes: u32, elements: u32) -> Self {
        Self(
            ids.saturating_mul(ID_WEIGHT)
                .saturating_add(classes.saturating_mul(CLASS_WEIGHT))
                .saturating_add(elements),
        )
    }

    /// The numeric value.
    pub fn value(self) -> u32 {
        self.0
    }
}

/// Accumulates selector counts across the fragments of a chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecificityCounts {
    pub ids: u32,
    pub classes: u32,
    pub elements: u32,
    /// Set once any fragment names the universal element.
    pub universal: bool,
}

impl SpecificityCounts {
    /// Add one fragment's contribution.
    pub fn add(&mut self, selector: &Selector) {
        if !selector.id().is_empty() {
            self.ids += 1;
        }
        self.classes += (selector.classes().len() + selector.pseudo_classes().len()) as u32;
        if selector.is_universal() {
            self.universal = true;
        } else if !selector.element().is_empty() {
            self.elements += 1;
        }
    }

    /// Fold the counts into a [`Specificity`], honoring the zero rules.
    pub fn finish(&self, complex: bool) -> Specificity {
        if self.universal || complex {
            Specificity::ZERO
        } else {
            Specificity::from_counts(self.ids, self.classes, self.elements)
        }
    }
}
