//! Selector fragments.
//!
//! A fragment is one combinator-free pattern such as `td#cell.k1.k2:hover`.
//! Its parts always appear in the order element, id, classes, attributes,
//! pseudo-classes; attributes are recognized and then dropped.

use std::fmt;

use crate::css::tokenizer::{tokenize, Token};
use crate::error::{Error, Result};

/// One atomic selector fragment.
///
/// Empty `element` / `id` mean "no constraint". Classes and pseudo-classes are
/// ordered sets: duplicates are dropped on construction and comparisons ignore
/// order.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    element: String,
    id: String,
    classes: Vec<String>,
    pseudo_classes: Vec<String>,
}

impl Selector {
    /// Parse a single fragment, e.g. `"div#main.k1:hover"`.
    ///
    /// Whitespace, combinators, out-of-order parts and unknown characters are
    /// all rejected.
    pub fn parse(fragment: &str) -> Result<Self> {
        let mut builder = FragmentBuilder::default();
        for (token, text) in tokenize(fragment)? {
            if !token.is_fragment_part() {
                return Err(Error::invalid_selector(
                    fragment,
                    format!("unexpected '{}' inside a selector fragment", text.trim()),
                ));
            }
            builder
                .push(token, text)
                .map_err(|message| Error::invalid_selector(fragment, message))?;
        }
        builder
            .finish()
            .ok_or_else(|| Error::invalid_selector(fragment, "empty selector fragment"))
    }

    /// Build a fragment from already-split fields.
    ///
    /// Used for query chains composed from a live element, where there is
    /// nothing to parse. Pseudo-classes should carry their leading colon.
    pub fn from_parts<C, P>(
        element: impl Into<String>,
        id: impl Into<String>,
        classes: C,
        pseudo_classes: P,
    ) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let mut selector = Self {
            element: element.into(),
            id: id.into(),
            ..Self::default()
        };
        for class in classes {
            insert_unique(&mut selector.classes, class.into());
        }
        for pseudo in pseudo_classes {
            insert_unique(&mut selector.pseudo_classes, pseudo.into());
        }
        selector
    }

    /// Element name, empty when unconstrained.
    pub fn element(&self) -> &str {
        &self.element
    }

    /// Id without the `#`, empty when unconstrained.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Class names without the `.`.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Pseudo-class tokens including their leading `:` or `::`.
    pub fn pseudo_classes(&self) -> &[String] {
        &self.pseudo_classes
    }

    /// The class used as this fragment's class index key.
    pub fn last_class(&self) -> Option<&str> {
        self.classes.last().map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn has_pseudo_class(&self, pseudo: &str) -> bool {
        self.pseudo_classes.iter().any(|p| p == pseudo)
    }

    /// Whether the element is the explicit universal `*`.
    pub fn is_universal(&self) -> bool {
        self.element == "*"
    }

    /// Whether `other` satisfies every constraint this fragment states.
    ///
    /// `other` may carry extra classes or pseudo-classes. A `*` element is
    /// satisfied by any element.
    pub fn is_subset(&self, other: &Selector) -> bool {
        (self.element.is_empty() || self.is_universal() || self.element == other.element)
            && (self.id.is_empty() || self.id == other.id)
            && self.classes.iter().all(|c| other.has_class(c))
            && self.pseudo_classes.iter().all(|p| other.has_pseudo_class(p))
    }

    /// Identity test: element, id and classes must be identical, only
    /// pseudo-classes may be a subset. Resolution matches every fragment with
    /// [`is_subset`](Selector::is_subset); this is for callers asking whether a
    /// rule names exactly this element.
    pub fn is_child(&self, other: &Selector) -> bool {
        self.element == other.element
            && self.id == other.id
            && set_eq(&self.classes, &other.classes)
            && self.pseudo_classes.iter().all(|p| other.has_pseudo_class(p))
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
            && self.id == other.id
            && set_eq(&self.classes, &other.classes)
            && set_eq(&self.pseudo_classes, &other.pseudo_classes)
    }
}

impl Eq for Selector {}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element)?;
        if !self.id.is_empty() {
            write!(f, "#{}", self.id)?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for pseudo in &self.pseudo_classes {
            write!(f, "{pseudo}")?;
        }
        Ok(())
    }
}

fn insert_unique(set: &mut Vec<String>, value: String) {
    if !value.is_empty() && !set.contains(&value) {
        set.push(value);
    }
}

/// Both sides are duplicate-free, so equal length plus containment is set
/// equality.
fn set_eq(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.contains(x))
}

/// Position of a fragment part in `element#id.class[attr]:pseudo`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    #[default]
    Start,
    Element,
    Id,
    Class,
    Attribute,
    Pseudo,
}

/// Incremental fragment builder shared by [`Selector::parse`] and the chain
/// parser.
#[derive(Debug, Default)]
pub(crate) struct FragmentBuilder {
    selector: Selector,
    stage: Stage,
}

impl FragmentBuilder {
    /// Whether no part has been pushed yet.
    pub(crate) fn is_empty(&self) -> bool {
        self.stage == Stage::Start
    }

    /// Append one fragment token. Returns a message when the part is out of
    /// order or the token is not a fragment part.
    pub(crate) fn push(&mut self, token: Token, text: &str) -> std::result::Result<(), String> {
        let (stage, allowed) = match token {
            Token::Element | Token::Star => (Stage::Element, self.stage < Stage::Element),
            Token::Id => (Stage::Id, self.stage < Stage::Id),
            Token::Class => (Stage::Class, self.stage <= Stage::Class),
            Token::Attribute => (Stage::Attribute, self.stage <= Stage::Attribute),
            Token::Pseudo => (Stage::Pseudo, true),
            _ => return Err(format!("'{text}' is not part of a selector fragment")),
        };
        if !allowed {
            return Err(format!(
                "'{text}' is out of order (expected element#id.class[attr]:pseudo)"
            ));
        }

        match token {
            Token::Element | Token::Star => self.selector.element = text.to_string(),
            Token::Id => self.selector.id = text[1..].to_string(),
            Token::Class => insert_unique(&mut self.selector.classes, text[1..].to_string()),
            Token::Pseudo => insert_unique(&mut self.selector.pseudo_classes, text.to_string()),
            _ => {}
        }
        self.stage = stage;
        Ok(())
    }

    /// Take the built fragment, leaving the builder empty. `None` if nothing
    /// was pushed.
    pub(crate) fn finish(&mut self) -> Option<Selector> {
        if self.is_empty() {
            return None;
        }
        self.stage = Stage::Start;
        Some(std::mem::take(&mut self.selector))
    }
}
