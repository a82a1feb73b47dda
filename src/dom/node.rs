//! Element types: ElementId, ElementData.

use slotmap::new_key_type;

use crate::css::selector::Selector;

new_key_type! {
    /// Unique identifier for an element. Copy, lightweight (u64).
    pub struct ElementId;
}

/// The selector-relevant state of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Element name (e.g. "td", "button").
    pub tag: String,
    /// Optional unique id (`#id` selector).
    pub id: Option<String>,
    /// Classes (`.class` selector).
    pub classes: Vec<String>,
    /// Active pseudo-classes, each with its leading `:` (e.g. ":hover").
    pub pseudo_classes: Vec<String>,
}

impl ElementData {
    /// Create an element with the given tag and no id, classes or state.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            pseudo_classes: Vec::new(),
        }
    }

    /// Set the id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a single class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Add multiple classes (builder).
    pub fn with_classes(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for class in classes {
            let class = class.into();
            if !self.classes.contains(&class) {
                self.classes.push(class);
            }
        }
        self
    }

    /// Activate a pseudo-class (builder). The leading `:` is optional.
    pub fn with_pseudo_class(mut self, pseudo: &str) -> Self {
        self.set_state(pseudo, true);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Toggle a class: add if absent, remove if present. The next query chain
    /// built for the element reflects the change.
    pub fn toggle_class(&mut self, class: &str) {
        if self.has_class(class) {
            self.classes.retain(|c| c != class);
        } else {
            self.classes.push(class.to_owned());
        }
    }

    /// Whether a pseudo-class such as `"hover"` or `":hover"` is active.
    pub fn has_state(&self, pseudo: &str) -> bool {
        let pseudo = normalize_pseudo(pseudo);
        self.pseudo_classes.iter().any(|p| *p == pseudo)
    }

    /// Turn a pseudo-class on or off. The leading `:` is optional.
    pub fn set_state(&mut self, pseudo: &str, active: bool) {
        let pseudo = normalize_pseudo(pseudo);
        let present = self.pseudo_classes.iter().any(|p| *p == pseudo);
        match (active, present) {
            (true, false) => self.pseudo_classes.push(pseudo),
            (false, true) => self.pseudo_classes.retain(|p| *p != pseudo),
            _ => {}
        }
    }

    /// The fragment describing this element in a query chain.
    pub fn to_selector(&self) -> Selector {
        Selector::from_parts(
            self.tag.as_str(),
            self.id.as_deref().unwrap_or_default(),
            &self.classes,
            &self.pseudo_classes,
        )
    }
}

fn normalize_pseudo(pseudo: &str) -> String {
    if pseudo.starts_with(':') {
        pseudo.to_owned()
    } else {
        format!(":{pseudo}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_defaults() {
        let data = ElementData::new("td");
        assert_eq!(data.tag, "td");
        assert!(data.id.is_none());
        assert!(data.classes.is_empty());
        assert!(data.pseudo_classes.is_empty());
    }

    #[test]
    fn builder_with_class_dedup() {
        let data = ElementData::new("div").with_class("a").with_classes(["a", "b"]);
        assert_eq!(data.classes, vec!["a", "b"]);
    }

    #[test]
    fn toggle_class() {
        let mut data = ElementData::new("x");
        data.toggle_class("active");
        assert!(data.has_class("active"));
        data.toggle_class("active");
        assert!(!data.has_class("active"));
        assert!(data.classes.is_empty());
    }

    #[test]
    fn state_accepts_either_spelling() {
        let mut data = ElementData::new("button").with_pseudo_class("hover");
        assert_eq!(data.pseudo_classes, vec![":hover"]);
        assert!(data.has_state(":hover"));

        data.set_state(":hover", true);
        assert_eq!(data.pseudo_classes.len(), 1);

        data.set_state("hover", false);
        assert!(!data.has_state("hover"));
    }

    #[test]
    fn to_selector() {
        let data = ElementData::new("td")
            .with_id("cell")
            .with_classes(["k1", "k2"])
            .with_pseudo_class("first-child");
        assert_eq!(
            data.to_selector(),
            Selector::parse("td#cell.k1.k2:first-child").unwrap()
        );
        assert_eq!(ElementData::new("p").to_selector(), Selector::parse("p").unwrap());
    }

    #[test]
    fn element_id_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<ElementId>();
    }
}
