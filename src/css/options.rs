//! Collection configuration.

/// Options passed to [`StyleCollection::with_options`](crate::css::collection::StyleCollection::with_options).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleOptions {
    /// Log a warning when merging a duplicate selector replaces a value.
    pub warn_on_override: bool,
    /// Merge a re-registered selector into its existing bag. When `false`,
    /// every registration creates a new node and the later one wins by order.
    pub merge_duplicates: bool,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            warn_on_override: true,
            merge_duplicates: true,
        }
    }
}

impl StyleOptions {
    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `warn_on_override` (builder).
    pub fn with_warn_on_override(mut self, warn: bool) -> Self {
        self.warn_on_override = warn;
        self
    }

    /// Set `merge_duplicates` (builder).
    pub fn with_merge_duplicates(mut self, merge: bool) -> Self {
        self.merge_duplicates = merge;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = StyleOptions::new();
        assert!(options.warn_on_override);
        assert!(options.merge_duplicates);
    }

    #[test]
    fn builders() {
        let options = StyleOptions::new()
            .with_warn_on_override(false)
            .with_merge_duplicates(false);
        assert!(!options.warn_on_override);
        assert!(!options.merge_duplicates);
    }
}
