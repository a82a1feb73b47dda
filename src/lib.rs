//! # gilt-style
//!
//! A CSS-like style resolution engine. Rules pair a selector with an opaque
//! property bag; querying an element (described by its ancestor path) returns
//! every matching bag ordered from least to most specific.
//!
//! ## Core Systems
//!
//! - **[`css`]**: selector lexing and parsing, specificity, stylesheet reading,
//!   the indexed rule collection and cascade resolution
//! - **[`dom`]**: slotmap-backed element tree that builds query chains
//! - **[`error`]**: error type shared by both
//!
//! ```
//! use gilt_style::css::StyleCollection;
//!
//! let styles = StyleCollection::from_css("td { padding: 1px; } .x { padding: 2px; }")?;
//! let found = styles.get_style_data("table > tr > td.x")?.expect("two rules match");
//! assert_eq!(found.cascade().get("padding"), Some("2px"));
//! # Ok::<(), gilt_style::Error>(())
//! ```

// Core systems
pub mod css;
pub mod dom;
pub mod error;

pub use error::{Error, Result};

/// Common imports for consumers.
pub mod prelude {
    pub use crate::css::{
        PropertyBag, Selector, SelectorChain, StyleCollection, StyleData, StyleMatch,
        StyleOptions,
    };
    pub use crate::dom::{ElementData, ElementId, ElementTree};
    pub use crate::error::{Error, Result};
}
