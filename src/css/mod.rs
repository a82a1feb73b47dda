//! Style engine: selector lexing, chains, specificity, stylesheet reading,
//! rule indexing and cascade resolution.

pub mod tokenizer;
pub mod selector;
pub mod specificity;
pub mod chain;
pub mod bag;
pub mod node;
pub mod options;
pub mod parser;
pub mod collection;

pub use bag::{BagId, PropertyBag, StyleData};
pub use chain::{Combinator, SelectorChain};
pub use collection::{StyleCollection, StyleMatch};
pub use node::StyleNode;
pub use options::StyleOptions;
pub use parser::{parse_stylesheet, AtRule, Diagnostic, Rule, Severity, StyleSheet};
pub use selector::Selector;
pub use specificity::Specificity;
