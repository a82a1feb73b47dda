//! Stylesheet reader.
//!
//! A character-level state machine that turns CSS-like text into
//! `(selector, PropertyBag)` rules. Selectors are kept as raw strings here;
//! [`StyleCollection`](crate::css::collection::StyleCollection) parses them
//! when the rules are registered.
//!
//! The reader never fails. Authoring mistakes (empty parameters, blocks
//! without a selector, duplicate keys, a block opened inside another) are
//! logged through `tracing`, recorded as [`Diagnostic`]s, and reading
//! continues with a best-effort result.

use std::iter::Peekable;
use std::str::Chars;

use crate::css::bag::PropertyBag;

/// One `selector { ... }` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Raw selector text, trimmed.
    pub selector: String,
    pub properties: PropertyBag,
    /// Line the block opened on (1-indexed).
    pub line: usize,
}

/// One `@name param;` statement.
///
/// A parameter without `:` is stored under the empty key, so
/// `@import "x.css";` yields `{"": "\"x.css\""}`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub name: String,
    pub params: PropertyBag,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A soft authoring problem found while reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub severity: Severity,
    pub message: String,
}

/// Result of reading a stylesheet.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub rules: Vec<Rule>,
    pub at_rules: Vec<AtRule>,
    pub diagnostics: Vec<Diagnostic>,
}

impl StyleSheet {
    /// Whether reading reported anything.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Read a stylesheet. Never fails; see the module docs.
pub fn parse_stylesheet(input: &str) -> StyleSheet {
    let mut reader = Reader::default();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            reader.skip_comment(&mut chars);
            continue;
        }
        if c == '\n' {
            reader.line += 1;
        }
        match reader.state {
            State::Selector => reader.selector_char(c),
            State::Key => reader.key_char(c),
            State::Value => reader.value_char(c),
            State::AtRule => reader.at_rule_char(c),
            State::SkipBlock(depth) => reader.skip_block_char(c, depth),
        }
    }

    reader.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Outside any block, collecting selector text.
    Selector,
    /// Inside a block, collecting a property name.
    Key,
    /// Inside a block, collecting a property value.
    Value,
    /// After `@`, collecting the statement up to `;`.
    AtRule,
    /// Inside an unsupported `@name { ... }` block; holds the brace depth.
    SkipBlock(usize),
}

#[derive(Debug)]
struct Reader {
    sheet: StyleSheet,
    state: State,
    line: usize,
    buffer: String,
    /// Selector of the open block; `None` for a block opened without one.
    selector: Option<String>,
    block_line: usize,
    properties: PropertyBag,
    key: String,
}

impl Default for Reader {
    fn default() -> Self {
        Self {
            sheet: StyleSheet::default(),
            state: State::Selector,
            line: 1,
            buffer: String::new(),
            selector: None,
            block_line: 1,
            properties: PropertyBag::new(),
            key: String::new(),
        }
    }
}

impl Reader {
    fn warn(&mut self, message: String) {
        tracing::warn!(line = self.line, "{message}");
        self.sheet.diagnostics.push(Diagnostic {
            line: self.line,
            severity: Severity::Warning,
            message,
        });
    }

    fn error(&mut self, message: String) {
        tracing::error!(line = self.line, "{message}");
        self.sheet.diagnostics.push(Diagnostic {
            line: self.line,
            severity: Severity::Error,
            message,
        });
    }

    fn take_buffer(&mut self) -> String {
        let text = self.buffer.trim().to_string();
        self.buffer.clear();
        text
    }

    /// Skip a `/* ... */` comment; the opening `/*` is already consumed.
    fn skip_comment(&mut self, chars: &mut Peekable<Chars<'_>>) {
        // The comment separates whatever surrounds it.
        self.buffer.push(' ');
        while let Some(c) = chars.next() {
            match c {
                '\n' => self.line += 1,
                '*' if chars.peek() == Some(&'/') => {
                    chars.next();
                    return;
                }
                _ => {}
            }
        }
        self.error("unterminated comment".to_string());
    }

    fn selector_char(&mut self, c: char) {
        match c {
            '{' => self.open_block(),
            '}' => {
                self.warn("'}' without an open block".to_string());
                self.buffer.clear();
            }
            '@' if self.buffer.trim().is_empty() => {
                self.buffer.clear();
                self.block_line = self.line;
                self.state = State::AtRule;
            }
            ';' => {
                let text = self.take_buffer();
                if !text.is_empty() {
                    self.warn(format!("stray ';' after '{text}'"));
                }
            }
            _ => self.buffer.push(c),
        }
    }

    fn key_char(&mut self, c: char) {
        match c {
            ':' => {
                self.key = self.take_buffer();
                self.state = State::Value;
            }
            ';' => {
                let text = self.take_buffer();
                if text.is_empty() {
                    self.warn("empty parameter".to_string());
                } else {
                    self.warn(format!("declaration '{text}' has no ':'"));
                }
            }
            '}' => {
                let text = self.take_buffer();
                if !text.is_empty() {
                    self.warn(format!("declaration '{text}' has no ':'"));
                }
                self.close_block();
            }
            '{' => {
                // Text since the last `;` is most likely the next selector.
                let next_selector = self.take_buffer();
                self.error(format!(
                    "'{{' inside an open block; closing the block for '{}'",
                    self.selector.as_deref().unwrap_or_default()
                ));
                self.close_block();
                self.buffer = next_selector;
                self.open_block();
            }
            _ => self.buffer.push(c),
        }
    }

    fn value_char(&mut self, c: char) {
        match c {
            ';' => self.commit(),
            '}' => {
                self.commit();
                self.close_block();
            }
            '{' => {
                let pending = std::mem::take(&mut self.key);
                self.buffer.clear();
                self.error(format!(
                    "'{{' inside the value of '{pending}'; dropping the declaration and closing the block"
                ));
                self.close_block();
                self.open_block();
            }
            _ => self.buffer.push(c),
        }
    }

    fn at_rule_char(&mut self, c: char) {
        match c {
            ';' => self.finish_at_rule(),
            '{' => {
                let text = self.take_buffer();
                self.warn(format!("block at-rule '@{text}' is not supported; skipping it"));
                self.state = State::SkipBlock(1);
            }
            '}' => {
                let text = self.take_buffer();
                self.warn(format!("'}}' inside at-rule '@{text}'"));
                self.state = State::Selector;
            }
            _ => self.buffer.push(c),
        }
    }

    fn skip_block_char(&mut self, c: char, depth: usize) {
        match c {
            '{' => self.state = State::SkipBlock(depth + 1),
            '}' if depth == 1 => self.state = State::Selector,
            '}' => self.state = State::SkipBlock(depth - 1),
            _ => {}
        }
    }

    fn open_block(&mut self) {
        let selector = self.take_buffer();
        if selector.is_empty() {
            self.warn("block without a selector; its properties are ignored".to_string());
            self.selector = None;
        } else {
            self.selector = Some(selector);
        }
        self.properties = PropertyBag::new();
        self.block_line = self.line;
        self.state = State::Key;
    }

    fn close_block(&mut self) {
        self.state = State::Selector;
        self.key.clear();
        let properties = std::mem::take(&mut self.properties);
        if let Some(selector) = self.selector.take() {
            self.sheet.rules.push(Rule {
                selector,
                properties,
                line: self.block_line,
            });
        }
    }

    /// Store the pending `key: value` and return to key state.
    fn commit(&mut self) {
        let key = std::mem::take(&mut self.key);
        let value = self.take_buffer();
        self.state = State::Key;

        if key.is_empty() {
            self.warn(format!("declaration ': {value}' has no property name"));
            return;
        }
        if value.is_empty() {
            self.warn(format!("empty parameter for '{key}'"));
            return;
        }
        if self.properties.contains_key(&key) {
            self.warn(format!(
                "duplicate property '{key}' in '{}'; the later value wins",
                self.selector.as_deref().unwrap_or_default()
            ));
        }
        self.properties.set(key, value);
    }

    fn finish_at_rule(&mut self) {
        self.state = State::Selector;
        let text = self.take_buffer();
        let (name, rest) = match text.split_once(char::is_whitespace) {
            Some((name, rest)) => (name.to_string(), rest.trim().to_string()),
            None => (text.clone(), String::new()),
        };
        if name.is_empty() {
            self.warn("at-rule without a name".to_string());
            return;
        }

        let mut params = PropertyBag::new();
        if rest.is_empty() {
            self.warn(format!("empty parameter for '@{name}'"));
        } else if let Some((key, value)) = rest.split_once(':') {
            params.set(key.trim(), value.trim());
        } else {
            params.set("", rest);
        }
        self.sheet.at_rules.push(AtRule {
            name,
            params,
            line: self.block_line,
        });
    }

    fn finish(mut self) -> StyleSheet {
        match self.state {
            State::Selector => {
                let text = self.take_buffer();
                if !text.is_empty() {
                    self.warn(format!("selector '{text}' has no block"));
                }
            }
            State::Key | State::Value => {
                self.error(format!(
                    "unterminated block for '{}'",
                    self.selector.as_deref().unwrap_or_default()
                ));
                if self.state == State::Value {
                    self.commit();
                }
                self.close_block();
            }
            State::AtRule => {
                self.warn("at-rule is missing its ';'".to_string());
                self.finish_at_rule();
            }
            State::SkipBlock(_) => self.error("unterminated at-rule block".to_string()),
        }
        self.sheet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bag(pairs: &[(&str, &str)]) -> PropertyBag {
        pairs.iter().copied().collect()
    }

    fn messages(sheet: &StyleSheet) -> Vec<&str> {
        sheet.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    // ── Rules ────────────────────────────────────────────────────────

    #[test]
    fn single_rule() {
        let sheet = parse_stylesheet("td { border-right: 1px solid #c6c9cc; }");
        assert_eq!(
            sheet.rules,
            vec![Rule {
                selector: "td".into(),
                properties: bag(&[("border-right", "1px solid #c6c9cc")]),
                line: 1,
            }]
        );
        assert!(!sheet.has_diagnostics());
    }

    #[test]
    fn compact_rules_across_lines() {
        let sheet = parse_stylesheet(
            "table{border-collapse:separate}\n\
             tr:first-child th:first-child{border-top-left-radius:6px}\n\
             td{border-right:1px solid #c6c9cc}",
        );
        let selectors: Vec<&str> = sheet.rules.iter().map(|r| r.selector.as_str()).collect();
        assert_eq!(
            selectors,
            vec!["table", "tr:first-child th:first-child", "td"]
        );
        assert_eq!(sheet.rules[1].properties.get("border-top-left-radius"), Some("6px"));
        assert_eq!(sheet.rules[2].line, 3);
        assert!(!sheet.has_diagnostics());
    }

    #[test]
    fn last_declaration_without_semicolon() {
        let sheet = parse_stylesheet("a { color: red; margin: 0 }");
        assert_eq!(sheet.rules[0].properties, bag(&[("color", "red"), ("margin", "0")]));
    }

    #[test]
    fn selector_list_kept_raw() {
        let sheet = parse_stylesheet("h1, h2 > span { font-weight: bold; }");
        assert_eq!(sheet.rules[0].selector, "h1, h2 > span");
    }

    #[test]
    fn value_may_contain_colons() {
        let sheet = parse_stylesheet("a { background: url(http://x/y.png); }");
        assert_eq!(
            sheet.rules[0].properties.get("background"),
            Some("url(http://x/y.png)")
        );
    }

    #[test]
    fn empty_block_is_kept() {
        let sheet = parse_stylesheet("a {}");
        assert_eq!(sheet.rules.len(), 1);
        assert!(sheet.rules[0].properties.is_empty());
    }

    // ── Comments ─────────────────────────────────────────────────────

    #[test]
    fn comments_are_skipped_across_lines() {
        let sheet = parse_stylesheet(
            "/* header\n comment */\na /* inline */ { color: /* c */ red; }\n/* tail */",
        );
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selector, "a");
        assert_eq!(sheet.rules[0].properties.get("color"), Some("red"));
        assert_eq!(sheet.rules[0].line, 3);
    }

    #[test]
    fn comment_separates_fragments() {
        let sheet = parse_stylesheet("a/**/b { x: y; }");
        assert_eq!(sheet.rules[0].selector, "a b");
    }

    #[test]
    fn unterminated_comment_is_error() {
        let sheet = parse_stylesheet("a { x: y; } /* never closed");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.diagnostics[0].severity, Severity::Error);
    }

    // ── At-rules ─────────────────────────────────────────────────────

    #[test]
    fn at_rule_without_colon_uses_empty_key() {
        let sheet = parse_stylesheet("@import \"x.css\";\na { b: c; }");
        assert_eq!(
            sheet.at_rules,
            vec![AtRule {
                name: "import".into(),
                params: bag(&[("", "\"x.css\"")]),
                line: 1,
            }]
        );
        assert_eq!(sheet.rules.len(), 1);
    }

    #[test]
    fn at_rule_with_colon_is_key_value() {
        let sheet = parse_stylesheet("@theme accent: #336699;");
        assert_eq!(sheet.at_rules[0].params.get("accent"), Some("#336699"));
    }

    #[test]
    fn at_rule_without_parameter_warns() {
        let sheet = parse_stylesheet("@charset;");
        assert_eq!(sheet.at_rules[0].name, "charset");
        assert!(sheet.at_rules[0].params.is_empty());
        assert_eq!(messages(&sheet), vec!["empty parameter for '@charset'"]);
    }

    #[test]
    fn block_at_rule_is_skipped() {
        let sheet = parse_stylesheet("@media screen { a { x: y; } }\nb { x: z; }");
        assert!(sheet.at_rules.is_empty());
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selector, "b");
        assert_eq!(sheet.diagnostics.len(), 1);
    }

    // ── Soft errors ──────────────────────────────────────────────────

    #[test]
    fn duplicate_key_warns_and_later_wins() {
        let sheet = parse_stylesheet("a { color: red; color: blue; }");
        assert_eq!(sheet.rules[0].properties.get("color"), Some("blue"));
        assert_eq!(
            messages(&sheet),
            vec!["duplicate property 'color' in 'a'; the later value wins"]
        );
    }

    #[test]
    fn empty_parameters_warn() {
        let sheet = parse_stylesheet("a { ; color: ; margin: 0; }");
        assert_eq!(sheet.rules[0].properties, bag(&[("margin", "0")]));
        assert_eq!(
            messages(&sheet),
            vec!["empty parameter", "empty parameter for 'color'"]
        );
    }

    #[test]
    fn block_without_selector_is_dropped() {
        let sheet = parse_stylesheet("{ color: red; } a { x: y; }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selector, "a");
        assert_eq!(sheet.diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn stray_close_brace_warns() {
        let sheet = parse_stylesheet("} a { x: y; }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(messages(&sheet), vec!["'}' without an open block"]);
    }

    #[test]
    fn nested_block_closes_previous() {
        let sheet = parse_stylesheet("a { color: red; b { margin: 0; }");
        let selectors: Vec<&str> = sheet.rules.iter().map(|r| r.selector.as_str()).collect();
        assert_eq!(selectors, vec!["a", "b"]);
        assert_eq!(sheet.rules[0].properties.get("color"), Some("red"));
        assert_eq!(sheet.rules[1].properties.get("margin"), Some("0"));
        assert_eq!(sheet.diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn unterminated_block_keeps_partial_rule() {
        let sheet = parse_stylesheet("a { color: red; margin: 0");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].properties, bag(&[("color", "red"), ("margin", "0")]));
        assert_eq!(sheet.diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn declaration_without_colon_warns() {
        let sheet = parse_stylesheet("a { bogus; color: red }");
        assert_eq!(sheet.rules[0].properties, bag(&[("color", "red")]));
        assert_eq!(messages(&sheet), vec!["declaration 'bogus' has no ':'"]);
    }

    #[test]
    fn trailing_selector_warns() {
        let sheet = parse_stylesheet("a { x: y; } b");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(messages(&sheet), vec!["selector 'b' has no block"]);
    }

    #[test]
    fn diagnostics_carry_line_numbers() {
        let sheet = parse_stylesheet("a {\n  color: red;\n  color: blue;\n}");
        assert_eq!(sheet.diagnostics[0].line, 3);
    }
}
