//! Declaration-style rewriting: public constant declarations in runner
//! template source, `pub const NAME: T = value;`.
//!
//! The rendered replacement still matches the declaration pattern, so a
//! template that has been injected once can be injected again from its
//! pristine copy without tripping the completeness contract.

use super::{AttrValue, ReplaceStrategy};
use regex::Regex;

/// Matches a public constant declaration and captures its name.
const DECLARATION_PATTERN: &str = r"^pub\s+const\s+(\w+)\s*:\s*[^=]+=\s*[^;]+;";

/// Matches the assigned-value portion of a declaration line.
const VALUE_PATTERN: &str = r"=\s*[^;]+;";

pub struct DeclarationStrategy {
    declaration: Regex,
    value: Regex,
}

impl DeclarationStrategy {
    pub fn new() -> Self {
        Self {
            declaration: Regex::new(DECLARATION_PATTERN).expect("declaration pattern compiles"),
            value: Regex::new(VALUE_PATTERN).expect("value pattern compiles"),
        }
    }
}

impl Default for DeclarationStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplaceStrategy for DeclarationStrategy {
    fn replace_line(&self, line: &str, name: &str, value: &AttrValue) -> Option<String> {
        let captures = self.declaration.captures(line.trim())?;
        if &captures[1] != name {
            return None;
        }
        // Rewrite the value portion in the original (untrimmed) line so
        // indentation survives. Closure replacer: rendered values are taken
        // literally, `$` included.
        let replacement = format!("= {};", value.render());
        Some(
            self.value
                .replacen(line, 1, |_: &regex::Captures| replacement.clone())
                .into_owned(),
        )
    }
}
