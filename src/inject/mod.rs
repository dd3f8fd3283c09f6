//! Template constant injection.
//!
//! Rewrites named declared-constant occurrences inside runner template text
//! given an ordered attribute map, with a completeness guarantee: every
//! attribute must match exactly one line, and any attribute left unmatched
//! after the whole text is processed fails the call listing all missing
//! names. This is the mechanism that detects template/runner drift.
//!
//! The supported patterns are a narrow, documented subset of source syntax
//! the runner templates conform to — this is deliberately not a parser.

pub mod declaration;
pub mod markup;

use crate::core::error::PipelineError;
use indexmap::IndexMap;

/// A typed attribute value with a type-directed textual form.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    StrList(Vec<String>),
    Int(i64),
    Bool(bool),
}

impl AttrValue {
    /// Format for substitution into a declaration: strings double-quoted,
    /// lists as a bracketed comma-separated double-quoted sequence, numerics
    /// and booleans as bare literals.
    pub fn render(&self) -> String {
        match self {
            Self::Str(s) => format!("\"{s}\""),
            Self::StrList(items) => {
                let quoted: Vec<String> = items.iter().map(|s| format!("\"{s}\"")).collect();
                format!("[{}]", quoted.join(", "))
            }
            Self::Int(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// Raw form used for markup content, where no quoting applies.
    pub fn render_plain(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::StrList(items) => items.join(","),
            Self::Int(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u32> for AttrValue {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(items: Vec<String>) -> Self {
        Self::StrList(items)
    }
}

/// An ordered name→value map with a per-name satisfied flag, all false at
/// construction. One injection call consumes the set.
#[derive(Debug, Default)]
pub struct AttributeSet {
    entries: IndexMap<String, Entry>,
}

#[derive(Debug)]
struct Entry {
    value: AttrValue,
    satisfied: bool,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attribute; re-inserting a name replaces its value and
    /// resets its satisfied flag.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.entries.insert(
            name.into(),
            Entry {
                value: value.into(),
                satisfied: false,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names still unmatched, in map order.
    pub fn unsatisfied(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, e)| !e.satisfied)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// A per-line rewrite rule for one template syntax. Returns the rewritten
/// line when the named attribute structurally matches, `None` otherwise.
pub trait ReplaceStrategy {
    fn replace_line(&self, line: &str, name: &str, value: &AttrValue) -> Option<String>;
}

/// Rewrite `source` line by line. Each line tries every still-unsatisfied
/// attribute in map order; the first structural match rewrites the value,
/// marks the name satisfied and moves to the next line. Non-matching lines
/// pass through verbatim. Output is byte-identical for identical inputs.
///
/// Fails with [`PipelineError::TemplateDrift`] naming every attribute that
/// never matched.
pub fn rewrite(
    source: &str,
    attrs: &mut AttributeSet,
    strategy: &dyn ReplaceStrategy,
) -> Result<String, PipelineError> {
    let mut out = String::with_capacity(source.len());

    for line in source.lines() {
        let mut rewritten = None;
        for (name, entry) in attrs.entries.iter_mut() {
            if entry.satisfied {
                continue;
            }
            if let Some(new_line) = strategy.replace_line(line, name, &entry.value) {
                entry.satisfied = true;
                rewritten = Some(new_line);
                break;
            }
        }
        out.push_str(rewritten.as_deref().unwrap_or(line));
        out.push('\n');
    }
    if !source.ends_with('\n') && !out.is_empty() {
        out.pop();
    }

    let missing = attrs.unsatisfied();
    if !missing.is_empty() {
        return Err(PipelineError::TemplateDrift(missing));
    }
    Ok(out)
}
