//! Markup-style rewriting: an attribute value inside an element
//! (`name="value"`), or the text content of an element identified by a
//! `name` attribute (`<string name="app_name">value</string>`).

use super::{AttrValue, ReplaceStrategy};
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MarkupStrategy {
    // Patterns embed the attribute name, so they are compiled once per name
    // and reused across lines.
    cache: RefCell<HashMap<String, NamePatterns>>,
}

struct NamePatterns {
    attribute: Regex,
    element: Regex,
}

impl MarkupStrategy {
    pub fn new() -> Self {
        Self {
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn with_patterns<R>(&self, name: &str, f: impl FnOnce(&NamePatterns) -> R) -> R {
        let mut cache = self.cache.borrow_mut();
        let patterns = cache.entry(name.to_string()).or_insert_with(|| {
            let quoted = regex::escape(name);
            NamePatterns {
                attribute: Regex::new(&format!(r#"(\s{quoted}=")([^"]*)(")"#))
                    .expect("attribute pattern compiles"),
                element: Regex::new(&format!(
                    r#"<(\w+)\s+name="{quoted}"\s*>[^<]*</(\w+)>"#
                ))
                .expect("element pattern compiles"),
            }
        });
        f(patterns)
    }
}

impl Default for MarkupStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplaceStrategy for MarkupStrategy {
    fn replace_line(&self, line: &str, name: &str, value: &AttrValue) -> Option<String> {
        let replacement = value.render_plain();
        self.with_patterns(name, |patterns| {
            // Attribute form first: name="..." — closure replacer so the
            // value is taken literally, `$` included.
            if patterns.attribute.is_match(line) {
                return Some(
                    patterns
                        .attribute
                        .replacen(line, 1, |caps: &regex::Captures| {
                            format!("{}{replacement}{}", &caps[1], &caps[3])
                        })
                        .into_owned(),
                );
            }
            // Element-content form: <tag name="key">...</tag> with matching
            // open and close tags (checked here — the regex crate has no
            // backreferences).
            if let Some(captures) = patterns.element.captures(line) {
                if captures[1] == captures[2] {
                    let tag = &captures[1];
                    let rebuilt = format!("<{tag} name=\"{name}\">{replacement}</{tag}>");
                    return Some(
                        patterns
                            .element
                            .replacen(line, 1, |_: &regex::Captures| rebuilt.clone())
                            .into_owned(),
                    );
                }
            }
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PipelineError;
    use crate::inject::{rewrite, AttributeSet};

    fn inject(source: &str, build: impl FnOnce(&mut AttributeSet)) -> Result<String, PipelineError> {
        let mut attrs = AttributeSet::new();
        build(&mut attrs);
        rewrite(source, &mut attrs, &MarkupStrategy::new())
    }

    #[test]
    fn test_replace_element_content() {
        let source = r#"<resources>
    <string name="app_name">placeholder</string>
</resources>"#;
        let out = inject(source, |a| a.insert("app_name", "Orbit Lab")).unwrap();
        assert!(out.contains(r#"<string name="app_name">Orbit Lab</string>"#));
        assert!(out.contains("<resources>"));
    }

    #[test]
    fn test_replace_attribute_value() {
        let source = r#"<application android:icon="@old/icon" android:label="x">"#;
        let out = inject(source, |a| a.insert("android:icon", "@drawable/ic_launcher")).unwrap();
        assert!(out.contains(r#"android:icon="@drawable/ic_launcher""#));
        assert!(out.contains(r#"android:label="x""#));
    }

    #[test]
    fn test_attribute_empty_value_replaced() {
        let source = r#"<meta key="">"#;
        let out = inject(source, |a| a.insert("key", "v")).unwrap();
        assert_eq!(out, r#"<meta key="v">"#);
    }

    #[test]
    fn test_missing_attribute_fails() {
        let source = r#"<string name="other">x</string>"#;
        let err = inject(source, |a| a.insert("app_name", "T")).unwrap_err();
        match err {
            PipelineError::TemplateDrift(names) => assert_eq!(names, vec!["app_name"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mismatched_close_tag_not_replaced() {
        let source = r#"<string name="app_name">x</other>"#;
        let err = inject(source, |a| a.insert("app_name", "T")).unwrap_err();
        assert!(matches!(err, PipelineError::TemplateDrift(_)));
    }

    #[test]
    fn test_reinjection_still_matches() {
        let source = r#"    <string name="app_name">one</string>"#;
        let once = inject(source, |a| a.insert("app_name", "two")).unwrap();
        let twice = inject(&once, |a| a.insert("app_name", "three")).unwrap();
        assert!(twice.contains(r#"<string name="app_name">three</string>"#));
    }
}
