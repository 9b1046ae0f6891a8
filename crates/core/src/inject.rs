//! Placeholder substitution for text templates.
//!
//! A placeholder is `{{name}}`. Each distinct name that is a key of the
//! collection is replaced everywhere by that record's data URI; unknown names
//! stay in the text untouched. No parsing or escaping of the surrounding text
//! happens.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::Collection;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder pattern is valid"))
}

/// Result of [`inject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub output: String,
    /// Distinct placeholder names, in order of first appearance.
    pub placeholders: Vec<String>,
    /// Number of distinct placeholders replaced.
    pub resolved: usize,
    /// Names with no matching key, in order of first appearance.
    pub unresolved: Vec<String>,
}

/// Distinct placeholder names in `template`, in order of first appearance.
pub fn find_placeholders(template: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    placeholder_re()
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Replace every resolvable placeholder in `template`.
pub fn inject(template: &str, collection: &Collection) -> Injection {
    let placeholders = find_placeholders(template);
    let mut output = template.to_string();
    let mut resolved = 0;
    let mut unresolved = Vec::new();

    for name in &placeholders {
        match collection.get(name) {
            Some(record) => {
                output = output.replace(&format!("{{{{{name}}}}}"), &record.base64);
                resolved += 1;
            }
            None => unresolved.push(name.clone()),
        }
    }

    Injection {
        output,
        placeholders,
        resolved,
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LookupRecord;

    fn collection() -> Collection {
        [("cat", "data:image/png;base64,iVBORw=="), ("logo", "data:image/svg+xml;base64,PHN2Zy8+")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), LookupRecord::bare(v.to_string())))
            .collect()
    }

    #[test]
    fn test_resolves_single_placeholder() {
        let result = inject(r#"<img src="{{cat}}">"#, &collection());
        assert_eq!(result.output, r#"<img src="data:image/png;base64,iVBORw==">"#);
        assert_eq!(result.resolved, 1);
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn test_unresolved_left_untouched() {
        let result = inject("<p>{{missing_key}}</p>{{missing_key}}", &collection());
        assert_eq!(result.output, "<p>{{missing_key}}</p>{{missing_key}}");
        assert_eq!(result.resolved, 0);
        assert_eq!(result.unresolved, vec!["missing_key"]);
    }

    #[test]
    fn test_repeated_placeholder_counts_once() {
        let result = inject("{{cat}} {{logo}} {{cat}} {{dog}}", &collection());
        assert_eq!(result.resolved, 2);
        assert_eq!(result.placeholders, vec!["cat", "logo", "dog"]);
        assert_eq!(result.unresolved, vec!["dog"]);
        assert!(!result.output.contains("{{cat}}"));
        assert!(result.output.ends_with("{{dog}}"));
    }

    #[test]
    fn test_names_are_exact() {
        let result = inject("{{ cat }} {{Cat}}", &collection());
        assert_eq!(result.resolved, 0);
        assert_eq!(result.unresolved, vec![" cat ", "Cat"]);
    }

    #[test]
    fn test_no_placeholders() {
        let result = inject("<html></html>", &collection());
        assert!(result.placeholders.is_empty());
        assert_eq!(result.output, "<html></html>");
    }

    #[test]
    fn test_find_placeholders_ignores_empty_braces() {
        assert_eq!(find_placeholders("{{}} {{a}} {a} {{b}"), vec!["a"]);
    }
}
