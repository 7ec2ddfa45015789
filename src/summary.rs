//! Aggregation of per-session result fragments into one combined document.
//!
//! Combining is structural: each fragment becomes a child of the `<test-run>` root, in session order.
//! Attributes of the fragments are never read or merged.

use std::fmt;

/// Accumulates one fragment per session during an aggregate operation.
#[derive(Debug, Default)]
pub struct ResultSummary {
    fragments: Vec<String>,
}

impl ResultSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, fragment: impl AsRef<str>) {
        self.fragments.push(strip_prolog(fragment.as_ref()).to_string());
    }

    pub fn into_document(self) -> ResultDocument {
        ResultDocument {
            fragments: self.fragments,
        }
    }
}

/// Drop a leading `<?xml ...?>` declaration so fragments can be nested.
fn strip_prolog(fragment: &str) -> &str {
    let trimmed = fragment.trim();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return trimmed[end + 2..].trim_start();
        }
    }
    trimmed
}

/// The combined result of a run or exploration across every loaded session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultDocument {
    fragments: Vec<String>,
}

impl ResultDocument {
    /// Name of the root element.
    pub const ROOT: &'static str = "test-run";

    /// Child fragments, in session order.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn to_xml(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResultDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fragments.is_empty() {
            return write!(f, "<{} />", Self::ROOT);
        }
        writeln!(f, "<{}>", Self::ROOT)?;
        for fragment in &self.fragments {
            writeln!(f, "{fragment}")?;
        }
        write!(f, "</{}>", Self::ROOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_renders_an_empty_root() {
        let document = ResultSummary::new().into_document();
        assert!(document.is_empty());
        insta::assert_snapshot!(document.to_xml(), @"<test-run />");
    }

    #[test]
    fn fragments_are_nested_in_order_without_prologs() {
        let mut summary = ResultSummary::new();
        summary.add_result(r#"<?xml version="1.0" encoding="utf-8"?><test-suite id="0-1000" />"#);
        summary.add_result("  <test-suite id=\"1-1000\" />\n");
        let document = summary.into_document();

        assert_eq!(document.len(), 2);
        insta::assert_snapshot!(document.to_xml(), @r#"
        <test-run>
        <test-suite id="0-1000" />
        <test-suite id="1-1000" />
        </test-run>
        "#);
    }
}
