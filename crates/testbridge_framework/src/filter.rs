//! Test selection from the XML filter string handed through by the driver.
//!
//! Only `<test>FullName</test>` entries are understood. A filter without any (such as `<filter />`) selects
//! every test.

use crate::xml;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestFilter {
    names: Vec<String>,
}

impl TestFilter {
    pub fn parse(filter: &str) -> Self {
        let mut names = Vec::new();
        let mut rest = filter;
        while let Some(start) = rest.find("<test>") {
            let after = &rest[start + "<test>".len()..];
            let Some(end) = after.find("</test>") else {
                break;
            };
            let name = xml::unescape(after[..end].trim());
            if !name.is_empty() {
                names.push(name);
            }
            rest = &after[end + "</test>".len()..];
        }
        Self { names }
    }

    /// Whether this filter selects everything.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn matches(&self, full_name: &str) -> bool {
        self.is_empty() || self.names.iter().any(|n| n == full_name)
    }
}
