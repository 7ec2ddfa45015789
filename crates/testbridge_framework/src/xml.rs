//! Minimal single-line XML element writer for result fragments and progress notices.

use std::fmt::Write as _;

/// Escape text for use inside a double-quoted attribute or element body.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reverse [`escape`] for the five predefined entities.
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

pub struct Element {
    name: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<String>,
}

impl Element {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, key: &'static str, value: impl ToString) -> Self {
        self.attrs.push((key, value.to_string()));
        self
    }

    pub fn child(mut self, rendered: String) -> Self {
        self.children.push(rendered);
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push('<');
        out.push_str(self.name);
        for (key, value) in &self.attrs {
            // Writing to String cannot fail.
            let _ = write!(out, " {}=\"{}\"", key, escape(value));
        }
        if self.children.is_empty() {
            out.push_str(" />");
            return out;
        }
        out.push('>');
        for child in &self.children {
            out.push_str(child);
        }
        let _ = write!(out, "</{}>", self.name);
        out
    }
}
