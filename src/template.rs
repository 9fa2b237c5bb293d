//! Query templates and variable extraction.
//!
//! A template is the raw GraphQL document sent for every row. The variables it
//! needs are read from its declarations (`$name: Type`) once, when the template
//! is created.

use regex::Regex;
use std::sync::OnceLock;

/// Matches a variable declaration: the sigil, an identifier, then a type annotation.
fn declaration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$([_A-Za-z][_0-9A-Za-z]*)\s*:").expect("declaration pattern is valid")
    })
}

/// A parameterized query and the variables it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
    required: Vec<String>,
}

impl Template {
    /// Creates a template, extracting its required variables.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let required = extract_variables(&text);
        Self { text, required }
    }

    /// Returns the query text exactly as it will be sent.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the declared variable names in order of first appearance.
    pub fn required_variables(&self) -> &[String] {
        &self.required
    }
}

/// Extracts the distinct variable names declared in a GraphQL document.
///
/// `#` comments are skipped (a `#` inside a string value is not one), and usages such as `city: $city` are not
/// declarations, so they are not collected.
pub fn extract_variables(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for line in text.lines() {
        let code = strip_comment(line);

        for captures in declaration_pattern().captures_iter(code) {
            let name = &captures[1];
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }

    names
}

/// Cuts a line at the first `#` that is outside a string literal.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;

    for (pos, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..pos],
            _ => {}
        }
    }

    line
}
