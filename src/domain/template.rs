//! `{name}` placeholder templates used for link targets and anchor ids.
//!
//! The syntax is the named-field subset of Python format strings: `{name}`
//! is substituted, `{{` and `}}` are literal braces. Format specs,
//! conversions and positional fields are rejected.

use std::fmt;

/// A parsed template with named placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// Errors that can occur when parsing a template.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    /// An opening `{` was never closed.
    #[error("unclosed '{{' in template '{0}'")]
    Unclosed(String),

    /// A lone `}` appeared outside a placeholder.
    #[error("single '}}' encountered in template '{0}'")]
    UnmatchedClose(String),

    /// A placeholder name is empty or not a plain identifier.
    #[error("unsupported placeholder '{{{field}}}' in template '{template}'")]
    Unsupported {
        /// The offending placeholder contents.
        field: String,
        /// The full template.
        template: String,
    },

    /// A placeholder is well-formed but not one of the allowed names.
    #[error("invalid placeholder '{{{field}}}' in template '{template}'; allowed: {allowed}")]
    Unknown {
        /// The offending placeholder name.
        field: String,
        /// The full template.
        template: String,
        /// Comma-separated list of allowed names.
        allowed: String,
    },
}

impl Template {
    /// Parses a template, accepting only placeholders listed in `allowed`.
    ///
    /// # Errors
    ///
    /// Returns an error if braces are unbalanced, a placeholder is not a
    /// plain identifier, or a placeholder name is not in `allowed`.
    pub fn parse(source: &str, allowed: &[&str]) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(TemplateError::UnmatchedClose(source.to_string())),
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => field.push(c),
                            None => return Err(TemplateError::Unclosed(source.to_string())),
                        }
                    }

                    if !is_identifier(&field) {
                        return Err(TemplateError::Unsupported {
                            field,
                            template: source.to_string(),
                        });
                    }
                    if !allowed.contains(&field.as_str()) {
                        return Err(TemplateError::Unknown {
                            field,
                            template: source.to_string(),
                            allowed: allowed.join(", "),
                        });
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(field));
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Returns `true` if the template references the given placeholder.
    #[must_use]
    pub fn uses(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Placeholder(field) if field == name))
    }

    /// Substitutes placeholders using `lookup`.
    ///
    /// Placeholders for which `lookup` returns `None` render as empty.
    /// Parsing already restricted the names to the allowed set, so callers
    /// supply a value for every name they allowed.
    pub fn render<'a>(&self, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(field) => out.push_str(lookup(field).unwrap_or_default()),
            }
        }
        out
    }

    /// Returns the template text as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_identifier(field: &str) -> bool {
    let mut chars = field.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
