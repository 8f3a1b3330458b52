//! Substitution of attribute designators into expression templates.
//!
//! A condition or match expression is authored as a template containing
//! `$category.id` designators. The bridge grounds the template against the
//! request context, producing an expression string the safe evaluator can
//! run. When a designator cannot be resolved the bridge reports exactly
//! which ones were missing, so the caller can refine the request.

use verdict_core::{AttributeValue, RequestContext};

/// Substitution failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubstitutionError {
    /// One or more designators had no value in the context
    #[error("missing attributes: {}", attributes.join(", "))]
    MissingAttribute {
        /// Designators that could not be resolved, as `category.id`
        attributes: Vec<String>,
    },
    /// A `$` that does not start a well-formed `$category.id` designator
    #[error("malformed designator at offset {offset}")]
    MalformedDesignator {
        /// Byte offset of the `$`
        offset: usize,
    },
}

/// Converts an expression template plus a request context into a ground
/// expression string.
pub trait ExpressionBridge {
    /// Ground a template against a context
    ///
    /// # Errors
    ///
    /// Returns an error naming the missing designators when the context
    /// cannot satisfy the template, or flagging a malformed designator.
    fn substitute(
        &self,
        template: &str,
        context: &RequestContext,
    ) -> Result<String, SubstitutionError>;
}

/// The standard bridge: replaces `$category.id` designators with literal
/// renderings of the context's values. A single-valued attribute renders as
/// its literal; a multi-valued attribute renders as a list literal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesignatorBridge;

impl DesignatorBridge {
    /// Create a new bridge
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionBridge for DesignatorBridge {
    fn substitute(
        &self,
        template: &str,
        context: &RequestContext,
    ) -> Result<String, SubstitutionError> {
        let mut out = String::with_capacity(template.len());
        let mut missing: Vec<String> = Vec::new();
        let mut chars = template.char_indices().peekable();
        let mut in_string: Option<char> = None;

        while let Some((offset, ch)) = chars.next() {
            // Designators inside string literals are left alone.
            match in_string {
                Some(quote) => {
                    out.push(ch);
                    if ch == '\\' {
                        if let Some((_, escaped)) = chars.next() {
                            out.push(escaped);
                        }
                    } else if ch == quote {
                        in_string = None;
                    }
                    continue;
                }
                None if ch == '"' || ch == '\'' => {
                    in_string = Some(ch);
                    out.push(ch);
                    continue;
                }
                None => {}
            }

            if ch != '$' {
                out.push(ch);
                continue;
            }

            let designator = read_designator(&mut chars);
            let Some((category, id)) = designator.split_once('.') else {
                return Err(SubstitutionError::MalformedDesignator { offset });
            };
            if category.is_empty() || id.is_empty() {
                return Err(SubstitutionError::MalformedDesignator { offset });
            }

            match context.get(category, id) {
                Some(values) if !values.is_empty() => render(values, &mut out),
                _ => {
                    if !missing.contains(&designator) {
                        missing.push(designator);
                    }
                }
            }
        }

        if missing.is_empty() {
            Ok(out)
        } else {
            Err(SubstitutionError::MissingAttribute {
                attributes: missing,
            })
        }
    }
}

// Consume the `category.id` word after a `$`.
fn read_designator(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> String {
    let mut word = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
            word.push(c);
            chars.next();
        } else {
            break;
        }
    }
    word
}

// Values render through AttributeValue's Display, which emits parseable
// expression literals.
fn render(values: &[AttributeValue], out: &mut String) {
    if let [value] = values {
        out.push_str(&value.to_string());
    } else {
        out.push('[');
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&value.to_string());
        }
        out.push(']');
    }
}
