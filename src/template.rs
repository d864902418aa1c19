//! # Path Resolver
//!
//! Turns the templated path of a resource (e.g. `https://api.example.com/todos/:id`)
//! into the two pieces a remote call needs:
//!
//! 1. [`separate`] splits an optional origin (`https://api.example.com`) from the path.
//! 2. [`PathTemplate`] compiles the remaining template once and renders concrete paths
//!    from named parameters (`{"id": "5"}` -> `/todos/5`).
//!
//! ## Template syntax
//!
//! - `:name` - required parameter (`[A-Za-z0-9_]+`)
//! - `:name?` - optional parameter; when absent, the parameter *and* its leading
//!   `/` or `.` are dropped
//!
//! Parameter values are percent-encoded.

use crate::error::ResourceError;
use serde_json::{Map, Value};

/// A path split into its optional origin and the path proper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separated {
    pub base_url: Option<String>,
    pub path: String,
}

/// Splits `scheme://host[:port]` (or `//host`) off the front of `raw`.
pub fn separate(raw: &str) -> Separated {
    let authority_start = match raw.find("://") {
        Some(i) if raw[..i].chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) => {
            Some(i + 3)
        }
        _ if raw.starts_with("//") => Some(2),
        _ => None,
    };

    let Some(start) = authority_start else {
        return Separated {
            base_url: None,
            path: raw.to_string(),
        };
    };

    match raw[start..].find('/') {
        Some(offset) => Separated {
            base_url: Some(raw[..start + offset].to_string()),
            path: raw[start + offset..].to_string(),
        },
        None => Separated {
            base_url: Some(raw.to_string()),
            path: String::new(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Param {
        name: String,
        prefix: String,
        optional: bool,
    },
}

/// A compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    tokens: Vec<Token>,
}

impl PathTemplate {
    pub fn compile(template: &str) -> Result<Self, ResourceError> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != ':' {
                literal.push(c);
                continue;
            }

            let mut name = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    name.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                return Err(ResourceError::InvalidTemplate {
                    template: template.to_string(),
                    reason: "parameter without a name".to_string(),
                });
            }

            let optional = chars.next_if_eq(&'?').is_some();
            let prefix = match literal.chars().last() {
                Some(p @ ('/' | '.')) => {
                    literal.pop();
                    p.to_string()
                }
                _ => String::new(),
            };
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(Token::Param {
                name,
                prefix,
                optional,
            });
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            tokens,
        })
    }

    /// Renders a concrete path. A missing required parameter is an error.
    pub fn render(&self, params: Option<&Map<String, Value>>) -> Result<String, ResourceError> {
        let mut out = String::with_capacity(self.source.len());

        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Param {
                    name,
                    prefix,
                    optional,
                } => {
                    let value = params.and_then(|p| p.get(name)).filter(|v| !v.is_null());
                    let Some(value) = value else {
                        if *optional {
                            continue;
                        }
                        return Err(ResourceError::MissingParam(name.clone()));
                    };
                    let text = match value {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        other => {
                            return Err(ResourceError::InvalidParam {
                                name: name.clone(),
                                value: other.clone(),
                            })
                        }
                    };
                    out.push_str(prefix);
                    out.push_str(&urlencoding::encode(&text));
                }
            }
        }

        Ok(out)
    }

    /// Names of all parameters, in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Param { name, .. } => Some(name.as_str()),
            Token::Literal(_) => None,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}
