//! # Deep Paths
//!
//! Dotted/bracket paths into semi-structured state (`serde_json::Value`).
//!
//! A [`Path`] is parsed once from strings such as `meta.loading`, `items[0].title`
//! or `lookup['with space']` and then used to read, overwrite, or merge the value
//! it points at.
//!
//! ## Write semantics
//!
//! - Missing intermediate containers are created on demand: a record for a field
//!   segment, a list for an index segment. A scalar in the way is replaced.
//! - [`Path::merge_or_set`] merges only when *both* the existing value and the
//!   incoming value are records (shallow: incoming fields overwrite, the rest are
//!   kept). Every other combination overwrites.
//! - A list grows by at most [`MAX_LIST_GROWTH`] slots per write (padded with
//!   `null`). An index further out is rejected and the write fails.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// How far past the end of a list a write may reach.
pub const MAX_LIST_GROWTH: usize = 1024;

/// Errors produced while parsing a path string or writing through it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("Path is empty")]
    Empty,
    #[error("Unterminated bracket in path '{0}'")]
    UnterminatedBracket(String),
    #[error("Empty segment in path '{0}'")]
    EmptySegment(String),
    #[error("Index {index} is too far past the end of a list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// One accessor of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Field(String),
    Index(usize),
}

impl Segment {
    fn key(&self) -> String {
        match self {
            Segment::Field(name) => name.clone(),
            Segment::Index(index) => index.to_string(),
        }
    }

    fn index(&self) -> Option<usize> {
        match self {
            Segment::Field(name) => name.parse().ok(),
            Segment::Index(index) => Some(*index),
        }
    }

    fn empty_container(&self) -> Value {
        match self {
            Segment::Field(_) => Value::Object(serde_json::Map::new()),
            Segment::Index(_) => Value::Array(Vec::new()),
        }
    }

    fn fits(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Object(_)) => true,
            (segment, Value::Array(_)) => segment.index().is_some(),
            _ => false,
        }
    }
}

/// A parsed path into a state value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(Vec<Segment>);

impl Path {
    /// Parses `a.b[0]['c.d']` style paths.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = raw.chars().peekable();
        // set after a closing bracket, where an empty "current" is legal
        let mut after_bracket = false;

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if current.is_empty() && !after_bracket {
                        return Err(PathError::EmptySegment(raw.to_string()));
                    }
                    if !current.is_empty() {
                        segments.push(Segment::Field(std::mem::take(&mut current)));
                    }
                    after_bracket = false;
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(Segment::Field(std::mem::take(&mut current)));
                    }
                    let mut inner = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        inner.push(c);
                    }
                    if !closed {
                        return Err(PathError::UnterminatedBracket(raw.to_string()));
                    }
                    segments.push(bracket_segment(&inner, raw)?);
                    after_bracket = true;
                }
                _ => {
                    current.push(c);
                    after_bracket = false;
                }
            }
        }

        if !current.is_empty() {
            segments.push(Segment::Field(current));
        } else if !after_bracket {
            return Err(PathError::EmptySegment(raw.to_string()));
        }

        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Reads the value at this path, if every segment resolves.
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(root, |current, segment| match current {
            Value::Object(map) => map.get(&segment.key()),
            Value::Array(items) => segment.index().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// Overwrites the value at this path, creating containers on the way.
    ///
    /// On error `root` may already hold containers created for earlier segments;
    /// callers that need the old value must write into a copy.
    pub fn set(&self, root: &mut Value, value: Value) -> Result<(), PathError> {
        *self.slot_mut(root)? = value;
        Ok(())
    }

    /// Shallow-merges `value` into the record at this path, or overwrites when
    /// either side is not a record. Fails like [`Path::set`].
    pub fn merge_or_set(&self, root: &mut Value, value: Value) -> Result<(), PathError> {
        match (self.slot_mut(root)?, value) {
            (Value::Object(existing), Value::Object(incoming)) => existing.extend(incoming),
            (slot, value) => *slot = value,
        }
        Ok(())
    }

    fn slot_mut<'a>(&self, root: &'a mut Value) -> Result<&'a mut Value, PathError> {
        self.0.iter().try_fold(root, child_mut)
    }
}

fn child_mut<'a>(
    current: &'a mut Value,
    segment: &Segment,
) -> Result<&'a mut Value, PathError> {
    if !segment.fits(current) {
        *current = segment.empty_container();
    }
    match current {
        Value::Object(map) => Ok(map.entry(segment.key()).or_insert(Value::Null)),
        Value::Array(items) => {
            let len = items.len();
            let index = segment.index().unwrap_or(len);
            if index >= len {
                if index - len > MAX_LIST_GROWTH {
                    return Err(PathError::IndexOutOfRange { index, len });
                }
                items.resize(index + 1, Value::Null);
            }
            Ok(&mut items[index])
        }
        other => Ok(other),
    }
}

fn bracket_segment(inner: &str, raw: &str) -> Result<Segment, PathError> {
    let inner = inner.trim();
    if inner.is_empty() {
        return Err(PathError::EmptySegment(raw.to_string()));
    }
    let quoted = inner.len() >= 2
        && ((inner.starts_with('\'') && inner.ends_with('\''))
            || (inner.starts_with('"') && inner.ends_with('"')));
    if quoted {
        return Ok(Segment::Field(inner[1..inner.len() - 1].to_string()));
    }
    Ok(match inner.parse::<usize>() {
        Ok(index) => Segment::Index(index),
        Err(_) => Segment::Field(inner.to_string()),
    })
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Index(index) => write!(f, "[{}]", index)?,
                Segment::Field(name) if name.contains(['.', '[', ']']) => {
                    write!(f, "['{}']", name)?
                }
                Segment::Field(name) if i == 0 => write!(f, "{}", name)?,
                Segment::Field(name) => write!(f, ".{}", name)?,
            }
        }
        Ok(())
    }
}
