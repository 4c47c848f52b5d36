use std::fmt;
use std::ops::Deref;

use serde::Serialize;

use super::value::JsonValue;

/// One step of a path: an object key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Ordered list of segments addressing a node from the document root.
/// Displays dot-joined (`p.r.0`); the empty path addresses the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct JsonPath(Vec<Segment>);

impl JsonPath {
    pub fn root() -> Self {
        JsonPath(Vec::new())
    }

    /// Extend with an object key
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(Segment::Key(key.into()));
        self
    }

    /// Extend with an array index
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(Segment::Index(index));
        self
    }

    /// A new path one segment deeper than `self`
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        JsonPath(segments)
    }

    pub fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    pub fn parent(&self) -> Option<JsonPath> {
        let (_, init) = self.0.split_last()?;
        Some(JsonPath(init.to_vec()))
    }

    pub fn dotted(&self) -> String {
        self.to_string()
    }

    /// Non-empty proper prefixes, shortest first: `a.b.c` yields `a`, `a.b`.
    pub fn proper_prefixes(&self) -> impl Iterator<Item = JsonPath> + '_ {
        (1..self.0.len()).map(|n| JsonPath(self.0[..n].to_vec()))
    }

    /// Split a dotted string into segments, using `root` to decide whether a
    /// numeric part is an array index (under an array) or an object key.
    /// Parts below an unresolvable node are taken as keys.
    pub fn parse_against(root: &JsonValue, dotted: &str) -> JsonPath {
        let mut path = JsonPath::root();
        if dotted.is_empty() {
            return path;
        }
        let mut node = Some(root);
        for part in dotted.split('.') {
            let segment = match (node, part.parse::<usize>()) {
                (Some(JsonValue::Array(_)), Ok(i)) => Segment::Index(i),
                _ => Segment::Key(part.to_string()),
            };
            node = node.and_then(|n| n.child(&segment));
            path.push(segment);
        }
        path
    }
}

impl Deref for JsonPath {
    type Target = [Segment];

    fn deref(&self) -> &[Segment] {
        &self.0
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
