//! Purpose: Typed path descriptors addressing a location inside nested containers.
//! Exports: `PathDescriptor`, `Segment`, `IntoPath`.
//! Role: The one addressing format shared by every `PathAccessor::get`/`set` call.
//! Invariants: String and `from_keys` forms normalize numeric segments identically.
//! Invariants: `Display` parses back to an equal descriptor only when `has_canonical_text` holds.
//! Invariants: Serialization is lossless; the list form is used when the text form is not.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    /// Key-to-segment normalization: canonical decimal integers address indices.
    pub fn from_key(key: &str) -> Self {
        match index_like(key) {
            Some(index) => Segment::Index(index),
            None => Segment::Key(key.to_string()),
        }
    }

    /// Object key this segment resolves to when the container is a map.
    pub fn as_key(&self) -> String {
        match self {
            Segment::Key(key) => key.clone(),
            Segment::Index(index) => index.to_string(),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{key}"),
            Segment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

fn index_like(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse().ok()
}

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct PathDescriptor {
    segments: Vec<Segment>,
}

impl PathDescriptor {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses `a.b[0].c` style descriptors. The empty string is the root.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let mut segments = Vec::new();
        if input.is_empty() {
            return Ok(Self { segments });
        }
        for part in input.split('.') {
            parse_part(input, part, &mut segments)?;
        }
        Ok(Self { segments })
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            segments: keys
                .into_iter()
                .map(|key| Segment::from_key(key.as_ref()))
                .collect(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when `to_string()` parses back to this exact descriptor. Keys that
    /// are empty, look like indices, or contain `.`/`[`/`]` have no text form.
    pub fn has_canonical_text(&self) -> bool {
        self.segments.iter().all(|segment| match segment {
            Segment::Index(_) => true,
            Segment::Key(key) => {
                !key.is_empty()
                    && !key.contains(['.', '[', ']'])
                    && index_like(key).is_none()
            }
        })
    }
}

fn parse_part(input: &str, part: &str, segments: &mut Vec<Segment>) -> Result<(), Error> {
    let (head, mut rest) = match part.find('[') {
        Some(pos) => part.split_at(pos),
        None => (part, ""),
    };
    if head.contains(']') {
        return Err(syntax_error(input, "unexpected `]` outside of an index"));
    }
    if head.is_empty() && rest.is_empty() {
        return Err(syntax_error(input, "empty path segment"));
    }
    if !head.is_empty() {
        segments.push(Segment::from_key(head));
    }

    while !rest.is_empty() {
        let Some(body) = rest.strip_prefix('[') else {
            return Err(syntax_error(input, "unexpected characters after `]`"));
        };
        let Some(end) = body.find(']') else {
            return Err(syntax_error(input, "unterminated `[` index"));
        };
        let digits = &body[..end];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(syntax_error(input, "index must be a non-negative integer"));
        }
        let index = digits
            .parse::<usize>()
            .map_err(|err| syntax_error(input, "index out of range").with_source(err))?;
        segments.push(Segment::Index(index));
        rest = &body[end + 1..];
    }
    Ok(())
}

fn syntax_error(input: &str, message: &str) -> Error {
    Error::new(ErrorKind::Usage)
        .with_message(format!("invalid path descriptor: {message}"))
        .with_path(input)
        .with_hint("Use dotted keys with optional indices, e.g. `items[0].name` or `a.b.0`.")
}

impl fmt::Display for PathDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, segment) in self.segments.iter().enumerate() {
            if pos > 0 && matches!(segment, Segment::Key(_)) {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for PathDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Vec<Segment>> for PathDescriptor {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl Serialize for PathDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.has_canonical_text() {
            return serializer.collect_str(self);
        }
        let mut seq = serializer.serialize_seq(Some(self.segments.len()))?;
        for segment in &self.segments {
            match segment {
                Segment::Key(key) => seq.serialize_element(key)?,
                Segment::Index(index) => seq.serialize_element(index)?,
            }
        }
        seq.end()
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawPath {
    Text(String),
    Parts(Vec<RawSegment>),
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawSegment {
    Index(usize),
    Key(String),
}

impl<'de> Deserialize<'de> for PathDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawPath::deserialize(deserializer)? {
            RawPath::Text(text) => Self::parse(&text).map_err(de::Error::custom),
            RawPath::Parts(parts) => Ok(Self {
                segments: parts
                    .into_iter()
                    .map(|part| match part {
                        RawSegment::Index(index) => Segment::Index(index),
                        RawSegment::Key(key) => Segment::Key(key),
                    })
                    .collect(),
            }),
        }
    }
}

/// Anything the helper constructors accept as a path.
pub trait IntoPath {
    fn into_path(self) -> Result<PathDescriptor, Error>;
}

impl IntoPath for PathDescriptor {
    fn into_path(self) -> Result<PathDescriptor, Error> {
        Ok(self)
    }
}

impl IntoPath for &PathDescriptor {
    fn into_path(self) -> Result<PathDescriptor, Error> {
        Ok(self.clone())
    }
}

impl IntoPath for &str {
    fn into_path(self) -> Result<PathDescriptor, Error> {
        PathDescriptor::parse(self)
    }
}

impl IntoPath for String {
    fn into_path(self) -> Result<PathDescriptor, Error> {
        PathDescriptor::parse(&self)
    }
}

impl IntoPath for &String {
    fn into_path(self) -> Result<PathDescriptor, Error> {
        PathDescriptor::parse(self)
    }
}

impl IntoPath for Vec<Segment> {
    fn into_path(self) -> Result<PathDescriptor, Error> {
        Ok(PathDescriptor::from(self))
    }
}

impl<const N: usize> IntoPath for [&str; N] {
    fn into_path(self) -> Result<PathDescriptor, Error> {
        Ok(PathDescriptor::from_keys(self))
    }
}

impl IntoPath for &[&str] {
    fn into_path(self) -> Result<PathDescriptor, Error> {
        Ok(PathDescriptor::from_keys(self))
    }
}
