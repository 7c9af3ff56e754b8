//! The template path model
//!
//! A path addresses any node in a parsed template from the root, and doubles
//! as the lookup key for schema resolution. It is rendered as
//! `ROOT/Resources/MyBucket,AWS::S3::Bucket/Properties/` — one segment per
//! container level, each followed by a separator, with discriminator
//! parameters appended to their segment after commas.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Separator between rendered path segments.
pub const PATH_SEPARATOR: char = '/';

/// Display name of the root sentinel segment.
pub const ROOT_SEGMENT: &str = "ROOT";

/// One step of a template path.
///
/// A field segment may carry string parameters (a resource's `Type` value)
/// used for schema lookup. Parameters never participate in equality or
/// hashing: two segments addressing the same field are equal whether or not
/// the resource type is known yet.
#[derive(Debug, Clone)]
pub enum PathSegment {
    /// Sentinel for the template root object.
    Root,
    /// An element position within an array.
    Index(usize),
    /// A field name, optionally qualified by discriminator values.
    Field { name: String, params: Vec<String> },
}

impl PathSegment {
    /// A plain field segment with no parameters.
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// A field segment qualified by a discriminator value.
    pub fn field_with_param(name: impl Into<String>, param: impl Into<String>) -> Self {
        PathSegment::Field {
            name: name.into(),
            params: vec![param.into()],
        }
    }

    /// The field name, if this is a field segment.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            PathSegment::Field { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The discriminator parameters of a field segment (empty otherwise).
    pub fn params(&self) -> &[String] {
        match self {
            PathSegment::Field { params, .. } => params,
            _ => &[],
        }
    }

    /// Human-readable form: `ROOT`, the array index, or `name,param1,...`.
    pub fn readable(&self) -> String {
        match self {
            PathSegment::Root => ROOT_SEGMENT.to_string(),
            PathSegment::Index(i) => i.to_string(),
            PathSegment::Field { name, params } => {
                if params.is_empty() {
                    name.clone()
                } else {
                    let mut out = name.clone();
                    for param in params {
                        out.push(',');
                        out.push_str(param);
                    }
                    out
                }
            }
        }
    }
}

impl PartialEq for PathSegment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PathSegment::Root, PathSegment::Root) => true,
            (PathSegment::Index(a), PathSegment::Index(b)) => a == b,
            (PathSegment::Field { name: a, .. }, PathSegment::Field { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for PathSegment {}

impl Hash for PathSegment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            PathSegment::Root => 0u8.hash(state),
            PathSegment::Index(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            PathSegment::Field { name, .. } => {
                2u8.hash(state);
                name.hash(state);
            }
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.readable())
    }
}

/// An ordered sequence of path segments addressing a node from the root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplatePath {
    segments: Vec<PathSegment>,
}

impl TemplatePath {
    /// An empty path (no segments, not even the root sentinel).
    pub fn new() -> Self {
        TemplatePath::default()
    }

    /// A path containing only the root sentinel.
    pub fn root() -> Self {
        TemplatePath {
            segments: vec![PathSegment::Root],
        }
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path shortened to its first `len` segments.
    pub fn truncated(&self, len: usize) -> TemplatePath {
        TemplatePath {
            segments: self.segments[..len.min(self.segments.len())].to_vec(),
        }
    }

    /// Parse the textual form produced by `Display`.
    ///
    /// A leading `ROOT` is accepted and normalized away (the sentinel is
    /// re-added), all-digit segments become indices, and commas split a field
    /// segment into its name and parameters. Empty input yields the bare root
    /// path.
    pub fn parse(text: &str) -> TemplatePath {
        let mut path = TemplatePath::root();
        for raw in text.split(PATH_SEPARATOR) {
            let raw = raw.trim();
            if raw.is_empty() || raw == ROOT_SEGMENT {
                continue;
            }
            if raw.bytes().all(|b| b.is_ascii_digit()) {
                path.push(PathSegment::Index(raw.parse().unwrap_or(0)));
                continue;
            }
            let mut parts = raw.split(',');
            let name = parts.next().unwrap_or_default().to_string();
            let params: Vec<String> = parts.map(str::to_string).collect();
            path.push(PathSegment::Field { name, params });
        }
        path
    }
}

impl From<Vec<PathSegment>> for TemplatePath {
    fn from(segments: Vec<PathSegment>) -> Self {
        TemplatePath { segments }
    }
}

impl fmt::Display for TemplatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}{}", segment.readable(), PATH_SEPARATOR)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_equality_ignores_params() {
        let plain = PathSegment::field("MyBucket");
        let typed = PathSegment::field_with_param("MyBucket", "AWS::S3::Bucket");
        assert_eq!(plain, typed);
        assert_ne!(plain, PathSegment::field("Other"));
        assert_ne!(PathSegment::Index(0), PathSegment::Index(1));
    }

    #[test]
    fn test_display_matches_reference_format() {
        let path: TemplatePath = vec![
            PathSegment::Root,
            PathSegment::field("Resources"),
            PathSegment::field_with_param("B", "AWS::S3::Bucket"),
            PathSegment::field("Properties"),
        ]
        .into();
        assert_eq!(path.to_string(), "ROOT/Resources/B,AWS::S3::Bucket/Properties/");
    }

    #[test]
    fn test_parse_round_trips_display() {
        let original: TemplatePath = vec![
            PathSegment::Root,
            PathSegment::field("Resources"),
            PathSegment::field_with_param("B", "AWS::S3::Bucket"),
            PathSegment::Index(2),
        ]
        .into();
        let reparsed = TemplatePath::parse(&original.to_string());
        assert_eq!(reparsed, original);
        // Params survive the round trip even though equality ignores them.
        assert_eq!(reparsed.segments()[2].params(), ["AWS::S3::Bucket"]);
    }

    #[test]
    fn test_parse_without_root_prefix() {
        let path = TemplatePath::parse("Resources/MyQueue");
        assert_eq!(path.segments()[0], PathSegment::Root);
        assert_eq!(path.segments()[1], PathSegment::field("Resources"));
        assert_eq!(path.len(), 3);
    }
}
