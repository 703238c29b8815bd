//! Dotted property path parser.
//!
//! Parses keys like `settings.privacy.improve_wire` into an ordered,
//! non-empty list of non-empty segments. Parsing is pure: no schema lookup
//! happens here (see [`PropertySchema`](crate::PropertySchema)).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::PathError;

/// A parsed dotted property path.
///
/// # Invariants
///
/// 1. At least one segment.
/// 2. No segment is empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    /// Parse a dotted key into a path.
    ///
    /// Segments are not trimmed; `" a.b"` has the segment `" a"`.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for (index, part) in raw.split('.').enumerate() {
            if part.is_empty() {
                return Err(PathError::EmptySegment {
                    raw: raw.to_string(),
                    index,
                });
            }
            segments.push(part.to_string());
        }

        Ok(Self { segments })
    }

    /// Build a path from pre-split segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        if let Some(index) = segments.iter().position(|s| s.is_empty()) {
            return Err(PathError::EmptySegment {
                raw: segments.join("."),
                index,
            });
        }
        if let Some(segment) = segments.iter().find(|s| s.contains('.')) {
            return Err(PathError::DottedSegment {
                segment: segment.clone(),
            });
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments. Always at least 1.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The last segment.
    pub fn leaf(&self) -> &str {
        // Non-empty by construction.
        &self.segments[self.segments.len() - 1]
    }

    /// The path without its last segment, or `None` for a single-segment path.
    pub fn parent(&self) -> Option<PropertyPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Proper prefixes of this path, coarse to fine.
    ///
    /// `a.b.c` yields `a`, then `a.b`.
    pub fn ancestors(&self) -> impl Iterator<Item = PropertyPath> + '_ {
        (1..self.segments.len()).map(move |n| Self {
            segments: self.segments[..n].to_vec(),
        })
    }

    /// True if `self` is a proper prefix of `other`.
    pub fn is_ancestor_of(&self, other: &PropertyPath) -> bool {
        self.segments.len() < other.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Append a segment, returning a new path.
    pub fn child(&self, segment: &str) -> Result<PropertyPath, PathError> {
        if segment.is_empty() {
            return Err(PathError::EmptySegment {
                raw: format!("{self}."),
                index: self.segments.len(),
            });
        }
        if segment.contains('.') {
            return Err(PathError::DottedSegment {
                segment: segment.to_string(),
            });
        }
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// Format back to a dotted string.
    pub fn to_dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

impl FromStr for PropertyPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PropertyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_dotted())
    }
}

impl<'de> Deserialize<'de> for PropertyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
