use crate::{
    PATH_SEPARATOR,
    model::{
        source::{ElementKind, SourceType},
        types::{ScalarType, ValueType},
    },
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// PathError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PathError {
    /// The path, or one of its segments, is empty.
    #[error("path '{path}' contains an empty segment")]
    EmptySegment { path: String },

    /// A segment names no field on the type reached so far.
    #[error("path '{path}': no field '{segment}' on type '{owner}' (resolved so far: '{resolved}')")]
    NotFound {
        path: String,
        segment: String,
        owner: String,
        resolved: String,
    },

    /// The path ends on a collection instead of a field of its elements.
    #[error("path '{path}' terminates on collection '{segment}'; select a field of its elements")]
    InvalidCollection { path: String, segment: String },
}

impl PathError {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::EmptySegment { path }
            | Self::NotFound { path, .. }
            | Self::InvalidCollection { path, .. } => path,
        }
    }
}

///
/// SegmentKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SegmentKind {
    /// Terminal scalar field.
    Scalar,

    /// Single nested object; resolution continues inside it.
    Nested,

    /// Collection field; `depth` counts its nested collection layers.
    Collection { depth: usize },
}

///
/// FieldRef
///
/// One resolved path segment: the field name and the type that declares it.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct FieldRef {
    pub owner: String,
    pub name: String,
    pub kind: SegmentKind,
    pub nullable: bool,
}

///
/// ResolvedPath
///
/// Invariant: when `traverses_collection` is set the terminal segment is never
/// itself a collection; all hops flatten into one sequence of terminal values.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ResolvedPath {
    pub path: String,
    pub segments: Vec<FieldRef>,
    pub terminal_type: ValueType,
    pub traverses_collection: bool,
    pub collection_hop_count: usize,
}

impl ResolvedPath {
    /// Name of the first segment, i.e. the field on the root source type.
    #[must_use]
    pub fn root(&self) -> &str {
        self.segments
            .first()
            .map_or(self.path.as_str(), |segment| segment.name.as_str())
    }

    /// Return whether any segment along the path may be absent.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.segments.iter().any(|segment| segment.nullable)
    }

    /// Type of the value a direct copy of this path produces: the terminal
    /// type, or a flat collection of it when the path crosses collections.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        if self.traverses_collection {
            ValueType::collection_of(self.terminal_type.clone())
        } else {
            self.terminal_type.clone()
        }
    }
}

// Position reached while walking a path.
#[derive(Clone, Copy)]
enum Cursor<'a> {
    Object(&'a SourceType),
    Scalar(ScalarType),
}

impl Cursor<'_> {
    fn type_name(&self) -> String {
        match self {
            Self::Object(ty) => ty.name.clone(),
            Self::Scalar(scalar) => scalar.to_string(),
        }
    }
}

/// Resolve a dot-separated `path` against `source`.
///
/// Each segment is looked up by exact name in the type reached so far.
/// Collection segments are stepped through to their element type and counted;
/// a path may cross any number of them but must not end on one.
pub fn resolve_path(source: &SourceType, path: &str) -> Result<ResolvedPath, PathError> {
    let names: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    if names.iter().any(|name| name.is_empty()) {
        return Err(PathError::EmptySegment {
            path: path.to_string(),
        });
    }

    let mut cursor = Cursor::Object(source);
    let mut segments = Vec::with_capacity(names.len());
    let mut terminal_type = None;
    let mut hop_count = 0;

    for (index, name) in names.iter().enumerate() {
        let is_last = index + 1 == names.len();

        let field = match cursor {
            Cursor::Object(ty) => ty.field(name),
            Cursor::Scalar(_) => None,
        };
        let Some(field) = field else {
            return Err(PathError::NotFound {
                path: path.to_string(),
                segment: (*name).to_string(),
                owner: cursor.type_name(),
                resolved: names[..index].join("."),
            });
        };

        let (element, hops) = field.kind.element();
        if hops > 0 && is_last {
            return Err(PathError::InvalidCollection {
                path: path.to_string(),
                segment: (*name).to_string(),
            });
        }
        hop_count += hops;

        let kind = match (hops, element) {
            (0, ElementKind::Scalar(_)) => SegmentKind::Scalar,
            (0, _) => SegmentKind::Nested,
            (depth, _) => SegmentKind::Collection { depth },
        };
        segments.push(FieldRef {
            owner: cursor.type_name(),
            name: field.name.clone(),
            kind,
            nullable: field.nullable,
        });

        if is_last {
            terminal_type = Some(element.value_type());
        }

        cursor = match element {
            ElementKind::Scalar(scalar) => Cursor::Scalar(scalar),
            ElementKind::Object(ty) => Cursor::Object(ty),
        };
    }

    // names is never empty: splitting yields at least one (non-empty) segment
    let terminal_type = terminal_type.ok_or_else(|| PathError::EmptySegment {
        path: path.to_string(),
    })?;

    Ok(ResolvedPath {
        path: path.to_string(),
        segments,
        terminal_type,
        traverses_collection: hop_count > 0,
        collection_hop_count: hop_count,
    })
}
