//! Reducers: aggregation functions that collapse the flattened leaf values of
//! a collection-traversing dependency into a single argument.

use crate::model::types::{ScalarType, ValueType};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// ReducerError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ReducerError {
    #[error("unknown reducer '{name}'")]
    Unknown { name: String },

    #[error("reducer {reducer} cannot be applied to leaf type {leaf}")]
    Unsupported { reducer: ReducerKind, leaf: ValueType },
}

///
/// ReducerKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[remain::sorted]
pub enum ReducerKind {
    Avg,
    Count,
    CountDistinct,
    Max,
    Min,
    Sum,
}

impl ReducerKind {
    /// Every reducer, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Avg,
        Self::Count,
        Self::CountDistinct,
        Self::Max,
        Self::Min,
        Self::Sum,
    ];

    /// Type produced by every counting reducer.
    pub const COUNT_TYPE: ScalarType = ScalarType::Int64;

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Avg => "AVG",
            Self::Count => "COUNT",
            Self::CountDistinct => "COUNT_DISTINCT",
            Self::Max => "MAX",
            Self::Min => "MIN",
            Self::Sum => "SUM",
        }
    }

    /// Type of the single value produced by reducing a sequence of `leaf`.
    ///
    /// Counting reducers always yield [`Self::COUNT_TYPE`]; `SUM`/`AVG` need a
    /// numeric leaf and `MIN`/`MAX` an orderable one, and all four preserve it.
    pub fn output_type(self, leaf: &ValueType) -> Result<ValueType, ReducerError> {
        let supported = match self {
            Self::Count | Self::CountDistinct => {
                return Ok(ValueType::Scalar(Self::COUNT_TYPE));
            }
            Self::Sum | Self::Avg => leaf.is_numeric(),
            Self::Min | Self::Max => leaf.supports_ord(),
        };

        if supported {
            Ok(leaf.clone())
        } else {
            Err(ReducerError::Unsupported {
                reducer: self,
                leaf: leaf.clone(),
            })
        }
    }
}

impl fmt::Display for ReducerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReducerKind {
    type Err = ReducerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ReducerError::Unknown {
                name: s.to_string(),
            })
    }
}
