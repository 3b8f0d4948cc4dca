use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// ScalarType
///
/// Leaf type vocabulary for source fields, method signatures, and DTO fields.
/// `Any` is the top type: every value type is assignable to it.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[remain::sorted]
pub enum ScalarType {
    Any,
    Bool,
    Date,
    DateTime,
    Decimal,
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Int64,
    Text,
    Uuid,
}

impl ScalarType {
    //
    // grouped helpers
    //

    #[must_use]
    pub const fn is_int(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    #[must_use]
    pub const fn is_decimal(self) -> bool {
        matches!(self, Self::Decimal)
    }

    // is_numeric
    // Includes ints, floats, and Decimal.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_int() || self.is_float() || self.is_decimal()
    }

    // both Ord and PartialOrd
    #[must_use]
    pub const fn supports_ord(self) -> bool {
        self.is_numeric() || matches!(self, Self::Date | Self::DateTime | Self::Text)
    }

    // integer width in bits, zero for non-integers
    const fn int_width(self) -> u8 {
        match self {
            Self::Int8 => 8,
            Self::Int16 => 16,
            Self::Int32 => 32,
            Self::Int64 => 64,
            _ => 0,
        }
    }

    /// Return whether a value of `self` widens losslessly into `target`.
    ///
    /// Widening stays inside a numeric family, except that every integer and
    /// float also widens into `Decimal`.
    #[must_use]
    pub const fn widens_to(self, target: Self) -> bool {
        if self.is_int() && target.is_int() {
            return self.int_width() <= target.int_width();
        }

        match (self, target) {
            (Self::Float32, Self::Float32 | Self::Float64) | (Self::Float64, Self::Float64) => true,
            (_, Self::Decimal) => self.is_numeric(),
            _ => false,
        }
    }
}

///
/// ValueType
///
/// Type of a value flowing through a mapping: a scalar, a named object type,
/// or a collection of either.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ValueType {
    Scalar(ScalarType),
    Object(String),
    Collection(Box<Self>),
}

impl ValueType {
    #[must_use]
    pub fn object(name: impl Into<String>) -> Self {
        Self::Object(name.into())
    }

    #[must_use]
    pub fn collection_of(element: Self) -> Self {
        Self::Collection(Box::new(element))
    }

    #[must_use]
    pub const fn as_scalar(&self) -> Option<ScalarType> {
        match self {
            Self::Scalar(scalar) => Some(*scalar),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        match self {
            Self::Scalar(scalar) => scalar.is_numeric(),
            _ => false,
        }
    }

    #[must_use]
    pub const fn supports_ord(&self) -> bool {
        match self {
            Self::Scalar(scalar) => scalar.supports_ord(),
            _ => false,
        }
    }

    /// Return whether a value of this type may be stored where `target` is
    /// expected.
    ///
    /// Identical types are always assignable and everything is assignable to
    /// `Any`. With `numeric_widening`, scalars also widen per
    /// [`ScalarType::widens_to`]. Collections compare element-wise.
    #[must_use]
    pub fn is_assignable_to(&self, target: &Self, numeric_widening: bool) -> bool {
        match (self, target) {
            (_, Self::Scalar(ScalarType::Any)) => true,
            (Self::Scalar(found), Self::Scalar(expected)) => {
                found == expected || (numeric_widening && found.widens_to(*expected))
            }
            (Self::Object(found), Self::Object(expected)) => found == expected,
            (Self::Collection(found), Self::Collection(expected)) => {
                found.is_assignable_to(expected, numeric_widening)
            }
            _ => false,
        }
    }
}

impl From<ScalarType> for ValueType {
    fn from(scalar: ScalarType) -> Self {
        Self::Scalar(scalar)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => write!(f, "{scalar}"),
            Self::Object(name) => f.write_str(name),
            Self::Collection(element) => write!(f, "Collection<{element}>"),
        }
    }
}

/// Render a parameter list as `A, B, C`.
pub(crate) fn format_params(params: &[ValueType]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
