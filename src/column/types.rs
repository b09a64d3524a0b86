//! Column types and the range values that depend on them.

use crate::error::{MetadataError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The declared element type of a column.
///
/// The set of types is closed; every place that treats the categories
/// differently matches on [`Category`] exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Nominal,
    Real,
    Integer,
    Date,
    Time,
    DateTime,
    Text,
}

/// Which kind of value-set fact is meaningful for a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Dictionary of distinct values
    Nominal,
    /// Numeric range
    Numeric,
    /// Range over ordered objects
    Object,
}

/// Element kind of an object column, matching the [`ObjectValue`] variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Date,
    Time,
    DateTime,
    Text,
}

impl ColumnType {
    pub const ALL: [Self; 7] = [
        Self::Nominal,
        Self::Real,
        Self::Integer,
        Self::Date,
        Self::Time,
        Self::DateTime,
        Self::Text,
    ];

    pub fn category(self) -> Category {
        match self {
            Self::Nominal => Category::Nominal,
            Self::Real | Self::Integer => Category::Numeric,
            Self::Date | Self::Time | Self::DateTime | Self::Text => Category::Object,
        }
    }

    /// Element kind for object columns, `None` for the other categories.
    pub fn element_kind(self) -> Option<ObjectKind> {
        match self {
            Self::Date => Some(ObjectKind::Date),
            Self::Time => Some(ObjectKind::Time),
            Self::DateTime => Some(ObjectKind::DateTime),
            Self::Text => Some(ObjectKind::Text),
            Self::Nominal | Self::Real | Self::Integer => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nominal => "nominal",
            Self::Real => "real",
            Self::Integer => "integer",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date-time",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date-time",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single value of an object column.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectValue {
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Text(String),
}

impl ObjectValue {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Date(_) => ObjectKind::Date,
            Self::Time(_) => ObjectKind::Time,
            Self::DateTime(_) => ObjectKind::DateTime,
            Self::Text(_) => ObjectKind::Text,
        }
    }

    /// Ordering between two values of the same kind; `None` across kinds.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Time(a), Self::Time(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl PartialOrd for ObjectValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl fmt::Display for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{d}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Closed interval `[lower, upper]` of numeric values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NumericRange {
    lower: f64,
    upper: f64,
}

impl NumericRange {
    /// Returns `None` for inverted or NaN bounds; such ranges are dropped, not rejected.
    pub fn new(lower: f64, upper: f64) -> Option<Self> {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            None
        } else {
            Some(Self { lower, upper })
        }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            lower: self.lower.min(other.lower),
            upper: self.upper.max(other.upper),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.lower <= other.upper && other.lower <= self.upper
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

/// Closed interval of object values of one [`ObjectKind`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObjectRange {
    lower: ObjectValue,
    upper: ObjectValue,
}

impl ObjectRange {
    /// # Errors
    ///
    /// Fails if the endpoints have different kinds or `lower > upper`.
    pub fn new(lower: ObjectValue, upper: ObjectValue) -> Result<Self> {
        match lower.compare(&upper) {
            None => Err(MetadataError::InvalidRange(format!(
                "endpoints of different kinds: {} and {}",
                lower.kind(),
                upper.kind()
            ))),
            Some(Ordering::Greater) => Err(MetadataError::InvalidRange(format!(
                "lower bound {lower} exceeds upper bound {upper}"
            ))),
            Some(_) => Ok(Self { lower, upper }),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.lower.kind()
    }

    pub fn lower(&self) -> &ObjectValue {
        &self.lower
    }

    pub fn upper(&self) -> &ObjectValue {
        &self.upper
    }

    pub fn contains(&self, value: &ObjectValue) -> bool {
        matches!(
            (self.lower.compare(value), value.compare(&self.upper)),
            (
                Some(Ordering::Less | Ordering::Equal),
                Some(Ordering::Less | Ordering::Equal)
            )
        )
    }

    /// Smallest range covering both.
    ///
    /// # Errors
    ///
    /// Fails if the ranges are of different kinds.
    pub fn union(&self, other: &Self) -> Result<Self> {
        if self.kind() != other.kind() {
            return Err(MetadataError::TypeMismatch {
                expected: self.kind().to_string(),
                found: other.kind().to_string(),
            });
        }
        let lower = if other.lower < self.lower {
            other.lower.clone()
        } else {
            self.lower.clone()
        };
        let upper = if other.upper > self.upper {
            other.upper.clone()
        } else {
            self.upper.clone()
        };
        Ok(Self { lower, upper })
    }
}

impl fmt::Display for ObjectRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}
