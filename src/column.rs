//! Per-column metadata: the immutable [`ColumnSnapshot`] and its [`ColumnBuilder`].
//!
//! Which value-set fact is meaningful depends on the column type's
//! [`Category`]: a dictionary for nominal columns, a numeric range for numeric
//! columns and an object range for date, time and text columns. The builder
//! scrubs whatever does not match on `build()`, and a column of unknown type
//! carries no value-set facts at all.
//!
//! ```
//! use tablefacts::column::{ColumnBuilder, ColumnQuery as _, ColumnType};
//! use tablefacts::facts::{EpistemicBool, SetRelation, UncertainCount};
//!
//! let mut builder = ColumnBuilder::new(ColumnType::Nominal);
//! builder
//!     .set_dictionary_values(["red", "green"], SetRelation::Equal)
//!     .set_missing_values(UncertainCount::equal(0));
//! let column = builder.build();
//!
//! assert_eq!(column.is_at_most_bicategorical(), EpistemicBool::Yes);
//! assert_eq!(column.has_missing_values(), EpistemicBool::No);
//! ```

pub mod builder;
pub mod query;
pub mod snapshot;
pub mod types;

pub use builder::ColumnBuilder;
pub use query::ColumnQuery;
pub use snapshot::ColumnSnapshot;
pub use types::{Category, ColumnType, NumericRange, ObjectKind, ObjectRange, ObjectValue};
