//! Whole-table metadata: row count, ordered columns, column tags.
//!
//! A [`TableSnapshot`] is immutable. Edits go through a [`TableBuilder`],
//! which shares the snapshot's column and tag containers until its first
//! structural mutation and then copies them once.
//!
//! Changing the row-count estimate of a builder with
//! [`TableBuilder::update_height`] cascades into every column: missing-value
//! counts and nominal value sets are widened so that no fact claims more than
//! the new height justifies.
//!
//! ```
//! use tablefacts::column::ColumnQuery as _;
//! use tablefacts::facts::{SetRelation, UncertainCount};
//! use tablefacts::table::TableBuilder;
//!
//! let mut builder = TableBuilder::new(UncertainCount::equal(10));
//! builder.add_nominal("colour", ["red", "green"], SetRelation::Equal);
//! builder.update_column("colour", |column| {
//!     column.set_missing_values(UncertainCount::equal(10));
//! })?;
//! builder.update_height(UncertainCount::equal(6));
//! let table = builder.build();
//!
//! let colour = table.column("colour").expect("tracked");
//! assert_eq!(colour.missing_values(), UncertainCount::at_most(10));
//! assert_eq!(colour.value_set_relation(), SetRelation::Subset);
//! # Ok::<(), tablefacts::error::MetadataError>(())
//! ```

pub mod builder;
pub mod cascade;
pub mod labels;
pub mod snapshot;
pub mod tags;
pub mod union;

pub use builder::TableBuilder;
pub use cascade::Cascade;
pub use labels::LabelMap;
pub use snapshot::{Selection, TableSnapshot};
pub use tags::{ColumnReference, ColumnRole, ColumnTag, TagKind};

use std::collections::BTreeMap;

/// Tag lists keyed by column label.
pub type TagMap = BTreeMap<String, Vec<ColumnTag>>;
