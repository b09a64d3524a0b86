//! # Tablefacts - Sound Schema Metadata Under Uncertainty
//!
//! Tablefacts describes the schema of a tabular dataset before any data
//! exists: row count, columns, their types, value sets and missing-value
//! counts. Every fact may be exact, bounded or unknown, and no operation ever
//! reports more certainty than it can justify.
//!
//! ## Quick Start
//!
//! ```
//! use tablefacts::column::ColumnQuery as _;
//! use tablefacts::facts::{EpistemicBool, SetRelation, UncertainCount};
//! use tablefacts::table::TableBuilder;
//!
//! let mut builder = TableBuilder::new(UncertainCount::equal(1_000));
//! builder
//!     .add_nominal("churned", ["yes", "no"], SetRelation::Equal)
//!     .add_real("revenue", None, SetRelation::Unknown);
//! let table = builder.build();
//!
//! assert_eq!(table.contains("churned"), EpistemicBool::Yes);
//! let churned = table.column("churned").expect("tracked");
//! assert_eq!(churned.is_at_most_bicategorical(), EpistemicBool::Yes);
//! ```
//!
//! ## Core Modules
//!
//! - [`facts`]: epistemic booleans, set relations and uncertain counts
//! - [`dictionary`]: known values of nominal columns
//! - [`column`]: per-column snapshots and builders
//! - [`table`]: table snapshots, builders and the height cascade
//! - [`cow`]: copy-on-write containers shared between snapshots and builders
//! - [`profiler`]: exact snapshots from observed statistics
//! - [`config`]: column and nominal value caps
//! - [`error`]: error types and handling utilities
//! - [`logging`]: logger initialisation
//!
//! ## Key Concepts
//!
//! ### Snapshots and Builders
//!
//! Snapshots are immutable and cheap to clone. Every change goes through a
//! builder, which shares the snapshot's containers until its first write:
//!
//! ```
//! use tablefacts::facts::{SetRelation, UncertainCount};
//! use tablefacts::table::TableBuilder;
//!
//! let mut builder = TableBuilder::new(UncertainCount::equal(3));
//! builder.add_real("x", None, SetRelation::Equal);
//! let before = builder.build();
//!
//! let mut edit = before.to_builder();
//! assert!(!edit.owns_column_data());
//! edit.remove("x");
//! let after = edit.build();
//!
//! assert_eq!(before.column_count(), 1);
//! assert_eq!(after.column_count(), 0);
//! ```
//!
//! ### Degrading Instead of Failing
//!
//! Hitting a cap is never an error. A column beyond the column cap is not
//! tracked and the table's column set becomes `Superset`; a dictionary beyond
//! the nominal cap is truncated and its value set becomes `Superset`. Only
//! constraint violations, such as a date range on a text column, return
//! [`error::MetadataError`].

pub mod column;
pub mod config;
pub mod cow;
pub mod dictionary;
pub mod error;
pub mod facts;
pub mod logging;
pub mod profiler;
pub mod table;
