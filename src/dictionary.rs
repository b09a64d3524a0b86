//! Dictionary facts: what is known about the value set of a nominal column.
//!
//! A dictionary is either a plain set of known values, possibly truncated at
//! the nominal value cap, or the boolean specialization that additionally
//! knows which value is the positive and which the negative class.
//!
//! ## Truncation
//!
//! When a value collection exceeds the cap, only the first `cap - 1` distinct
//! values (in the source's iteration order) are kept and the fact is marked
//! truncated. Callers then merge the column's value-set relation with
//! [`SetRelation::Superset`](crate::facts::SetRelation::Superset), because the
//! actual set is only partially represented.
//!
//! ```
//! use tablefacts::dictionary::DictionaryFact;
//!
//! let fact = DictionaryFact::from_values(["a", "b", "c", "d"], 3);
//! assert!(fact.was_truncated());
//! assert_eq!(fact.len(), 2);
//! ```

pub mod fact;

pub use fact::DictionaryFact;
