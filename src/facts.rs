//! Uncertainty primitives every metadata fact is expressed in.
//!
//! - [`EpistemicBool`]: three-valued answer to a yes/no question
//! - [`SetRelation`]: how a claimed set (values, columns, range) relates to the actual one
//! - [`UncertainCount`]: a non-negative count that may be exact, bounded or unknown
//!
//! All three only ever lose certainty when combined; nothing in this module
//! turns an unknown into a known.

pub mod count;
pub mod epistemic;
pub mod relation;

pub use count::{CountRelation, UncertainCount};
pub use epistemic::EpistemicBool;
pub use relation::SetRelation;
