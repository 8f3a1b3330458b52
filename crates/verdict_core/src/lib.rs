//! VERDICT.GATE Core Types
//!
//! This crate contains pure types and logic with no I/O.
//! All types are serializable with stable, cross-platform encoding.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attribute;
pub mod decision;
pub mod error;
pub mod id;

// Re-exports
pub use attribute::{AttributeValue, RequestContext};
pub use decision::{CombiningAlgorithm, Decision, Effect};
pub use error::{CoreError, CoreResult};
pub use id::RequestId;
