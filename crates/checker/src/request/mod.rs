//! Inbound check requests.
//!
//! [`RawCheckRequest`] is the wire shape; [`CheckRequest`] and
//! [`OnDemandRequest`] are the validated, immutable forms the handler works
//! with.

mod types;
mod validation;

pub use types::{CheckRequest, OnDemandRequest, OtelConfig, RawCheckRequest, Trigger};
pub use validation::{ValidationError, validate_region};
