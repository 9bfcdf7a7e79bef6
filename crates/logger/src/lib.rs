//! Tracing setup shared by the checker binaries.

mod tracing;

pub use crate::tracing::{init as init_tracing, try_init as try_init_tracing};
