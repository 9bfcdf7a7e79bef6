//! Check handler tests

pub mod support;
pub mod monitor_check_tests;
