//! Integration tests module
//!
//! End-to-end tests that run the real router on a loopback listener.

pub mod api_test;
pub mod error_scenarios;
pub mod fixtures;
