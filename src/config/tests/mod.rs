//! Unit tests for configuration loading and precedence.
//!
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `field_resolution`: Token, API base, and bind address resolution tests
//! - `validation`: Value range and URL validation tests

mod helpers;
