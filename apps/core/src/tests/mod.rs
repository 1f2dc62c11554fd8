//! Test Module
//!
//! Cross-component test suite for the Overthinkr backend. Unit tests live
//! next to the code they cover; this module holds the end-to-end workflows.
//!
//! ## Test Categories
//! - `integration_tests`: Full pipeline runs against a mock analyze endpoint

pub mod integration_tests;
