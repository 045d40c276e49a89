//! Property-based tests for connstore-core
//!
//! Run with: cargo test -p connstore-core --test property_tests

#![allow(clippy::unwrap_used)]

mod properties;
