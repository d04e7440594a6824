//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! - [`domain`] builds items, transactions, rules and snapshots.
//! - [`serving`] provides a scriptable snapshot loader for reload tests.

pub mod domain;
pub mod serving;
