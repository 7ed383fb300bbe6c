//! Shared utilities.

#[cfg(test)]
pub mod testutil;
