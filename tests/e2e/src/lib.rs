//! Shared test harness for the end-to-end suite: isolated storage instances
//! and seeded test data, so individual test files stay focused on behaviour
//! rather than setup.

pub mod harness;
pub mod mocks;
