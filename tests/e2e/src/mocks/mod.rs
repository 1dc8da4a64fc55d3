mod fixtures;

pub use fixtures::{FixtureEmbedder, TestDataFactory};
