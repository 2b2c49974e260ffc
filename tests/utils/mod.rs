pub mod builders;
pub mod setup;

// Re-export main utilities for use by test files
pub use builders::{ClassificationBuilder, PicksBuilder};
pub use setup::{TestSetup, TestSetupBuilder};
