pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use mocks::CountingDirectory;
#[allow(unused_imports)]
pub use setup::{parent_metadata, TestSetup, TestSetupBuilder};
