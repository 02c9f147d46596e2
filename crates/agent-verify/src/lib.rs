pub mod error;
pub mod runner;

pub use error::VerifyError;
pub use runner::{run_tests, TestRunResult};
