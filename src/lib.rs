pub mod cli;
pub mod domain;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
// In a real production crate, we might use a feature flag "test-utils"
pub mod test_support;

pub use domain::{Container, CreateSpec, IsolationState, Prompter, Toolchain};
pub use infra::{CommandRunner, DistroboxAdapter, HomeClassifier};
pub use services::{BackupReport, ConvertReport, Outcome, RestoreReport, Workflows};
