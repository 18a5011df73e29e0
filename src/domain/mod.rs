mod container;
pub mod traits;

pub use container::{Container, CreateSpec, IsolationState};
pub use traits::{Prompter, Toolchain};
