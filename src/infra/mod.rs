pub mod command;
pub mod config;
pub mod deps;
pub mod distrobox;
pub mod homes;
pub mod progress;

pub use command::{CommandError, CommandRunner};
pub use distrobox::DistroboxAdapter;
pub use homes::HomeClassifier;
pub use progress::Spinner;
