use super::{Container, CreateSpec};
use anyhow::Result;
use std::fmt::Debug;
use std::path::Path;

/// Trait for the external container toolchain (podman/docker plus the
/// distrobox commands). One external process per call, no retries.
pub trait Toolchain: Send + Sync + Debug {
    /// List the known containers
    fn list_containers(&self) -> Result<Vec<Container>>;

    /// Commit a container's current state to an image
    fn commit(&self, container: &str, image: &str) -> Result<()>;

    /// Save an image to a tar archive
    fn save_image(&self, image: &str, dest: &Path) -> Result<()>;

    /// Load an image from a tar archive, returning the command output so the
    /// caller can resolve the loaded image name from it
    fn load_image(&self, archive: &Path) -> Result<String>;

    /// Remove an image
    fn remove_image(&self, image: &str) -> Result<()>;

    /// Stop a container
    fn stop_container(&self, name: &str) -> Result<()>;

    /// Create a new container from a spec
    fn create_container(&self, spec: &CreateSpec) -> Result<()>;

    /// Force-remove a container
    fn remove_container(&self, name: &str) -> Result<()>;
}

/// Presentation boundary consumed by the workflows. Implemented by the
/// terminal layer and by the scripted prompter in test_support.
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question; anything but an explicit yes is a decline
    fn confirm(&self, prompt: &str) -> bool;

    /// Pick one of the options; None means the user backed out
    fn select(&self, prompt: &str, options: &[&str]) -> Option<usize>;

    /// Free-text input, trimmed
    fn input(&self, prompt: &str) -> String;
}
