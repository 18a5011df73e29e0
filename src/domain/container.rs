use std::path::PathBuf;

/// A distrobox container as observed from the external listing. Identity is
/// the name; uniqueness among active containers is enforced by the toolchain,
/// not by us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub id: String,
    pub name: String,
    pub image: String,
}

/// Whether a container has its own home directory or shares the host's.
///
/// Always derived from the filesystem on demand, never stored: a conversion
/// changes it mid-workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IsolationState {
    Standard,
    Isolated { home: PathBuf },
}

impl IsolationState {
    pub fn label(&self) -> &'static str {
        match self {
            IsolationState::Standard => "Standard",
            IsolationState::Isolated { .. } => "Isolated",
        }
    }

    pub fn is_isolated(&self) -> bool {
        matches!(self, IsolationState::Isolated { .. })
    }
}

/// Arguments handed to `distrobox-create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSpec {
    pub name: String,
    pub image: String,
    pub home: Option<PathBuf>,
}
