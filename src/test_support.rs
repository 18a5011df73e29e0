use crate::domain::{Container, CreateSpec, Prompter, Toolchain};
use anyhow::{Context, Result, bail};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

/// In-memory stand-in for the external toolchain. Records every invocation,
/// tracks containers and images, and can be told to fail a single operation.
#[derive(Debug, Default)]
pub struct MockToolchain {
    containers: RwLock<Vec<Container>>,
    images: RwLock<Vec<String>>,
    commands: RwLock<Vec<String>>,
    fail_on: RwLock<Option<String>>,
    load_output: RwLock<Option<String>>,
}

impl MockToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_container(&self, id: &str, name: &str, image: &str) {
        self.containers.write().unwrap().push(Container {
            id: id.to_string(),
            name: name.to_string(),
            image: image.to_string(),
        });
    }

    pub fn set_fail_on(&self, operation: &str) {
        *self.fail_on.write().unwrap() = Some(operation.to_string());
    }

    /// Output returned by `load_image`; defaults to a single marker line.
    pub fn set_load_output(&self, output: &str) {
        *self.load_output.write().unwrap() = Some(output.to_string());
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    pub fn container_exists(&self, name: &str) -> bool {
        self.containers
            .read()
            .unwrap()
            .iter()
            .any(|container| container.name == name)
    }

    pub fn images(&self) -> Vec<String> {
        self.images.read().unwrap().clone()
    }

    fn record_command(&self, cmd: &str) {
        self.commands.write().unwrap().push(cmd.to_string());
    }

    fn check_fail(&self, operation: &str) -> Result<()> {
        if let Some(ref fail_on) = *self.fail_on.read().unwrap() {
            if fail_on == operation {
                bail!("Mock failure on: {}", operation);
            }
        }
        Ok(())
    }
}

impl Toolchain for MockToolchain {
    fn list_containers(&self) -> Result<Vec<Container>> {
        self.record_command("list");
        self.check_fail("list")?;
        Ok(self.containers.read().unwrap().clone())
    }

    fn commit(&self, container: &str, image: &str) -> Result<()> {
        self.record_command(&format!("commit:{container}:{image}"));
        self.check_fail("commit")?;
        self.images.write().unwrap().push(image.to_string());
        Ok(())
    }

    fn save_image(&self, image: &str, dest: &Path) -> Result<()> {
        self.record_command(&format!("save:{image}"));
        self.check_fail("save")?;
        fs::write(dest, b"mock image archive")
            .with_context(|| format!("writing {:?}", dest))?;
        Ok(())
    }

    fn load_image(&self, archive: &Path) -> Result<String> {
        self.record_command(&format!("load:{}", archive.display()));
        self.check_fail("load")?;

        let output = self
            .load_output
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(|| "Loaded image: boxkeeper-restore:latest\n".to_string());

        if let Some(image) = crate::infra::distrobox::extract_loaded_image(&output) {
            self.images.write().unwrap().push(image);
        }
        Ok(output)
    }

    fn remove_image(&self, image: &str) -> Result<()> {
        self.record_command(&format!("rmi:{image}"));
        self.check_fail("rmi")?;
        self.images.write().unwrap().retain(|i| i != image);
        Ok(())
    }

    fn stop_container(&self, name: &str) -> Result<()> {
        self.record_command(&format!("stop:{name}"));
        self.check_fail("stop")?;
        Ok(())
    }

    fn create_container(&self, spec: &CreateSpec) -> Result<()> {
        self.record_command(&format!("create:{}", spec.name));
        self.check_fail("create")?;
        self.containers.write().unwrap().push(Container {
            id: format!("mock-{}", spec.name),
            name: spec.name.clone(),
            image: spec.image.clone(),
        });
        Ok(())
    }

    fn remove_container(&self, name: &str) -> Result<()> {
        self.record_command(&format!("rm:{name}"));
        self.check_fail("rm")?;
        self.containers
            .write()
            .unwrap()
            .retain(|container| container.name != name);
        Ok(())
    }
}

/// Prompter answering from pre-seeded queues. Unseeded prompts decline or
/// cancel, which keeps accidental destructive paths out of tests.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    confirms: RwLock<VecDeque<bool>>,
    inputs: RwLock<VecDeque<String>>,
    selections: RwLock<VecDeque<Option<usize>>>,
    prompts: RwLock<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_confirm(&self, answer: bool) {
        self.confirms.write().unwrap().push_back(answer);
    }

    pub fn push_input(&self, answer: &str) {
        self.inputs.write().unwrap().push_back(answer.to_string());
    }

    pub fn push_selection(&self, answer: Option<usize>) {
        self.selections.write().unwrap().push_back(answer);
    }

    /// Every prompt shown, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.write().unwrap().push(prompt.to_string());
        self.confirms.write().unwrap().pop_front().unwrap_or(false)
    }

    fn select(&self, prompt: &str, _options: &[&str]) -> Option<usize> {
        self.prompts.write().unwrap().push(prompt.to_string());
        self.selections
            .write()
            .unwrap()
            .pop_front()
            .unwrap_or(None)
    }

    fn input(&self, prompt: &str) -> String {
        self.prompts.write().unwrap().push(prompt.to_string());
        self.inputs.write().unwrap().pop_front().unwrap_or_default()
    }
}
