use std::error::Error;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::process::Command;

/// Runs one external process per call and captures its combined stdout and
/// stderr. Never retries; failures carry the captured output verbatim so the
/// caller can display or inspect it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }

    pub fn run<I, S>(&self, program: &str, args: I) -> Result<String, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args
            .into_iter()
            .map(|item| item.as_ref().to_os_string())
            .collect();
        let rendered = render_command_line(program, &args);

        let output = Command::new(program)
            .args(&args)
            .output()
            .map_err(|err| CommandError::new(&rendered, err.to_string(), String::new()))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(combined)
        } else {
            Err(CommandError::new(
                &rendered,
                format!("exited with {}", output.status),
                combined,
            ))
        }
    }
}

fn render_command_line(program: &str, args: &[OsString]) -> String {
    let mut rendered = String::from(program);
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}

/// A failed external command: the rendered command line, the exit or spawn
/// detail, and whatever the command printed.
#[derive(Debug)]
pub struct CommandError {
    command: String,
    detail: String,
    output: String,
}

impl CommandError {
    pub fn new(
        command: impl Into<String>,
        detail: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            detail: detail.into(),
            output: output.into(),
        }
    }

    /// The captured output, for sentinel checks on benign failures.
    pub fn output(&self) -> &str {
        &self.output
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command '{}' failed: {}", self.command, self.detail)?;
        if !self.output.trim().is_empty() {
            write!(f, "\noutput: {}", self.output.trim_end())?;
        }
        Ok(())
    }
}

impl Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_combined_stdout_and_stderr() {
        let runner = CommandRunner::new();
        let output = runner
            .run("sh", ["-c", "echo out; echo err >&2"])
            .unwrap();

        assert!(output.contains("out"));
        assert!(output.contains("err"));
    }

    #[test]
    fn failure_carries_command_line_and_output() {
        let runner = CommandRunner::new();
        let err = runner
            .run("sh", ["-c", "echo boom; exit 3"])
            .unwrap_err();

        assert!(err.output().contains("boom"));
        let rendered = err.to_string();
        assert!(rendered.contains("sh -c"));
        assert!(rendered.contains("boom"));
    }

    #[test]
    fn missing_program_is_an_error() {
        let runner = CommandRunner::new();
        let err = runner
            .run("boxkeeper-no-such-program", ["--version"])
            .unwrap_err();

        assert!(err.to_string().contains("boxkeeper-no-such-program"));
        assert!(err.output().is_empty());
    }
}
