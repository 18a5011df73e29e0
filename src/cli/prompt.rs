use crate::domain::Prompter;
use std::io::{self, BufRead, Write};

/// Terminal implementation of the presentation boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

fn read_line() -> String {
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
    line.trim().to_string()
}

fn flush_prompt(prompt: &str) {
    print!("{prompt}");
    let _ = io::stdout().flush();
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, prompt: &str) -> bool {
        flush_prompt(&format!("{prompt} (y/N): "));
        read_line().eq_ignore_ascii_case("y")
    }

    fn select(&self, prompt: &str, options: &[&str]) -> Option<usize> {
        for (idx, option) in options.iter().enumerate() {
            println!("  {}) {option}", idx + 1);
        }

        // Invalid input re-prompts; only an empty line backs out.
        loop {
            flush_prompt(&format!("> {prompt} (1-{}, empty to cancel): ", options.len()));
            let input = read_line();
            if input.is_empty() {
                return None;
            }

            match input.parse::<usize>() {
                Ok(choice) if (1..=options.len()).contains(&choice) => return Some(choice - 1),
                _ => println!(
                    "Invalid input. Enter a number between 1 and {}.",
                    options.len()
                ),
            }
        }
    }

    fn input(&self, prompt: &str) -> String {
        flush_prompt(&format!("> {prompt}: "));
        read_line()
    }
}
